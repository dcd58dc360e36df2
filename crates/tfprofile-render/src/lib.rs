//! Terminal rendering for tf-profile
//!
//! Turns parsed logs and statistics into aligned, optionally colored text
//! tables. Everything renders to a `String` so a failed run prints nothing.

mod table;
mod theme;
mod views;

pub use table::Table;
pub use theme::Theme;
pub use views::{render_stats, render_table};
