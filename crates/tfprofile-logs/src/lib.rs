//! Log processing for tf-profile
//!
//! This crate turns a Terraform plan/apply transcript into per-resource
//! metrics: line recognition, aggregation, sorting and derived statistics.

mod aggregate;
mod duration;
mod error;
mod parser;
mod sort;
mod source;
mod stats;

pub use aggregate::aggregate;
pub use duration::{format_duration, format_duration_ms, parse_duration_ms};
pub use error::{Error, Result};
pub use parser::LogParser;
pub use sort::{Direction, SortField, SortKey, SortSpec};
pub use source::read_log;
pub use stats::{Stat, StatSection, statistics};

// Re-export types used in our public API
pub use tfprofile_types::{EventKind, Metrics, Operation, ParsedLog, ResourceEvent, Status};
