use tfprofile_logs::{StatSection, format_duration_ms};
use tfprofile_types::ParsedLog;

use crate::table::Table;
use crate::theme::Theme;

const TABLE_COLUMNS: [&str; 8] = [
    "resource",
    "n",
    "tot_time",
    "modify_started",
    "modify_ended",
    "desired_state",
    "operation",
    "final_state",
];

/// Key/value table of statistics, a blank row after each section
pub fn render_stats(sections: &[StatSection], theme: &Theme) -> String {
    let mut table = Table::new(["Key", "Value"]);
    for section in sections {
        for stat in section {
            table.add_row([stat.name.as_str(), stat.value.as_str()]);
        }
        table.add_blank_row();
    }
    table.render(theme)
}

/// One row per resource, in the given address order
///
/// Addresses missing from `log` are skipped. Indices that were never
/// observed print as `/`.
pub fn render_table(log: &ParsedLog, order: &[&str], theme: &Theme) -> String {
    let mut table = Table::new(TABLE_COLUMNS);
    for &address in order {
        let Some(metrics) = log.get(address) else {
            continue;
        };
        table.add_row([
            address.to_string(),
            metrics.num_calls.to_string(),
            format_duration_ms(metrics.total_time_ms),
            index_cell(metrics.modification_started_index),
            index_cell(metrics.modification_completed_index),
            metrics.desired_status.to_string(),
            metrics.operation.to_string(),
            metrics.after_status.to_string(),
        ]);
    }
    table.render(theme)
}

fn index_cell(index: Option<usize>) -> String {
    index.map_or_else(|| "/".to_string(), |i| i.to_string())
}
