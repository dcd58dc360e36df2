//! Summary statistics over a parsed log
//!
//! Every group-by count is kept in a `BTreeMap` so rows come out sorted by
//! key, and "largest"/"longest" picks break ties on the smaller key.

use std::collections::BTreeMap;

use tfprofile_types::{ParsedLog, leaf_module, module_depth, module_path, top_level_module};

use crate::duration::format_duration_ms;

/// Placeholder for a value that does not exist in this log
const NONE: &str = "/";

/// A named statistic, already formatted for display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub value: String,
}

impl Stat {
    fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// A group of related statistics
pub type StatSection = Vec<Stat>;

/// Compute all statistic sections, in display order
pub fn statistics(log: &ParsedLog) -> Vec<StatSection> {
    vec![
        basic_stats(log),
        time_stats(log),
        operation_stats(log),
        after_status_stats(log),
        desired_state_stats(log),
        module_stats(log),
    ]
}

fn basic_stats(log: &ParsedLog) -> StatSection {
    vec![Stat::new(
        "Number of resources in configuration",
        log.total_calls(),
    )]
}

fn time_stats(log: &ParsedLog) -> StatSection {
    let total_ms: u64 = log.iter().map(|(_, m)| m.total_time_ms).sum();

    let mut longest: Option<(&str, u64)> = None;
    for (address, metrics) in log {
        if longest.is_none_or(|(_, ms)| metrics.total_time_ms > ms) {
            longest = Some((address.as_str(), metrics.total_time_ms));
        }
    }

    let (longest_resource, longest_ms) = longest.unwrap_or((NONE, 0));
    vec![
        Stat::new("Cumulative duration", format_duration_ms(total_ms)),
        Stat::new("Longest apply time", format_duration_ms(longest_ms)),
        Stat::new("Longest apply resource", longest_resource),
    ]
}

fn operation_stats(log: &ParsedLog) -> StatSection {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for (_, metrics) in log {
        *counts.entry(metrics.operation.as_str()).or_default() += u64::from(metrics.num_calls);
    }
    counts
        .into_iter()
        .map(|(op, count)| Stat::new(format!("Resources marked for operation {op}"), count))
        .collect()
}

fn after_status_stats(log: &ParsedLog) -> StatSection {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for (_, metrics) in log {
        *counts.entry(metrics.after_status.as_str()).or_default() += u64::from(metrics.num_calls);
    }
    counts
        .into_iter()
        .map(|(status, count)| Stat::new(format!("Resources in state {status}"), count))
        .collect()
}

fn desired_state_stats(log: &ParsedLog) -> StatSection {
    let total = log.len();
    let in_desired = log.iter().filter(|(_, m)| m.in_desired_state()).count();
    let not_in_desired = total - in_desired;

    vec![
        Stat::new("Resources in desired state", out_of(in_desired, total)),
        Stat::new(
            "Resources not in desired state",
            out_of(not_in_desired, total),
        ),
    ]
}

fn out_of(count: usize, total: usize) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    };
    format!("{count} out of {total} ({percent:.1}%)")
}

fn module_stats(log: &ParsedLog) -> StatSection {
    let mut top_level: BTreeMap<&str, u64> = BTreeMap::new();
    let mut leaves: BTreeMap<&str, u64> = BTreeMap::new();
    let mut deepest: Option<(&str, usize)> = None;

    for (address, metrics) in log {
        let calls = u64::from(metrics.num_calls);
        if let Some(module) = top_level_module(address) {
            *top_level.entry(module).or_default() += calls;
        }
        if let Some(module) = leaf_module(address) {
            *leaves.entry(module).or_default() += calls;
        }

        let depth = module_depth(address);
        if depth > deepest.map_or(0, |(_, d)| d) {
            if let Some(path) = module_path(address) {
                deepest = Some((path, depth));
            }
        }
    }

    let (largest_top, largest_top_size) = largest(&top_level);
    let (largest_leaf, largest_leaf_size) = largest(&leaves);
    let (deepest_name, deepest_depth) = deepest.unwrap_or((NONE, 0));

    vec![
        Stat::new("Number of top-level modules", top_level.len()),
        Stat::new("Largest top-level module", largest_top),
        Stat::new("Size of largest top-level module", largest_top_size),
        Stat::new("Deepest module", deepest_name),
        Stat::new("Deepest module depth", deepest_depth),
        Stat::new("Largest leaf module", largest_leaf),
        Stat::new("Size of largest leaf module", largest_leaf_size),
    ]
}

/// Entry with the highest count; the first key wins ties
fn largest<'a>(counts: &BTreeMap<&'a str, u64>) -> (&'a str, u64) {
    let mut best = (NONE, 0);
    for (&name, &count) in counts {
        if count > best.1 {
            best = (name, count);
        }
    }
    best
}
