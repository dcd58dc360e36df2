//! Shared types for tf-profile
//!
//! This crate contains the event and metrics model used across the
//! tf-profile crates, plus the helpers that derive module hierarchy from
//! resource addresses.

pub mod address;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

pub use address::{leaf_module, module_depth, module_path, top_level_module};

// ============================================================================
// Event Types
// ============================================================================

/// What a recognized log line says about a resource
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `Creating...`, `Destroying...`, `Modifying...`, `Reading...`
    StartAction,
    /// `Still creating... [10s elapsed]`
    Progress,
    /// `Creation complete after 2s`
    Complete,
    /// An error attributed to the resource
    Error,
    /// `Refreshing state...`
    Refresh,
}

/// The action the plan assigned to a resource
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Replace,
    Read,
    #[default]
    NoOp,
}

impl Operation {
    /// Display label, also used as the sort key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Replace => "Replace",
            Self::Read => "Read",
            Self::NoOp => "NoOp",
        }
    }

    /// The status this operation produces when it succeeds
    pub fn desired_status(&self) -> Status {
        match self {
            Self::Create | Self::Replace => Status::Created,
            Self::Delete => Status::Destroyed,
            Self::Update => Status::Updated,
            Self::Read => Status::Read,
            Self::NoOp => Status::Unknown,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed or expected state of a resource
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Status {
    Created,
    Destroyed,
    Updated,
    Read,
    Failed,
    #[default]
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Destroyed => "Destroyed",
            Self::Updated => "Updated",
            Self::Read => "Read",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEvent {
    /// 0-based position of the line in the input stream
    pub line_index: usize,

    /// Fully-qualified resource address
    pub address: String,

    pub kind: EventKind,

    pub operation: Operation,

    /// Duration reported on completion lines
    pub elapsed_ms: Option<u64>,
}

impl ResourceEvent {
    pub fn new(
        line_index: usize,
        address: impl Into<String>,
        kind: EventKind,
        operation: Operation,
    ) -> Self {
        Self {
            line_index,
            address: address.into(),
            kind,
            operation,
            elapsed_ms: None,
        }
    }

    /// Attach the duration of a completion line
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }
}

// ============================================================================
// Metrics Types
// ============================================================================

/// Aggregated metrics for a single resource address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metrics {
    /// Number of action cycles (retries and replacements count separately)
    pub num_calls: u32,

    /// Cumulative duration of all completed cycles, in milliseconds
    pub total_time_ms: u64,

    /// Line of the first start event
    pub modification_started_index: Option<usize>,

    /// Line of the last terminal event
    pub modification_completed_index: Option<usize>,

    pub operation: Operation,

    pub desired_status: Status,

    pub after_status: Status,
}

impl Metrics {
    /// Metrics for a resource whose first action cycle starts at `line_index`
    pub fn started(operation: Operation, line_index: usize) -> Self {
        Self {
            num_calls: 1,
            total_time_ms: 0,
            modification_started_index: Some(line_index),
            modification_completed_index: None,
            operation,
            desired_status: operation.desired_status(),
            after_status: Status::Unknown,
        }
    }

    /// Start index with `-1` standing in for "never observed"
    pub fn started_index_or_sentinel(&self) -> i64 {
        sentinel(self.modification_started_index)
    }

    /// Completion index with `-1` standing in for "never observed"
    pub fn completed_index_or_sentinel(&self) -> i64 {
        sentinel(self.modification_completed_index)
    }

    /// Whether the last terminal event left the resource where the plan wanted it
    pub fn in_desired_state(&self) -> bool {
        self.after_status == self.desired_status
    }
}

fn sentinel(index: Option<usize>) -> i64 {
    index.map_or(-1, |i| i as i64)
}

/// Per-resource metrics for one log, keyed by resource address
///
/// Iteration is always in ascending address order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedLog {
    resources: BTreeMap<String, Metrics>,
}

impl ParsedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &str) -> Option<&Metrics> {
        self.resources.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Metrics> {
        self.resources.get_mut(address)
    }

    /// Insert metrics for an address, replacing any previous entry
    pub fn insert(&mut self, address: impl Into<String>, metrics: Metrics) {
        self.resources.insert(address.into(), metrics);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Metrics> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Sum of action cycles over all resources
    pub fn total_calls(&self) -> u64 {
        self.resources.values().map(|m| u64::from(m.num_calls)).sum()
    }
}

impl<'a> IntoIterator for &'a ParsedLog {
    type Item = (&'a String, &'a Metrics);
    type IntoIter = btree_map::Iter<'a, String, Metrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_status_by_operation() {
        assert_eq!(Operation::Create.desired_status(), Status::Created);
        assert_eq!(Operation::Delete.desired_status(), Status::Destroyed);
        assert_eq!(Operation::Update.desired_status(), Status::Updated);
        assert_eq!(Operation::Read.desired_status(), Status::Read);
        assert_eq!(Operation::Replace.desired_status(), Status::Created);
    }

    #[test]
    fn test_started_metrics_use_sentinel_for_missing_completion() {
        let metrics = Metrics::started(Operation::Create, 4);
        assert_eq!(metrics.num_calls, 1);
        assert_eq!(metrics.started_index_or_sentinel(), 4);
        assert_eq!(metrics.completed_index_or_sentinel(), -1);
        assert_eq!(metrics.after_status, Status::Unknown);
        assert!(!metrics.in_desired_state());
    }

    #[test]
    fn test_parsed_log_iterates_by_address() {
        let mut log = ParsedLog::new();
        log.insert("b", Metrics::started(Operation::Create, 0));
        log.insert("a", Metrics::started(Operation::Create, 1));
        let addresses: Vec<_> = log.iter().map(|(address, _)| address.as_str()).collect();
        assert_eq!(addresses, vec!["a", "b"]);
        assert_eq!(log.total_calls(), 2);
    }
}
