use tracing::debug;

use tfprofile_types::{EventKind, Metrics, Operation, ParsedLog, ResourceEvent, Status};

/// Fold parsed events into one `Metrics` entry per resource address
///
/// Events are applied in order. Lines from concurrently running operations
/// interleave freely; only the address ties an event to its resource.
pub fn aggregate(events: &[ResourceEvent]) -> ParsedLog {
    let mut log = ParsedLog::new();

    for event in events {
        match event.kind {
            EventKind::StartAction => start_cycle(&mut log, event),
            EventKind::Complete => match log.get_mut(&event.address) {
                Some(metrics) => {
                    metrics.total_time_ms = metrics
                        .total_time_ms
                        .saturating_add(event.elapsed_ms.unwrap_or(0));
                    metrics.modification_completed_index = Some(event.line_index);
                    metrics.after_status = metrics.desired_status;
                }
                None => skip_unstarted(event),
            },
            EventKind::Error => match log.get_mut(&event.address) {
                Some(metrics) => {
                    metrics.modification_completed_index = Some(event.line_index);
                    metrics.after_status = Status::Failed;
                }
                None => skip_unstarted(event),
            },
            EventKind::Progress | EventKind::Refresh => {}
        }
    }

    debug!(
        resources = log.len(),
        calls = log.total_calls(),
        "aggregated log"
    );
    log
}

fn start_cycle(log: &mut ParsedLog, event: &ResourceEvent) {
    let Some(metrics) = log.get_mut(&event.address) else {
        log.insert(
            event.address.clone(),
            Metrics::started(event.operation, event.line_index),
        );
        return;
    };

    metrics.num_calls += 1;
    if is_replacement(metrics.operation, event.operation) {
        metrics.operation = Operation::Replace;
        metrics.desired_status = Operation::Replace.desired_status();
    }
}

/// A destroy and a create on the same address within one run
fn is_replacement(previous: Operation, next: Operation) -> bool {
    matches!(
        (previous, next),
        (Operation::Delete, Operation::Create) | (Operation::Create, Operation::Delete)
    )
}

fn skip_unstarted(event: &ResourceEvent) {
    debug!(
        line = event.line_index,
        address = %event.address,
        kind = ?event.kind,
        "terminal event for a resource that never started, skipping"
    );
}
