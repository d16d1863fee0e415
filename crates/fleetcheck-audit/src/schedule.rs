//! Scheduled-action analysis.
//!
//! Finds the earliest scheduled action in a set and its signed offset
//! from the current time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use fleetcheck_types::ScheduledAction;

/// The earliest scheduled action, relative to verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAction {
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Whole seconds from now until the start time. Negative when the
    /// action's start is already in the past.
    pub offset_secs: i64,
}

/// Select the action with the minimal start time.
///
/// The earliest action in the given set is reported whether or not it
/// is in the future; callers that only care about upcoming actions can
/// pre-filter. Ties resolve to input order. Returns `None` when no
/// actions are configured.
pub fn next_scheduled_action(
    actions: &[ScheduledAction],
    now: DateTime<Utc>,
) -> Option<NextAction> {
    let mut earliest: Option<&ScheduledAction> = None;
    for action in actions {
        if earliest.is_none_or(|e| action.start_time < e.start_time) {
            earliest = Some(action);
        }
    }

    let Some(action) = earliest else {
        debug!("no scheduled actions");
        return None;
    };

    Some(NextAction {
        name: action.name.clone(),
        start_time: action.start_time,
        offset_secs: (action.start_time - now).num_seconds(),
    })
}
