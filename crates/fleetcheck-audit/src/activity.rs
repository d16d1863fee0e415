//! Daily launch/terminate activity tallies.
//!
//! Counts successful launch and terminate events in an activity set the
//! caller has already restricted to one day. Failed, cancelled, and
//! otherwise unrecognized activities are silently ignored; this is a
//! reporting tool, not a strict auditor of every activity record.

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use fleetcheck_types::{ActivityStatus, ScalingActivity};

/// Canonical description prefix of a launch activity.
pub const LAUNCH_PREFIX: &str = "Launching a new EC2 instance";

/// Canonical description prefix of a terminate activity.
pub const TERMINATE_PREFIX: &str = "Terminating EC2 instance";

/// Launch/terminate counts for one day window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityTally {
    pub launched: u32,
    pub terminated: u32,
}

/// Count successful launches and terminations.
///
/// An activity counts only when its status is `Successful` and its
/// description starts with one of the canonical prefixes. The prefixes
/// are disjoint, so no activity can count twice. The result does not
/// depend on input order.
pub fn tally(activities: &[ScalingActivity]) -> ActivityTally {
    let mut counts = ActivityTally::default();
    for activity in activities {
        if activity.status != ActivityStatus::Successful {
            continue;
        }
        if activity.description.starts_with(LAUNCH_PREFIX) {
            counts.launched += 1;
        } else if activity.description.starts_with(TERMINATE_PREFIX) {
            counts.terminated += 1;
        }
    }
    counts
}

/// The UTC day window `[start of day, start of day + 1 day)` containing
/// `now`. Used by callers to scope the activity fetch.
pub fn day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}
