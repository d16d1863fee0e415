//! fleetcheck-audit — the verification core.
//!
//! Three stateless components consume already-fetched provider data and
//! produce judgments. None of them performs I/O or reads a clock; the
//! current timestamp is an explicit input, so every run is a pure
//! function of its arguments.
//!
//! # Components
//!
//! ```text
//! consistency::verify(snapshot, now)
//!   ├── capacity:    InService count == desired capacity
//!   ├── AZ spread:   >1 instance → at least 2 distinct zones
//!   ├── homogeneity: SG / image / VPC equal across the fleet
//!   └── on pass:     longest-running instance (id + uptime)
//!
//! schedule::next_scheduled_action(actions, now)
//!   └── earliest start time + signed offset from now
//!
//! activity::tally(activities)
//!   └── successful launch / terminate counts for a day window
//! ```
//!
//! Check failures are ordinary return values, never errors: a fleet that
//! fails a check is a finding, not a fault. The only errors in this
//! system belong to the provider boundary, which runs before the core.

pub mod activity;
pub mod consistency;
pub mod schedule;

pub use activity::{ActivityTally, day_window, tally};
pub use consistency::{CheckFailure, LongestRunning, Verdict, VerificationResult, verify};
pub use schedule::{NextAction, next_scheduled_action};
