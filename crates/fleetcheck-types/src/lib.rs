//! fleetcheck-types — shared domain types for a fleet audit run.
//!
//! These records are the strongly typed form of what the cloud provider
//! returns. The provider boundary validates every required field before
//! constructing them, so the audit core can assume well-formed input and
//! never needs defensive presence checks.
//!
//! Nothing here is persisted: every type is owned by a single audit run
//! and dropped with it.

pub mod types;

pub use types::*;
