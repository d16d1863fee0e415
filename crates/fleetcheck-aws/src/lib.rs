//! fleetcheck-aws — the provider boundary.
//!
//! Defines the two collaborator traits the audit command consumes and
//! implements them against the AWS Auto Scaling and EC2 APIs. The
//! boundary's job is to turn loosely typed SDK responses into the
//! validated records in `fleetcheck-types`: any required field the API
//! fails to return is a broken contract and fails the fetch with a
//! [`ProviderError`] before the audit core ever runs.
//!
//! Credentials and region resolve through the SDK's default environment
//! chain, built once when the provider is constructed. The core never
//! sees them.

pub mod aws;
pub mod error;

pub use aws::AwsFleetProvider;
pub use error::{ProviderError, ProviderResult};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fleetcheck_types::{InstanceSnapshot, ScalingActivity, ScheduledAction};

/// Supplies the current membership of a named ASG.
#[async_trait]
pub trait FleetInventory: Send + Sync {
    /// Fetch the full membership plus the ASG's configured desired
    /// capacity in one capture.
    async fn fetch_instances(&self, asg_name: &str) -> ProviderResult<InstanceSnapshot>;
}

/// Supplies scheduled actions and scaling activity history for an ASG.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn fetch_scheduled_actions(
        &self,
        asg_name: &str,
    ) -> ProviderResult<Vec<ScheduledAction>>;

    /// Fetch scaling activities whose start time falls in
    /// `[window_start, window_end)`.
    async fn fetch_scaling_activities(
        &self,
        asg_name: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ProviderResult<Vec<ScalingActivity>>;
}
