//! Domain types for auto-scaling group audits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cloud-assigned instance identifier (e.g. `i-0abc123`).
pub type InstanceId = String;

// ── Instances ──────────────────────────────────────────────────────

/// Membership phase of an instance within its auto-scaling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LifecycleState {
    Pending,
    InService,
    Terminating,
    Terminated,
    Standby,
    Detached,
    /// A state this tool does not model (e.g. warm-pool phases).
    Unknown,
}

impl LifecycleState {
    /// Parse the provider's string form.
    ///
    /// Transitional sub-states ("Pending:Wait", "Terminating:Proceed")
    /// collapse into their base state. Unrecognized strings map to
    /// `Unknown` instead of failing the whole snapshot; only `InService`
    /// ever affects a check outcome.
    pub fn parse(s: &str) -> Self {
        let base = s.split(':').next().unwrap_or(s);
        match base {
            "Pending" => Self::Pending,
            "InService" => Self::InService,
            "Terminating" => Self::Terminating,
            "Terminated" => Self::Terminated,
            "Standby" | "EnteringStandby" => Self::Standby,
            "Detached" | "Detaching" => Self::Detached,
            _ => Self::Unknown,
        }
    }
}

/// One instance as seen at snapshot time, with the configuration fields
/// the homogeneity check compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub lifecycle_state: LifecycleState,
    pub availability_zone: String,
    /// First attached security group, matching what the audit compares.
    pub security_group_id: String,
    pub image_id: String,
    pub vpc_id: String,
    pub launch_time: DateTime<Utc>,
}

/// Point-in-time capture of an ASG's membership.
///
/// The configured desired capacity is captured in the same fetch as the
/// instance list, so the capacity check always compares against the ASG
/// descriptor rather than inferring a target from the list length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    /// Name of the ASG every entry belongs to.
    pub asg_name: String,
    pub desired_capacity: u32,
    pub instances: Vec<Instance>,
}

// ── Scheduled actions ──────────────────────────────────────────────

/// A time-triggered capacity change configured on an ASG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub name: String,
    pub start_time: DateTime<Utc>,
}

// ── Scaling activities ─────────────────────────────────────────────

/// Outcome status of a recorded scaling activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ActivityStatus {
    Successful,
    Failed,
    InProgress,
    Cancelled,
    Unknown,
}

impl ActivityStatus {
    /// Parse the provider's status code, mapping the many in-flight
    /// sub-codes ("PreInService", "WaitingForELBConnectionDraining", …)
    /// to `InProgress` and anything else unrecognized to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Successful" => Self::Successful,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            "InProgress" | "PendingSpotBidPlacement" | "PreInService" => Self::InProgress,
            s if s.starts_with("WaitingFor") => Self::InProgress,
            _ => Self::Unknown,
        }
    }
}

/// A historical record of a capacity-changing event.
///
/// The kind of event (launch vs. terminate) is encoded in the free-text
/// description, as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingActivity {
    pub status: ActivityStatus,
    pub description: String,
    pub start_time: DateTime<Utc>,
}
