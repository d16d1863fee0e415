//! Fleet consistency checks.
//!
//! Validates capacity, availability-zone spread, and configuration
//! homogeneity over an instance snapshot, then ranks instances by
//! uptime. Checks run in order and short-circuit at the first failure.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use fleetcheck_types::{InstanceId, InstanceSnapshot, LifecycleState};

/// Why a consistency check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckFailure {
    /// InService count does not match the ASG's desired capacity.
    CapacityMismatch { in_service: u32, desired: u32 },
    /// A multi-instance fleet is confined to fewer than two zones.
    InsufficientAzSpread { zones: u32 },
    /// An instance's security group, image, or VPC differs from the
    /// first instance in the snapshot.
    ConfigurationDrift { instance_id: InstanceId },
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityMismatch { in_service, desired } => write!(
                f,
                "in-service count {in_service} does not match desired capacity {desired}"
            ),
            Self::InsufficientAzSpread { zones } => write!(
                f,
                "instances are confined to {zones} availability zone(s)"
            ),
            Self::ConfigurationDrift { instance_id } => write!(
                f,
                "instance {instance_id} differs in security group, image, or VPC"
            ),
        }
    }
}

/// The instance that has been running the longest, with its uptime in
/// whole seconds at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestRunning {
    pub instance_id: InstanceId,
    pub uptime_secs: i64,
}

/// Pass/fail outcome of a verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail { reason: CheckFailure },
}

/// Result of one consistency verification run.
///
/// Built fresh per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub verdict: Verdict,
    /// Present on pass when the snapshot holds at least one instance.
    pub longest_running: Option<LongestRunning>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Pass)
    }

    fn fail(reason: CheckFailure) -> Self {
        Self {
            verdict: Verdict::Fail { reason },
            longest_running: None,
        }
    }
}

/// Verify a snapshot against the fleet-health invariants.
///
/// Checks run in order — capacity, AZ spread, homogeneity — and stop at
/// the first failure. On pass, the longest-running instance is reported
/// with its uptime relative to `now`.
///
/// Empty and single-instance fleets pass the spread and homogeneity
/// checks vacuously; an empty snapshot passes overall only when desired
/// capacity is zero, and then reports no longest-running instance.
pub fn verify(snapshot: &InstanceSnapshot, now: DateTime<Utc>) -> VerificationResult {
    let in_service = snapshot
        .instances
        .iter()
        .filter(|i| i.lifecycle_state == LifecycleState::InService)
        .count() as u32;

    if in_service != snapshot.desired_capacity {
        debug!(
            asg = %snapshot.asg_name,
            in_service,
            desired = snapshot.desired_capacity,
            "capacity mismatch"
        );
        return VerificationResult::fail(CheckFailure::CapacityMismatch {
            in_service,
            desired: snapshot.desired_capacity,
        });
    }

    if snapshot.instances.len() > 1 {
        let zones: HashSet<&str> = snapshot
            .instances
            .iter()
            .map(|i| i.availability_zone.as_str())
            .collect();
        if zones.len() < 2 {
            debug!(asg = %snapshot.asg_name, zones = zones.len(), "insufficient AZ spread");
            return VerificationResult::fail(CheckFailure::InsufficientAzSpread {
                zones: zones.len() as u32,
            });
        }
    }

    if let Some(first) = snapshot.instances.first() {
        for instance in &snapshot.instances {
            if instance.security_group_id != first.security_group_id
                || instance.image_id != first.image_id
                || instance.vpc_id != first.vpc_id
            {
                debug!(
                    asg = %snapshot.asg_name,
                    instance = %instance.id,
                    "configuration drift"
                );
                return VerificationResult::fail(CheckFailure::ConfigurationDrift {
                    instance_id: instance.id.clone(),
                });
            }
        }
    }

    VerificationResult {
        verdict: Verdict::Pass,
        longest_running: longest_running(snapshot, now),
    }
}

/// Pick the instance with maximal uptime. Ties resolve to the earliest
/// entry in snapshot order.
fn longest_running(snapshot: &InstanceSnapshot, now: DateTime<Utc>) -> Option<LongestRunning> {
    let mut best: Option<LongestRunning> = None;
    for instance in &snapshot.instances {
        let uptime_secs = (now - instance.launch_time).num_seconds();
        if best.as_ref().is_none_or(|b| uptime_secs > b.uptime_secs) {
            best = Some(LongestRunning {
                instance_id: instance.id.clone(),
                uptime_secs,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleetcheck_types::Instance;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
    }

    fn instance(id: &str, az: &str, uptime_secs: i64) -> Instance {
        Instance {
            id: id.to_string(),
            lifecycle_state: LifecycleState::InService,
            availability_zone: az.to_string(),
            security_group_id: "sg-1".to_string(),
            image_id: "ami-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            launch_time: now() - chrono::Duration::seconds(uptime_secs),
        }
    }

    fn snapshot(desired: u32, instances: Vec<Instance>) -> InstanceSnapshot {
        InstanceSnapshot {
            asg_name: "web".to_string(),
            desired_capacity: desired,
            instances,
        }
    }

    #[test]
    fn healthy_fleet_passes() {
        let snap = snapshot(
            2,
            vec![
                instance("i-a", "us-east-1a", 3600),
                instance("i-b", "us-east-1b", 600),
            ],
        );

        let result = verify(&snap, now());
        assert!(result.passed());
        let longest = result.longest_running.unwrap();
        assert_eq!(longest.instance_id, "i-a");
        assert_eq!(longest.uptime_secs, 3600);
    }

    #[test]
    fn capacity_mismatch_fails() {
        let mut snap = snapshot(
            2,
            vec![
                instance("i-a", "us-east-1a", 3600),
                instance("i-b", "us-east-1b", 600),
            ],
        );
        snap.instances[1].lifecycle_state = LifecycleState::Pending;

        let result = verify(&snap, now());
        assert_eq!(
            result.verdict,
            Verdict::Fail {
                reason: CheckFailure::CapacityMismatch {
                    in_service: 1,
                    desired: 2
                }
            }
        );
        assert!(result.longest_running.is_none());
    }

    #[test]
    fn single_zone_fleet_fails_spread() {
        let snap = snapshot(
            2,
            vec![
                instance("i-a", "us-east-1a", 3600),
                instance("i-b", "us-east-1a", 600),
            ],
        );

        let result = verify(&snap, now());
        assert_eq!(
            result.verdict,
            Verdict::Fail {
                reason: CheckFailure::InsufficientAzSpread { zones: 1 }
            }
        );
    }

    #[test]
    fn single_instance_passes_spread_vacuously() {
        let snap = snapshot(1, vec![instance("i-a", "us-east-1a", 3600)]);

        let result = verify(&snap, now());
        assert!(result.passed());
        assert_eq!(result.longest_running.unwrap().instance_id, "i-a");
    }

    #[test]
    fn drift_names_the_diverging_instance() {
        let mut snap = snapshot(
            2,
            vec![
                instance("i-a", "us-east-1a", 3600),
                instance("i-b", "us-east-1b", 600),
            ],
        );
        snap.instances[1].image_id = "ami-2".to_string();

        let result = verify(&snap, now());
        assert_eq!(
            result.verdict,
            Verdict::Fail {
                reason: CheckFailure::ConfigurationDrift {
                    instance_id: "i-b".to_string()
                }
            }
        );
    }

    #[test]
    fn capacity_failure_reported_before_drift() {
        // Both checks would fail; capacity comes first.
        let mut snap = snapshot(3, vec![instance("i-a", "us-east-1a", 10)]);
        snap.instances[0].vpc_id = "vpc-other".to_string();

        let result = verify(&snap, now());
        assert!(matches!(
            result.verdict,
            Verdict::Fail {
                reason: CheckFailure::CapacityMismatch { .. }
            }
        ));
    }

    #[test]
    fn empty_snapshot_with_zero_desired_passes_without_uptime() {
        let snap = snapshot(0, vec![]);

        let result = verify(&snap, now());
        assert!(result.passed());
        assert!(result.longest_running.is_none());
    }

    #[test]
    fn empty_snapshot_with_positive_desired_fails_capacity() {
        let snap = snapshot(2, vec![]);

        let result = verify(&snap, now());
        assert_eq!(
            result.verdict,
            Verdict::Fail {
                reason: CheckFailure::CapacityMismatch {
                    in_service: 0,
                    desired: 2
                }
            }
        );
    }

    #[test]
    fn uptime_tie_resolves_to_snapshot_order() {
        let snap = snapshot(
            2,
            vec![
                instance("i-first", "us-east-1a", 500),
                instance("i-second", "us-east-1b", 500),
            ],
        );

        let result = verify(&snap, now());
        assert_eq!(result.longest_running.unwrap().instance_id, "i-first");
    }

    #[test]
    fn longest_uptime_dominates_every_instance() {
        let snap = snapshot(
            3,
            vec![
                instance("i-a", "us-east-1a", 120),
                instance("i-b", "us-east-1b", 7200),
                instance("i-c", "us-east-1c", 3600),
            ],
        );

        let result = verify(&snap, now());
        assert_eq!(result.longest_running.unwrap().uptime_secs, 7200);
    }

    #[test]
    fn verify_is_deterministic() {
        let snap = snapshot(
            2,
            vec![
                instance("i-a", "us-east-1a", 3600),
                instance("i-b", "us-east-1b", 600),
            ],
        );

        assert_eq!(verify(&snap, now()), verify(&snap, now()));
    }
}
