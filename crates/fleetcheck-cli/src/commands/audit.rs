//! `fleetcheck audit` — run one audit pass against a named ASG.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use fleetcheck_aws::{ActivityLog, AwsFleetProvider, FleetInventory};

use crate::report::{self, AuditReport};

/// Run the `audit` command against AWS and print the report.
pub async fn audit(asg_name: &str, region: Option<String>, format: &str) -> Result<()> {
    let provider = AwsFleetProvider::from_env(region).await;
    let audit_report = run(&provider, &provider, asg_name, Utc::now()).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&audit_report)?),
        _ => println!("{}", report::format_report(&audit_report)),
    }

    Ok(())
}

/// Fetch the three data sets and run the audit core over them.
///
/// `now` is captured once and threaded into every component, so a run
/// is a pure function of what the providers returned at that instant.
/// The components are independent: a consistency failure does not
/// suppress the schedule or activity findings.
async fn run(
    inventory: &dyn FleetInventory,
    log: &dyn ActivityLog,
    asg_name: &str,
    now: DateTime<Utc>,
) -> Result<AuditReport> {
    let snapshot = inventory.fetch_instances(asg_name).await?;
    let actions = log.fetch_scheduled_actions(asg_name).await?;
    let (day_start, day_end) = fleetcheck_audit::day_window(now);
    let activities = log
        .fetch_scaling_activities(asg_name, day_start, day_end)
        .await?;

    info!(
        asg = asg_name,
        instances = snapshot.instances.len(),
        actions = actions.len(),
        activities = activities.len(),
        "audit data fetched"
    );

    Ok(AuditReport {
        asg_name: asg_name.to_string(),
        audited_at: now,
        verification: fleetcheck_audit::verify(&snapshot, now),
        next_action: fleetcheck_audit::next_scheduled_action(&actions, now),
        daily_activity: fleetcheck_audit::tally(&activities),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use fleetcheck_audit::Verdict;
    use fleetcheck_aws::ProviderResult;
    use fleetcheck_types::{
        ActivityStatus, Instance, InstanceSnapshot, LifecycleState, ScalingActivity,
        ScheduledAction,
    };

    /// In-memory provider pair serving canned data.
    struct FakeProvider {
        snapshot: InstanceSnapshot,
        actions: Vec<ScheduledAction>,
        activities: Vec<ScalingActivity>,
    }

    #[async_trait]
    impl FleetInventory for FakeProvider {
        async fn fetch_instances(&self, _asg_name: &str) -> ProviderResult<InstanceSnapshot> {
            Ok(self.snapshot.clone())
        }
    }

    #[async_trait]
    impl ActivityLog for FakeProvider {
        async fn fetch_scheduled_actions(
            &self,
            _asg_name: &str,
        ) -> ProviderResult<Vec<ScheduledAction>> {
            Ok(self.actions.clone())
        }

        async fn fetch_scaling_activities(
            &self,
            _asg_name: &str,
            window_start: DateTime<Utc>,
            window_end: DateTime<Utc>,
        ) -> ProviderResult<Vec<ScalingActivity>> {
            Ok(self
                .activities
                .iter()
                .filter(|a| a.start_time >= window_start && a.start_time < window_end)
                .cloned()
                .collect())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
    }

    fn instance(id: &str, az: &str) -> Instance {
        Instance {
            id: id.to_string(),
            lifecycle_state: LifecycleState::InService,
            availability_zone: az.to_string(),
            security_group_id: "sg-1".to_string(),
            image_id: "ami-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            launch_time: now() - chrono::Duration::hours(2),
        }
    }

    fn fake() -> FakeProvider {
        FakeProvider {
            snapshot: InstanceSnapshot {
                asg_name: "web".to_string(),
                desired_capacity: 2,
                instances: vec![instance("i-a", "us-east-1a"), instance("i-b", "us-east-1b")],
            },
            actions: vec![ScheduledAction {
                name: "evening-scale-up".to_string(),
                start_time: now() + chrono::Duration::hours(6),
            }],
            activities: vec![
                ScalingActivity {
                    status: ActivityStatus::Successful,
                    description: "Launching a new EC2 instance i-a".to_string(),
                    start_time: now() - chrono::Duration::hours(2),
                },
                // Yesterday; outside today's window.
                ScalingActivity {
                    status: ActivityStatus::Successful,
                    description: "Terminating EC2 instance i-old".to_string(),
                    start_time: now() - chrono::Duration::hours(30),
                },
            ],
        }
    }

    #[tokio::test]
    async fn run_combines_all_three_components() {
        let provider = fake();

        let report = run(&provider, &provider, "web", now()).await.unwrap();

        assert_eq!(report.asg_name, "web");
        assert!(report.verification.passed());
        let next = report.next_action.unwrap();
        assert_eq!(next.name, "evening-scale-up");
        assert_eq!(next.offset_secs, 6 * 3600);
        assert_eq!(report.daily_activity.launched, 1);
        assert_eq!(report.daily_activity.terminated, 0);
    }

    #[tokio::test]
    async fn consistency_failure_does_not_suppress_other_findings() {
        let mut provider = fake();
        provider.snapshot.desired_capacity = 3;

        let report = run(&provider, &provider, "web", now()).await.unwrap();

        assert!(matches!(report.verification.verdict, Verdict::Fail { .. }));
        assert!(report.next_action.is_some());
        assert_eq!(report.daily_activity.launched, 1);
    }
}
