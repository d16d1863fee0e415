//! AWS implementation of the provider traits.
//!
//! The Auto Scaling API supplies membership (id, lifecycle state, AZ)
//! and the group's desired capacity, but not the per-instance
//! configuration the homogeneity check compares. Those fields come from
//! an EC2 `DescribeInstances` join keyed by instance id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use fleetcheck_types::{
    ActivityStatus, Instance, InstanceSnapshot, LifecycleState, ScalingActivity, ScheduledAction,
};

use crate::error::{ProviderError, ProviderResult};
use crate::{ActivityLog, FleetInventory};

/// Provider backed by the AWS Auto Scaling and EC2 APIs.
pub struct AwsFleetProvider {
    asg: aws_sdk_autoscaling::Client,
    ec2: aws_sdk_ec2::Client,
}

impl AwsFleetProvider {
    /// Build a provider from the environment's credential and region
    /// chain, with an optional explicit region override.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(&config)
    }

    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            asg: aws_sdk_autoscaling::Client::new(config),
            ec2: aws_sdk_ec2::Client::new(config),
        }
    }

    /// Fetch EC2 configuration details for the given instance ids.
    async fn describe_details(&self, ids: &[String]) -> ProviderResult<HashMap<String, Ec2Detail>> {
        let mut details = HashMap::new();
        if ids.is_empty() {
            return Ok(details);
        }

        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .ec2
                .describe_instances()
                .set_instance_ids(Some(ids.to_vec()))
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| ProviderError::Api(e.to_string()))?;

            for reservation in output.reservations() {
                for instance in reservation.instances() {
                    let id = instance
                        .instance_id()
                        .ok_or(missing("EC2 instance", "InstanceId"))?
                        .to_string();
                    let security_group_id = instance
                        .security_groups()
                        .first()
                        .and_then(|g| g.group_id())
                        .ok_or(missing("EC2 instance", "SecurityGroups"))?
                        .to_string();
                    let image_id = instance
                        .image_id()
                        .ok_or(missing("EC2 instance", "ImageId"))?
                        .to_string();
                    let vpc_id = instance
                        .vpc_id()
                        .ok_or(missing("EC2 instance", "VpcId"))?
                        .to_string();
                    let launch_time = instance
                        .launch_time()
                        .ok_or(missing("EC2 instance", "LaunchTime"))
                        .and_then(|t| {
                            to_utc(t).ok_or_else(|| ProviderError::InvalidTimestamp(id.clone()))
                        })?;

                    details.insert(
                        id,
                        Ec2Detail {
                            security_group_id,
                            image_id,
                            vpc_id,
                            launch_time,
                        },
                    );
                }
            }

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(details)
    }
}

#[async_trait]
impl FleetInventory for AwsFleetProvider {
    async fn fetch_instances(&self, asg_name: &str) -> ProviderResult<InstanceSnapshot> {
        let output = self
            .asg
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(asg_name)
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        let group = output
            .auto_scaling_groups()
            .iter()
            .find(|g| g.auto_scaling_group_name() == Some(asg_name))
            .ok_or_else(|| ProviderError::AsgNotFound(asg_name.to_string()))?;

        let desired_capacity = group
            .desired_capacity()
            .ok_or(missing("auto-scaling group", "DesiredCapacity"))?
            .max(0) as u32;

        let mut members = Vec::new();
        for member in group.instances() {
            let id = member
                .instance_id()
                .ok_or(missing("ASG instance", "InstanceId"))?
                .to_string();
            let state = member
                .lifecycle_state()
                .ok_or(missing("ASG instance", "LifecycleState"))?;
            let availability_zone = member
                .availability_zone()
                .ok_or(missing("ASG instance", "AvailabilityZone"))?
                .to_string();
            members.push(AsgMember {
                id,
                lifecycle_state: LifecycleState::parse(state.as_str()),
                availability_zone,
            });
        }

        let ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
        let details = self.describe_details(&ids).await?;

        let snapshot = join_membership(asg_name, desired_capacity, members, details)?;
        debug!(
            asg = asg_name,
            desired = snapshot.desired_capacity,
            instances = snapshot.instances.len(),
            "fetched instance snapshot"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl ActivityLog for AwsFleetProvider {
    async fn fetch_scheduled_actions(
        &self,
        asg_name: &str,
    ) -> ProviderResult<Vec<ScheduledAction>> {
        let mut actions = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .asg
                .describe_scheduled_actions()
                .auto_scaling_group_name(asg_name)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| ProviderError::Api(e.to_string()))?;

            for action in output.scheduled_update_group_actions() {
                let name = action
                    .scheduled_action_name()
                    .ok_or(missing("scheduled action", "ScheduledActionName"))?
                    .to_string();
                let start_time = action
                    .start_time()
                    .ok_or(missing("scheduled action", "StartTime"))
                    .and_then(|t| {
                        to_utc(t).ok_or_else(|| ProviderError::InvalidTimestamp(name.clone()))
                    })?;
                actions.push(ScheduledAction { name, start_time });
            }

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        debug!(asg = asg_name, count = actions.len(), "fetched scheduled actions");
        Ok(actions)
    }

    async fn fetch_scaling_activities(
        &self,
        asg_name: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ProviderResult<Vec<ScalingActivity>> {
        // The API takes no time-window parameters, so the window is
        // applied client-side while paging.
        let mut activities = Vec::new();
        let mut next_token: Option<String> = None;
        'pages: loop {
            let output = self
                .asg
                .describe_scaling_activities()
                .auto_scaling_group_name(asg_name)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| ProviderError::Api(e.to_string()))?;

            for activity in output.activities() {
                let description = activity.description().unwrap_or_default().to_string();
                let start_time = activity
                    .start_time()
                    .ok_or(missing("scaling activity", "StartTime"))
                    .and_then(|t| {
                        to_utc(t)
                            .ok_or_else(|| ProviderError::InvalidTimestamp(description.clone()))
                    })?;

                // Activities come back newest first; once a record
                // predates the window there is nothing older to page.
                if start_time < window_start {
                    break 'pages;
                }
                if !in_window(start_time, window_start, window_end) {
                    continue;
                }

                let status = activity
                    .status_code()
                    .ok_or(missing("scaling activity", "StatusCode"))?;
                activities.push(ScalingActivity {
                    status: ActivityStatus::parse(status.as_str()),
                    description,
                    start_time,
                });
            }

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        debug!(asg = asg_name, count = activities.len(), "fetched scaling activities");
        Ok(activities)
    }
}

/// ASG-side membership fields, before the EC2 join.
struct AsgMember {
    id: String,
    lifecycle_state: LifecycleState,
    availability_zone: String,
}

/// EC2-side configuration fields for one instance.
struct Ec2Detail {
    security_group_id: String,
    image_id: String,
    vpc_id: String,
    launch_time: DateTime<Utc>,
}

/// Join ASG membership against EC2 details into a validated snapshot.
///
/// A member with no EC2 detail means the two fetches disagree; that is
/// a broken contract, not a fleet finding, so the whole fetch fails.
fn join_membership(
    asg_name: &str,
    desired_capacity: u32,
    members: Vec<AsgMember>,
    mut details: HashMap<String, Ec2Detail>,
) -> ProviderResult<InstanceSnapshot> {
    let mut instances = Vec::with_capacity(members.len());
    for member in members {
        let detail = details
            .remove(&member.id)
            .ok_or(missing("ASG instance", "EC2 description"))?;
        instances.push(Instance {
            id: member.id,
            lifecycle_state: member.lifecycle_state,
            availability_zone: member.availability_zone,
            security_group_id: detail.security_group_id,
            image_id: detail.image_id,
            vpc_id: detail.vpc_id,
            launch_time: detail.launch_time,
        });
    }

    Ok(InstanceSnapshot {
        asg_name: asg_name.to_string(),
        desired_capacity,
        instances,
    })
}

fn in_window(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    t >= start && t < end
}

fn to_utc(t: &aws_sdk_autoscaling::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

fn missing(entity: &'static str, field: &'static str) -> ProviderError {
    ProviderError::MissingField { entity, field }
}
