//! Reconstructs deployment history from the unordered set of deployment snapshots stored for an application.
//!
//! Snapshots carry no notion of when they stopped being active; that is implied by the next snapshot written to
//! the same environment. Sorting newest first means the successor of every snapshot has already been seen when
//! the snapshot itself is reached, so a single pass is enough to assign every validity interval.


use crate::models::{DeploymentSnapshot, PromotionOrigin};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A deployment snapshot placed on its environment's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTimelineEntry {
    pub snapshot: DeploymentSnapshot,

    /// When the deployment became active. Always the snapshot's creation time.
    pub active_from: DateTime<Utc>,

    /// When the deployment was replaced by the next deployment to the same environment. Empty for the deployment
    /// that is currently active.
    pub active_to: Option<DateTime<Utc>>,
}

impl DeploymentTimelineEntry {
    pub fn is_active(&self) -> bool {
        self.active_to.is_none()
    }
}

/// Returns the timeline entries for the given snapshots, newest first.
///
/// Snapshots are narrowed to `app_name` and `environment` when given. Intervals are computed per
/// (application, environment) pair, so within a pair they never overlap and line up end to start, with only the
/// newest snapshot left open ended. When `latest_only` is set only those open ended entries are returned.
///
/// Snapshots created at the exact same instant have no defined order relative to each other; the one that sorts
/// later is closed at that same instant.
pub fn project(
    snapshots: Vec<DeploymentSnapshot>,
    app_name: Option<&str>,
    environment: Option<&str>,
    latest_only: bool,
) -> Vec<DeploymentTimelineEntry> {
    let mut snapshots: Vec<DeploymentSnapshot> = snapshots
        .into_iter()
        .filter(|snapshot| app_name.map_or(true, |app| snapshot.app_name == app))
        .filter(|snapshot| environment.map_or(true, |env| snapshot.environment == env))
        .collect();

    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut next_newer: HashMap<(&str, &str), DateTime<Utc>> = HashMap::new();
    let mut active_to = Vec::with_capacity(snapshots.len());

    for snapshot in &snapshots {
        let key = (snapshot.app_name.as_str(), snapshot.environment.as_str());
        active_to.push(next_newer.insert(key, snapshot.created_at));
    }

    drop(next_newer);

    snapshots
        .into_iter()
        .zip(active_to)
        .filter(|(_, active_to)| !latest_only || active_to.is_none())
        .map(|(snapshot, active_to)| DeploymentTimelineEntry {
            active_from: snapshot.created_at,
            active_to,
            snapshot,
        })
        .collect()
}

/// Returns the timeline entry of a single named deployment, with its interval computed against the rest of its
/// environment's history.
pub fn find(
    snapshots: Vec<DeploymentSnapshot>,
    app_name: &str,
    deployment_name: &str,
) -> Option<DeploymentTimelineEntry> {
    project(snapshots, Some(app_name), None, false)
        .into_iter()
        .find(|entry| entry.snapshot.name == deployment_name)
}

/// Returns the deployment currently active in the given environment, if there is one.
pub fn latest_for_environment(
    snapshots: Vec<DeploymentSnapshot>,
    app_name: &str,
    environment: &str,
) -> Option<DeploymentTimelineEntry> {
    project(snapshots, Some(app_name), Some(environment), true)
        .into_iter()
        .next()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ComponentSummary {
    pub name: String,
    pub image: String,
}

/// The view of a deployment returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct DeploymentSummary {
    /// Unique identifier for the deployment.
    pub name: String,

    /// Unique identifier for the application.
    pub app_name: String,

    /// Environment the deployment targets.
    pub environment: String,

    /// Time the deployment became active.
    pub active_from: DateTime<Utc>,

    /// Time the deployment was replaced; empty while it is active.
    pub active_to: Option<DateTime<Utc>>,

    /// The pipeline job that produced the deployment.
    pub created_by_job: Option<String>,

    /// Set for deployments created by promotion.
    pub promoted_from: Option<PromotionOrigin>,

    pub components: Vec<ComponentSummary>,
}

impl From<&DeploymentTimelineEntry> for DeploymentSummary {
    fn from(entry: &DeploymentTimelineEntry) -> Self {
        let snapshot = &entry.snapshot;

        DeploymentSummary {
            name: snapshot.name.clone(),
            app_name: snapshot.app_name.clone(),
            environment: snapshot.environment.clone(),
            active_from: entry.active_from,
            active_to: entry.active_to,
            created_by_job: snapshot.created_by_job.clone(),
            promoted_from: snapshot.promoted_from.clone(),
            components: snapshot
                .components
                .iter()
                .map(|component| ComponentSummary {
                    name: component.name.clone(),
                    image: component.image.clone(),
                })
                .collect(),
        }
    }
}
