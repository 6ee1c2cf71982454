use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single component (container) as it is described inside a deployment snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ComponentSpec {
    /// Name of the component; unique within an application.
    pub name: String,

    /// Fully qualified container image, tag included.
    pub image: String,

    /// Environment variables passed to the component's container.
    pub environment_variables: BTreeMap<String, String>,
}

impl ComponentSpec {
    pub fn new(name: &str, image: &str) -> Self {
        ComponentSpec {
            name: name.into(),
            image: image.into(),
            environment_variables: BTreeMap::new(),
        }
    }

    pub fn with_variables(mut self, variables: &[(&str, &str)]) -> Self {
        self.environment_variables = variables
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        self
    }
}

/// Where a promoted deployment was copied from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PromotionOrigin {
    /// Name of the source deployment.
    pub deployment: String,

    /// Environment the source deployment lived in.
    pub environment: String,
}

/// A deployment snapshot is an immutable description of what is (or was) running for one application in one
/// environment. Snapshots are never updated; every deploy or promotion writes a new one and the history of an
/// environment is reconstructed by ordering them on `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct DeploymentSnapshot {
    /// Unique identifier for the deployment within its environment.
    pub name: String,

    /// Unique identifier of the application the deployment belongs to.
    pub app_name: String,

    /// The environment the deployment targets.
    pub environment: String,

    /// Time the snapshot was created. This is the only ordering key between snapshots.
    pub created_at: DateTime<Utc>,

    pub components: Vec<ComponentSpec>,

    /// Name of the pipeline job that produced this deployment, if any.
    pub created_by_job: Option<String>,

    /// Set when the deployment was produced by promoting another deployment.
    pub promoted_from: Option<PromotionOrigin>,

    /// Storage-owned; the namespace the resource is stored under.
    pub namespace: Option<String>,

    /// Storage-owned; optimistic concurrency token of the stored resource.
    pub resource_version: Option<String>,
}

impl DeploymentSnapshot {
    pub fn new(name: &str, app_name: &str, environment: &str, created_at: DateTime<Utc>) -> Self {
        DeploymentSnapshot {
            name: name.into(),
            app_name: app_name.into(),
            environment: environment.into(),
            created_at,
            components: vec![],
            created_by_job: None,
            promoted_from: None,
            namespace: None,
            resource_version: None,
        }
    }

    /// Returns the component with the given name, compared case-insensitively.
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components
            .iter()
            .find(|component| component.name.eq_ignore_ascii_case(name))
    }
}
