use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The externally visible lifecycle state of a pipeline job or one of its steps.
#[derive(
    Debug, Clone, Copy, Display, Default, PartialEq, EnumString, Eq, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[schemars(rename = "job_state")]
pub enum JobState {
    /// Accepted but not yet picked up by the reconciler. Older jobs report this as "Queued".
    #[default]
    #[strum(to_string = "Waiting", serialize = "Queued")]
    #[serde(alias = "Queued")]
    Waiting,

    Running,

    /// Finished with a proper exit code.
    Succeeded,

    /// Has encountered an issue, either a step failure or a scheduling issue.
    Failed,

    /// A stop has been requested but the reconciler has not confirmed it yet.
    Stopping,

    /// Stopped by user request.
    Stopped,

    /// Stopped by the pipeline itself because there was nothing to build or deploy.
    StoppedNoChanges,
}

impl JobState {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Stopped | JobState::StoppedNoChanges
        )
    }
}

#[derive(
    Debug, Clone, Copy, Display, PartialEq, EnumString, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
#[schemars(rename = "pipeline_kind")]
pub enum PipelineKind {
    Build,
    BuildDeploy,
    Promote,
    Deploy,
}

/// Lifecycle of the container backing a job step, as reported by the cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Waiting {
        reason: Option<String>,
    },
    Running {
        started_at: Option<DateTime<Utc>>,
    },
    Terminated {
        exit_code: i32,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    },
}

/// Raw status of a single job step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct StepStatus {
    pub name: String,

    /// Absent until the cluster has created the step's container.
    pub container: Option<ContainerState>,
}

/// Raw status of a pipeline job exactly as stored on the job resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct JobStatus {
    pub name: String,
    pub app_name: String,
    pub pipeline: PipelineKind,

    /// Condition as written by the reconciler. Empty until the reconciler has seen the job.
    #[serde(default)]
    pub condition: String,

    /// Set when a user has asked for the job to be stopped.
    #[serde(default)]
    pub stop: bool,

    pub created: DateTime<Utc>,
    pub started: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,

    #[serde(default)]
    pub steps: Vec<StepStatus>,
}
