//! Derives the externally visible status of pipeline jobs and their steps.
//!
//! The reconciler writes a condition onto the job and users write a stop flag; the two are never updated
//! together, so the status a client sees has to be derived from both every time it is read.


use crate::{
    errors::ErrorKind,
    models::{ContainerState, JobState, JobStatus, PipelineKind, StepStatus},
};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Condition written by the reconciler once a stop request has been carried out.
const STOPPED_CONDITION: &str = "Stopped";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum JobStatusError {
    #[error("could not resolve job status; unknown condition '{0}'")]
    UnknownCondition(String),
}

impl JobStatusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobStatusError::UnknownCondition(_) => ErrorKind::DataInconsistency,
        }
    }
}

/// Returns the job's lifecycle state. First match wins:
///
/// * stop requested, not yet confirmed: `Stopping`
/// * stop requested and confirmed: `Stopped`
/// * reconciler has reported a condition: that condition (`Queued` is read as `Waiting`)
/// * nothing reported yet: `Waiting`
pub fn resolve_job_status(condition: &str, stop: bool) -> Result<JobState, JobStatusError> {
    if stop {
        if condition == STOPPED_CONDITION {
            return Ok(JobState::Stopped);
        }

        return Ok(JobState::Stopping);
    }

    if condition.is_empty() {
        return Ok(JobState::Waiting);
    }

    JobState::from_str(condition).map_err(|_| JobStatusError::UnknownCondition(condition.into()))
}

/// Returns a step's state from its container. A container that does not exist yet is waiting, never an error.
pub fn resolve_step_status(container: Option<&ContainerState>) -> JobState {
    match container {
        Some(ContainerState::Terminated { exit_code: 0, .. }) => JobState::Succeeded,
        Some(ContainerState::Terminated { .. }) => JobState::Failed,
        Some(ContainerState::Running { .. }) => JobState::Running,
        Some(ContainerState::Waiting { .. }) | None => JobState::Waiting,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct StepSummary {
    pub name: String,
    pub status: JobState,
    pub started: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,
}

impl From<&StepStatus> for StepSummary {
    fn from(step: &StepStatus) -> Self {
        let (started, ended) = match &step.container {
            Some(ContainerState::Running { started_at }) => (*started_at, None),
            Some(ContainerState::Terminated {
                started_at,
                finished_at,
                ..
            }) => (*started_at, *finished_at),
            Some(ContainerState::Waiting { .. }) | None => (None, None),
        };

        StepSummary {
            name: step.name.clone(),
            status: resolve_step_status(step.container.as_ref()),
            started,
            ended,
        }
    }
}

/// The view of a pipeline job returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct JobSummary {
    pub name: String,
    pub app_name: String,
    pub pipeline: PipelineKind,
    pub status: JobState,

    /// Time of job creation.
    pub created: DateTime<Utc>,

    /// Time the reconciler started the job.
    pub started: Option<DateTime<Utc>>,

    /// Time the job reached a terminal state.
    pub ended: Option<DateTime<Utc>>,

    pub steps: Vec<StepSummary>,
}

pub fn summarize_job(job: &JobStatus) -> Result<JobSummary, JobStatusError> {
    let status = resolve_job_status(&job.condition, job.stop)?;

    Ok(JobSummary {
        name: job.name.clone(),
        app_name: job.app_name.clone(),
        pipeline: job.pipeline,
        status,
        created: job.created,
        started: job.started,
        ended: job.ended,
        steps: job.steps.iter().map(StepSummary::from).collect(),
    })
}

/// Orders jobs newest first by creation time. Jobs created at the same instant keep their relative order.
pub fn sort_jobs_newest_first(jobs: &mut [JobSummary]) {
    jobs.sort_by(|a, b| b.created.cmp(&a.created));
}
