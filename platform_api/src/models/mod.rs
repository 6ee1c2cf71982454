pub mod application;
pub mod deployment;
pub mod job;
pub mod registration;

pub use application::{ApplicationConfig, ComponentConfig, EnvironmentConfig};
pub use deployment::{ComponentSpec, DeploymentSnapshot, PromotionOrigin};
pub use job::{ContainerState, JobState, JobStatus, PipelineKind, StepStatus};
pub use registration::RegistrationRecord;
