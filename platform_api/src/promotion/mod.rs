//! Promotion copies a deployment from one environment into another.
//!
//! Images and component layout travel with the deployment, but environment variables never do: they are
//! re-read from the application config for the target environment so that a promoted deployment is
//! indistinguishable from one built for that environment directly.


use crate::{
    conf,
    errors::ErrorKind,
    models::{ApplicationConfig, ComponentSpec, DeploymentSnapshot, PromotionOrigin},
};
use chrono::Utc;
use lazy_regex::regex;
use rand::Rng;
use tracing::{debug, info};

const NAME_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Performs full structural and business validation of a deployment before it is stored. Returning `Ok(false)`
/// rejects the deployment; returning an error means no answer could be obtained.
pub trait Validator {
    fn validate(&self, snapshot: &DeploymentSnapshot) -> anyhow::Result<bool>;
}

impl<F> Validator for F
where
    F: Fn(&DeploymentSnapshot) -> anyhow::Result<bool>,
{
    fn validate(&self, snapshot: &DeploymentSnapshot) -> anyhow::Result<bool> {
        self(snapshot)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PromotionError {
    #[error("could not promote deployment; component '{0}' has no config in the application")]
    ComponentConfigMissing(String),

    #[error(
        "could not promote deployment; deployment belongs to application '{deployment}' but config is for '{config}'"
    )]
    ApplicationMismatch { deployment: String, config: String },

    #[error("could not promote deployment; environment '{0}' is not declared by the application")]
    EnvironmentNotDeclared(String),

    #[error("could not promote deployment; environment name '{name}' is invalid; {reason}")]
    InvalidEnvironment { name: String, reason: String },

    #[error("could not promote deployment; promoted deployment was rejected by validation")]
    Rejected,

    /// The validator itself failed. Its error is passed through as is.
    #[error(transparent)]
    Validation(anyhow::Error),
}

impl PromotionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromotionError::ComponentConfigMissing(_)
            | PromotionError::ApplicationMismatch { .. }
            | PromotionError::EnvironmentNotDeclared(_) => ErrorKind::DataInconsistency,
            PromotionError::InvalidEnvironment { .. } | PromotionError::Rejected => {
                ErrorKind::InvalidInput
            }
            PromotionError::Validation(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

/// Environment names end up in namespace names and so have to be valid DNS labels.
pub fn is_valid_environment_name(name: &str) -> Result<(), String> {
    let dns_label = regex!("^[a-z0-9]([-a-z0-9]*[a-z0-9])?$");

    if name.is_empty() {
        return Err("cannot be empty".to_string());
    }

    if name.len() > 63 {
        return Err("length cannot be greater than 63".to_string());
    }

    if !dns_label.is_match(name) {
        return Err(
            "can only be made up of lowercase alphanumeric characters and hyphens".to_string(),
        );
    }

    Ok(())
}

/// Replaces every component's environment variables with what `config` declares for `environment`.
///
/// Fails on the first component that has no counterpart in `config`; a promotion must never silently lose a
/// component's variables. Components are matched by name, ignoring case.
pub fn merge_environment_variables(
    components: &mut [ComponentSpec],
    environment: &str,
    config: &ApplicationConfig,
) -> Result<(), PromotionError> {
    for component in components.iter_mut() {
        let component_config = config
            .component(&component.name)
            .ok_or_else(|| PromotionError::ComponentConfigMissing(component.name.clone()))?;

        component.environment_variables = component_config.variables_for(environment);
    }

    Ok(())
}

fn name_suffix(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| NAME_SUFFIX_CHARSET[rng.gen_range(0..NAME_SUFFIX_CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Promoter {
    name_suffix_length: usize,
}

impl Default for Promoter {
    fn default() -> Self {
        Promoter {
            name_suffix_length: conf::DEFAULT_NAME_SUFFIX_LENGTH,
        }
    }
}

impl Promoter {
    pub fn new(config: &conf::Promotion) -> Self {
        Promoter {
            name_suffix_length: config.name_suffix_length,
        }
    }

    /// Produces a new deployment for `target_environment` from `source`.
    ///
    /// The source is left untouched. The returned deployment has a fresh name, no storage identity, and environment
    /// variables taken from `config` for the target environment. It is only returned once `validator` accepts it;
    /// storing it is up to the caller.
    pub fn promote<V>(
        &self,
        source: &DeploymentSnapshot,
        target_environment: &str,
        config: &ApplicationConfig,
        validator: &V,
    ) -> Result<DeploymentSnapshot, PromotionError>
    where
        V: Validator + ?Sized,
    {
        is_valid_environment_name(target_environment).map_err(|reason| {
            PromotionError::InvalidEnvironment {
                name: target_environment.to_string(),
                reason,
            }
        })?;

        if source.app_name != config.app_name {
            return Err(PromotionError::ApplicationMismatch {
                deployment: source.app_name.clone(),
                config: config.app_name.clone(),
            });
        }

        if !config.has_environment(target_environment) {
            return Err(PromotionError::EnvironmentNotDeclared(
                target_environment.to_string(),
            ));
        }

        let mut promoted = source.clone();
        merge_environment_variables(&mut promoted.components, target_environment, config)?;

        promoted.name = format!(
            "{}-{}",
            target_environment,
            name_suffix(self.name_suffix_length)
        );
        promoted.environment = target_environment.to_string();
        promoted.created_at = Utc::now();
        promoted.created_by_job = None;
        promoted.promoted_from = Some(PromotionOrigin {
            deployment: source.name.clone(),
            environment: source.environment.clone(),
        });
        promoted.namespace = None;
        promoted.resource_version = None;

        debug!(
            app = %source.app_name,
            from = %source.environment,
            to = %target_environment,
            deployment = %promoted.name,
            "validating promoted deployment"
        );

        match validator.validate(&promoted) {
            Ok(true) => {}
            Ok(false) => return Err(PromotionError::Rejected),
            Err(e) => return Err(PromotionError::Validation(e)),
        }

        info!(
            app = %source.app_name,
            source = %source.name,
            deployment = %promoted.name,
            from = %source.environment,
            to = %target_environment,
            "promoted deployment"
        );

        Ok(promoted)
    }
}

/// Promotes with default settings. See [`Promoter::promote`].
pub fn promote<V>(
    source: &DeploymentSnapshot,
    target_environment: &str,
    config: &ApplicationConfig,
    validator: &V,
) -> Result<DeploymentSnapshot, PromotionError>
where
    V: Validator + ?Sized,
{
    Promoter::default().promote(source, target_environment, config, validator)
}
