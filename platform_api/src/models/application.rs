use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variables a component declares for one specific environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct EnvironmentConfig {
    pub environment: String,

    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// The live configuration of a single component as declared in the application config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ComponentConfig {
    pub name: String,

    /// Variables shared by every environment; environment specific values take precedence.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub environment_config: Vec<EnvironmentConfig>,
}

impl ComponentConfig {
    pub fn new(name: &str) -> Self {
        ComponentConfig {
            name: name.into(),
            variables: BTreeMap::new(),
            environment_config: vec![],
        }
    }

    /// Returns the full set of variables this component declares for `environment`. Common variables are overlaid
    /// by the environment specific ones. A component that declares nothing for the environment yields an empty map.
    pub fn variables_for(&self, environment: &str) -> BTreeMap<String, String> {
        let mut variables = self.variables.clone();

        for env_config in self
            .environment_config
            .iter()
            .filter(|env_config| env_config.environment == environment)
        {
            variables.extend(
                env_config
                    .variables
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }

        variables
    }
}

/// The application config as currently stored. It is read-only input to promotions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ApplicationConfig {
    pub app_name: String,

    /// Every environment the application declares.
    #[serde(default)]
    pub environments: Vec<String>,

    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

impl ApplicationConfig {
    /// Returns the component config with the given name, compared case-insensitively.
    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components
            .iter()
            .find(|component| component.name.eq_ignore_ascii_case(name))
    }

    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.iter().any(|env| env == environment)
    }
}
