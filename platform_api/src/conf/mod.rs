use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use rust_embed::RustEmbed;
use serde::Deserialize;

#[derive(RustEmbed)]
#[folder = "src/conf/"]
#[include = "*.toml"]
struct EmbeddedConfigFS;

const DEFAULT_CONFIG_FILE: &str = "default_config.toml";

/// The path searched for a user config when no override is given.
const DEFAULT_CONFIG_PATH: &str = "/etc/platform_api/platform_api.toml";

/// Environment variables with this prefix override every other source. Nested keys are separated by a double
/// underscore; `PLATFORM_API_GENERAL__LOG_LEVEL` sets `general.log_level`.
const ENV_PREFIX: &str = "PLATFORM_API_";

pub const DEFAULT_NAME_SUFFIX_LENGTH: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load embedded default config '{0}'")]
    MissingDefaults(String),

    #[error("could not parse configuration; {0}")]
    Parse(String),
}

#[derive(Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub general: General,
    pub promotion: Promotion,
}

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct General {
    /// Turns on humanized log output with source locations for development.
    pub dev_mode: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub name_suffix_length: usize,
}

impl Default for Promotion {
    fn default() -> Self {
        Promotion {
            name_suffix_length: DEFAULT_NAME_SUFFIX_LENGTH,
        }
    }
}

impl Config {
    /// Returns the configuration built from, in increasing order of precedence: the embedded defaults, the user
    /// config file (`path_override` or the default path; a missing file is skipped), and environment variables.
    pub fn load(path_override: Option<&str>) -> Result<Config, ConfigError> {
        Self::figment(path_override)?
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn figment(path_override: Option<&str>) -> Result<Figment, ConfigError> {
        let default_config_raw = EmbeddedConfigFS::get(DEFAULT_CONFIG_FILE)
            .ok_or_else(|| ConfigError::MissingDefaults(DEFAULT_CONFIG_FILE.into()))?;
        let default_config = std::str::from_utf8(&default_config_raw.data)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let path = path_override.unwrap_or(DEFAULT_CONFIG_PATH);

        Ok(Figment::new()
            .merge(Toml::string(default_config))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    /// The embedded defaults alone produce a complete config.
    fn parse_default_config() {
        Jail::expect_with(|_| {
            let config = Config::load(Some("does_not_exist.toml")).unwrap();

            assert_eq!(
                config,
                Config {
                    general: General {
                        dev_mode: false,
                        log_level: "info".to_string(),
                        log_format: LogFormat::Json,
                    },
                    promotion: Promotion {
                        name_suffix_length: DEFAULT_NAME_SUFFIX_LENGTH,
                    },
                }
            );

            Ok(())
        });
    }

    #[test]
    /// Values from the user file replace defaults while leaving the rest alone.
    fn user_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "platform_api.toml",
                r#"
                [general]
                log_level = "debug"
                log_format = "pretty"
                "#,
            )?;

            let config = Config::load(Some("platform_api.toml")).unwrap();

            assert_eq!(config.general.log_level, "debug");
            assert_eq!(config.general.log_format, LogFormat::Pretty);
            assert!(!config.general.dev_mode);
            assert_eq!(config.promotion, Promotion::default());

            Ok(())
        });
    }

    #[test]
    /// Environment variables always win over the user file.
    fn env_vars_override_everything() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "platform_api.toml",
                r#"
                [promotion]
                name_suffix_length = 4
                "#,
            )?;
            jail.set_env("PLATFORM_API_GENERAL__DEV_MODE", "true");
            jail.set_env("PLATFORM_API_PROMOTION__NAME_SUFFIX_LENGTH", "12");

            let config = Config::load(Some("platform_api.toml")).unwrap();

            assert!(config.general.dev_mode);
            assert_eq!(config.promotion.name_suffix_length, 12);

            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("PLATFORM_API_GENERAL__LOG_FORMAT", "xml");

            let err = Config::load(Some("does_not_exist.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)));

            Ok(())
        });
    }
}
