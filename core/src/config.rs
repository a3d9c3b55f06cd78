use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

pub const CONFIG_ENV_VAR: &str = "GREETER_CONFIG";
pub const CONFIG_PATH_ENV_VAR: &str = "GREETER_CONFIG_PATH";
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GreeterConfig {
    pub version: u32,
    /// `tracing_subscriber` filter directive, e.g. `greeter_core=debug`.
    pub log_filter: Option<String>,
    pub output: OutputConfig,
    /// When set, the container runner evaluates this fixture suite instead of
    /// streaming records.
    pub suite_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_filter: None,
            output: OutputConfig::default(),
            suite_path: None,
        }
    }
}

pub fn load_config(config_path: Option<&str>) -> Result<GreeterConfig> {
    let config = match config_path {
        Some(path) => GreeterConfig::from_file(path)?,
        None => GreeterConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

impl GreeterConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml(&content, path)
    }

    /// Reads a YAML document from `GREETER_CONFIG`; defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(config_str) => Self::from_yaml(&config_str, CONFIG_ENV_VAR),
            Err(_) => Ok(Self::default()),
        }
    }

    fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        let config = serde_yaml::from_str(content).map_err(|e| ConfigError::LoadFailed {
            origin: origin.to_string(),
            error: Box::new(e),
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "unsupported config version {}, expected {}",
                    self.version, CONFIG_VERSION
                ),
            });
        }
        if self.log_filter.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid {
                message: "log_filter cannot be empty".to_string(),
            });
        }
        if self.suite_path.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid {
                message: "suite_path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GreeterError;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GreeterConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "version: 1\nlog_filter: greeter_core=debug\noutput:\n  pretty: true\nsuite_path: cases.json"
        )
        .unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("greeter_core=debug"));
        assert!(config.output.pretty);
        assert_eq!(config.suite_path.as_deref(), Some("cases.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = GreeterConfig::from_yaml("log_filter: info", "inline").unwrap();
        assert_eq!(config.version, 1);
        assert!(config.suite_path.is_none());
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let err = load_config(Some("/nonexistent/greeter.yaml")).unwrap_err();
        assert!(matches!(
            err,
            GreeterError::Config(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let config = GreeterConfig {
            version: 2,
            ..GreeterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_log_filter() {
        let config = GreeterConfig {
            log_filter: Some(String::new()),
            ..GreeterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
