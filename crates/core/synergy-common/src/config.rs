//! Common configuration utilities
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::Error;
use crate::result::Result;

/// Base trait for all configuration types
pub trait Configuration: Serialize + for<'de> Deserialize<'de> + Default {
    /// Validate the configuration
    fn validate(&self) -> Result<()>;

    /// Load configuration from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, everything else as TOML.
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?
        } else {
            Self::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    fn from_str(content: &str) -> Result<Self> {
        let config = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Parse an environment override, reporting the variable name on failure
pub fn env_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::configuration(format!("Invalid value for {}: {}", name, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        level: String,
        #[serde(default)]
        deadline: u64,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                level: "info".to_string(),
                deadline: 10,
            }
        }
    }

    impl Configuration for Sample {
        fn validate(&self) -> Result<()> {
            if self.deadline == 0 {
                return Err(Error::configuration("deadline must be positive"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("sample.toml");

        let sample = Sample {
            level: "debug".to_string(),
            deadline: 42,
        };
        sample.save_to_file(&config_path).expect("Failed to save config");

        let loaded = Sample::from_file(&config_path).expect("Failed to load config");
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_yaml_config_file() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("sample.yaml");
        fs::write(&config_path, "level: warn\ndeadline: 7\n").unwrap();

        let loaded = Sample::from_file(&config_path).unwrap();
        assert_eq!(loaded.level, "warn");
        assert_eq!(loaded.deadline, 7);
    }

    #[test]
    fn test_invalid_config_rejected_on_load() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("sample.toml");
        fs::write(&config_path, "level = \"info\"\ndeadline = 0\n").unwrap();

        assert!(matches!(
            Sample::from_file(&config_path),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_env_override_missing_variable() {
        let value: Option<u64> = env_override("SYNERGY_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
