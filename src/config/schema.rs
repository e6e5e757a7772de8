//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Default log filter when neither `--log-level` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Graph build thread count (0 = rayon default)
    #[serde(default)]
    pub threads: usize,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Sort file lists in reports
    #[serde(default = "default_true")]
    pub sort: bool,

    /// Print paths relative to the app / apps directory instead of absolute
    #[serde(default = "default_true")]
    pub relative_paths: bool,
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            threads: 0,
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sort: default_true(),
            relative_paths: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.threads, 0);
        assert!(config.output.sort);
        assert!(config.output.relative_paths);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("logLevel"));
        assert!(yaml.contains("relativePaths"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
logLevel: debug
output:
  relativePaths: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(!config.output.relative_paths);
        assert!(config.output.sort);
    }
}
