//! Configuration system for kustomtrace
//!
//! A single YAML file layered over built-in defaults and environment
//! variable overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use defaults::default_config_yaml;
pub use loader::ConfigLoader;
pub use schema::{Config, OutputConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "logLevel" => Ok(config.log_level.clone()),
        "threads" => Ok(config.threads.to_string()),
        "output.sort" => Ok(config.output.sort.to_string()),
        "output.relativePaths" => Ok(config.output.relative_paths.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "logLevel" => {
            config.log_level = value.to_string();
        }
        "threads" => {
            config.threads = value.parse().context("threads must be a number")?;
        }
        "output.sort" => {
            config.output.sort = value
                .parse()
                .context("output.sort must be 'true' or 'false'")?;
        }
        "output.relativePaths" => {
            config.output.relative_paths = value
                .parse()
                .context("output.relativePaths must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
