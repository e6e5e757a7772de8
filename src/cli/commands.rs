//! CLI command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use kustomtrace::config::{self, ConfigLoader, OutputConfig, paths};
use kustomtrace::parser::normalize_path;
use kustomtrace::{KustomError, KustomTrace};

use super::output::{AffectedEntry, Report, display_path, relative_path};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Print the built-in default configuration as a config file
    Defaults,
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., "logLevel", "output.sort")
        key: String,
    },
    /// Set a configuration value in the config file
    Set {
        /// Configuration key (e.g., "logLevel", "output.sort")
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Show => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Defaults => {
            print!("{}", config::default_config_yaml());
        }
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            println!("{}", config::get_config_value(&config, &key)?);
        }
        ConfigSubcommand::Set { key, value } => {
            let path = paths::root_config_path();
            let mut config = if path.exists() {
                ConfigLoader::load_file(&path)?
            } else {
                ConfigLoader::load_defaults()
            };
            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            ConfigLoader::save(&config, &path).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
    }

    Ok(())
}

/// Modified files from the command line plus `--files-from-file`
pub fn collect_modified_files(files: &[PathBuf], files_from_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut all = files.to_vec();
    if let Some(list) = files_from_file {
        let contents = std::fs::read_to_string(list).with_context(|| {
            format!("Error reading files from --files-from-file: {}", list.display())
        })?;
        all.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(PathBuf::from),
        );
    }
    Ok(all)
}

/// Root applications affected by each modified file
pub fn affected_apps(trace: &KustomTrace, files: &[PathBuf], output: &OutputConfig) -> Result<Report> {
    let apps_dir = trace.apps_dir();
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        let full_path = normalize_path(file);
        let key = match relative_path(&full_path, apps_dir) {
            Some(relative) if full_path.starts_with(apps_dir) => display_path(&relative),
            _ => display_path(file),
        };

        let entry = match trace.apps_with(&full_path) {
            Ok(apps) => {
                let mut apps: Vec<String> = apps
                    .iter()
                    .map(|app| app_display(app, apps_dir, output))
                    .collect();
                apps.sort();
                AffectedEntry {
                    file: key,
                    apps,
                    warning: None,
                }
            }
            Err(e @ KustomError::UnreferencedFile(_)) => {
                tracing::warn!("{} (for modified file: {})", e, key);
                AffectedEntry {
                    file: key,
                    apps: Vec::new(),
                    warning: Some(e.to_string()),
                }
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to trace {}", file.display())),
        };
        entries.push(entry);
    }

    Ok(Report::AffectedApps(entries))
}

/// Files used by one application
pub fn app_files(trace: &KustomTrace, app_path: &Path, output: &OutputConfig) -> Result<Report> {
    let files = trace
        .app_files(app_path)
        .with_context(|| format!("Error processing application {}", app_path.display()))?;

    let apps_dir = trace.apps_dir();
    let full_path = normalize_path(app_path);
    let app_dir = if full_path.is_dir() {
        full_path
    } else {
        full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| full_path.clone())
    };

    let app = match relative_path(&app_dir, apps_dir) {
        Some(relative) if app_dir.starts_with(apps_dir) => display_path(&relative),
        _ => display_path(app_path),
    };

    let mut files: Vec<String> = files
        .iter()
        .map(|file| {
            if !output.relative_paths {
                return display_path(file);
            }
            relative_path(file, &app_dir)
                .or_else(|| relative_path(file, apps_dir))
                .map(|relative| display_path(&relative))
                .unwrap_or_else(|| {
                    tracing::warn!("Could not reliably relativize path '{}'", file.display());
                    display_path(file)
                })
        })
        .collect();
    if output.sort {
        files.sort();
    }

    Ok(Report::AppFiles { app, files })
}

/// All root applications of the apps directory
pub fn list_root_apps(trace: &KustomTrace, output: &OutputConfig) -> Report {
    let apps_dir = trace.apps_dir();
    let mut apps: Vec<String> = trace
        .root_apps()
        .iter()
        .map(|app| app_display(app, apps_dir, output))
        .collect();
    apps.sort();

    Report::RootApps {
        apps_dir: display_path(apps_dir),
        apps,
    }
}

/// Application directory of a kustomization file, as shown to the user
fn app_display(kustomization: &Path, apps_dir: &Path, output: &OutputConfig) -> String {
    let app_dir = kustomization.parent().unwrap_or(kustomization);
    if !output.relative_paths {
        return display_path(app_dir);
    }
    relative_path(app_dir, apps_dir)
        .map(|relative| display_path(&relative))
        .unwrap_or_else(|| display_path(app_dir))
}
