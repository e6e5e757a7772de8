//! Report rendering
//!
//! Every analysis command produces a [`Report`], printed to the console or
//! written as YAML with `--output`.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

/// Affected applications for one modified file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedEntry {
    /// File as shown to the user
    pub file: String,
    pub apps: Vec<String>,
    /// Set when the file is not referenced by any application
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    AffectedApps(Vec<AffectedEntry>),
    AppFiles { app: String, files: Vec<String> },
    RootApps { apps_dir: String, apps: Vec<String> },
}

impl Report {
    /// Human readable console text
    pub fn to_console(&self) -> String {
        let mut lines = Vec::new();
        match self {
            Report::AffectedApps(entries) => {
                lines.push("Affected Applications:".to_string());
                if entries.is_empty() {
                    lines.push("  No modified files provided to check.".to_string());
                    return join_lines(lines);
                }
                for entry in entries {
                    lines.push(format!("Affected apps by {}:", entry.file));
                    if let Some(warning) = &entry.warning {
                        lines.push(format!("  Warning: {}", warning));
                    } else if entry.apps.is_empty() {
                        lines.push("  - None".to_string());
                    } else {
                        lines.extend(entry.apps.iter().map(|app| format!("  - {}", app)));
                    }
                }
                if entries.iter().all(|entry| entry.apps.is_empty()) {
                    lines.push(
                        "Summary: No applications were found to be affected by the specified file(s)."
                            .to_string(),
                    );
                }
            }
            Report::AppFiles { app, files } => {
                lines.push(format!("Files used by application '{}':", app));
                lines.extend(files.iter().map(|file| format!("  - {}", file)));
            }
            Report::RootApps { apps_dir, apps } => {
                if apps.is_empty() {
                    lines.push(format!("No root applications found in: {}", apps_dir));
                } else {
                    lines.push("Root Applications:".to_string());
                    lines.extend(apps.iter().map(|app| format!("  - {}", app)));
                }
            }
        }
        join_lines(lines)
    }

    /// YAML document written by `--output`
    pub fn to_yaml(&self) -> Result<String> {
        let mut root = Mapping::new();
        match self {
            Report::AffectedApps(entries) => {
                let mut affected = Mapping::new();
                for entry in entries {
                    affected.insert(entry.file.clone().into(), string_list(&entry.apps));
                }
                root.insert("affected-apps".into(), Value::Mapping(affected));
            }
            Report::AppFiles { app, files } => {
                let mut app_files = Mapping::new();
                app_files.insert(app.clone().into(), string_list(files));
                root.insert("app-files".into(), Value::Mapping(app_files));
            }
            Report::RootApps { apps, .. } => {
                root.insert("root-apps".into(), string_list(apps));
            }
        }
        serde_yaml::to_string(&Value::Mapping(root)).context("Failed to serialize report to YAML")
    }
}

/// Print the report, or write it as YAML to `output`
pub fn write_report(report: &Report, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            std::fs::write(path, report.to_yaml()?)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Output written to: {}", path.display());
        }
        None => print!("{}", report.to_console()),
    }
    Ok(())
}

/// Path of `target` relative to `base`, using `..` where needed
///
/// Both paths must be absolute and normalized. Returns `None` when they do
/// not share a root (different drives on Windows).
pub fn relative_path(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    if target.first() != base.first() {
        return None;
    }

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

/// Forward-slash rendering of a path
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn string_list(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}

fn join_lines(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affected(file: &str, apps: &[&str]) -> AffectedEntry {
        AffectedEntry {
            file: file.to_string(),
            apps: apps.iter().map(|app| app.to_string()).collect(),
            warning: None,
        }
    }

    #[test]
    fn test_affected_apps_console() {
        let report = Report::AffectedApps(vec![
            affected("base/cm.yaml", &["app-a", "app-b"]),
            affected("base/unused.yaml", &[]),
        ]);
        insta::assert_snapshot!(report.to_console().trim_end(), @r"
        Affected Applications:
        Affected apps by base/cm.yaml:
          - app-a
          - app-b
        Affected apps by base/unused.yaml:
          - None
        ");
    }

    #[test]
    fn test_affected_apps_console_nothing_affected() {
        let report = Report::AffectedApps(vec![AffectedEntry {
            file: "/tmp/other.yaml".to_string(),
            apps: Vec::new(),
            warning: Some("File with path /tmp/other.yaml is not referenced by any app".to_string()),
        }]);
        insta::assert_snapshot!(report.to_console().trim_end(), @r"
        Affected Applications:
        Affected apps by /tmp/other.yaml:
          Warning: File with path /tmp/other.yaml is not referenced by any app
        Summary: No applications were found to be affected by the specified file(s).
        ");
    }

    #[test]
    fn test_affected_apps_yaml() {
        let report = Report::AffectedApps(vec![
            affected("base/cm.yaml", &["app"]),
            affected("/tmp/other.yaml", &[]),
        ]);
        insta::assert_snapshot!(report.to_yaml().unwrap().trim_end(), @r"
        affected-apps:
          base/cm.yaml:
          - app
          /tmp/other.yaml: []
        ");
    }

    #[test]
    fn test_app_files_console_and_yaml() {
        let report = Report::AppFiles {
            app: "app".to_string(),
            files: vec!["kustomization.yaml".to_string(), "../base/x.yaml".to_string()],
        };
        insta::assert_snapshot!(report.to_console().trim_end(), @r"
        Files used by application 'app':
          - kustomization.yaml
          - ../base/x.yaml
        ");
        insta::assert_snapshot!(report.to_yaml().unwrap().trim_end(), @r"
        app-files:
          app:
          - kustomization.yaml
          - ../base/x.yaml
        ");
    }

    #[test]
    fn test_root_apps_console() {
        let empty = Report::RootApps {
            apps_dir: "/apps".to_string(),
            apps: Vec::new(),
        };
        assert_eq!(empty.to_console(), "No root applications found in: /apps\n");

        let report = Report::RootApps {
            apps_dir: "/apps".to_string(),
            apps: vec!["app-a".to_string(), "app-b".to_string()],
        };
        assert_eq!(report.to_console(), "Root Applications:\n  - app-a\n  - app-b\n");
        assert_eq!(report.to_yaml().unwrap(), "root-apps:\n- app-a\n- app-b\n");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/apps/base/x.yaml"), Path::new("/apps/app")),
            Some(PathBuf::from("../base/x.yaml"))
        );
        assert_eq!(
            relative_path(Path::new("/apps/app/kustomization.yaml"), Path::new("/apps/app")),
            Some(PathBuf::from("kustomization.yaml"))
        );
        assert_eq!(
            relative_path(Path::new("/apps"), Path::new("/apps")),
            Some(PathBuf::from("."))
        );
        assert_eq!(relative_path(Path::new("apps"), Path::new("/apps")), None);
    }

    #[test]
    fn test_no_input_files() {
        let report = Report::AffectedApps(Vec::new());
        assert_eq!(
            report.to_console(),
            "Affected Applications:\n  No modified files provided to check.\n"
        );
        assert_eq!(report.to_yaml().unwrap(), "affected-apps: {}\n");
    }
}
