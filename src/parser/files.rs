//! Kustomize file and path conventions
//!
//! Naming rules for kustomization files and manifests, the directory lookup
//! used for bases/components/apps, and canonical path identity.

use std::path::{Component, Path, PathBuf};

use crate::error::{KustomError, KustomResult};

/// Recognized kustomization file names, in lookup precedence order
pub const KUSTOMIZATION_FILE_NAMES: [&str; 3] =
    ["kustomization.yaml", "kustomization.yml", "Kustomization"];

/// Recognized manifest extensions (compared case-insensitively)
pub const MANIFEST_EXTENSIONS: [&str; 3] = [".yaml", ".yml", ".json"];

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// True if the path's file name is one of the kustomization file names
pub fn is_kustomization_file_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| KUSTOMIZATION_FILE_NAMES.contains(&name))
        .unwrap_or(false)
}

/// True if the path looks like a Kubernetes manifest: a recognized
/// extension and not a kustomization file name
pub fn is_valid_kubernetes_resource(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let lower = name.to_lowercase();
    !is_kustomization_file_name(path) && MANIFEST_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Resolve an application directory to its kustomization file
///
/// Tries `kustomization.yaml`, `kustomization.yml` and `Kustomization` in
/// that order and returns the first regular file found.
pub fn find_kustomization_file(app_dir: &Path) -> KustomResult<PathBuf> {
    tracing::debug!("Finding kustomization file for app path: {}", app_dir.display());

    for name in KUSTOMIZATION_FILE_NAMES {
        let candidate = app_dir.join(name);
        if is_file(&candidate) {
            tracing::trace!(
                "Found kustomization file '{}' in app directory '{}'",
                name,
                app_dir.display()
            );
            return Ok(candidate);
        }
    }

    tracing::debug!("No kustomization file found for app path: {}", app_dir.display());
    Err(KustomError::NotAnApp(app_dir.to_path_buf()))
}

/// Canonical identity of a path: absolute and lexically normalized
///
/// `.` and `..` are removed without consulting the filesystem, so two
/// spellings of the same location always map to the same key.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    lexical_normalize(&absolute)
}

/// Resolve `reference` against `base_dir` and normalize the result
pub fn resolve_against(base_dir: &Path, reference: &str) -> PathBuf {
    lexical_normalize(&base_dir.join(reference))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
