//! Reference extraction strategies
//!
//! Each strategy interprets one raw entry of a kustomization reference list
//! (a string, or an inline map for patches and generators) relative to the
//! kustomization's directory, and returns the files it points at.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::ReferenceError;
use crate::parser::files;

/// Signature shared by all strategies
pub type ReferenceExtractor = fn(&Value, &Path) -> Result<Vec<PathBuf>, ReferenceError>;

/// Require a single-line string
fn non_multiline_string(value: &Value) -> Result<&str, ReferenceError> {
    let Some(text) = value.as_str() else {
        return Err(ReferenceError::invalid_value(
            "Non-string value found for reference",
        ));
    };
    if text.contains('\n') {
        return Err(ReferenceError::invalid_value("Multiline value found"));
    }
    Ok(text)
}

/// Validate a path as a manifest that exists on disk
fn validate_kubernetes_resource(path: PathBuf) -> Result<PathBuf, ReferenceError> {
    if !files::is_valid_kubernetes_resource(&path) {
        return Err(ReferenceError::warning(
            "Not a valid Kubernetes resource",
            path,
        ));
    }
    if !files::is_file(&path) {
        return Err(ReferenceError::error(
            "Non-existing or non-regular file",
            path,
        ));
    }
    tracing::trace!("Found file reference: {}", path.display());
    Ok(path)
}

fn kustomization_in_directory(path: PathBuf, base_dir: &Path) -> Result<PathBuf, ReferenceError> {
    if path == base_dir {
        return Err(ReferenceError::error("Self reference", path));
    }
    match files::find_kustomization_file(&path) {
        Ok(file) => Ok(file),
        Err(_) => Err(ReferenceError::warning(
            "Invalid directory or kustomization file",
            path,
        )),
    }
}

/// `bases` / `components`: a directory holding a kustomization file
pub fn kustomization_directory(value: &Value, base_dir: &Path) -> Result<Vec<PathBuf>, ReferenceError> {
    let path = files::resolve_against(base_dir, non_multiline_string(value)?);
    kustomization_in_directory(path, base_dir).map(|file| vec![file])
}

/// `resources`: a directory (as for bases) or a single manifest file
pub fn resource_or_directory(value: &Value, base_dir: &Path) -> Result<Vec<PathBuf>, ReferenceError> {
    let path = files::resolve_against(base_dir, non_multiline_string(value)?);

    if files::is_directory(&path) {
        tracing::trace!("Reference '{}' is a directory", path.display());
        return kustomization_in_directory(path, base_dir).map(|file| vec![file]);
    }

    validate_kubernetes_resource(path).map(|file| vec![file])
}

/// `patchesStrategicMerge`: a single manifest file
pub fn resource(value: &Value, base_dir: &Path) -> Result<Vec<PathBuf>, ReferenceError> {
    let path = files::resolve_against(base_dir, non_multiline_string(value)?);
    validate_kubernetes_resource(path).map(|file| vec![file])
}

/// `patches` entries are maps carrying the file under `path`
pub fn patch_path(value: &Value, base_dir: &Path) -> Result<Vec<PathBuf>, ReferenceError> {
    inline_path_value("path", value, base_dir)
}

/// Extract one nested field of an inline map and validate it as a manifest
///
/// Not a map, or the field absent: nothing to extract (inline patches).
pub fn inline_path_value(
    field: &str,
    value: &Value,
    base_dir: &Path,
) -> Result<Vec<PathBuf>, ReferenceError> {
    tracing::debug!(
        "Applying inline path extractor with field '{}' and base dir: {}",
        field,
        base_dir.display()
    );

    let Some(map) = value.as_mapping() else {
        tracing::trace!("Inline reference value is not a map");
        return Ok(Vec::new());
    };
    let Some(field_value) = map.get(field) else {
        tracing::trace!("Inline reference has no '{}' field", field);
        return Ok(Vec::new());
    };

    let path = files::resolve_against(base_dir, non_multiline_string(field_value)?);
    validate_kubernetes_resource(path).map(|file| vec![file])
}

/// `configMapGenerator`: files listed under `envs` and `files`
///
/// `files` entries may be `key=path`; only the part after the first `=` is
/// the path. Entries that do not point at a plain regular file are dropped
/// with a warning.
pub fn config_generator_files(
    value: &Value,
    base_dir: &Path,
) -> Result<Vec<PathBuf>, ReferenceError> {
    Ok(config_generator_entries(value, base_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping config generator entry: {}: {}", e, e.file_name());
                None
            }
        })
        .collect())
}

/// Per-entry outcome of a `configMapGenerator` item, in document order
///
/// Every dropped entry comes back as a warning so callers can count it.
pub fn config_generator_entries(
    value: &Value,
    base_dir: &Path,
) -> Vec<Result<PathBuf, ReferenceError>> {
    tracing::debug!(
        "Applying config generator extractor with base dir: {}",
        base_dir.display()
    );

    let Some(map) = value.as_mapping() else {
        return Vec::new();
    };

    let envs = string_entries(map.get("envs"), "envs");
    let file_entries = string_entries(map.get("files"), "files")
        .into_iter()
        .map(|entry| {
            entry.map(|text| match text.split_once('=') {
                Some((_, path)) => path,
                None => text,
            })
        });

    envs.into_iter()
        .chain(file_entries)
        .map(|entry| {
            let path = files::resolve_against(base_dir, entry?);
            generator_file(path)
        })
        .collect()
}

fn string_entries<'a>(value: Option<&'a Value>, key: &str) -> Vec<Result<&'a str, ReferenceError>> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Some(entries) = value.as_sequence() else {
        return vec![Err(ReferenceError::invalid_value(format!(
            "Expected a list for generator key '{}'",
            key
        )))];
    };
    entries.iter().map(non_multiline_string).collect()
}

fn generator_file(path: PathBuf) -> Result<PathBuf, ReferenceError> {
    if !files::is_file(&path) {
        return Err(ReferenceError::warning("Invalid reference to non file", path));
    }
    if files::is_kustomization_file_name(&path) {
        return Err(ReferenceError::warning(
            "Invalid reference to kustomization file",
            path,
        ));
    }
    tracing::trace!("Found generator file: {}", path.display());
    Ok(path)
}
