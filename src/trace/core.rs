//! Core node resolution
//!
//! Turns a file on disk into an unwired graph node. Wiring references and
//! dependents is left to the builder.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::KustomResult;
use crate::models::{KustomFile, KustomResource, Kustomization};
use crate::parser::{self, yaml};

/// Parse a kustomization file into a node with no references yet
pub fn resolve_kustomization(path: &Path) -> KustomResult<Kustomization> {
    let content = parser::parse_kustomization_file(path)?;
    tracing::debug!("Resolved kustomization: {}", path.display());
    Ok(Kustomization::new(path.to_path_buf(), content))
}

/// Build a plain file node
///
/// Only files that look like manifests are parsed; anything else (env files,
/// property files) becomes a node without resources.
pub fn resolve_kustom_file(path: &Path) -> KustomResult<KustomFile> {
    let mut file = KustomFile::new(path.to_path_buf());

    if parser::is_valid_kubernetes_resource(path) {
        for document in parser::parse_file(path)? {
            file.add_resource(resolve_resource(&document, path));
        }
    }

    tracing::debug!(
        "Resolved file {} with {} resource(s)",
        path.display(),
        file.resources().len()
    );
    Ok(file)
}

/// Extract `kind` and `metadata.name` from one manifest document
pub fn resolve_resource(document: &Mapping, file: &Path) -> KustomResource {
    let kind = yaml::get_kind(document);
    let name = document
        .get("metadata")
        .and_then(Value::as_mapping)
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::trace!("Resource {:?} {:?} in {}", kind, name, file.display());
    KustomResource::new(kind, name, file.to_path_buf())
}
