//! Document parsing for manifests and kustomization files
//!
//! Every file is read as a stream of documents, each of which must be a
//! mapping. `.json` files go through serde_json, everything else through
//! serde_yaml; both produce `serde_yaml::Mapping` so callers see one shape.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{KustomError, KustomResult};

/// Parse a file that may hold several documents separated by `---`
///
/// Null documents are skipped. A non-mapping document or a syntax error
/// fails with `InvalidContent`; a missing or unreadable file with
/// `FileNotFound` / `Io`.
pub fn parse_file(path: &Path) -> KustomResult<Vec<Mapping>> {
    tracing::debug!("Starting to parse file: {}", path.display());

    if !path.is_file() {
        tracing::error!(
            "File does not exist or is not a regular file: {}",
            path.display()
        );
        return Err(KustomError::FileNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Error reading file {}: {}", path.display(), e);
        KustomError::io(path, e)
    })?;

    let values = if is_json(path) {
        parse_json_documents(path, &contents)?
    } else {
        parse_yaml_documents(path, &contents)?
    };

    let mut documents = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Null => {
                tracing::warn!("Found and skipped a null document in: {}", path.display());
            }
            Value::Mapping(mapping) => documents.push(mapping),
            other => {
                tracing::error!(
                    "Document in {} is not a map (key-value structure), actual type: {}",
                    path.display(),
                    value_type_name(&other)
                );
                return Err(KustomError::InvalidContent(path.to_path_buf()));
            }
        }
    }

    tracing::debug!(
        "Successfully parsed {} map document(s) from: {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

/// Parse a kustomization file, which must hold exactly one mapping document
pub fn parse_kustomization_file(path: &Path) -> KustomResult<Mapping> {
    tracing::debug!("Attempting to parse kustomization file: {}", path.display());

    let mut documents = parse_file(path)?;
    match documents.len() {
        1 => Ok(documents.remove(0)),
        0 => {
            tracing::warn!(
                "Kustomization file at {} is empty or contains no map documents",
                path.display()
            );
            Err(KustomError::InvalidContent(path.to_path_buf()))
        }
        count => {
            tracing::error!(
                "Kustomization file at {} contains {} documents, but exactly one was expected",
                path.display(),
                count
            );
            Err(KustomError::InvalidContent(path.to_path_buf()))
        }
    }
}

/// `kind` of a manifest document, if it is a string
pub fn get_kind(document: &Mapping) -> Option<String> {
    document
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn parse_yaml_documents(path: &Path, contents: &str) -> KustomResult<Vec<Value>> {
    let mut values = Vec::new();
    for document in serde_yaml::Deserializer::from_str(contents) {
        let value = Value::deserialize(document).map_err(|e| {
            tracing::error!("Error parsing YAML content in file {}: {}", path.display(), e);
            KustomError::InvalidContent(path.to_path_buf())
        })?;
        values.push(value);
    }
    Ok(values)
}

fn parse_json_documents(path: &Path, contents: &str) -> KustomResult<Vec<Value>> {
    serde_json::Deserializer::from_str(contents)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!("Error parsing JSON content in file {}: {}", path.display(), e);
            KustomError::InvalidContent(path.to_path_buf())
        })
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
