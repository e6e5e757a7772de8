//! Kustomization reference kinds
//!
//! This module provides a closed enum for every kustomization field that can
//! point at other files. Each kind is bound to the YAML key it reads and to
//! the extraction strategy that turns one raw entry of that key into paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_yaml::{Mapping, Value};

use crate::error::ReferenceError;
use crate::parser::extractors::{self, ReferenceExtractor};

/// Enumeration of all reference fields understood in a kustomization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceType {
    Resource,
    Base,
    Component,
    Patch,
    PatchMerge,
    ConfigMapGenerator,
}

impl ReferenceType {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Resource => "RESOURCE",
            ReferenceType::Base => "BASE",
            ReferenceType::Component => "COMPONENT",
            ReferenceType::Patch => "PATCH",
            ReferenceType::PatchMerge => "PATCH_MERGE",
            ReferenceType::ConfigMapGenerator => "CONFIG_MAP_GENERATOR",
        }
    }

    /// The kustomization key holding this kind of reference
    pub fn yaml_key(&self) -> &'static str {
        match self {
            ReferenceType::Resource => "resources",
            ReferenceType::Base => "bases",
            ReferenceType::Component => "components",
            ReferenceType::Patch => "patches",
            ReferenceType::PatchMerge => "patchesStrategicMerge",
            ReferenceType::ConfigMapGenerator => "configMapGenerator",
        }
    }

    /// Strategy used to interpret one entry under [`Self::yaml_key`]
    pub fn extractor(&self) -> ReferenceExtractor {
        match self {
            ReferenceType::Resource => extractors::resource_or_directory,
            ReferenceType::Base | ReferenceType::Component => extractors::kustomization_directory,
            ReferenceType::Patch => extractors::patch_path,
            ReferenceType::PatchMerge => extractors::resource,
            ReferenceType::ConfigMapGenerator => extractors::config_generator_files,
        }
    }

    /// Get all reference kinds
    pub fn all() -> &'static [Self] {
        &[
            ReferenceType::Resource,
            ReferenceType::Base,
            ReferenceType::Component,
            ReferenceType::Patch,
            ReferenceType::PatchMerge,
            ReferenceType::ConfigMapGenerator,
        ]
    }

    /// Look up a reference kind by its kustomization key
    pub fn from_yaml_key(key: &str) -> Option<Self> {
        let found = Self::all().iter().copied().find(|kind| kind.yaml_key() == key);
        tracing::trace!("Reference type for key '{}': {:?}", key, found);
        found
    }

    pub fn is_reference_key(key: &str) -> bool {
        Self::from_yaml_key(key).is_some()
    }

    /// Try to parse a string into a ReferenceType, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Raw entries listed under this kind's key
    ///
    /// The value must be a list; anything else is logged and yields nothing.
    pub fn raw_references<'a>(&self, content: &'a Mapping) -> &'a [Value] {
        match content.get(self.yaml_key()) {
            Some(Value::Sequence(entries)) => entries.as_slice(),
            Some(Value::Null) | None => {
                tracing::trace!("Key '{}' not found or empty in kustomization", self.yaml_key());
                &[]
            }
            Some(_) => {
                tracing::warn!(
                    "Expected a list for key '{}', found another value type",
                    self.yaml_key()
                );
                &[]
            }
        }
    }

    /// Run this kind's extractor on one raw entry
    ///
    /// Yields one outcome per target. A failed entry yields its error; a
    /// generator yields one outcome per listed file so dropped files are
    /// reported individually.
    pub fn extract(&self, value: &Value, base_dir: &Path) -> Vec<Result<PathBuf, ReferenceError>> {
        tracing::debug!(
            "Extracting references for type '{}' using key '{}' with base dir: {}",
            self,
            self.yaml_key(),
            base_dir.display()
        );
        if *self == ReferenceType::ConfigMapGenerator {
            return extractors::config_generator_entries(value, base_dir);
        }
        match (self.extractor())(value, base_dir) {
            Ok(targets) => targets.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ReferenceType> for String {
    fn from(kind: ReferenceType) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown reference type: {}", s))
    }
}
