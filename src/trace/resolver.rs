//! Reference resolution for a single kustomization
//!
//! Walks every recognized reference key of a kustomization, runs the matching
//! extractor on each raw entry and asks the builder to materialize the
//! targets. A bad entry is logged and skipped; it never aborts its siblings.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{ReferenceError, Severity};
use crate::models::{ReferenceType, ResourceReference};
use crate::parser;
use crate::trace::graph_builder::KustomGraphBuilder;

pub struct ReferenceResolver<'a> {
    builder: &'a KustomGraphBuilder,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(builder: &'a KustomGraphBuilder) -> Self {
        Self { builder }
    }

    /// Resolve all references declared in `content`, in document order
    pub fn resolve_dependencies(&self, path: &Path, content: &Mapping) -> Vec<ResourceReference> {
        let base_dir = path.parent().unwrap_or(path);
        tracing::debug!("Resolving dependencies for: {}", path.display());

        let mut references = Vec::new();
        for key in content.keys() {
            let Some(kind) = key.as_str().and_then(ReferenceType::from_yaml_key) else {
                continue;
            };
            for raw in kind.raw_references(content) {
                references.extend(self.resolve_entry(kind, raw, base_dir));
            }
        }

        tracing::debug!(
            "Resolved {} reference(s) for: {}",
            references.len(),
            path.display()
        );
        references
    }

    fn resolve_entry(&self, kind: ReferenceType, raw: &Value, base_dir: &Path) -> Vec<ResourceReference> {
        kind.extract(raw, base_dir)
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(target) => self.materialize(kind, target),
                Err(e) => {
                    self.report(kind, base_dir, &e);
                    None
                }
            })
            .collect()
    }

    fn materialize(&self, kind: ReferenceType, target: PathBuf) -> Option<ResourceReference> {
        let result = if parser::is_kustomization_file_name(&target) {
            self.builder.build_kustomization(&target)
        } else {
            self.builder.build_kustom_file(&target)
        };

        match result {
            Ok(path) => Some(ResourceReference::new(kind, path)),
            Err(e) => {
                tracing::error!(
                    "Failed to build {} reference {}: {}",
                    kind,
                    target.display(),
                    e
                );
                None
            }
        }
    }

    fn report(&self, kind: ReferenceType, base_dir: &Path, e: &ReferenceError) {
        match e.severity {
            Severity::Error => tracing::error!(
                "Extraction failed for path '{}' and type '{}': {}: {}",
                base_dir.display(),
                kind,
                e,
                e.file_name()
            ),
            Severity::Warning => tracing::warn!(
                "Extraction failed for path '{}' and type '{}': {}: {}",
                base_dir.display(),
                kind,
                e,
                e.file_name()
            ),
        }
        self.builder.counters().record_reference(e.severity);
    }
}
