//! Graph builder for discovering kustomization relationships
//!
//! Nodes are kept in a concurrent arena keyed by canonical path. Every node is
//! built at most once: the file is parsed outside any lock, then inserted with
//! an atomic insert-if-absent. Only the thread that wins the insert resolves
//! and wires the kustomization's references, so a reference cycle terminates
//! on the second visit and no wiring is ever duplicated. A file that fails
//! to parse is remembered, so it is parsed and counted once no matter how
//! many kustomizations reference it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dashmap::{DashMap, DashSet};
use dashmap::mapref::entry::Entry;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{KustomError, KustomResult};
use crate::models::{GraphNode, ResourceReference};
use crate::parser;
use crate::trace::core;
use crate::trace::graph::KustomGraph;
use crate::trace::models::BuildCounters;
use crate::trace::resolver::ReferenceResolver;

/// Builds a [`KustomGraph`] for one apps directory
pub struct KustomGraphBuilder {
    apps_dir: PathBuf,
    threads: usize,
    nodes: DashMap<PathBuf, GraphNode>,
    failed: DashSet<PathBuf>,
    counters: BuildCounters,
}

impl KustomGraphBuilder {
    pub fn new(apps_dir: impl AsRef<Path>) -> Self {
        Self {
            apps_dir: parser::normalize_path(apps_dir.as_ref()),
            threads: 0,
            nodes: DashMap::new(),
            failed: DashSet::new(),
            counters: BuildCounters::default(),
        }
    }

    /// Size of the build thread pool; `0` uses the global rayon pool
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn apps_dir(&self) -> &Path {
        &self.apps_dir
    }

    pub(crate) fn counters(&self) -> &BuildCounters {
        &self.counters
    }

    /// Walk the apps directory, build every kustomization found and freeze
    /// the result
    ///
    /// Fails only if the apps directory is unusable or cannot be walked.
    /// Individual files that fail to parse are logged and counted.
    pub fn build(self) -> KustomResult<KustomGraph> {
        if !parser::files::is_directory(&self.apps_dir) {
            return Err(KustomError::InvalidAppsDir(self.apps_dir.clone()));
        }

        tracing::info!("Building kustomize graph for: {}", self.apps_dir.display());
        let kustomizations = self.find_kustomization_files()?;
        tracing::debug!("Found {} kustomization file(s)", kustomizations.len());

        if self.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .map_err(|e| KustomError::io(&self.apps_dir, std::io::Error::other(e)))?;
            pool.install(|| self.build_all(&kustomizations));
        } else {
            self.build_all(&kustomizations);
        }

        let graph = self.freeze();
        tracing::info!(
            "Graph built with {} kustomization(s) and {} file(s)",
            graph.stats().kustomizations,
            graph.stats().files
        );
        Ok(graph)
    }

    fn find_kustomization_files(&self) -> KustomResult<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.apps_dir) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.apps_dir.clone());
                KustomError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            let path = entry.path();
            if parser::files::is_file(path) && parser::is_kustomization_file_name(path) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        Ok(found)
    }

    fn build_all(&self, kustomizations: &[PathBuf]) {
        kustomizations.par_iter().for_each(|path| {
            if let Err(e) = self.build_kustomization(path) {
                tracing::error!("Failed to build kustomization {}: {}", path.display(), e);
            }
        });
    }

    /// Build-or-get a kustomization node and return its canonical path
    pub fn build_kustomization(&self, path: &Path) -> KustomResult<PathBuf> {
        let path = parser::normalize_path(path);
        if self.nodes.contains_key(&path) {
            tracing::trace!("Kustomization already in graph: {}", path.display());
            return Ok(path);
        }
        self.check_not_failed(&path)?;

        let kustomization =
            core::resolve_kustomization(&path).map_err(|e| self.mark_failed(&path, e))?;
        let content = kustomization.content().clone();

        match self.nodes.entry(path.clone()) {
            Entry::Occupied(_) => {
                tracing::trace!("Kustomization built concurrently: {}", path.display());
                return Ok(path);
            }
            Entry::Vacant(slot) => {
                slot.insert(GraphNode::Kustomization(kustomization));
            }
        }

        let references = ReferenceResolver::new(self).resolve_dependencies(&path, &content);
        for reference in references {
            self.set_mutual_reference(&path, reference);
        }
        Ok(path)
    }

    /// Build-or-get a plain file node and return its canonical path
    pub fn build_kustom_file(&self, path: &Path) -> KustomResult<PathBuf> {
        let path = parser::normalize_path(path);
        if self.nodes.contains_key(&path) {
            return Ok(path);
        }
        self.check_not_failed(&path)?;

        let file = core::resolve_kustom_file(&path).map_err(|e| self.mark_failed(&path, e))?;
        self.nodes
            .entry(path.clone())
            .or_insert(GraphNode::File(file));
        Ok(path)
    }

    fn check_not_failed(&self, path: &Path) -> KustomResult<()> {
        if self.failed.contains(path) {
            tracing::trace!("Skipping previously failed file: {}", path.display());
            return Err(KustomError::InvalidContent(path.to_path_buf()));
        }
        Ok(())
    }

    /// Remember `path` as unusable; only the first failure is counted
    fn mark_failed(&self, path: &Path, error: KustomError) -> KustomError {
        if self.failed.insert(path.to_path_buf()) {
            self.counters.record_invalid_file();
        }
        error
    }

    /// Record `reference` on `source` and `source` as a dependent of the target
    fn set_mutual_reference(&self, source: &Path, reference: ResourceReference) {
        if let Some(mut target) = self.nodes.get_mut(&reference.target) {
            target.add_dependent(source.to_path_buf());
        }
        if let Some(mut node) = self.nodes.get_mut(source) {
            if let Some(kustomization) = node.as_kustomization_mut() {
                tracing::trace!(
                    "Wiring {} {} -> {}",
                    reference.kind,
                    source.display(),
                    reference.target.display()
                );
                kustomization.add_reference(reference);
            }
        }
    }

    fn freeze(self) -> KustomGraph {
        let nodes: HashMap<PathBuf, GraphNode> = self.nodes.into_iter().collect();
        let kustomizations = nodes.values().filter(|n| n.is_kustomization()).count();
        let stats = self
            .counters
            .snapshot(kustomizations, nodes.len() - kustomizations);
        KustomGraph::new(self.apps_dir, nodes, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_build_or_get_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/kustomization.yaml", "resources:\n  - cm.yaml\n");
        write(dir.path(), "app/cm.yaml", "kind: ConfigMap\n");

        let builder = KustomGraphBuilder::new(dir.path());
        let first = builder
            .build_kustomization(&dir.path().join("app/kustomization.yaml"))
            .unwrap();
        let second = builder
            .build_kustomization(&dir.path().join("app/./../app/kustomization.yaml"))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(builder.nodes.len(), 2);

        let graph = builder.freeze();
        let cm = graph.node(&dir.path().join("app/cm.yaml")).unwrap();
        assert_eq!(cm.dependents(), &[first]);
    }

    #[test]
    fn test_missing_apps_dir() {
        let dir = TempDir::new().unwrap();
        let err = KustomGraphBuilder::new(dir.path().join("nope"))
            .build()
            .unwrap_err();
        assert!(matches!(err, KustomError::InvalidAppsDir(_)));
    }

    #[test]
    fn test_invalid_kustomization_is_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad/kustomization.yaml", "a: b\n---\nc: d\n");
        write(dir.path(), "good/kustomization.yaml", "resources: []\n");

        let graph = KustomGraphBuilder::new(dir.path()).threads(2).build().unwrap();
        assert_eq!(graph.stats().kustomizations, 1);
        assert_eq!(graph.stats().invalid_files, 1);
    }

    #[test]
    fn test_failed_file_is_parsed_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad/kustomization.yaml", "- not\n- a mapping\n");

        let builder = KustomGraphBuilder::new(dir.path());
        let bad = dir.path().join("bad/kustomization.yaml");
        assert!(builder.build_kustomization(&bad).is_err());
        assert!(matches!(
            builder.build_kustomization(&bad),
            Err(KustomError::InvalidContent(_))
        ));
        assert_eq!(builder.failed.len(), 1);
        assert_eq!(builder.freeze().stats().invalid_files, 1);
    }
}
