//! Kustomize dependency tracing
//!
//! Builds the dependency graph of a directory of kustomize applications and
//! answers the two questions it exists for: which root applications does a
//! changed file affect, and which files does an application use.

mod core;
pub mod graph;
pub mod graph_builder;
mod models;
pub mod resolver;

use std::path::{Path, PathBuf};

use crate::error::KustomResult;

pub use self::core::{resolve_kustom_file, resolve_kustomization, resolve_resource};
pub use graph::KustomGraph;
pub use graph_builder::KustomGraphBuilder;
pub use models::BuildStats;
pub use resolver::ReferenceResolver;

/// Query facade over one built graph
#[derive(Debug, Clone)]
pub struct KustomTrace {
    graph: KustomGraph,
}

impl KustomTrace {
    /// Build the graph for `apps_dir` on the global rayon pool
    pub fn from_directory(apps_dir: impl AsRef<Path>) -> KustomResult<Self> {
        Self::from_directory_with_threads(apps_dir, 0)
    }

    /// Build the graph for `apps_dir` with a dedicated pool of `threads`
    pub fn from_directory_with_threads(apps_dir: impl AsRef<Path>, threads: usize) -> KustomResult<Self> {
        let graph = KustomGraphBuilder::new(apps_dir).threads(threads).build()?;
        Ok(Self::from_graph(graph))
    }

    pub fn from_graph(graph: KustomGraph) -> Self {
        Self { graph }
    }

    pub fn apps_dir(&self) -> &Path {
        self.graph.root_dir()
    }

    /// Kustomization files of all root applications
    pub fn root_apps(&self) -> Vec<PathBuf> {
        self.graph.root_apps()
    }

    /// Root applications affected by a change to `file`
    pub fn apps_with(&self, file: &Path) -> KustomResult<Vec<PathBuf>> {
        self.graph.apps_with(file)
    }

    /// Files used by the application at `app` (directory or kustomization file)
    pub fn app_files(&self, app: &Path) -> KustomResult<Vec<PathBuf>> {
        self.graph.all_app_files(app)
    }

    pub fn graph(&self) -> &KustomGraph {
        &self.graph
    }

    pub fn stats(&self) -> &BuildStats {
        self.graph.stats()
    }
}
