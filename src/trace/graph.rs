//! Frozen kustomize dependency graph and its queries
//!
//! The graph is immutable once built. Both traversals carry a fresh
//! `visiting` set (nodes on the current path) and a `finished` set per
//! top-level call: meeting a node that is still being visited is a cycle and
//! is reported, meeting a finished node is a shared dependency and is skipped
//! quietly.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{KustomError, KustomResult};
use crate::models::{GraphNode, KustomFile, Kustomization, ResourceReference};
use crate::parser;
use crate::trace::models::BuildStats;

#[derive(Debug, Clone)]
pub struct KustomGraph {
    root_dir: PathBuf,
    nodes: HashMap<PathBuf, GraphNode>,
    stats: BuildStats,
}

impl KustomGraph {
    pub fn new(root_dir: PathBuf, nodes: HashMap<PathBuf, GraphNode>, stats: BuildStats) -> Self {
        Self {
            root_dir,
            nodes,
            stats,
        }
    }

    /// Directory the graph was built from
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node; `path` is canonicalized first
    pub fn node(&self, path: &Path) -> Option<&GraphNode> {
        self.nodes.get(&parser::normalize_path(path))
    }

    pub fn contains_node(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    pub fn kustomization(&self, path: &Path) -> Option<&Kustomization> {
        self.node(path).and_then(GraphNode::as_kustomization)
    }

    pub fn kustom_file(&self, path: &Path) -> Option<&KustomFile> {
        self.node(path).and_then(GraphNode::as_kustom_file)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Kustomizations nobody depends on, sorted by path
    pub fn root_apps(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .nodes
            .values()
            .filter(|node| node.is_root())
            .map(|node| node.path().to_path_buf())
            .collect();
        roots.sort();
        roots
    }

    /// Direct outgoing references of a node
    pub fn dependencies(&self, path: &Path) -> KustomResult<&[ResourceReference]> {
        self.node(path)
            .map(GraphNode::references)
            .ok_or_else(|| KustomError::UnreferencedFile(parser::normalize_path(path)))
    }

    /// Root applications whose dependency closure contains `path`, sorted
    pub fn apps_with(&self, path: &Path) -> KustomResult<Vec<PathBuf>> {
        let path = parser::normalize_path(path);
        if !self.nodes.contains_key(&path) {
            return Err(KustomError::UnreferencedFile(path));
        }

        let mut walk = Traversal::default();
        self.collect_roots(&path, &mut walk);
        let mut apps = walk.out;
        apps.sort();
        Ok(apps)
    }

    /// Every file an application pulls in, its own kustomization first
    ///
    /// `path` may be the app directory or its kustomization file.
    pub fn all_app_files(&self, path: &Path) -> KustomResult<Vec<PathBuf>> {
        let kustomization = self.app_kustomization(path)?;

        let mut walk = Traversal::default();
        self.collect_dependencies(&kustomization, &mut walk);
        Ok(walk.out)
    }

    /// Root applications affected by each of `paths`
    pub fn apps(&self, paths: &[PathBuf]) -> KustomResult<Vec<(PathBuf, Vec<PathBuf>)>> {
        paths
            .iter()
            .map(|path| self.apps_with(path).map(|apps| (path.clone(), apps)))
            .collect()
    }

    fn app_kustomization(&self, path: &Path) -> KustomResult<PathBuf> {
        let path = parser::normalize_path(path);
        let kustomization = if parser::files::is_directory(&path) {
            parser::find_kustomization_file(&path)?
        } else if parser::is_kustomization_file_name(&path) {
            path
        } else {
            return Err(KustomError::NotAnApp(path));
        };

        if !self.nodes.contains_key(&kustomization) {
            return Err(KustomError::UnreferencedFile(kustomization));
        }
        Ok(kustomization)
    }

    fn collect_dependencies(&self, path: &Path, walk: &mut Traversal) {
        let Some(node) = self.nodes.get(path) else {
            tracing::warn!("Referenced node missing from graph: {}", path.display());
            return;
        };

        let kustomization = match node {
            GraphNode::File(file) => {
                walk.push(file.path());
                return;
            }
            GraphNode::Kustomization(kustomization) => kustomization,
        };

        if walk.visiting.contains(path) {
            tracing::error!(
                "Circular dependency detected at: {}",
                kustomization.display_name()
            );
            return;
        }
        if walk.finished.contains(path) {
            return;
        }

        walk.visiting.insert(path.to_path_buf());
        walk.push(path);
        for reference in kustomization.references() {
            self.collect_dependencies(&reference.target, walk);
        }
        walk.visiting.remove(path);
        walk.finished.insert(path.to_path_buf());
    }

    fn collect_roots(&self, path: &Path, walk: &mut Traversal) {
        let Some(node) = self.nodes.get(path) else {
            tracing::warn!("Dependent node missing from graph: {}", path.display());
            return;
        };

        let kustomization = match node {
            GraphNode::File(file) => {
                for dependent in file.dependents() {
                    self.collect_roots(dependent, walk);
                }
                return;
            }
            GraphNode::Kustomization(kustomization) => kustomization,
        };

        if walk.visiting.contains(path) {
            tracing::error!(
                "Circular dependency detected at: {}",
                kustomization.display_name()
            );
            return;
        }
        if walk.finished.contains(path) {
            return;
        }

        if kustomization.is_root() {
            walk.push(path);
        } else {
            walk.visiting.insert(path.to_path_buf());
            for dependent in kustomization.dependents() {
                self.collect_roots(dependent, walk);
            }
            walk.visiting.remove(path);
        }
        walk.finished.insert(path.to_path_buf());
    }
}

/// Per-query traversal state
#[derive(Default)]
struct Traversal {
    visiting: HashSet<PathBuf>,
    finished: HashSet<PathBuf>,
    seen: HashSet<PathBuf>,
    out: Vec<PathBuf>,
}

impl Traversal {
    fn push(&mut self, path: &Path) {
        if self.seen.insert(path.to_path_buf()) {
            self.out.push(path.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceType;
    use serde_yaml::Mapping;

    fn unit(path: &str) -> GraphNode {
        GraphNode::Kustomization(Kustomization::new(PathBuf::from(path), Mapping::new()))
    }

    fn link(nodes: &mut HashMap<PathBuf, GraphNode>, from: &str, to: &str) {
        nodes
            .get_mut(Path::new(to))
            .unwrap()
            .add_dependent(PathBuf::from(from));
        nodes
            .get_mut(Path::new(from))
            .unwrap()
            .as_kustomization_mut()
            .unwrap()
            .add_reference(ResourceReference::new(ReferenceType::Resource, PathBuf::from(to)));
    }

    fn graph(nodes: HashMap<PathBuf, GraphNode>) -> KustomGraph {
        KustomGraph::new(PathBuf::from("/apps"), nodes, BuildStats::default())
    }

    /// overlay -> {left, right} -> base -> cm.yaml
    fn diamond() -> KustomGraph {
        let mut nodes = HashMap::new();
        for path in [
            "/apps/overlay/kustomization.yaml",
            "/apps/left/kustomization.yaml",
            "/apps/right/kustomization.yaml",
            "/apps/base/kustomization.yaml",
        ] {
            nodes.insert(PathBuf::from(path), unit(path));
        }
        nodes.insert(
            PathBuf::from("/apps/base/cm.yaml"),
            GraphNode::File(KustomFile::new(PathBuf::from("/apps/base/cm.yaml"))),
        );
        link(&mut nodes, "/apps/overlay/kustomization.yaml", "/apps/left/kustomization.yaml");
        link(&mut nodes, "/apps/overlay/kustomization.yaml", "/apps/right/kustomization.yaml");
        link(&mut nodes, "/apps/left/kustomization.yaml", "/apps/base/kustomization.yaml");
        link(&mut nodes, "/apps/right/kustomization.yaml", "/apps/base/kustomization.yaml");
        link(&mut nodes, "/apps/base/kustomization.yaml", "/apps/base/cm.yaml");
        graph(nodes)
    }

    #[test]
    fn test_diamond_closure_has_no_duplicates() {
        let graph = diamond();
        let files = graph
            .all_app_files(Path::new("/apps/overlay/kustomization.yaml"))
            .unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/apps/overlay/kustomization.yaml"),
                PathBuf::from("/apps/left/kustomization.yaml"),
                PathBuf::from("/apps/base/kustomization.yaml"),
                PathBuf::from("/apps/base/cm.yaml"),
                PathBuf::from("/apps/right/kustomization.yaml"),
            ]
        );
    }

    #[test]
    fn test_diamond_single_root() {
        let graph = diamond();
        assert_eq!(
            graph.root_apps(),
            vec![PathBuf::from("/apps/overlay/kustomization.yaml")]
        );
        assert_eq!(
            graph.apps_with(Path::new("/apps/base/cm.yaml")).unwrap(),
            vec![PathBuf::from("/apps/overlay/kustomization.yaml")]
        );
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let mut nodes = HashMap::new();
        nodes.insert(PathBuf::from("/apps/a/kustomization.yaml"), unit("/apps/a/kustomization.yaml"));
        nodes.insert(PathBuf::from("/apps/b/kustomization.yaml"), unit("/apps/b/kustomization.yaml"));
        link(&mut nodes, "/apps/a/kustomization.yaml", "/apps/b/kustomization.yaml");
        link(&mut nodes, "/apps/b/kustomization.yaml", "/apps/a/kustomization.yaml");
        let graph = graph(nodes);

        assert!(graph.root_apps().is_empty());
        assert!(graph
            .apps_with(Path::new("/apps/a/kustomization.yaml"))
            .unwrap()
            .is_empty());
        assert_eq!(
            graph
                .all_app_files(Path::new("/apps/a/kustomization.yaml"))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_unknown_paths() {
        let graph = diamond();
        assert!(matches!(
            graph.apps_with(Path::new("/apps/other.yaml")),
            Err(KustomError::UnreferencedFile(_))
        ));
        assert!(matches!(
            graph.all_app_files(Path::new("/apps/base/cm.yaml")),
            Err(KustomError::NotAnApp(_))
        ));
        assert!(matches!(
            graph.all_app_files(Path::new("/apps/gone/kustomization.yaml")),
            Err(KustomError::UnreferencedFile(_))
        ));
    }
}
