//! Graph node model
//!
//! Nodes live in an arena keyed by their canonical path; every edge
//! (reference or dependent) is stored as a path into that arena, so cyclic
//! overlay trees need no shared ownership.

use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::models::ReferenceType;

/// One Kubernetes object parsed out of a manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KustomResource {
    pub kind: Option<String>,
    pub name: Option<String>,
    /// Path of the file holding this resource
    pub file: PathBuf,
}

impl KustomResource {
    pub fn new(kind: Option<String>, name: Option<String>, file: PathBuf) -> Self {
        Self { kind, name, file }
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("UndefinedKind")
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("undefined")
    }

    /// `<Kind> <name> (in <file>)`
    pub fn display_name(&self) -> String {
        format!(
            "{} {} (in {})",
            self.kind(),
            self.name(),
            self.file.to_string_lossy().replace('\\', "/")
        )
    }
}

/// A typed edge from a kustomization to the node it references
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceReference {
    pub kind: ReferenceType,
    pub target: PathBuf,
}

impl ResourceReference {
    pub fn new(kind: ReferenceType, target: PathBuf) -> Self {
        Self { kind, target }
    }
}

/// A kustomization file (composition unit)
#[derive(Debug, Clone)]
pub struct Kustomization {
    path: PathBuf,
    content: Mapping,
    references: Vec<ResourceReference>,
    dependents: Vec<PathBuf>,
}

impl Kustomization {
    pub fn new(path: PathBuf, content: Mapping) -> Self {
        Self {
            path,
            content,
            references: Vec::new(),
            dependents: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory of the kustomization file, i.e. the application directory
    pub fn app_dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    pub fn content(&self) -> &Mapping {
        &self.content
    }

    pub fn references(&self) -> &[ResourceReference] {
        &self.references
    }

    pub fn dependents(&self) -> &[PathBuf] {
        &self.dependents
    }

    pub fn add_reference(&mut self, reference: ResourceReference) {
        self.references.push(reference);
    }

    /// A kustomization no other kustomization depends on
    pub fn is_root(&self) -> bool {
        self.dependents.is_empty()
    }

    pub fn kind(&self) -> &'static str {
        "Kustomization"
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.kind(),
            self.path.to_string_lossy().replace('\\', "/")
        )
    }
}

/// Any other referenced file: manifests, patches, generator inputs
#[derive(Debug, Clone)]
pub struct KustomFile {
    path: PathBuf,
    resources: Vec<KustomResource>,
    dependents: Vec<PathBuf>,
}

impl KustomFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            resources: Vec::new(),
            dependents: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resources(&self) -> &[KustomResource] {
        &self.resources
    }

    pub fn dependents(&self) -> &[PathBuf] {
        &self.dependents
    }

    pub fn add_resource(&mut self, resource: KustomResource) {
        self.resources.push(resource);
    }

    /// First resource in the file, or an "Undefined" placeholder for files
    /// that hold no manifest (env files, plain text)
    pub fn resource(&self) -> KustomResource {
        self.resources.first().cloned().unwrap_or_else(|| {
            KustomResource::new(
                Some("Undefined".to_string()),
                Some("Undefined".to_string()),
                self.path.clone(),
            )
        })
    }
}

/// A node in the kustomize dependency graph
#[derive(Debug, Clone)]
pub enum GraphNode {
    Kustomization(Kustomization),
    File(KustomFile),
}

impl GraphNode {
    pub fn path(&self) -> &Path {
        match self {
            GraphNode::Kustomization(k) => k.path(),
            GraphNode::File(f) => f.path(),
        }
    }

    /// Kustomizations that reference this node directly
    pub fn dependents(&self) -> &[PathBuf] {
        match self {
            GraphNode::Kustomization(k) => k.dependents(),
            GraphNode::File(f) => f.dependents(),
        }
    }

    /// Record a dependent kustomization, ignoring duplicates
    pub fn add_dependent(&mut self, dependent: PathBuf) {
        let dependents = match self {
            GraphNode::Kustomization(k) => &mut k.dependents,
            GraphNode::File(f) => &mut f.dependents,
        };
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    /// Plain files are never roots
    pub fn is_root(&self) -> bool {
        match self {
            GraphNode::Kustomization(k) => k.is_root(),
            GraphNode::File(_) => false,
        }
    }

    pub fn is_kustomization(&self) -> bool {
        matches!(self, GraphNode::Kustomization(_))
    }

    pub fn is_kustom_file(&self) -> bool {
        matches!(self, GraphNode::File(_))
    }

    pub fn as_kustomization(&self) -> Option<&Kustomization> {
        match self {
            GraphNode::Kustomization(k) => Some(k),
            GraphNode::File(_) => None,
        }
    }

    pub fn as_kustomization_mut(&mut self) -> Option<&mut Kustomization> {
        match self {
            GraphNode::Kustomization(k) => Some(k),
            GraphNode::File(_) => None,
        }
    }

    pub fn as_kustom_file(&self) -> Option<&KustomFile> {
        match self {
            GraphNode::File(f) => Some(f),
            GraphNode::Kustomization(_) => None,
        }
    }

    /// Outgoing references; plain files have none
    pub fn references(&self) -> &[ResourceReference] {
        match self {
            GraphNode::Kustomization(k) => k.references(),
            GraphNode::File(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_derived_from_dependents() {
        let mut node = GraphNode::Kustomization(Kustomization::new(
            PathBuf::from("/apps/app/kustomization.yaml"),
            Mapping::new(),
        ));
        assert!(node.is_root());

        node.add_dependent(PathBuf::from("/apps/overlay/kustomization.yaml"));
        assert!(!node.is_root());
    }

    #[test]
    fn test_plain_file_is_never_root() {
        let node = GraphNode::File(KustomFile::new(PathBuf::from("/apps/app/cm.yaml")));
        assert!(node.dependents().is_empty());
        assert!(node.is_kustom_file());
        assert!(!node.is_root());
    }

    #[test]
    fn test_add_dependent_ignores_duplicates() {
        let mut node = GraphNode::File(KustomFile::new(PathBuf::from("/apps/base/cm.yaml")));
        let dependent = PathBuf::from("/apps/app/kustomization.yaml");
        node.add_dependent(dependent.clone());
        node.add_dependent(dependent.clone());
        assert_eq!(node.dependents(), &[dependent]);
    }

    #[test]
    fn test_resource_display_names() {
        let file = KustomFile::new(PathBuf::from("/apps/app/app.env"));
        let placeholder = file.resource();
        assert_eq!(placeholder.kind(), "Undefined");
        assert_eq!(placeholder.display_name(), "Undefined Undefined (in /apps/app/app.env)");

        let resource = KustomResource::new(None, None, PathBuf::from("/a.yaml"));
        assert_eq!(resource.display_name(), "UndefinedKind undefined (in /a.yaml)");

        let kustomization =
            Kustomization::new(PathBuf::from("/apps/app/kustomization.yaml"), Mapping::new());
        assert_eq!(
            kustomization.display_name(),
            "Kustomization /apps/app/kustomization.yaml"
        );
        assert_eq!(kustomization.app_dir(), Path::new("/apps/app"));
    }
}
