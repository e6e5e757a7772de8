//! Parsing layer
//!
//! File naming conventions, document parsing, and the reference extraction
//! strategies used by the graph builder.

pub mod extractors;
pub mod files;
pub mod yaml;

pub use extractors::ReferenceExtractor;
pub use files::{
    KUSTOMIZATION_FILE_NAMES, MANIFEST_EXTENSIONS, find_kustomization_file,
    is_kustomization_file_name, is_valid_kubernetes_resource, normalize_path,
};
pub use yaml::{parse_file, parse_kustomization_file};
