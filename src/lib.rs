//! Kustomize dependency tracing library
//!
//! Builds a dependency graph over a directory of kustomize applications and
//! answers which root applications a changed file affects and which files an
//! application is built from. It can be used both as a binary and as a
//! library for testing.

pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod trace;

// Re-export commonly used types for convenience
pub use error::{KustomError, KustomResult, ReferenceError, Severity};
pub use models::{GraphNode, KustomFile, KustomResource, Kustomization, ReferenceType, ResourceReference};
pub use trace::{BuildStats, KustomGraph, KustomGraphBuilder, KustomTrace};
