//! Graph model layer
//!
//! Structure:
//! - `reference_type.rs` - The closed set of kustomization reference kinds
//! - `node.rs` - Graph nodes (kustomizations and plain files) and their edges

pub mod node;
pub mod reference_type;

pub use node::{GraphNode, KustomFile, KustomResource, Kustomization, ResourceReference};
pub use reference_type::ReferenceType;
