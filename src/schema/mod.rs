//! Schema ingestion: loading/normalizing Kubernetes OpenAPI documents (C2)
//! and building the kind catalog (C3).

mod catalog;
pub mod document;
mod loader;

pub use catalog::{Catalog, KindInfo, canonical_key};
pub use document::{Document, Gvk, Schema};
pub use loader::{load_from_path, load_from_url};
