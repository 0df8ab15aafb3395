//! Document loading and reference resolution.

pub mod cache;
pub mod fetch;
pub mod loader;
pub mod pointer;
pub mod ref_resolve;

pub use cache::DocumentCache;
pub use fetch::{DefaultFetcher, DocumentFetcher};
pub use loader::{LoadedSpec, SpecLoader, load};
pub use ref_resolve::{
    ReferenceResolver, find_refs, index_schema_ids, inline_schema, invalid_refs,
};
