//! Normalization of extracted operations and component schemas.

pub mod discriminator;
pub mod name_normalizer;
pub mod paths;
pub mod registry;
pub mod schema_resolver;

pub use discriminator::{DiscriminatorInfo, DiscriminatorRegistry, PolymorphicOption};
pub use paths::{ExtractOptions, extract_paths, extract_paths_with_options};
pub use registry::{NamedSchema, SchemaRegistry};
pub use schema_resolver::TypeMapper;
