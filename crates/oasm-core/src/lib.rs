//! Resolution and normalization of OpenAPI 3.x and Swagger 2.0 documents
//! into a read-only semantic model.

pub mod analyze;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod model;
pub mod parse;
pub mod resolve;
pub mod transform;
pub mod validate;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{ModelError, SpecLoadError, ValidationError};
pub use model::ApiModel;
pub use resolve::{LoadedSpec, SpecLoader};
