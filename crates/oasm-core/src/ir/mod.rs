pub mod grouping;
pub mod operations;
pub mod schemas;
pub mod types;

pub use grouping::{Resource, ResourceAction, ResourceOperation, ResourceProperty};
pub use operations::*;
pub use schemas::*;
pub use types::NormalizedName;
