use thiserror::Error;

/// Failure to fetch, read or parse a specification document.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    #[error("invalid document location '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    #[error("failed to read {uri}: {source}")]
    Read {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {uri}: {message}")]
    Fetch { uri: String, message: String },

    #[error("failed to parse {uri}: {message}")]
    Parse { uri: String, message: String },

    #[error("failed to decode {uri} as an OpenAPI document: {message}")]
    Decode { uri: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A structural or semantic violation found in a raw, unresolved document.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("document root must be an object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unsupported specification version: {0}")]
    UnsupportedVersion(String),

    #[error("server URL \"{url}\" uses variable \"{variable}\" which is not defined in variables")]
    UndefinedServerVariable { url: String, variable: String },

    #[error("server variable \"{variable}\" of \"{url}\" must declare a string default")]
    MissingVariableDefault { url: String, variable: String },

    #[error("server variable \"{variable}\" of \"{url}\": {message}")]
    InvalidVariableEnum {
        url: String,
        variable: String,
        message: String,
    },

    #[error("server name \"{0}\" must be unique")]
    DuplicateServerName(String),

    #[error("invalid server at {location}: {message}")]
    InvalidServer { location: String, message: String },

    #[error("security scheme \"{name}\": {message}")]
    InvalidSecurityScheme { name: String, message: String },
}

/// Top-level failure while building the semantic model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Load(#[from] SpecLoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
