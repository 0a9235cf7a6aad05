//! Error types for stencil-data.

use thiserror::Error;

/// All errors that can arise from declaring or fetching data sources.
#[derive(Debug, Error)]
pub enum DataError {
    /// Declaration is neither `alias=URL` nor a bare file in the working directory.
    #[error("invalid datasource '{0}': provide an alias for sources outside the working directory")]
    InvalidDeclaration(String),

    #[error("invalid datasource header '{0}': expected 'alias=Name: value'")]
    InvalidHeader(String),

    /// No source was declared under this alias.
    #[error("undefined datasource '{0}'")]
    Undefined(String),

    #[error("failed to read datasource '{alias}' from {location}: {source}")]
    Io {
        alias: String,
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request for datasource '{alias}' failed: {source}")]
    Http {
        alias: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("datasource '{alias}' is not valid JSON: {source}")]
    Json {
        alias: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("datasource '{alias}' is not valid YAML: {source}")]
    Yaml {
        alias: String,
        #[source]
        source: serde_yaml::Error,
    },
}
