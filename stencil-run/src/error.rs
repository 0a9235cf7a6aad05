//! Error types for stencil-run.

use std::path::PathBuf;

use thiserror::Error;

use stencil_core::{ConfigError, SourceError};
use stencil_data::DataError;
use stencil_renderer::RenderError;

/// Every way a run can fail. Nothing here is retried.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A `--template` source could not be resolved.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Data-source declarations or the root context could not be loaded.
    #[error("datasource error: {0}")]
    Data(#[from] DataError),

    /// The engine could not be built, or a template outside the batch failed.
    #[error(transparent)]
    Engine(#[from] RenderError),

    /// The output-map template failed for one input.
    #[error("failed to render output map for '{input}' with scope {scope}: {source}")]
    Naming {
        input: String,
        scope: String,
        #[source]
        source: RenderError,
    },

    /// A primary template failed to compile or execute.
    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: RenderError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An `--exclude`/`--include` glob is malformed.
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Convenience constructor for [`RunError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RunError {
    RunError::Io {
        path: path.into(),
        source,
    }
}
