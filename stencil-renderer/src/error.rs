//! Error types for stencil-renderer.

use thiserror::Error;

/// All errors that can arise from compiling or executing templates.
#[derive(Debug, Error)]
pub enum RenderError {
    /// MiniJinja compile or execution error.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The delimiter pair cannot be used with the engine's syntax.
    #[error("invalid delimiters '{left}' and '{right}': {source}")]
    Delimiters {
        left: String,
        right: String,
        #[source]
        source: minijinja::Error,
    },

    /// Flushing rendered output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
