//! Stencil core library: run configuration, validation, template aliases,
//! and the descriptor types handed between gathering and execution.
//!
//! - [`config`]: [`Config`], defaults, validation, YAML loading
//! - [`aliases`]: `--template` argument resolution into an [`AliasMap`]
//! - [`paths`]: lexical path cleaning shared by aliases and output naming
//! - [`types`]: [`TemplateDescriptor`] and [`Target`]
//! - [`error`]: [`ConfigError`], [`SourceError`]

pub mod aliases;
pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use aliases::{resolve_aliases, AliasMap};
pub use config::{Config, InputMode, DEFAULT_LEFT_DELIM, DEFAULT_RIGHT_DELIM, STDIO_ARG};
pub use error::{ConfigError, SourceError};
pub use types::{Target, TemplateDescriptor};
