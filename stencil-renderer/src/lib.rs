//! # stencil-renderer
//!
//! MiniJinja-backed template execution for Stencil: one shared template
//! namespace per run, configurable variable delimiters, a pluggable function
//! table, and the rendering context built from data-source declarations.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stencil_data::Data;
//! use stencil_renderer::{DataFunctions, Delimiters, RenderingContext, TemplateEngine};
//!
//! fn render() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = Arc::new(Data::new(&["cfg=config.yaml".to_string()], &[])?);
//!     let engine = TemplateEngine::new(&Delimiters::default(), &DataFunctions::new(data.clone()))?;
//!     let context = RenderingContext::build(&["cfg=config.yaml".to_string()], data)?;
//!
//!     engine.register("hello", "Hello, {{ cfg.name }}!\n");
//!     let template = engine.compile("hello")?;
//!     engine.execute(&template, &context.to_value(), &mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;

pub use context::{NamedSources, RenderingContext, INPUT_KEY, ROOT_ALIAS, ROOT_KEY};
pub use engine::{Compiled, Delimiters, FunctionTable, TemplateEngine};
pub use error::RenderError;
pub use functions::DataFunctions;
