//! # stencil-run
//!
//! Gather-and-render orchestration.
//!
//! Call [`run_templates`] to render everything a [`Config`](stencil_core::Config)
//! describes, or [`render_template`] to render a single stream. A run gathers
//! every template with its destination resolved (see [`gather`] and
//! [`namer`]), then executes them in order, stopping at the first failure
//! (see [`execute`]). The [`Metrics`] of the run come back in the
//! [`RunOutcome`] whether or not it succeeded.

pub mod cleanup;
pub mod error;
pub mod execute;
pub mod filter;
pub mod gather;
pub mod metrics;
pub mod namer;
pub mod pipeline;
pub mod writer;

pub use cleanup::CleanupStack;
pub use error::RunError;
pub use metrics::Metrics;
pub use namer::{MappingNamer, OutputNamer, StaticNamer};
pub use pipeline::{render_template, run_templates, run_templates_with, RenderOptions, RunOutcome};
