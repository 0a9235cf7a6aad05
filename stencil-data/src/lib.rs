//! # stencil-data
//!
//! Named data sources for template rendering.
//!
//! Sources are declared as `alias=URL` (or a bare file name in the working
//! directory, aliased by its stem) and fetched lazily on first use. The
//! [`DataProvider`] trait is the seam the renderer and run pipeline depend on;
//! [`Data`] is the built-in implementation covering files, environment
//! variables, stdin, and HTTP(S).

pub mod error;
pub mod provider;
pub mod source;

pub use error::DataError;
pub use provider::{Data, DataProvider};
pub use source::{parse_declaration, parse_header, Location, SourceDecl};
