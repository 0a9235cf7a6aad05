//! MiniJinja rendering engine: [`TemplateEngine`] and its shared template
//! namespace.
//!
//! Every template a run knows about (primary templates, `--template` aliases,
//! the output-map template) is registered by name in one source map. The
//! environment's loader reads from that map on first use, so a template is
//! compiled only when it, or something including it, is executed, and any
//! template can `{% include %}` any other by name.
//!
//! Only the *variable* delimiters are configurable; block (`{% %}`) and
//! comment (`{# #}`) delimiters stay at their defaults.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::syntax::SyntaxConfig;
use minijinja::value::ValueKind;
use minijinja::{escape_formatter, AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};

use stencil_core::{AliasMap, DEFAULT_LEFT_DELIM, DEFAULT_RIGHT_DELIM};

use crate::error::RenderError;

/// A compiled template borrowed from its [`TemplateEngine`].
pub type Compiled<'env> = minijinja::Template<'env, 'env>;

/// Left/right variable delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_LEFT_DELIM, DEFAULT_RIGHT_DELIM)
    }
}

/// Functions exposed to templates. Installed once when the engine is built.
pub trait FunctionTable {
    fn install(&self, env: &mut Environment<'static>);
}

#[derive(Debug, Clone)]
enum TemplateSource {
    Inline(String),
    File(PathBuf),
}

type SourceMap = Arc<RwLock<HashMap<String, TemplateSource>>>;

fn load_source(sources: &SourceMap, name: &str) -> Result<Option<String>, minijinja::Error> {
    let source = sources
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned();
    match source {
        None => Ok(None),
        Some(TemplateSource::Inline(text)) => Ok(Some(text)),
        Some(TemplateSource::File(path)) => std::fs::read_to_string(&path).map(Some).map_err(|e| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to read template '{name}' from {}: {e}", path.display()),
            )
        }),
    }
}

/// One run's template namespace plus the environment that compiles and
/// executes it.
pub struct TemplateEngine {
    env: Environment<'static>,
    sources: SourceMap,
}

impl TemplateEngine {
    /// Build an engine with the given delimiters and function table and an
    /// empty namespace.
    pub fn new(delimiters: &Delimiters, functions: &dyn FunctionTable) -> Result<Self, RenderError> {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .variable_delimiters(delimiters.left.clone(), delimiters.right.clone())
            .build()
            .map_err(|source| RenderError::Delimiters {
                left: delimiters.left.clone(),
                right: delimiters.right.clone(),
                source,
            })?;
        env.set_syntax(syntax);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        // Booleans print as `true`/`false`.
        env.set_formatter(|out, state, value| {
            if value.kind() == ValueKind::Bool {
                out.write_str(if value.is_true() { "true" } else { "false" })?;
                return Ok(());
            }
            escape_formatter(out, state, value)
        });

        let sources = SourceMap::default();
        let loader_sources = Arc::clone(&sources);
        env.set_loader(move |name| load_source(&loader_sources, name));

        functions.install(&mut env);
        Ok(TemplateEngine { env, sources })
    }

    /// Register template text under `name`, replacing any earlier source.
    pub fn register(&self, name: &str, contents: impl Into<String>) {
        self.insert(name, TemplateSource::Inline(contents.into()));
    }

    /// Register every alias as a lazily-read template file.
    pub fn register_aliases(&self, aliases: &AliasMap) {
        for (alias, path) in aliases {
            self.insert(alias, TemplateSource::File(path.clone()));
        }
    }

    fn insert(&self, name: &str, source: TemplateSource) {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), source);
    }

    /// Compile (or fetch the cached compilation of) a registered template.
    pub fn compile(&self, name: &str) -> Result<Compiled<'_>, RenderError> {
        Ok(self.env.get_template(name)?)
    }

    /// Execute a compiled template against `context`, streaming into `out`.
    pub fn execute(
        &self,
        template: &Compiled<'_>,
        context: &Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        template.render_to_write(context, &mut *out)?;
        out.flush()?;
        Ok(())
    }

    /// Execute a compiled template into a string.
    pub fn execute_to_string(
        &self,
        template: &Compiled<'_>,
        context: &Value,
    ) -> Result<String, RenderError> {
        Ok(template.render(context)?)
    }
}
