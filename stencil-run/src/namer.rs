//! Output naming: where each template in a directory scan renders to.
//!
//! Two strategies, chosen by whether an output map is configured:
//!
//! - [`StaticNamer`] joins the input's relative path onto the output
//!   directory.
//! - [`MappingNamer`] renders the output-map template once per input against
//!   a scope holding the context's named entries plus the reserved keys
//!   `input` (the relative input path) and `ctx` (the full context). The
//!   trimmed output, cleaned, is the destination.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stencil_renderer::{RenderingContext, TemplateEngine};

use crate::error::RunError;
use stencil_core::paths::{clean, join_clean};

/// Name the output-map template is registered under.
pub const OUTPUT_MAP_NAME: &str = "<OutputMap>";

/// Maps an input identifier to its output path.
pub trait OutputNamer {
    fn output_path(&self, input: &str) -> Result<PathBuf, RunError>;
}

/// `clean(join(output_dir, input))`.
#[derive(Debug, Clone)]
pub struct StaticNamer {
    output_dir: PathBuf,
}

impl StaticNamer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl OutputNamer for StaticNamer {
    fn output_path(&self, input: &str) -> Result<PathBuf, RunError> {
        Ok(join_clean(&self.output_dir, Path::new(input)))
    }
}

/// Renders the output-map template per input.
pub struct MappingNamer {
    engine: Arc<TemplateEngine>,
    context: RenderingContext,
}

impl MappingNamer {
    /// Register and compile `output_map`. A template that does not compile
    /// fails here, before any input is named.
    pub fn new(
        engine: Arc<TemplateEngine>,
        output_map: &str,
        context: RenderingContext,
    ) -> Result<Self, RunError> {
        engine.register(OUTPUT_MAP_NAME, output_map);
        engine
            .compile(OUTPUT_MAP_NAME)
            .map_err(|source| RunError::Naming {
                input: String::new(),
                scope: "<none>".to_string(),
                source,
            })?;
        Ok(Self { engine, context })
    }
}

impl OutputNamer for MappingNamer {
    fn output_path(&self, input: &str) -> Result<PathBuf, RunError> {
        let scope = self.context.mapping_scope(input);
        let rendered = self
            .engine
            .compile(OUTPUT_MAP_NAME)
            .and_then(|template| {
                self.engine
                    .execute_to_string(&template, &scope.clone().into_value())
            })
            .map_err(|source| RunError::Naming {
                input: input.to_string(),
                scope: scope.to_string(),
                source,
            })?;
        Ok(clean(Path::new(rendered.trim())))
    }
}

/// Pick the namer a configuration asks for.
pub fn choose_namer(
    output_dir: &Path,
    output_map: Option<&str>,
    engine: &Arc<TemplateEngine>,
    context: &RenderingContext,
) -> Result<Box<dyn OutputNamer>, RunError> {
    match output_map {
        None => Ok(Box::new(StaticNamer::new(output_dir))),
        Some(map) => Ok(Box::new(MappingNamer::new(
            Arc::clone(engine),
            map,
            context.clone(),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use stencil_data::Data;
    use stencil_renderer::{DataFunctions, Delimiters};
    use tempfile::TempDir;

    fn engine(data: Arc<Data>) -> Arc<TemplateEngine> {
        Arc::new(
            TemplateEngine::new(&Delimiters::default(), &DataFunctions::new(data))
                .expect("engine"),
        )
    }

    fn mapping(map: &str, contexts: &[String], data: Arc<Data>) -> MappingNamer {
        let context = RenderingContext::build(contexts, data.clone()).expect("context");
        MappingNamer::new(engine(data), map, context).expect("namer")
    }

    #[test]
    fn static_namer_joins_and_cleans() {
        let namer = StaticNamer::new("out");
        assert_eq!(namer.output_path("a/b.t").unwrap(), PathBuf::from("out/a/b.t"));
        assert_eq!(namer.output_path(".").unwrap(), PathBuf::from("out"));
        assert_eq!(namer.output_path("a/../../b").unwrap(), PathBuf::from("b"));
    }

    #[test]
    fn mapping_namer_uses_input() {
        let namer = mapping("{{ input }}.out", &[], Arc::new(Data::empty()));
        assert_eq!(namer.output_path("a/b").unwrap(), PathBuf::from("a/b.out"));
    }

    #[test]
    fn mapping_namer_trims_and_cleans() {
        let namer = mapping("  out/./{{ input }}\n", &[], Arc::new(Data::empty()));
        assert_eq!(namer.output_path("x/../y").unwrap(), PathBuf::from("out/y"));
    }

    #[test]
    fn mapping_namer_sees_context_entries_directly_and_via_ctx() {
        let tmp = TempDir::new().unwrap();
        let cfg = tmp.path().join("cfg.json");
        fs::write(&cfg, json!({"dir": "build"}).to_string()).unwrap();
        let decls = vec![format!("cfg={}", cfg.display())];
        let data = Arc::new(Data::new(&decls, &[]).unwrap());

        let namer = mapping("{{ cfg.dir }}/{{ ctx.cfg.dir }}/{{ input }}", &decls, data);
        assert_eq!(
            namer.output_path("f.txt").unwrap(),
            PathBuf::from("build/build/f.txt")
        );
    }

    #[test]
    fn mapping_namer_over_root_value_context() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root.json");
        fs::write(&root, json!({"prefix": "gen"}).to_string()).unwrap();
        let decls = vec![format!(".={}", root.display())];
        let data = Arc::new(Data::new(&decls, &[]).unwrap());

        let namer = mapping("{{ ctx.prefix }}/{{ input }}", &decls, data);
        assert_eq!(namer.output_path("a").unwrap(), PathBuf::from("gen/a"));
    }

    #[test]
    fn render_failure_names_the_input() {
        let namer = mapping("{{ missing.value }}", &[], Arc::new(Data::empty()));
        let err = namer.output_path("some/input.t").unwrap_err();
        assert!(matches!(err, RunError::Naming { .. }), "got: {err}");
        let msg = err.to_string();
        assert!(msg.contains("some/input.t"), "got: {msg}");
        assert!(msg.contains("input: \"some/input.t\""), "scope missing from: {msg}");
    }

    #[test]
    fn broken_output_map_fails_at_construction() {
        let data = Arc::new(Data::empty());
        let context = RenderingContext::empty(data.clone());
        let err = MappingNamer::new(engine(data), "{% if %}", context)
            .err()
            .expect("compile must fail");
        assert!(matches!(err, RunError::Naming { .. }));
    }
}
