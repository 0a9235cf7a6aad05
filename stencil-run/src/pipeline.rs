//! Top-level entry points: run everything a [`Config`] describes, or render
//! a single stream.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Instant;

use stencil_core::{resolve_aliases, Config, TemplateDescriptor};
use stencil_data::{Data, DataProvider};
use stencil_renderer::{DataFunctions, Delimiters, RenderingContext, TemplateEngine};

use crate::cleanup::CleanupStack;
use crate::error::{io_err, RunError};
use crate::execute;
use crate::gather::{gather_templates, INLINE_NAME};
use crate::metrics::Metrics;
use crate::namer::choose_namer;

/// The result of one run together with its metrics.
#[derive(Debug)]
pub struct RunOutcome {
    pub metrics: Metrics,
    pub result: Result<(), RunError>,
}

impl RunOutcome {
    fn failed(error: RunError) -> Self {
        RunOutcome {
            metrics: Metrics::new(),
            result: Err(error),
        }
    }

    /// Drop the metrics of a failed run.
    pub fn into_result(self) -> Result<Metrics, RunError> {
        self.result.map(|()| self.metrics)
    }
}

/// Options for [`render_template`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub delimiters: Delimiters,
}

/// Render every template `config` addresses, with data sources built from
/// its `datasources` and `contexts` declarations.
pub fn run_templates(config: &Config) -> RunOutcome {
    if let Err(e) = config.validate() {
        return RunOutcome::failed(e.into());
    }
    let data = match Data::new(&config.all_datasources(), &config.datasource_headers) {
        Ok(data) => data,
        Err(e) => return RunOutcome::failed(e.into()),
    };
    run_validated(config, Arc::new(data))
}

/// Same as [`run_templates`], with the data provider supplied by the caller.
pub fn run_templates_with(config: &Config, provider: Arc<dyn DataProvider>) -> RunOutcome {
    if let Err(e) = config.validate() {
        return RunOutcome::failed(e.into());
    }
    run_validated(config, provider)
}

fn run_validated(config: &Config, provider: Arc<dyn DataProvider>) -> RunOutcome {
    let mut cleanup = CleanupStack::new();
    {
        let provider = Arc::clone(&provider);
        cleanup.push(move || provider.cleanup());
    }

    let mut metrics = Metrics::new();
    let result = run(config, provider, &mut metrics);
    cleanup.run();

    tracing::debug!(
        "gathered {} template(s), rendered {}, {} error(s)",
        metrics.templates_gathered,
        metrics.templates_processed,
        metrics.errors
    );
    RunOutcome { metrics, result }
}

fn run(
    config: &Config,
    provider: Arc<dyn DataProvider>,
    metrics: &mut Metrics,
) -> Result<(), RunError> {
    let aliases = resolve_aliases(&config.templates)?;
    let context = RenderingContext::build(&config.contexts, Arc::clone(&provider))?;

    let delimiters = Delimiters::new(config.left_delim(), config.right_delim());
    let engine = Arc::new(TemplateEngine::new(
        &delimiters,
        &DataFunctions::new(Arc::clone(&provider)),
    )?);
    engine.register_aliases(&aliases);

    let start = Instant::now();
    let gathered = gather(config, &engine, &context);
    metrics.gather_duration = start.elapsed();
    let templates = gathered.map_err(|e| {
        metrics.errors += 1;
        e
    })?;
    metrics.templates_gathered = templates.len();

    for template in &templates {
        engine.register(&template.name, template.contents.clone());
    }
    execute::run_templates(&engine, &context.to_value(), &templates, metrics)
}

fn gather(
    config: &Config,
    engine: &Arc<TemplateEngine>,
    context: &RenderingContext,
) -> Result<Vec<TemplateDescriptor>, RunError> {
    let namer = choose_namer(
        config.output_dir(),
        config.output_map.as_deref(),
        engine,
        context,
    )?;
    gather_templates(config, namer.as_ref())
}

/// Render one template read from `input` into `output`.
///
/// The function table is installed over an empty data provider, so `ds` and
/// friends see no sources; the context is empty.
pub fn render_template(
    input: &mut dyn Read,
    output: &mut dyn Write,
    options: Option<&RenderOptions>,
) -> Result<(), RunError> {
    let mut contents = String::new();
    input
        .read_to_string(&mut contents)
        .map_err(|e| io_err("<input>", e))?;

    let provider: Arc<dyn DataProvider> = Arc::new(Data::empty());
    let mut cleanup = CleanupStack::new();
    {
        let provider = Arc::clone(&provider);
        cleanup.push(move || provider.cleanup());
    }

    let delimiters = options.map(|o| o.delimiters.clone()).unwrap_or_default();
    let engine = TemplateEngine::new(&delimiters, &DataFunctions::new(Arc::clone(&provider)))?;
    engine.register(INLINE_NAME, contents);

    let render_err = |source| RunError::Render {
        name: INLINE_NAME.to_string(),
        source,
    };
    let compiled = engine.compile(INLINE_NAME).map_err(render_err)?;
    let context = RenderingContext::empty(provider).to_value();
    engine
        .execute(&compiled, &context, output)
        .map_err(render_err)?;

    cleanup.run();
    Ok(())
}
