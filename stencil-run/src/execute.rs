//! Sequential, fail-fast execution of gathered templates.

use std::time::Instant;

use minijinja::Value;
use stencil_core::TemplateDescriptor;
use stencil_renderer::{RenderError, TemplateEngine};

use crate::error::RunError;
use crate::metrics::Metrics;
use crate::writer::TargetWriter;

/// Render `templates` in order against `context`.
///
/// Every descriptor must already be registered with `engine`. The first
/// failure increments `metrics.errors` and stops the batch; templates after
/// it are never compiled and their targets never opened. The total render
/// duration is recorded however the batch ends.
pub fn run_templates(
    engine: &TemplateEngine,
    context: &Value,
    templates: &[TemplateDescriptor],
    metrics: &mut Metrics,
) -> Result<(), RunError> {
    let start = Instant::now();
    let result = run_all(engine, context, templates, metrics);
    metrics.total_render_duration = start.elapsed();
    result
}

fn run_all(
    engine: &TemplateEngine,
    context: &Value,
    templates: &[TemplateDescriptor],
    metrics: &mut Metrics,
) -> Result<(), RunError> {
    for template in templates {
        let start = Instant::now();
        let result = render_one(engine, context, template);
        metrics
            .render_duration
            .insert(template.name.clone(), start.elapsed());

        if let Err(e) = result {
            metrics.errors += 1;
            tracing::error!("{e}");
            return Err(e);
        }
        metrics.templates_processed += 1;
        tracing::info!("rendered {} -> {}", template.name, template.target);
    }
    Ok(())
}

fn render_one(
    engine: &TemplateEngine,
    context: &Value,
    template: &TemplateDescriptor,
) -> Result<(), RunError> {
    let render_err = |source: RenderError| RunError::Render {
        name: template.name.clone(),
        source,
    };

    let compiled = engine.compile(&template.name).map_err(render_err)?;
    let mut sink = TargetWriter::open(&template.target);
    engine
        .execute(&compiled, context, &mut sink)
        .map_err(render_err)?;
    sink.finish()
}
