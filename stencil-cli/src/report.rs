//! `--verbose` output on stderr.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use stencil_core::Config;
use stencil_run::Metrics;

#[derive(Tabled)]
struct DurationRow {
    #[tabled(rename = "template")]
    template: String,
    #[tabled(rename = "duration")]
    duration: String,
}

/// Version and effective configuration, printed before rendering.
pub fn print_preamble(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("failed to serialize configuration")?;
    eprintln!("{} v{}", "stencil".bold(), env!("CARGO_PKG_VERSION"));
    eprintln!("{}", "config:".bright_black());
    eprint!("{yaml}");
    Ok(())
}

/// Totals and per-template render times, printed after rendering.
pub fn print_summary(metrics: &Metrics) {
    eprintln!("{}", summary_line(metrics));
    if metrics.render_duration.is_empty() {
        return;
    }

    let rows: Vec<DurationRow> = metrics
        .render_duration
        .iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(name, duration)| DurationRow {
            template: name.clone(),
            duration: format_duration(*duration),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    eprintln!("{table}");
}

fn summary_line(metrics: &Metrics) -> String {
    let line = format!(
        "rendered {} template(s) with {} error(s) in {}",
        metrics.templates_processed,
        metrics.errors,
        format_duration(metrics.total_render_duration),
    );
    if metrics.errors > 0 {
        line.red().to_string()
    } else {
        line
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{duration:.2?}")
}
