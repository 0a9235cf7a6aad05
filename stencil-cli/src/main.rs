//! Stencil: render templates from files, directories, or the command line
//! against declared data sources.
//!
//! # Usage
//!
//! ```text
//! stencil -i 'Hello {{ user }}' -c user=env:USER
//! stencil -f in.tmpl -o out.txt [-f more.tmpl -o more.txt ...]
//! stencil --input-dir tmpl/ --output-dir out/ [--exclude GLOB] [--include GLOB]
//! stencil --input-dir tmpl/ --output-map 'out/{{ input | upper }}'
//! stencil -f run.sh.tmpl -o run.sh -- sh run.sh
//! ```

mod exec;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;

use stencil_core::Config;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    disable_version_flag = true,
    about = "Render templates against files, environment variables, and HTTP data sources",
    long_about = None,
)]
struct Cli {
    /// Template file to render; `-` reads stdin. Repeatable.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    files: Vec<String>,

    /// Template text given inline.
    #[arg(short = 'i', long = "in", value_name = "TEMPLATE")]
    input: Option<String>,

    /// Render every file under this directory.
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Glob of files to skip in --input-dir mode. Repeatable.
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Glob of files to render in --input-dir mode; everything else is skipped. Repeatable.
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Output file for the --file at the same position; `-` is stdout. Repeatable.
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    outs: Vec<String>,

    /// Directory --input-dir outputs are written under [default: .].
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Template naming each --input-dir output; sees `input` and `ctx`.
    #[arg(long, value_name = "TEMPLATE")]
    output_map: Option<String>,

    /// Extra template (`alias=path` or `path`) available to include. Repeatable.
    #[arg(short = 't', long = "template", value_name = "ALIAS=PATH")]
    templates: Vec<String>,

    /// Data source (`alias=URL`) for `ds`/`include`. Repeatable.
    #[arg(short = 'd', long = "datasource", value_name = "ALIAS=URL")]
    datasources: Vec<String>,

    /// HTTP header for a data source (`alias=Name: value`). Repeatable.
    #[arg(short = 'H', long = "datasource-header", value_name = "ALIAS=HEADER")]
    datasource_headers: Vec<String>,

    /// Data source loaded into the template context (`alias=URL`, `.` for the root). Repeatable.
    #[arg(short = 'c', long = "context", value_name = "ALIAS=URL")]
    contexts: Vec<String>,

    /// Left variable delimiter [default: {{].
    #[arg(long, env = "STENCIL_LEFT_DELIM", value_name = "DELIM")]
    left_delim: Option<String>,

    /// Right variable delimiter [default: }}].
    #[arg(long, env = "STENCIL_RIGHT_DELIM", value_name = "DELIM")]
    right_delim: Option<String>,

    /// YAML file with default settings; flags override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log progress and print a timing report to stderr.
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Command to run after rendering succeeds.
    #[arg(last = true, value_name = "COMMAND")]
    exec: Vec<String>,
}

impl Cli {
    /// Settings given on the command line, layered over the `--config` file.
    fn to_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        let flags = Config {
            input: self.input.clone(),
            input_files: self.files.clone(),
            input_dir: self.input_dir.clone(),
            exclude: self.exclude.clone(),
            include: self.include.clone(),
            output_files: self.outs.clone(),
            output_dir: self.output_dir.clone(),
            output_map: self.output_map.clone(),
            templates: self.templates.clone(),
            datasources: self.datasources.clone(),
            datasource_headers: self.datasource_headers.clone(),
            contexts: self.contexts.clone(),
            left_delim: self.left_delim.clone(),
            right_delim: self.right_delim.clone(),
        };
        let config = base.merge(flags);
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.to_config()?;
    if cli.verbose {
        report::print_preamble(&config)?;
    }

    let outcome = stencil_run::run_templates(&config);
    if cli.verbose {
        report::print_summary(&outcome.metrics);
    }
    outcome.result.context("rendering failed")?;

    if cli.exec.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let code = exec::run(&cli.exec)?;
    Ok(ExitCode::from(code))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
