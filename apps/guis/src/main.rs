use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use generation::{BuildSummary, RuntimePayload};
use shared::domain::BuildOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EMBEDDED_RUNTIME: &[u8] = include_bytes!("../assets/guis.js");

/// Compile widget definition files into HTML shells and structure files.
#[derive(Parser, Debug)]
#[command(name = "guis", version)]
struct Cli {
    /// Manifest listing the GUIs to build.
    configuration_file: PathBuf,
    /// Directory receiving the generated files and staged dependencies.
    output_directory: PathBuf,
    /// Allow dependencies to collide with generated or existing files.
    #[arg(short = 'c', long)]
    allow_conflicts: bool,
    /// Copy every dependency directly into the output directory.
    #[arg(short = 'f', long)]
    flatten_dependencies: bool,
    /// Log the structural trace of every GUI.
    #[arg(short, long)]
    verbose: bool,
    /// Use this script instead of the embedded runtime.
    #[arg(long, value_name = "FILE")]
    runtime: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> BuildOptions {
        BuildOptions {
            disallow_conflicts: !self.allow_conflicts,
            flatten_dependencies: self.flatten_dependencies,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("guis: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let runtime = match &cli.runtime {
        Some(path) => {
            let contents = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read runtime script {}", path.display()))?;
            RuntimePayload::javascript(contents)
        }
        None => RuntimePayload::javascript(EMBEDDED_RUNTIME),
    };

    let summary = generation::generate(
        &cli.configuration_file,
        &cli.output_directory,
        cli.options(),
        &runtime,
    )
    .await?;
    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &BuildSummary) {
    for gui in &summary.guis {
        info!(gui = %gui.name, html = %gui.html_file, structure = %gui.structure_file, "built");
    }
    info!(
        runtime = %summary.runtime_file,
        guis = summary.guis.len(),
        staged = summary.staged.len(),
        "build finished"
    );
}
