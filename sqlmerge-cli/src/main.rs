//! `sqlmerge`: merges a SQL*Plus script tree into a single file.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod logging;
mod writer;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlmerge::prelude::*;
use tracing::{debug, error, info};

use crate::writer::OutputWriter;

#[derive(Parser, Debug)]
#[command(name = "sqlmerge", version, about = "Merge SQL*Plus scripts into one deployable file")]
struct Cli {
    /// Path to the project configuration
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the merged script instead of writing the output file
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in stages
    Stages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();
    let result = match &cli.command {
        Some(Commands::Stages { json }) => list_stages(*json, &mut stdout),
        None => run(&cli, &mut stdout),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logging::init(cli.verbose, cli.log_json);
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Runs the configured pipeline. Dry runs print the result to `out`.
fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = MergeConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let verbose = cli.verbose || config.project.verbose;
    logging::init(verbose, cli.log_json);

    info!(config = %config.path().display(), input = %config.project.input.display(), "Starting merge");

    let registry = StageFactory::with_builtins().build_registry(&config)?;
    let pipeline = Pipeline::new(registry, config.execution_order().to_vec());

    let ctx = ProcessingContext::from_file(&config.project.input)?
        .with_variables(config.load_variables())
        .with_verbose(verbose);
    let ctx = pipeline.execute(ctx)?;

    if let Some(report) = ctx.metadata(sqlmerge::pipeline::STAGES_METADATA_KEY) {
        debug!(%report, "Pipeline report");
    }

    if cli.dry_run {
        writeln!(out, "{}", ctx.content)?;
        return Ok(());
    }

    let writer = OutputWriter::new(&config.project.output).with_backup(config.project.create_backup);
    writer.write(&ctx.content)?;
    info!(output = %writer.path().display(), bytes = ctx.content.len(), "Merge complete");

    Ok(())
}

fn list_stages(json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let stages: Vec<_> = StageKind::ALL
            .iter()
            .map(|kind| serde_json::json!({"name": kind.name(), "description": kind.description()}))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&stages)?)?;
    } else {
        for kind in StageKind::ALL {
            writeln!(out, "{:<18}{}", kind.name(), kind.description())?;
        }
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    error!("{err:#}");
    let coded = err.chain().find_map(|e| {
        e.downcast_ref::<MergeError>()
            .map(|m| (m.code(), m.fix_hint()))
            .or_else(|| e.downcast_ref::<ConfigError>().map(|c| (c.code(), c.fix_hint())))
    });
    if let Some((code, hint)) = coded {
        error!(code, "Merge failed");
        if let Some(hint) = hint {
            info!("Hint: {hint}");
        }
    }
}
