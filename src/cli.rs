//! Command-line interface.
//!
//! ```text
//! shelver [--config FILE] [--work-dir DIR] [--quiet] [-v...] [--report-json FILE] [COMMAND]
//! ```
//!
//! Commands:
//!
//! - `run` (default) - split, validate, then open the viewer
//! - `split` - stage 1 only
//! - `validate` - stage 2 only
//! - `view` - open the viewer over existing datasets
//! - `check-isbn <ISBN>...` - print the checksum verdict for each ISBN
//!
//! Flags override the configuration file, which overrides the defaults.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::isbn::{IsbnCheck, IsbnValidator};
use crate::navigator::Navigator;
use crate::pipeline::Pipeline;

/// Split, validate and browse book records by genre.
#[derive(Debug, Parser)]
#[command(name = "shelver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, short = 'c', env = "SHELVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding inputs and outputs.
    #[arg(long, short = 'C')]
    pub work_dir: Option<PathBuf>,

    /// Do not echo diagnostics to stdout.
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Write the stage report(s) as JSON to this file.
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Split, validate, then browse the results.
    Run,
    /// Split the listed input files into genre buckets.
    Split,
    /// Validate genre buckets into binary datasets.
    Validate,
    /// Browse existing binary datasets.
    View,
    /// Check ISBN checksums.
    CheckIsbn {
        /// ISBNs to check.
        #[arg(required = true)]
        isbns: Vec<String>,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// The effective pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = &self.work_dir {
            config.work_dir.clone_from(dir);
        }
        if self.quiet {
            config.echo_diagnostics = false;
        }
        Ok(config)
    }
}

/// Execute the parsed command line.
///
/// # Errors
///
/// Returns an error if a stage fails fatally or the console breaks.
pub fn execute(cli: &Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Run);

    if let Commands::CheckIsbn { isbns } = &command {
        for isbn in isbns {
            println!("{isbn}: {}", describe(IsbnValidator::check(isbn)));
        }
        return Ok(());
    }

    let pipeline = Pipeline::new(cli.pipeline_config()?);
    match command {
        Commands::Run => {
            let report = pipeline.run().context("processing input files")?;
            write_report(cli.report_json.as_deref(), &report)?;
            view(&pipeline)
        },
        Commands::Split => {
            let report = pipeline.split().context("splitting input files")?;
            write_report(cli.report_json.as_deref(), &report)
        },
        Commands::Validate => {
            let report = pipeline.validate().context("validating genre buckets")?;
            write_report(cli.report_json.as_deref(), &report)
        },
        Commands::View => view(&pipeline),
        Commands::CheckIsbn { .. } => Ok(()),
    }
}

fn view(pipeline: &Pipeline) -> Result<()> {
    let library = pipeline.load();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut navigator = Navigator::new(&library, stdin.lock(), stdout.lock());
    navigator.run().context("running the viewer")?;
    Ok(())
}

fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating report {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("writing report {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn describe(check: IsbnCheck) -> &'static str {
    match check {
        IsbnCheck::ValidIsbn10 => "valid ISBN-10",
        IsbnCheck::ValidIsbn13 => "valid ISBN-13",
        IsbnCheck::InvalidIsbn10 => "invalid ISBN-10",
        IsbnCheck::InvalidIsbn13 => "invalid ISBN-13",
        IsbnCheck::NotApplicable => "no checksum applies (not 10 or 13 characters)",
    }
}
