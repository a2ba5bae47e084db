// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Boot the Lonala standard library and report what was loaded.
//!
//! Exit status is 0 on success, 1 when the bootstrap sequence fails and 2
//! for usage or setup errors.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use lona_boot::loader::TarSource;
use lona_boot::platform::{ArchivePlatform, OsPlatform, Platform};
use lona_boot::{BootOptions, BootReport, Instantiation, LoadManifest, Runtime, boot};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "LONA_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "lona-boot",
    version,
    about = "Bring the Lonala standard library online"
)]
struct Cli {
    /// Load the library from this directory instead of the embedded archive.
    #[arg(long, value_name = "DIR")]
    lib: Option<PathBuf>,

    /// Print the load manifest after booting.
    #[arg(long, value_enum, value_name = "FORMAT")]
    manifest: Option<ManifestFormat>,

    /// Boot as a secondary instantiation (skips process initialization).
    #[arg(long)]
    secondary: bool,

    /// Skip the warm-up calls.
    #[arg(long)]
    no_warm_up: bool,

    /// Evaluate a form in the primary namespace after booting. Repeatable.
    #[arg(short, long = "eval", value_name = "FORM")]
    eval: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ManifestFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;

    if let Some(dir) = &cli.lib {
        let dir = std::fs::canonicalize(dir)
            .with_context(|| format!("library directory {}", dir.display()))?;
        run(Runtime::new(OsPlatform::with_working_dir(dir)), &cli)
    } else {
        let archive = TarSource::embedded().context("opening embedded library")?;
        let host = OsPlatform::new().context("determining working directory")?;
        run(Runtime::new(ArchivePlatform::new(archive, host)), &cli)
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn run<P: Platform>(mut rt: Runtime<P>, cli: &Cli) -> Result<ExitCode> {
    let options = BootOptions {
        warm_up: !cli.no_warm_up,
        instantiation: if cli.secondary {
            Instantiation::Secondary
        } else {
            Instantiation::Primary
        },
    };

    let report = match boot(&mut rt, &options) {
        Ok(report) => report,
        Err(failure) => {
            eprintln!("{failure}");
            eprintln!("loaded before the failure:");
            for entry in rt.manifest().snapshot() {
                eprintln!("  {entry}");
            }
            return Ok(ExitCode::from(1));
        }
    };

    if let Some(format) = cli.manifest {
        print_manifest(rt.manifest(), &report, format)?;
    }

    for form in &cli.eval {
        let value = rt
            .eval_str(form)
            .map_err(|e| anyhow!("evaluating {form}: {e}"))?;
        println!("{value}");
    }
    Ok(ExitCode::SUCCESS)
}

fn print_manifest(
    manifest: &LoadManifest,
    report: &BootReport,
    format: ManifestFormat,
) -> Result<()> {
    match format {
        ManifestFormat::Text => {
            for entry in manifest.snapshot() {
                println!("{entry}");
            }
        }
        ManifestFormat::Json => {
            let doc = serde_json::json!({
                "manifest": manifest,
                "phases": report.phases,
                "stage": report.stage,
                "warm_up": report.warm_up,
            });
            let text = serde_json::to_string_pretty(&doc).context("serializing manifest")?;
            println!("{text}");
        }
    }
    Ok(())
}
