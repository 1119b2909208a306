//! stepforge - convert STEP assemblies into print-ready STL groups.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sf_convert::{run_job, JobConfig, JobSummary, RepairSettings};

/// Convert STEP assemblies into print-ready STL groups.
#[derive(Parser)]
#[command(name = "stepforge")]
#[command(about = "Convert STEP assemblies into print-ready STL groups", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON job configuration.
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override the configured repair backend (with its defaults).
    #[arg(long, value_enum)]
    repair: Option<RepairBackend>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RepairBackend {
    /// In-process staged repair pipeline.
    Native,
    /// External admesh invocation.
    Admesh,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = JobConfig::from_path(&cli.config)
        .with_context(|| format!("loading job configuration {}", cli.config.display()))?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(backend) = cli.repair {
        config.repair = match backend {
            RepairBackend::Native => RepairSettings::native_defaults(),
            RepairBackend::Admesh => RepairSettings::admesh_defaults(),
        };
    }
    config.validate()?;

    let summary = run_job(&config)?;
    print_summary(&summary);

    // Advisory repair skips never fail the job; unproduced files do.
    if summary.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &JobSummary) {
    for assembly in &summary.assemblies {
        if let Some(error) = &assembly.error {
            println!("{:<40} FAILED: {error}", assembly.id);
            continue;
        }
        for group in &assembly.groups {
            match &group.outcome {
                Ok(stats) => {
                    let repair = if stats.repair_applied {
                        "repaired"
                    } else {
                        "unrepaired"
                    };
                    println!(
                        "{:<40} {:>12} bytes  {}",
                        group.path.display(),
                        stats.bytes,
                        repair
                    );
                }
                Err(error) => {
                    println!("{:<40} FAILED: {error}", group.path.display());
                }
            }
        }
    }
}
