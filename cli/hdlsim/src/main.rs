//! hdlsim CLI: testbench generation and structural checking.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use manifest::HdlsimManifest;

#[derive(Parser)]
#[command(name = "hdlsim", version, about = "Hardware/host testbench generator")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new hdlsim project
    Init {
        /// Project name
        name: String,
    },
    /// Run the structural checker on a root type
    Check {
        /// Fully qualified root type (e.g., tb.Top)
        #[arg(long)]
        class_name: String,
        /// Catalog file (default: catalogs listed in hdlsim.toml)
        #[arg(long)]
        catalog: Option<String>,
        /// Report format (human, json)
        #[arg(long)]
        report: Option<String>,
    },
    /// Generate the testbench for a root type
    GenTb {
        /// Fully qualified root type (e.g., tb.Top)
        #[arg(long)]
        class_name: String,
        /// Run directory (default: project directory)
        #[arg(long)]
        rundir: Option<String>,
        /// Catalog file (default: catalogs listed in hdlsim.toml)
        #[arg(long)]
        catalog: Option<String>,
        /// Report format (human, json)
        #[arg(long)]
        report: Option<String>,
    },
    /// Print the transactor API manifests for a root type
    Api {
        /// Fully qualified root type (e.g., tb.Top)
        #[arg(long)]
        class_name: String,
        /// Catalog file (default: catalogs listed in hdlsim.toml)
        #[arg(long)]
        catalog: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Check {
            class_name,
            catalog,
            report,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::check::run(
                &project_dir,
                manifest.as_ref(),
                &class_name,
                catalog.as_deref(),
                report.as_deref(),
            )
        }

        Commands::GenTb {
            class_name,
            rundir,
            catalog,
            report,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::gen_tb::run(
                &project_dir,
                manifest.as_ref(),
                &class_name,
                rundir.as_deref(),
                catalog.as_deref(),
                report.as_deref(),
            )
        }

        Commands::Api {
            class_name,
            catalog,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::api::run(
                &project_dir,
                manifest.as_ref(),
                &class_name,
                catalog.as_deref(),
            )
        }
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<HdlsimManifest>, Option<PathBuf>)> {
    match HdlsimManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
