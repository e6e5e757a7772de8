//! kustomtrace - trace kustomize overlay trees
//!
//! Finds the root applications affected by changed files, the files an
//! application is built from, and the root applications of an apps directory.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kustomtrace::KustomTrace;
use kustomtrace::config::{Config, ConfigLoader};

use cli::ConfigSubcommand;

/// Exit code when `--strict` finds error-level reference diagnostics
const STRICT_FAILURE: u8 = 2;

/// kustomtrace - trace kustomize overlay trees
#[derive(Parser, Debug)]
#[command(name = "kustomtrace", version)]
#[command(about = "Traces kustomize applications to find affected apps and the files they use", long_about = None)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command
#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// Root directory of the kustomize applications
    #[arg(short = 'a', long, global = true)]
    apps_dir: Option<PathBuf>,

    /// Log filter (e.g. "debug", "kustomtrace=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write the result as YAML to this file instead of the console
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    /// Exit with code 2 if any reference could not be resolved
    #[arg(long, global = true)]
    strict: bool,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Find root applications affected by changes in the given files
    AffectedApps {
        /// Modified file paths
        files: Vec<PathBuf>,
        /// Read modified file paths from this file (one path per line)
        #[arg(short = 'f', long)]
        files_from_file: Option<PathBuf>,
    },
    /// List all files used by an application directory or kustomization file
    AppFiles {
        /// Application directory or kustomization file
        app_path: PathBuf,
    },
    /// List all root applications (kustomizations no other kustomization uses)
    ListRootApps,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let (report, trace) = match args.command {
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::AffectedApps {
            files,
            files_from_file,
        } => {
            let (trace, config) = open_trace(&args.global)?;
            let files = cli::collect_modified_files(&files, files_from_file.as_deref())?;
            (cli::affected_apps(&trace, &files, &config.output)?, trace)
        }
        Command::AppFiles { app_path } => {
            let (trace, config) = open_trace(&args.global)?;
            (cli::app_files(&trace, &app_path, &config.output)?, trace)
        }
        Command::ListRootApps => {
            let (trace, config) = open_trace(&args.global)?;
            (cli::list_root_apps(&trace, &config.output), trace)
        }
    };
    cli::write_report(&report, args.global.output.as_deref())?;

    let stats = trace.stats();
    tracing::debug!("Build stats: {:?}", stats);
    if args.global.strict && stats.has_errors() {
        eprintln!(
            "Error: {} reference error(s) and {} invalid file(s) found (--strict)",
            stats.reference_errors, stats.invalid_files
        );
        return Ok(ExitCode::from(STRICT_FAILURE));
    }

    Ok(ExitCode::SUCCESS)
}

/// Load configuration, start logging and build the graph for `--apps-dir`
fn open_trace(global: &GlobalArgs) -> Result<(KustomTrace, Config)> {
    let config = ConfigLoader::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}, using default configuration", e);
        ConfigLoader::load_defaults()
    });
    cli::init_logging(
        global.log_level.as_deref(),
        &config.log_level,
        global.log_file.as_deref(),
    )?;

    let apps_dir = global
        .apps_dir
        .as_deref()
        .context("--apps-dir is required for this command")?;
    let trace = KustomTrace::from_directory_with_threads(apps_dir, config.threads)
        .with_context(|| format!("Failed to analyze apps directory: {}", apps_dir.display()))?;
    Ok((trace, config))
}
