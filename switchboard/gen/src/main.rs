//! switchboard code generator
//!
//! Generates HTTP clients and axum dispatchers from annotated Rust traits.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use switchboard_gen::config::{FileConfig, GenerateOptions, config_path};
use switchboard_gen::errors::GeneratorError;
use switchboard_gen::runner::{Report, extract_source, generate_dir};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// switchboard code generator - turns annotated traits into HTTP clients and servers
#[derive(Parser, Debug)]
#[command(name = "switchboard-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate client and server files for every contract under a directory
    Generate {
        /// Directory to scan for annotated traits
        dir: PathBuf,

        /// Fail when any trait or method is skipped
        #[arg(long)]
        strict: bool,

        /// Report what would be generated without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file (defaults to <DIR>/switchboard.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the extracted routes and skipped candidates of one file as JSON
    Inspect {
        /// Rust source file
        file: PathBuf,
    },
}

/// Initialize tracing subscriber based on verbosity
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            // -v: written files and skipped candidates
            1 => "warn,switchboard_gen=info".to_string(),
            2 => "info,switchboard_gen=debug".to_string(),
            _ => "debug,switchboard_gen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            dir,
            strict,
            dry_run,
            config,
        } => generate(&dir, strict, dry_run, config.as_deref()),
        Command::Inspect { file } => inspect(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn generate(
    dir: &Path,
    strict: bool,
    dry_run: bool,
    config: Option<&Path>,
) -> Result<(), GeneratorError> {
    if let Some(path) = config_path(dir, config) {
        tracing::info!(path = %path.display(), "using configuration file");
    }

    let mut options = GenerateOptions::from_file(FileConfig::discover(dir, config)?)?;
    // `strict = true` in the file cannot be switched off from the command line.
    options.strict |= strict;
    options.dry_run = dry_run;

    let report = generate_dir(dir, &options)?;
    print_report(&report, dry_run);
    Ok(())
}

fn print_report(report: &Report, dry_run: bool) {
    for plan in &report.plans {
        for skipped in &plan.extraction.skipped {
            eprintln!(
                "{} {}: {skipped}",
                "skipped".yellow().bold(),
                plan.source.display()
            );
        }
        for artifact in &plan.artifacts {
            let verb = if dry_run { "would write" } else { "wrote" };
            eprintln!("{} {}", verb.green(), artifact.path.display());
        }
    }

    let contracts: usize = report
        .plans
        .iter()
        .map(|plan| plan.extraction.interfaces.len())
        .sum();
    let methods: usize = report.plans.iter().map(|plan| plan.method_count()).sum();
    eprintln!(
        "{} {contracts} contract(s), {methods} route(s), {} skipped",
        "done".bold(),
        report.skipped_count()
    );
}

fn inspect(file: &Path) -> Result<(), GeneratorError> {
    let text = fs::read_to_string(file).map_err(|source| GeneratorError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let extraction = extract_source(&text).map_err(|source| GeneratorError::Parse {
        path: file.to_path_buf(),
        source,
    })?;
    let json = serde_json::to_string_pretty(&extraction)
        .map_err(|err| GeneratorError::CodeGen(format!("cannot serialize routes: {err}")))?;
    println!("{json}");
    Ok(())
}
