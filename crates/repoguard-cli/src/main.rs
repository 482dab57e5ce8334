//! Repoguard CLI - pre-commit hook for visibility and staged path policy
//!
//! Usage:
//!   repo-guard --staged                         # Check staged files with the default config
//!   repo-guard --config ci/visibility.json      # Config relative to the repository root
//!   repo-guard --format json                    # Machine-readable report
//!
//! Exit status is 0 when the commit may proceed (or nothing is staged) and 1
//! on any configuration problem or policy violation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use repoguard::config::{DEFAULT_CONFIG_PATH, config_path};
use repoguard::report::{REPORT_PREFIX, render_json, render_text};
use repoguard::{GitCli, Guard, RepoSnapshot, effective_root};
use tracing_subscriber::EnvFilter;

/// Repo visibility + path guard
#[derive(Parser, Debug)]
#[command(name = "repo-guard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Guard configuration file, relative to the repository root unless absolute
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Check staged files (default)
    #[arg(long)]
    staged: bool,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log resolution details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let snapshot = RepoSnapshot::capture(&GitCli::new(&cwd));
    let root = effective_root(&snapshot, &cwd);
    let config = config_path(&args.config, &root);

    tracing::debug!(
        root = %root.display(),
        config = %config.display(),
        staged = snapshot.staged.len(),
        "starting guard run"
    );

    let guard = Guard::from_config_file(&config)?;
    let decision = guard.check(&snapshot, &cwd)?;

    match args.format {
        Format::Text => print!("{}", render_text(&decision)),
        Format::Json => println!(
            "{}",
            render_json(&decision).context("Failed to serialize report")?
        ),
    }

    Ok(ExitCode::from(decision.exit_code() as u8))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{REPORT_PREFIX} {err:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["repo-guard"]);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!args.staged);
        assert!(matches!(args.format, Format::Text));
    }

    #[test]
    fn test_staged_and_json() {
        let args = Args::parse_from(["repo-guard", "--staged", "--format", "json", "-v"]);
        assert!(args.staged);
        assert!(args.verbose);
        assert!(matches!(args.format, Format::Json));
    }
}
