// rustcomplete CLI entry point

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustcomplete_completion::{
    dedup_entries, format_completions, BufferSnapshot, Position, ProjectLocator, RacerCommand,
    RacerRequest, RacerRunner, SourceLookup, SourcePathCache, ViewId,
};
use rustcomplete_config::SettingsStore;
use tokio::runtime::Handle;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "rustcomplete")]
#[command(about = "Rust completion and go-to-definition through racer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (default: <config dir>/rustcomplete/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print completions at a position
    Complete {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 0-based line
        #[arg(long)]
        line: u32,

        /// 0-based column
        #[arg(long)]
        column: u32,

        /// Override the configured racer timeout
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },

    /// Print the definition candidates at a position as path:row:column
    Definition {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 0-based line
        #[arg(long)]
        line: u32,

        /// 0-based column
        #[arg(long)]
        column: u32,
    },

    /// Print the source directory of the cargo project owning a file
    Locate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let settings = Arc::new(match &cli.config {
        Some(path) => SettingsStore::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => SettingsStore::load_default().context("failed to load settings")?,
    });
    debug!(settings = ?settings.current(), "Loaded settings");

    let locator = Arc::new(ProjectLocator::new(
        Arc::clone(&settings),
        Arc::new(SourcePathCache::new()),
    ));

    match cli.command {
        Commands::Complete {
            file,
            line,
            column,
            timeout_ms,
        } => {
            let runner = RacerRunner::new(settings, locator, Handle::current());
            let mut request = RacerRequest::new(
                RacerCommand::CompleteWithSnippet,
                &snapshot(&file, Position::new(line, column)).await?,
            );
            if let Some(millis) = timeout_ms {
                request = request.timeout(Duration::from_millis(millis));
            }

            let results = runner.query(&request).await;
            for entry in dedup_entries(&format_completions(&results)) {
                println!("{}\t{}", entry.label, entry.snippet);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Definition { file, line, column } => {
            let runner = RacerRunner::new(settings, locator, Handle::current());
            let request = RacerRequest::new(
                RacerCommand::FindDefinition,
                &snapshot(&file, Position::new(line, column)).await?,
            );

            for result in runner.query(&request).await {
                println!("{}", result.location());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Locate { file } => {
            let file = absolute(&file).await?;
            match locator.resolve(&file).await {
                SourceLookup::Found(dir) => {
                    println!("{}", dir.display());
                    Ok(ExitCode::SUCCESS)
                }
                other => {
                    debug!(file = %file.display(), lookup = ?other, "No project source directory");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Read `file` into a snapshot positioned at `cursor`
async fn snapshot(file: &Path, cursor: Position) -> Result<BufferSnapshot> {
    let file = absolute(file).await?;
    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    Ok(BufferSnapshot::new(ViewId(0), content, cursor)
        .with_file_name(file)
        .with_rust_source(true))
}

async fn absolute(file: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(file)
        .await
        .with_context(|| format!("no such file: {}", file.display()))
}

/// Install a stderr subscriber at `log_level`, falling back to warn
fn init_logging(log_level: &str) {
    use tracing_subscriber::fmt;

    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_complete() {
        let cli = Cli::try_parse_from([
            "rustcomplete",
            "complete",
            "src/main.rs",
            "--line",
            "3",
            "--column",
            "8",
            "--timeout-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "warn");
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Complete {
                file,
                line,
                column,
                timeout_ms,
            } => {
                assert_eq!(file, PathBuf::from("src/main.rs"));
                assert_eq!((line, column), (3, 8));
                assert_eq!(timeout_ms, Some(250));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rustcomplete",
            "locate",
            "src/lib.rs",
            "--config",
            "/tmp/settings.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.toml")));
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Locate { .. }));
    }

    #[test]
    fn test_position_is_required() {
        assert!(Cli::try_parse_from(["rustcomplete", "definition", "src/main.rs"]).is_err());
    }
}
