//! CLI for the rget download tool.

mod commands;
mod input;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rget_core::config;

use commands::{run_download, run_resolve};

/// Top-level CLI for the rget download tool.
#[derive(Debug, Parser)]
#[command(name = "rget")]
#[command(about = "rget: resumable file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file from a source URL.
    #[command(visible_aliases = ["dl", "d"])]
    Download {
        /// Source to download from.
        source: String,

        /// Output file name (defaults to the resolved filename).
        #[arg(short, long)]
        output: Option<String>,

        /// Output directory.
        #[arg(short, long)]
        dir: Option<String>,

        /// Treat SOURCE as an input file with a URL on each line.
        #[arg(short, long)]
        input: bool,

        /// Use the server modification time if available.
        #[arg(short, long)]
        mtime: bool,

        /// Request timeout in seconds.
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Progress update interval in milliseconds.
        #[arg(short, long, value_name = "MS")]
        update: Option<u64>,
    },

    /// Resolve a source and print its download URL and filename.
    #[command(visible_aliases = ["ex", "e"])]
    Resolve {
        /// Source to resolve.
        source: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Treat SOURCE as an input file with a URL on each line.
        #[arg(short, long)]
        input: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init().unwrap_or_else(|err| {
            tracing::warn!("could not load config, using defaults: {err:#}");
            config::RgetConfig::default()
        });
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                source,
                output,
                dir,
                input,
                mtime,
                timeout,
                update,
            } => {
                run_download(
                    &cfg,
                    commands::DownloadArgs {
                        source,
                        output,
                        dir,
                        input,
                        mtime,
                        timeout,
                        update,
                    },
                )
                .await
            }
            CliCommand::Resolve {
                source,
                format,
                input,
            } => run_resolve(source, format, input).await,
        }
    }
}

#[cfg(test)]
mod tests;
