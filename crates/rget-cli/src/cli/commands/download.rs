//! `rget download` – fetch one source, or a batch from an input file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use rget_core::config::RgetConfig;
use rget_core::engine::{self, DownloadOptions};
use rget_core::resolver::DirectResolver;

use super::super::{input, render};

#[derive(Debug)]
pub struct DownloadArgs {
    pub source: String,
    pub output: Option<String>,
    pub dir: Option<String>,
    pub input: bool,
    pub mtime: bool,
    pub timeout: Option<u64>,
    pub update: Option<u64>,
}

pub async fn run_download(cfg: &RgetConfig, args: DownloadArgs) -> Result<()> {
    if args.output.is_some() && args.input {
        anyhow::bail!("an explicit output file cannot be combined with an input list");
    }

    let sources = if args.input {
        input::read_source_list(Path::new(&args.source)).await?
    } else {
        vec![args.source.clone()]
    };
    if sources.is_empty() {
        anyhow::bail!("no sources to download");
    }

    let options = DownloadOptions {
        output_dir: args.dir.map(PathBuf::from),
        output_filename: args.output,
        preserve_mtime: args.mtime,
        timeout: Some(Duration::from_secs(args.timeout.unwrap_or(cfg.timeout_secs))),
        update_interval: Duration::from_millis(args.update.unwrap_or(cfg.update_interval_ms)),
        user_agent: cfg.user_agent.clone(),
    };
    let resolver = DirectResolver;

    let mut failures = 0usize;
    for (i, source) in sources.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("source: {source}");

        match engine::download_one(source, &resolver, &options, render::progress_sink()).await {
            Ok(outcome) => {
                render::progress_done();
                if outcome.already_complete {
                    println!("done: already retrieved ({})", outcome.final_path.display());
                } else {
                    println!("done: {}", outcome.final_path.display());
                }
            }
            Err(err) => {
                render::progress_done();
                failures += 1;
                eprintln!("error: {err}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} source(s) failed", sources.len());
    }
    Ok(())
}
