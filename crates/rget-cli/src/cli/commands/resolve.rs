//! `rget resolve` – print the download URL and filename for a source.

use std::path::Path;

use anyhow::Result;
use rget_core::resolver::{DirectResolver, Resolve};

use super::super::{input, OutputFormat};

pub async fn run_resolve(source: String, format: OutputFormat, from_file: bool) -> Result<()> {
    let sources = if from_file {
        input::read_source_list(Path::new(&source)).await?
    } else {
        vec![source]
    };

    let resolver = DirectResolver;
    let mut failures = 0usize;
    for (i, source) in sources.iter().enumerate() {
        if i > 0 && format == OutputFormat::Text {
            println!();
        }
        match resolver.resolve(source) {
            Ok(resolved) => match format {
                OutputFormat::Text => {
                    println!("source: {source}");
                    println!("download: {}", resolved.url);
                    println!("filename: {}", resolved.filename.as_deref().unwrap_or("-"));
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&resolved)?);
                }
            },
            Err(err) => {
                failures += 1;
                eprintln!("error: {source}: {err:#}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} source(s) failed", sources.len());
    }
    Ok(())
}
