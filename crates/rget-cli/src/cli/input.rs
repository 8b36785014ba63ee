//! Input-file reading: one source URL per line.

use std::path::Path;

use anyhow::{Context, Result};

/// Reads a source-list file. Lines are trimmed; anything that does not start
/// with `http://` or `https://` (case-insensitive) is skipped.
pub async fn read_source_list(path: &Path) -> Result<Vec<String>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| is_http_url(line))
        .map(str::to_string)
        .collect())
}

fn is_http_url(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
