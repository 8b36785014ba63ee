//! Source resolution seam.
//!
//! The engine consumes a two-field result: a direct download URL and an
//! optional suggested filename. Anything smarter (page scraping, API calls)
//! lives behind the [`Resolve`] trait in its own crate.

use anyhow::{Context, Result};
use serde::Serialize;

/// Resolved source: a direct URL plus a filename hint.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSource {
    pub url: String,
    pub filename: Option<String>,
}

/// Turns a user-supplied source reference into a [`ResolvedSource`].
pub trait Resolve {
    fn resolve(&self, source: &str) -> Result<ResolvedSource>;
}

/// Pass-through resolver for direct URLs: the source is the download URL and
/// the filename hint is its last path segment.
pub struct DirectResolver;

impl Resolve for DirectResolver {
    fn resolve(&self, source: &str) -> Result<ResolvedSource> {
        let parsed = url::Url::parse(source)
            .with_context(|| format!("invalid source URL: {source}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("unsupported URL scheme: {}", parsed.scheme());
        }
        Ok(ResolvedSource {
            url: source.to_string(),
            filename: filename_from_url(&parsed),
        })
    }
}

/// Last non-empty path segment, percent-decoded and sanitized; `None` when
/// the path yields nothing usable as a local filename.
fn filename_from_url(url: &url::Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let sanitized = sanitize_filename(&decoded);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return None;
    }
    Some(sanitized)
}

/// Replaces path separators, NUL, and control characters; trims leading and
/// trailing dots and spaces.
fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced.trim_matches([' ', '.']).to_string()
}
