//! Typed per-source failure kinds.
//!
//! Every kind is fatal for the current source only; a batch caller reports it
//! and moves on to the next source. None of these are retried by the core.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::TransportError;

/// Failure of one source's download processing.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The source could not be resolved into a URL and filename.
    #[error("resolution failed: {0}")]
    Resolution(String),

    /// The final or partial path exists but is not a regular file.
    #[error("path exists but is not a regular file: {}", .0.display())]
    PathConflict(PathBuf),

    /// An on-disk size disagrees with the expected size (existing final file
    /// before transfer, or the partial file after transfer).
    #[error("unexpected file size: expected {expected}, found {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// The partial file is larger than the whole expected resource.
    #[error("partial file larger than expected: {offset} > {expected}")]
    StalePartial { offset: u64, expected: u64 },

    /// HEAD or GET returned a status outside the accepted set for its context.
    #[error("invalid status code for {context}: {status}")]
    UnexpectedStatus { context: &'static str, status: u32 },

    /// Network, timeout, or aborted transfer.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The HEAD response lacked a usable numeric Content-Length.
    #[error("missing or malformed content-length")]
    MissingContentLength,

    /// Filesystem or sampler failure outside the typed kinds above.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
