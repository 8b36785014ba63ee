//! Per-source download orchestration.
//!
//! Drives one source from resolution to a verified, atomically promoted file:
//! HEAD probe, existing/partial file reconciliation, resume decision, the
//! (possibly ranged) GET, size verification, optional mtime propagation, and
//! the final rename. Each decision is logged so a run is auditable afterward.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::error::DownloadError;
use crate::http::{RequestEvent, RequestOptions, RequestStream};
use crate::probe;
use crate::progress::{Progress, ProgressSink};
use crate::resolver::Resolve;
use crate::storage::{self, PartialWriter};

/// Per-invocation options for [`download_one`]. CLI flags and config defaults
/// are folded into this before the engine runs.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory the final file lands in; current directory when `None`.
    pub output_dir: Option<PathBuf>,
    /// Explicit output filename, overriding the resolver's suggestion.
    pub output_filename: Option<String>,
    /// Apply the server's Last-Modified to the downloaded file.
    pub preserve_mtime: bool,
    /// Whole-request timeout for the HEAD and the GET.
    pub timeout: Option<Duration>,
    /// Progress sampling interval.
    pub update_interval: Duration,
    /// User-Agent override for all requests this source issues.
    pub user_agent: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            output_filename: None,
            preserve_mtime: false,
            timeout: None,
            update_interval: Duration::from_millis(1000),
            user_agent: None,
        }
    }
}

/// Successful outcome of one source.
#[derive(Debug)]
pub struct Outcome {
    pub final_path: PathBuf,
    /// Expected and verified size of the file.
    pub total_bytes: u64,
    /// Offset the transfer resumed from; 0 for a fresh download.
    pub resumed_from: u64,
    /// True when the file was already complete and no body was transferred.
    pub already_complete: bool,
}

/// Downloads one source to disk.
///
/// Fatal errors are per-source; a batch caller reports them and continues.
/// A failed transfer leaves the partial file in place for a later resume.
pub async fn download_one(
    source: &str,
    resolver: &dyn Resolve,
    options: &DownloadOptions,
    progress_sink: ProgressSink,
) -> Result<Outcome, DownloadError> {
    let resolved = resolver
        .resolve(source)
        .map_err(|e| DownloadError::Resolution(format!("{e:#}")))?;
    tracing::info!(url = %resolved.url, "resolved download URL");

    let filename = options
        .output_filename
        .clone()
        .or(resolved.filename)
        .ok_or_else(|| {
            DownloadError::Resolution("no filename extracted or specified".to_string())
        })?;
    let final_path = match &options.output_dir {
        Some(dir) => dir.join(&filename),
        None => PathBuf::from(&filename),
    };
    tracing::info!(filename = %filename, path = %final_path.display(), "target path resolved");

    // An existing final path that is not a regular file can never be
    // reconciled; refuse before touching the network.
    let existing = storage::stat_optional(&final_path).await?;
    if let Some(meta) = &existing {
        if !meta.is_file() {
            return Err(DownloadError::PathConflict(final_path));
        }
    }

    let head = probe::probe(&resolved.url, options.timeout, options.user_agent.as_deref()).await?;
    tracing::info!(
        content_length = ?head.content_length,
        accept_ranges = head.accept_ranges,
        last_modified = ?head.last_modified,
        "probed remote resource"
    );

    // A file already under the final name is accepted only when its size
    // matches exactly; anything else is refused rather than overwritten.
    if let Some(meta) = existing {
        let expected = head.content_length.ok_or(DownloadError::MissingContentLength)?;
        if meta.len() == expected {
            tracing::info!(size = expected, "already retrieved");
            return Ok(Outcome {
                final_path,
                total_bytes: expected,
                resumed_from: 0,
                already_complete: true,
            });
        }
        return Err(DownloadError::SizeMismatch {
            expected,
            actual: meta.len(),
        });
    }

    // Size is also the integrity check; without it the engine would have to
    // trust EOF, so a missing length is fatal before any GET.
    let total = head.content_length.ok_or(DownloadError::MissingContentLength)?;
    let modified = head
        .last_modified
        .as_deref()
        .and_then(|s| httpdate::parse_http_date(s).ok());

    let part_path = storage::partial_path(&final_path);
    let part_stat = storage::stat_optional(&part_path).await?;
    if let Some(meta) = &part_stat {
        if !meta.is_file() {
            return Err(DownloadError::PathConflict(part_path));
        }
    }

    let resume_from = if head.accept_ranges {
        part_stat.map(|m| m.len()).unwrap_or(0)
    } else {
        0
    };
    if resume_from > 0 {
        tracing::info!(resume_from, "compatible partial file found");
    }
    if resume_from > total {
        return Err(DownloadError::StalePartial {
            offset: resume_from,
            expected: total,
        });
    }

    if let Some(parent) = part_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let mut writer = PartialWriter::open(&part_path, resume_from > 0).await?;

    if total > 0 && resume_from != total {
        tracing::info!("transfer starting");
        let mut progress = Progress::new(total, resume_from);
        progress.start(options.update_interval, progress_sink)?;
        let result = transfer(&resolved.url, resume_from, options, &mut writer, &progress).await;
        // The sampler must not outlive this source's transfer, on any path.
        progress.end();
        result?;
        tracing::info!("transfer finished");
    } else {
        tracing::info!("partial file already complete, skipping transfer");
    }
    writer.finish().await?;

    let done = storage::stat_optional(&part_path).await?;
    match done {
        Some(meta) if meta.is_file() => {
            if meta.len() != total {
                return Err(DownloadError::SizeMismatch {
                    expected: total,
                    actual: meta.len(),
                });
            }
        }
        _ => {
            return Err(DownloadError::Other(anyhow::anyhow!(
                "partial file missing after transfer: {}",
                part_path.display()
            )))
        }
    }
    tracing::info!(size = total, "verified download size");

    if options.preserve_mtime {
        if let Some(when) = modified {
            storage::set_modified(&part_path, when)?;
            tracing::info!("applied server modification time");
        }
    }

    storage::promote(&part_path, &final_path).await?;
    tracing::info!(path = %final_path.display(), "partial promoted to final name");

    Ok(Outcome {
        final_path,
        total_bytes: total,
        resumed_from: resume_from,
        already_complete: false,
    })
}

/// Runs the GET, writing body chunks to the partial file and feeding the
/// sampler. A resumed transfer must answer 206, a fresh one 200; any other
/// status aborts the stream.
async fn transfer(
    url: &str,
    resume_from: u64,
    options: &DownloadOptions,
    writer: &mut PartialWriter,
    progress: &Progress,
) -> Result<(), DownloadError> {
    let mut request = RequestOptions::new(url);
    request.timeout = options.timeout;
    if let Some(ua) = &options.user_agent {
        request = request.header("User-Agent", ua.clone());
    }
    let expected_status = if resume_from > 0 {
        request = request.header("Range", format!("bytes={resume_from}-"));
        206
    } else {
        200
    };

    let mut stream = RequestStream::new(request);
    while let Some(event) = stream.next_event().await {
        match event {
            RequestEvent::Response(meta) => {
                if meta.status != expected_status {
                    stream.abort();
                    return Err(DownloadError::UnexpectedStatus {
                        context: "GET",
                        status: meta.status,
                    });
                }
            }
            RequestEvent::Data(chunk) => {
                writer.write(&chunk).await?;
                progress.add(chunk.len() as u64);
            }
            RequestEvent::End => return Ok(()),
            RequestEvent::Error(e) => return Err(e.into()),
        }
    }

    // The stream terminated without an end-of-body signal.
    Err(crate::http::TransportError::Aborted.into())
}
