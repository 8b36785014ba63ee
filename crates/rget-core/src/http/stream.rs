//! Lazily-started request stream with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::headers::HeaderAccumulator;
use super::{Method, RequestEvent, RequestOptions, TransportError};

/// Events buffered between the transfer thread and the consumer. Small on
/// purpose: a slow consumer stalls the transfer instead of buffering the body.
const EVENT_CHANNEL_CAPACITY: usize = 8;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTIONS: u32 = 10;
const DEFAULT_USER_AGENT: &str = "-";

/// One HTTP exchange exposed as a pull-based sequence of [`RequestEvent`]s.
///
/// Construction performs no I/O; the transfer thread is spawned on the first
/// [`next_event`](Self::next_event) call. Events arrive in order: exactly one
/// `Response` once headers are in, each body chunk exactly once, then one of
/// `End` or `Error`.
pub struct RequestStream {
    options: Option<RequestOptions>,
    rx: Option<mpsc::Receiver<RequestEvent>>,
    abort: Arc<AtomicBool>,
    done: bool,
}

impl RequestStream {
    pub fn new(options: RequestOptions) -> Self {
        Self {
            options: Some(options),
            rx: None,
            abort: Arc::new(AtomicBool::new(false)),
            done: false,
        }
    }

    /// Pulls the next event, starting the transfer on the first call.
    /// Returns `None` once the stream has ended, errored, or been aborted.
    pub async fn next_event(&mut self) -> Option<RequestEvent> {
        if self.done {
            return None;
        }
        if self.abort.load(Ordering::Relaxed) {
            // Dropping the receiver makes the transfer thread's next send
            // fail, which cancels the in-flight operation.
            self.rx = None;
            self.done = true;
            return None;
        }
        if let Some(options) = self.options.take() {
            let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            let abort = Arc::clone(&self.abort);
            std::thread::spawn(move || run_transfer(options, tx, abort));
            self.rx = Some(rx);
        }
        let event = self.rx.as_mut()?.recv().await;
        if matches!(event, None | Some(RequestEvent::End) | Some(RequestEvent::Error(_))) {
            self.done = true;
        }
        event
    }

    /// Cancels the in-flight transfer, if any. Pending reads yield no further
    /// data. Safe to call repeatedly and before the transfer has started.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }
}

/// Runs the whole exchange on the transfer thread and reports the terminal
/// event. Send failures mean the consumer is gone; nothing to report then.
fn run_transfer(
    options: RequestOptions,
    tx: mpsc::Sender<RequestEvent>,
    abort: Arc<AtomicBool>,
) {
    match perform(&options, &tx, &abort) {
        Ok(()) => {
            let _ = tx.blocking_send(RequestEvent::End);
        }
        Err(e) => {
            let _ = tx.blocking_send(RequestEvent::Error(e));
        }
    }
}

fn perform(
    options: &RequestOptions,
    tx: &mpsc::Sender<RequestEvent>,
    abort: &Arc<AtomicBool>,
) -> Result<(), TransportError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(&options.url)?;
    if options.method == Method::Head {
        easy.nobody(true)?;
    }
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTIONS)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    if let Some(timeout) = options.timeout {
        easy.timeout(timeout)?;
    }
    if options.gzip {
        // Empty string enables every encoding libcurl was built with.
        easy.accept_encoding("")?;
    }

    let has_user_agent = options
        .headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case("user-agent"));
    if !has_user_agent {
        easy.useragent(DEFAULT_USER_AGENT)?;
    }

    let mut list = curl::easy::List::new();
    for (k, v) in &options.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !options.headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut acc = HeaderAccumulator::default();
        let header_tx = tx.clone();
        let header_abort = Arc::clone(abort);
        let body_tx = tx.clone();
        let body_abort = Arc::clone(abort);

        let mut transfer = easy.transfer();
        transfer.header_function(move |line| {
            if header_abort.load(Ordering::Relaxed) {
                return false;
            }
            let Ok(line) = std::str::from_utf8(line) else {
                return true;
            };
            if let Some(meta) = acc.push_line(line) {
                return header_tx.blocking_send(RequestEvent::Response(meta)).is_ok();
            }
            true
        })?;
        transfer.write_function(move |data| {
            if body_abort.load(Ordering::Relaxed) {
                return Ok(0);
            }
            match body_tx.blocking_send(RequestEvent::Data(data.to_vec())) {
                Ok(()) => Ok(data.len()),
                Err(_) => Ok(0),
            }
        })?;

        if let Err(e) = transfer.perform() {
            if abort.load(Ordering::Relaxed) {
                return Err(TransportError::Aborted);
            }
            if e.is_write_error() {
                // Write/header callbacks only refuse when the consumer went
                // away; treat that the same as an explicit abort.
                return Err(TransportError::Aborted);
            }
            return Err(TransportError::Curl(e));
        }
    }

    Ok(())
}
