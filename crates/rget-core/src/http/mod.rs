//! One-shot HTTP requests as pull-based event streams.
//!
//! Uses the curl crate (libcurl) for the transport. A request runs on its own
//! thread and feeds a bounded channel of tagged events; nothing is sent on the
//! wire until the consumer pulls the first event.

mod fetch;
mod headers;
mod stream;

pub use fetch::{fetch, FetchError, FetchedResponse};
pub use stream::RequestStream;

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// Request method. Only the two verbs the engine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
}

/// Options for a single request. Immutable once the transfer starts.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: Method,
    /// Extra request headers; a `User-Agent` entry here overrides the default.
    pub headers: HashMap<String, String>,
    /// Ask the server for compressed encodings. Off by default: a compressed
    /// body would not match the probed Content-Length.
    pub gzip: bool,
    /// Whole-request timeout. `None` leaves only the connect timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: HashMap::new(),
            gzip: false,
            timeout: None,
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            ..Self::new(url)
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Response status line and headers, available before any body bytes.
///
/// Header names are lowercased; repeated headers are comma-joined.
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    pub status: u32,
    pub headers: HashMap<String, String>,
}

impl ResponseMeta {
    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Events delivered by a [`RequestStream`], in order: exactly one `Response`,
/// any number of `Data` chunks, then exactly one of `End` or `Error`.
#[derive(Debug)]
pub enum RequestEvent {
    Response(ResponseMeta),
    Data(Vec<u8>),
    End,
    Error(TransportError),
}

/// Transport-level failure of a request. No retries happen at this layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),

    #[error("transfer aborted")]
    Aborted,

    #[error("transfer ended before response headers")]
    NoResponse,
}
