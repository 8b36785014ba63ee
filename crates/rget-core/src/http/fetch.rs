//! Buffering convenience wrapper over [`RequestStream`].

use thiserror::Error;

use super::{RequestEvent, RequestOptions, RequestStream, ResponseMeta, TransportError};

/// A fully buffered response.
#[derive(Debug)]
pub struct FetchedResponse {
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// The body as UTF-8 text, when it is text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Transport failure with whatever response metadata had arrived before it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct FetchError {
    /// Present when the failure happened after headers were received.
    pub meta: Option<ResponseMeta>,
    #[source]
    pub source: TransportError,
}

/// Runs a request to completion, buffering the whole body.
///
/// Suited to small exchanges (HEAD probes, extractor pages); downloads go
/// through [`RequestStream`] directly so the body is never held in memory.
pub async fn fetch(options: RequestOptions) -> Result<FetchedResponse, FetchError> {
    let mut stream = RequestStream::new(options);
    let mut meta: Option<ResponseMeta> = None;
    let mut body = Vec::new();

    while let Some(event) = stream.next_event().await {
        match event {
            RequestEvent::Response(m) => meta = Some(m),
            RequestEvent::Data(chunk) => body.extend_from_slice(&chunk),
            RequestEvent::End => {
                return match meta {
                    Some(meta) => Ok(FetchedResponse { meta, body }),
                    None => Err(FetchError {
                        meta: None,
                        source: TransportError::NoResponse,
                    }),
                };
            }
            RequestEvent::Error(source) => return Err(FetchError { meta, source }),
        }
    }

    Err(FetchError {
        meta,
        source: TransportError::Aborted,
    })
}
