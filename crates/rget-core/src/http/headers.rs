//! Accumulates raw response header lines into a [`ResponseMeta`].

use std::collections::hash_map::Entry;

use super::ResponseMeta;

/// Builds response metadata from the header callback's line-at-a-time feed.
///
/// libcurl delivers one header block per hop when following redirects; a new
/// status line resets the accumulator so only the final block survives.
#[derive(Debug, Default)]
pub(super) struct HeaderAccumulator {
    meta: ResponseMeta,
}

impl HeaderAccumulator {
    /// Feeds one raw header line. Returns the completed metadata when the
    /// blank line ending a non-interim block is seen.
    pub(super) fn push_line(&mut self, line: &str) -> Option<ResponseMeta> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = line.strip_prefix("HTTP/") {
            self.meta = ResponseMeta::default();
            self.meta.status = rest
                .split_whitespace()
                .nth(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            return None;
        }

        if line.is_empty() {
            // End of a block. Interim (1xx) and redirect (3xx, handled by
            // libcurl) blocks are followed by another; only the final block
            // is the response the consumer sees.
            let status = self.meta.status;
            if status >= 200 && !(300..400).contains(&status) {
                return Some(std::mem::take(&mut self.meta));
            }
            return None;
        }

        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match self.meta.headers.entry(name) {
                Entry::Occupied(mut e) => {
                    let joined = format!("{}, {}", e.get(), value);
                    e.insert(joined);
                }
                Entry::Vacant(e) => {
                    e.insert(value);
                }
            }
        }
        None
    }
}
