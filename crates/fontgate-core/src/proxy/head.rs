//! Parse upstream response header lines collected by curl.

use super::Headers;

/// Status, reason phrase and headers of the final response block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status: u32,
    pub reason: String,
    pub headers: Headers,
}

/// Curl reports every header block it sees, including interim `1xx` ones.
/// Each status line starts a new block; only the last one is kept.
pub(crate) fn parse_response_head(lines: &[String]) -> Option<ResponseHead> {
    let mut head: Option<ResponseHead> = None;
    for line in lines {
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            let mut parts = line.splitn(3, ' ');
            let _version = parts.next();
            let status = parts.next().and_then(|s| s.parse::<u32>().ok())?;
            let reason = parts.next().unwrap_or("").trim().to_string();
            head = Some(ResponseHead {
                status,
                reason,
                headers: Headers::new(),
            });
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(h) = head.as_mut() {
            h.headers.push_line(line);
        }
    }
    head
}
