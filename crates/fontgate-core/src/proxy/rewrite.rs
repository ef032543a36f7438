//! Literal body rewriting.

/// Reserved path segment that routes to the static-asset host.
pub const STATIC_SEGMENT: &str = "/static";

/// Replaces every non-overlapping occurrence of `needle`, scanning left to right.
pub fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// Local path that stands in for the static host: `prefix` joined with
/// `static`, with duplicate slashes collapsed and the trailing one dropped.
pub fn static_mount(prefix: &str) -> String {
    let mut segments: Vec<&str> = prefix
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    segments.push(&STATIC_SEGMENT[1..]);
    let joined = segments.join("/");
    if prefix.starts_with('/') {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Strips the leading `/static` segment; `None` if the path is not under it.
///
/// `/static` and `/static/x` match; `/staticfoo` matches too, as a plain
/// prefix test, leaving `foo`.
pub fn strip_static(path: &str) -> Option<&str> {
    path.strip_prefix(STATIC_SEGMENT)
}
