//! Ordered HTTP header list with case-insensitive names.

/// Header lines in wire order. Names compare case-insensitively; repeated
/// names are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces every `name` entry with a single one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.entries.push((name.to_string(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses one `Name: value` line; lines without a colon are ignored.
    pub fn push_line(&mut self, line: &str) {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                self.append(name, value.trim());
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let h: Headers = [("Content-Type", "text/css")].into_iter().collect();
        assert_eq!(h.get("content-type"), Some("text/css"));
        assert!(h.contains("CONTENT-TYPE"));
    }

    #[test]
    fn set_replaces_all_entries() {
        let mut h: Headers = [("X-A", "1"), ("x-a", "2"), ("X-B", "3")]
            .into_iter()
            .collect();
        h.set("X-A", "9");
        assert_eq!(h.len(), 2);
        assert_eq!(h.get("x-a"), Some("9"));
    }

    #[test]
    fn push_line_trims_and_skips_garbage() {
        let mut h = Headers::new();
        h.push_line("Content-Length:  12 ");
        h.push_line("HTTP/1.1 200 OK");
        h.push_line(": empty-name");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("content-length"), Some("12"));
    }
}
