//! Launch parameters from a URL query string

use std::collections::BTreeMap;

/// Decoded `key=value` pairs from the launch URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    data: BTreeMap<String, String>,
}

impl Query {
    /// Parse the query part of `url`; a bare query string (`a=1&b=2`) is also accepted
    ///
    /// Pairs without `=` are ignored. Keys and values are percent-decoded;
    /// text that does not decode is kept as written.
    pub fn parse(url: &str) -> Self {
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None if url.contains('=') => url,
            None => return Self::default(),
        };
        let query = query.split_once('#').map_or(query, |(query, _)| query);

        let data = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (decode(key), decode(value)))
            .collect();
        Self { data }
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// All pairs
    pub const fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no pairs were found
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn decode(text: &str) -> String {
    percent_decode(text).unwrap_or_else(|| text.to_string())
}

fn percent_decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_url() {
        let query = Query::parse("https://game.example/index.html?token=abc&name=x%20y#top");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("token"), Some("abc"));
        assert_eq!(query.get("name"), Some("x y"));
    }

    #[test]
    fn test_pairs_without_equals_are_ignored() {
        let query = Query::parse("?debug&lang=en&=empty&flag=");
        assert_eq!(query.get("debug"), None);
        assert_eq!(query.get("lang"), Some("en"));
        assert_eq!(query.get(""), Some("empty"));
        assert_eq!(query.get("flag"), Some(""));
    }

    #[test]
    fn test_multibyte_and_malformed_escapes() {
        let query = Query::parse("a=%E4%B8%AD&b=100%&c=1+2");
        assert_eq!(query.get("a"), Some("中"));
        assert_eq!(query.get("b"), Some("100%"));
        assert_eq!(query.get("c"), Some("1+2"));
    }

    #[test]
    fn test_no_query() {
        assert!(Query::parse("https://game.example/").is_empty());
        assert!(Query::parse("").is_empty());
    }
}
