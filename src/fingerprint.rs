// src/fingerprint.rs

//! Content fingerprints used as entity tags.
//!
//! A fingerprint is the lowercase hex BLAKE3 digest of a file's bytes. It is
//! the only thing clients ever see of the cache: it goes out in `ETag` and
//! comes back in `If-None-Match`.

use std::fmt;

use blake3::Hasher;

/// Hex digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

/// Compute the fingerprint of an in-memory byte sequence.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    Fingerprint(hasher.finalize().to_hex().to_string())
}

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strong entity tag form, e.g. `"3a7b..."`.
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Parse a client-supplied entity tag.
    ///
    /// Accepts the quoted form we emit, a bare token, and weak tags
    /// (`W/"..."`). Only the first tag of a list is considered. Returns
    /// `None` for empty input and for `*`.
    pub fn parse_etag(raw: &str) -> Option<Self> {
        let first = raw.split(',').next()?.trim();
        let first = first.strip_prefix("W/").unwrap_or(first);
        let token = first.trim_matches('"').trim();

        if token.is_empty() || token == "*" {
            return None;
        }
        Some(Fingerprint(token.to_string()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_for_hello_world() {
        // blake3("hello world")
        assert_eq!(
            fingerprint(b"hello world").as_str(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn header_value_is_quoted() {
        let fp = fingerprint(b"x");
        let header = fp.to_header_value();
        assert!(header.starts_with('"') && header.ends_with('"'));
        assert_eq!(header.len(), 66);
    }

    #[test]
    fn parse_etag_accepts_common_forms() {
        let fp = fingerprint(b"abc");
        let hex = fp.as_str();

        assert_eq!(Fingerprint::parse_etag(hex), Some(fp.clone()));
        assert_eq!(Fingerprint::parse_etag(&format!("\"{hex}\"")), Some(fp.clone()));
        assert_eq!(Fingerprint::parse_etag(&format!("W/\"{hex}\"")), Some(fp.clone()));
        assert_eq!(
            Fingerprint::parse_etag(&format!(" \"{hex}\", \"other\"")),
            Some(fp)
        );
    }

    #[test]
    fn parse_etag_rejects_empty_and_wildcard() {
        assert_eq!(Fingerprint::parse_etag(""), None);
        assert_eq!(Fingerprint::parse_etag("\"\""), None);
        assert_eq!(Fingerprint::parse_etag("*"), None);
    }
}
