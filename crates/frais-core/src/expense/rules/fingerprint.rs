//! Content fingerprints for exact-duplicate page detection.

use std::collections::HashSet;
use std::fmt;

/// BLAKE3 digest of a page's extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    pub fn of_text(text: &str) -> Self {
        Self(blake3::hash(text.as_bytes()))
    }

    /// Hex-encoded digest (64 characters).
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Remembers page fingerprints seen so far in one document.
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    seen: HashSet<Fingerprint>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint `text` and report whether an earlier page had the same text.
    ///
    /// First occurrences are registered; repeats are not re-added.
    pub fn observe(&mut self, text: &str) -> (Fingerprint, bool) {
        let fingerprint = Fingerprint::of_text(text);
        let is_duplicate = !self.seen.insert(fingerprint);
        (fingerprint, is_duplicate)
    }

    /// Number of distinct pages seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
