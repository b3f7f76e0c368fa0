//! Content fingerprinting for change detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content fingerprint computed with XXH3.
///
/// Two byte sequences with the same `Fingerprint` are assumed identical.
/// The staging pipeline records one fingerprint for the content it rendered
/// and one for the bytes that ended up on disk (which may differ after an
/// external formatting pass); comparing both decides whether a file is clean.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Computes a fingerprint from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes a fingerprint of a string's UTF-8 bytes.
    pub fn from_str_content(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = Fingerprint::from_bytes(b"<?php echo 1;");
        let b = Fingerprint::from_bytes(b"<?php echo 1;");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = Fingerprint::from_bytes(b"<?php echo 1;");
        let b = Fingerprint::from_bytes(b"<?php echo 2;");
        assert_ne!(a, b);
    }

    #[test]
    fn str_and_bytes_agree() {
        let a = Fingerprint::from_str_content("generated");
        let b = Fingerprint::from_bytes(b"generated");
        assert_eq!(a, b);
    }

    #[test]
    fn display_is_32_hex_chars() {
        let h = Fingerprint::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = Fingerprint::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
