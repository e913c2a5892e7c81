//! Cache key derivation.

use std::fmt;

use sha2::{Digest, Sha256};

/// How much of the diff feeds the fingerprint.
///
/// A prefix is enough to distinguish real change sets while keeping the
/// digest cost flat for very large diffs; two diffs that agree on the first
/// 500 characters under the same settings collide intentionally.
pub const DIFF_PREFIX_LEN: usize = 500;

/// Hex characters kept from the digest. 64 bits is plenty for a
/// single-user on-disk cache and keeps filenames short.
const FINGERPRINT_LEN: usize = 16;

/// A cache lookup key derived from generation settings and diff content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a (settings, diff) pair.
    pub fn compute(settings_id: &str, diff: &str) -> Self {
        let prefix: String = diff.chars().take(DIFF_PREFIX_LEN).collect();

        let mut hasher = Sha256::new();
        hasher.update(settings_id.as_bytes());
        hasher.update(b":");
        hasher.update(prefix.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Fingerprint(digest[..FINGERPRINT_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
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
    fn test_fingerprint_is_deterministic() {
        let a = Fingerprint::compute("model:tinyllama", "diff --git a/x b/x\n+line");
        let b = Fingerprint::compute("model:tinyllama", "diff --git a/x b/x\n+line");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_settings() {
        let a = Fingerprint::compute("rules", "+same diff");
        let b = Fingerprint::compute("model:tinyllama", "+same diff");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_diff() {
        let a = Fingerprint::compute("rules", "+one change");
        let b = Fingerprint::compute("rules", "+another change");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_diff_past_prefix() {
        let shared: String = "x".repeat(DIFF_PREFIX_LEN);
        let a = Fingerprint::compute("rules", &format!("{shared}tail one"));
        let b = Fingerprint::compute("rules", &format!("{shared}tail two"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_length_and_charset() {
        let fp = Fingerprint::compute("rules", "+change");
        assert_eq!(fp.as_str().len(), 16);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_prefix_boundary_is_chars_not_bytes() {
        // Multibyte input near the boundary must not panic.
        let diff: String = "é".repeat(DIFF_PREFIX_LEN + 10);
        let fp = Fingerprint::compute("rules", &diff);
        assert_eq!(fp.as_str().len(), 16);
    }
}
