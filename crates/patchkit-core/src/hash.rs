use std::sync::Arc;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Computes the hex digest manifests carry for each file.
pub trait HashProvider: Send + Sync {
    fn digest(&self, data: &[u8]) -> String;
}

/// Lower-case hex MD5, the digest the update server publishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl HashProvider for Md5Hasher {
    fn digest(&self, data: &[u8]) -> String {
        format!("{:x}", Md5::digest(data))
    }
}

/// Lower-case hex SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashProvider for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }
}

/// Digest algorithm named in settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    #[must_use]
    pub fn hasher(self) -> Arc<dyn HashProvider> {
        match self {
            Self::Md5 => Arc::new(Md5Hasher),
            Self::Sha256 => Arc::new(Sha256Hasher),
        }
    }
}

pub(crate) fn digests_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::{HashAlgorithm, HashProvider, Md5Hasher, Sha256Hasher, digests_match};

    #[test]
    fn sha256_returns_known_digest() {
        assert_eq!(
            Sha256Hasher.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn md5_returns_known_digest() {
        assert_eq!(Md5Hasher.digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(Md5Hasher.digest(b"v2"), "1b267619c4812cc46ee281747884ca50");
    }

    #[test]
    fn algorithm_defaults_to_md5_and_parses_lowercase() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Md5);
        let parsed: HashAlgorithm = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha256);
        assert_eq!(
            HashAlgorithm::Md5.hasher().digest(b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn digest_comparison_ignores_case() {
        assert!(digests_match("ABCDEF01", "abcdef01"));
        assert!(!digests_match("abcdef01", "abcdef02"));
        assert!(!digests_match("", "abcdef01"));
    }
}
