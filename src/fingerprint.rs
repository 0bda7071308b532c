//! Content fingerprints.
//!
//! SHA-256 digest of arbitrary bytes rendered as 64 lowercase hex characters.
//! Used wherever a stable identifier has to be derived from request data,
//! such as cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a rendered fingerprint, in characters.
pub const FINGERPRINT_LEN: usize = 64;

/// A 256-bit digest in lowercase hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> String {
        fp.0
    }
}

/// Fingerprints `input`. Total and deterministic.
pub fn fingerprint(input: impl AsRef<[u8]>) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(input.as_ref());
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Fingerprints the UTF-8 bytes of `input`.
pub fn fingerprint_str(input: &str) -> Fingerprint {
    fingerprint(input.as_bytes())
}
