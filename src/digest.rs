// src/digest.rs
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// First `bytes` bytes of the SHA-256 of `text`, hex encoded.
pub fn short_digest(text: &str, bytes: usize) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(bytes * 2);
    for b in digest.iter().take(bytes) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Anonymized id for log lines; raw text is never logged.
pub fn anon_hash(text: &str) -> String {
    short_digest(text, 6)
}
