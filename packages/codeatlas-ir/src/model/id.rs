//! Content-addressed IDs (§3, §9 "Hash stability").
//!
//! IDs are the truncated (16 hex char) form of a SHA-256 digest over stable
//! inputs only — kind, qualified name, span, and the content of the
//! construct being named. Byte offsets are stable across runs; parse-time
//! clocks and node-iteration order are not, and must never be hashed.

use sha2::{Digest, Sha256};

/// Hash arbitrary stable fields into a content-addressed ID, truncated to
/// 16 hex characters. Callers pass each field pre-serialized to a stable
/// string representation (e.g. `span.sort_key()` formatted, not `Instant`).
pub fn content_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    let digest = hasher.finalize();
    hex16(&digest)
}

/// Full digest, kept for the integrity record (snapshot verification uses
/// the whole 256 bits; node/edge IDs only need the truncated form).
pub fn full_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode_digest(&hasher.finalize())
}

fn hex16(bytes: &[u8]) -> String {
    hex::encode_digest(bytes)[..16].to_string()
}

/// Minimal hex encoding so we don't pull in the `hex` crate for one function.
mod hex {
    pub fn encode_digest(bytes: &[u8]) -> String {
        const LUT: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            out.push(LUT[(b >> 4) as usize] as char);
            out.push(LUT[(b & 0x0f) as usize] as char);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_id() {
        let a = content_id(&["Function", "pkg.mod.f", "1:0-3:1"]);
        let b = content_id(&["Function", "pkg.mod.f", "1:0-3:1"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn different_input_different_id() {
        let a = content_id(&["Function", "pkg.mod.f", "1:0-3:1"]);
        let b = content_id(&["Function", "pkg.mod.g", "1:0-3:1"]);
        assert_ne!(a, b);
    }

    #[test]
    fn field_boundaries_are_not_conflated() {
        // "ab" + "c" must hash differently from "a" + "bc"
        let a = content_id(&["ab", "c"]);
        let b = content_id(&["a", "bc"]);
        assert_ne!(a, b);
    }
}
