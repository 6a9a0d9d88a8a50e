//! Stable player identity derived from a client credential

use std::hash::Hasher;

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, and
/// fingerprints and state hashes are persisted or compared across processes.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Identity string for a credential: `FNV1A:` followed by 16 lowercase hex digits.
///
/// Surrounding whitespace is ignored so a pasted credential maps to the same
/// player.
///
/// ```
/// use tui_2048_store::fingerprint;
///
/// let fp = fingerprint("alice");
/// assert!(fp.starts_with("FNV1A:"));
/// assert_eq!(fp.len(), 6 + 16);
/// assert_eq!(fp, fingerprint("  alice\n"));
/// ```
pub fn fingerprint(credential: &str) -> String {
    let mut hasher = Fnv1aHasher::new();
    hasher.write(credential.trim().as_bytes());
    format!("FNV1A:{:016x}", hasher.finish())
}
