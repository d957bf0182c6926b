use std::hash::Hasher;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomized per process, so seed phrases and map
/// fingerprints go through this instead.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Fingerprint of a byte buffer, stable across runs and platforms.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(bytes);
    hasher.finish()
}
