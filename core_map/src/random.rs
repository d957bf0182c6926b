//! Deterministic 48-bit random stream.
//!
//! Every random choice made during generation draws exactly one 16-bit word
//! from this stream, in a fixed order. Word size and wraparound must stay
//! exactly as written here or existing seeds stop reproducing their maps.

use std::hash::Hasher;

use rand::{Error as RandError, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hashing::FnvHasher;

const SEED_DIGITS: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed string must have {SEED_DIGITS} digits, got {0}")]
    Length(usize),
    #[error("seed string digits run from 1 to 8, got {0:?}")]
    Digit(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapRandom {
    state: [u16; 3],
}

impl MapRandom {
    /// Seed from the low 48 bits of `seed`, low word first.
    ///
    /// With both upper words zero the stream would repeat its first word
    /// forever, so such seeds are spread across all three words instead;
    /// zero spreads to `[0, 0xffff, 0xffff]`.
    pub fn new(seed: u64) -> Self {
        let words = [seed as u16, (seed >> 16) as u16, (seed >> 32) as u16];
        match words {
            [0, 0, 0] => Self::from_words([0, 0xffff, 0xffff]),
            [low, 0, 0] => Self::from_words([low, low, low]),
            words => Self::from_words(words),
        }
    }

    /// Exact stream state, low word first.
    pub fn from_words(words: [u16; 3]) -> Self {
        Self { state: words }
    }

    /// Parse the 16-digit seed strings used in save files and mission
    /// tables: each digit `1..=8` carries three bits, most significant
    /// first. The words are taken as written.
    pub fn from_seed_str(text: &str) -> Result<Self, SeedError> {
        let count = text.chars().count();
        if count != SEED_DIGITS {
            return Err(SeedError::Length(count));
        }
        let mut value = 0u64;
        for ch in text.chars() {
            let digit = match ch {
                '1'..='8' => u64::from(ch as u8 - b'1'),
                _ => return Err(SeedError::Digit(ch)),
            };
            value = (value << 3) | digit;
        }
        Ok(Self::from_words([
            value as u16,
            (value >> 16) as u16,
            (value >> 32) as u16,
        ]))
    }

    /// Seed strings parse directly; any other phrase is hashed.
    pub fn from_phrase(phrase: &str) -> Self {
        match Self::from_seed_str(phrase) {
            Ok(random) => random,
            Err(_) => {
                let mut hasher = FnvHasher::new();
                hasher.write(phrase.as_bytes());
                Self::new(hasher.finish())
            }
        }
    }

    /// The 48-bit seed that would recreate the current state.
    pub fn seed(&self) -> u64 {
        u64::from(self.state[0])
            | (u64::from(self.state[1]) << 16)
            | (u64::from(self.state[2]) << 32)
    }

    /// Inverse of [`MapRandom::from_seed_str`].
    pub fn to_seed_string(&self) -> String {
        let value = self.seed();
        (0..SEED_DIGITS)
            .rev()
            .map(|digit| char::from(b'1' + ((value >> (3 * digit)) & 7) as u8))
            .collect()
    }

    /// Draw the next 16-bit word.
    pub fn next_word(&mut self) -> u16 {
        let [s0, s1, s2] = self.state;
        let result = s0.wrapping_add(s1) ^ s2;
        let s2 = s2.wrapping_add(s1);
        let s1 = s1 ^ s2;
        self.state = [result, s1.rotate_right(1), s2.rotate_right(1)];
        result
    }

    /// Draw a word as `i32`, the form the height arithmetic works in.
    #[inline]
    pub fn next_i32(&mut self) -> i32 {
        i32::from(self.next_word())
    }
}

impl RngCore for MapRandom {
    fn next_u32(&mut self) -> u32 {
        let high = u32::from(self.next_word());
        let low = u32::from(self.next_word());
        (high << 16) | low
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(2) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for MapRandom {
    type Seed = [u8; 6];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::from_words([
            u16::from_le_bytes([seed[0], seed[1]]),
            u16::from_le_bytes([seed[2], seed[3]]),
            u16::from_le_bytes([seed[4], seed[5]]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn stream_uses_wrapping_sixteen_bit_words() {
        let mut random = MapRandom::from_words([0xffff, 0x0002, 0x0001]);
        // (0xffff + 2) wraps to 1, 1 ^ 1 == 0.
        assert_eq!(random.next_word(), 0);
        // s2 = 1 + 2 = 3, s1 = 2 ^ 3 = 1; both rotated right by one.
        assert_eq!(random.state, [0, 0x8000, 0x8001]);
    }

    #[test]
    fn identical_seeds_give_identical_streams() {
        let mut a = MapRandom::new(0x1234_5678_9abc);
        let mut b = MapRandom::new(0x1234_5678_9abc);
        let draws_a: Vec<u16> = (0..64).map(|_| a.next_word()).collect();
        let draws_b: Vec<u16> = (0..64).map(|_| b.next_word()).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().any(|&w| w != draws_a[0]));
    }

    #[test]
    fn mission_seed_strings_round_trip() {
        let random = MapRandom::from_seed_str("8667715887436237").expect("seed string");
        assert_eq!(random.to_seed_string(), "8667715887436237");
        assert_eq!(MapRandom::from_phrase("8667715887436237"), random);

        let lowest = MapRandom::from_seed_str("1111111111111112").expect("seed string");
        assert_eq!(lowest.state, [1, 0, 0]);

        assert_eq!(
            MapRandom::from_seed_str("0123456701234567"),
            Err(SeedError::Digit('0'))
        );
        assert_eq!(MapRandom::from_seed_str("1234"), Err(SeedError::Length(4)));
    }

    #[test]
    fn small_seeds_still_vary() {
        for seed in [0u64, 1, 5, 7, 77, 99, 0xffff] {
            let mut random = MapRandom::new(seed);
            let draws: Vec<u16> = (0..16).map(|_| random.next_word()).collect();
            assert!(
                draws.iter().any(|&w| w != draws[0]),
                "seed {seed} repeats {:#06x}",
                draws[0]
            );
        }
        assert_ne!(MapRandom::new(0), MapRandom::new(1));
        assert_eq!(MapRandom::new(1).state, [1, 1, 1]);
    }

    #[test]
    fn wide_seeds_keep_their_words() {
        let random = MapRandom::new(0x1234_5678_9abc);
        assert_eq!(random.state, [0x9abc, 0x5678, 0x1234]);
        assert_eq!(random.seed(), 0x1234_5678_9abc);
    }

    #[test]
    fn phrases_hash_deterministically() {
        let a = MapRandom::from_phrase("green valley");
        let b = MapRandom::from_phrase("green valley");
        assert_eq!(a, b);
        assert_ne!(a, MapRandom::from_phrase("grey valley"));
    }

    #[test]
    fn works_through_rand_api() {
        let mut random = MapRandom::seed_from_u64(42);
        let roll: u8 = random.gen_range(1..=6);
        assert!((1..=6).contains(&roll));
        let mut bytes = [0u8; 5];
        random.fill_bytes(&mut bytes);
    }
}
