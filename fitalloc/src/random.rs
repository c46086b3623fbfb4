use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Fallback state for a zero seed, which would lock xorshift at zero forever.
const ZERO_SEED_REPLACEMENT: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Source of non-negative pseudo-random integers driving a workload.
pub trait RandomSource {
    fn next_value(&mut self) -> u64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_value(&mut self) -> u64 {
        (**self).next_value()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_value(&mut self) -> u64 {
        (**self).next_value()
    }
}

/// Deterministic generator used for seeded, reproducible runs.
#[derive(Debug, Clone)]
pub struct Xorshift64(u64);

impl Xorshift64 {
    pub fn new(seed: u64) -> Self {
        if seed == 0 {
            Self(ZERO_SEED_REPLACEMENT)
        } else {
            Self(seed)
        }
    }

    /// Generator for trial `trial` of a run seeded with `seed`; trials of the
    /// same run get distinct streams.
    pub fn for_trial(seed: u64, trial: usize) -> Self {
        let mixed = seed ^ (trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(mixed)
    }

    pub fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

impl RandomSource for Xorshift64 {
    fn next_value(&mut self) -> u64 {
        self.next()
    }
}

/// Entropy-seeded generator; every run differs.
pub struct EntropyRandom(StdRng);

impl EntropyRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_value(&mut self) -> u64 {
        self.0.next_u64()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<u64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "scripted values cannot be empty");
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_value(&mut self) -> u64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
