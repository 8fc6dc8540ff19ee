//! Random source for the noise operator.
//!
//! The pipeline never reaches for global randomness directly: it draws from a
//! [`NoiseSource`], so tests and callers that need reproducible grain can pass
//! a seeded [`XorShift`] instead of the entropy-seeded default.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Bumped by every [`XorShift::from_entropy`] call in this process.
static SEED_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Odd multiplier spreading consecutive counter values across all 32 bits.
const GOLDEN_GAMMA: u32 = 0x9E37_79B9;

/// Uniform random numbers in `[0, 1)`.
pub trait NoiseSource {
    fn next_unit(&mut self) -> f32;
}

/// Xorshift32 generator. Not cryptographic; cheap enough to call per channel.
#[derive(Debug, Clone)]
pub struct XorShift {
    state: u32,
}

impl XorShift {
    /// Seeded generator. A zero seed is remapped since xorshift would stick at zero.
    pub fn seeded(seed: u32) -> Self {
        Self {
            state: if seed == 0 { GOLDEN_GAMMA } else { seed },
        }
    }

    /// Generator seeded from the system clock and a per-process call counter.
    ///
    /// Calls landing in the same clock tick, e.g. from parallel batch workers,
    /// still get distinct seeds.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(0);
        let count = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::seeded(nanos ^ count.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA))
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl NoiseSource for XorShift {
    fn next_unit(&mut self) -> f32 {
        // 24 high bits keep the result strictly below 1.0 in f32.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Always returns the same value. Useful for pinning noise in tests.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f32);

impl NoiseSource for ConstantNoise {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_repeat() {
        let mut a = XorShift::seeded(42);
        let mut b = XorShift::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut rng = XorShift::seeded(7);
        for _ in 0..10_000 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn entropy_generators_diverge() {
        let mut generators: Vec<XorShift> = (0..8).map(|_| XorShift::from_entropy()).collect();
        let firsts: Vec<Vec<f32>> = generators
            .iter_mut()
            .map(|g| (0..4).map(|_| g.next_unit()).collect())
            .collect();
        for (i, a) in firsts.iter().enumerate() {
            for b in &firsts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let mut rng = XorShift::seeded(0);
        let first = rng.next_unit();
        let second = rng.next_unit();
        assert_ne!(first, second);
    }
}
