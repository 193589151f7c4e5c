//! Sources of non-determinism: the current instant and random bytes.
//!
//! Encoders never call `Utc::now()` or a RNG directly; they go through a
//! `GenerateContext` so callers can pin both for reproducible output.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Thread-local OS-seeded RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}

/// Deterministic RNG: the same seed yields the same byte stream across runs,
/// while successive draws still differ.
#[derive(Debug)]
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.fill_bytes(dest);
    }
}

/// Clock and randomness handed to every encoder call.
pub struct GenerateContext {
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
}

impl GenerateContext {
    pub fn new(clock: impl Clock + 'static, random: impl RandomSource + 'static) -> Self {
        GenerateContext {
            clock: Box::new(clock),
            random: Box::new(random),
        }
    }

    /// Real time and OS randomness.
    pub fn system() -> Self {
        GenerateContext::new(SystemClock, ThreadRandom)
    }

    /// Pinned time and a seeded RNG, for reproducible output.
    pub fn fixed(now: DateTime<Utc>, seed: u64) -> Self {
        GenerateContext::new(FixedClock(now), SeededRandom::new(seed))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `len` random bytes, hex encoded (`2 * len` chars).
    pub fn random_hex(&self, len: usize) -> String {
        let mut bytes = vec![0u8; len];
        self.random.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl Default for GenerateContext {
    fn default() -> Self {
        GenerateContext::system()
    }
}
