//! Seeded random source
//!
//! Forecasts draw from a ChaCha8 stream seeded by hashing
//! `learner id | calendar date | lessons per day`. Repeated calls on the same
//! day with the same pace replay the same stream; a new day or a new pace
//! produces a new one.

use chrono::NaiveDate;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Uniform samples in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

pub struct SeededRandom {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn for_forecast(learner_id: &str, date: NaiveDate, lessons_per_day: u32) -> Self {
        Self::from_seed(forecast_seed(learner_id, date, lessons_per_day))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        // Standard f64 sampling is half-open [0, 1)
        self.rng.gen::<f64>()
    }
}

/// Stable 64-bit seed for a (learner, day, pace) combination
pub fn forecast_seed(learner_id: &str, date: NaiveDate, lessons_per_day: u32) -> u64 {
    let key = format!("{learner_id}|{}|{lessons_per_day}", date.format("%Y-%m-%d"));
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
