//! Value payload generation
//!
//! Filling every value with fresh random bytes would put the RNG on the hot
//! path of each write. Instead a [`ValueGenerator`] fills one pool of printable
//! ASCII up front and hands out windows of it through a rolling cursor.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::distributions::{DistributionConfig, Sampler};

/// Minimum size of the pregenerated pool
pub const MIN_POOL_SIZE: usize = 1024 * 1024;

/// Lowest byte written into the pool (space)
pub const PRINTABLE_MIN: u8 = 32;
/// Highest byte written into the pool (`~`)
pub const PRINTABLE_MAX: u8 = 126;

pub struct ValueGenerator {
    pool: Vec<u8>,
    cursor: usize,
    max_len: usize,
    lengths: Option<Box<dyn Sampler>>,
}

impl ValueGenerator {
    /// Generator for fixed-length use: [`ValueGenerator::generate_sampled`]
    /// always yields `max_len` bytes
    pub fn fixed(max_len: usize) -> Self {
        Self::with_seed(max_len, None, None)
    }

    /// Generator whose lengths are drawn from `lengths`
    ///
    /// The pool is sized for the sampler's upper bound.
    pub fn with_lengths(lengths: Box<dyn Sampler>) -> Self {
        let (_, max) = lengths.bounds();
        Self::with_seed(max as usize, Some(lengths), None)
    }

    /// Build the length sampler from `config` and wrap it
    pub fn from_config(config: &DistributionConfig) -> anyhow::Result<Self> {
        Ok(Self::with_lengths(config.build()?))
    }

    /// Create a generator with an explicit pool seed (None = use entropy)
    pub fn with_seed(max_len: usize, lengths: Option<Box<dyn Sampler>>, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        let size = max_len.max(MIN_POOL_SIZE);
        let pool = (0..size).map(|_| rng.random_range(PRINTABLE_MIN..=PRINTABLE_MAX)).collect();
        Self { pool, cursor: 0, max_len, lengths }
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Return the next `len` bytes of the pool
    ///
    /// # Panics
    /// Panics if `len` exceeds the pool size.
    pub fn generate(&mut self, len: usize) -> &[u8] {
        assert!(
            len <= self.pool.len(),
            "requested value of {} bytes exceeds pool of {} bytes",
            len,
            self.pool.len()
        );
        if self.cursor + len > self.pool.len() {
            self.cursor = 0;
        }
        let start = self.cursor;
        self.cursor += len;
        &self.pool[start..start + len]
    }

    /// Draw a length from the configured distribution and return that many bytes
    pub fn generate_sampled(&mut self) -> &[u8] {
        let len = match self.lengths.as_mut() {
            Some(sampler) => sampler.generate() as usize,
            None => self.max_len,
        };
        self.generate(len)
    }
}
