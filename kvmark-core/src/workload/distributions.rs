//! Statistical distributions for workload generation
//!
//! Every sampler produces integers in an inclusive `[min, max]` range and owns
//! its own random number generator, so samplers can be moved into worker
//! threads without any shared state. Used by:
//! - Key selection (Zipfian for hot keys, Latest for recency-biased reads)
//! - Value length variation (Uniform, Normal, Zipfian)
//! - Scan lengths (Uniform)

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as RandDistribution, Exp, Normal, Uniform};
use serde::{Deserialize, Serialize};

/// Default skew for [`ZipfianSampler`]
pub const DEFAULT_ZIPFIAN_EXPONENT: f64 = 1.2;

/// Default rate for [`LatestSampler`]
pub const DEFAULT_LATEST_LAMBDA: f64 = 1.0;

/// Trait for all integer samplers
pub trait Sampler: Send {
    /// Draw the next value, always within [`Sampler::bounds`]
    fn generate(&mut self) -> u64;

    /// Inclusive `(min, max)` range of this sampler
    fn bounds(&self) -> (u64, u64);

    /// Get distribution name
    fn name(&self) -> &'static str;
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    }
}

fn check_bounds(kind: &str, min: u64, max: u64) -> anyhow::Result<()> {
    if min > max {
        anyhow::bail!("{kind} min ({min}) must be <= max ({max})");
    }
    Ok(())
}

/// Distribution family selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Fixed,
    Uniform,
    Normal,
    Zipfian,
    Latest,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 5] = [
        DistributionKind::Fixed,
        DistributionKind::Uniform,
        DistributionKind::Normal,
        DistributionKind::Zipfian,
        DistributionKind::Latest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Fixed => "fixed",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Normal => "normal",
            DistributionKind::Zipfian => "zipfian",
            DistributionKind::Latest => "latest",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistributionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown distribution: {s}"))
    }
}

/// Parameters for building a [`Sampler`]
///
/// `param` is the Zipfian exponent or the Latest lambda; other kinds ignore it.
/// A `Fixed` sampler always yields `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub kind: DistributionKind,
    pub min: u64,
    pub max: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<f64>,
}

impl DistributionConfig {
    pub fn new(kind: DistributionKind, min: u64, max: u64) -> Self {
        Self { kind, min, max, param: None }
    }

    pub fn with_param(mut self, param: f64) -> Self {
        self.param = Some(param);
        self
    }

    /// Build a sampler seeded from OS entropy
    pub fn build(&self) -> anyhow::Result<Box<dyn Sampler>> {
        self.build_with_seed(None)
    }

    /// Build a sampler with an explicit seed (None = use entropy)
    pub fn build_with_seed(&self, seed: Option<u64>) -> anyhow::Result<Box<dyn Sampler>> {
        check_bounds(self.kind.as_str(), self.min, self.max)?;
        let sampler: Box<dyn Sampler> = match self.kind {
            DistributionKind::Fixed => Box::new(FixedSampler::new(self.max)),
            DistributionKind::Uniform => {
                Box::new(UniformSampler::with_seed(self.min, self.max, seed)?)
            }
            DistributionKind::Normal => {
                Box::new(NormalSampler::with_seed(self.min, self.max, seed)?)
            }
            DistributionKind::Zipfian => Box::new(ZipfianSampler::with_seed(
                self.min,
                self.max,
                self.param.unwrap_or(DEFAULT_ZIPFIAN_EXPONENT),
                seed,
            )?),
            DistributionKind::Latest => Box::new(LatestSampler::with_seed(
                self.min,
                self.max,
                self.param.unwrap_or(DEFAULT_LATEST_LAMBDA),
                seed,
            )?),
        };
        Ok(sampler)
    }
}

/// Fixed value - always returns the same number
#[derive(Debug, Clone)]
pub struct FixedSampler {
    value: u64,
}

impl FixedSampler {
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

impl Sampler for FixedSampler {
    fn generate(&mut self) -> u64 {
        self.value
    }

    fn bounds(&self) -> (u64, u64) {
        (self.value, self.value)
    }

    fn name(&self) -> &'static str {
        "Fixed"
    }
}

/// Uniform distribution (all values in `[min, max]` equally likely)
pub struct UniformSampler {
    min: u64,
    max: u64,
    rng: SmallRng,
    dist: Uniform<u64>,
}

impl UniformSampler {
    /// Create a new uniform sampler with entropy-based seed
    pub fn new(min: u64, max: u64) -> anyhow::Result<Self> {
        Self::with_seed(min, max, None)
    }

    /// Create a new uniform sampler with explicit seed
    ///
    /// # Returns
    /// Error if min > max
    pub fn with_seed(min: u64, max: u64, seed: Option<u64>) -> anyhow::Result<Self> {
        check_bounds("Uniform", min, max)?;
        let dist = Uniform::new_inclusive(min, max)?;
        Ok(Self { min, max, rng: make_rng(seed), dist })
    }
}

impl Sampler for UniformSampler {
    fn generate(&mut self) -> u64 {
        self.dist.sample(&mut self.rng)
    }

    fn bounds(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    fn name(&self) -> &'static str {
        "Uniform"
    }
}

/// Normal (Gaussian) distribution centred in the range
///
/// The mean sits halfway between the bounds and the standard deviation is a
/// sixth of the range, so about 99.7% of raw draws already fall inside it.
/// Draws are rounded and clamped to `[min, max]`.
#[derive(Debug)]
pub struct NormalSampler {
    min: u64,
    max: u64,
    rng: SmallRng,
    dist: Normal<f64>,
}

impl NormalSampler {
    pub fn new(min: u64, max: u64) -> anyhow::Result<Self> {
        Self::with_seed(min, max, None)
    }

    pub fn with_seed(min: u64, max: u64, seed: Option<u64>) -> anyhow::Result<Self> {
        check_bounds("Normal", min, max)?;
        let mean = (min as f64 + max as f64) / 2.0;
        let std_dev = (max - min) as f64 / 6.0;
        let dist = Normal::new(mean, std_dev)?;
        Ok(Self { min, max, rng: make_rng(seed), dist })
    }

    pub fn mean(&self) -> f64 {
        self.dist.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.dist.std_dev()
    }
}

impl Sampler for NormalSampler {
    fn generate(&mut self) -> u64 {
        let sample = self.dist.sample(&mut self.rng).round();
        sample.clamp(self.min as f64, self.max as f64) as u64
    }

    fn bounds(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    fn name(&self) -> &'static str {
        "Normal"
    }
}

/// Zipfian distribution (power law, hot-key pattern)
///
/// The value `min + i` has weight `(i + 1)^-s`. Construction builds the full
/// cumulative distribution over the range once, so memory and setup time are
/// linear in `max - min`; each draw is a binary search.
/// - s = 0.0: Uniform distribution
/// - s = 0.99: Typical database workload (YCSB default)
/// - s > 1.0: More skewed toward `min`
#[derive(Debug)]
pub struct ZipfianSampler {
    min: u64,
    exponent: f64,
    rng: SmallRng,
    cdf: Vec<f64>,
}

impl ZipfianSampler {
    pub fn new(min: u64, max: u64, exponent: f64) -> anyhow::Result<Self> {
        Self::with_seed(min, max, exponent, None)
    }

    /// # Returns
    /// Error if min > max, the exponent is negative or not finite, or the
    /// range does not fit in memory addressing
    pub fn with_seed(min: u64, max: u64, exponent: f64, seed: Option<u64>) -> anyhow::Result<Self> {
        check_bounds("Zipfian", min, max)?;
        if !exponent.is_finite() || exponent < 0.0 {
            anyhow::bail!("Zipfian exponent must be a finite value >= 0.0, got {exponent}");
        }
        let len = (max - min)
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| anyhow::anyhow!("Zipfian range [{min}, {max}] is too large"))?;

        let mut cdf = Vec::with_capacity(len);
        let mut total = 0.0;
        for rank in 1..=len {
            total += (rank as f64).powf(-exponent);
            cdf.push(total);
        }
        for entry in &mut cdf {
            *entry /= total;
        }

        Ok(Self { min, exponent, rng: make_rng(seed), cdf })
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Map a uniform draw in `[0, 1)` to a value of the range
    fn value_for(&self, u: f64) -> u64 {
        let idx = self.cdf.partition_point(|&c| c < u).min(self.cdf.len() - 1);
        self.min + idx as u64
    }
}

impl Sampler for ZipfianSampler {
    fn generate(&mut self) -> u64 {
        let u: f64 = self.rng.random();
        self.value_for(u)
    }

    fn bounds(&self) -> (u64, u64) {
        (self.min, self.min + (self.cdf.len() as u64 - 1))
    }

    fn name(&self) -> &'static str {
        "Zipfian"
    }
}

/// Recency-biased distribution favouring `max`
///
/// Draws `x ~ Exp(lambda)` and maps `u = e^-x` (in `(0, 1]`) to
/// `max - floor(u * (max - min))`. Used for read-latest workloads where
/// the highest key index stands for the most recent insert.
///
/// `u` follows `P(u <= t) = t^lambda`: lambda = 1 spreads draws evenly over the
/// range, lambda < 1 pushes them toward `max`.
pub struct LatestSampler {
    min: u64,
    max: u64,
    lambda: f64,
    rng: SmallRng,
    dist: Exp<f64>,
}

impl LatestSampler {
    pub fn new(min: u64, max: u64, lambda: f64) -> anyhow::Result<Self> {
        Self::with_seed(min, max, lambda, None)
    }

    /// # Returns
    /// Error if min > max or lambda <= 0
    pub fn with_seed(min: u64, max: u64, lambda: f64, seed: Option<u64>) -> anyhow::Result<Self> {
        check_bounds("Latest", min, max)?;
        if lambda.is_nan() || lambda <= 0.0 {
            anyhow::bail!("Latest lambda must be > 0, got {lambda}");
        }
        let dist = Exp::new(lambda)?;
        Ok(Self { min, max, lambda, rng: make_rng(seed), dist })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn value_for(&self, x: f64) -> u64 {
        let span = self.max - self.min;
        let u = (-x).exp();
        let offset = (u * span as f64).floor() as u64;
        self.max - offset.min(span)
    }
}

impl Sampler for LatestSampler {
    fn generate(&mut self) -> u64 {
        let x = self.dist.sample(&mut self.rng);
        self.value_for(x)
    }

    fn bounds(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    fn name(&self) -> &'static str {
        "Latest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_bounds(sampler: &mut dyn Sampler, draws: usize) {
        let (min, max) = sampler.bounds();
        for _ in 0..draws {
            let v = sampler.generate();
            assert!(
                (min..=max).contains(&v),
                "{} produced {} outside [{}, {}]",
                sampler.name(),
                v,
                min,
                max
            );
        }
    }

    #[test]
    fn test_fixed_always_same() {
        let mut sampler = FixedSampler::new(42);
        for _ in 0..1000 {
            assert_eq!(sampler.generate(), 42);
        }
    }

    #[test]
    fn test_all_kinds_stay_in_bounds() {
        for kind in DistributionKind::ALL {
            let mut sampler = DistributionConfig::new(kind, 10, 500).build().unwrap();
            assert_in_bounds(sampler.as_mut(), 10_000);
        }
    }

    #[test]
    fn test_degenerate_range() {
        for kind in DistributionKind::ALL {
            let mut sampler = DistributionConfig::new(kind, 7, 7).build().unwrap();
            for _ in 0..100 {
                assert_eq!(sampler.generate(), 7, "{kind} with min == max");
            }
        }
    }

    #[test]
    fn test_min_greater_than_max_rejected() {
        for kind in DistributionKind::ALL {
            assert!(DistributionConfig::new(kind, 10, 5).build().is_err(), "{kind}");
        }
    }

    #[test]
    fn test_uniform_covers_range() {
        let mut sampler = UniformSampler::with_seed(0, 9, Some(7)).unwrap();
        let mut seen = [false; 10];
        for _ in 0..1000 {
            seen[sampler.generate() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "Uniform should hit both endpoints: {:?}", seen);
    }

    #[test]
    fn test_normal_parameters() {
        let sampler = NormalSampler::new(100, 700).unwrap();
        assert_eq!(sampler.mean(), 400.0);
        assert_eq!(sampler.std_dev(), 100.0);
    }

    #[test]
    fn test_normal_mean() {
        let mut sampler = NormalSampler::with_seed(0, 1000, Some(3)).unwrap();
        let samples: Vec<u64> = (0..10_000).map(|_| sampler.generate()).collect();
        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        assert!((mean - 500.0).abs() < 10.0, "Mean {} not close to 500", mean);
    }

    #[test]
    fn test_zipfian_skew() {
        let mut sampler = ZipfianSampler::with_seed(0, 99, 1.2, Some(11)).unwrap();
        let mut counts = [0u32; 100];
        for _ in 0..100_000 {
            counts[sampler.generate() as usize] += 1;
        }
        assert!(
            counts[0] > counts[99] * 10,
            "min hits {} should dwarf max hits {}",
            counts[0],
            counts[99]
        );
        let max_count = counts.iter().max().copied().unwrap_or_default();
        assert_eq!(counts[0], max_count, "Lowest value should be most frequent");
    }

    #[test]
    fn test_zipfian_offset_range() {
        let mut sampler = ZipfianSampler::new(1000, 1009, DEFAULT_ZIPFIAN_EXPONENT).unwrap();
        assert_eq!(sampler.bounds(), (1000, 1009));
        assert_in_bounds(&mut sampler, 10_000);
    }

    #[test]
    fn test_zipfian_cdf_lookup_edges() {
        let sampler = ZipfianSampler::new(5, 14, 1.0).unwrap();
        assert_eq!(sampler.value_for(0.0), 5);
        assert_eq!(sampler.value_for(0.999_999_999), 14);
        assert_eq!(sampler.value_for(1.0), 14);
    }

    #[test]
    fn test_zipfian_parameter_validation() {
        assert!(ZipfianSampler::new(0, 10, -0.5).is_err());
        assert!(ZipfianSampler::new(0, 10, f64::NAN).is_err());
        assert!(ZipfianSampler::new(0, u64::MAX, 1.0).is_err());
        assert!(ZipfianSampler::new(0, 10, 0.0).is_ok());
    }

    #[test]
    fn test_latest_biased_to_max() {
        // P(upper half) = 0.5^0.25, roughly 0.84
        let mut sampler = LatestSampler::with_seed(0, 999, 0.25, Some(5)).unwrap();
        let samples: Vec<u64> = (0..10_000).map(|_| sampler.generate()).collect();
        let upper_half = samples.iter().filter(|&&v| v >= 500).count();
        assert!(upper_half > 7_500, "Only {} of 10000 draws in upper half", upper_half);
    }

    #[test]
    fn test_latest_unit_lambda_is_flat() {
        let mut sampler = LatestSampler::with_seed(0, 1000, 1.0, Some(9)).unwrap();
        let samples: Vec<u64> = (0..10_000).map(|_| sampler.generate()).collect();
        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        assert!((mean - 500.0).abs() < 25.0, "Mean {} not close to 500", mean);
    }

    #[test]
    fn test_latest_mapping() {
        let sampler = LatestSampler::new(10, 110, 1.0).unwrap();
        // x = 0 gives u = 1, the far end of the range
        assert_eq!(sampler.value_for(0.0), 10);
        assert_eq!(sampler.value_for(f64::INFINITY), 110);
        let mid = sampler.value_for(2.0f64.ln());
        assert!((59..=61).contains(&mid), "u = 0.5 mapped to {}", mid);
    }

    #[test]
    fn test_latest_lambda_validation() {
        assert!(LatestSampler::new(0, 10, 0.0).is_err());
        assert!(LatestSampler::new(0, 10, -1.0).is_err());
        assert!(LatestSampler::new(0, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_seeded_samplers_repeat() {
        let config = DistributionConfig::new(DistributionKind::Zipfian, 0, 1000).with_param(0.99);
        let mut a = config.build_with_seed(Some(42)).unwrap();
        let mut b = config.build_with_seed(Some(42)).unwrap();
        for _ in 0..100 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in DistributionKind::ALL {
            assert_eq!(kind.as_str().parse::<DistributionKind>().unwrap(), kind);
        }
        assert!("pareto".parse::<DistributionKind>().is_err());
    }
}
