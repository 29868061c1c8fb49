//! Benchmark configuration
//!
//! Global options arrive as untyped strings; [`BenchmarkConfig::from_options`]
//! is the only place they are interpreted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::workload::{DistributionConfig, DistributionKind, Workload};
use crate::{Error, Result};

/// Global option keys understood by the engine
pub const GLOBAL_OPTION_KEYS: [&str; 6] =
    ["num", "key_size", "value_size", "threads", "workload", "distribution"];

/// Distribution of value lengths written by the fill and update operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSizeDistribution {
    /// Every value is exactly `value_size` bytes
    Fixed,
    #[default]
    Uniform,
    Normal,
    Zipfian,
}

impl ValueSizeDistribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSizeDistribution::Fixed => "fixed",
            ValueSizeDistribution::Uniform => "uniform",
            ValueSizeDistribution::Normal => "normal",
            ValueSizeDistribution::Zipfian => "zipfian",
        }
    }

    /// Sampler parameters for lengths in `[1, value_size]`
    pub fn lengths(&self, value_size: usize) -> DistributionConfig {
        let kind = match self {
            ValueSizeDistribution::Fixed => DistributionKind::Fixed,
            ValueSizeDistribution::Uniform => DistributionKind::Uniform,
            ValueSizeDistribution::Normal => DistributionKind::Normal,
            ValueSizeDistribution::Zipfian => DistributionKind::Zipfian,
        };
        DistributionConfig::new(kind, 1, value_size as u64)
    }
}

impl fmt::Display for ValueSizeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueSizeDistribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fixed" => Ok(ValueSizeDistribution::Fixed),
            "uniform" => Ok(ValueSizeDistribution::Uniform),
            "normal" => Ok(ValueSizeDistribution::Normal),
            "zipfian" => Ok(ValueSizeDistribution::Zipfian),
            other => Err(Error::Config(format!(
                "Unknown distribution: {other}. Supported: fixed, uniform, normal, zipfian"
            ))),
        }
    }
}

/// Validated engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Iterations per worker, and the size of the key space
    pub num: u64,
    /// Minimum key width in digits
    pub key_size: usize,
    /// Maximum value length in bytes
    pub value_size: usize,
    /// Worker threads per workload
    pub threads: usize,
    pub distribution: ValueSizeDistribution,
    /// Workloads in execution order
    pub workloads: Vec<Workload>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            num: 1000,
            key_size: 16,
            value_size: 1000,
            threads: 1,
            distribution: ValueSizeDistribution::Uniform,
            workloads: vec![Workload::FillSeq],
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {key}: '{value}'")))
}

impl BenchmarkConfig {
    /// Build a configuration from global options, starting from the defaults
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self> {
        let mut config = BenchmarkConfig::default();

        for (key, value) in options {
            match key.as_str() {
                "num" => config.num = parse_number(key, value)?,
                "key_size" => config.key_size = parse_number(key, value)?,
                "value_size" => config.value_size = parse_number(key, value)?,
                "threads" => config.threads = parse_number(key, value)?,
                "workload" => {
                    config.workloads = Workload::parse_list(value)
                        .map_err(|e| Error::Config(e.to_string()))?;
                }
                "distribution" => config.distribution = value.trim().parse()?,
                other => {
                    return Err(Error::Config(format!(
                        "Unknown option: {other}. Supported: {}",
                        GLOBAL_OPTION_KEYS.join(", ")
                    )))
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num == 0 {
            return Err(Error::Config("num must be > 0".to_string()));
        }
        if self.threads == 0 {
            return Err(Error::Config("threads must be > 0".to_string()));
        }
        if self.value_size == 0 {
            return Err(Error::Config("value_size must be > 0".to_string()));
        }
        if self.workloads.is_empty() {
            return Err(Error::Config("workload list is empty".to_string()));
        }
        Ok(())
    }

    /// Sampler parameters for value lengths
    pub fn value_lengths(&self) -> DistributionConfig {
        self.distribution.lengths(self.value_size)
    }
}
