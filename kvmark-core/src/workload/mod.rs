//! Workload generation
//!
//! A workload is a named operation mix (the YCSB core workloads plus two fill
//! phases). Each worker thread runs the mix for a fixed number of iterations,
//! drawing keys and values from its own samplers.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod distributions;
pub mod mixes;
pub mod value;

pub use distributions::{
    DistributionConfig, DistributionKind, FixedSampler, LatestSampler, NormalSampler, Sampler,
    UniformSampler, ZipfianSampler,
};
pub use mixes::{MixSpec, ReadKind, WorkloadContext};
pub use value::ValueGenerator;

/// Supported workloads, in no particular order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// Sequential keys, 100% writes
    FillSeq,
    /// Uniform random keys, 100% writes
    FillRandom,
    /// Zipfian keys, 50% reads / 50% writes
    YcsbA,
    /// Zipfian keys, 95% reads / 5% writes
    YcsbB,
    /// Zipfian keys, 100% reads
    YcsbC,
    /// Latest keys, 95% reads / 5% writes
    YcsbD,
    /// Latest keys, 95% short scans / 5% writes
    YcsbE,
}

impl Workload {
    pub const ALL: [Workload; 7] = [
        Workload::FillSeq,
        Workload::FillRandom,
        Workload::YcsbA,
        Workload::YcsbB,
        Workload::YcsbC,
        Workload::YcsbD,
        Workload::YcsbE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::FillSeq => "fillseq",
            Workload::FillRandom => "fillrandom",
            Workload::YcsbA => "ycsba",
            Workload::YcsbB => "ycsbb",
            Workload::YcsbC => "ycsbc",
            Workload::YcsbD => "ycsbd",
            Workload::YcsbE => "ycsbe",
        }
    }

    /// Operation mix run by every worker of this workload
    pub fn mix(&self) -> MixSpec {
        MixSpec::for_workload(*self)
    }

    /// Parse a comma-separated workload list, skipping empty tokens
    pub fn parse_list(list: &str) -> anyhow::Result<Vec<Workload>> {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Workload::from_str)
            .collect()
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workload {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workload::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unsupported workload: {s}"))
    }
}

/// Decimal key index left-padded with zeros to `width` digits
///
/// Indices wider than `width` are written in full, never truncated.
pub fn padded_key(index: u64, width: usize) -> String {
    let mut key = String::with_capacity(width.max(20));
    write_padded_key(&mut key, index, width);
    key
}

/// Allocation-free variant of [`padded_key`] that overwrites `buf`
pub fn write_padded_key(buf: &mut String, index: u64, width: usize) {
    buf.clear();
    // Writing into a String cannot fail
    let _ = write!(buf, "{index:0width$}");
}
