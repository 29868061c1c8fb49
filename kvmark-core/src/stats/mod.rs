//! Statistics collection and analysis

use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod recorder;

// Re-export main types
pub use aggregator::{calculate_percentile, StatsAggregator, CONFIDENCE_LEVEL};
pub use recorder::{RecorderState, StatsRecorder};

/// Latency distribution of one workload phase, in microseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub min_us: f64,
    pub max_us: f64,
    pub mean_us: f64,
    pub median_us: f64,
    pub p90_us: f64,
    pub p99_us: f64,
    pub std_dev_us: f64,
    /// Half-width of the 95% confidence interval of the mean
    pub confidence_interval_us: f64,
}

/// Final report of one workload phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub workload: String,
    pub threads: usize,
    pub reads: u64,
    pub found: u64,
    pub writes: u64,
    pub deletes: u64,
    pub scans: u64,
    pub bytes: u64,
    /// Mean of the per-thread ops/sec samples
    pub ops_per_sec: f64,
    /// Mean of the per-thread MB/sec samples
    pub mb_per_sec: f64,
    pub latency: LatencySummary,
}

impl WorkloadSummary {
    pub fn total_ops(&self) -> u64 {
        self.reads + self.writes + self.deletes + self.scans
    }

    /// Reads that reported a miss
    pub fn not_found(&self) -> u64 {
        self.reads - self.found
    }
}
