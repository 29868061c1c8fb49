//! Cross-thread aggregation (percentiles, throughput, CI)

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::recorder::{RecorderState, StatsRecorder};
use super::{LatencySummary, WorkloadSummary};
use crate::{Error, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Confidence level used for the latency mean interval
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Calculate percentile from ascending samples
///
/// Uses linear interpolation between the two order statistics around position
/// `percentile / 100 * (n - 1)`. `percentile` is between 0 and 100.
pub fn calculate_percentile(sorted_samples: &[f64], percentile: f64) -> f64 {
    if sorted_samples.is_empty() {
        return 0.0;
    }

    let n = sorted_samples.len();
    if percentile <= 0.0 {
        return sorted_samples[0];
    }
    if percentile >= 100.0 {
        return sorted_samples[n - 1];
    }

    let rank = percentile / 100.0 * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        return sorted_samples[lower_idx];
    }

    let lower = sorted_samples[lower_idx];
    let upper = sorted_samples[upper_idx];
    lower + (upper - lower) * (rank - lower_idx as f64)
}

fn calculate_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
fn calculate_std_dev(samples: &[f64], mean: f64) -> f64 {
    if samples.len() <= 1 {
        return 0.0;
    }
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
        / (samples.len() - 1) as f64;
    variance.sqrt()
}

/// Half-width of the Student's t confidence interval of the mean
fn calculate_confidence_interval(n: usize, std_dev: f64, confidence_level: f64) -> f64 {
    if n <= 1 {
        return 0.0;
    }

    let t_dist = match StudentsT::new(0.0, 1.0, (n - 1) as f64) {
        Ok(dist) => dist,
        Err(_) => return 0.0,
    };

    // Two-tailed: 95% confidence needs the 97.5th percentile
    let alpha = 1.0 - confidence_level;
    let t_critical = match t_dist.inverse_cdf(1.0 - alpha / 2.0) {
        val if val.is_finite() => val,
        _ => return 0.0,
    };

    (t_critical * std_dev / (n as f64).sqrt()).abs()
}

/// Merges the recorders of one workload phase
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    name: String,
    threads: usize,
    throughput_ops: Vec<f64>,
    throughput_mb: Vec<f64>,
    latencies_us: Vec<f64>,
    reads: u64,
    found: u64,
    writes: u64,
    deletes: u64,
    scans: u64,
    bytes: u64,
}

impl StatsAggregator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threads: 0,
            throughput_ops: Vec::new(),
            throughput_mb: Vec::new(),
            latencies_us: Vec::new(),
            reads: 0,
            found: 0,
            writes: 0,
            deletes: 0,
            scans: 0,
            bytes: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fold one stopped recorder into the aggregate
    ///
    /// Throughput is computed against the recorder's own elapsed time, not the
    /// wall-clock span of the phase.
    pub fn merge(&mut self, recorder: StatsRecorder) -> Result<()> {
        if recorder.state() != RecorderState::Stopped {
            return Err(Error::Stats(format!(
                "cannot merge a {:?} recorder into '{}'",
                recorder.state(),
                self.name
            )));
        }

        let elapsed = if recorder.seconds() > 0.0 { recorder.seconds() } else { 1.0 };
        self.throughput_ops.push(recorder.ops() as f64 / elapsed);
        if recorder.bytes() > 0 {
            self.throughput_mb.push(recorder.bytes() as f64 / BYTES_PER_MB / elapsed);
        }

        self.threads += 1;
        self.reads += recorder.reads();
        self.found += recorder.found();
        self.writes += recorder.writes();
        self.deletes += recorder.deletes();
        self.scans += recorder.scans();
        self.bytes += recorder.bytes();
        self.latencies_us
            .extend(recorder.into_latencies().into_iter().map(|d| d.as_secs_f64() * 1e6));
        Ok(())
    }

    /// Latency samples of every merged recorder, in microseconds
    pub fn latencies_us(&self) -> &[f64] {
        &self.latencies_us
    }

    pub fn throughput_samples(&self) -> &[f64] {
        &self.throughput_ops
    }

    /// Consume the aggregator and compute the final report
    pub fn finalize(self) -> WorkloadSummary {
        let mut sorted = self.latencies_us;
        sorted.sort_by(f64::total_cmp);

        let mean = calculate_mean(&sorted);
        let std_dev = calculate_std_dev(&sorted, mean);

        let latency = LatencySummary {
            samples: sorted.len(),
            min_us: sorted.first().copied().unwrap_or(0.0),
            max_us: sorted.last().copied().unwrap_or(0.0),
            mean_us: mean,
            median_us: calculate_percentile(&sorted, 50.0),
            p90_us: calculate_percentile(&sorted, 90.0),
            p99_us: calculate_percentile(&sorted, 99.0),
            std_dev_us: std_dev,
            confidence_interval_us: calculate_confidence_interval(
                sorted.len(),
                std_dev,
                CONFIDENCE_LEVEL,
            ),
        };

        WorkloadSummary {
            workload: self.name,
            threads: self.threads,
            reads: self.reads,
            found: self.found,
            writes: self.writes,
            deletes: self.deletes,
            scans: self.scans,
            bytes: self.bytes,
            ops_per_sec: calculate_mean(&self.throughput_ops),
            mb_per_sec: calculate_mean(&self.throughput_mb),
            latency,
        }
    }
}
