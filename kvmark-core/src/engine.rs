//! Workload engine: owns the store and drives each phase

use std::time::Instant;

use crate::config::BenchmarkConfig;
use crate::options::Options;
use crate::stats::{StatsAggregator, WorkloadSummary};
use crate::store::KvStore;
use crate::threading::{ThreadState, ThreadingRuntime};
use crate::workload::{Workload, WorkloadContext};
use crate::{Error, Result};

/// Upper bound on the latency buffer reserved per worker up front
const MAX_PRESIZED_SAMPLES: u64 = 1 << 20;

pub struct WorkloadEngine {
    store: Box<dyn KvStore>,
    config: BenchmarkConfig,
}

impl std::fmt::Debug for WorkloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadEngine")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}

impl WorkloadEngine {
    /// Validate options and initialize the store
    ///
    /// Global options are parsed first; the store is only initialized once
    /// they are known to be valid.
    pub fn setup(mut store: Box<dyn KvStore>, options: &Options) -> Result<Self> {
        let config = BenchmarkConfig::from_options(&options.global_options())?;

        let adapter_options = options.adapter_options();
        tracing::debug!(
            "Initializing adapter '{}' with {} option(s)",
            store.name(),
            adapter_options.len()
        );
        if let Err(e) = store.init(&adapter_options) {
            tracing::warn!("Adapter '{}' failed to initialize: {}", store.name(), e);
            return Err(Error::Adapter(e));
        }

        tracing::info!(
            "Configured {}: num={}, threads={}, key_size={}, value_size={} ({})",
            store.name(),
            config.num,
            config.threads,
            config.key_size,
            config.value_size,
            config.distribution
        );

        Ok(Self { store, config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// Run every configured workload in order, one report per workload
    ///
    /// A phase starts only after all workers of the previous phase have been
    /// joined.
    pub fn run(&self) -> Result<Vec<WorkloadSummary>> {
        let mut summaries = Vec::with_capacity(self.config.workloads.len());
        for &workload in &self.config.workloads {
            summaries.push(self.run_workload(workload)?);
        }

        for summary in &summaries {
            tracing::info!(
                "{}: {} ops over {} thread(s), avg {:.2}us, median {:.2}us, p90 {:.2}us, p99 {:.2}us",
                summary.workload,
                summary.total_ops(),
                summary.threads,
                summary.latency.mean_us,
                summary.latency.median_us,
                summary.latency.p90_us,
                summary.latency.p99_us
            );
        }
        Ok(summaries)
    }

    /// Run a single workload phase with `threads` workers
    pub fn run_workload(&self, workload: Workload) -> Result<WorkloadSummary> {
        let mix = workload.mix();
        let ctx = WorkloadContext { store: self.store.as_ref(), config: &self.config };
        let capacity = self.config.num.min(MAX_PRESIZED_SAMPLES) as usize;

        tracing::info!("Starting {} with {} thread(s)", workload, self.config.threads);
        let started = Instant::now();

        let runtime = ThreadingRuntime::new(self.config.threads);
        let recorders = runtime.run_workers(|thread_id| {
            let mut state = ThreadState::with_capacity(thread_id, capacity);
            mix.run(ctx, &mut state)?;
            Ok(state.stats)
        })?;

        let mut aggregator = StatsAggregator::new(workload.as_str());
        for recorder in recorders {
            aggregator.merge(recorder)?;
        }
        let summary = aggregator.finalize();

        tracing::info!(
            "Finished {} in {:.3}s: {} ops, {:.0} ops/sec, p99 {:.2}us",
            workload,
            started.elapsed().as_secs_f64(),
            summary.total_ops(),
            summary.ops_per_sec,
            summary.latency.p99_us
        );

        Ok(summary)
    }
}
