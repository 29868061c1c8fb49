//! kvmark core library
//!
//! Workload-driven benchmarking of key-value stores: distribution samplers,
//! value generation, the YCSB-style operation mixes, per-thread statistics and
//! the engine that runs workload phases against a [`KvStore`].

pub mod config;
pub mod engine;
pub mod error;
pub mod options;
pub mod stats;
pub mod store;
pub mod threading;
pub mod workload;

pub use config::{BenchmarkConfig, ValueSizeDistribution};
pub use engine::WorkloadEngine;
pub use error::{Error, Result};
pub use options::Options;
pub use stats::{LatencySummary, StatsAggregator, StatsRecorder, WorkloadSummary};
pub use store::{AdapterOptions, KvStore, StoreError, StoreResult};
pub use workload::Workload;
