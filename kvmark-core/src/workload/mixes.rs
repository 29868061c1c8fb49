//! Operation mixes and the per-worker benchmark loop

use serde::{Deserialize, Serialize};

use super::distributions::{DistributionConfig, DistributionKind, Sampler, UniformSampler};
use super::value::ValueGenerator;
use super::{write_padded_key, Workload};
use crate::config::BenchmarkConfig;
use crate::store::KvStore;
use crate::threading::ThreadState;
use crate::Result;

/// Longest range covered by a single scan
pub const MAX_SCAN_LENGTH: u64 = 100;

/// How a worker picks the key index for each iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPattern {
    /// Iteration index itself: 0, 1, .., num - 1
    Sequential,
    Uniform,
    Zipfian,
    /// Latest sampler at the default lambda of 1.0, which spreads draws
    /// evenly over the key space; ycsbd and ycsbe are not skewed toward
    /// recent keys.
    Latest,
}

impl KeyPattern {
    /// Sampler over `[0, num - 1]`; `None` for sequential keys
    pub fn sampler(&self, num: u64) -> anyhow::Result<Option<Box<dyn Sampler>>> {
        let kind = match self {
            KeyPattern::Sequential => return Ok(None),
            KeyPattern::Uniform => DistributionKind::Uniform,
            KeyPattern::Zipfian => DistributionKind::Zipfian,
            KeyPattern::Latest => DistributionKind::Latest,
        };
        let max = num.checked_sub(1).ok_or_else(|| anyhow::anyhow!("key space is empty"))?;
        Ok(Some(DistributionConfig::new(kind, 0, max).build()?))
    }
}

/// What the read share of a mix does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadKind {
    /// Point lookup of the drawn key
    Get,
    /// Range scan starting at the drawn key
    Scan,
}

/// Key pattern plus read/write split of one workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixSpec {
    pub keys: KeyPattern,
    /// Percentage of iterations that read; the rest write
    pub read_percent: u32,
    pub read_kind: ReadKind,
}

/// Shared, read-only inputs of every worker in a phase
#[derive(Clone, Copy)]
pub struct WorkloadContext<'a> {
    pub store: &'a dyn KvStore,
    pub config: &'a BenchmarkConfig,
}

impl MixSpec {
    pub const fn new(keys: KeyPattern, read_percent: u32, read_kind: ReadKind) -> Self {
        Self { keys, read_percent, read_kind }
    }

    pub fn for_workload(workload: Workload) -> Self {
        match workload {
            Workload::FillSeq => Self::new(KeyPattern::Sequential, 0, ReadKind::Get),
            Workload::FillRandom => Self::new(KeyPattern::Uniform, 0, ReadKind::Get),
            Workload::YcsbA => Self::new(KeyPattern::Zipfian, 50, ReadKind::Get),
            Workload::YcsbB => Self::new(KeyPattern::Zipfian, 95, ReadKind::Get),
            Workload::YcsbC => Self::new(KeyPattern::Zipfian, 100, ReadKind::Get),
            Workload::YcsbD => Self::new(KeyPattern::Latest, 95, ReadKind::Get),
            Workload::YcsbE => Self::new(KeyPattern::Latest, 95, ReadKind::Scan),
        }
    }

    /// Run `config.num` iterations of this mix on the calling thread
    ///
    /// The recorder in `state` is started before the first iteration and
    /// stopped after the last. Store failures never abort the loop: a failed
    /// read is recorded as not found, any other failed operation is still
    /// counted as completed.
    pub fn run(&self, ctx: WorkloadContext<'_>, state: &mut ThreadState) -> Result<()> {
        let config = ctx.config;
        let store = ctx.store;
        let width = config.key_size;

        let mut keys = self.keys.sampler(config.num)?;
        let mut decisions = UniformSampler::new(0, 99)?;
        let mut scan_lengths = match self.read_kind {
            ReadKind::Scan => Some(UniformSampler::new(1, MAX_SCAN_LENGTH)?),
            ReadKind::Get => None,
        };
        let mut values = ValueGenerator::from_config(&config.value_lengths())?;

        let mut key = String::with_capacity(width.max(20));
        let mut end_key = String::with_capacity(width.max(20));

        tracing::debug!(
            "Worker {} running {:?} keys, {}% {:?}",
            state.id,
            self.keys,
            self.read_percent,
            self.read_kind
        );

        state.stats.start();
        for i in 0..config.num {
            let index = match keys.as_mut() {
                Some(sampler) => sampler.generate(),
                None => i,
            };
            write_padded_key(&mut key, index, width);

            let read = match self.read_percent {
                0 => false,
                p if p >= 100 => true,
                p => decisions.generate() < u64::from(p),
            };

            if !read {
                let value = values.generate_sampled();
                if let Err(e) = store.put(key.as_bytes(), value) {
                    tracing::trace!("put {} failed: {}", key, e);
                }
                state.stats.finished_write_op((key.len() + value.len()) as u64);
                continue;
            }

            match scan_lengths.as_mut() {
                None => {
                    let found = match store.get(key.as_bytes()) {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::trace!("get {} failed: {}", key, e);
                            false
                        }
                    };
                    state.stats.finished_read_op(key.len() as u64, found);
                }
                Some(lengths) => {
                    let end = index.saturating_add(lengths.generate());
                    write_padded_key(&mut end_key, end, width);
                    if let Err(e) = store.scan(key.as_bytes(), end_key.as_bytes()) {
                        tracing::trace!("scan {}..{} failed: {}", key, end_key, e);
                    }
                    state.stats.finished_scan_op((key.len() + end_key.len()) as u64);
                }
            }
        }
        state.stats.stop();

        Ok(())
    }
}
