//! Results output formatting

use std::io::{self, Write};

use anyhow::Result;
use kvmark_core::{BenchmarkConfig, WorkloadSummary};
use serde::{Deserialize, Serialize};

/// How results are printed to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One block per workload, db_bench style
    #[default]
    Human,
    /// Pretty-printed JSON document
    Json,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub adapter: String,
    pub config: BenchmarkConfig,
    pub workloads: Vec<WorkloadSummary>,
}

impl BenchmarkReport {
    pub fn new(
        adapter: impl Into<String>,
        config: BenchmarkConfig,
        workloads: Vec<WorkloadSummary>,
    ) -> Self {
        Self { adapter: adapter.into(), config, workloads }
    }

    pub fn write<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        match format {
            OutputFormat::Human => self.write_human(out)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Print to stdout
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write(format, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn write_human<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let c = &self.config;
        writeln!(out, "Adapter:    {}", self.adapter)?;
        writeln!(out, "Keys:       {} ({} digits)", c.num, c.key_size)?;
        writeln!(out, "Values:     up to {} bytes ({})", c.value_size, c.distribution)?;
        writeln!(out, "Threads:    {}", c.threads)?;
        writeln!(out, "------------------------------------------------")?;

        for summary in &self.workloads {
            write_summary(out, summary)?;
        }
        Ok(())
    }
}

fn write_summary<W: Write>(out: &mut W, s: &WorkloadSummary) -> io::Result<()> {
    let lat = &s.latency;
    write!(
        out,
        "{:<12} : {:>10.3} micros/op; {:>10.0} ops/sec",
        s.workload, lat.mean_us, s.ops_per_sec
    )?;
    if s.mb_per_sec > 0.0 {
        write!(out, "; {:>8.1} MB/s", s.mb_per_sec)?;
    }
    writeln!(out)?;

    write!(out, "    ops {} over {} thread(s):", s.total_ops(), s.threads)?;
    if s.reads > 0 {
        write!(out, " reads {} ({} found)", s.reads, s.found)?;
    }
    if s.writes > 0 {
        write!(out, " writes {}", s.writes)?;
    }
    if s.deletes > 0 {
        write!(out, " deletes {}", s.deletes)?;
    }
    if s.scans > 0 {
        write!(out, " scans {}", s.scans)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "    latency (us): median {:.2}  p90 {:.2}  p99 {:.2}  min {:.2}  max {:.2}",
        lat.median_us, lat.p90_us, lat.p99_us, lat.min_us, lat.max_us
    )?;
    writeln!(
        out,
        "    mean {:.2} ± {:.2} (95% CI), stddev {:.2}",
        lat.mean_us, lat.confidence_interval_us, lat.std_dev_us
    )
}
