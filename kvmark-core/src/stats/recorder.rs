//! Per-worker statistics recording

use std::time::{Duration, Instant};

/// Lifecycle of a [`StatsRecorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Running,
    Stopped,
}

/// Statistics recorder (thread-local)
///
/// Each operation's latency is the time elapsed since the previous recorded
/// operation, or since [`StatsRecorder::start`] for the first one, so the
/// samples cover the whole worker loop including key and value generation.
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    state: RecorderState,
    started: Option<Instant>,
    last_op: Option<Instant>,
    finished: Option<Instant>,
    reads: u64,
    found: u64,
    writes: u64,
    deletes: u64,
    scans: u64,
    bytes: u64,
    seconds: f64,
    latencies: Vec<Duration>,
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            started: None,
            last_op: None,
            finished: None,
            reads: 0,
            found: 0,
            writes: 0,
            deletes: 0,
            scans: 0,
            bytes: 0,
            seconds: 0.0,
            latencies: Vec::new(),
        }
    }

    /// Recorder sized for `ops` operations, avoiding reallocation in the hot loop
    pub fn with_capacity(ops: usize) -> Self {
        let mut recorder = Self::new();
        recorder.latencies.reserve(ops);
        recorder
    }

    /// Reset all counters and start the clock
    pub fn start(&mut self) {
        let now = Instant::now();
        self.state = RecorderState::Running;
        self.started = Some(now);
        self.last_op = Some(now);
        self.finished = None;
        self.reads = 0;
        self.found = 0;
        self.writes = 0;
        self.deletes = 0;
        self.scans = 0;
        self.bytes = 0;
        self.seconds = 0.0;
        self.latencies.clear();
    }

    /// Stop the clock and compute elapsed seconds
    pub fn stop(&mut self) {
        if self.state != RecorderState::Running {
            return;
        }
        let now = Instant::now();
        self.finished = Some(now);
        self.seconds = self.started.map(|s| now.duration_since(s).as_secs_f64()).unwrap_or(0.0);
        self.state = RecorderState::Stopped;
    }

    /// Push a latency sample; false when not running
    fn record_op(&mut self, bytes: u64) -> bool {
        if self.state != RecorderState::Running {
            tracing::trace!("ignoring operation recorded while {:?}", self.state);
            return false;
        }
        let now = Instant::now();
        if let Some(last) = self.last_op {
            self.latencies.push(now.duration_since(last));
        }
        self.last_op = Some(now);
        self.bytes += bytes;
        true
    }

    pub fn finished_read_op(&mut self, bytes: u64, found: bool) {
        if self.record_op(bytes) {
            self.reads += 1;
            if found {
                self.found += 1;
            }
        }
    }

    pub fn finished_write_op(&mut self, bytes: u64) {
        if self.record_op(bytes) {
            self.writes += 1;
        }
    }

    pub fn finished_delete_op(&mut self, bytes: u64) {
        if self.record_op(bytes) {
            self.deletes += 1;
        }
    }

    pub fn finished_scan_op(&mut self, bytes: u64) {
        if self.record_op(bytes) {
            self.scans += 1;
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn found(&self) -> u64 {
        self.found
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn deletes(&self) -> u64 {
        self.deletes
    }

    pub fn scans(&self) -> u64 {
        self.scans
    }

    /// Total operations of every kind
    pub fn ops(&self) -> u64 {
        self.reads + self.writes + self.deletes + self.scans
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Seconds between `start` and `stop`; zero until stopped
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished
    }

    /// Per-operation latencies in recording order
    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    pub(crate) fn into_latencies(self) -> Vec<Duration> {
        self.latencies
    }
}
