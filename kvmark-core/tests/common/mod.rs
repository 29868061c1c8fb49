//! Stub stores shared by the engine integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use kvmark_core::{AdapterOptions, KvStore, StoreError, StoreResult};

/// Call counters visible to the test after the engine takes the store
#[derive(Debug, Default)]
pub struct Calls {
    pub init: AtomicBool,
    pub puts: AtomicU64,
    pub gets: AtomicU64,
    pub removes: AtomicU64,
    pub scans: AtomicU64,
    pub options: Mutex<AdapterOptions>,
}

impl Calls {
    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn initialized(&self) -> bool {
        self.init.load(Ordering::Relaxed)
    }
}

/// Store that succeeds at everything and counts calls
pub struct CountingStore {
    pub calls: Arc<Calls>,
    pub fail_init: bool,
    pub miss_reads: bool,
    pub fail_writes: bool,
}

impl CountingStore {
    pub fn new() -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        (
            Self { calls: calls.clone(), fail_init: false, miss_reads: false, fail_writes: false },
            calls,
        )
    }

    pub fn failing_init() -> (Self, Arc<Calls>) {
        let (mut store, calls) = Self::new();
        store.fail_init = true;
        (store, calls)
    }

    pub fn missing_reads() -> (Self, Arc<Calls>) {
        let (mut store, calls) = Self::new();
        store.miss_reads = true;
        (store, calls)
    }

    pub fn failing_writes() -> (Self, Arc<Calls>) {
        let (mut store, calls) = Self::new();
        store.fail_writes = true;
        (store, calls)
    }
}

impl KvStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    fn init(&mut self, options: &AdapterOptions) -> StoreResult<()> {
        self.calls.init.store(true, Ordering::Relaxed);
        *self.calls.options.lock().unwrap() = options.clone();
        if self.fail_init {
            return Err(StoreError::backend("cannot open database"));
        }
        Ok(())
    }

    fn put(&self, _key: &[u8], _value: &[u8]) -> StoreResult<()> {
        self.calls.puts.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes {
            return Err(StoreError::backend("disk full"));
        }
        Ok(())
    }

    fn get(&self, _key: &[u8]) -> StoreResult<()> {
        self.calls.gets.fetch_add(1, Ordering::Relaxed);
        if self.miss_reads {
            return Err(StoreError::not_found(""));
        }
        Ok(())
    }

    fn remove(&self, _key: &[u8]) -> StoreResult<()> {
        self.calls.removes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn scan(&self, _start: &[u8], _end: &[u8]) -> StoreResult<()> {
        self.calls.scans.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Kind of a timestamped store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Put,
    Get,
    Scan,
}

/// Store that records when each call happened
#[derive(Default)]
pub struct TimestampStore {
    pub log: Arc<Mutex<Vec<(Call, Instant)>>>,
}

impl TimestampStore {
    fn push(&self, call: Call) {
        self.log.lock().unwrap().push((call, Instant::now()));
    }
}

impl KvStore for TimestampStore {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn init(&mut self, _options: &AdapterOptions) -> StoreResult<()> {
        Ok(())
    }

    fn put(&self, _key: &[u8], _value: &[u8]) -> StoreResult<()> {
        self.push(Call::Put);
        Ok(())
    }

    fn get(&self, _key: &[u8]) -> StoreResult<()> {
        self.push(Call::Get);
        Ok(())
    }

    fn remove(&self, _key: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    fn scan(&self, _start: &[u8], _end: &[u8]) -> StoreResult<()> {
        self.push(Call::Scan);
        Ok(())
    }
}
