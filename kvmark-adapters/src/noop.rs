//! Store that does nothing
//!
//! Measures the harness itself: key and value generation, dispatch and
//! statistics recording, with no storage cost.

use kvmark_core::{AdapterOptions, KvStore, StoreError, StoreResult};

pub const NAME: &str = "noop";

#[derive(Debug, Default)]
pub struct NoopStore {
    initialized: bool,
}

impl NoopStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl KvStore for NoopStore {
    fn name(&self) -> &str {
        NAME
    }

    fn init(&mut self, options: &AdapterOptions) -> StoreResult<()> {
        if let Some(key) = options.keys().next() {
            return Err(StoreError::backend(format!("{NAME}: unknown option {key}")));
        }
        self.initialized = true;
        Ok(())
    }

    fn put(&self, _key: &[u8], _value: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    fn get(&self, _key: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &[u8]) -> StoreResult<()> {
        Ok(())
    }

    fn scan(&self, _start: &[u8], _end: &[u8]) -> StoreResult<()> {
        Ok(())
    }
}
