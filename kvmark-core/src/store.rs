//! Store capability contract
//!
//! Every storage engine benchmarked by kvmark is driven through [`KvStore`].
//! The engine owns exactly one store for the lifetime of a run and shares it by
//! reference with all worker threads of a phase, so implementations must be
//! safe to call concurrently.

use std::collections::BTreeMap;
use std::fmt;

/// Result type returned by every store operation
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a store adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested key does not exist
    NotFound(String),

    /// Any other backend failure
    Backend(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(msg) if msg.is_empty() => write!(f, "not found"),
            StoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            StoreError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Adapter-specific options, already stripped of the `<adapter>-` prefix
pub type AdapterOptions = BTreeMap<String, String>;

/// A key-value store that can be benchmarked.
///
/// `get` and `scan` only signal success or failure: fetched data never flows
/// back into the harness.
pub trait KvStore: Send + Sync {
    /// Adapter name, used in logs and reports
    fn name(&self) -> &str;

    /// One-time setup, called before any worker starts
    fn init(&mut self, options: &AdapterOptions) -> StoreResult<()>;

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    fn get(&self, key: &[u8]) -> StoreResult<()>;

    fn remove(&self, key: &[u8]) -> StoreResult<()>;

    /// Iterate keys in `[start, end)`
    fn scan(&self, start: &[u8], end: &[u8]) -> StoreResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self, options: &AdapterOptions) -> StoreResult<()> {
        (**self).init(options)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> StoreResult<()> {
        (**self).get(key)
    }

    fn remove(&self, key: &[u8]) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn scan(&self, start: &[u8], end: &[u8]) -> StoreResult<()> {
        (**self).scan(start, end)
    }
}
