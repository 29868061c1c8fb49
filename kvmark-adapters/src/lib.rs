//! kvmark store adapters
//!
//! Built-in [`KvStore`] implementations and the registry the CLI uses to
//! create them by name.

use std::collections::BTreeMap;

use kvmark_core::{Error, KvStore, Result};

pub mod memory;
pub mod noop;
#[cfg(feature = "redb")]
pub mod redb_store;

pub use memory::MemoryStore;
pub use noop::NoopStore;
#[cfg(feature = "redb")]
pub use redb_store::RedbStore;

/// Constructor for a fresh, uninitialized store
pub type AdapterFactory = fn() -> Box<dyn KvStore>;

struct AdapterEntry {
    description: &'static str,
    factory: AdapterFactory,
}

/// Name-to-constructor table of available adapters
///
/// Passed explicitly to whoever needs to resolve an adapter name; there is no
/// process-wide instance.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<&'static str, AdapterEntry>,
}

impl AdapterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every adapter compiled into this build
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(noop::NAME, "discards writes, every read hits", || {
            Box::new(NoopStore::new())
        });
        registry.register(memory::NAME, "ordered in-memory map behind a RwLock", || {
            Box::new(MemoryStore::new())
        });
        #[cfg(feature = "redb")]
        registry.register(redb_store::NAME, "embedded redb database", || {
            Box::new(RedbStore::new())
        });
        registry
    }

    /// Add an adapter, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        factory: AdapterFactory,
    ) -> &mut Self {
        if self.adapters.insert(name, AdapterEntry { description, factory }).is_some() {
            tracing::debug!("Adapter '{}' re-registered", name);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Create a new store instance by adapter name
    pub fn create(&self, name: &str) -> Result<Box<dyn KvStore>> {
        match self.adapters.get(name) {
            Some(entry) => Ok((entry.factory)()),
            None => Err(Error::Config(format!(
                "Unknown adapter '{}'. Supported: {}",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    /// Registered adapter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.keys().copied()
    }

    /// `(name, description)` pairs in sorted order
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.adapters.iter().map(|(name, entry)| (*name, entry.description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_adapters() {
        let registry = AdapterRegistry::with_builtin();
        assert!(registry.contains("noop"));
        assert!(registry.contains("memory"));
        assert_eq!(registry.create("memory").unwrap().name(), "memory");
    }

    #[test]
    fn test_unknown_adapter() {
        let registry = AdapterRegistry::with_builtin();
        let err = registry.create("rocksdb").err().unwrap();
        assert!(err.is_config());
        let msg = err.to_string();
        assert!(msg.contains("rocksdb"), "{}", msg);
        assert!(msg.contains("memory"), "{}", msg);
    }

    #[test]
    fn test_register_custom() {
        let mut registry = AdapterRegistry::new();
        assert_eq!(registry.names().count(), 0);
        registry.register("blackhole", "test adapter", || Box::new(NoopStore::new()));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["blackhole"]);
        assert_eq!(registry.create("blackhole").unwrap().name(), "noop");
    }

    #[test]
    fn test_names_sorted() {
        let registry = AdapterRegistry::with_builtin();
        let names: Vec<_> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
