//! Embedded redb adapter
//!
//! Every operation runs in its own transaction, so each `put` and `remove` is
//! a full commit at the configured durability.
//!
//! Options (passed as `redb-<key>`):
//! - `path`: database file, created if missing. Without it the database lives
//!   in memory.
//! - `cache_size`: page cache size in bytes
//! - `durability`: `none`, `eventual`, `immediate` (redb default) or `paranoid`

use std::fmt;
use std::path::PathBuf;

use kvmark_core::{AdapterOptions, KvStore, StoreError, StoreResult};
use redb::backends::InMemoryBackend;
use redb::{Database, Durability, ReadableTable, TableDefinition};

pub const NAME: &str = "redb";

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kvmark");

fn backend(err: impl fmt::Display) -> StoreError {
    StoreError::backend(format!("{NAME}: {err}"))
}

fn parse_durability(value: &str) -> StoreResult<Durability> {
    match value.trim() {
        "none" => Ok(Durability::None),
        "eventual" => Ok(Durability::Eventual),
        "immediate" => Ok(Durability::Immediate),
        "paranoid" => Ok(Durability::Paranoid),
        other => Err(backend(format!(
            "invalid durability '{other}', expected none, eventual, immediate or paranoid"
        ))),
    }
}

#[derive(Default)]
pub struct RedbStore {
    db: Option<Database>,
    path: Option<PathBuf>,
    durability: Option<Durability>,
}

impl RedbStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database file, `None` for an in-memory database
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    fn db(&self) -> StoreResult<&Database> {
        self.db.as_ref().ok_or_else(|| backend("store used before init"))
    }

    fn write<F>(&self, op: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut redb::Table<'_, &'static [u8], &'static [u8]>) -> Result<bool, redb::StorageError>,
    {
        let mut txn = self.db()?.begin_write().map_err(backend)?;
        if let Some(durability) = self.durability {
            txn.set_durability(durability);
        }
        let existed = {
            let mut table = txn.open_table(TABLE).map_err(backend)?;
            op(&mut table).map_err(backend)?
        };
        txn.commit().map_err(backend)?;
        Ok(existed)
    }
}

impl fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .field("open", &self.db.is_some())
            .finish()
    }
}

impl KvStore for RedbStore {
    fn name(&self) -> &str {
        NAME
    }

    fn init(&mut self, options: &AdapterOptions) -> StoreResult<()> {
        let mut builder = Database::builder();
        let mut path = None;
        let mut durability = None;

        for (key, value) in options {
            match key.as_str() {
                "path" => path = Some(PathBuf::from(value)),
                "cache_size" => {
                    let bytes = value.trim().parse::<usize>().map_err(|_| {
                        backend(format!("invalid value for cache_size: '{value}'"))
                    })?;
                    builder.set_cache_size(bytes);
                }
                "durability" => durability = Some(parse_durability(value)?),
                other => return Err(backend(format!("unknown option {other}"))),
            }
        }

        let db = match &path {
            Some(path) => builder.create(path).map_err(backend)?,
            None => builder.create_with_backend(InMemoryBackend::new()).map_err(backend)?,
        };

        self.db = Some(db);
        self.path = path;
        self.durability = durability;

        // Create the table up front so readers never see it missing
        self.write(|_| Ok(false))?;

        match &self.path {
            Some(path) => tracing::info!("Opened redb database at {}", path.display()),
            None => tracing::info!("Opened in-memory redb database"),
        }
        Ok(())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.write(|table| table.insert(key, value).map(|old| old.is_some()))?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<()> {
        let txn = self.db()?.begin_read().map_err(backend)?;
        let table = txn.open_table(TABLE).map_err(backend)?;
        match table.get(key).map_err(backend)? {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(String::from_utf8_lossy(key))),
        }
    }

    fn remove(&self, key: &[u8]) -> StoreResult<()> {
        if self.write(|table| table.remove(key).map(|old| old.is_some()))? {
            Ok(())
        } else {
            Err(StoreError::not_found(String::from_utf8_lossy(key)))
        }
    }

    fn scan(&self, start: &[u8], end: &[u8]) -> StoreResult<()> {
        if start >= end {
            return Ok(());
        }
        let txn = self.db()?.begin_read().map_err(backend)?;
        let table = txn.open_table(TABLE).map_err(backend)?;
        for entry in table.range(start..end).map_err(backend)? {
            let (key, value) = entry.map_err(backend)?;
            std::hint::black_box((key.value().len(), value.value().len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> AdapterOptions {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_in_memory_round_trip() {
        let mut store = RedbStore::new();
        store.init(&AdapterOptions::new()).unwrap();
        assert!(store.path().is_none());

        assert!(store.get(b"k").unwrap_err().is_not_found());
        store.put(b"k", b"v").unwrap();
        store.get(b"k").unwrap();
        store.remove(b"k").unwrap();
        assert!(store.remove(b"k").unwrap_err().is_not_found());
    }

    #[test]
    fn test_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.redb");
        let path_str = path.to_str().unwrap();

        let mut store = RedbStore::new();
        store.init(&options(&[("path", path_str), ("durability", "none")])).unwrap();
        for i in 0..20 {
            store.put(format!("{:04}", i).as_bytes(), b"value").unwrap();
        }
        store.scan(b"0005", b"0010").unwrap();
        store.scan(b"99", b"105").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_bad_options() {
        let mut store = RedbStore::new();
        assert!(store.init(&options(&[("durability", "sometimes")])).is_err());
        assert!(store.init(&options(&[("cache_size", "big")])).is_err());
        let err = store.init(&options(&[("db", "x")])).unwrap_err();
        assert!(err.to_string().contains("unknown option db"));
    }

    #[test]
    fn test_use_before_init() {
        let store = RedbStore::new();
        let err = store.put(b"k", b"v").unwrap_err();
        assert!(!err.is_not_found());
    }
}
