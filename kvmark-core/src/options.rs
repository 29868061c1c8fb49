//! Raw benchmark options
//!
//! Options are flat `key=value` pairs. Keys prefixed with `<adapter>-` belong
//! to the selected adapter and are handed to [`KvStore::init`] with the prefix
//! removed; every other key is a global benchmark option.
//!
//! [`KvStore::init`]: crate::store::KvStore::init

use std::collections::BTreeMap;

use crate::store::AdapterOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    adapter: String,
    values: BTreeMap<String, String>,
}

impl Options {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self { adapter: adapter.into(), values: BTreeMap::new() }
    }

    /// Set an option, replacing any earlier value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`Options::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn adapter_prefix(&self) -> String {
        format!("{}-", self.adapter)
    }

    /// Options that do not carry the adapter prefix
    pub fn global_options(&self) -> BTreeMap<String, String> {
        let prefix = self.adapter_prefix();
        self.values
            .iter()
            .filter(|(key, _)| self.adapter.is_empty() || !key.starts_with(&prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Adapter-prefixed options with the prefix stripped
    pub fn adapter_options(&self) -> AdapterOptions {
        if self.adapter.is_empty() {
            return AdapterOptions::new();
        }
        let prefix = self.adapter_prefix();
        self.values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix).map(|stripped| (stripped.to_string(), value.clone()))
            })
            .collect()
    }
}
