//! Profile support for kvmark
//!
//! A profile is a TOML file with a `[benchmark]` table of global options and
//! an optional `[adapter]` table naming the adapter and its options. Both are
//! flattened into the engine's string [`Options`]; the engine does all
//! validation.
//!
//! ```toml
//! [benchmark]
//! num = 100000
//! threads = 4
//! workload = ["fillseq", "ycsba"]
//!
//! [adapter]
//! name = "redb"
//! path = "/tmp/kvmark.redb"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use kvmark_core::Options;
use serde::{Deserialize, Serialize};

/// Key that selects the adapter when given through `--set`
pub const ADAPTER_KEY: &str = "adapter";

/// Top-level profile configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Global benchmark options (`num`, `threads`, `workload`, ...)
    #[serde(default)]
    pub benchmark: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub adapter: AdapterSection,
}

/// Adapter selection and adapter-specific options
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AdapterSection {
    pub name: Option<String>,
    /// Everything else, passed to the adapter with its name as prefix
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl ProfileConfig {
    /// Load profile from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse profile: {}", path.display()))
    }

    /// Parse profile from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Flatten the profile and overrides into engine options
    ///
    /// The adapter name comes from `adapter`, then a `--set adapter=...`
    /// override, then the profile. `overrides` are `key=value` strings applied
    /// verbatim after the profile, so `--set redb-path=/tmp/db` reaches the
    /// redb adapter as `path`.
    pub fn to_options(&self, adapter: Option<&str>, overrides: &[String]) -> Result<Options> {
        let mut pairs = Vec::with_capacity(overrides.len());
        let mut adapter_override = None;
        for override_str in overrides {
            let (key, value) = parse_key_value(override_str)
                .with_context(|| format!("Invalid override format: {}", override_str))?;
            if key == ADAPTER_KEY {
                adapter_override = Some(value);
            } else {
                pairs.push((key, value));
            }
        }

        let name = adapter
            .map(str::to_string)
            .or(adapter_override)
            .or_else(|| self.adapter.name.clone())
            .filter(|name| !name.is_empty());
        let Some(name) = name else {
            bail!("No adapter provided. Use --adapter <name> or set [adapter].name in the profile");
        };

        let mut options = Options::new(name.as_str());
        for (key, value) in &self.benchmark {
            let value = option_value(value).with_context(|| format!("benchmark.{}", key))?;
            options.set(key.as_str(), value);
        }
        for (key, value) in &self.adapter.options {
            let value = option_value(value).with_context(|| format!("adapter.{}", key))?;
            options.set(format!("{}-{}", name, key), value);
        }
        for (key, value) in pairs {
            options.set(key, value);
        }

        Ok(options)
    }
}

/// Parse a "key=value" string into (key, value) tuple
fn parse_key_value(override_str: &str) -> Result<(String, String)> {
    let Some((key, value)) = override_str.split_once('=') else {
        bail!("Invalid override format '{}'. Expected 'key=value'", override_str);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty key in override '{}'", override_str);
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Render a TOML scalar as the string the engine expects
///
/// Arrays of scalars become comma-separated lists, which is how the engine
/// reads `workload`.
fn option_value(value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| match item {
                    toml::Value::Array(_) | toml::Value::Table(_) => {
                        bail!("nested arrays and tables are not supported")
                    }
                    scalar => option_value(scalar),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(items.join(","))
        }
        toml::Value::Datetime(_) | toml::Value::Table(_) => {
            bail!("expected a string, number, boolean or array")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("num=100").unwrap(),
            ("num".to_string(), "100".to_string())
        );
        assert_eq!(
            parse_key_value("redb-path=/tmp/a=b").unwrap(),
            ("redb-path".to_string(), "/tmp/a=b".to_string())
        );
        assert!(parse_key_value("num").is_err());
        assert!(parse_key_value("=5").is_err());
    }

    #[test]
    fn test_option_value() {
        assert_eq!(option_value(&toml::Value::Integer(42)).unwrap(), "42");
        assert_eq!(option_value(&toml::Value::Boolean(true)).unwrap(), "true");
        assert_eq!(option_value(&toml::Value::String("zipfian".into())).unwrap(), "zipfian");

        let list = toml::Value::Array(vec!["fillseq".into(), "ycsbc".into()]);
        assert_eq!(option_value(&list).unwrap(), "fillseq,ycsbc");

        let nested = toml::Value::Array(vec![toml::Value::Array(vec![])]);
        assert!(option_value(&nested).is_err());
    }
}
