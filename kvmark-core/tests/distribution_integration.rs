//! Integration tests for key and value-length distributions

use std::collections::HashMap;

use kvmark_core::workload::distributions::{DistributionConfig, DistributionKind};
use kvmark_core::workload::mixes::KeyPattern;
use kvmark_core::workload::ValueGenerator;
use kvmark_core::{BenchmarkConfig, ValueSizeDistribution};

#[test]
fn test_value_lengths_for_every_distribution() {
    for distribution in [
        ValueSizeDistribution::Fixed,
        ValueSizeDistribution::Uniform,
        ValueSizeDistribution::Normal,
        ValueSizeDistribution::Zipfian,
    ] {
        let config = BenchmarkConfig { value_size: 200, distribution, ..Default::default() };
        let mut values = ValueGenerator::from_config(&config.value_lengths()).unwrap();
        for _ in 0..2000 {
            let len = values.generate_sampled().len();
            assert!((1..=200).contains(&len), "{distribution}: length {len}");
        }
    }
}

#[test]
fn test_fixed_value_lengths() {
    let config = BenchmarkConfig {
        value_size: 77,
        distribution: ValueSizeDistribution::Fixed,
        ..Default::default()
    };
    let mut values = ValueGenerator::from_config(&config.value_lengths()).unwrap();
    for _ in 0..100 {
        assert_eq!(values.generate_sampled().len(), 77);
    }
}

#[test]
fn test_zipfian_keys_hot_spot() {
    let mut keys = KeyPattern::Zipfian.sampler(1000).unwrap().unwrap();

    let mut counts: HashMap<u64, u32> = HashMap::new();
    for _ in 0..20_000 {
        *counts.entry(keys.generate()).or_insert(0) += 1;
    }

    let most_frequent = counts.iter().max_by_key(|(_, count)| **count).map(|(key, _)| *key);
    assert_eq!(most_frequent, Some(0));

    let top: u32 = (0..100).map(|k| counts.get(&k).copied().unwrap_or(0)).sum();
    let bottom: u32 = (900..1000).map(|k| counts.get(&k).copied().unwrap_or(0)).sum();
    assert!(top > bottom * 10, "top={} bottom={}", top, bottom);
}

#[test]
fn test_seeded_samplers_repeat() {
    let config = DistributionConfig::new(DistributionKind::Latest, 0, 10_000).with_param(0.5);
    let mut a = config.build_with_seed(Some(42)).unwrap();
    let mut b = config.build_with_seed(Some(42)).unwrap();
    for _ in 0..100 {
        assert_eq!(a.generate(), b.generate());
    }
}
