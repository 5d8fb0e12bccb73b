use crate::{
    engine::Dataset,
    types::{Archetype, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// End-of-run counts, written next to the Parquet artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed:              u64,
    pub users:             usize,
    pub total:             usize,
    pub legitimate:        usize,
    pub impossible_travel: usize,
    pub velocity_spike:    usize,
    pub behavioral_drift:  usize,
    pub fraud_rate:        f64,
    pub first_timestamp:   Option<Timestamp>,
    pub last_timestamp:    Option<Timestamp>,
}

impl RunSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let counts = archetype_counts(dataset);
        let count = |a: Archetype| counts.get(&a).copied().unwrap_or(0);
        let total = dataset.transactions.len();
        let fraud: usize = counts.values().sum();

        Self {
            seed: dataset.seed,
            users: dataset.profiles.len(),
            total,
            legitimate: total - fraud,
            impossible_travel: count(Archetype::ImpossibleTravel),
            velocity_spike: count(Archetype::VelocitySpike),
            behavioral_drift: count(Archetype::BehavioralDrift),
            fraud_rate: if total == 0 { 0.0 } else { fraud as f64 / total as f64 },
            first_timestamp: dataset.transactions.iter().map(|t| t.timestamp).min(),
            last_timestamp: dataset.transactions.iter().map(|t| t.timestamp).max(),
        }
    }

    pub fn fraud_total(&self) -> usize {
        self.impossible_travel + self.velocity_spike + self.behavioral_drift
    }
}

/// Number of records carrying each archetype tag.
pub fn archetype_counts(dataset: &Dataset) -> BTreeMap<Archetype, usize> {
    let mut counts = BTreeMap::new();
    for tag in dataset.transactions.iter().filter_map(|t| t.fraud_type) {
        *counts.entry(tag).or_insert(0) += 1;
    }
    counts
}
