//! RiskMetric bronze layer: synthetic transactions with labeled fraud.
//!
//! A run builds a user population, samples legitimate spending, injects
//! three fraud archetypes and assembles one canonical, labeled dataset.
//! Detection is out of scope; this crate only produces the answer key.

pub mod assembler;
pub mod behavioral_drift_stage;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod impossible_travel_stage;
pub mod legitimate_stage;
pub mod name_generator;
pub mod profile_stage;
pub mod record;
pub mod rng;
pub mod stage;
pub mod summary;
pub mod types;
pub mod velocity_spike_stage;
