//! Fraud archetype injection tests.
//!
//! Each archetype must be detectable by the rule it was built for,
//! using only fields present in the output.

use riskmetric_core::{
    config::GeneratorConfig,
    engine::{Dataset, Pipeline},
    impossible_travel_stage::ImpossibleTravelStage,
    profile_stage::ProfileGenerator,
    record::{TransactionRecord, MIN_AMOUNT},
    rng::{RngBank, StageSlot},
    stage::GenerationStage,
    types::Archetype,
};
use std::collections::{BTreeMap, HashMap};

fn scenario() -> Dataset {
    Pipeline::build(GeneratorConfig::default_test()).unwrap().run().unwrap()
}

fn tagged(dataset: &Dataset, archetype: Archetype) -> Vec<&TransactionRecord> {
    dataset
        .transactions
        .iter()
        .filter(|t| t.fraud_type == Some(archetype))
        .collect()
}

/// Great-circle distance in km; test-side only, the generator never computes it.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * 6_371.0 * a.sqrt().asin()
}

#[test]
fn every_record_satisfies_ground_truth() {
    let dataset = scenario();
    for t in &dataset.transactions {
        assert!(t.amount >= MIN_AMOUNT, "{}: amount {}", t.transaction_id, t.amount);
        assert_eq!(t.is_fraud, t.fraud_type.is_some(), "{}", t.transaction_id);
    }
}

#[test]
fn scenario_counts_partition_exactly() {
    let dataset = scenario();
    let travel = tagged(&dataset, Archetype::ImpossibleTravel).len();
    let velocity = tagged(&dataset, Archetype::VelocitySpike).len();
    let drift = tagged(&dataset, Archetype::BehavioralDrift).len();
    let legit = dataset.transactions.iter().filter(|t| !t.is_fraud).count();

    assert_eq!(legit, 1_000);
    assert_eq!(travel, 10, "5 pairs must yield 10 records");
    assert_eq!(drift, 5);
    assert!((50..=100).contains(&velocity), "5 bursts of 10–20, got {velocity}");
    assert_eq!(dataset.transactions.len(), 1_000 + 10 + velocity + 5);
}

#[test]
fn impossible_travel_pairs_imply_absurd_speed() {
    let mut config = GeneratorConfig::default_test();
    config.impossible_travel.pairs = 400;
    let bank = RngBank::new(config.seed);
    let profiles = ProfileGenerator::new(&config)
        .generate(&mut bank.for_stage(StageSlot::Profile))
        .unwrap();
    let records = ImpossibleTravelStage::new(config)
        .generate(&profiles, &mut bank.for_stage(StageSlot::ImpossibleTravel))
        .unwrap();

    assert_eq!(records.len(), 800);
    for pair in records.chunks(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert_eq!(a.user_id, b.user_id);
        let minutes = (b.timestamp - a.timestamp).num_seconds() as f64 / 60.0;
        assert!(minutes > 0.0 && minutes <= 10.0, "gap {minutes} min");

        let km = haversine_km(a.latitude, a.longitude, b.latitude, b.longitude);
        let kmh = km / (minutes / 60.0);
        assert!(
            kmh > 5_000.0,
            "{} -> {}: {km:.0} km in {minutes} min is only {kmh:.0} km/h",
            a.city, b.city
        );
    }
}

#[test]
fn declared_pair_separation_matches_geography() {
    let config = GeneratorConfig::default();
    for pair in &config.distant_pairs {
        let (a, b) = (&config.cities[pair.from], &config.cities[pair.to]);
        let km = haversine_km(a.lat, a.lon, b.lat, b.lon);
        let err = (km - pair.separation_km).abs() / km;
        assert!(err < 0.05, "{} <-> {}: declared {} km, actual {km:.0}", a.city, b.city, pair.separation_km);
    }
}

#[test]
fn velocity_bursts_fit_one_minute() {
    let dataset = scenario();
    let mut bursts: BTreeMap<&str, Vec<&TransactionRecord>> = BTreeMap::new();
    for t in tagged(&dataset, Archetype::VelocitySpike) {
        bursts.entry(&t.user_id).or_default().push(t);
    }

    assert_eq!(bursts.len(), 5, "one burst per selected user");
    for (user, burst) in bursts {
        assert!(burst.len() >= 10, "{user}: burst of only {}", burst.len());
        // Canonical order is chronological per user.
        let span = burst.last().unwrap().timestamp - burst.first().unwrap().timestamp;
        assert!(span.num_seconds() < 60, "{user}: burst spans {}s", span.num_seconds());
        assert!(burst.iter().all(|t| t.city == burst[0].city));
    }
}

#[test]
fn drift_outliers_exceed_three_sigma() {
    let mut config = GeneratorConfig::default_test();
    config.behavioral_drift.count = 500;
    let dataset = Pipeline::build(config).unwrap().run().unwrap();
    let profiles: HashMap<_, _> = dataset.profiles.iter().map(|p| (&p.user_id, p)).collect();

    let drift = tagged(&dataset, Archetype::BehavioralDrift);
    assert_eq!(drift.len(), 500);
    for t in drift {
        let p = profiles[&t.user_id];
        let bound = p.avg_amount + 3.0 * p.std_amount;
        assert!(t.amount > bound, "{}: {} <= mean+3σ {bound}", t.user_id, t.amount);
        assert!(t.amount >= 500.0);
        assert_eq!(t.city, p.home_city);
    }
}

#[test]
fn no_batch_identity_leaks_into_records() {
    // Travel pair records must not share anything that names the pair.
    let dataset = scenario();
    let travel = tagged(&dataset, Archetype::ImpossibleTravel);
    let mut ids: Vec<_> = travel.iter().map(|t| t.transaction_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), travel.len());
}
