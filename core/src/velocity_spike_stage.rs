//! Velocity-spike injection: card-testing bursts.
//!
//! Each chosen user gets one burst of micro-charges packed into
//! a single minute, all at one online merchant category.

use crate::{
    config::GeneratorConfig,
    error::GenResult,
    name_generator::MerchantNameGenerator,
    profile_stage::UserProfile,
    record::{InjectionBatch, Location, TransactionRecord, MIN_AMOUNT},
    rng::{StageRng, StageSlot},
    stage::{random_timestamp, record_buffer, GenerationStage},
    types::{round_to, Archetype},
};

/// Smallest burst a run may be configured with.
pub const MIN_BURST_SIZE: usize = 10;

pub struct VelocitySpikeStage {
    config: GeneratorConfig,
}

impl VelocitySpikeStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn build_burst(&self, user: &UserProfile, rng: &mut StageRng) -> InjectionBatch {
        let cfg = &self.config.velocity_spike;
        let base_ts = random_timestamp(
            self.config.window.start,
            self.config.window.injection_span_secs(),
            rng,
        );
        let size = rng.int_inclusive(cfg.burst_min as i64, cfg.burst_max as i64) as usize;
        let city = rng.pick(&self.config.cities);

        let mut batch = InjectionBatch::new(Archetype::VelocitySpike, user.user_id.clone(), base_ts);
        for _ in 0..size {
            let timestamp = random_timestamp(base_ts, cfg.offset_max_secs, rng);
            let amount = round_to(rng.uniform(cfg.amount_min, cfg.amount_max), 2).max(MIN_AMOUNT);
            let merchant = MerchantNameGenerator::generate(rng);
            let location = Location::jittered(city, cfg.jitter_deg, rng);
            batch.push(rng, timestamp, amount, merchant, &cfg.category, location);
        }
        batch
    }
}

impl GenerationStage for VelocitySpikeStage {
    fn slot(&self) -> StageSlot {
        StageSlot::VelocitySpike
    }

    fn generate(
        &self,
        profiles: &[UserProfile],
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>> {
        let requested = self.config.velocity_spike.users;
        let users = self.config.effective_velocity_users().min(profiles.len());
        if users < requested {
            log::warn!(
                "velocity_spike: {requested} users requested, population allows {users}"
            );
        }

        let mut out = record_buffer(users * self.config.velocity_spike.burst_max)?;
        for idx in rng.sample_distinct(profiles.len(), users) {
            let batch = self.build_burst(&profiles[idx], rng);
            log::debug!("velocity_spike: {} x{} at {}", batch.user_id, batch.len(), batch.base_ts);
            out.extend(batch.into_records());
        }

        log::info!("velocity_spike: injected {users} bursts ({} records)", out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profile_stage::ProfileGenerator, rng::RngBank};
    use std::collections::BTreeMap;

    #[test]
    fn bursts_are_large_tight_and_one_per_user() {
        let config = GeneratorConfig::default_test();
        let bank = RngBank::new(config.seed);
        let profiles = ProfileGenerator::new(&config)
            .generate(&mut bank.for_stage(StageSlot::Profile))
            .unwrap();
        let records = VelocitySpikeStage::new(config.clone())
            .generate(&profiles, &mut bank.for_stage(StageSlot::VelocitySpike))
            .unwrap();

        let mut by_user: BTreeMap<&str, Vec<&TransactionRecord>> = BTreeMap::new();
        for r in &records {
            by_user.entry(r.user_id.as_str()).or_default().push(r);
        }
        assert_eq!(by_user.len(), 5, "one burst per distinct user");

        for (user, burst) in by_user {
            assert!((10..=20).contains(&burst.len()), "{user}: burst of {}", burst.len());
            let first = burst.iter().map(|r| r.timestamp).min().unwrap();
            let last = burst.iter().map(|r| r.timestamp).max().unwrap();
            assert!((last - first).num_seconds() < 60);
            assert!(burst.iter().all(|r| r.merchant_category == "Online Shopping"
                && r.amount >= 0.01
                && r.amount <= 2.0));
        }
    }

    #[test]
    fn user_count_clamps_to_population() {
        let mut config = GeneratorConfig::default_test();
        config.population.size = 3;
        config.velocity_spike.users = 10;
        let bank = RngBank::new(config.seed);
        let profiles = ProfileGenerator::new(&config)
            .generate(&mut bank.for_stage(StageSlot::Profile))
            .unwrap();
        let records = VelocitySpikeStage::new(config.clone())
            .generate(&profiles, &mut bank.for_stage(StageSlot::VelocitySpike))
            .unwrap();
        let users: std::collections::BTreeSet<_> = records.iter().map(|r| &r.user_id).collect();
        assert_eq!(users.len(), 3);
    }
}
