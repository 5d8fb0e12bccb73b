//! Impossible-travel injection.
//!
//! Emits the same user in two far-apart catalog cities a few minutes
//! apart. No distance or speed is computed here: the pair catalog is
//! chosen so that any realistic speed threshold is exceeded, and
//! deriving that speed is the detector's job.

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
use chrono::Duration;

/// Widest gap a run may be configured with between the two legs.
pub const MAX_GAP_MINUTES: i64 = 10;

pub struct ImpossibleTravelStage {
    config: GeneratorConfig,
}

impl ImpossibleTravelStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn build_pair(&self, user: &UserProfile, rng: &mut StageRng) -> InjectionBatch {
        let cfg = &self.config.impossible_travel;
        let pair = *rng.pick(&self.config.distant_pairs);
        let legs = [&self.config.cities[pair.from], &self.config.cities[pair.to]];

        let base_ts = random_timestamp(
            self.config.window.start,
            self.config.window.injection_span_secs(),
            rng,
        );
        let gap = Duration::minutes(rng.int_inclusive(cfg.gap_minutes_min, cfg.gap_minutes_max));

        let mut batch = InjectionBatch::new(Archetype::ImpossibleTravel, user.user_id.clone(), base_ts);
        for (leg, city) in legs.into_iter().enumerate() {
            let timestamp = if leg == 0 { base_ts } else { base_ts + gap };
            let amount = round_to(rng.uniform(cfg.amount_min, cfg.amount_max), 2).max(MIN_AMOUNT);
            let merchant = MerchantNameGenerator::generate(rng);
            let category = rng.pick(&self.config.merchant_categories).clone();
            let location = Location::jittered(city, cfg.jitter_deg, rng);
            batch.push(rng, timestamp, amount, merchant, &category, location);
        }
        batch
    }
}

impl GenerationStage for ImpossibleTravelStage {
    fn slot(&self) -> StageSlot {
        StageSlot::ImpossibleTravel
    }

    fn generate(
        &self,
        profiles: &[UserProfile],
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>> {
        let pairs = self.config.impossible_travel.pairs;
        let mut out = record_buffer(pairs * 2)?;

        for _ in 0..pairs {
            let user = rng.pick(profiles);
            let batch = self.build_pair(user, rng);
            debug_assert_eq!(batch.len(), 2);
            out.extend(batch.into_records());
        }

        log::info!("impossible_travel: injected {pairs} pairs ({} records)", out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profile_stage::ProfileGenerator, rng::RngBank};

    #[test]
    fn emits_two_records_per_pair_in_generation_order() {
        let config = GeneratorConfig::default_test();
        let bank = RngBank::new(config.seed);
        let profiles = ProfileGenerator::new(&config)
            .generate(&mut bank.for_stage(StageSlot::Profile))
            .unwrap();
        let records = ImpossibleTravelStage::new(config.clone())
            .generate(&profiles, &mut bank.for_stage(StageSlot::ImpossibleTravel))
            .unwrap();

        assert_eq!(records.len(), 10);
        for pair in records.chunks(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(a.user_id, b.user_id);
            assert_ne!(a.city, b.city);
            let gap = (b.timestamp - a.timestamp).num_minutes();
            assert!((2..=10).contains(&gap), "gap {gap} min out of range");
            assert!(a.amount >= 10.0 && a.amount <= 2_000.0);
        }
    }
}
