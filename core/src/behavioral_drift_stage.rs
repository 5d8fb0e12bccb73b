//! Behavioral-drift injection: one far outlier per trial.
//!
//! The amount sits between 3.5 and 8 of the user's own standard
//! deviations above their mean, and never below a fixed floor so
//! low-variance users still produce a visibly large charge.

use crate::{
    config::GeneratorConfig,
    error::GenResult,
    name_generator::MerchantNameGenerator,
    profile_stage::UserProfile,
    record::{InjectionBatch, Location, TransactionRecord},
    rng::{StageRng, StageSlot},
    stage::{random_timestamp, record_buffer, GenerationStage},
    types::{round_to, Archetype},
};

pub struct BehavioralDriftStage {
    config: GeneratorConfig,
}

impl BehavioralDriftStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// mean + k * std with k in [sigma_min, sigma_max], floored.
    pub fn drift_amount(&self, user: &UserProfile, rng: &mut StageRng) -> f64 {
        let cfg = &self.config.behavioral_drift;
        let k = rng.uniform(cfg.sigma_multiplier_min, cfg.sigma_multiplier_max);
        round_to(user.avg_amount + k * user.std_amount, 2).max(cfg.amount_floor)
    }

    fn build_outlier(&self, user: &UserProfile, rng: &mut StageRng) -> InjectionBatch {
        let cfg = &self.config.behavioral_drift;
        let amount = self.drift_amount(user, rng);
        let timestamp = random_timestamp(
            self.config.window.start,
            self.config.window.injection_span_secs(),
            rng,
        );
        let location = Location::around(
            &user.home_city,
            &user.home_country,
            user.home_lat,
            user.home_lon,
            cfg.jitter_deg,
            rng,
        );
        let merchant = MerchantNameGenerator::generate(rng);
        let category = rng.pick(&cfg.categories).clone();

        let mut batch = InjectionBatch::new(Archetype::BehavioralDrift, user.user_id.clone(), timestamp);
        batch.push(rng, timestamp, amount, merchant, &category, location);
        batch
    }
}

impl GenerationStage for BehavioralDriftStage {
    fn slot(&self) -> StageSlot {
        StageSlot::BehavioralDrift
    }

    fn generate(
        &self,
        profiles: &[UserProfile],
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>> {
        let n = self.config.behavioral_drift.count;
        let mut out = record_buffer(n)?;

        for _ in 0..n {
            let user = rng.pick(profiles);
            out.extend(self.build_outlier(user, rng).into_records());
        }

        log::info!("behavioral_drift: injected {} outliers", out.len());
        Ok(out)
    }
}
