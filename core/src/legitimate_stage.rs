use crate::{
    config::GeneratorConfig,
    error::GenResult,
    name_generator::MerchantNameGenerator,
    profile_stage::UserProfile,
    record::{Location, TransactionRecord},
    rng::{StageRng, StageSlot},
    stage::{random_timestamp, record_buffer, GenerationStage},
    types::round_to,
};

/// Ordinary spending: each record drawn from its user's own distribution.
pub struct LegitimateStage {
    config: GeneratorConfig,
}

impl LegitimateStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn sample_one(&self, user: &UserProfile, rng: &mut StageRng) -> TransactionRecord {
        let cfg = &self.config.legitimate;
        let window = &self.config.window;

        let location = Location::around(
            &user.home_city,
            &user.home_country,
            user.home_lat,
            user.home_lon,
            cfg.jitter_deg,
            rng,
        );
        let amount = round_to(rng.normal(user.avg_amount, user.std_amount), 2)
            .max(cfg.amount_floor);
        let timestamp = random_timestamp(window.start, window.span_secs(), rng);

        TransactionRecord {
            transaction_id: rng.uuid().to_string(),
            user_id: user.user_id.clone(),
            timestamp,
            amount,
            merchant_name: MerchantNameGenerator::generate(rng),
            merchant_category: rng.pick(&self.config.merchant_categories).clone(),
            city: location.city,
            country: location.country,
            latitude: location.latitude,
            longitude: location.longitude,
            is_fraud: false,
            fraud_type: None,
        }
    }
}

impl GenerationStage for LegitimateStage {
    fn slot(&self) -> StageSlot {
        StageSlot::Legitimate
    }

    fn generate(
        &self,
        profiles: &[UserProfile],
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>> {
        let n = self.config.legitimate.count;
        let mut out = record_buffer(n)?;

        // Users drawn uniformly with replacement.
        for _ in 0..n {
            let user = rng.pick(profiles);
            out.push(self.sample_one(user, rng));
        }

        log::info!("legitimate: sampled {} transactions", out.len());
        Ok(out)
    }
}
