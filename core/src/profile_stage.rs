use crate::{
    config::GeneratorConfig,
    error::{GenError, GenResult},
    rng::StageRng,
    stage::record_buffer,
    types::{round_to, UserId},
};
use serde::{Deserialize, Serialize};

/// An account holder. Spend parameters are drawn once and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id:      UserId,
    pub home_city:    String,
    pub home_country: String,
    pub home_lat:     f64,
    pub home_lon:     f64,
    pub avg_amount:   f64,
    pub std_amount:   f64,
}

pub struct ProfileGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ProfileGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Exactly `population.size` profiles, ids `USR-000000` upward.
    pub fn generate(&self, rng: &mut StageRng) -> GenResult<Vec<UserProfile>> {
        let pop = &self.config.population;
        let cities = &self.config.cities;
        if cities.is_empty() {
            return Err(GenError::Config("city catalog is empty".into()));
        }

        let mut profiles = record_buffer(pop.size)?;
        for i in 0..pop.size {
            let home = rng.pick(cities);
            let avg_amount = round_to(rng.uniform(pop.avg_spend_min, pop.avg_spend_max), 2);
            let fraction = rng.uniform(pop.std_fraction_min, pop.std_fraction_max);
            let std_amount = round_to(avg_amount * fraction, 2);

            profiles.push(UserProfile {
                user_id: format!("USR-{i:06}"),
                home_city: home.city.clone(),
                home_country: home.country.clone(),
                home_lat: home.lat,
                home_lon: home.lon,
                avg_amount,
                std_amount,
            });
        }

        log::info!("profile: generated {} user profiles", profiles.len());
        Ok(profiles)
    }
}
