use crate::{
    catalog::{
        default_cities, default_distant_pairs, default_drift_categories,
        default_merchant_categories, City, DistantPair, VELOCITY_CATEGORY,
    },
    error::{GenError, GenResult},
    impossible_travel_stage::MAX_GAP_MINUTES,
    record::MIN_AMOUNT,
    types::Timestamp,
    velocity_spike_stage::MIN_BURST_SIZE,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hard ceiling on total records, so an oversized config fails
/// up front instead of exhausting memory half-way through a run.
pub const DEFAULT_MAX_RECORDS: u64 = 50_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub size: usize,
    pub avg_spend_min: f64,
    pub avg_spend_max: f64,
    /// Standard deviation as a fraction of the user's average spend.
    pub std_fraction_min: f64,
    pub std_fraction_max: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 5_000,
            avg_spend_min: 20.0,
            avg_spend_max: 500.0,
            std_fraction_min: 0.15,
            std_fraction_max: 0.40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegitimateConfig {
    pub count: usize,
    pub amount_floor: f64,
    /// Uniform +/- offset in degrees applied to home coordinates.
    pub jitter_deg: f64,
}

impl Default for LegitimateConfig {
    fn default() -> Self {
        Self { count: 1_050_000, amount_floor: 0.50, jitter_deg: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpossibleTravelConfig {
    pub pairs: usize,
    pub gap_minutes_min: i64,
    pub gap_minutes_max: i64,
    pub amount_min: f64,
    pub amount_max: f64,
    pub jitter_deg: f64,
}

impl Default for ImpossibleTravelConfig {
    fn default() -> Self {
        Self {
            pairs: 2_500,
            gap_minutes_min: 2,
            gap_minutes_max: 10,
            amount_min: 10.0,
            amount_max: 2_000.0,
            jitter_deg: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocitySpikeConfig {
    /// Users receiving one burst each, drawn without replacement.
    pub users: usize,
    pub burst_min: usize,
    pub burst_max: usize,
    /// Largest offset from the burst's base timestamp; must stay under 60.
    pub offset_max_secs: i64,
    pub amount_min: f64,
    pub amount_max: f64,
    pub jitter_deg: f64,
    pub category: String,
}

impl Default for VelocitySpikeConfig {
    fn default() -> Self {
        Self {
            users: 500,
            burst_min: 10,
            burst_max: 20,
            offset_max_secs: 55,
            amount_min: 0.01,
            amount_max: 2.00,
            jitter_deg: 0.01,
            category: VELOCITY_CATEGORY.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralDriftConfig {
    pub count: usize,
    pub sigma_multiplier_min: f64,
    pub sigma_multiplier_max: f64,
    /// Drifted amounts never fall below this, whatever the user's variance.
    pub amount_floor: f64,
    pub jitter_deg: f64,
    pub categories: Vec<String>,
}

impl Default for BehavioralDriftConfig {
    fn default() -> Self {
        Self {
            count: 3_000,
            sigma_multiplier_min: 3.5,
            sigma_multiplier_max: 8.0,
            amount_floor: 500.0,
            jitter_deg: 0.3,
            categories: default_drift_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Legitimate timestamps fall in [start, end].
    pub start: Timestamp,
    pub end: Timestamp,
    /// Injected batches draw their base timestamp from
    /// [start, start + injection_days].
    pub injection_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: ymd(2025, 1, 1),
            end: ymd(2025, 12, 31),
            injection_days: 364,
        }
    }
}

impl WindowConfig {
    pub fn span_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    pub fn injection_span_secs(&self) -> i64 {
        chrono::Duration::days(self.injection_days).num_seconds()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub max_records: u64,
    pub window: WindowConfig,
    pub population: PopulationConfig,
    pub legitimate: LegitimateConfig,
    pub impossible_travel: ImpossibleTravelConfig,
    pub velocity_spike: VelocitySpikeConfig,
    pub behavioral_drift: BehavioralDriftConfig,
    pub cities: Vec<City>,
    pub distant_pairs: Vec<DistantPair>,
    pub merchant_categories: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_records: DEFAULT_MAX_RECORDS,
            window: WindowConfig::default(),
            population: PopulationConfig::default(),
            legitimate: LegitimateConfig::default(),
            impossible_travel: ImpossibleTravelConfig::default(),
            velocity_spike: VelocitySpikeConfig::default(),
            behavioral_drift: BehavioralDriftConfig::default(),
            cities: default_cities(),
            distant_pairs: default_distant_pairs(),
            merchant_categories: default_merchant_categories(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    /// Unreadable or malformed files surface as `GenError::Other`.
    /// In tests, use GeneratorConfig::default_test().
    pub fn load(path: &str) -> GenResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GeneratorConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small population and counts for fast unit and integration tests.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.population.size = 100;
        config.legitimate.count = 1_000;
        config.impossible_travel.pairs = 5;
        config.velocity_spike.users = 5;
        config.behavioral_drift.count = 5;
        config
    }

    /// Velocity bursts are drawn without replacement, so they
    /// can never exceed the population.
    pub fn effective_velocity_users(&self) -> usize {
        self.velocity_spike.users.min(self.population.size)
    }

    /// Largest number of records this config can produce.
    /// `None` on arithmetic overflow.
    pub fn max_planned_records(&self) -> Option<u64> {
        let legit = self.legitimate.count as u64;
        let travel = (self.impossible_travel.pairs as u64).checked_mul(2)?;
        let bursts = (self.effective_velocity_users() as u64)
            .checked_mul(self.velocity_spike.burst_max as u64)?;
        let drift = self.behavioral_drift.count as u64;
        legit.checked_add(travel)?.checked_add(bursts)?.checked_add(drift)
    }

    /// Reject anything that would make generation ill-defined.
    /// Runs before any stage draws a single random number.
    pub fn validate(&self) -> GenResult<()> {
        let err = |msg: String| Err(GenError::Config(msg));

        if self.population.size == 0 {
            return err("population size must be > 0".into());
        }
        for (name, count) in [
            ("legitimate.count", self.legitimate.count),
            ("impossible_travel.pairs", self.impossible_travel.pairs),
            ("velocity_spike.users", self.velocity_spike.users),
            ("behavioral_drift.count", self.behavioral_drift.count),
        ] {
            if count == 0 {
                return err(format!("{name} must be > 0"));
            }
        }

        if self.cities.is_empty() {
            return err("city catalog is empty".into());
        }
        if self.distant_pairs.is_empty() {
            return err("distant-pair catalog is empty".into());
        }
        if self.merchant_categories.is_empty() {
            return err("merchant-category catalog is empty".into());
        }
        if self.behavioral_drift.categories.is_empty() {
            return err("behavioral_drift.categories is empty".into());
        }
        for (i, pair) in self.distant_pairs.iter().enumerate() {
            if pair.from >= self.cities.len() || pair.to >= self.cities.len() {
                return err(format!(
                    "distant pair {i} ({}, {}) refers outside the {}-city catalog",
                    pair.from, pair.to, self.cities.len()
                ));
            }
            if pair.from == pair.to {
                return err(format!("distant pair {i} uses the same city twice"));
            }
        }

        let p = &self.population;
        if !(p.avg_spend_min > 0.0 && p.avg_spend_min <= p.avg_spend_max) {
            return err("population avg spend range must be positive and ordered".into());
        }
        if !(p.std_fraction_min > 0.0 && p.std_fraction_min <= p.std_fraction_max) {
            return err("population std fraction range must be positive and ordered".into());
        }

        if self.window.start >= self.window.end {
            return err("window.start must precede window.end".into());
        }
        // Checked in whole days first so Duration::days never overflows.
        let window_days = (self.window.end - self.window.start).num_days();
        if !(1..=window_days).contains(&self.window.injection_days) {
            return err(format!(
                "window.injection_days must be in [1, {window_days}] to stay inside the window"
            ));
        }

        if self.legitimate.amount_floor < MIN_AMOUNT {
            return err(format!("legitimate.amount_floor must be >= {MIN_AMOUNT}"));
        }

        let t = &self.impossible_travel;
        if !(1 <= t.gap_minutes_min
            && t.gap_minutes_min <= t.gap_minutes_max
            && t.gap_minutes_max <= MAX_GAP_MINUTES)
        {
            return err(format!(
                "impossible_travel gap range must be ordered within [1, {MAX_GAP_MINUTES}] minutes"
            ));
        }
        if !(t.amount_min >= MIN_AMOUNT && t.amount_min <= t.amount_max) {
            return err(format!(
                "impossible_travel amount range must be ordered with amount_min >= {MIN_AMOUNT}"
            ));
        }

        let v = &self.velocity_spike;
        if v.burst_min < MIN_BURST_SIZE || v.burst_min > v.burst_max {
            return err(format!(
                "velocity_spike burst range must be ordered with burst_min >= {MIN_BURST_SIZE}"
            ));
        }
        if !(0..60).contains(&v.offset_max_secs) {
            return err("velocity_spike.offset_max_secs must be in [0, 60)".into());
        }
        if !(v.amount_min >= MIN_AMOUNT && v.amount_min <= v.amount_max) {
            return err(format!(
                "velocity_spike amount range must be ordered with amount_min >= {MIN_AMOUNT}"
            ));
        }
        if v.category.is_empty() {
            return err("velocity_spike.category is empty".into());
        }

        let d = &self.behavioral_drift;
        if !(d.sigma_multiplier_min > 3.0 && d.sigma_multiplier_min <= d.sigma_multiplier_max) {
            return err("behavioral_drift sigma multiplier range must be ordered and above 3".into());
        }
        if d.amount_floor < MIN_AMOUNT {
            return err(format!("behavioral_drift.amount_floor must be >= {MIN_AMOUNT}"));
        }

        match self.max_planned_records() {
            None => Err(GenError::CapacityExceeded {
                requested: u64::MAX,
                limit: self.max_records,
            }),
            Some(n) if n > self.max_records => Err(GenError::CapacityExceeded {
                requested: n,
                limit: self.max_records,
            }),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        GeneratorConfig::default().validate().unwrap();
        GeneratorConfig::default_test().validate().unwrap();
    }

    #[test]
    fn default_upper_bound_matches_counts() {
        let c = GeneratorConfig::default();
        assert_eq!(
            c.max_planned_records(),
            Some(1_050_000 + 2 * 2_500 + 500 * 20 + 3_000)
        );
    }

    #[test]
    fn velocity_users_clamp_to_population() {
        let mut c = GeneratorConfig::default_test();
        c.velocity_spike.users = 1_000;
        assert_eq!(c.effective_velocity_users(), 100);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let c: GeneratorConfig =
            serde_json::from_str(r#"{ "seed": 7, "population": { "size": 12 } }"#).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.population.size, 12);
        assert_eq!(c.population.avg_spend_max, 500.0);
        assert_eq!(c.cities.len(), 20);
        assert_eq!(c.window.start, ymd(2025, 1, 1));
    }

    #[test]
    fn default_injection_days_fill_the_window() {
        let w = WindowConfig::default();
        assert_eq!(w.injection_days, (w.end - w.start).num_days());
        assert_eq!(w.injection_span_secs(), w.span_secs());
    }
}
