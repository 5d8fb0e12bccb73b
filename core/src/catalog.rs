//! Built-in reference catalogs: cities, distant city pairs, merchant categories.
//!
//! These are the defaults for GeneratorConfig. A run may replace any of
//! them from its JSON config; validation happens in config.rs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city:    String,
    pub country: String,
    pub lat:     f64,
    pub lon:     f64,
}

impl City {
    fn new(city: &str, country: &str, lat: f64, lon: f64) -> Self {
        Self { city: city.into(), country: country.into(), lat, lon }
    }
}

/// Two catalog cities far enough apart that a few minutes between
/// card-present transactions is physically impossible.
///
/// `separation_km` is the declared great-circle distance. The generator
/// never reads it; it documents the pair for consumers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistantPair {
    pub from:          usize,
    pub to:            usize,
    pub separation_km: f64,
}

pub const VELOCITY_CATEGORY: &str = "Online Shopping";

pub fn default_cities() -> Vec<City> {
    vec![
        City::new("New York",    "US",  40.7128,  -74.0060),
        City::new("London",      "GB",  51.5074,   -0.1278),
        City::new("Tokyo",       "JP",  35.6762,  139.6503),
        City::new("Sydney",      "AU", -33.8688,  151.2093),
        City::new("São Paulo",   "BR", -23.5505,  -46.6333),
        City::new("Mumbai",      "IN",  19.0760,   72.8777),
        City::new("Dubai",       "AE",  25.2048,   55.2708),
        City::new("Singapore",   "SG",   1.3521,  103.8198),
        City::new("Toronto",     "CA",  43.6532,  -79.3832),
        City::new("Berlin",      "DE",  52.5200,   13.4050),
        City::new("Paris",       "FR",  48.8566,    2.3522),
        City::new("Lagos",       "NG",   6.5244,    3.3792),
        City::new("Mexico City", "MX",  19.4326,  -99.1332),
        City::new("Seoul",       "KR",  37.5665,  126.9780),
        City::new("Chicago",     "US",  41.8781,  -87.6298),
        City::new("Los Angeles", "US",  34.0522, -118.2437),
        City::new("Shanghai",    "CN",  31.2304,  121.4737),
        City::new("Moscow",      "RU",  55.7558,   37.6173),
        City::new("Cairo",       "EG",  30.0444,   31.2357),
        City::new("Istanbul",    "TR",  41.0082,   28.9784),
    ]
}

/// Indices refer to `default_cities()`.
pub fn default_distant_pairs() -> Vec<DistantPair> {
    let pair = |from, to, separation_km| DistantPair { from, to, separation_km };
    vec![
        pair(0, 1,   5_570.0), // New York <-> London
        pair(0, 2,  10_850.0), // New York <-> Tokyo
        pair(1, 3,  16_990.0), // London <-> Sydney
        pair(2, 4,  18_530.0), // Tokyo <-> São Paulo
        pair(5, 6,   1_930.0), // Mumbai <-> Dubai, the closest pair
        pair(7, 3,   6_300.0), // Singapore <-> Sydney
        pair(0, 15,  3_940.0), // New York <-> Los Angeles
        pair(1, 16,  9_220.0), // London <-> Shanghai
    ]
}

pub fn default_merchant_categories() -> Vec<String> {
    [
        "Grocery", "Restaurant", "Gas Station", "Online Shopping",
        "Electronics", "Travel", "Entertainment", "Healthcare",
        "Utilities", "Clothing", "Hotel", "ATM Withdrawal",
        "Wire Transfer", "Subscription", "Insurance",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// High-value categories a drifted account is pushed toward.
pub fn default_drift_categories() -> Vec<String> {
    ["Wire Transfer", "Electronics", "Travel", "Online Shopping"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_indices_are_in_range() {
        let cities = default_cities();
        for p in default_distant_pairs() {
            assert!(p.from < cities.len() && p.to < cities.len());
            assert_ne!(p.from, p.to);
        }
    }

    #[test]
    fn drift_categories_are_known_merchant_categories() {
        let all = default_merchant_categories();
        for c in default_drift_categories() {
            assert!(all.contains(&c), "unknown drift category {c}");
        }
        assert!(all.iter().any(|c| c == VELOCITY_CATEGORY));
    }
}
