//! Deterministic merchant name generation from curated word lists.
//!
//! Every stage that emits records calls this with its own RNG,
//! so the same seed always yields the same merchant names.

use crate::rng::StageRng;

pub struct MerchantNameGenerator;

impl MerchantNameGenerator {
    /// "Prefix Trade Suffix" or "Surname Trade Suffix", half and half.
    pub fn generate(rng: &mut StageRng) -> String {
        let trade = rng.pick(Self::trades());
        let suffix = rng.pick(Self::suffixes());
        let lead = if rng.chance(0.5) {
            rng.pick(Self::prefixes())
        } else {
            rng.pick(Self::surnames())
        };
        format!("{lead} {trade} {suffix}")
    }

    fn prefixes() -> &'static [&'static str] {
        &[
            "Premier", "Elite", "First", "Superior", "Quality", "Metro",
            "City", "Valley", "Harbor", "Coastal", "Central", "United",
            "Northern", "Global", "Prime", "Golden", "Summit", "Urban",
            "Royal", "Blue", "Silver", "Pacific", "Atlantic", "Evergreen",
        ]
    }

    fn surnames() -> &'static [&'static str] {
        &[
            "Smith", "Johnson", "Garcia", "Miller", "Davis", "Martinez",
            "Nguyen", "Patel", "Kim", "Chen", "Okafor", "Silva",
            "Müller", "Rossi", "Dubois", "Tanaka", "Kowalski", "Ivanov",
            "Haddad", "Yilmaz", "Santos", "Singh", "Park", "Walker",
            "Hughes", "Reyes", "Fischer", "Moreau", "Sato", "Novak",
        ]
    }

    fn trades() -> &'static [&'static str] {
        &[
            "Grocers", "Bistro", "Fuel", "Outfitters", "Electronics",
            "Travel", "Pharmacy", "Books", "Hardware", "Apparel",
            "Motors", "Hotels", "Coffee", "Media", "Sports",
            "Home Goods", "Telecom", "Logistics", "Florist", "Supply",
        ]
    }

    fn suffixes() -> &'static [&'static str] {
        &[
            "LLC", "Inc", "Corp", "Co", "Group", "Ltd", "Partners",
            "Holdings", "Trading", "Market", "Store", "Brands",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    #[test]
    fn merchant_names_are_deterministic() {
        let mut a = RngBank::new(12345).for_stage(StageSlot::Legitimate);
        let mut b = RngBank::new(12345).for_stage(StageSlot::Legitimate);
        for _ in 0..20 {
            assert_eq!(
                MerchantNameGenerator::generate(&mut a),
                MerchantNameGenerator::generate(&mut b),
                "Same seed should produce same merchant"
            );
        }
    }

    #[test]
    fn merchant_names_have_three_parts() {
        let mut rng = RngBank::new(12345).for_stage(StageSlot::Legitimate);
        for _ in 0..100 {
            let name = MerchantNameGenerator::generate(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert!(parts.len() >= 3, "Merchant name should have at least 3 parts: {name}");
        }
    }
}
