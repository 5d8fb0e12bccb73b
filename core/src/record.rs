//! Output records and the transient batches injectors build them from.

use crate::{
    catalog::City,
    rng::StageRng,
    types::{round_to, Archetype, Timestamp, TxnId, UserId},
};
use serde::{Deserialize, Serialize};

/// No record may carry an amount below this.
pub const MIN_AMOUNT: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id:    TxnId,
    pub user_id:           UserId,
    pub timestamp:         Timestamp,
    pub amount:            f64,
    pub merchant_name:     String,
    pub merchant_category: String,
    pub city:              String,
    pub country:           String,
    pub latitude:          f64,
    pub longitude:         f64,
    pub is_fraud:          bool,
    pub fraud_type:        Option<Archetype>,
}

impl TransactionRecord {
    /// Ground truth holds by construction in every stage.
    /// A violation is a generator bug, so this panics rather than returning.
    pub fn assert_ground_truth(&self) {
        assert!(
            self.amount >= MIN_AMOUNT,
            "transaction {} has amount {} below floor {MIN_AMOUNT}",
            self.transaction_id, self.amount
        );
        assert_eq!(
            self.is_fraud,
            self.fraud_type.is_some(),
            "transaction {} has is_fraud={} but fraud_type={:?}",
            self.transaction_id, self.is_fraud, self.fraud_type
        );
    }

    /// Canonical output key: user, then time, then id for ties.
    pub fn sort_key(&self) -> (&str, Timestamp, &str) {
        (&self.user_id, self.timestamp, &self.transaction_id)
    }
}

/// Where a record happened. Coordinates are jittered around a city.
#[derive(Debug, Clone)]
pub struct Location {
    pub city:      String,
    pub country:   String,
    pub latitude:  f64,
    pub longitude: f64,
}

impl Location {
    /// `city`'s coordinates shifted by a uniform +/- `jitter_deg` offset.
    pub fn jittered(city: &City, jitter_deg: f64, rng: &mut StageRng) -> Self {
        Self::around(&city.city, &city.country, city.lat, city.lon, jitter_deg, rng)
    }

    pub fn around(
        city: &str,
        country: &str,
        lat: f64,
        lon: f64,
        jitter_deg: f64,
        rng: &mut StageRng,
    ) -> Self {
        let lat = lat + rng.uniform(-jitter_deg, jitter_deg);
        let lon = lon + rng.uniform(-jitter_deg, jitter_deg);
        Self {
            city: city.to_string(),
            country: country.to_string(),
            latitude: round_to(lat, 6),
            longitude: round_to(lon, 6),
        }
    }
}

/// One injected fraud event before it is flattened into records:
/// a travel pair, a velocity burst or a single drift outlier.
/// Never leaves the injector — the output has no batch id.
#[derive(Debug)]
pub struct InjectionBatch {
    pub archetype: Archetype,
    pub user_id:   UserId,
    pub base_ts:   Timestamp,
    records:       Vec<TransactionRecord>,
}

impl InjectionBatch {
    pub fn new(archetype: Archetype, user_id: UserId, base_ts: Timestamp) -> Self {
        Self { archetype, user_id, base_ts, records: Vec::new() }
    }

    /// Add one fraudulent record for this batch's user.
    pub fn push(
        &mut self,
        rng: &mut StageRng,
        timestamp: Timestamp,
        amount: f64,
        merchant_name: String,
        merchant_category: &str,
        location: Location,
    ) {
        self.records.push(TransactionRecord {
            transaction_id: rng.uuid().to_string(),
            user_id: self.user_id.clone(),
            timestamp,
            amount,
            merchant_name,
            merchant_category: merchant_category.to_string(),
            city: location.city,
            country: location.country,
            latitude: location.latitude,
            longitude: location.longitude,
            is_fraud: true,
            fraud_type: Some(self.archetype),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    fn legit() -> TransactionRecord {
        TransactionRecord {
            transaction_id: "t-1".into(),
            user_id: "USR-000001".into(),
            timestamp: Timestamp::default(),
            amount: 12.5,
            merchant_name: "Metro Grocery Co".into(),
            merchant_category: "Grocery".into(),
            city: "Paris".into(),
            country: "FR".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            is_fraud: false,
            fraud_type: None,
        }
    }

    #[test]
    fn legitimate_record_passes() {
        legit().assert_ground_truth();
    }

    #[test]
    #[should_panic(expected = "fraud_type")]
    fn tag_without_flag_panics() {
        let mut r = legit();
        r.fraud_type = Some(Archetype::BehavioralDrift);
        r.assert_ground_truth();
    }

    #[test]
    #[should_panic(expected = "below floor")]
    fn zero_amount_panics() {
        let mut r = legit();
        r.amount = 0.0;
        r.assert_ground_truth();
    }

    #[test]
    fn batch_records_share_user_and_tag() {
        let mut rng = RngBank::new(1).for_stage(StageSlot::VelocitySpike);
        let mut batch = InjectionBatch::new(
            Archetype::VelocitySpike,
            "USR-000009".into(),
            Timestamp::default(),
        );
        for _ in 0..3 {
            let loc = Location::around("Seoul", "KR", 37.5665, 126.978, 0.01, &mut rng);
            batch.push(&mut rng, Timestamp::default(), 1.0, "x".into(), "Online Shopping", loc);
        }
        assert_eq!(batch.len(), 3);
        let records = batch.into_records();
        assert!(records.iter().all(|r| r.user_id == "USR-000009"
            && r.is_fraud
            && r.fraud_type == Some(Archetype::VelocitySpike)));
        assert!(records.iter().all(|r| (r.latitude - 37.5665).abs() <= 0.01 + 1e-9));
    }
}
