//! The single join point.
//!
//! Merges every stage's stream, shuffles so construction order cannot
//! leak downstream, then sorts into canonical (user, timestamp) order.
//! Ties are broken by transaction id, which makes the final order a
//! pure function of the records themselves.

use crate::{
    error::GenResult,
    record::TransactionRecord,
    rng::StageRng,
    stage::record_buffer,
};

pub struct Assembler;

impl Assembler {
    pub fn assemble(
        streams: Vec<Vec<TransactionRecord>>,
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>> {
        let total: usize = streams.iter().map(Vec::len).sum();
        let mut merged = record_buffer(total)?;
        for stream in streams {
            merged.extend(stream);
        }

        rng.shuffle(&mut merged);
        merged.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        assert_eq!(merged.len(), total, "assembler lost or duplicated records");
        for record in &merged {
            record.assert_ground_truth();
        }
        assert!(
            merged.windows(2).all(|w| w[0].transaction_id != w[1].transaction_id),
            "assembler emitted a duplicate transaction"
        );

        log::info!("assembler: {total} records in canonical order");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rng::{RngBank, StageSlot},
        types::{Archetype, Timestamp},
    };
    use chrono::Duration;

    fn rec(id: &str, user: &str, secs: i64, fraud: Option<Archetype>) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.into(),
            user_id: user.into(),
            timestamp: Timestamp::default() + Duration::seconds(secs),
            amount: 5.0,
            merchant_name: "m".into(),
            merchant_category: "Grocery".into(),
            city: "Lagos".into(),
            country: "NG".into(),
            latitude: 6.5244,
            longitude: 3.3792,
            is_fraud: fraud.is_some(),
            fraud_type: fraud,
        }
    }

    #[test]
    fn order_is_independent_of_shuffle_seed() {
        let streams = || {
            vec![
                vec![rec("c", "USR-000002", 10, None), rec("a", "USR-000001", 50, None)],
                vec![
                    rec("d", "USR-000001", 10, Some(Archetype::VelocitySpike)),
                    rec("b", "USR-000001", 10, Some(Archetype::VelocitySpike)),
                ],
            ]
        };
        let one = Assembler::assemble(streams(), &mut RngBank::new(1).for_stage(StageSlot::Assembler)).unwrap();
        let two = Assembler::assemble(streams(), &mut RngBank::new(2).for_stage(StageSlot::Assembler)).unwrap();
        assert_eq!(one, two);

        let ids: Vec<&str> = one.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a", "c"]);
    }

    #[test]
    #[should_panic(expected = "fraud_type")]
    fn malformed_record_fails_loudly() {
        let mut bad = rec("x", "USR-000001", 0, None);
        bad.is_fraud = true;
        let _ = Assembler::assemble(vec![vec![bad]], &mut RngBank::new(1).for_stage(StageSlot::Assembler));
    }

    #[test]
    #[should_panic(expected = "duplicate")]
    fn duplicated_record_fails_loudly() {
        let r = rec("x", "USR-000001", 0, None);
        let _ = Assembler::assemble(vec![vec![r.clone()], vec![r]], &mut RngBank::new(1).for_stage(StageSlot::Assembler));
    }
}
