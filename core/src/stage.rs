//! Stage trait and shared helpers.
//!
//! RULE: Every record-producing component implements GenerationStage.
//! A stage sees only the read-only profile population and its own RNG.
//! Stages never see each other's output; the assembler is the only join.

use crate::{
    error::{GenError, GenResult},
    profile_stage::UserProfile,
    record::TransactionRecord,
    rng::{StageRng, StageSlot},
    types::Timestamp,
};
use chrono::Duration;

/// The contract every record-producing stage must fulfill.
pub trait GenerationStage: Send + Sync {
    /// Stable slot; determines this stage's RNG stream.
    fn slot(&self) -> StageSlot;

    fn name(&self) -> &'static str {
        self.slot().name()
    }

    /// Produce this stage's records.
    ///
    /// - `profiles`: the full population, never empty
    /// - `rng`:      this stage's deterministic RNG
    fn generate(
        &self,
        profiles: &[UserProfile],
        rng: &mut StageRng,
    ) -> GenResult<Vec<TransactionRecord>>;
}

/// An empty Vec with room for `records`, or an error if the
/// allocator refuses. Oversized runs must fail, not truncate.
pub fn record_buffer<T>(records: usize) -> GenResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(records)
        .map_err(|_| GenError::Allocation { records })?;
    Ok(buf)
}

/// A whole-second timestamp uniform in [start, start + span_secs].
pub fn random_timestamp(start: Timestamp, span_secs: i64, rng: &mut StageRng) -> Timestamp {
    start + Duration::seconds(rng.int_inclusive(0, span_secs))
}
