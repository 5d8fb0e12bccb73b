//! Seeded randomness for the generation pipeline.
//!
//! A run has one master seed (`GeneratorConfig::seed`). The bank hands
//! every stage its own PCG stream keyed by the stage's slot, so a
//! stage's draws depend only on (seed, slot) and never on which thread
//! ran it or what the other stages drew. Slots are append-only: a new
//! stage takes the next index and existing datasets stay byte-identical.
//! No code in this crate touches `thread_rng` or any OS entropy source.

use rand::seq::{index, SliceRandom};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use uuid::Uuid;

/// A named, deterministic RNG for a single generation stage.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stage RNG from the master seed and a stable
    /// stage index. The index must never change once assigned.
    pub fn new(master_seed: u64, stage_index: u64) -> Self {
        let derived_seed = master_seed ^ (stage_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// 53 random mantissa bits scaled into [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Index in [0, n) via the high half of a 128-bit product,
    /// which keeps the bias below 2^-64 for any catalog size.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "cannot draw below zero");
        ((self.inner.next_u64() as u128 * n as u128) >> 64) as u64
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Roll an integer in [lo, hi], both ends included.
    pub fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Sample from a normal distribution (Box–Muller, one draw per call).
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick one element uniformly. Catalogs are validated non-empty
    /// before generation starts, so an empty slice is a defect.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "pick() from empty slice in stage '{}'", self.name);
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Uniform in-place shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// `amount` distinct indices from [0, length), in draw order.
    pub fn sample_distinct(&mut self, length: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.inner, length, amount.min(length)).into_vec()
    }

    /// A UUID v4 built from this stream, so identifiers are reproducible.
    pub fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// All stage RNGs for a single run, indexed by stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stage(&self, slot: StageSlot) -> StageRng {
        StageRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stage's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    Profile = 0,
    Legitimate = 1,
    ImpossibleTravel = 2,
    VelocitySpike = 3,
    BehavioralDrift = 4,
    Assembler = 5,
    // Add new stages here — append only.
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Legitimate => "legitimate",
            Self::ImpossibleTravel => "impossible_travel",
            Self::VelocitySpike => "velocity_spike",
            Self::BehavioralDrift => "behavioral_drift",
            Self::Assembler => "assembler",
        }
    }
}
