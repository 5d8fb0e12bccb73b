//! The generation pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Profile generator        (once, output shared read-only)
//!   2. Legitimate sampler
//!   3. Impossible-travel injector
//!   4. Velocity-spike injector
//!   5. Behavioral-drift injector
//!   6. Assembler                (waits for 2–5)
//!
//! RULES:
//!   - Stages 2–5 read ONLY the profile population.
//!   - No stage sees another stage's records.
//!   - Every stage draws from its own RngBank slot, so running
//!     2–5 on separate threads yields the identical dataset.

use crate::{
    assembler::Assembler,
    behavioral_drift_stage::BehavioralDriftStage,
    config::GeneratorConfig,
    error::GenResult,
    impossible_travel_stage::ImpossibleTravelStage,
    legitimate_stage::LegitimateStage,
    profile_stage::{ProfileGenerator, UserProfile},
    record::TransactionRecord,
    rng::{RngBank, StageSlot},
    stage::GenerationStage,
    velocity_spike_stage::VelocitySpikeStage,
};

/// The two output artifacts of a run, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub seed:         u64,
    pub profiles:     Vec<UserProfile>,
    pub transactions: Vec<TransactionRecord>,
}

pub struct Pipeline {
    config:   GeneratorConfig,
    rng_bank: RngBank,
    stages:   Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// A pipeline with no stages registered. Validates the config.
    pub fn new(config: GeneratorConfig) -> GenResult<Self> {
        config.validate()?;
        Ok(Self {
            rng_bank: RngBank::new(config.seed),
            config,
            stages: Vec::new(),
        })
    }

    /// Build a fully wired pipeline with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: GeneratorConfig) -> GenResult<Self> {
        let mut pipeline = Pipeline::new(config)?;
        let cfg = pipeline.config.clone();

        // EXECUTION ORDER — fixed, documented, never reordered.
        pipeline.register(Box::new(LegitimateStage::new(cfg.clone())));
        pipeline.register(Box::new(ImpossibleTravelStage::new(cfg.clone())));
        pipeline.register(Box::new(VelocitySpikeStage::new(cfg.clone())));
        pipeline.register(Box::new(BehavioralDriftStage::new(cfg)));
        Ok(pipeline)
    }

    /// Register a stage. Each slot may appear once; a repeat would
    /// replay another stage's random stream.
    pub fn register(&mut self, stage: Box<dyn GenerationStage>) {
        assert!(
            self.stages.iter().all(|s| s.slot() != stage.slot()),
            "stage '{}' registered twice",
            stage.name()
        );
        assert_ne!(stage.slot(), StageSlot::Profile, "profile slot is reserved");
        assert_ne!(stage.slot(), StageSlot::Assembler, "assembler slot is reserved");
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run every stage on the calling thread, in registration order.
    pub fn run(&self) -> GenResult<Dataset> {
        let profiles = self.generate_profiles()?;

        let mut streams = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let mut rng = self.rng_bank.for_stage(stage.slot());
            streams.push(stage.generate(&profiles, &mut rng)?);
        }

        self.finish(profiles, streams)
    }

    /// Run each stage on its own scoped thread. Same output as run().
    pub fn run_parallel(&self) -> GenResult<Dataset> {
        let profiles = self.generate_profiles()?;

        let results: Vec<GenResult<Vec<TransactionRecord>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .stages
                .iter()
                .map(|stage| {
                    let profiles = &profiles;
                    let mut rng = self.rng_bank.for_stage(stage.slot());
                    scope.spawn(move || stage.generate(profiles, &mut rng))
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let streams = results.into_iter().collect::<GenResult<Vec<_>>>()?;
        self.finish(profiles, streams)
    }

    fn generate_profiles(&self) -> GenResult<Vec<UserProfile>> {
        let mut rng = self.rng_bank.for_stage(StageSlot::Profile);
        ProfileGenerator::new(&self.config).generate(&mut rng)
    }

    fn finish(
        &self,
        profiles: Vec<UserProfile>,
        streams: Vec<Vec<TransactionRecord>>,
    ) -> GenResult<Dataset> {
        for (stage, stream) in self.stages.iter().zip(&streams) {
            log::debug!("stage '{}' produced {} records", stage.name(), stream.len());
        }
        let mut rng = self.rng_bank.for_stage(StageSlot::Assembler);
        let transactions = Assembler::assemble(streams, &mut rng)?;
        Ok(Dataset {
            seed: self.rng_bank.master_seed(),
            profiles,
            transactions,
        })
    }
}
