//! Shared primitive types used across the entire generator.

use serde::{Deserialize, Serialize};

/// A stable, unique user identifier (`USR-000042`).
pub type UserId = String;

/// A globally unique transaction identifier (UUID v4 string).
pub type TxnId = String;

/// Timestamps are naive wall-clock date-times; the output carries no zone.
pub type Timestamp = chrono::NaiveDateTime;

/// The three designed fraud patterns.
/// Variant order is part of the output contract — append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    ImpossibleTravel,
    VelocitySpike,
    BehavioralDrift,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [
        Archetype::ImpossibleTravel,
        Archetype::VelocitySpike,
        Archetype::BehavioralDrift,
    ];

    /// The tag written to the `fraud_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImpossibleTravel => "impossible_travel",
            Self::VelocitySpike    => "velocity_spike",
            Self::BehavioralDrift  => "behavioral_drift",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == tag)
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to `places` decimal places, matching the output precision
/// of amounts (2) and coordinates (6).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
