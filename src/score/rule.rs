//! Sub-metric rules.

use serde::{Deserialize, Serialize};

use crate::core::Observations;

/// Maps one observation to a bounded point value.
///
/// Every shape computes its raw formula first and clamps to `[0, budget]`
/// afterwards, so negative or huge inputs floor and cap correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubMetricRule {
    /// `round(count * per_unit)`.
    LinearCount {
        name: String,
        observation: String,
        budget: u32,
        per_unit: f64,
    },
    /// Full budget when the flag is set, `absent` points otherwise.
    Presence {
        name: String,
        observation: String,
        budget: u32,
        absent: u32,
    },
    /// `round(budget - penalty * count)`.
    InversePenalty {
        name: String,
        observation: String,
        budget: u32,
        penalty: f64,
    },
}

impl SubMetricRule {
    pub fn linear(name: &str, observation: &str, budget: u32, per_unit: f64) -> Self {
        Self::LinearCount {
            name: name.to_string(),
            observation: observation.to_string(),
            budget,
            per_unit,
        }
    }

    pub fn presence(name: &str, observation: &str, budget: u32, absent: u32) -> Self {
        Self::Presence {
            name: name.to_string(),
            observation: observation.to_string(),
            budget,
            absent,
        }
    }

    pub fn inverse(name: &str, observation: &str, budget: u32, penalty: f64) -> Self {
        Self::InversePenalty {
            name: name.to_string(),
            observation: observation.to_string(),
            budget,
            penalty,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::LinearCount { name, .. }
            | Self::Presence { name, .. }
            | Self::InversePenalty { name, .. } => name,
        }
    }

    pub fn observation(&self) -> &str {
        match self {
            Self::LinearCount { observation, .. }
            | Self::Presence { observation, .. }
            | Self::InversePenalty { observation, .. } => observation,
        }
    }

    pub fn budget(&self) -> u32 {
        match self {
            Self::LinearCount { budget, .. }
            | Self::Presence { budget, .. }
            | Self::InversePenalty { budget, .. } => *budget,
        }
    }

    /// Points awarded when the observation is missing.
    pub fn worst_case(&self) -> u32 {
        match self {
            Self::Presence { absent, .. } => *absent,
            Self::LinearCount { .. } | Self::InversePenalty { .. } => 0,
        }
    }

    /// Evaluate against an observation bag.
    ///
    /// Returns the points and whether the worst-case default was used.
    pub fn evaluate(&self, observations: &Observations) -> (u32, bool) {
        let budget = self.budget();
        let points = match self {
            Self::LinearCount { per_unit, .. } => observations
                .count(self.observation())
                .map(|count| clamp_points(count * per_unit, budget)),
            Self::Presence { absent, .. } => observations
                .flag(self.observation())
                .map(|present| if present { budget } else { (*absent).min(budget) }),
            Self::InversePenalty { penalty, .. } => observations
                .count(self.observation())
                .map(|count| clamp_points(f64::from(budget) - penalty * count, budget)),
        };

        match points {
            Some(points) => (points, false),
            None => (self.worst_case(), true),
        }
    }
}

/// Round half away from zero, then clamp into `[0, budget]`.
fn clamp_points(raw: f64, budget: u32) -> u32 {
    let rounded = raw.round();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else if rounded >= f64::from(budget) {
        budget
    } else {
        rounded as u32
    }
}
