//! Aggregation of principle scores into an overall score and grade.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Principle, PrincipleSet, Result};

/// Letter grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Step function over the overall score: 90/80/70/60 boundaries.
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            Grade::A
        } else if score >= 80 {
            Grade::B
        } else if score >= 70 {
            Grade::C
        } else if score >= 60 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate of one run's principle scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub overall_score: u32,
    pub grade: Grade,
    /// Keyed by principle, iterated in declaration order.
    pub principle_scores: BTreeMap<Principle, u32>,
}

/// Unweighted mean over a configured principle set.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    required: PrincipleSet,
}

impl Aggregator {
    pub fn new(required: PrincipleSet) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &PrincipleSet {
        &self.required
    }

    /// Combine a principle -> score map into an [`AssessmentResult`].
    ///
    /// Every required principle must be present. Scores for principles
    /// outside the required set are not part of the run and are ignored.
    pub fn aggregate(&self, scores: &HashMap<Principle, u32>) -> Result<AssessmentResult> {
        let mut principle_scores = BTreeMap::new();
        for principle in self.required.iter() {
            let score = *scores
                .get(&principle)
                .ok_or(Error::MissingPrinciple { principle })?;
            if score > 100 {
                return Err(Error::InvalidArgument(format!(
                    "score for {principle} is {score}, outside 0-100"
                )));
            }
            principle_scores.insert(principle, score);
        }

        for extra in scores.keys().filter(|p| !self.required.contains(**p)) {
            tracing::warn!("Ignoring score for {} (not in the configured principle set)", extra);
        }

        let overall_score = rounded_mean(principle_scores.values().copied());
        Ok(AssessmentResult {
            overall_score,
            grade: Grade::from_score(overall_score),
            principle_scores,
        })
    }
}

/// Integer mean rounded half up.
fn rounded_mean(scores: impl Iterator<Item = u32>) -> u32 {
    let (sum, count) = scores.fold((0u64, 0u64), |(sum, count), s| (sum + u64::from(s), count + 1));
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)) as u32
}
