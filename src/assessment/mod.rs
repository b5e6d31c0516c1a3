//! Assessment pipeline: scorer -> aggregator -> recommendation generator.
//!
//! Each run is a pure function of its observation bag. An [`Assessor`] holds
//! only immutable, validated configuration and can be shared across threads.

mod aggregate;
mod recommend;

pub use aggregate::{Aggregator, AssessmentResult, Grade};
pub use recommend::{default_advice, Priority, Recommendation, RecommendationGenerator, Thresholds};

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::{Observations, Principle, PrincipleSet, Result};
use crate::score::{PrincipleScore, RuleTable, Scorer};

/// Output of one assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub recommendations: Vec<Recommendation>,
    /// Per-rule detail, present only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<PrincipleScore>>,
}

/// Validated assessment setup.
#[derive(Debug, Clone)]
pub struct Assessor {
    scorer: Scorer,
    aggregator: Aggregator,
    recommender: RecommendationGenerator,
    breakdown: bool,
}

impl Default for Assessor {
    fn default() -> Self {
        Self {
            scorer: Scorer::new(),
            aggregator: Aggregator::new(PrincipleSet::full()),
            recommender: RecommendationGenerator::default(),
            breakdown: false,
        }
    }
}

impl Assessor {
    /// Build an assessor, rejecting any configuration problem up-front.
    pub fn new(
        table: RuleTable,
        set: PrincipleSet,
        thresholds: Thresholds,
        advice: HashMap<Principle, String>,
    ) -> Result<Self> {
        table.ensure_covers(&set)?;
        let scorer = Scorer::with_table(table)?;
        let recommender = RecommendationGenerator::new(&set, thresholds, advice)?;
        Ok(Self {
            scorer,
            aggregator: Aggregator::new(set),
            recommender,
            breakdown: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.rule_table()?,
            config.principle_set()?,
            config.thresholds,
            config.advice_overrides()?,
        )?
        .with_breakdown(config.output.breakdown))
    }

    /// Include per-rule detail in every [`Assessment`].
    pub fn with_breakdown(mut self, breakdown: bool) -> Self {
        self.breakdown = breakdown;
        self
    }

    pub fn principles(&self) -> &PrincipleSet {
        self.aggregator.required()
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn thresholds(&self) -> Thresholds {
        self.recommender.thresholds()
    }

    /// Assess one subject.
    pub fn assess(&self, subject: Option<&str>, observations: &Observations) -> Result<Assessment> {
        let start = Instant::now();

        let scores = self.scorer.score_all(self.principles(), observations)?;
        let by_principle: HashMap<Principle, u32> =
            scores.iter().map(|s| (s.principle, s.score)).collect();
        let result = self.aggregator.aggregate(&by_principle)?;
        let recommendations = self.recommender.recommend(&result)?;

        let defaulted: usize = scores.iter().map(|s| s.defaulted_observations().count()).sum();
        tracing::info!(
            "Assessment of {} completed in {:?}: score {} (grade {}), {} recommendations, {} defaulted sub-metrics",
            subject.unwrap_or("subject"),
            start.elapsed(),
            result.overall_score,
            result.grade,
            recommendations.len(),
            defaulted
        );

        Ok(Assessment {
            subject: subject.map(str::to_string),
            result,
            recommendations,
            breakdown: self.breakdown.then_some(scores),
        })
    }

    /// Assess independent subjects in parallel. Output order matches input.
    pub fn assess_batch(&self, subjects: &[(String, Observations)]) -> Result<Vec<Assessment>> {
        subjects
            .par_iter()
            .map(|(subject, observations)| self.assess(Some(subject), observations))
            .collect()
    }
}

/// Summary over a batch of assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub subjects: usize,
    pub mean_overall_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest: Option<LowestSubject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestSubject {
    pub subject: String,
    pub overall_score: u32,
    pub grade: Grade,
}

impl BatchSummary {
    pub fn from_assessments(assessments: &[Assessment]) -> Self {
        let total: u64 = assessments
            .iter()
            .map(|a| u64::from(a.result.overall_score))
            .sum();
        let mean_overall_score = if assessments.is_empty() {
            0.0
        } else {
            total as f64 / assessments.len() as f64
        };
        // First minimum wins, so ties resolve to input order.
        let lowest = assessments
            .iter()
            .fold(None::<&Assessment>, |low, a| match low {
                Some(l) if l.result.overall_score <= a.result.overall_score => Some(l),
                _ => Some(a),
            })
            .map(|a| LowestSubject {
                subject: a.subject.clone().unwrap_or_default(),
                overall_score: a.result.overall_score,
                grade: a.result.grade,
            });
        Self {
            subjects: assessments.len(),
            mean_overall_score,
            lowest,
        }
    }
}
