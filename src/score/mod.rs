//! Principle scorer.
//!
//! Applies a principle's ordered sub-metric rules to an observation bag and
//! sums the clamped points into a 0-100 principle score.

mod rule;
mod table;

pub use rule::SubMetricRule;
pub use table::{PrincipleRules, RuleTable, PRINCIPLE_BUDGET};

use serde::{Deserialize, Serialize};

use crate::core::{Error, Observations, Principle, PrincipleSet, Result};

/// Scorer driven by a rule table.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    table: RuleTable,
}

impl Scorer {
    /// Scorer over the built-in rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer over a custom table, validated first.
    pub fn with_table(table: RuleTable) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Score one principle.
    ///
    /// Missing observations never fail: the affected rule contributes its
    /// worst-case points. Only a principle absent from the table is an error.
    pub fn score(&self, principle: Principle, observations: &Observations) -> Result<PrincipleScore> {
        let rules = self.table.rules_for(principle).ok_or_else(|| {
            Error::config(format!(
                "rule table has no rules for principle '{}'",
                principle.key()
            ))
        })?;

        let sub_metrics: Vec<SubMetricScore> = rules
            .iter()
            .map(|rule| {
                let (points, defaulted) = rule.evaluate(observations);
                if defaulted {
                    tracing::debug!(
                        "{}: observation '{}' missing, '{}' defaults to {} points",
                        principle,
                        rule.observation(),
                        rule.name(),
                        points
                    );
                }
                SubMetricScore {
                    name: rule.name().to_string(),
                    observation: rule.observation().to_string(),
                    points,
                    budget: rule.budget(),
                    defaulted,
                }
            })
            .collect();

        let total: u32 = sub_metrics.iter().map(|m| m.points).sum();
        Ok(PrincipleScore {
            principle,
            score: total.min(PRINCIPLE_BUDGET),
            sub_metrics,
        })
    }

    /// Score every principle of `set`, in declaration order.
    pub fn score_all(
        &self,
        set: &PrincipleSet,
        observations: &Observations,
    ) -> Result<Vec<PrincipleScore>> {
        set.iter()
            .map(|principle| self.score(principle, observations))
            .collect()
    }
}

/// Score for one principle in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipleScore {
    pub principle: Principle,
    pub score: u32,
    pub sub_metrics: Vec<SubMetricScore>,
}

impl PrincipleScore {
    /// Names of observations that were missing and defaulted.
    pub fn defaulted_observations(&self) -> impl Iterator<Item = &str> {
        self.sub_metrics
            .iter()
            .filter(|m| m.defaulted)
            .map(|m| m.observation.as_str())
    }
}

/// Points awarded by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubMetricScore {
    pub name: String,
    pub observation: String,
    pub points: u32,
    pub budget: u32,
    pub defaulted: bool,
}
