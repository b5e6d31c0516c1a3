//! Recommendation generation for principles below the acceptable score.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::aggregate::AssessmentResult;
use crate::core::{Error, Principle, PrincipleSet, Result};

/// Severity bucket of a recommendation. Ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score thresholds for the priority ladder.
///
/// `score < critical` is Critical, `score < high` is High, and anything else
/// below `acceptable` is Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub acceptable: u32,
    pub critical: u32,
    pub high: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            acceptable: 70,
            critical: 40,
            high: 50,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        if self.critical < self.high && self.high < self.acceptable && self.acceptable <= 100 {
            Ok(())
        } else {
            Err(Error::config(format!(
                "thresholds must satisfy critical < high < acceptable <= 100 (got {}/{}/{})",
                self.critical, self.high, self.acceptable
            )))
        }
    }

    /// Priority for a score, or `None` when the score is acceptable.
    pub fn priority(&self, score: u32) -> Option<Priority> {
        if score >= self.acceptable {
            None
        } else if score < self.critical {
            Some(Priority::Critical)
        } else if score < self.high {
            Some(Priority::High)
        } else {
            Some(Priority::Medium)
        }
    }
}

/// Built-in advice for a principle.
pub fn default_advice(principle: Principle) -> &'static str {
    match principle {
        Principle::Observability => {
            "Add data-test attributes and ARIA labels to key elements and surface status messages so tests can read application state"
        }
        Principle::Controllability => {
            "Expose state through URL parameters, local storage or a reset mechanism so tests can put the page into known states directly"
        }
        Principle::AlgorithmicSimplicity => {
            "Reduce DOM size and nesting depth and keep primary actions few and explicit"
        }
        Principle::AlgorithmicTransparency => {
            "Use semantic HTML elements, label every input and make state changes visible on the page"
        }
        Principle::AlgorithmicStability => {
            "Eliminate console errors, shorten page load time and keep layout stable between loads"
        }
        Principle::Explainability => {
            "Provide clear error messages, help text and tooltips, and link to documentation for complex flows"
        }
        Principle::Unbugginess => {
            "Fix console errors and warnings, broken images and failed network requests"
        }
        Principle::Smallness => {
            "Trim the page: fewer elements, scripts and stylesheets per view"
        }
        Principle::Decomposability => {
            "Split the page into identifiable components, forms and landmark regions that can be tested in isolation"
        }
        Principle::Similarity => {
            "Align button styles, repeated structures and naming conventions so the same test patterns apply across pages"
        }
    }
}

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub principle: Principle,
    pub priority: Priority,
    pub advice: String,
    pub rationale: String,
}

/// Generates at most one recommendation per below-threshold principle.
#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    thresholds: Thresholds,
    advice: HashMap<Principle, String>,
}

impl Default for RecommendationGenerator {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            advice: Principle::ALL
                .into_iter()
                .map(|p| (p, default_advice(p).to_string()))
                .collect(),
        }
    }
}

impl RecommendationGenerator {
    /// Build a generator, checking thresholds and that every principle in
    /// `set` has non-empty advice. `overrides` replaces built-in advice.
    pub fn new(
        set: &PrincipleSet,
        thresholds: Thresholds,
        overrides: HashMap<Principle, String>,
    ) -> Result<Self> {
        thresholds.validate()?;
        let mut advice: HashMap<Principle, String> = Principle::ALL
            .into_iter()
            .map(|p| (p, default_advice(p).to_string()))
            .collect();
        advice.extend(overrides);
        Self::from_parts(set, thresholds, advice)
    }

    /// Build from an explicit advice table with no built-in fallback.
    pub fn from_parts(
        set: &PrincipleSet,
        thresholds: Thresholds,
        advice: HashMap<Principle, String>,
    ) -> Result<Self> {
        thresholds.validate()?;
        for principle in set.iter() {
            match advice.get(&principle) {
                Some(text) if !text.trim().is_empty() => {}
                _ => return Err(Error::MissingAdvice { principle }),
            }
        }
        Ok(Self { thresholds, advice })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Recommendations for `result`, most severe first, ties in principle
    /// declaration order.
    pub fn recommend(&self, result: &AssessmentResult) -> Result<Vec<Recommendation>> {
        let mut recommendations = Vec::new();
        // BTreeMap iteration is declaration order; the stable sort below keeps it within a bucket.
        for (&principle, &score) in &result.principle_scores {
            let Some(priority) = self.thresholds.priority(score) else {
                continue;
            };
            let advice = self
                .advice
                .get(&principle)
                .filter(|text| !text.trim().is_empty())
                .ok_or(Error::MissingAdvice { principle })?;
            recommendations.push(Recommendation {
                principle,
                priority,
                advice: advice.clone(),
                rationale: format!(
                    "{principle} is scoring {score}/100, indicating need for improvement"
                ),
            });
        }
        recommendations.sort_by_key(|r| r.priority);
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::assessment::aggregate::Grade;

    fn result_with(scores: &[(Principle, u32)]) -> AssessmentResult {
        AssessmentResult {
            overall_score: 0,
            grade: Grade::F,
            principle_scores: scores.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_priority_ladder() {
        let t = Thresholds::default();
        assert_eq!(t.priority(0), Some(Priority::Critical));
        assert_eq!(t.priority(39), Some(Priority::Critical));
        assert_eq!(t.priority(40), Some(Priority::High));
        assert_eq!(t.priority(49), Some(Priority::High));
        assert_eq!(t.priority(50), Some(Priority::Medium));
        assert_eq!(t.priority(69), Some(Priority::Medium));
        assert_eq!(t.priority(70), None);
        assert_eq!(t.priority(100), None);
    }

    #[test]
    fn test_only_below_threshold_principles_recommended() {
        let result = result_with(&[
            (Principle::Observability, 85),
            (Principle::Controllability, 69),
            (Principle::Smallness, 70),
        ]);
        let recs = RecommendationGenerator::default().recommend(&result).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].principle, Principle::Controllability);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(
            recs[0].rationale,
            "Controllability is scoring 69/100, indicating need for improvement"
        );
    }

    #[test]
    fn test_sorted_by_severity_then_declaration_order() {
        let result = result_with(&[
            (Principle::Observability, 65),
            (Principle::AlgorithmicSimplicity, 45),
            (Principle::Unbugginess, 10),
            (Principle::Similarity, 30),
        ]);
        let recs = RecommendationGenerator::default().recommend(&result).unwrap();
        let order: Vec<_> = recs.iter().map(|r| (r.principle, r.priority)).collect();
        assert_eq!(
            order,
            vec![
                (Principle::Unbugginess, Priority::Critical),
                (Principle::Similarity, Priority::Critical),
                (Principle::AlgorithmicSimplicity, Priority::High),
                (Principle::Observability, Priority::Medium),
            ]
        );
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let result = result_with(&[(Principle::Smallness, 55), (Principle::Controllability, 55)]);
        let recs = RecommendationGenerator::default().recommend(&result).unwrap();
        assert_eq!(recs[0].principle, Principle::Controllability);
        assert_eq!(recs[1].principle, Principle::Smallness);
    }

    #[test]
    fn test_advice_is_principle_specific() {
        let mut seen = std::collections::HashSet::new();
        for p in Principle::ALL {
            let advice = default_advice(p);
            assert!(!advice.is_empty());
            assert!(seen.insert(advice), "duplicate advice for {p}");
        }
    }

    #[test]
    fn test_missing_advice_is_configuration_error() {
        let advice = HashMap::from([(Principle::Observability, "Add hooks".to_string())]);
        let err = RecommendationGenerator::from_parts(
            &PrincipleSet::core(),
            Thresholds::default(),
            advice,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAdvice {
                principle: Principle::Controllability
            }
        ));
    }

    #[test]
    fn test_blank_override_rejected() {
        let overrides = HashMap::from([(Principle::Smallness, "   ".to_string())]);
        let err =
            RecommendationGenerator::new(&PrincipleSet::full(), Thresholds::default(), overrides)
                .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_override_replaces_default_advice() {
        let overrides = HashMap::from([(Principle::Smallness, "Split the bundle".to_string())]);
        let generator =
            RecommendationGenerator::new(&PrincipleSet::full(), Thresholds::default(), overrides)
                .unwrap();
        let recs = generator
            .recommend(&result_with(&[(Principle::Smallness, 20)]))
            .unwrap();
        assert_eq!(recs[0].advice, "Split the bundle");
    }

    #[test]
    fn test_invalid_thresholds() {
        let thresholds = Thresholds {
            acceptable: 50,
            critical: 40,
            high: 60,
        };
        assert!(thresholds.validate().is_err());
        assert!(RecommendationGenerator::new(&PrincipleSet::full(), thresholds, HashMap::new())
            .is_err());
    }
}
