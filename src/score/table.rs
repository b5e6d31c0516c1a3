//! Declarative principle -> rule table.
//!
//! Reweighting a budget or adding an observation is a data change: tables
//! can be loaded from TOML and are validated before any scoring happens.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rule::SubMetricRule;
use crate::core::{Error, Principle, PrincipleSet, Result};

/// Total points available to every principle.
pub const PRINCIPLE_BUDGET: u32 = 100;

/// Ordered rules for one principle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleRules {
    pub principle: Principle,
    pub rules: Vec<SubMetricRule>,
}

/// The full rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub principles: Vec<PrincipleRules>,
}

impl Default for RuleTable {
    fn default() -> Self {
        use SubMetricRule as R;

        let entry = |principle, rules| PrincipleRules { principle, rules };
        Self {
            principles: vec![
                entry(
                    Principle::Observability,
                    vec![
                        R::linear("data_test_attributes", "dataTestAttributeCount", 30, 2.0),
                        R::linear("aria_labels", "ariaLabelCount", 20, 1.0),
                        R::inverse("console_errors", "consoleErrorCount", 25, 10.0),
                        R::presence("status_messages", "hasStatusMessages", 25, 5),
                    ],
                ),
                entry(
                    Principle::Controllability,
                    vec![
                        R::linear("form_inputs", "inputElementCount", 30, 2.0),
                        R::presence("url_parameters", "hasUrlParameters", 20, 5),
                        R::presence("local_storage", "hasLocalStorageData", 25, 10),
                        R::presence("reset_mechanism", "hasResetMechanism", 25, 5),
                    ],
                ),
                entry(
                    Principle::AlgorithmicSimplicity,
                    vec![
                        R::inverse("dom_size", "totalElementCount", 40, 0.05),
                        R::inverse("nesting_depth", "maxNestingDepth", 30, 2.0),
                        R::linear("primary_actions", "buttonCount", 30, 1.5),
                    ],
                ),
                entry(
                    Principle::AlgorithmicTransparency,
                    vec![
                        R::linear("semantic_elements", "semanticElementCount", 35, 2.0),
                        R::linear("labelled_inputs", "labelledInputCount", 30, 3.0),
                        R::presence("visible_state", "hasVisibleStateIndicators", 35, 10),
                    ],
                ),
                entry(
                    Principle::AlgorithmicStability,
                    vec![
                        R::inverse("console_errors", "consoleErrorCount", 40, 15.0),
                        R::inverse("load_time", "pageLoadTimeMs", 30, 0.01),
                        R::presence("stable_layout", "hasStableLayout", 30, 10),
                    ],
                ),
                entry(
                    Principle::Explainability,
                    vec![
                        R::linear("error_messages", "errorMessageElementCount", 30, 5.0),
                        R::linear("help_text", "helpTextCount", 30, 3.0),
                        R::presence("documentation_links", "hasDocumentationLinks", 20, 5),
                        R::linear("tooltips", "tooltipCount", 20, 2.0),
                    ],
                ),
                entry(
                    Principle::Unbugginess,
                    vec![
                        R::inverse("console_errors", "consoleErrorCount", 40, 20.0),
                        R::inverse("console_warnings", "consoleWarningCount", 20, 5.0),
                        R::inverse("broken_images", "brokenImageCount", 20, 10.0),
                        R::inverse("failed_requests", "failedRequestCount", 20, 10.0),
                    ],
                ),
                entry(
                    Principle::Smallness,
                    vec![
                        R::inverse("dom_size", "totalElementCount", 40, 0.1),
                        R::inverse("scripts", "scriptCount", 30, 2.0),
                        R::inverse("stylesheets", "stylesheetCount", 30, 3.0),
                    ],
                ),
                entry(
                    Principle::Decomposability,
                    vec![
                        R::linear("components", "componentCount", 40, 2.0),
                        R::linear("forms", "formCount", 20, 10.0),
                        R::linear("landmarks", "landmarkCount", 40, 5.0),
                    ],
                ),
                entry(
                    Principle::Similarity,
                    vec![
                        R::presence("consistent_buttons", "hasConsistentButtonStyles", 35, 10),
                        R::linear("repeated_structures", "repeatedItemCount", 35, 2.0),
                        R::presence("naming_convention", "hasConsistentNaming", 30, 10),
                    ],
                ),
            ],
        }
    }
}

impl RuleTable {
    /// Parse and validate a TOML rule table.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: Self = toml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn rules_for(&self, principle: Principle) -> Option<&[SubMetricRule]> {
        self.principles
            .iter()
            .find(|entry| entry.principle == principle)
            .map(|entry| entry.rules.as_slice())
    }

    /// Check every structural constraint on the table.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.principles {
            let principle = entry.principle;
            if !seen.insert(principle) {
                return Err(Error::config(format!(
                    "principle '{}' is declared more than once in the rule table",
                    principle.key()
                )));
            }
            if entry.rules.is_empty() {
                return Err(Error::config(format!(
                    "principle '{}' has no rules",
                    principle.key()
                )));
            }

            let mut names = HashSet::new();
            let mut total = 0u32;
            for rule in &entry.rules {
                if !names.insert(rule.name()) {
                    return Err(Error::invalid_rule(
                        principle,
                        rule.name(),
                        "duplicate rule name",
                    ));
                }
                validate_rule(principle, rule)?;
                total = total.saturating_add(rule.budget());
            }

            if total != PRINCIPLE_BUDGET {
                return Err(Error::config(format!(
                    "rule budgets for '{}' sum to {}, expected {}",
                    principle.key(),
                    total,
                    PRINCIPLE_BUDGET
                )));
            }
        }
        Ok(())
    }

    /// Ensure every member of `set` has rules.
    pub fn ensure_covers(&self, set: &PrincipleSet) -> Result<()> {
        match set.iter().find(|p| self.rules_for(*p).is_none()) {
            Some(missing) => Err(Error::config(format!(
                "rule table has no rules for configured principle '{}'",
                missing.key()
            ))),
            None => Ok(()),
        }
    }
}

fn validate_rule(principle: Principle, rule: &SubMetricRule) -> Result<()> {
    let budget = rule.budget();
    if budget == 0 {
        return Err(Error::invalid_rule(principle, rule.name(), "budget must be positive"));
    }
    if rule.observation().trim().is_empty() {
        return Err(Error::invalid_rule(
            principle,
            rule.name(),
            "observation name must not be empty",
        ));
    }
    match rule {
        SubMetricRule::LinearCount { per_unit, .. } if !per_unit.is_finite() || *per_unit < 0.0 => {
            Err(Error::invalid_rule(
                principle,
                rule.name(),
                "per_unit must be a finite, non-negative number",
            ))
        }
        SubMetricRule::InversePenalty { penalty, .. } if !penalty.is_finite() || *penalty < 0.0 => {
            Err(Error::invalid_rule(
                principle,
                rule.name(),
                "penalty must be a finite, non-negative number",
            ))
        }
        SubMetricRule::Presence { absent, .. } if *absent == 0 || *absent >= budget => {
            Err(Error::invalid_rule(
                principle,
                rule.name(),
                format!("absent points must be between 1 and {}", budget - 1),
            ))
        }
        _ => Ok(()),
    }
}
