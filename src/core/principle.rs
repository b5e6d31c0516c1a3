//! Testability principles and principle sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One axis of testability.
///
/// Variant order is the fixed declaration order: it is the `Ord` of the type
/// and decides every ordering in reports and recommendations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Principle {
    Observability,
    Controllability,
    AlgorithmicSimplicity,
    AlgorithmicTransparency,
    AlgorithmicStability,
    Explainability,
    Unbugginess,
    Smallness,
    Decomposability,
    Similarity,
}

impl Principle {
    /// All principles in declaration order.
    pub const ALL: [Principle; 10] = [
        Principle::Observability,
        Principle::Controllability,
        Principle::AlgorithmicSimplicity,
        Principle::AlgorithmicTransparency,
        Principle::AlgorithmicStability,
        Principle::Explainability,
        Principle::Unbugginess,
        Principle::Smallness,
        Principle::Decomposability,
        Principle::Similarity,
    ];

    /// Machine identifier, as used in config files and JSON keys.
    pub fn key(self) -> &'static str {
        match self {
            Principle::Observability => "observability",
            Principle::Controllability => "controllability",
            Principle::AlgorithmicSimplicity => "algorithmic_simplicity",
            Principle::AlgorithmicTransparency => "algorithmic_transparency",
            Principle::AlgorithmicStability => "algorithmic_stability",
            Principle::Explainability => "explainability",
            Principle::Unbugginess => "unbugginess",
            Principle::Smallness => "smallness",
            Principle::Decomposability => "decomposability",
            Principle::Similarity => "similarity",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Principle::Observability => "Observability",
            Principle::Controllability => "Controllability",
            Principle::AlgorithmicSimplicity => "Algorithmic Simplicity",
            Principle::AlgorithmicTransparency => "Algorithmic Transparency",
            Principle::AlgorithmicStability => "Algorithmic Stability",
            Principle::Explainability => "Explainability",
            Principle::Unbugginess => "Unbugginess",
            Principle::Smallness => "Smallness",
            Principle::Decomposability => "Decomposability",
            Principle::Similarity => "Similarity",
        }
    }
}

impl fmt::Display for Principle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Principle {
    type Err = String;

    /// Accepts `algorithmic_simplicity`, `algorithmic-simplicity` or
    /// `Algorithmic Simplicity`, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Principle::ALL
            .into_iter()
            .find(|p| p.key() == normalized)
            .ok_or_else(|| format!("Unknown principle: {s}"))
    }
}

/// Named principle presets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// All ten principles.
    #[default]
    Full,
    /// The reduced five-principle variant.
    Core,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "all" => Ok(Self::Full),
            "core" | "reduced" => Ok(Self::Core),
            _ => Err(format!("Unknown profile: {s}. Use 'full' or 'core'")),
        }
    }
}

/// Non-empty set of principles required for a run, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipleSet(Vec<Principle>);

impl PrincipleSet {
    /// Build a set from any list; duplicates are dropped and the result is
    /// sorted into declaration order. Returns `None` for an empty list.
    pub fn new(principles: impl IntoIterator<Item = Principle>) -> Option<Self> {
        let mut members: Vec<Principle> = principles.into_iter().collect();
        members.sort();
        members.dedup();
        if members.is_empty() {
            None
        } else {
            Some(Self(members))
        }
    }

    /// All ten principles.
    pub fn full() -> Self {
        Self(Principle::ALL.to_vec())
    }

    /// Reduced five-principle variant.
    pub fn core() -> Self {
        Self(vec![
            Principle::Observability,
            Principle::Controllability,
            Principle::AlgorithmicSimplicity,
            Principle::AlgorithmicStability,
            Principle::Unbugginess,
        ])
    }

    pub fn from_profile(profile: Profile) -> Self {
        match profile {
            Profile::Full => Self::full(),
            Profile::Core => Self::core(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Principle> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, principle: Principle) -> bool {
        self.0.contains(&principle)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PrincipleSet {
    fn default() -> Self {
        Self::full()
    }
}
