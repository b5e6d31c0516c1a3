//! Raw page observations supplied by a collector.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Error, Result};

/// A single observed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Flag(bool),
    Number(f64),
}

/// Immutable bag of named observations for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observations {
    values: BTreeMap<String, ObservationValue>,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a numeric observation.
    pub fn with_count(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values
            .insert(name.into(), ObservationValue::Number(value));
        self
    }

    /// Builder-style insert of a boolean observation.
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.values.insert(name.into(), ObservationValue::Flag(value));
        self
    }

    /// Read an observation as a count. Flags read as 0/1.
    ///
    /// Absent and non-finite values are `None`.
    pub fn count(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ObservationValue::Number(n) if n.is_finite() => Some(*n),
            ObservationValue::Number(_) => None,
            ObservationValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// Read an observation as a flag. Numbers are true when non-zero.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ObservationValue::Flag(b) => Some(*b),
            ObservationValue::Number(n) if n.is_nan() => None,
            ObservationValue::Number(n) => Some(*n != 0.0),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Copy of this bag without `name`.
    pub fn without(&self, name: &str) -> Self {
        let mut values = self.values.clone();
        values.remove(name);
        Self { values }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON object, skipping members that are neither numbers
    /// nor booleans.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::InvalidArgument(
                "observations must be a JSON object".to_string(),
            ));
        };

        let mut values = BTreeMap::new();
        for (name, raw) in map {
            match raw {
                Value::Bool(b) => {
                    values.insert(name, ObservationValue::Flag(b));
                }
                Value::Number(n) => match n.as_f64() {
                    Some(f) => {
                        values.insert(name, ObservationValue::Number(f));
                    }
                    None => tracing::warn!("Skipping observation '{}': not representable", name),
                },
                other => {
                    tracing::warn!(
                        "Skipping observation '{}': expected number or boolean, got {}",
                        name,
                        json_type_name(&other)
                    );
                }
            }
        }
        Ok(Self { values })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Parse a batch document: a JSON object mapping subject name to an
    /// observation object. Subjects come back sorted by name; a subject
    /// named twice is rejected.
    pub fn batch_from_json_str(content: &str) -> Result<Vec<(String, Self)>> {
        let SubjectEntries(entries) = serde_json::from_str(content)?;
        let mut subjects = entries
            .into_iter()
            .map(|(subject, value)| {
                Self::from_json_value(value)
                    .map_err(|e| Error::InvalidArgument(format!("subject '{subject}': {e}")))
                    .map(|obs| (subject, obs))
            })
            .collect::<Result<Vec<_>>>()?;
        subjects.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(pair) = subjects.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(Error::InvalidArgument(format!(
                "subject '{}' appears more than once in the batch",
                pair[0].0
            )));
        }
        Ok(subjects)
    }
}

/// Top-level batch members in document order, duplicates kept.
struct SubjectEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for SubjectEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = SubjectEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of subject -> observations")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<SubjectEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(SubjectEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
