//! Phase value types
//!
//! [`Phase`] is an opaque, case-sensitive identifier. [`PhaseList`] is a
//! non-empty, duplicate-free ordering of phases; once constructed it can
//! never violate those invariants.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PhaseListError;

/// A named step in a fixed progression.
///
/// Equality is exact byte equality of the underlying string.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    /// Creates a new `Phase` from any string-like value.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the phase name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the phase, returning the owned name.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Phase {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Phase {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Phase {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An ordered, non-empty, duplicate-free sequence of phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Phase>", into = "Vec<Phase>")]
pub struct PhaseList(Vec<Phase>);

impl PhaseList {
    /// Builds a list, checking every invariant.
    ///
    /// Checks run in declaration order and the first violation wins. Use
    /// [`PhaseList::violations`] to collect all of them.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseListError`] if the list is empty, contains an empty
    /// entry, or repeats a phase.
    pub fn new(phases: Vec<Phase>) -> Result<Self, PhaseListError> {
        match Self::violations(&phases).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(Self(phases)),
        }
    }

    /// Returns every invariant violation in `phases`, in index order.
    #[must_use]
    pub fn violations(phases: &[Phase]) -> Vec<PhaseListError> {
        if phases.is_empty() {
            return vec![PhaseListError::Empty];
        }

        let mut errors = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(phases.len());

        for (index, phase) in phases.iter().enumerate() {
            if phase.as_str().is_empty() {
                errors.push(PhaseListError::EmptyEntry { index });
                continue;
            }
            if let Some(&first) = seen.get(phase.as_str()) {
                errors.push(PhaseListError::Duplicate {
                    phase: phase.clone(),
                    first,
                    second: index,
                });
            } else {
                seen.insert(phase.as_str(), index);
            }
        }

        errors
    }

    /// Returns the first phase. Always present.
    #[must_use]
    pub fn first(&self) -> &Phase {
        &self.0[0]
    }

    /// Returns the terminal phase. Always present.
    #[must_use]
    pub fn last(&self) -> &Phase {
        &self.0[self.0.len() - 1]
    }

    /// Returns the index of `phase`, if it is a member.
    #[must_use]
    pub fn position(&self, phase: &Phase) -> Option<usize> {
        self.0.iter().position(|p| p == phase)
    }

    /// Returns `true` if `phase` is a member of the list.
    #[must_use]
    pub fn contains(&self, phase: &Phase) -> bool {
        self.0.contains(phase)
    }

    /// Returns the number of phases (at least 1).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the phases in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.0.iter()
    }

    /// Borrows the phases as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Phase] {
        &self.0
    }
}

impl TryFrom<Vec<Phase>> for PhaseList {
    type Error = PhaseListError;

    fn try_from(phases: Vec<Phase>) -> Result<Self, Self::Error> {
        Self::new(phases)
    }
}

impl TryFrom<Vec<String>> for PhaseList {
    type Error = PhaseListError;

    fn try_from(phases: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(phases.into_iter().map(Phase::from).collect())
    }
}

impl From<PhaseList> for Vec<Phase> {
    fn from(list: PhaseList) -> Self {
        list.0
    }
}

impl std::ops::Deref for PhaseList {
    type Target = [Phase];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a PhaseList {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PhaseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, phase) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(phase.as_str())?;
        }
        f.write_str("]")
    }
}
