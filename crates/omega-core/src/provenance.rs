//! Provenance sets: which user literals a derived fact depends on.
//!
//! Provenance is pure metadata. It never influences a solver decision; it
//! only determines what gets blamed when a contradiction is found, the same
//! role the conflicting-literal set plays in a theory solver's `Unsat`
//! answer.

use std::collections::BTreeSet;
use std::fmt;

use crate::name::LitId;

/// An immutable set of user literal identifiers.
///
/// Whenever a derivation combines two facts, the result carries the union
/// of the inputs' provenances. Union is associative, commutative, and
/// idempotent, so the order in which facts are combined does not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance(BTreeSet<LitId>);

impl Provenance {
    /// The empty provenance.
    #[must_use]
    pub fn empty() -> Self {
        Provenance::default()
    }

    /// The provenance of a single input assertion.
    #[must_use]
    pub fn unit(lit: LitId) -> Self {
        let mut set = BTreeSet::new();
        set.insert(lit);
        Provenance(set)
    }

    /// The union of two provenances.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// In-place union.
    pub fn merge(&mut self, other: &Self) {
        for lit in &other.0 {
            self.0.insert(*lit);
        }
    }

    /// Whether `lit` contributed to this fact.
    #[must_use]
    pub fn contains(&self, lit: LitId) -> bool {
        self.0.contains(&lit)
    }

    /// Whether every literal in `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// The literals in this set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = LitId> + '_ {
        self.0.iter().copied()
    }

    /// Number of literals in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, "}}")
    }
}
