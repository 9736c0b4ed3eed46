//! Atomic propositions over linear terms.
//!
//! The solver works on exactly two atom shapes, `t = 0` and `t < 0`.
//! Everything else a caller might want to say about two terms is sugar
//! built on those, using the integer-only identity `a ≤ b ⟺ a < b + 1`.

use std::fmt;

use crate::term::Term;

/// An atomic proposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prop {
    /// The atom `t = 0`.
    Eq0(Term),
    /// The atom `t < 0`.
    Lt0(Term),
}

impl Prop {
    /// The atom `lhs = rhs`.
    #[must_use]
    pub fn equal(lhs: Term, rhs: Term) -> Self {
        Prop::Eq0(lhs - rhs)
    }

    /// The atom `lhs < rhs`.
    #[must_use]
    pub fn less(lhs: Term, rhs: Term) -> Self {
        Prop::Lt0(lhs - rhs)
    }

    /// The atom `lhs ≤ rhs`, i.e. `lhs < rhs + 1`.
    #[must_use]
    pub fn less_eq(lhs: Term, rhs: Term) -> Self {
        Prop::Lt0(lhs - rhs - Term::constant(1))
    }

    /// The atom `lhs > rhs`.
    #[must_use]
    pub fn greater(lhs: Term, rhs: Term) -> Self {
        Prop::less(rhs, lhs)
    }

    /// The atom `lhs ≥ rhs`.
    #[must_use]
    pub fn greater_eq(lhs: Term, rhs: Term) -> Self {
        Prop::less_eq(rhs, lhs)
    }

    /// The term `t` of `t = 0` or `t < 0`.
    #[must_use]
    pub fn term(&self) -> &Term {
        match self {
            Prop::Eq0(t) | Prop::Lt0(t) => t,
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Eq0(t) => write!(f, "{t} = 0"),
            Prop::Lt0(t) => write!(f, "{t} < 0"),
        }
    }
}
