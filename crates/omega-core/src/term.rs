//! Immutable linear terms over integer variables.
//!
//! A term is a constant plus a finite map from variable name to nonzero
//! integer coefficient, denoting `k + Σ M[x]·x`. The zero-free invariant is
//! maintained by every operation: no coefficient stored in the map is ever
//! zero, so two terms are semantically equal exactly when they are
//! structurally equal.
//!
//! Only linear operations are exposed. There is no term-by-term multiply,
//! so a non-linear product cannot be expressed at all; scaling by an
//! integer is the only multiplication.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use hashbrown::HashMap;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::name::Name;

/// A linear expression `constant + Σ coeff·var` with integer coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    constant: BigInt,
    /// Invariant: no stored coefficient is zero.
    coeffs: BTreeMap<Name, BigInt>,
}

impl Term {
    /// The constant term `k`.
    #[must_use]
    pub fn constant(k: impl Into<BigInt>) -> Self {
        Term {
            constant: k.into(),
            coeffs: BTreeMap::new(),
        }
    }

    /// The term `1·x`.
    #[must_use]
    pub fn var(x: Name) -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(x, BigInt::one());
        Term {
            constant: BigInt::zero(),
            coeffs,
        }
    }

    /// The constant part of this term.
    #[must_use]
    pub fn constant_part(&self) -> &BigInt {
        &self.constant
    }

    /// The constant value, if no variable occurs.
    #[must_use]
    pub fn as_constant(&self) -> Option<&BigInt> {
        if self.coeffs.is_empty() {
            Some(&self.constant)
        } else {
            None
        }
    }

    /// The coefficient of `x` (zero if absent).
    #[must_use]
    pub fn coeff(&self, x: Name) -> BigInt {
        self.coeffs.get(&x).cloned().unwrap_or_else(BigInt::zero)
    }

    /// Whether `x` occurs in this term.
    #[must_use]
    pub fn mentions(&self, x: Name) -> bool {
        self.coeffs.contains_key(&x)
    }

    /// The variables of this term, in ascending name order.
    pub fn vars(&self) -> impl Iterator<Item = Name> + '_ {
        self.coeffs.keys().copied()
    }

    /// The `(variable, coefficient)` pairs, in ascending name order.
    pub fn iter_coeffs(&self) -> impl Iterator<Item = (Name, &BigInt)> + '_ {
        self.coeffs.iter().map(|(x, c)| (*x, c))
    }

    /// Scale by `k`. Scaling by zero yields the zero term.
    #[must_use]
    pub fn scaled(&self, k: &BigInt) -> Term {
        if k.is_zero() {
            return Term::constant(0);
        }
        if k.is_one() {
            return self.clone();
        }
        // k is nonzero and the map was zero-free, so no zero can appear.
        Term {
            constant: &self.constant * k,
            coeffs: self.coeffs.iter().map(|(x, c)| (*x, c * k)).collect(),
        }
    }

    /// Split off `x`: returns its coefficient (zero if absent) and the
    /// remainder of the term with `x` removed.
    #[must_use]
    pub fn split_var(&self, x: Name) -> (BigInt, Term) {
        let mut rest = self.clone();
        let a = rest.coeffs.remove(&x).unwrap_or_else(BigInt::zero);
        (a, rest)
    }

    /// Substitute the term `s` for the variable `x`.
    #[must_use]
    pub fn subst(&self, x: Name, s: &Term) -> Term {
        match self.subst_opt(x, s) {
            Some(t) => t,
            None => self.clone(),
        }
    }

    /// Substitute `s` for `x`, or `None` when `x` does not occur (so the
    /// caller can tell an untouched term from a rewritten one).
    #[must_use]
    pub fn subst_opt(&self, x: Name, s: &Term) -> Option<Term> {
        let (a, rest) = self.split_var(x);
        if a.is_zero() {
            return None;
        }
        Some(s.scaled(&a) + rest)
    }

    /// Substitute the integer `k` for the variable `x`.
    #[must_use]
    pub fn subst_num(&self, x: Name, k: &BigInt) -> Term {
        let (a, mut rest) = self.split_var(x);
        rest.constant += a * k;
        rest
    }

    /// Substitute integers for every variable in `env` that occurs here.
    #[must_use]
    pub fn subst_nums(&self, env: &HashMap<Name, BigInt>) -> Term {
        let mut out = self.clone();
        for (x, k) in env {
            if let Some(a) = out.coeffs.remove(x) {
                out.constant += a * k;
            }
        }
        out
    }

    /// Factor out the greatest common divisor `d > 1` of the constant and
    /// all coefficients, returning `(d, self / d)`; `None` when `d = 1`.
    #[must_use]
    pub fn factor(&self) -> Option<(BigInt, Term)> {
        if self.coeffs.is_empty() {
            return None;
        }
        let mut d = self.constant.abs();
        for c in self.coeffs.values() {
            d = d.gcd(c);
            if d.is_one() {
                return None;
            }
        }
        // d divides everything exactly, so plain division is safe and no
        // zero coefficient can appear.
        let reduced = Term {
            constant: &self.constant / &d,
            coeffs: self.coeffs.iter().map(|(x, c)| (*x, c / &d)).collect(),
        };
        Some((d, reduced))
    }

    /// The variable whose coefficient has least absolute value, with ties
    /// broken toward the lowest name. Returns `(coeff, var, rest)`.
    #[must_use]
    pub fn least_abs_coeff(&self) -> Option<(BigInt, Name, Term)> {
        let mut best: Option<(Name, &BigInt)> = None;
        for (x, c) in &self.coeffs {
            // Ascending iteration: a strict comparison keeps the lowest
            // name on ties.
            match best {
                Some((_, bc)) if c.abs() >= bc.abs() => {}
                _ => best = Some((*x, c)),
            }
        }
        let (x, _) = best?;
        let (a, rest) = self.split_var(x);
        Some((a, x, rest))
    }

    /// The least variable present. Returns `(var, coeff, rest)`.
    #[must_use]
    pub fn least_var(&self) -> Option<(Name, BigInt, Term)> {
        let (&x, _) = self.coeffs.iter().next()?;
        let (a, rest) = self.split_var(x);
        Some((x, a, rest))
    }

    /// If exactly one variable occurs, `(constant, coeff, var)`.
    #[must_use]
    pub fn one_var(&self) -> Option<(BigInt, BigInt, Name)> {
        if self.coeffs.len() != 1 {
            return None;
        }
        let (&x, c) = self.coeffs.iter().next()?;
        Some((self.constant.clone(), c.clone(), x))
    }

    /// The lowest-named variable with coefficient ±1, if any.
    /// Returns `(coeff, var, rest)` where `coeff` is `1` or `-1`.
    #[must_use]
    pub fn unit_var(&self) -> Option<(BigInt, Name, Term)> {
        let x = self
            .coeffs
            .iter()
            .find(|(_, c)| c.abs().is_one())
            .map(|(x, _)| *x)?;
        let (a, rest) = self.split_var(x);
        Some((a, x, rest))
    }

    /// Apply `f` to every coefficient and to the constant, dropping any
    /// coefficient that `f` maps to zero.
    #[must_use]
    pub fn map_coeffs(&self, f: impl Fn(&BigInt) -> BigInt) -> Term {
        let coeffs = self
            .coeffs
            .iter()
            .filter_map(|(x, c)| {
                let c = f(c);
                (!c.is_zero()).then_some((*x, c))
            })
            .collect();
        Term {
            constant: f(&self.constant),
            coeffs,
        }
    }
}

impl Add for Term {
    type Output = Term;

    fn add(mut self, rhs: Term) -> Term {
        self.constant += rhs.constant;
        for (x, c) in rhs.coeffs {
            match self.coeffs.entry(x) {
                Entry::Vacant(e) => {
                    e.insert(c);
                }
                Entry::Occupied(mut e) => {
                    *e.get_mut() += c;
                    if e.get().is_zero() {
                        e.remove();
                    }
                }
            }
        }
        self
    }
}

impl Sub for Term {
    type Output = Term;

    fn sub(self, rhs: Term) -> Term {
        self + (-rhs)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term {
            constant: -self.constant,
            coeffs: self.coeffs.into_iter().map(|(x, c)| (x, -c)).collect(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (x, c) in &self.coeffs {
            if first {
                if c.is_one() {
                    write!(f, "{x}")?;
                } else if (-c).is_one() {
                    write!(f, "-{x}")?;
                } else {
                    write!(f, "{c}*{x}")?;
                }
                first = false;
            } else if c.is_negative() {
                let a = -c;
                if a.is_one() {
                    write!(f, " - {x}")?;
                } else {
                    write!(f, " - {a}*{x}")?;
                }
            } else if c.is_one() {
                write!(f, " + {x}")?;
            } else {
                write!(f, " + {c}*{x}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)?;
        } else if self.constant.is_positive() {
            write!(f, " + {}", self.constant)?;
        } else if self.constant.is_negative() {
            write!(f, " - {}", -&self.constant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Name {
        Name::user(0)
    }

    fn y() -> Name {
        Name::user(1)
    }

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn addition_laws() {
        let t1 = Term::var(x()).scaled(&big(2)) + Term::constant(3);
        let t2 = Term::var(y()).scaled(&big(-1)) + Term::constant(4);
        let t3 = Term::var(x()).scaled(&big(5));

        // Commutative and associative with identity 0.
        assert_eq!(t1.clone() + t2.clone(), t2.clone() + t1.clone());
        assert_eq!(
            (t1.clone() + t2.clone()) + t3.clone(),
            t1.clone() + (t2.clone() + t3.clone())
        );
        assert_eq!(t1.clone() + Term::constant(0), t1);
    }

    #[test]
    fn cancellation_strips_zeros() {
        // (2x + 3) + (-2x + 1) = 4, and the map must not retain x.
        let t = Term::var(x()).scaled(&big(2)) + Term::constant(3);
        let u = Term::var(x()).scaled(&big(-2)) + Term::constant(1);
        let sum = t + u;

        assert_eq!(sum, Term::constant(4));
        assert_eq!(sum.as_constant(), Some(&big(4)));
    }

    #[test]
    fn scaling_distributes() {
        let t1 = Term::var(x()).scaled(&big(2)) + Term::constant(-1);
        let t2 = Term::var(y()).scaled(&big(3)) + Term::constant(5);
        let k = big(-4);

        assert_eq!(
            (t1.clone() + t2.clone()).scaled(&k),
            t1.clone().scaled(&k) + t2.clone().scaled(&k)
        );
        assert_eq!(t1.scaled(&BigInt::zero()), Term::constant(0));
        assert_eq!(t1.scaled(&BigInt::one()), t1);
        // (j + k)·t = j·t + k·t
        assert_eq!(
            t2.scaled(&big(7)),
            t2.scaled(&big(3)) + t2.scaled(&big(4))
        );
    }

    #[test]
    fn subst_identity() {
        // tLet(x, x, t) = t
        let t = Term::var(x()).scaled(&big(3)) + Term::var(y()) + Term::constant(2);
        assert_eq!(t.subst(x(), &Term::var(x())), t);
    }

    #[test]
    fn subst_replaces_and_merges() {
        // [x := y + 1] (3x + y + 2)  =  4y + 5
        let t = Term::var(x()).scaled(&big(3)) + Term::var(y()) + Term::constant(2);
        let s = Term::var(y()) + Term::constant(1);
        let out = t.subst(x(), &s);

        assert_eq!(out.coeff(y()), big(4));
        assert_eq!(out.constant_part(), &big(5));
        assert!(!out.mentions(x()));
    }

    #[test]
    fn subst_opt_reports_no_change() {
        let t = Term::var(y()) + Term::constant(2);
        assert!(t.subst_opt(x(), &Term::constant(9)).is_none());
        assert!(t.subst_opt(y(), &Term::constant(9)).is_some());
    }

    #[test]
    fn subst_num_updates_constant() {
        // [x := -2] (3x + y + 2) = y - 4
        let t = Term::var(x()).scaled(&big(3)) + Term::var(y()) + Term::constant(2);
        let out = t.subst_num(x(), &big(-2));

        assert_eq!(out.constant_part(), &big(-4));
        assert_eq!(out.coeff(y()), big(1));
        assert!(!out.mentions(x()));
    }

    #[test]
    fn subst_nums_batch() {
        let t = Term::var(x()).scaled(&big(2)) + Term::var(y()).scaled(&big(-3));
        let mut env = HashMap::new();
        env.insert(x(), big(4));
        env.insert(y(), big(1));

        assert_eq!(t.subst_nums(&env), Term::constant(5));
    }

    #[test]
    fn factor_includes_constant() {
        // 4x + 6y - 10 has factor 2; 4x + 6y - 5 does not.
        let t = Term::var(x()).scaled(&big(4)) + Term::var(y()).scaled(&big(6))
            + Term::constant(-10);
        let (d, reduced) = t.factor().unwrap();

        assert_eq!(d, big(2));
        assert_eq!(reduced.coeff(x()), big(2));
        assert_eq!(reduced.coeff(y()), big(3));
        assert_eq!(reduced.constant_part(), &big(-5));

        let u = Term::var(x()).scaled(&big(4)) + Term::var(y()).scaled(&big(6))
            + Term::constant(-5);
        assert!(u.factor().is_none());
    }

    #[test]
    fn least_abs_coeff_breaks_ties_low() {
        // |−3| on x ties with |3| on y: lowest name wins.
        let t = Term::var(x()).scaled(&big(-3)) + Term::var(y()).scaled(&big(3));
        let (c, var, rest) = t.least_abs_coeff().unwrap();

        assert_eq!(var, x());
        assert_eq!(c, big(-3));
        assert_eq!(rest.coeff(y()), big(3));

        // 5x + 2y: the smaller magnitude wins regardless of order.
        let u = Term::var(x()).scaled(&big(5)) + Term::var(y()).scaled(&big(2));
        let (c, var, _) = u.least_abs_coeff().unwrap();
        assert_eq!(var, y());
        assert_eq!(c, big(2));
    }

    #[test]
    fn least_var_and_one_var() {
        let t = Term::var(y()).scaled(&big(4)) + Term::var(x()).scaled(&big(2));
        let (var, c, rest) = t.least_var().unwrap();
        assert_eq!(var, x());
        assert_eq!(c, big(2));
        assert_eq!(rest.coeff(y()), big(4));

        let u = Term::var(y()).scaled(&big(-2)) + Term::constant(7);
        assert_eq!(u.one_var(), Some((big(7), big(-2), y())));
        assert!(t.one_var().is_none());
    }

    #[test]
    fn unit_var_prefers_low_names() {
        // x and y both have ±1 coefficients; x is chosen.
        let t = Term::var(x()).scaled(&big(-1)) + Term::var(y());
        let (c, var, _) = t.unit_var().unwrap();
        assert_eq!(var, x());
        assert_eq!(c, big(-1));

        // 2x + y: only y qualifies.
        let u = Term::var(x()).scaled(&big(2)) + Term::var(y());
        let (c, var, rest) = u.unit_var().unwrap();
        assert_eq!(var, y());
        assert_eq!(c, big(1));
        assert_eq!(rest.coeff(x()), big(2));
    }

    #[test]
    fn map_coeffs_strips_zeros() {
        let t = Term::var(x()).scaled(&big(3)) + Term::var(y()).scaled(&big(4))
            + Term::constant(5);
        // Map through mod 3: x's coefficient becomes 0 and must vanish.
        let out = t.map_coeffs(|c| c % 3);

        assert!(!out.mentions(x()));
        assert_eq!(out.coeff(y()), big(1));
        assert_eq!(out.constant_part(), &big(2));
    }

    #[test]
    fn display() {
        let t = Term::var(x()).scaled(&big(2)) - Term::var(y()).scaled(&big(3))
            + Term::constant(-7);
        assert_eq!(t.to_string(), "2*x0 - 3*x1 - 7");
        assert_eq!(Term::constant(0).to_string(), "0");
        assert_eq!((-Term::var(x())).to_string(), "-x0");
    }
}
