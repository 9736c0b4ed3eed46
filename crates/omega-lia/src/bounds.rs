//! The inert store: a triangular substitution plus ordered bounds.
//!
//! Facts the solver has finished with live here in one of two shapes.
//! Equalities become entries of `solved`, an idempotent substitution
//! `x := t` in which no right-hand side mentions any solved variable.
//! Inequalities become one-sided [`Bound`]s: a lower bound `t < c·x` or an
//! upper bound `c·x < t`, with `c ≥ 1` and `t` mentioning only variables
//! strictly greater than `x`. That ordering is what lets elimination and
//! model extraction walk variables from largest to smallest.
//!
//! Installing a new definition can invalidate the ordering of existing
//! bounds, so [`InertSet::add_solved`] removes every bound that mentions
//! the newly defined variable and returns it as a fresh inequality for the
//! solver to re-process. Rewriting such a bound in place instead would let
//! a variable smaller than the bound's own drop into its term.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::One;
use omega_core::{Name, Prop, Provenance, Term};

/// A one-sided constraint on some variable `x`.
///
/// As a lower bound it stands for `term < scale·x`; as an upper bound for
/// `scale·x < term`. Which side it is on is determined by the list it is
/// stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    /// The user literals this bound was derived from.
    pub prov: Provenance,
    /// The (strictly positive) multiplier of the bounded variable.
    pub scale: BigInt,
    /// The bounding term; mentions only variables greater than `x`.
    pub term: Term,
}

impl Bound {
    /// Recover the inequality a lower bound on `x` stands for:
    /// `term < scale·x`, i.e. `term − scale·x < 0`.
    fn into_lower_atom(self, x: Name) -> Prop {
        Prop::Lt0(self.term - Term::var(x).scaled(&self.scale))
    }

    /// Recover the inequality an upper bound on `x` stands for:
    /// `scale·x < term`, i.e. `scale·x − term < 0`.
    fn into_upper_atom(self, x: Name) -> Prop {
        Prop::Lt0(Term::var(x).scaled(&self.scale) - self.term)
    }
}

/// The bounds recorded for one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarBounds {
    /// Lower bounds `t < c·x`.
    pub lowers: Vec<Bound>,
    /// Upper bounds `c·x < t`.
    pub uppers: Vec<Bound>,
}

impl VarBounds {
    fn is_empty(&self) -> bool {
        self.lowers.is_empty() && self.uppers.is_empty()
    }
}

/// The saturated store of bounds and solved equalities maintained between
/// assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InertSet {
    pub(crate) bounds: BTreeMap<Name, VarBounds>,
    pub(crate) solved: BTreeMap<Name, (Provenance, Term)>,
}

impl InertSet {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        InertSet::default()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty() && self.solved.is_empty()
    }

    /// Rewrite `t` with every solved equality, accumulating into `prov`
    /// the provenance of each equality that actually fired.
    ///
    /// One pass suffices: right-hand sides of `solved` never mention
    /// solved variables, so a substituted-in term cannot create new work.
    #[must_use]
    pub fn apply_subst(&self, mut prov: Provenance, mut t: Term) -> (Provenance, Term) {
        let hits: Vec<Name> = t.vars().filter(|x| self.solved.contains_key(x)).collect();
        for x in hits {
            let (p, s) = &self.solved[&x];
            if let Some(rewritten) = t.subst_opt(x, s) {
                t = rewritten;
                prov.merge(p);
            }
        }
        (prov, t)
    }

    /// The current lower bounds on `x`.
    #[must_use]
    pub fn lowers(&self, x: Name) -> &[Bound] {
        match self.bounds.get(&x) {
            Some(vb) => &vb.lowers,
            None => &[],
        }
    }

    /// The current upper bounds on `x`.
    #[must_use]
    pub fn uppers(&self, x: Name) -> &[Bound] {
        match self.bounds.get(&x) {
            Some(vb) => &vb.uppers,
            None => &[],
        }
    }

    /// Record a lower bound `b.term < b.scale·x`.
    pub fn add_lower(&mut self, x: Name, b: Bound) {
        self.bounds.entry(x).or_default().lowers.push(b);
    }

    /// Record an upper bound `b.scale·x < b.term`.
    pub fn add_upper(&mut self, x: Name, b: Bound) {
        self.bounds.entry(x).or_default().uppers.push(b);
    }

    /// Install the definition `x := t` (with the substitution already
    /// applied to `t`) and return the inequalities kicked out by it, each
    /// tagged with the union of `prov` and its own provenance.
    ///
    /// Kick-out removes `x`'s own bounds and every bound whose term
    /// mentions `x`; existing solved entries are rewritten in place, which
    /// is safe because `t` cannot mention a solved variable.
    pub fn add_solved(
        &mut self,
        prov: Provenance,
        x: Name,
        t: Term,
    ) -> Vec<(Provenance, Prop)> {
        let mut kicked = Vec::new();

        if let Some(vb) = self.bounds.remove(&x) {
            for b in vb.lowers {
                kicked.push((prov.union(&b.prov), b.into_lower_atom(x)));
            }
            for b in vb.uppers {
                kicked.push((prov.union(&b.prov), b.into_upper_atom(x)));
            }
        }

        for (&y, vb) in self.bounds.iter_mut() {
            for b in std::mem::take(&mut vb.lowers) {
                if b.term.mentions(x) {
                    kicked.push((prov.union(&b.prov), b.into_lower_atom(y)));
                } else {
                    vb.lowers.push(b);
                }
            }
            for b in std::mem::take(&mut vb.uppers) {
                if b.term.mentions(x) {
                    kicked.push((prov.union(&b.prov), b.into_upper_atom(y)));
                } else {
                    vb.uppers.push(b);
                }
            }
        }
        self.bounds.retain(|_, vb| !vb.is_empty());

        for (p, s) in self.solved.values_mut() {
            if let Some(rewritten) = s.subst_opt(x, &t) {
                *s = rewritten;
                p.merge(&prov);
            }
        }

        self.solved.insert(x, (prov, t));
        kicked
    }

    /// Check the store invariants, returning a description of the first
    /// violation found. Intended for tests and debugging.
    ///
    /// Checked: bounds are triangular (every bound term mentions only
    /// variables greater than its own), bound scales are positive, the
    /// substitution is idempotent (no variable occurring in any inert term
    /// is a solved key), and every stored provenance is a subset of
    /// `asserted`.
    pub fn check_invariants(&self, asserted: &Provenance) -> Result<(), String> {
        let check_term = |t: &Term, floor: Option<Name>, what: &str| -> Result<(), String> {
            for v in t.vars() {
                if let Some(x) = floor {
                    if v <= x {
                        return Err(format!("{what}: term {t} mentions {v} ≤ {x}"));
                    }
                }
                if self.solved.contains_key(&v) {
                    return Err(format!("{what}: term {t} mentions solved variable {v}"));
                }
            }
            Ok(())
        };

        for (&x, vb) in &self.bounds {
            for (side, bs) in [("lower", &vb.lowers), ("upper", &vb.uppers)] {
                for b in bs {
                    if b.scale < BigInt::one() {
                        return Err(format!("{side} bound on {x}: scale {} < 1", b.scale));
                    }
                    check_term(&b.term, Some(x), &format!("{side} bound on {x}"))?;
                    if !b.prov.is_subset(asserted) {
                        return Err(format!(
                            "{side} bound on {x}: provenance {} not among asserted {asserted}",
                            b.prov
                        ));
                    }
                }
            }
        }

        for (&x, (p, t)) in &self.solved {
            if t.mentions(x) {
                return Err(format!("solved {x}: right-hand side {t} mentions {x}"));
            }
            check_term(t, None, &format!("solved {x}"))?;
            if !p.is_subset(asserted) {
                return Err(format!(
                    "solved {x}: provenance {p} not among asserted {asserted}"
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for InertSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (x, (p, t)) in &self.solved {
            writeln!(f, "{x} = {t}    {p}")?;
        }
        for (x, vb) in &self.bounds {
            for b in &vb.lowers {
                writeln!(f, "{} < {}*{x}    {}", b.term, b.scale, b.prov)?;
            }
            for b in &vb.uppers {
                writeln!(f, "{}*{x} < {}    {}", b.scale, b.term, b.prov)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omega_core::LitId;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    fn bound(lit: u32, scale: i64, term: Term) -> Bound {
        Bound {
            prov: Provenance::unit(LitId(lit)),
            scale: big(scale),
            term,
        }
    }

    #[test]
    fn apply_subst_accumulates_provenance() {
        let x = Name::user(0);
        let y = Name::user(1);

        let mut inerts = InertSet::new();
        inerts.add_solved(
            Provenance::unit(LitId(7)),
            x,
            Term::var(y) + Term::constant(1),
        );

        // 2x + 3 rewrites to 2y + 5 and picks up l7.
        let t = Term::var(x).scaled(&big(2)) + Term::constant(3);
        let (prov, t) = inerts.apply_subst(Provenance::unit(LitId(1)), t);

        assert_eq!(t.coeff(y), big(2));
        assert_eq!(t.constant_part(), &big(5));
        assert!(prov.contains(LitId(1)));
        assert!(prov.contains(LitId(7)));

        // A term without x is untouched and gains nothing.
        let u = Term::var(y).scaled(&big(4));
        let (prov, _) = inerts.apply_subst(Provenance::unit(LitId(2)), u);
        assert_eq!(prov, Provenance::unit(LitId(2)));
    }

    #[test]
    fn add_solved_kicks_own_bounds() {
        let x = Name::user(0);
        let y = Name::user(1);

        let mut inerts = InertSet::new();
        // 3 < 2x and 1x < y.
        inerts.add_lower(x, bound(1, 2, Term::constant(3)));
        inerts.add_upper(x, bound(2, 1, Term::var(y)));

        let kicked = inerts.add_solved(Provenance::unit(LitId(3)), x, Term::constant(5));

        assert_eq!(kicked.len(), 2);
        // Lower bound comes back as 3 - 2x < 0.
        let (p, prop) = &kicked[0];
        assert!(p.contains(LitId(1)) && p.contains(LitId(3)));
        assert_eq!(
            *prop,
            Prop::Lt0(Term::constant(3) - Term::var(x).scaled(&big(2)))
        );
        // Upper bound comes back as x - y < 0.
        let (p, prop) = &kicked[1];
        assert!(p.contains(LitId(2)) && p.contains(LitId(3)));
        assert_eq!(*prop, Prop::Lt0(Term::var(x) - Term::var(y)));

        assert!(inerts.lowers(x).is_empty());
        assert!(inerts.uppers(x).is_empty());
    }

    #[test]
    fn add_solved_kicks_bounds_mentioning_the_variable() {
        let x = Name::user(0);
        let y = Name::user(1);
        let z = Name::user(2);

        let mut inerts = InertSet::new();
        // On x: y + 1 < x (mentions y) and x < z (does not).
        inerts.add_lower(x, bound(1, 1, Term::var(y) + Term::constant(1)));
        inerts.add_upper(x, bound(2, 1, Term::var(z)));

        let kicked = inerts.add_solved(Provenance::unit(LitId(4)), y, Term::constant(0));

        // Only the bound mentioning y is kicked; the other survives.
        assert_eq!(kicked.len(), 1);
        assert_eq!(
            kicked[0].1,
            Prop::Lt0(Term::var(y) + Term::constant(1) - Term::var(x))
        );
        assert_eq!(inerts.lowers(x).len(), 0);
        assert_eq!(inerts.uppers(x).len(), 1);
    }

    #[test]
    fn add_solved_rewrites_existing_definitions() {
        let x = Name::user(0);
        let y = Name::user(1);

        let mut inerts = InertSet::new();
        inerts.add_solved(Provenance::unit(LitId(1)), x, Term::var(y).scaled(&big(2)));
        inerts.add_solved(Provenance::unit(LitId(2)), y, Term::constant(3));

        // x's entry must have been rewritten to the constant 6, with
        // provenance {l1, l2}; y's stays {l2}.
        let asserted = Provenance::unit(LitId(1)).union(&Provenance::unit(LitId(2)));
        inerts.check_invariants(&asserted).unwrap();

        let (p, t) = &inerts.solved[&x];
        assert_eq!(t, &Term::constant(6));
        assert!(p.contains(LitId(1)) && p.contains(LitId(2)));
        let (p, _) = &inerts.solved[&y];
        assert!(!p.contains(LitId(1)));
    }

    #[test]
    fn invariant_checker_spots_violations() {
        let x = Name::user(0);
        let y = Name::user(1);
        let asserted = Provenance::unit(LitId(1));

        // A bound whose term mentions a smaller variable breaks I1.
        let mut inerts = InertSet::new();
        inerts.add_lower(y, bound(1, 1, Term::var(x)));
        assert!(inerts.check_invariants(&asserted).is_err());

        // A zero scale breaks I4.
        let mut inerts = InertSet::new();
        inerts.add_lower(x, bound(1, 0, Term::constant(1)));
        assert!(inerts.check_invariants(&asserted).is_err());

        // Provenance outside the asserted set breaks I5.
        let mut inerts = InertSet::new();
        inerts.add_lower(x, bound(9, 1, Term::constant(1)));
        assert!(inerts.check_invariants(&asserted).is_err());

        // A well-formed store passes.
        let mut inerts = InertSet::new();
        inerts.add_lower(x, bound(1, 2, Term::var(y) + Term::constant(1)));
        inerts.check_invariants(&asserted).unwrap();
    }
}
