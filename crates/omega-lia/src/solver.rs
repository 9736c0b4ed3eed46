//! The online solver: equality and inequality elimination with shadows.
//!
//! ## Algorithm Overview
//!
//! Each asserted atom is first rewritten by the current substitution, then
//! dispatched:
//!
//! 1. Equalities `t = 0` are discharged by case analysis: constants,
//!    single-variable equations, ±1 coefficients, common factors, and
//!    finally the Omega "modulus trick", which trades the variable with
//!    the least absolute coefficient for a fresh auxiliary variable while
//!    strictly shrinking that coefficient. Every discharge installs a
//!    definition `x := t` into the inert store, kicking out bounds that
//!    mention `x` for re-processing.
//! 2. Inequalities `t < 0` eliminate their least variable into a lower or
//!    upper bound. Pairing the new bound with every opposing bound yields
//!    a real shadow (a necessary condition, solved within the same call)
//!    and a dark/gray case split (a covering disjunction, handed back to
//!    the caller to branch on).
//!
//! The work queue is FIFO and the variable choices break ties toward the
//! lowest name, so a given assertion sequence always derives the same
//! facts in the same order.
//!
//! ## References
//!
//! - "The Omega Test" (Pugh, 1992)
//! - "An Online Proof-Producing Decision Procedure for Mixed-Integer
//!   Linear Arithmetic" (Berezin, Ganesh & Dill, TACAS 2005)

use std::collections::VecDeque;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use omega_core::{LitId, Name, Prop, Provenance, Term};

use crate::bounds::{Bound, InertSet};
use crate::config::{SolverConfig, SolverStats};
use crate::error::{SolverError, SolverResult};

/// A derived sub-goal: a proposition plus the user literals it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    /// Union of the provenances of everything that produced this goal.
    pub prov: Provenance,
    /// The proposition to assert.
    pub prop: Prop,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}    {}", self.prop, self.prov)
    }
}

/// A deferred dark/gray disjunction.
///
/// At least one alternative must hold for the current state to be
/// completable; the caller picks one, clones the solver, and feeds the
/// alternative back through [`OmegaSolver::assert_case`]. The first
/// alternative is always the dark shadow; the remaining ones are the gray
/// shadow cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSplit {
    /// The alternatives; each is a conjunction of sub-goals.
    pub alts: Vec<Vec<Goal>>,
}

type WorkQueue = VecDeque<(Provenance, Prop)>;

/// `⌊(2a + m) / (2m)⌋` with floor division.
fn shift_div(a: &BigInt, m: &BigInt) -> BigInt {
    (&(a + a) + m).div_floor(&(m + m))
}

/// Symmetric-range modulus: `a − m·⌊(2a + m)/(2m)⌋`, the residue of `a`
/// modulo `m` with least absolute value (halfway points go to `−m/2`).
/// Truncating division would break this on negative inputs, hence the
/// explicit floor form.
fn mod_star(a: &BigInt, m: &BigInt) -> BigInt {
    a - m * shift_div(a, m)
}

/// Coefficient update for the transformed equation of the modulus trick:
/// `⌊(2a + m)/(2m)⌋ + mod*(a, m)`.
fn coeff_upd(a: &BigInt, m: &BigInt) -> BigInt {
    shift_div(a, m) + mod_star(a, m)
}

/// The online decision procedure for conjunctions of linear integer
/// atoms.
///
/// State is purely additive within one assertion. On a contradiction the
/// solver is left mid-derivation and must be discarded; callers that want
/// to explore branches clone the solver before the speculative assertion,
/// which is cheap because all state lives in value types.
#[derive(Debug, Clone, Default)]
pub struct OmegaSolver {
    pub(crate) inerts: InertSet,
    next_aux: u32,
    pending: Vec<CaseSplit>,
    pub(crate) outstanding: usize,
    config: SolverConfig,
    stats: SolverStats,
    asserted: Provenance,
}

impl OmegaSolver {
    /// An empty solver.
    #[must_use]
    pub fn new() -> Self {
        OmegaSolver::default()
    }

    /// An empty solver with explicit configuration.
    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        OmegaSolver {
            config,
            ..OmegaSolver::default()
        }
    }

    /// Work counters.
    #[must_use]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// The saturated store of bounds and solved equalities.
    #[must_use]
    pub fn inerts(&self) -> &InertSet {
        &self.inerts
    }

    /// Union of all user literals asserted so far.
    #[must_use]
    pub fn asserted(&self) -> &Provenance {
        &self.asserted
    }

    /// Number of case splits handed to the caller and not yet resolved.
    #[must_use]
    pub fn outstanding_splits(&self) -> usize {
        self.outstanding
    }

    /// Whether every handed-out case split has been resolved.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.outstanding == 0
    }

    /// Assert the user literal `lit`, standing for `prop`.
    ///
    /// Returns the deferred case splits produced by this assertion (the
    /// caller must resolve each via [`assert_case`](Self::assert_case)
    /// before a model can be extracted), or the blamed literal set on
    /// contradiction. After an `Err` the solver must be discarded.
    pub fn assert(&mut self, lit: LitId, prop: Prop) -> SolverResult<Vec<CaseSplit>> {
        let prov = Provenance::unit(lit);
        self.asserted.merge(&prov);
        if self.config.debug {
            eprintln!("[omega] assert {lit}: {prop}");
        }
        self.run(VecDeque::from([(prov, prop)]))
    }

    /// Assert a derived sub-goal, keeping its recorded provenance.
    pub fn assert_goal(&mut self, goal: Goal) -> SolverResult<Vec<CaseSplit>> {
        self.run(VecDeque::from([(goal.prov, goal.prop)]))
    }

    /// Resolve one outstanding case split by asserting the chosen
    /// alternative's sub-goals in order.
    pub fn assert_case(&mut self, case: Vec<Goal>) -> SolverResult<Vec<CaseSplit>> {
        self.outstanding = self.outstanding.saturating_sub(1);
        let queue: WorkQueue = case.into_iter().map(|g| (g.prov, g.prop)).collect();
        self.run(queue)
    }

    /// Drain the work queue, then hand back whatever was deferred.
    fn run(&mut self, mut queue: WorkQueue) -> SolverResult<Vec<CaseSplit>> {
        while let Some((prov, prop)) = queue.pop_front() {
            match prop {
                Prop::Eq0(t) => {
                    let (prov, t) = self.inerts.apply_subst(prov, t);
                    self.solve_eq0(prov, t, &mut queue)?;
                }
                Prop::Lt0(t) => {
                    let (prov, t) = self.inerts.apply_subst(prov, t);
                    self.solve_neg(prov, t, &mut queue)?;
                }
            }
        }
        let splits = std::mem::take(&mut self.pending);
        self.outstanding += splits.len();
        Ok(splits)
    }

    /// Discharge `t = 0` (substitution already applied to `t`).
    fn solve_eq0(
        &mut self,
        prov: Provenance,
        mut t: Term,
        queue: &mut WorkQueue,
    ) -> SolverResult<()> {
        loop {
            if let Some(a) = t.as_constant() {
                if a.is_zero() {
                    return Ok(());
                }
                if self.config.debug {
                    eprintln!("[omega] conflict: {a} = 0    {prov}");
                }
                return Err(SolverError::Unsat(prov));
            }

            if let Some((a, b, x)) = t.one_var() {
                // a + b·x = 0 has an integer solution iff b divides a.
                let (q, r) = (-a).div_rem(&b);
                if !r.is_zero() {
                    if self.config.debug {
                        eprintln!("[omega] conflict: {t} = 0 has no integer root    {prov}");
                    }
                    return Err(SolverError::Unsat(prov));
                }
                self.add_def(prov, x, Term::constant(q), queue);
                return Ok(());
            }

            if let Some((c, x, rest)) = t.unit_var() {
                // ±x + s = 0  ⇒  x := ∓s.
                let def = if c.is_positive() { -rest } else { rest };
                self.add_def(prov, x, def, queue);
                return Ok(());
            }

            if let Some((_d, reduced)) = t.factor() {
                // d·t' = 0 is equivalent to t' = 0.
                t = reduced;
                continue;
            }

            // Modulus trick: trade the variable with the least absolute
            // coefficient for a fresh auxiliary one. The transformed
            // equation's least coefficient shrinks strictly, so this loop
            // terminates.
            let (ak, xk, s) = t
                .least_abs_coeff()
                .expect("non-constant term has a coefficient");
            let m: BigInt = ak.abs() + 1;
            let sgn = ak.signum();
            let v = self.fresh_aux();
            // xₖ := (−sgn·m)·v + Σ sgn·mod*(c_y, m)·y + sgn·mod*(c₀, m)
            let def = Term::var(v).scaled(&(-&sgn * &m))
                + s.map_coeffs(|c| &sgn * mod_star(c, &m));
            self.add_def(prov.clone(), xk, def, queue);
            self.stats.aux_vars += 1;
            // Recurse on −|aₖ|·v + Σ upd(c_y)·y + upd(c₀).
            t = Term::var(v).scaled(&(-ak.abs())) + s.map_coeffs(|c| coeff_upd(c, &m));
        }
    }

    /// Discharge `t < 0` (substitution already applied to `t`).
    fn solve_neg(
        &mut self,
        prov: Provenance,
        mut t: Term,
        queue: &mut WorkQueue,
    ) -> SolverResult<()> {
        loop {
            if let Some(a) = t.as_constant() {
                if a.is_negative() {
                    return Ok(());
                }
                if self.config.debug {
                    eprintln!("[omega] conflict: {a} < 0    {prov}");
                }
                return Err(SolverError::Unsat(prov));
            }

            if let Some((_d, reduced)) = t.factor() {
                // The factor is positive, so the sign is preserved.
                t = reduced;
                continue;
            }

            // Eliminate the least variable; everything left in the bound's
            // term is strictly greater, which is what keeps the store
            // triangular.
            let (x, xc, s) = t.least_var().expect("non-constant term has a variable");
            self.stats.inequalities_solved += 1;
            if xc.is_negative() {
                // −A·x + s < 0  ⇔  s < A·x: a new lower bound on x.
                let new = Bound {
                    prov,
                    scale: -xc,
                    term: s,
                };
                if self.config.debug {
                    eprintln!("[omega] bound {} < {}*{x}", new.term, new.scale);
                }
                let uppers: Vec<Bound> = self.inerts.uppers(x).to_vec();
                for up in &uppers {
                    self.emit_shadows(x, &new, up, queue);
                }
                self.inerts.add_lower(x, new);
            } else {
                // A·x + s < 0  ⇔  A·x < −s: a new upper bound on x.
                let new = Bound {
                    prov,
                    scale: xc,
                    term: -s,
                };
                if self.config.debug {
                    eprintln!("[omega] bound {}*{x} < {}", new.scale, new.term);
                }
                let lowers: Vec<Bound> = self.inerts.lowers(x).to_vec();
                for lo in &lowers {
                    self.emit_shadows(x, lo, &new, queue);
                }
                self.inerts.add_upper(x, new);
            }
            return Ok(());
        }
    }

    /// Combine the pair `β < b·x` and `a·x < α`: queue the real shadow
    /// for immediate solving and defer the dark/gray disjunction.
    fn emit_shadows(&mut self, x: Name, lower: &Bound, upper: &Bound, queue: &mut WorkQueue) {
        let (b, beta) = (&lower.scale, &lower.term);
        let (a, alpha) = (&upper.scale, &upper.term);
        let prov = lower.prov.union(&upper.prov);

        // Real shadow a·β < b·α: necessary, solved within this call.
        queue.push_back((
            prov.clone(),
            Prop::Lt0(beta.scaled(a) - alpha.scaled(b)),
        ));
        self.stats.real_shadows += 1;

        // Dark shadow a·b < b·α − a·β: sufficient for this pair.
        let dark = Prop::Lt0(Term::constant(a * b) + beta.scaled(a) - alpha.scaled(b));
        let mut alts = vec![vec![Goal {
            prov: prov.clone(),
            prop: dark,
        }]];

        // Gray shadow: b·x = β + i for i = 1 … b−1.
        let mut i = BigInt::one();
        while &i < b {
            let gray =
                Prop::Eq0(Term::var(x).scaled(b) - beta.clone() - Term::constant(i.clone()));
            alts.push(vec![Goal {
                prov: prov.clone(),
                prop: gray,
            }]);
            i += BigInt::one();
        }

        self.pending.push(CaseSplit { alts });
        self.stats.splits_emitted += 1;
    }

    /// Install `x := t`, re-queueing every bound the definition kicked
    /// out.
    fn add_def(&mut self, prov: Provenance, x: Name, t: Term, queue: &mut WorkQueue) {
        if self.config.debug {
            eprintln!("[omega] define {x} := {t}    {prov}");
        }
        let kicked = self.inerts.add_solved(prov, x, t);
        self.stats.equalities_solved += 1;
        self.stats.bounds_kicked += kicked.len() as u64;
        queue.extend(kicked);
    }

    fn fresh_aux(&mut self) -> Name {
        let v = Name::Aux(self.next_aux);
        self.next_aux += 1;
        v
    }
}

impl fmt::Display for OmegaSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inerts)?;
        if self.outstanding > 0 {
            writeln!(f, "({} case splits outstanding)", self.outstanding)?;
        }
        Ok(())
    }
}
