//! Model extraction from a quiescent solver.
//!
//! Bounded variables are assigned from largest name to smallest. By the
//! triangularity of the bound store, every bound's term is a pure integer
//! once the larger variables have values, so each variable can be picked
//! directly: just above its strongest lower bound, or just below its
//! weakest upper bound when it only has uppers. Solved variables are then
//! evaluated from their definitions; anything still unassigned is
//! unconstrained and set to zero.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use omega_core::{Name, Term};

use crate::error::{SolverError, SolverResult};
use crate::solver::OmegaSolver;

/// Evaluate `t` under `env`, treating absent variables as zero.
fn eval_term(t: &Term, env: &HashMap<Name, BigInt>) -> BigInt {
    let mut val = t.constant_part().clone();
    for (x, c) in t.iter_coeffs() {
        if let Some(v) = env.get(&x) {
            val += c * v;
        }
    }
    val
}

impl OmegaSolver {
    /// Extract a satisfying integer assignment for the user variables.
    ///
    /// Fails with [`SolverError::PendingSplits`] while case splits handed
    /// out by `assert` remain unresolved; a model computed then would
    /// only be meaningful for one branch.
    pub fn model(&self) -> SolverResult<Vec<(Name, BigInt)>> {
        if self.outstanding > 0 {
            return Err(SolverError::PendingSplits(self.outstanding));
        }

        // Every name the store mentions, bar the solved ones (which are
        // defined in terms of the rest and evaluated afterwards).
        let mut names: BTreeSet<Name> = BTreeSet::new();
        for (&x, vb) in &self.inerts.bounds {
            names.insert(x);
            for b in vb.lowers.iter().chain(&vb.uppers) {
                names.extend(b.term.vars());
            }
        }
        for (_, t) in self.inerts.solved.values() {
            names.extend(t.vars());
        }

        let mut env: HashMap<Name, BigInt> = HashMap::new();
        for &x in names.iter().rev() {
            if self.inerts.solved.contains_key(&x) {
                continue;
            }
            let val = match self.inerts.bounds.get(&x) {
                Some(vb) if !vb.lowers.is_empty() => {
                    // t < c·x: the smallest x above the strongest lower
                    // bound is ⌊t/c⌋ + 1.
                    vb.lowers
                        .iter()
                        .map(|b| eval_term(&b.term, &env).div_floor(&b.scale) + BigInt::one())
                        .max()
                        .expect("nonempty lower bounds")
                }
                Some(vb) if !vb.uppers.is_empty() => {
                    // c·x < t: the largest x below the weakest upper
                    // bound is ⌊(t − 1)/c⌋.
                    vb.uppers
                        .iter()
                        .map(|b| (eval_term(&b.term, &env) - BigInt::one()).div_floor(&b.scale))
                        .min()
                        .expect("nonempty upper bounds")
                }
                _ => BigInt::zero(),
            };
            env.insert(x, val);
        }

        // Definitions never mention solved variables, so every variable
        // on a right-hand side already has a value (or is free and reads
        // as zero).
        for (&x, (_, t)) in &self.inerts.solved {
            let val = eval_term(t, &env);
            env.insert(x, val);
        }

        let mut model: Vec<(Name, BigInt)> =
            env.into_iter().filter(|(x, _)| !x.is_aux()).collect();
        model.sort_by_key(|(x, _)| *x);
        Ok(model)
    }
}
