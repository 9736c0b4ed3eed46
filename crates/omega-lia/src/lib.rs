//! Online, proof-producing decision procedure for quantifier-free linear
//! integer arithmetic.
//!
//! Conjunctions of atoms `t = 0` and `t < 0` over integer variables are
//! asserted one at a time. Each assertion either refutes the conjunction,
//! reporting the set of user literals that clashed, or returns a list of
//! deferred case splits (dark/gray shadow disjunctions) for an external
//! DPLL-style driver to branch on. Once every split is resolved, a
//! concrete integer model can be read off the solver.
//!
//! ## Algorithm Overview
//!
//! The procedure is Omega-test integer elimination in the online variant
//! of Berezin, Ganesh & Dill: equalities are eliminated into an
//! idempotent substitution (introducing auxiliary variables to shrink
//! non-unit coefficients), inequalities into per-variable bound lists.
//! Every lower/upper pair produces a real shadow that is solved
//! immediately as a necessary condition, while the dark shadow and the
//! gray shadow enumeration are deferred to the caller as a covering
//! disjunction.
//!
//! ```
//! use num_bigint::BigInt;
//! use omega_lia::{LitId, Name, OmegaSolver, Prop, Term};
//!
//! let x = Term::var(Name::user(0));
//! let y = Term::var(Name::user(1));
//!
//! let mut solver = OmegaSolver::new();
//! solver
//!     .assert(LitId(0), Prop::equal(x.clone() + y.clone(), Term::constant(10)))
//!     .unwrap();
//! solver
//!     .assert(LitId(1), Prop::equal(x - y, Term::constant(0)))
//!     .unwrap();
//!
//! let model = solver.model().unwrap();
//! assert_eq!(model[0], (Name::user(0), BigInt::from(5)));
//! assert_eq!(model[1], (Name::user(1), BigInt::from(5)));
//! ```
//!
//! ## References
//!
//! - "The Omega Test: a fast and practical integer programming algorithm
//!   for dependence analysis" (Pugh, 1992)
//! - "An Online Proof-Producing Decision Procedure for Mixed-Integer
//!   Linear Arithmetic" (Berezin, Ganesh & Dill, TACAS 2005)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bounds;
pub mod config;
pub mod error;
mod model;
pub mod solver;

pub use bounds::{Bound, InertSet, VarBounds};
pub use config::{SolverConfig, SolverStats};
pub use error::{SolverError, SolverResult};
pub use omega_core::{LitId, Name, Prop, Provenance, Term};
pub use solver::{CaseSplit, Goal, OmegaSolver};
