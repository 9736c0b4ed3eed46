//! Core representation for the omega linear integer arithmetic solver.
//!
//! This crate holds the value types the solver is built from: totally
//! ordered variable [`Name`]s split into user and auxiliary namespaces,
//! user literal identifiers, immutable linear [`Term`]s with zero-free
//! coefficient maps, the two atomic proposition shapes, and [`Provenance`]
//! sets for unsat-core reporting. The decision procedure itself lives in
//! the `omega-lia` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod name;
pub mod prop;
pub mod provenance;
pub mod term;

pub use name::{LitId, Name};
pub use prop::Prop;
pub use provenance::Provenance;
pub use term::Term;
