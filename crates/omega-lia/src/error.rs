//! Error types for the omega solver.

use omega_core::Provenance;
use thiserror::Error;

/// Errors surfaced at the solver boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolverError {
    /// The asserted set has no integer solution. The payload names the
    /// user literals that participated in the refutation; every listed
    /// literal contributed to the contradiction, though the set is not
    /// guaranteed minimal.
    #[error("unsatisfiable over the integers (blamed literals: {0})")]
    Unsat(Provenance),

    /// A model was requested while case splits handed to the caller are
    /// still unresolved; any model would only cover one branch.
    #[error("{0} case split(s) outstanding; resolve them before extracting a model")]
    PendingSplits(usize),
}

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
