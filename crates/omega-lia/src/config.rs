//! Solver configuration and work counters.

/// Runtime configuration for [`crate::OmegaSolver`].
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Emit step-by-step diagnostics on stderr.
    pub debug: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            debug: std::env::var("OMEGA_DEBUG").is_ok(),
        }
    }
}

/// Counters describing the work performed by a solver so far.
///
/// Purely observational; cloned along with the solver when the caller
/// branches, so counts in a branch include the work of its prefix.
#[derive(Debug, Clone, Default)]
pub struct SolverStats {
    /// Equalities discharged into definitions.
    pub equalities_solved: u64,
    /// Inequalities turned into bounds.
    pub inequalities_solved: u64,
    /// Auxiliary variables allocated by the coefficient-reduction step.
    pub aux_vars: u64,
    /// Bounds kicked out by new definitions and re-queued.
    pub bounds_kicked: u64,
    /// Real shadows generated from lower/upper pairs.
    pub real_shadows: u64,
    /// Dark/gray case splits handed back to the caller.
    pub splits_emitted: u64,
}
