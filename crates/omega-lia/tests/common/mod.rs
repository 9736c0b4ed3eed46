//! Shared test driver that explores deferred case splits.

use omega_lia::{CaseSplit, OmegaSolver};

/// Depth-first exploration of deferred disjunctions: clone the solver per
/// alternative and recurse until some branch reaches quiescence.
///
/// Returns the first quiescent solver found, or `None` when every branch
/// is contradictory. `fuel` bounds the number of explored nodes so a
/// runaway derivation fails the test instead of hanging it.
pub fn explore(
    solver: &OmegaSolver,
    splits: Vec<CaseSplit>,
    fuel: &mut u32,
) -> Option<OmegaSolver> {
    let Some((first, rest)) = splits.split_first() else {
        return Some(solver.clone());
    };
    assert!(*fuel > 0, "split exploration exhausted its fuel");
    *fuel -= 1;

    for alt in &first.alts {
        let mut branch = solver.clone();
        match branch.assert_case(alt.clone()) {
            Ok(more) => {
                let mut remaining = rest.to_vec();
                remaining.extend(more);
                if let Some(done) = explore(&branch, remaining, fuel) {
                    return Some(done);
                }
            }
            Err(_) => continue,
        }
    }
    None
}
