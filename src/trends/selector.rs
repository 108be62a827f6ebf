//! Best-model selection.

use super::fitter::FittedModel;

/// Pick the model with the strictly largest R².
///
/// Ties keep the earlier candidate, so with candidates in fitting order
/// (linear, exponential, logarithmic, power) the simpler family wins.
/// Returns `None` when nothing fitted.
pub fn select_best(candidates: &[FittedModel]) -> Option<FittedModel> {
    let mut best: Option<FittedModel> = None;

    for candidate in candidates {
        if !candidate.r2.is_finite() {
            continue;
        }
        match best {
            Some(current) if candidate.r2 <= current.r2 => {}
            _ => best = Some(*candidate),
        }
    }

    best
}
