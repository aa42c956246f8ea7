//! Convergence towards the limit π/2

use crate::series::{Series, TermMethod};
use crate::{Error, Result};

/// Limit of the partial sums: `arcsin(1) = π/2`.
pub const LIMIT: f64 = std::f64::consts::FRAC_PI_2;

/// Truncation error `LIMIT - S(n)` of the first `n` terms.
pub fn remainder(n: usize) -> Result<f64> {
    Ok(LIMIT - Series::new(TermMethod::Recurrence).sum(n)?)
}

/// Smallest `n` whose remainder is below `tolerance`.
///
/// The remainder shrinks like `1/√(πn)`, so tight tolerances need a very
/// large `n`; the search gives up after `max_terms`.
pub fn terms_for_tolerance(tolerance: f64, max_terms: usize) -> Result<usize> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "tolerance must be positive and finite, got {}",
            tolerance
        )));
    }

    if LIMIT < tolerance {
        return Ok(0);
    }

    let mut last = 0.0;
    for (i, partial) in Series::new(TermMethod::Recurrence).partial_sums().take(max_terms).enumerate() {
        last = partial?;
        if LIMIT - last < tolerance {
            tracing::debug!(terms = i + 1, tolerance, "tolerance reached");
            return Ok(i + 1);
        }
    }

    Err(Error::NotConverged {
        max_terms,
        remainder: LIMIT - last,
    })
}
