//! Unbounded metalog density as a function of cumulative probability
//! (Keelin 2016, equation 9).
//!
//! The density is built through its reciprocal: `1/m_2 = a_2 / (p(1-p))` and
//! every further term adds `a_n * d(basis_n)/dp`, mirroring the quantile recurrence.

use crate::basis::basis_derivative;
use crate::math::logit;

/// Reciprocal density `1 / m(p)` of the unbounded metalog, `p ∈ (0, 1)`.
///
/// This is `dQ/dp`, linear in `a`; a negative value marks a non-monotonic quantile.
#[inline]
pub fn reciprocal_density_unbounded(a: &[f64], p: f64) -> f64 {
    let ln_odds = logit(p);
    let c = p - 0.5;
    let p1p = p * (1.0 - p);
    a.iter().enumerate().map(|(i, &ai)| ai * basis_derivative(i + 1, c, ln_odds, p1p)).sum()
}

/// Density `m(p)` of the unbounded metalog, `p ∈ (0, 1)`.
#[inline]
pub fn density_unbounded(a: &[f64], p: f64) -> f64 {
    1.0 / reciprocal_density_unbounded(a, p)
}
