//! Unbounded metalog quantile function (Keelin 2016, equation 6).

use crate::basis::basis_value;
use crate::math::logit;

/// Quantile of the unbounded metalog with coefficients `a` at `p ∈ (0, 1)`.
///
/// Accumulates `a[n - 1] * basis_n(p)` for `n = 1..=a.len()`, i.e. the
/// term-by-term recurrence `M_n = M_{n-1} + a_n * basis_n`. The endpoints
/// are the caller's business (see [`crate::kernel::MetalogKernel::quantile_with`]).
#[inline]
pub fn quantile_unbounded(a: &[f64], p: f64) -> f64 {
    let ln_odds = logit(p);
    let c = p - 0.5;
    a.iter().enumerate().map(|(i, &ai)| ai * basis_value(i + 1, c, ln_odds)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_terms_is_logistic() {
        let a = [3.0, 0.5];
        let p: f64 = 0.8;
        assert_relative_eq!(quantile_unbounded(&a, p), 3.0 + 0.5 * (p / (1.0 - p)).ln());
        assert_eq!(quantile_unbounded(&a, 0.5), 3.0);
    }

    #[test]
    fn test_closed_form_terms_three_and_four() {
        let a = [1.0, 2.0, 0.3, -0.7];
        let p: f64 = 0.25;
        let l = (p / (1.0 - p)).ln();
        let expected = 1.0 + 2.0 * l + 0.3 * (p - 0.5) * l - 0.7 * (p - 0.5);
        assert_relative_eq!(quantile_unbounded(&a, p), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_higher_terms_accumulate() {
        let a = [0.0, 1.0, 0.0, 0.0, 2.0, 0.5];
        let p: f64 = 0.9;
        let l = (p / (1.0 - p)).ln();
        let c = p - 0.5;
        let expected = l + 2.0 * c * c + 0.5 * c * c * l;
        assert_relative_eq!(quantile_unbounded(&a, p), expected, epsilon = 1e-14);
    }
}
