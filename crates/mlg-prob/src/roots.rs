//! Bracketed root finding over the unit interval.
//!
//! The metalog has no closed-form CDF, so `cdf(x)` is the zero of
//! `quantile(p) - x` on `p ∈ [0, 1]`. Brent's method (argmin's `BrentRoot`)
//! converges whenever the bracket shows a sign change.

use argmin::core::{CostFunction, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::brent::BrentRoot;
use mlg_core::{Error, Result};

/// Settings for [`invert_quantile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootConfig {
    /// Absolute tolerance on `p`.
    pub tol: f64,
    /// Maximum number of Brent iterations.
    pub max_iter: u64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self { tol: 2e-12, max_iter: 200 }
    }
}

/// `quantile(p) - x`, with infinite quantiles pinned to `±f64::MAX`.
struct QuantileOffset<'a, F> {
    quantile: &'a F,
    x: f64,
}

impl<'a, F> QuantileOffset<'a, F>
where
    F: Fn(f64) -> f64,
{
    fn eval(&self, p: f64) -> f64 {
        let v = (self.quantile)(p) - self.x;
        if v.is_infinite() { f64::MAX.copysign(v) } else { v }
    }
}

impl<'a, F> CostFunction for QuantileOffset<'a, F>
where
    F: Fn(f64) -> f64,
{
    type Param = f64;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let v = self.eval(*p);
        if v.is_nan() {
            return Err(argmin::core::Error::msg(format!("quantile is NaN at p={p}")));
        }
        Ok(v)
    }
}

/// Find `p ∈ [0, 1]` with `quantile(p) = x`.
///
/// `x = -inf` / `x = +inf` map to 0 / 1 directly. An `x` outside the range
/// `[quantile(0), quantile(1)]` has no bracket and is a [`Error::Domain`].
pub fn invert_quantile<F>(quantile: F, x: f64, config: &RootConfig) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if x.is_nan() {
        return Err(Error::Domain("cannot invert the quantile function at x = NaN".to_string()));
    }
    if x == f64::NEG_INFINITY {
        return Ok(0.0);
    }
    if x == f64::INFINITY {
        return Ok(1.0);
    }

    let problem = QuantileOffset { quantile: &quantile, x };
    let (f_lo, f_hi) = (problem.eval(0.0), problem.eval(1.0));
    if f_lo == 0.0 {
        return Ok(0.0);
    }
    if f_hi == 0.0 {
        return Ok(1.0);
    }
    if f_lo.is_nan() || f_hi.is_nan() || f_lo.signum() == f_hi.signum() {
        return Err(Error::Domain(format!(
            "x={x} is not bracketed by the quantile function on [0, 1] \
             (q(0)-x={f_lo}, q(1)-x={f_hi})"
        )));
    }

    let solver = BrentRoot::new(0.0, 1.0, config.tol);
    let res = Executor::new(problem, solver)
        .configure(|state| state.param(0.5).max_iters(config.max_iter))
        .run()
        .map_err(|e| Error::Computation(format!("root finding failed at x={x}: {e}")))?;

    let state = res.state();
    if matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::MaxItersReached)
    ) {
        return Err(Error::NonConvergence(format!(
            "root finding for x={x} did not converge in {} iterations",
            config.max_iter
        )));
    }
    let p = *state
        .get_param()
        .ok_or_else(|| Error::Computation("root finder returned no parameter".to_string()))?;
    Ok(p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn logistic_quantile(p: f64) -> f64 {
        if p <= 0.0 {
            f64::NEG_INFINITY
        } else if p >= 1.0 {
            f64::INFINITY
        } else {
            (p / (1.0 - p)).ln()
        }
    }

    #[test]
    fn test_inverts_logistic() {
        let cfg = RootConfig::default();
        for x in [-6.0_f64, -1.0, 0.0, 0.3, 4.0] {
            let p = invert_quantile(logistic_quantile, x, &cfg).unwrap();
            assert_abs_diff_eq!(p, 1.0 / (1.0 + (-x).exp()), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_infinite_x() {
        let cfg = RootConfig::default();
        assert_eq!(invert_quantile(logistic_quantile, f64::NEG_INFINITY, &cfg).unwrap(), 0.0);
        assert_eq!(invert_quantile(logistic_quantile, f64::INFINITY, &cfg).unwrap(), 1.0);
        assert!(matches!(
            invert_quantile(logistic_quantile, f64::NAN, &cfg),
            Err(Error::Domain(_))
        ));
    }

    #[test]
    fn test_bounded_endpoints_and_outside_support() {
        let cfg = RootConfig::default();
        let q = |p: f64| 2.0 + 3.0 * p.clamp(0.0, 1.0);
        assert_eq!(invert_quantile(q, 2.0, &cfg).unwrap(), 0.0);
        assert_eq!(invert_quantile(q, 5.0, &cfg).unwrap(), 1.0);
        assert_abs_diff_eq!(invert_quantile(q, 3.5, &cfg).unwrap(), 0.5, epsilon = 1e-9);
        assert!(matches!(invert_quantile(q, 7.0, &cfg), Err(Error::Domain(_))));
    }
}
