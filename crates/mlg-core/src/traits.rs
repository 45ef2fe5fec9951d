//! Core traits for the metalog crates
//!
//! Fitting code in `mlg-inference` and evaluation code in `mlg-prob` meet at
//! this trait: anything that can answer `quantile` / `cdf` / `pdf` can be
//! scored, plotted and summarized without knowing how it was built.

use crate::Result;

/// A univariate continuous distribution defined by its quantile function.
///
/// `quantile` is total: probabilities at or beyond the unit interval map to the
/// support endpoints (possibly infinite). `cdf` and `pdf` may need a numerical
/// inversion and are therefore fallible.
pub trait ContinuousDistribution {
    /// Inverse CDF at probability `p`.
    fn quantile(&self, p: f64) -> f64;

    /// Cumulative probability at `x`.
    fn cdf(&self, x: f64) -> Result<f64>;

    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> Result<f64>;

    /// Elementwise [`quantile`](Self::quantile).
    fn quantiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.quantile(p)).collect()
    }

    /// Elementwise [`cdf`](Self::cdf). Stops at the first failing element.
    fn cdfs(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.cdf(x)).collect()
    }

    /// Elementwise [`pdf`](Self::pdf). Stops at the first failing element.
    fn pdfs(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.pdf(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Uniform(0, 1).
    struct Unit;

    impl ContinuousDistribution for Unit {
        fn quantile(&self, p: f64) -> f64 {
            p.clamp(0.0, 1.0)
        }

        fn cdf(&self, x: f64) -> Result<f64> {
            Ok(x.clamp(0.0, 1.0))
        }

        fn pdf(&self, x: f64) -> Result<f64> {
            if x.is_nan() {
                return Err(Error::Domain("x is NaN".to_string()));
            }
            Ok(if (0.0..=1.0).contains(&x) { 1.0 } else { 0.0 })
        }
    }

    #[test]
    fn test_elementwise_defaults() {
        let d = Unit;
        assert_eq!(d.quantiles(&[-1.0, 0.25, 2.0]), vec![0.0, 0.25, 1.0]);
        assert_eq!(d.cdfs(&[0.5, 3.0]).unwrap(), vec![0.5, 1.0]);
        assert_eq!(d.pdfs(&[0.5, 3.0]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_elementwise_propagates_first_error() {
        let d = Unit;
        assert!(matches!(d.pdfs(&[0.5, f64::NAN, 0.1]), Err(Error::Domain(_))));
    }
}
