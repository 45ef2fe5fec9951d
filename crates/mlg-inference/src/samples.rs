//! Probability/quantile sample pairs used as fitting input.

use mlg_core::{Error, Result};

/// Ordered, equal-length sequences of probabilities `ps` and quantile values `xs`.
///
/// Duplicate probabilities are accepted but make the normal equations singular
/// when they leave fewer distinct points than terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    ps: Vec<f64>,
    xs: Vec<f64>,
}

impl Samples {
    /// Validate and wrap sample pairs.
    pub fn new(ps: Vec<f64>, xs: Vec<f64>) -> Result<Self> {
        if ps.len() != xs.len() {
            return Err(Error::Validation(format!(
                "cdf_ps and cdf_xs must have the same length, got {} and {}",
                ps.len(),
                xs.len()
            )));
        }
        if ps.is_empty() {
            return Err(Error::Validation("at least one sample pair is required".to_string()));
        }
        if let Some(p) = ps.iter().find(|p| !(**p > 0.0 && **p < 1.0)) {
            return Err(Error::Validation(format!("probabilities must lie in (0, 1), got {p}")));
        }
        if let Some(x) = xs.iter().find(|x| !x.is_finite()) {
            return Err(Error::Validation(format!("quantile values must be finite, got {x}")));
        }
        Ok(Self { ps, xs })
    }

    /// Probabilities.
    pub fn ps(&self) -> &[f64] {
        &self.ps
    }

    /// Quantile values.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Number of pairs (`cdf_len`).
    pub fn len(&self) -> usize {
        self.ps.len()
    }

    /// Always false for a validated sample set.
    pub fn is_empty(&self) -> bool {
        self.ps.is_empty()
    }

    /// Iterate over `(p, x)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ps.iter().copied().zip(self.xs.iter().copied())
    }
}
