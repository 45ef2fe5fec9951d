//! A metalog with a known coefficient vector.
//!
//! [`MetalogKernel`] is the evaluation half of a metalog distribution: it knows
//! nothing about samples or fitting, only coefficients and bounds. The fitting
//! pipeline builds many short-lived kernels while scoring candidates.

use mlg_core::{Boundedness, Bounds, ContinuousDistribution, Error, Result};

use crate::basis::MIN_TERM;
use crate::density::density_unbounded;
use crate::quantile::quantile_unbounded;
use crate::roots::{RootConfig, invert_quantile};
use crate::transforms::SupportTransform;

/// Coefficients + bounds: everything needed to evaluate a metalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MetalogKernel {
    coefficients: Vec<f64>,
    bounds: Bounds,
    transform: SupportTransform,
    roots: RootConfig,
}

impl MetalogKernel {
    /// Create a kernel from a coefficient vector (`term = coefficients.len()`).
    pub fn new(coefficients: Vec<f64>, bounds: Bounds) -> Result<Self> {
        bounds.validate()?;
        if coefficients.len() < MIN_TERM {
            return Err(Error::Validation(format!(
                "a metalog needs at least {MIN_TERM} coefficients, got {}",
                coefficients.len()
            )));
        }
        Ok(Self {
            coefficients,
            transform: SupportTransform::from_bounds(&bounds),
            bounds,
            roots: RootConfig::default(),
        })
    }

    /// Override the root-finder settings used by `cdf` / `pdf`.
    pub fn with_root_config(mut self, roots: RootConfig) -> Self {
        self.roots = roots;
        self
    }

    /// Number of terms.
    pub fn term(&self) -> usize {
        self.coefficients.len()
    }

    /// The a-vector.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Declared bounds.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Boundedness tag.
    pub fn boundedness(&self) -> Boundedness {
        self.transform.boundedness()
    }

    /// Bounds transform.
    pub fn transform(&self) -> &SupportTransform {
        &self.transform
    }

    /// Root-finder settings.
    pub fn root_config(&self) -> &RootConfig {
        &self.roots
    }

    /// Same bounds and solver settings, different coefficients.
    pub fn with_coefficients(&self, coefficients: Vec<f64>) -> Result<Self> {
        Ok(Self::new(coefficients, self.bounds)?.with_root_config(self.roots))
    }

    /// Quantile at `p` (Keelin 2016, equations 6, 11 and 14).
    ///
    /// `p <= 0` gives `lbound` (or `-inf`), `p >= 1` gives `ubound` (or `+inf`).
    /// With `force_unbounded` the value stays in unconstrained space.
    pub fn quantile_with(&self, p: f64, force_unbounded: bool) -> f64 {
        let boundedness = self.boundedness();
        if p <= 0.0 {
            return match self.bounds.lower {
                Some(lower) if boundedness.has_lower() && !force_unbounded => lower,
                _ => f64::NEG_INFINITY,
            };
        }
        if p >= 1.0 {
            return match self.bounds.upper {
                Some(upper) if boundedness.has_upper() && !force_unbounded => upper,
                _ => f64::INFINITY,
            };
        }

        let z = quantile_unbounded(&self.coefficients, p);
        if force_unbounded { z } else { self.transform.forward(z) }
    }

    /// Density as a function of cumulative probability (Keelin's `m(p)`).
    pub fn density(&self, p: f64) -> Result<f64> {
        self.density_with(p, false)
    }

    /// Density at cumulative probability `p` (Keelin 2016, equations 9, 13 and 15).
    ///
    /// Endpoints: a bounded side has density exactly 0 at its end; an unbounded
    /// side (or any side when `force_unbounded`) has no density there.
    pub fn density_with(&self, p: f64, force_unbounded: bool) -> Result<f64> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::Domain(format!("probability must be in [0, 1], got {p}")));
        }

        let at_lower = p == 0.0;
        let at_upper = p == 1.0;
        if at_lower || at_upper {
            let boundedness = self.boundedness();
            let bounded_side =
                if at_lower { boundedness.has_lower() } else { boundedness.has_upper() };
            if bounded_side && !force_unbounded {
                return Ok(0.0);
            }
            return Err(Error::Domain(format!(
                "density is undefined at p={p} for a distribution unbounded on that side"
            )));
        }

        let m = density_unbounded(&self.coefficients, p);
        if force_unbounded || matches!(self.transform, SupportTransform::Identity) {
            return Ok(m);
        }
        let z = quantile_unbounded(&self.coefficients, p);
        Ok(m / self.transform.jacobian(z))
    }
}

impl ContinuousDistribution for MetalogKernel {
    fn quantile(&self, p: f64) -> f64 {
        self.quantile_with(p, false)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        invert_quantile(|p| self.quantile_with(p, false), x, &self.roots)
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        let p = self.cdf(x)?;
        self.density(p)
    }
}
