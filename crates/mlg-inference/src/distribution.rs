//! The [`Metalog`] distribution.

use mlg_core::{
    Boundedness, Bounds, ContinuousDistribution, Error, FeasibilityMethod, FitDiagnostics,
    FitMethodUsed, FitResult, NumericSolver, Result,
};
use mlg_prob::{MIN_TERM, MetalogKernel, RootConfig};

use crate::feasibility::{mean_square_error, strategy};
use crate::fit::{MetalogConfig, MetalogFitter};
use crate::samples::Samples;

/// A metalog distribution: a kernel plus how it was obtained.
///
/// Built either by fitting samples ([`Metalog::fit`]) or from a known
/// coefficient vector ([`Metalog::from_coefficients`]). Immutable once built.
#[derive(Debug, Clone)]
pub struct Metalog {
    kernel: MetalogKernel,
    feasibility_method: FeasibilityMethod,
    diagnostics: Option<FitDiagnostics>,
    samples: Option<Samples>,
}

impl Metalog {
    /// Fit `samples` with `config`.
    pub fn fit(samples: Samples, config: &MetalogConfig) -> Result<Self> {
        let result = MetalogFitter::new(config.clone()).fit(&samples)?;
        Self::from_fit_result(result, config.bounds, config.feasibility_method)
            .map(|m| m.with_root_config(config.roots).with_samples(samples))
    }

    /// Wrap a finished [`FitResult`].
    pub fn from_fit_result(
        result: FitResult,
        bounds: Bounds,
        feasibility_method: FeasibilityMethod,
    ) -> Result<Self> {
        Ok(Self {
            kernel: MetalogKernel::new(result.coefficients, bounds)?,
            feasibility_method,
            diagnostics: Some(result.diagnostics),
            samples: None,
        })
    }

    /// Accept a coefficient vector as given, skipping the fit.
    ///
    /// `term` defaults to `coefficients.len()`; a smaller `term` keeps the
    /// leading coefficients. Validity is only computed when queried.
    pub fn from_coefficients(
        mut coefficients: Vec<f64>,
        bounds: Bounds,
        term: Option<usize>,
        feasibility_method: FeasibilityMethod,
    ) -> Result<Self> {
        let term = term.unwrap_or(coefficients.len());
        if term < MIN_TERM || term > coefficients.len() {
            return Err(Error::Validation(format!(
                "term must be in [{MIN_TERM}, {}], got {term}",
                coefficients.len()
            )));
        }
        coefficients.truncate(term);
        Ok(Self {
            kernel: MetalogKernel::new(coefficients, bounds)?,
            feasibility_method,
            diagnostics: None,
            samples: None,
        })
    }

    /// Attach samples used by [`Metalog::mean_square_error`].
    pub fn with_samples(mut self, samples: Samples) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Override the root-finder settings used by `cdf` / `pdf`.
    pub fn with_root_config(mut self, roots: RootConfig) -> Self {
        self.kernel = self.kernel.with_root_config(roots);
        self
    }

    /// Underlying kernel.
    pub fn kernel(&self) -> &MetalogKernel {
        &self.kernel
    }

    /// The a-vector.
    pub fn coefficients(&self) -> &[f64] {
        self.kernel.coefficients()
    }

    /// Number of terms.
    pub fn term(&self) -> usize {
        self.kernel.term()
    }

    /// Declared bounds.
    pub fn bounds(&self) -> &Bounds {
        self.kernel.bounds()
    }

    /// Boundedness tag.
    pub fn boundedness(&self) -> Boundedness {
        self.kernel.boundedness()
    }

    /// Feasibility strategy used for validity queries.
    pub fn feasibility_method(&self) -> FeasibilityMethod {
        self.feasibility_method
    }

    /// Fit diagnostics (`None` for a distribution built from coefficients).
    pub fn diagnostics(&self) -> Option<&FitDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Attached samples.
    pub fn samples(&self) -> Option<&Samples> {
        self.samples.as_ref()
    }

    /// Stage that produced the coefficients.
    pub fn fit_method_used(&self) -> FitMethodUsed {
        self.diagnostics.as_ref().map_or(FitMethodUsed::None, |d| d.fit_method_used)
    }

    /// Numeric solver kept by the refiner.
    pub fn numeric_solver_used(&self) -> NumericSolver {
        self.diagnostics.as_ref().map_or(NumericSolver::None, |d| d.numeric_solver_used)
    }

    /// Whether the coefficients give a valid (monotone) distribution.
    pub fn valid_distribution(&self) -> Result<bool> {
        match &self.diagnostics {
            Some(d) => Ok(d.valid_distribution),
            None => {
                let s = strategy(self.feasibility_method);
                Ok(s.is_feasible(s.score(&self.kernel)?))
            }
        }
    }

    /// Feasibility score: 0 when valid, the strategy's raw score otherwise.
    pub fn violation_score(&self) -> Result<f64> {
        match &self.diagnostics {
            Some(d) => Ok(d.violation_score),
            None => {
                let s = strategy(self.feasibility_method);
                Ok(s.reported(s.score(&self.kernel)?))
            }
        }
    }

    /// Mean-square CDF error against the attached samples (`None` without samples).
    pub fn mean_square_error(&self) -> Result<Option<f64>> {
        self.samples.as_ref().map(|s| mean_square_error(&self.kernel, s)).transpose()
    }

    /// Quantile, optionally kept in unconstrained space.
    pub fn quantile_with(&self, p: f64, force_unbounded: bool) -> f64 {
        self.kernel.quantile_with(p, force_unbounded)
    }

    /// Density at cumulative probability `p`.
    pub fn density(&self, p: f64) -> Result<f64> {
        self.kernel.density(p)
    }

    /// Density at cumulative probability `p`, optionally in unconstrained space.
    pub fn density_with(&self, p: f64, force_unbounded: bool) -> Result<f64> {
        self.kernel.density_with(p, force_unbounded)
    }

    /// Densities at cumulative probabilities `ps`.
    pub fn densities(&self, ps: &[f64]) -> Result<Vec<f64>> {
        ps.iter().map(|&p| self.kernel.density(p)).collect()
    }
}

impl ContinuousDistribution for Metalog {
    fn quantile(&self, p: f64) -> f64 {
        self.kernel.quantile(p)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        self.kernel.cdf(x)
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        self.kernel.pdf(x)
    }
}
