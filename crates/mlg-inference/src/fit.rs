//! Fit pipeline: linear least squares, feasibility check, numeric refinement.

use mlg_core::{
    Bounds, Error, FeasibilityMethod, FitDiagnostics, FitMethod, FitMethodUsed, FitResult, Result,
};
use mlg_prob::{MIN_TERM, MetalogKernel, RootConfig, SupportTransform, basis_matrix};

use crate::feasibility::strategy;
use crate::lls::fit_linear_least_squares;
use crate::refine::{RefinerConfig, refine};
use crate::samples::Samples;

/// Fit configuration.
#[derive(Debug, Clone, Default)]
pub struct MetalogConfig {
    /// Number of terms (default: number of samples).
    pub term: Option<usize>,
    /// Linear only, or linear with numeric fallback.
    pub fit_method: FitMethod,
    /// Support bounds.
    pub bounds: Bounds,
    /// Feasibility strategy used to judge (and constrain) the fit.
    pub feasibility_method: FeasibilityMethod,
    /// Numeric refiner settings.
    pub refiner: RefinerConfig,
    /// Root-finder settings for CDF evaluation.
    pub roots: RootConfig,
}

impl MetalogConfig {
    /// Set the number of terms.
    pub fn with_term(mut self, term: usize) -> Self {
        self.term = Some(term);
        self
    }

    /// Set the fit method.
    pub fn with_fit_method(mut self, fit_method: FitMethod) -> Self {
        self.fit_method = fit_method;
        self
    }

    /// Set the support bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the feasibility strategy.
    pub fn with_feasibility_method(mut self, method: FeasibilityMethod) -> Self {
        self.feasibility_method = method;
        self
    }

    /// Set the numeric refiner settings.
    pub fn with_refiner(mut self, refiner: RefinerConfig) -> Self {
        self.refiner = refiner;
        self
    }

    /// Set the root-finder settings.
    pub fn with_root_config(mut self, roots: RootConfig) -> Self {
        self.roots = roots;
        self
    }
}

/// Metalog fitter.
///
/// Runs linear least squares and, when the result fails the feasibility check
/// and the configuration allows it, the numeric refiner. The returned
/// [`FitResult`] is final: nothing about it changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetalogFitter {
    config: MetalogConfig,
}

impl MetalogFitter {
    /// Create a fitter with the given configuration
    pub fn new(config: MetalogConfig) -> Self {
        Self { config }
    }

    /// Access the configuration.
    pub fn config(&self) -> &MetalogConfig {
        &self.config
    }

    /// Fit the samples.
    ///
    /// # Errors
    /// `Validation` for bad bounds or `term < 2`, `SingularMatrix` when the
    /// normal equations cannot be solved (including `term > samples.len()`).
    /// An infeasible final fit is not an error: see
    /// [`FitDiagnostics::valid_distribution`].
    pub fn fit(&self, samples: &Samples) -> Result<FitResult> {
        let cfg = &self.config;
        cfg.bounds.validate()?;
        let term = cfg.term.unwrap_or(samples.len());
        if term < MIN_TERM {
            return Err(Error::Validation(format!(
                "term must be at least {MIN_TERM}, got {term}"
            )));
        }

        let transform = SupportTransform::from_bounds(&cfg.bounds);
        let z = transform.z_vector(samples.xs());
        if z.iter().any(|v| !v.is_finite()) {
            log::warn!(
                "sample values outside the {} support give non-finite z-values",
                transform.boundedness()
            );
        }

        let y = basis_matrix(samples.ps(), term)?;
        let a = fit_linear_least_squares(&y, &z)?;
        if a.iter().any(|v| !v.is_finite()) {
            log::warn!("linear least-squares coefficients are not finite; metalog is invalid");
            return Ok(FitResult::new(a, FitDiagnostics::lls(false, f64::NAN)));
        }

        let scorer = strategy(cfg.feasibility_method);
        let lls = MetalogKernel::new(a, cfg.bounds)?.with_root_config(cfg.roots);
        let lls_score = scorer.score(&lls)?;
        if scorer.is_feasible(lls_score) {
            log::debug!("linear least-squares fit is feasible ({})", cfg.feasibility_method);
            return Ok(FitResult::new(lls.coefficients().to_vec(), FitDiagnostics::lls(true, 0.0)));
        }

        let lls_violation = scorer.reported(lls_score);
        if cfg.fit_method == FitMethod::LinearOnly {
            log::warn!(
                "linear least-squares fit is infeasible ({} score {lls_violation:e}) and numeric \
                 refinement is disabled",
                cfg.feasibility_method
            );
            return Ok(FitResult::new(
                lls.coefficients().to_vec(),
                FitDiagnostics::lls(false, lls_violation),
            ));
        }

        log::debug!("linear least-squares fit is infeasible (score {lls_violation:e}); refining");
        let refined = refine(&lls, samples, scorer, &cfg.refiner);
        let final_score = scorer.score(&lls.with_coefficients(refined.coefficients.clone())?)?;
        let valid = scorer.is_feasible(final_score);
        if !valid {
            log::warn!(
                "numeric refinement ({}) did not reach a valid metalog ({} score {:e})",
                refined.solver,
                cfg.feasibility_method,
                final_score
            );
        }

        Ok(FitResult::new(
            refined.coefficients,
            FitDiagnostics {
                fit_method_used: FitMethodUsed::Numeric,
                numeric_solver_used: refined.solver,
                valid_distribution: valid,
                violation_score: scorer.reported(final_score),
                lls_violation_score: lls_violation,
                solver_converged: Some(refined.converged),
                solver_message: Some(refined.message),
            },
        ))
    }
}
