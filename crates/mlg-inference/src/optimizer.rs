//! Optimization algorithms
//!
//! This module provides wrappers around argmin optimizers with a clean interface:
//! a quasi-Newton solver (L-BFGS) and a trust-region solver (Steihaug subproblem).

use argmin::core::{
    CostFunction, Executor, Gradient, Hessian, State, TerminationReason, TerminationStatus,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use argmin::solver::trustregion::{Steihaug, TrustRegion};
use mlg_core::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration for the L-BFGS optimizer
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Maximum number of iterations
    pub max_iter: u64,
    /// Convergence tolerance for gradient norm
    pub tol: f64,
    /// Number of corrections to approximate inverse Hessian
    pub m: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { max_iter: 200, tol: 1e-8, m: 10 }
    }
}

/// Configuration for the trust-region optimizer
#[derive(Debug, Clone)]
pub struct TrustRegionConfig {
    /// Maximum number of iterations
    pub max_iter: u64,
}

impl Default for TrustRegionConfig {
    fn default() -> Self {
        Self { max_iter: 100 }
    }
}

/// Result of optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameters found
    pub parameters: Vec<f64>,
    /// Function value at `parameters`
    pub fval: f64,
    /// Number of iterations
    pub n_iter: u64,
    /// Number of objective (cost) evaluations.
    pub n_fev: usize,
    /// Number of gradient evaluations.
    pub n_gev: usize,
    /// Number of Hessian evaluations.
    pub n_hev: usize,
    /// Convergence status
    pub converged: bool,
    /// Termination message
    pub message: String,
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizationResult(fval={:.6e}, n_iter={}, n_fev={}, n_gev={}, n_hev={}, converged={})",
            self.fval, self.n_iter, self.n_fev, self.n_gev, self.n_hev, self.converged
        )
    }
}

/// Objective function trait for optimization
pub trait ObjectiveFunction: Send + Sync {
    /// Evaluate function at given parameters
    fn eval(&self, params: &[f64]) -> Result<f64>;

    /// Finite-difference step for parameter value `x`.
    fn step(&self, x: f64) -> f64 {
        1e-8 * x.abs().max(1.0)
    }

    /// Compute gradient at given parameters (numerical if not overridden)
    fn gradient(&self, params: &[f64]) -> Result<Vec<f64>> {
        // Default: central differences
        let n = params.len();
        let mut grad = vec![0.0; n];

        for i in 0..n {
            let eps = self.step(params[i]);

            let mut params_plus = params.to_vec();
            params_plus[i] += eps;
            let f_plus = self.eval(&params_plus)?;

            let mut params_minus = params.to_vec();
            params_minus[i] -= eps;
            let f_minus = self.eval(&params_minus)?;

            grad[i] = (f_plus - f_minus) / (2.0 * eps);
        }

        Ok(grad)
    }

    /// Compute Hessian at given parameters (central differences of the gradient if not overridden)
    fn hessian(&self, params: &[f64]) -> Result<Vec<Vec<f64>>> {
        let n = params.len();
        let mut h = vec![vec![0.0; n]; n];

        for j in 0..n {
            let eps = self.step(params[j]);

            let mut params_plus = params.to_vec();
            params_plus[j] += eps;
            let g_plus = self.gradient(&params_plus)?;

            let mut params_minus = params.to_vec();
            params_minus[j] -= eps;
            let g_minus = self.gradient(&params_minus)?;

            for i in 0..n {
                h[i][j] = (g_plus[i] - g_minus[i]) / (2.0 * eps);
            }
        }

        // Symmetrize: finite differences are only approximately symmetric.
        for i in 0..n {
            for j in (i + 1)..n {
                let avg = 0.5 * (h[i][j] + h[j][i]);
                h[i][j] = avg;
                h[j][i] = avg;
            }
        }

        Ok(h)
    }
}

/// Wrapper to make ObjectiveFunction compatible with argmin
struct ArgminProblem<'a> {
    objective: &'a dyn ObjectiveFunction,
    counts: Arc<FuncCounts>,
}

#[derive(Default)]
struct FuncCounts {
    cost: AtomicUsize,
    grad: AtomicUsize,
    hess: AtomicUsize,
}

fn to_argmin_error(e: Error) -> argmin::core::Error {
    argmin::core::Error::msg(e.to_string())
}

impl<'a> CostFunction for ArgminProblem<'a> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        self.counts.cost.fetch_add(1, Ordering::Relaxed);
        self.objective.eval(params).map_err(to_argmin_error)
    }
}

impl<'a> Gradient for ArgminProblem<'a> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(
        &self,
        params: &Self::Param,
    ) -> std::result::Result<Self::Gradient, argmin::core::Error> {
        self.counts.grad.fetch_add(1, Ordering::Relaxed);
        self.objective.gradient(params).map_err(to_argmin_error)
    }
}

impl<'a> Hessian for ArgminProblem<'a> {
    type Param = Vec<f64>;
    type Hessian = Vec<Vec<f64>>;

    fn hessian(
        &self,
        params: &Self::Param,
    ) -> std::result::Result<Self::Hessian, argmin::core::Error> {
        self.counts.hess.fetch_add(1, Ordering::Relaxed);
        self.objective.hessian(params).map_err(to_argmin_error)
    }
}

fn is_converged(termination: &TerminationStatus) -> bool {
    matches!(
        termination,
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
            | TerminationStatus::Terminated(TerminationReason::TargetCostReached)
    )
}

fn validate_init(init_params: &[f64]) -> Result<()> {
    if init_params.is_empty() {
        return Err(Error::Validation("optimizer needs at least one parameter".to_string()));
    }
    if init_params.iter().any(|v| !v.is_finite()) {
        return Err(Error::Validation(format!(
            "initial parameters must be finite, got {init_params:?}"
        )));
    }
    Ok(())
}

/// L-BFGS optimizer (unconstrained)
pub struct LbfgsOptimizer {
    config: OptimizerConfig,
}

impl LbfgsOptimizer {
    /// Create new L-BFGS optimizer with given configuration
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Minimize objective function
    ///
    /// # Arguments
    /// * `objective` - Objective function to minimize
    /// * `init_params` - Initial parameter values
    ///
    /// # Returns
    /// Optimization result with best parameters
    pub fn minimize(
        &self,
        objective: &dyn ObjectiveFunction,
        init_params: &[f64],
    ) -> Result<OptimizationResult> {
        validate_init(init_params)?;

        let counts = Arc::new(FuncCounts::default());
        let problem = ArgminProblem { objective, counts: counts.clone() };

        let linesearch = MoreThuenteLineSearch::new();
        // Argmin's default cost tolerance is ~EPS; squared-error objectives plateau long before that.
        let tol_cost =
            if self.config.tol == 0.0 { 0.0 } else { (0.1 * self.config.tol).max(1e-14) };
        let solver = LBFGS::new(linesearch, self.config.m)
            .with_tolerance_grad(self.config.tol)
            .map_err(|e| Error::Validation(format!("Invalid optimizer configuration (tol): {e}")))?;
        let solver = solver.with_tolerance_cost(tol_cost).map_err(|e| {
            Error::Validation(format!("Invalid optimizer configuration (tol_cost): {e}"))
        })?;

        let res = Executor::new(problem, solver)
            .configure(|state| state.param(init_params.to_vec()).max_iters(self.config.max_iter))
            .run()
            .map_err(|e| Error::Computation(format!("L-BFGS optimization failed: {e}")))?;

        let state = res.state();
        let parameters = state
            .get_best_param()
            .ok_or_else(|| Error::Computation("No best parameters found".to_string()))?
            .clone();
        let termination = state.get_termination_status();

        Ok(OptimizationResult {
            parameters,
            fval: state.get_best_cost(),
            n_iter: state.get_iter(),
            n_fev: counts.cost.load(Ordering::Relaxed),
            n_gev: counts.grad.load(Ordering::Relaxed),
            n_hev: 0,
            converged: is_converged(termination),
            message: termination.to_string(),
        })
    }
}

impl Default for LbfgsOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

/// Trust-region optimizer with a Steihaug (truncated CG) subproblem
pub struct TrustRegionOptimizer {
    config: TrustRegionConfig,
}

impl TrustRegionOptimizer {
    /// Create new trust-region optimizer with given configuration
    pub fn new(config: TrustRegionConfig) -> Self {
        Self { config }
    }

    /// Minimize objective function using its gradient and Hessian
    pub fn minimize(
        &self,
        objective: &dyn ObjectiveFunction,
        init_params: &[f64],
    ) -> Result<OptimizationResult> {
        validate_init(init_params)?;

        let counts = Arc::new(FuncCounts::default());
        let problem = ArgminProblem { objective, counts: counts.clone() };

        let subproblem: Steihaug<Vec<f64>, f64> = Steihaug::new();
        let solver: TrustRegion<Steihaug<Vec<f64>, f64>, f64> = TrustRegion::new(subproblem);

        let res = Executor::new(problem, solver)
            .configure(|state| state.param(init_params.to_vec()).max_iters(self.config.max_iter))
            .run()
            .map_err(|e| Error::Computation(format!("trust-region optimization failed: {e}")))?;

        let state = res.state();
        let parameters = state
            .get_best_param()
            .ok_or_else(|| Error::Computation("No best parameters found".to_string()))?
            .clone();
        let termination = state.get_termination_status();

        Ok(OptimizationResult {
            parameters,
            fval: state.get_best_cost(),
            n_iter: state.get_iter(),
            n_fev: counts.cost.load(Ordering::Relaxed),
            n_gev: counts.grad.load(Ordering::Relaxed),
            n_hev: counts.hess.load(Ordering::Relaxed),
            converged: is_converged(termination),
            message: termination.to_string(),
        })
    }
}

impl Default for TrustRegionOptimizer {
    fn default() -> Self {
        Self::new(TrustRegionConfig::default())
    }
}
