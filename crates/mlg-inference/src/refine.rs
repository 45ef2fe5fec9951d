//! Numeric refinement of an infeasible linear least-squares fit.
//!
//! Minimizes the mean-square CDF error over the a-vector subject to the
//! feasibility constraint of the chosen strategy. argmin has no nonlinear
//! constraints, so each stage is a penalty method (`MSE + w·violation²` over an
//! increasing schedule of `w`) followed by a restoration step on the segment to a
//! feasible logistic anchor: bisection finds how far along the segment the
//! constraint still holds, then a Brent search keeps the lowest-error point of
//! that feasible part. A stage therefore never ends worse than the anchor.
//!
//! Stage 1 uses L-BFGS. Stage 2 (trust region, seeded from stage 1) only runs
//! when stage 1 leaves an error above `escalation_mse` or an infeasible result.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::brent::BrentOpt;
use mlg_core::{NumericSolver, Result};
use mlg_prob::MetalogKernel;
use mlg_prob::math::logit;

use crate::feasibility::{FeasibilityScore, mean_square_error};
use crate::optimizer::{
    LbfgsOptimizer, ObjectiveFunction, OptimizationResult, OptimizerConfig, TrustRegionConfig,
    TrustRegionOptimizer,
};
use crate::samples::Samples;

/// Cost assigned to candidates that cannot be evaluated (e.g. the CDF cannot be bracketed).
const INVALID_COST: f64 = 1e10;

/// Iteration cap of the line search along the anchor segment.
const SEGMENT_ITERS: u64 = 60;

/// Settings of the numeric refiner.
#[derive(Debug, Clone)]
pub struct RefinerConfig {
    /// Stage 1 (L-BFGS) settings.
    pub lbfgs: OptimizerConfig,
    /// Stage 2 (trust region) settings.
    pub trust_region: TrustRegionConfig,
    /// Stage 1 mean-square error above which stage 2 runs.
    pub escalation_mse: f64,
    /// Penalty weights tried in order until the penalized optimum is feasible.
    pub penalty_weights: Vec<f64>,
    /// Bisection steps of the feasibility restoration.
    pub restore_iters: usize,
    /// Relative finite-difference step for gradients and Hessians.
    pub fd_step: f64,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            lbfgs: OptimizerConfig::default(),
            trust_region: TrustRegionConfig::default(),
            escalation_mse: 0.01,
            penalty_weights: vec![1e2, 1e4, 1e6],
            restore_iters: 50,
            fd_step: 1e-6,
        }
    }
}

/// Outcome of [`refine`].
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Refined a-vector.
    pub coefficients: Vec<f64>,
    /// Solver whose result was kept.
    pub solver: NumericSolver,
    /// Mean-square error of `coefficients`.
    pub mean_square_error: f64,
    /// Whether `coefficients` satisfy the feasibility constraint.
    pub feasible: bool,
    /// Convergence flag of the kept solver's last run.
    pub converged: bool,
    /// Termination message of the kept solver's last run.
    pub message: String,
}

/// `MSE(a) + weight * violation(a)^2`.
struct PenalizedLoss<'a> {
    template: &'a MetalogKernel,
    samples: &'a Samples,
    strategy: &'a dyn FeasibilityScore,
    weight: f64,
    fd_step: f64,
}

impl<'a> PenalizedLoss<'a> {
    fn terms(&self, a: &[f64]) -> Result<(f64, f64)> {
        let kernel = self.template.with_coefficients(a.to_vec())?;
        let mse = mean_square_error(&kernel, self.samples)?;
        let violation = self.strategy.violation(self.strategy.score(&kernel)?);
        Ok((mse, violation))
    }
}

impl<'a> ObjectiveFunction for PenalizedLoss<'a> {
    fn eval(&self, params: &[f64]) -> Result<f64> {
        let cost = match self.terms(params) {
            Ok((mse, violation)) => mse + self.weight * violation * violation,
            Err(_) => INVALID_COST,
        };
        Ok(if cost.is_finite() { cost.min(INVALID_COST) } else { INVALID_COST })
    }

    fn step(&self, x: f64) -> f64 {
        self.fd_step * x.abs().max(1.0)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Lbfgs,
    TrustRegion,
}

impl Stage {
    fn solver(self) -> NumericSolver {
        match self {
            Self::Lbfgs => NumericSolver::Default,
            Self::TrustRegion => NumericSolver::TrustRegion,
        }
    }
}

struct Refiner<'a> {
    template: &'a MetalogKernel,
    samples: &'a Samples,
    strategy: &'a dyn FeasibilityScore,
    config: &'a RefinerConfig,
    anchor: Vec<f64>,
}

impl<'a> Refiner<'a> {
    fn is_feasible(&self, a: &[f64]) -> bool {
        self.template
            .with_coefficients(a.to_vec())
            .and_then(|k| self.strategy.score(&k))
            .map(|s| self.strategy.is_feasible(s))
            .unwrap_or(false)
    }

    fn mse(&self, a: &[f64]) -> f64 {
        self.template
            .with_coefficients(a.to_vec())
            .and_then(|k| mean_square_error(&k, self.samples))
            .unwrap_or(f64::INFINITY)
    }

    fn minimize(&self, stage: Stage, loss: &PenalizedLoss<'_>, init: &[f64]) -> Result<OptimizationResult> {
        match stage {
            Stage::Lbfgs => LbfgsOptimizer::new(self.config.lbfgs.clone()).minimize(loss, init),
            Stage::TrustRegion => {
                TrustRegionOptimizer::new(self.config.trust_region.clone()).minimize(loss, init)
            }
        }
    }

    fn blend(&self, candidate: &[f64], t: f64) -> Vec<f64> {
        self.anchor.iter().zip(candidate).map(|(&a0, &c)| a0 + t * (c - a0)).collect()
    }

    /// Largest `t` such that `anchor + t·(candidate − anchor)` is feasible.
    ///
    /// The feasible sets are convex in the a-vector, so `[0, t]` is feasible as a whole.
    fn feasible_reach(&self, candidate: &[f64]) -> Option<f64> {
        if self.is_feasible(candidate) {
            return Some(1.0);
        }
        if !self.is_feasible(&self.anchor) {
            return None;
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..self.config.restore_iters {
            let mid = 0.5 * (lo + hi);
            if self.is_feasible(&self.blend(candidate, mid)) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }

    /// Lowest-error feasible point on the segment from the anchor to `candidate`.
    ///
    /// Returns the point and its `t`; `t = 1` keeps `candidate` itself.
    fn best_on_segment(&self, candidate: Vec<f64>) -> (Vec<f64>, f64) {
        let Some(reach) = self.feasible_reach(&candidate) else {
            log::warn!("feasibility restoration skipped: logistic anchor is infeasible");
            return (candidate, 1.0);
        };

        let mut best = (reach, self.mse(&self.blend(&candidate, reach)));
        let at_anchor = self.mse(&self.anchor);
        if at_anchor < best.1 {
            best = (0.0, at_anchor);
        }
        if reach > 0.0 {
            let problem = SegmentError { refiner: self, candidate: &candidate };
            let solver = BrentOpt::new(0.0, reach).set_tolerance(f64::EPSILON.sqrt(), 1e-12);
            let polished = Executor::new(problem, solver)
                .configure(|state| state.param(0.5 * reach).max_iters(SEGMENT_ITERS))
                .run()
                .ok()
                .and_then(|res| {
                    let state = res.state();
                    state.get_best_param().map(|&t| (t, state.get_best_cost()))
                });
            if let Some((t, cost)) = polished {
                if (0.0..=reach).contains(&t) && cost < best.1 {
                    best = (t, cost);
                }
            }
        }

        let (t, mse) = best;
        if t < 1.0 {
            log::debug!("kept t={t:.6} of feasible reach {reach:.6} on the anchor segment (mse={mse:.3e})");
        }
        (self.blend(&candidate, t), t)
    }

    fn run_stage(&self, stage: Stage, init: &[f64]) -> Refinement {
        let mut x = init.to_vec();
        let mut converged = false;
        let mut message = String::from("not run");

        for &weight in &self.config.penalty_weights {
            let loss = PenalizedLoss {
                template: self.template,
                samples: self.samples,
                strategy: self.strategy,
                weight,
                fd_step: self.config.fd_step,
            };
            match self.minimize(stage, &loss, &x) {
                Ok(res) => {
                    log::debug!("{:?} stage, penalty weight {weight:e}: {res}", stage);
                    converged = res.converged;
                    message = res.message.clone();
                    if res.parameters.iter().all(|v| v.is_finite()) {
                        x = res.parameters;
                    }
                }
                Err(e) => {
                    log::debug!("{:?} stage failed at penalty weight {weight:e}: {e}", stage);
                    converged = false;
                    message = e.to_string();
                    break;
                }
            }
            if self.is_feasible(&x) {
                break;
            }
        }

        let (coefficients, t) = self.best_on_segment(x);
        if t < 1.0 {
            // The solver's own optimum was not kept.
            converged = false;
            message = format!("{message}; moved to t={t:.6} towards the logistic anchor");
        }
        Refinement {
            feasible: self.is_feasible(&coefficients),
            mean_square_error: self.mse(&coefficients),
            coefficients,
            solver: stage.solver(),
            converged,
            message,
        }
    }
}

/// Mean-square error along the anchor segment, as a function of `t`.
struct SegmentError<'r, 'a> {
    refiner: &'r Refiner<'a>,
    candidate: &'r [f64],
}

impl<'r, 'a> CostFunction for SegmentError<'r, 'a> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, t: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let mse = self.refiner.mse(&self.refiner.blend(self.candidate, *t));
        Ok(if mse.is_finite() { mse } else { INVALID_COST })
    }
}

fn spread(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    hi - lo
}

/// Logistic a-vector `[a1, s, 0, ...]` with `s > 0`: feasible under every strategy.
fn logistic_anchor(lls: &[f64], template: &MetalogKernel, samples: &Samples) -> Vec<f64> {
    let z = template.transform().z_vector(samples.xs());
    let finite_z: Vec<f64> = z.iter().copied().filter(|v| v.is_finite()).collect();

    let location = if lls[0].is_finite() {
        lls[0]
    } else if !finite_z.is_empty() {
        finite_z.iter().sum::<f64>() / finite_z.len() as f64
    } else {
        0.0
    };

    let scale = if lls[1].is_finite() && lls[1] > 0.0 {
        lls[1]
    } else {
        let z_spread = spread(finite_z.iter().copied());
        let l_spread = spread(samples.ps().iter().map(|&p| logit(p)));
        let s = z_spread / l_spread;
        if s.is_finite() && s > 0.0 { s } else { 1.0 }
    };

    let mut anchor = vec![0.0; lls.len()];
    anchor[0] = location;
    anchor[1] = scale;
    anchor
}

/// Refine the infeasible linear least-squares kernel `lls` against `samples`.
pub fn refine(
    lls: &MetalogKernel,
    samples: &Samples,
    strategy: &dyn FeasibilityScore,
    config: &RefinerConfig,
) -> Refinement {
    let refiner = Refiner {
        template: lls,
        samples,
        strategy,
        config,
        anchor: logistic_anchor(lls.coefficients(), lls, samples),
    };

    let first = refiner.run_stage(Stage::Lbfgs, lls.coefficients());
    log::debug!(
        "stage 1 (default): mse={:.3e}, feasible={}, converged={}",
        first.mean_square_error,
        first.feasible,
        first.converged
    );
    if first.feasible && first.mean_square_error <= config.escalation_mse {
        return first;
    }

    let second = refiner.run_stage(Stage::TrustRegion, &first.coefficients);
    log::debug!(
        "stage 2 (trust-region): mse={:.3e}, feasible={}, converged={}",
        second.mean_square_error,
        second.feasible,
        second.converged
    );
    match (first.feasible, second.feasible) {
        (_, true) if !first.feasible || second.mean_square_error < first.mean_square_error => {
            second
        }
        _ => first,
    }
}
