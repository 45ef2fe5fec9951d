//! End-to-end fitting scenarios.
//!
//! - well-behaved samples: linear least squares is enough
//! - close tails with a wide middle: linear fit is non-monotone and is refined
//! - lower-bounded support: boundary quantile and density
//! - more terms than samples: singular normal equations
//! - normal quantiles (statrs reference) recovered by a 5-term fit

use approx::assert_relative_eq;
use mlg_core::{
    Boundedness, Bounds, ContinuousDistribution, Error, FeasibilityMethod, FitMethod,
    FitMethodUsed, NumericSolver,
};
use mlg_inference::{Metalog, MetalogConfig, PlotRange, Samples};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn close_tails() -> Samples {
    Samples::new(vec![0.01, 0.25, 0.75, 0.99], vec![-1.1, -1.0, 1.0, 1.1]).unwrap()
}

#[test]
fn linear_fit_is_kept_when_feasible() {
    let samples = Samples::new(vec![0.1, 0.5, 0.9], vec![1.0, 2.0, 3.0]).unwrap();
    let m = Metalog::fit(samples, &MetalogConfig::default().with_term(3)).unwrap();

    assert!(m.valid_distribution().unwrap());
    assert_eq!(m.fit_method_used(), FitMethodUsed::Lls);
    assert_eq!(m.fit_method_used().to_string(), "LLS");
    assert_eq!(m.numeric_solver_used(), NumericSolver::None);
    assert_eq!(m.violation_score().unwrap(), 0.0);
    assert!(m.mean_square_error().unwrap().unwrap() < 1e-18);
    assert_relative_eq!(m.quantile(0.1), 1.0, epsilon = 1e-10);
    assert_relative_eq!(m.quantile(0.9), 3.0, epsilon = 1e-10);
}

#[test]
fn non_monotone_linear_fit_is_refined() {
    let lls = Metalog::fit(
        close_tails(),
        &MetalogConfig::default().with_fit_method(FitMethod::LinearOnly),
    )
    .unwrap();
    assert!(!lls.valid_distribution().unwrap());

    let m = Metalog::fit(close_tails(), &MetalogConfig::default()).unwrap();
    assert!(m.valid_distribution().unwrap());
    assert_eq!(m.fit_method_used(), FitMethodUsed::Numeric);
    assert_eq!(m.fit_method_used().to_string(), "numeric");
    assert_ne!(m.numeric_solver_used(), NumericSolver::None);

    let d = m.diagnostics().unwrap();
    assert_eq!(d.lls_violation_score, lls.violation_score().unwrap());
    assert!(d.solver_converged.is_some());

    let mse = m.mean_square_error().unwrap().unwrap();
    assert!(mse.is_finite());

    let ps = PlotRange::default().probabilities();
    let xs = m.quantiles(&ps);
    assert!(xs.windows(2).all(|w| w[0] <= w[1]));
}

/// Mean-square error of the logistic `[0, s, 0, 0]` spanning the close-tails samples.
fn logistic_baseline_mse() -> f64 {
    let s = 2.2 / (2.0 * (0.99f64 / 0.01).ln());
    Metalog::from_coefficients(vec![0.0, s, 0.0, 0.0], Bounds::unbounded(), None, FeasibilityMethod::default())
        .unwrap()
        .with_samples(close_tails())
        .mean_square_error()
        .unwrap()
        .unwrap()
}

#[test]
fn every_feasibility_method_yields_a_valid_refinement() {
    let baseline = logistic_baseline_mse();
    assert!(baseline < 0.03, "baseline={baseline}");
    for method in FeasibilityMethod::ALL {
        let cfg = MetalogConfig::default().with_feasibility_method(method);
        let m = Metalog::fit(close_tails(), &cfg).unwrap();
        assert!(m.valid_distribution().unwrap(), "{method}");
        assert_eq!(m.fit_method_used(), FitMethodUsed::Numeric, "{method}");
        assert_eq!(m.feasibility_method(), method);

        let mse = m.mean_square_error().unwrap().unwrap();
        assert!(mse <= baseline + 1e-12, "{method}: mse={mse} baseline={baseline}");
        assert!(m.coefficients().iter().all(|a| a.abs() < 1e3), "{method}: {:?}", m.coefficients());
    }
}

#[test]
fn minimum_increment_refinement_is_monotone_in_the_tails() {
    let cfg = MetalogConfig::default()
        .with_feasibility_method(FeasibilityMethod::QuantileMinimumIncrement);
    let m = Metalog::fit(close_tails(), &cfg).unwrap();
    assert!(m.valid_distribution().unwrap());

    let mut ps: Vec<f64> = (3..=9).rev().map(|k| 10f64.powi(-k)).collect();
    ps.extend((1..1000).map(|i| i as f64 / 1000.0));
    ps.extend((3..=9).map(|k| 1.0 - 10f64.powi(-k)));
    let xs = m.quantiles(&ps);
    for (w, p) in xs.windows(2).zip(&ps) {
        assert!(w[1] - w[0] >= -1e-6, "decrease after p={p}: {} -> {}", w[0], w[1]);
    }
}

#[test]
fn lower_bound_pins_quantile_and_density() {
    let samples = Samples::new(vec![0.1, 0.5, 0.9], vec![0.5, 2.0, 6.0]).unwrap();
    let cfg = MetalogConfig::default().with_bounds(Bounds::lower(0.0));
    let m = Metalog::fit(samples, &cfg).unwrap();

    assert_eq!(m.boundedness(), Boundedness::Lower);
    assert!(m.valid_distribution().unwrap());
    assert_eq!(m.quantile(0.0), 0.0);
    assert_eq!(m.quantile(1.0), f64::INFINITY);
    assert_eq!(m.density(0.0).unwrap(), 0.0);
    assert!(matches!(m.density(1.0), Err(Error::Domain(_))));
    assert_relative_eq!(m.quantile(0.5), 2.0, epsilon = 1e-9);
    assert!(matches!(m.cdf(-1.0), Err(Error::Domain(_))));
}

#[test]
fn more_terms_than_samples_is_singular() {
    let samples = Samples::new(vec![0.1, 0.5, 0.9], vec![1.0, 2.0, 3.0]).unwrap();
    let err = Metalog::fit(samples, &MetalogConfig::default().with_term(4)).unwrap_err();
    assert!(matches!(err, Error::SingularMatrix(_)), "{err}");
}

#[test]
fn normal_quantiles_are_recovered() {
    let normal = Normal::new(10.0, 2.0).unwrap();
    let ps: Vec<f64> = (1..10).map(|i| i as f64 / 10.0).collect();
    let xs: Vec<f64> = ps.iter().map(|&p| normal.inverse_cdf(p)).collect();
    let samples = Samples::new(ps.clone(), xs.clone()).unwrap();

    let m = Metalog::fit(samples, &MetalogConfig::default().with_term(5)).unwrap();
    assert!(m.valid_distribution().unwrap());
    assert_eq!(m.fit_method_used(), FitMethodUsed::Lls);
    assert!(m.mean_square_error().unwrap().unwrap() < 1e-5);

    assert_relative_eq!(m.quantile(0.5), 10.0, epsilon = 1e-6);
    for (&p, &x) in ps.iter().zip(&xs) {
        assert_relative_eq!(m.quantile(p), x, max_relative = 5e-3);
        assert_relative_eq!(m.cdf(x).unwrap(), p, epsilon = 5e-3);
    }
    assert_relative_eq!(m.pdf(10.0).unwrap(), normal.pdf(10.0), max_relative = 0.05);
}

#[test]
fn direct_coefficients_skip_the_fit() {
    let m = Metalog::from_coefficients(
        vec![0.0, -0.35, 0.0, 5.5],
        Bounds::unbounded(),
        None,
        FeasibilityMethod::default(),
    )
    .unwrap();
    assert_eq!(m.fit_method_used(), FitMethodUsed::None);
    assert!(!m.valid_distribution().unwrap());
    assert_eq!(m.mean_square_error().unwrap(), None);

    let scored = m.with_samples(close_tails());
    assert!(scored.mean_square_error().unwrap().is_some());
}
