//! Property tests: round trips, monotonicity and boundary values.

use mlg_core::{Bounds, ContinuousDistribution, FeasibilityMethod};
use mlg_inference::feasibility::{CHECK_FROM, QuantileSumNegativeIncrements};
use mlg_inference::{FeasibilityScore, Metalog, MetalogConfig, Samples};
use mlg_prob::MetalogKernel;
use mlg_prob::math::linspace;
use proptest::prelude::*;

/// Three-point samples with gaps of similar size: the exact 3-term fit is feasible.
fn fitted(x0: f64, g1: f64, g2: f64, bounds: Bounds) -> Metalog {
    let samples = Samples::new(vec![0.1, 0.5, 0.9], vec![x0, x0 + g1, x0 + g1 + g2]).unwrap();
    Metalog::fit(samples, &MetalogConfig::default().with_bounds(bounds)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cdf_inverts_quantile(
        x0 in -5.0f64..5.0,
        g1 in 1.0f64..1.5,
        g2 in 1.0f64..1.5,
        p in 0.01f64..0.99,
    ) {
        let m = fitted(x0, g1, g2, Bounds::unbounded());
        prop_assert!(m.valid_distribution().unwrap());
        let back = m.cdf(m.quantile(p)).unwrap();
        prop_assert!((back - p).abs() < 1e-8, "p={p} back={back}");
    }

    #[test]
    fn quantile_inverts_cdf(
        x0 in -5.0f64..5.0,
        g1 in 1.0f64..1.5,
        g2 in 1.0f64..1.5,
        t in 0.0f64..1.0,
    ) {
        let m = fitted(x0, g1, g2, Bounds::unbounded());
        let x = x0 + t * (g1 + g2);
        let back = m.quantile(m.cdf(x).unwrap());
        prop_assert!((back - x).abs() < 1e-8 * x.abs().max(1.0), "x={x} back={back}");
    }

    #[test]
    fn feasible_fit_is_monotone(
        z0 in -1.0f64..1.0,
        g1 in 0.5f64..0.75,
        g2 in 0.5f64..0.75,
        mut ps in prop::collection::vec(0.0f64..=1.0, 2..40),
    ) {
        // Similar gaps in log space keep the lower-bounded fit feasible.
        let xs = vec![z0.exp(), (z0 + g1).exp(), (z0 + g1 + g2).exp()];
        let samples = Samples::new(vec![0.1, 0.5, 0.9], xs).unwrap();
        let cfg = MetalogConfig::default().with_bounds(Bounds::lower(0.0));
        let m = Metalog::fit(samples, &cfg).unwrap();
        prop_assert!(m.valid_distribution().unwrap());
        ps.sort_by(f64::total_cmp);
        let xs = m.quantiles(&ps);
        prop_assert!(xs.windows(2).all(|w| w[0] <= w[1]), "{xs:?}");
    }

    #[test]
    fn boundary_quantiles(lower in -10.0f64..0.0, width in 20.0f64..40.0) {
        let bounds = Bounds::bounded(lower, lower + width);
        let m = fitted(lower + 5.0, 1.0, 1.0, bounds);
        prop_assert_eq!(m.quantile(0.0), lower);
        prop_assert_eq!(m.quantile(1.0), lower + width);

        let only_lower = fitted(lower + 5.0, 1.0, 1.0, Bounds::lower(lower));
        prop_assert_eq!(only_lower.quantile(0.0), lower);
        prop_assert_eq!(only_lower.quantile(1.0), f64::INFINITY);

        let unbounded = fitted(lower, 1.0, 1.0, Bounds::unbounded());
        prop_assert_eq!(unbounded.quantile(0.0), f64::NEG_INFINITY);
        prop_assert_eq!(unbounded.quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn zero_score_iff_grid_is_monotone(
        a1 in -1.0f64..1.0,
        a2 in -0.5f64..1.0,
        a3 in -1.0f64..1.0,
        a4 in -2.0f64..2.0,
    ) {
        let kernel = MetalogKernel::new(vec![a1, a2, a3, a4], Bounds::unbounded()).unwrap();
        let grid = linspace(CHECK_FROM, 1.0 - CHECK_FROM, QuantileSumNegativeIncrements::GRID);
        let xs = kernel.quantiles(&grid);
        let monotone = xs.windows(2).all(|w| w[1] - w[0] >= 0.0);
        let score = QuantileSumNegativeIncrements.score(&kernel).unwrap();
        prop_assert_eq!(score == 0.0, monotone);
        prop_assert_eq!(
            QuantileSumNegativeIncrements.is_feasible(score),
            Metalog::from_coefficients(
                vec![a1, a2, a3, a4],
                Bounds::unbounded(),
                None,
                FeasibilityMethod::QuantileSumNegativeIncrements,
            )
            .unwrap()
            .valid_distribution()
            .unwrap()
        );
    }
}
