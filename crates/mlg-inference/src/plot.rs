//! Plot data for an external rendering layer.
//!
//! Both curves are traced parametrically in `p`: `x = quantile(p)`, so no root
//! finding is needed per point.

use mlg_core::{ContinuousDistribution, Error, Result};
use mlg_prob::math::linspace;
use serde::{Deserialize, Serialize};

use crate::distribution::Metalog;

/// Evenly spaced cumulative probabilities to trace a curve over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRange {
    /// First probability.
    pub p_start: f64,
    /// Last probability.
    pub p_end: f64,
    /// Number of points.
    pub n: usize,
}

impl Default for PlotRange {
    fn default() -> Self {
        Self { p_start: 0.001, p_end: 0.999, n: 100 }
    }
}

impl PlotRange {
    /// Validated range with `0 <= p_start < p_end <= 1` and `n >= 2`.
    pub fn new(p_start: f64, p_end: f64, n: usize) -> Result<Self> {
        if !(0.0 <= p_start && p_start < p_end && p_end <= 1.0) {
            return Err(Error::Validation(format!(
                "plot range needs 0 <= p_start < p_end <= 1, got [{p_start}, {p_end}]"
            )));
        }
        if n < 2 {
            return Err(Error::Validation(format!("plot range needs n >= 2, got {n}")));
        }
        Ok(Self { p_start, p_end, n })
    }

    /// Range covering `[x_start, x_end]` on the distribution's x-axis.
    pub fn from_x_interval<D: ContinuousDistribution + ?Sized>(
        dist: &D,
        x_start: f64,
        x_end: f64,
        n: usize,
    ) -> Result<Self> {
        if !(x_start < x_end) {
            return Err(Error::Validation(format!(
                "x interval must be increasing, got [{x_start}, {x_end}]"
            )));
        }
        Self::new(dist.cdf(x_start)?, dist.cdf(x_end)?, n)
    }

    /// The probabilities of the range.
    pub fn probabilities(&self) -> Vec<f64> {
        linspace(self.p_start, self.p_end, self.n)
    }
}

/// CDF curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdfPlotData {
    /// Quantiles.
    pub x_values: Vec<f64>,
    /// Cumulative probabilities aligned with `x_values`.
    pub probabilities: Vec<f64>,
}

/// PDF curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfPlotData {
    /// Quantiles.
    pub x_values: Vec<f64>,
    /// Densities aligned with `x_values`.
    pub densities: Vec<f64>,
}

impl Metalog {
    /// CDF curve over `range`.
    pub fn cdf_plot_data(&self, range: &PlotRange) -> CdfPlotData {
        let probabilities = range.probabilities();
        CdfPlotData { x_values: self.quantiles(&probabilities), probabilities }
    }

    /// PDF curve over `range`.
    ///
    /// Fails when `range` touches an endpoint on an unbounded side.
    pub fn pdf_plot_data(&self, range: &PlotRange) -> Result<PdfPlotData> {
        let ps = range.probabilities();
        Ok(PdfPlotData { x_values: self.quantiles(&ps), densities: self.densities(&ps)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mlg_core::{Bounds, FeasibilityMethod};

    fn logistic() -> Metalog {
        Metalog::from_coefficients(vec![0.0, 1.0], Bounds::unbounded(), None, FeasibilityMethod::default())
            .unwrap()
    }

    #[test]
    fn test_default_range() {
        let ps = PlotRange::default().probabilities();
        assert_eq!(ps.len(), 100);
        assert_eq!(ps[0], 0.001);
        assert_eq!(ps[99], 0.999);
    }

    #[test]
    fn test_range_validation() {
        assert!(PlotRange::new(0.5, 0.5, 10).is_err());
        assert!(PlotRange::new(-0.1, 0.5, 10).is_err());
        assert!(PlotRange::new(0.1, 0.5, 1).is_err());
        assert!(PlotRange::new(f64::NAN, 0.5, 10).is_err());
        assert!(PlotRange::new(0.0, 1.0, 2).is_ok());
    }

    #[test]
    fn test_from_x_interval() {
        let m = logistic();
        let r = PlotRange::from_x_interval(&m, -(3f64.ln()), 3f64.ln(), 5).unwrap();
        assert_relative_eq!(r.p_start, 0.25, epsilon = 1e-10);
        assert_relative_eq!(r.p_end, 0.75, epsilon = 1e-10);
        assert!(PlotRange::from_x_interval(&m, 1.0, -1.0, 5).is_err());
    }

    #[test]
    fn test_curves_are_aligned() {
        let m = logistic();
        let range = PlotRange::new(0.25, 0.75, 3).unwrap();
        let cdf = m.cdf_plot_data(&range);
        assert_eq!(cdf.probabilities, vec![0.25, 0.5, 0.75]);
        assert_relative_eq!(cdf.x_values[0], -(3f64.ln()), epsilon = 1e-12);
        assert_eq!(cdf.x_values[1], 0.0);

        let pdf = m.pdf_plot_data(&range).unwrap();
        assert_eq!(pdf.x_values, cdf.x_values);
        assert_relative_eq!(pdf.densities[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_pdf_endpoint_on_unbounded_side_fails() {
        let range = PlotRange::new(0.0, 0.5, 3).unwrap();
        assert!(matches!(logistic().pdf_plot_data(&range), Err(Error::Domain(_))));
    }

    #[test]
    fn test_plot_data_serializes() {
        let data = logistic().cdf_plot_data(&PlotRange::new(0.25, 0.75, 2).unwrap());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["probabilities"], serde_json::json!([0.25, 0.75]));
        assert!(json["x_values"].is_array());
    }
}
