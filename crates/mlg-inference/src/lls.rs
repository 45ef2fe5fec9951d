//! Linear least-squares fit of the a-vector (Keelin 2016, equations 7 and 12).

use mlg_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Ratio `s_min / s_max` of the normal-equations matrix below which it is treated as singular.
pub const SINGULAR_RCOND: f64 = 1e-12;

/// Solve `a = (YᵗY)⁻¹ Yᵗz` for the a-vector.
///
/// Fails with [`Error::SingularMatrix`] when `YᵗY` is not invertible: fewer
/// rows than columns, or a rank deficiency visible in its singular values
/// (duplicate probabilities).
pub fn fit_linear_least_squares(y: &DMatrix<f64>, z: &[f64]) -> Result<Vec<f64>> {
    let (rows, term) = y.shape();
    if rows != z.len() {
        return Err(Error::Validation(format!(
            "basis matrix has {rows} rows but z-vector has {} entries",
            z.len()
        )));
    }
    if term > rows {
        return Err(Error::SingularMatrix(format!(
            "term ({term}) exceeds the number of samples ({rows})"
        )));
    }

    let yt = y.transpose();
    let normal = &yt * y;

    let svd = normal.clone().svd(false, false);
    let s_max = svd.singular_values.iter().fold(0.0_f64, |a, &b| a.max(b));
    let s_min = svd.singular_values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    if !(s_max > 0.0) || !(s_min / s_max > SINGULAR_RCOND) {
        return Err(Error::SingularMatrix(format!(
            "normal equations are rank deficient (rcond = {:.3e})",
            if s_max > 0.0 { s_min / s_max } else { 0.0 }
        )));
    }

    let inverse = normal
        .try_inverse()
        .ok_or_else(|| Error::SingularMatrix("YᵗY is not invertible".to_string()))?;
    let a = inverse * (yt * DVector::from_column_slice(z));
    Ok(a.iter().copied().collect())
}
