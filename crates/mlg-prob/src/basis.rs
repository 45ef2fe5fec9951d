//! Metalog basis functions and the basis ("Y") matrix.
//!
//! Basis functions use Keelin's 1-based numbering `n = 1..=term`; coefficient
//! vectors are 0-indexed, so `a[n - 1]` multiplies basis function `n`.
//!
//! With `L = ln(p / (1 - p))` and `c = p - 0.5`:
//!
//! | n        | basis                 |
//! |----------|-----------------------|
//! | 1        | `1`                   |
//! | 2        | `L`                   |
//! | 3        | `c * L`               |
//! | 4        | `c`                   |
//! | odd ≥ 5  | `c^((n - 1) / 2)`     |
//! | even ≥ 6 | `c^(n / 2 - 1) * L`   |

use mlg_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

use crate::math::logit;

/// Smallest supported number of terms.
pub const MIN_TERM: usize = 2;

/// Value of basis function `n` at a probability with log-odds `ln_odds`
/// and centered probability `c = p - 0.5`.
#[inline]
pub fn basis_value(n: usize, c: f64, ln_odds: f64) -> f64 {
    match n {
        1 => 1.0,
        2 => ln_odds,
        3 => c * ln_odds,
        4 => c,
        n if n % 2 == 1 => c.powi(((n - 1) / 2) as i32),
        n => c.powi((n / 2 - 1) as i32) * ln_odds,
    }
}

/// Derivative `d/dp` of basis function `n`.
///
/// `p1p = p * (1 - p)`; note `dL/dp = 1 / p1p`.
#[inline]
pub fn basis_derivative(n: usize, c: f64, ln_odds: f64, p1p: f64) -> f64 {
    match n {
        1 => 0.0,
        2 => 1.0 / p1p,
        3 => c / p1p + ln_odds,
        4 => 1.0,
        n if n % 2 == 1 => {
            let k = (n - 1) / 2;
            k as f64 * c.powi(k as i32 - 1)
        }
        n => {
            let k = n / 2 - 1;
            c.powi(k as i32) / p1p + k as f64 * c.powi(k as i32 - 1) * ln_odds
        }
    }
}

/// One row of the basis matrix: basis functions `1..=term` at `p`.
pub fn basis_row(p: f64, term: usize) -> Vec<f64> {
    let ln_odds = logit(p);
    let c = p - 0.5;
    (1..=term).map(|n| basis_value(n, c, ln_odds)).collect()
}

/// Build the `ps.len() x term` basis matrix.
///
/// Starts from the 2-column matrix `[1, L]` and appends one column per extra
/// term, so every intermediate matrix `Y_2 .. Y_term` is produced on the way.
pub fn basis_matrix(ps: &[f64], term: usize) -> Result<DMatrix<f64>> {
    if term < MIN_TERM {
        return Err(Error::Validation(format!("term must be >= {MIN_TERM}, got {term}")));
    }
    let rows = ps.len();
    let ln_odds: Vec<f64> = ps.iter().map(|&p| logit(p)).collect();
    let centered: Vec<f64> = ps.iter().map(|&p| p - 0.5).collect();

    let mut y = DMatrix::from_fn(rows, MIN_TERM, |i, j| basis_value(j + 1, centered[i], ln_odds[i]));
    for n in (MIN_TERM + 1)..=term {
        let column =
            DVector::from_iterator(rows, (0..rows).map(|i| basis_value(n, centered[i], ln_odds[i])));
        y = y.insert_column(n - 1, 0.0);
        y.set_column(n - 1, &column);
    }
    Ok(y)
}
