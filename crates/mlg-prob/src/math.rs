//! Small numerically-stable math utilities used across metalog code.

/// Log-odds `ln(p / (1 - p))`.
///
/// `-inf` at `p = 0`, `+inf` at `p = 1`, NaN outside `[0, 1]`.
#[inline]
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Stable sigmoid: `1 / (1 + exp(-x))`.
///
/// Single `exp(-|x|)`, so neither tail overflows.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let abs_x = x.abs();
    let e = (-abs_x).exp();
    let recip = 1.0 / (1.0 + e);
    // x >= 0: sigmoid = 1/(1+exp(-x)) = recip
    // x <  0: sigmoid = exp(x)/(1+exp(x)) = e/(1+e) = e*recip
    if x >= 0.0 { recip } else { e * recip }
}

/// `n` evenly spaced values over the closed interval `[start, stop]`.
///
/// `n = 1` yields `[start]`; `n = 0` yields an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the last point so it is exactly `stop`.
            out[n - 1] = stop;
            out
        }
    }
}
