//! Windowed smoothing of ordered numeric series.
//!
//! Both filters share one boundary policy: near the ends of a series the
//! window shrinks to the records that exist within half a window of the
//! centre. The median is taken over what remains; the Savitzky-Golay
//! polynomial is fitted over what remains and evaluated at the record's own
//! position. When a truncated window holds no more points than the polynomial
//! order, the fit is undetermined and the record gets `None`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmoothingError {
    #[error("window size must be a positive odd number, got {0}")]
    InvalidWindow(usize),
    #[error("Savitzky-Golay window {window} must be larger than polynomial order {order}")]
    OrderTooHigh { window: usize, order: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    RollingMedian,
    SavitzkyGolay,
}

impl SmoothingMethod {
    pub const ALL: [SmoothingMethod; 2] = [
        SmoothingMethod::RollingMedian,
        SmoothingMethod::SavitzkyGolay,
    ];
}

/// Filter settings applied to every series of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothingParams {
    pub rolling_window: usize,
    pub sg_window: usize,
    pub sg_poly_order: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            rolling_window: 11,
            sg_window: 11,
            sg_poly_order: 2,
        }
    }
}

impl SmoothingParams {
    pub fn validate(&self) -> Result<(), SmoothingError> {
        check_window(self.rolling_window)?;
        check_window(self.sg_window)?;
        if self.sg_window <= self.sg_poly_order {
            return Err(SmoothingError::OrderTooHigh {
                window: self.sg_window,
                order: self.sg_poly_order,
            });
        }
        Ok(())
    }

    /// Run one method over `values`.
    pub fn apply(
        &self,
        method: SmoothingMethod,
        values: &[f64],
    ) -> Result<Vec<Option<f64>>, SmoothingError> {
        match method {
            SmoothingMethod::RollingMedian => rolling_median(values, self.rolling_window),
            SmoothingMethod::SavitzkyGolay => {
                savitzky_golay(values, self.sg_window, self.sg_poly_order)
            }
        }
    }
}

fn check_window(window: usize) -> Result<(), SmoothingError> {
    if window == 0 || window % 2 == 0 {
        return Err(SmoothingError::InvalidWindow(window));
    }
    Ok(())
}

/// Index range `[lo, hi]` of the (possibly truncated) window centred at `i`.
fn window_bounds(i: usize, len: usize, window: usize) -> (usize, usize) {
    let half = window / 2;
    (i.saturating_sub(half), (i + half).min(len - 1))
}

pub fn rolling_median(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, SmoothingError> {
    check_window(window)?;
    let mut out = Vec::with_capacity(values.len());
    let mut buf = Vec::with_capacity(window);
    for i in 0..values.len() {
        let (lo, hi) = window_bounds(i, values.len(), window);
        buf.clear();
        buf.extend_from_slice(&values[lo..=hi]);
        buf.sort_by(f64::total_cmp);
        let mid = buf.len() / 2;
        let median = if buf.len() % 2 == 1 {
            buf[mid]
        } else {
            (buf[mid - 1] + buf[mid]) / 2.0
        };
        out.push(Some(median));
    }
    Ok(out)
}

pub fn savitzky_golay(
    values: &[f64],
    window: usize,
    order: usize,
) -> Result<Vec<Option<f64>>, SmoothingError> {
    check_window(window)?;
    if window <= order {
        return Err(SmoothingError::OrderTooHigh { window, order });
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let (lo, hi) = window_bounds(i, values.len(), window);
        if hi - lo + 1 <= order {
            out.push(None);
            continue;
        }
        let points = (lo..=hi).map(|j| (j as f64 - i as f64, values[j]));
        out.push(fit_polynomial_at_origin(points, order));
    }
    Ok(out)
}

/// Least-squares polynomial of degree `order` through `points`, evaluated at
/// x = 0 (the constant coefficient). Solved via the normal equations.
fn fit_polynomial_at_origin(
    points: impl Iterator<Item = (f64, f64)>,
    order: usize,
) -> Option<f64> {
    let n = order + 1;
    // Augmented normal-equation matrix [XᵀX | Xᵀy].
    let mut m = vec![vec![0.0f64; n + 1]; n];
    for (x, y) in points {
        let mut powers = vec![1.0f64; 2 * n - 1];
        for k in 1..powers.len() {
            powers[k] = powers[k - 1] * x;
        }
        for r in 0..n {
            for c in 0..n {
                m[r][c] += powers[r + c];
            }
            m[r][n] += powers[r] * y;
        }
    }
    solve(m).map(|coeffs| coeffs[0])
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix.
fn solve(mut m: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = m.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        let p = m[col][col];
        for v in m[col].iter_mut() {
            *v /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                let delta = factor * m[col][k];
                m[row][k] -= delta;
            }
        }
    }
    Some(m.into_iter().map(|row| row[n]).collect())
}
