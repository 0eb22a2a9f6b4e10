//! Bayesian linear regression sufficient statistics for 1-D regression.

use std::f64::consts::{E, PI};

use crate::aggregators::StatsAggregator;
use crate::data::{CoordinateAccess, TargetAccess};

/// Accumulates the sufficient statistics of a 1-D linear fit `y ~ w0*x + w1`:
/// the design-matrix Gram matrix `X^T X`, the moment vector `X^T Y` and the
/// target sum of squares.
///
/// The per-leaf predictive density `p(y | x)` is a Gaussian whose mean is
/// the Bayesian posterior mean at `x` and whose variance is the residual
/// variance plus the posterior predictive variance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearFitAggregator1d {
    // X^T X is symmetric; the off-diagonal entry is stored once.
    xtx_11: f64,
    xtx_12: f64,
    xtx_22: f64,
    xty_1: f64,
    xty_2: f64,
    y2: f64,
    sample_count: u32,
}

impl LinearFitAggregator1d {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples aggregated.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add another aggregator's sufficient statistics to this one.
    pub fn merge(&mut self, other: &Self) {
        self.xtx_11 += other.xtx_11;
        self.xtx_12 += other.xtx_12;
        self.xtx_22 += other.xtx_22;
        self.xty_1 += other.xty_1;
        self.xty_2 += other.xty_2;
        self.y2 += other.y2;
        self.sample_count += other.sample_count;
    }

    /// Fold one `(x, y)` observation in.
    pub fn add_sample(&mut self, x: f64, y: f64) {
        self.xtx_11 += x * x;
        self.xtx_12 += x;
        self.xtx_22 += 1.0;
        self.xty_1 += x * y;
        self.xty_2 += y;
        self.y2 += y * y;
        self.sample_count += 1;
    }

    /// Impurity score `0.5 * ln((2*pi*e)^2 * |X^T X|)`.
    ///
    /// Fewer than three samples, or a singular Gram matrix (all x equal),
    /// score `f64::INFINITY` so the containing split candidate loses.
    pub fn entropy(&self) -> f64 {
        if self.sample_count < 3 {
            return f64::INFINITY;
        }
        let determinant = self.xtx_11 * self.xtx_22 - self.xtx_12 * self.xtx_12;
        if determinant == 0.0 {
            return f64::INFINITY;
        }
        0.5 * ((2.0 * PI * E).powi(2) * determinant).ln()
    }

    /// Predictive density `p(y | x)` of the fitted Bayesian linear model.
    pub fn probability(&self, x: f32, y: f32) -> f64 {
        let x = x as f64;
        let y = y as f64;
        let n = self.sample_count as f64;

        // Residual variance of the least-squares fit, via the squared
        // correlation coefficient.
        let mean_x = self.xtx_12 / n;
        let ss_x = self.xtx_11 - n * mean_x * mean_x;
        let mean_y = self.xty_2 / n;
        let ss_y = self.y2 - n * mean_y * mean_y;
        let ss_xy = self.xty_1 - n * mean_y * mean_x;
        let r2 = (ss_xy * ss_xy) / (ss_x * ss_y);
        let sigma_2 = ss_y * (1.0 - r2) / n;

        // Posterior covariance A = sigma^2 (X^T X)^-1.
        let determinant = self.xtx_11 * self.xtx_22 - self.xtx_12 * self.xtx_12;
        let a_11 = sigma_2 * self.xtx_22 / determinant;
        let a_12 = -sigma_2 * self.xtx_12 / determinant;
        let a_21 = -sigma_2 * self.xtx_12 / determinant;
        let a_22 = sigma_2 * self.xtx_11 / determinant;

        let mean = (x * (a_11 * self.xty_1 + a_12 * self.xty_2)) / sigma_2
            + (a_21 * self.xty_1 + a_22 * self.xty_2) / sigma_2;
        let variance = x * (a_11 * x + a_12) + (a_21 * x + a_22) + sigma_2;

        (2.0 * PI).powf(-0.5) * variance.powf(-0.5) * (-0.5 * (y - mean) * (y - mean) / variance).exp()
    }

    pub(crate) fn from_parts(
        sample_count: u32,
        xtx: (f64, f64, f64),
        xty: (f64, f64),
        y2: f64,
    ) -> Self {
        Self {
            xtx_11: xtx.0,
            xtx_12: xtx.1,
            xtx_22: xtx.2,
            xty_1: xty.0,
            xty_2: xty.1,
            y2,
            sample_count,
        }
    }

    pub(crate) fn parts(&self) -> (u32, (f64, f64, f64), (f64, f64), f64) {
        (
            self.sample_count,
            (self.xtx_11, self.xtx_12, self.xtx_22),
            (self.xty_1, self.xty_2),
            self.y2,
        )
    }
}

impl<D: CoordinateAccess + TargetAccess + ?Sized> StatsAggregator<D> for LinearFitAggregator1d {
    fn clear(&mut self) {
        LinearFitAggregator1d::clear(self);
    }

    fn aggregate_one(&mut self, data: &D, index: u32) {
        self.add_sample(
            data.coordinate(index, 0) as f64,
            data.target(index) as f64,
        );
    }

    fn merge(&mut self, other: &Self) {
        LinearFitAggregator1d::merge(self, other);
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    fn entropy(&self) -> f64 {
        LinearFitAggregator1d::entropy(self)
    }
}
