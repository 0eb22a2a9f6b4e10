//! Bivariate Gaussian sufficient statistics for density estimation.

use std::f64::consts::{E, PI};

use crate::aggregators::StatsAggregator;
use crate::data::CoordinateAccess;

// =============================================================================
// GaussianPdf2d
// =============================================================================

/// A fitted bivariate Gaussian.
///
/// Produced by [`GaussianAggregator2d::pdf`]. Stores the mean, the symmetric
/// 2x2 covariance matrix and its precomputed inverse and determinant.
/// A non-positive determinant marks the pdf degenerate: [`entropy`] is
/// infinite and probabilities are 0.
///
/// [`entropy`]: GaussianPdf2d::entropy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPdf2d {
    mean_x: f64,
    mean_y: f64,
    // Symmetric covariance matrix and its inverse.
    sigma_11: f64,
    sigma_12: f64,
    sigma_22: f64,
    inv_sigma_11: f64,
    inv_sigma_12: f64,
    inv_sigma_22: f64,
    det_sigma: f64,
}

impl GaussianPdf2d {
    fn new(mean_x: f64, mean_y: f64, sigma_11: f64, sigma_12: f64, sigma_22: f64) -> Self {
        let det_sigma = sigma_11 * sigma_22 - sigma_12 * sigma_12;
        let (inv_sigma_11, inv_sigma_12, inv_sigma_22) = if det_sigma > 0.0 {
            (sigma_22 / det_sigma, -sigma_12 / det_sigma, sigma_11 / det_sigma)
        } else {
            (0.0, 0.0, 0.0)
        };
        Self {
            mean_x,
            mean_y,
            sigma_11,
            sigma_12,
            sigma_22,
            inv_sigma_11,
            inv_sigma_12,
            inv_sigma_22,
            det_sigma,
        }
    }

    #[inline]
    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    #[inline]
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    #[inline]
    pub fn variance_x(&self) -> f64 {
        self.sigma_11
    }

    #[inline]
    pub fn variance_y(&self) -> f64 {
        self.sigma_22
    }

    #[inline]
    pub fn covariance_xy(&self) -> f64 {
        self.sigma_12
    }

    /// Density at `(x, y)`, or 0 if the covariance is degenerate.
    pub fn probability(&self, x: f32, y: f32) -> f64 {
        if self.det_sigma <= 0.0 {
            return 0.0;
        }
        let dx = x as f64 - self.mean_x;
        let dy = y as f64 - self.mean_y;
        let quadratic = dx * (self.inv_sigma_11 * dx + self.inv_sigma_12 * dy)
            + dy * (self.inv_sigma_12 * dx + self.inv_sigma_22 * dy);
        (2.0 * PI).recip() * self.det_sigma.powf(-0.5) * (-0.5 * quadratic).exp()
    }

    /// Negative log density at `(x, y)`.
    pub fn neg_log_probability(&self, x: f32, y: f32) -> f64 {
        let dx = x as f64 - self.mean_x;
        let dy = y as f64 - self.mean_y;
        0.5 * self.det_sigma.ln()
            + 0.5
                * (dx * (self.inv_sigma_11 * dx + self.inv_sigma_12 * dy)
                    + dy * (self.inv_sigma_12 * dx + self.inv_sigma_22 * dy))
    }

    /// Differential entropy `0.5 * ln((2*pi*e)^2 * |Sigma|)`.
    ///
    /// A degenerate covariance yields `f64::INFINITY` so that the
    /// containing split candidate never wins.
    pub fn entropy(&self) -> f64 {
        if self.det_sigma <= 0.0 {
            return f64::INFINITY;
        }
        0.5 * ((2.0 * PI * E).powi(2) * self.det_sigma).ln()
    }
}

// =============================================================================
// GaussianAggregator2d
// =============================================================================

/// Accumulates bivariate Gaussian sufficient statistics under a conjugate
/// prior.
///
/// The prior is parameterized by `a` (the number of effective prior
/// observations) and `b` (the variance of those observations). The fitted
/// covariance blends the maximum-likelihood estimate with the prior using
/// `alpha = n / (n + a)`; off-diagonal terms are shrunk by `alpha` alone.
/// The constructor clamps `a` to at least 0.001 and `b` to at least 1 so
/// the covariance stays non-degenerate even when the caller deactivates
/// the prior.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianAggregator2d {
    sx: f64,
    sy: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
    sample_count: u32,
    a: f64,
    b: f64,
}

impl GaussianAggregator2d {
    /// Create an empty aggregator with prior hyperparameters `a` and `b`.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            sx: 0.0,
            sy: 0.0,
            sxx: 0.0,
            syy: 0.0,
            sxy: 0.0,
            sample_count: 0,
            a: a.max(0.001),
            b: b.max(1.0),
        }
    }

    /// Number of samples aggregated.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Reset the sufficient statistics, keeping the prior.
    pub fn clear(&mut self) {
        self.sx = 0.0;
        self.sy = 0.0;
        self.sxx = 0.0;
        self.syy = 0.0;
        self.sxy = 0.0;
        self.sample_count = 0;
    }

    /// Add another aggregator's sufficient statistics to this one.
    pub fn merge(&mut self, other: &Self) {
        self.sx += other.sx;
        self.sy += other.sy;
        self.sxx += other.sxx;
        self.syy += other.syy;
        self.sxy += other.sxy;
        self.sample_count += other.sample_count;
    }

    /// Fold the coordinates of one sample in.
    pub fn add_point(&mut self, x: f64, y: f64) {
        self.sx += x;
        self.sy += y;
        self.sxx += x * x;
        self.syy += y * y;
        self.sxy += x * y;
        self.sample_count += 1;
    }

    /// Fit the Gaussian: maximum-likelihood mean, covariance blended with
    /// the prior.
    pub fn pdf(&self) -> GaussianPdf2d {
        let n = self.sample_count as f64;
        let mx = self.sx / n;
        let my = self.sy / n;
        let mut vxx = self.sxx / n - (self.sx * self.sx) / (n * n);
        let mut vyy = self.syy / n - (self.sy * self.sy) / (n * n);
        let mut vxy = self.sxy / n - (self.sx * self.sy) / (n * n);

        let alpha = n / (n + self.a);
        vxx = alpha * vxx + (1.0 - alpha) * self.b;
        vyy = alpha * vyy + (1.0 - alpha) * self.b;
        vxy = alpha * vxy;

        GaussianPdf2d::new(mx, my, vxx, vxy, vyy)
    }

    /// Differential entropy of the fitted Gaussian.
    ///
    /// The empty aggregator is degenerate and scores `f64::INFINITY`.
    pub fn entropy(&self) -> f64 {
        if self.sample_count == 0 {
            return f64::INFINITY;
        }
        self.pdf().entropy()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        sample_count: u32,
        sx: f64,
        sy: f64,
        sxx: f64,
        syy: f64,
        sxy: f64,
        a: f64,
        b: f64,
    ) -> Self {
        Self { sx, sy, sxx, syy, sxy, sample_count, a, b }
    }

    pub(crate) fn parts(&self) -> (u32, f64, f64, f64, f64, f64, f64, f64) {
        (
            self.sample_count,
            self.sx,
            self.sy,
            self.sxx,
            self.syy,
            self.sxy,
            self.a,
            self.b,
        )
    }
}

impl<D: CoordinateAccess + ?Sized> StatsAggregator<D> for GaussianAggregator2d {
    fn clear(&mut self) {
        GaussianAggregator2d::clear(self);
    }

    fn aggregate_one(&mut self, data: &D, index: u32) {
        self.add_point(
            data.coordinate(index, 0) as f64,
            data.coordinate(index, 1) as f64,
        );
    }

    fn merge(&mut self, other: &Self) {
        GaussianAggregator2d::merge(self, other);
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    fn entropy(&self) -> f64 {
        GaussianAggregator2d::entropy(self)
    }
}
