//! Statistics aggregators.
//!
//! An aggregator is an online summary of a subset of samples. During
//! training every node accumulates one; at a leaf the aggregator *is* the
//! prediction. The engine only requires the operations of
//! [`StatsAggregator`]; the statistical meaning lives entirely in the
//! implementations:
//!
//! - [`Histogram`]: per-class counts (classification)
//! - [`GaussianAggregator2d`]: bivariate Gaussian sufficient statistics
//!   with a conjugate prior (density estimation)
//! - [`LinearFitAggregator1d`]: Bayesian linear regression sufficient
//!   statistics (1-D regression)
//! - [`SemiSupervisedAggregator`]: histogram and Gaussian side by side
//!   (semi-supervised classification)
//!
//! Aggregators are plain mergeable values so that all tree data can be
//! stored contiguously and cloned cheaply.

mod gaussian;
mod histogram;
mod linear_fit;
mod semi_supervised;

pub use gaussian::{GaussianAggregator2d, GaussianPdf2d};
pub use histogram::Histogram;
pub use linear_fit::LinearFitAggregator1d;
pub use semi_supervised::SemiSupervisedAggregator;

/// Online summary of a sample subset.
///
/// `entropy` is an impurity-like score: higher means more impure. It does
/// not have to be Shannon entropy, but it must combine with the
/// information-gain formulas of the training contexts. In particular,
/// returning `f64::INFINITY` for a degenerate state guarantees the
/// containing split candidate loses.
pub trait StatsAggregator<D: ?Sized>: Clone {
    /// Reset to the empty state.
    fn clear(&mut self);

    /// Fold one sample in.
    fn aggregate_one(&mut self, data: &D, index: u32);

    /// Merge another aggregator of the same type.
    fn merge(&mut self, other: &Self);

    /// Number of samples aggregated.
    fn sample_count(&self) -> u32;

    /// Impurity-like score of the aggregated subset.
    fn entropy(&self) -> f64;
}
