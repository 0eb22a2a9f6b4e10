//! Training contexts for the four supported tasks.
//!
//! Each context binds the generic trainer to one statistical objective:
//! which features to sample, which statistics to accumulate, how to score
//! a candidate split and when a best candidate is still not worth taking.

mod classification;
mod density;
mod regression;
mod semi_supervised;

pub use classification::ClassificationContext;
pub use density::DensityContext;
pub use regression::RegressionContext;
pub use semi_supervised::SemiSupervisedContext;

use crate::aggregators::StatsAggregator;

/// Entropy reduction when a parent's samples are partitioned into two
/// children, weighting each child by its share of the samples.
///
/// An empty side cannot reduce entropy, so such candidates score 0; this
/// also keeps infinite child entropies from poisoning the weighted sum.
pub(crate) fn weighted_entropy_gain<D, S>(parent: &S, left: &S, right: &S) -> f64
where
    D: ?Sized,
    S: StatsAggregator<D>,
{
    let n_left = StatsAggregator::<D>::sample_count(left) as f64;
    let n_right = StatsAggregator::<D>::sample_count(right) as f64;
    if n_left == 0.0 || n_right == 0.0 {
        return 0.0;
    }
    let entropy_before = StatsAggregator::<D>::entropy(parent);
    let entropy_after = (n_left * StatsAggregator::<D>::entropy(left)
        + n_right * StatsAggregator::<D>::entropy(right))
        / (n_left + n_right);
    entropy_before - entropy_after
}
