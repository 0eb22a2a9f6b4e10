//! Composite aggregator for semi-supervised classification.

use crate::aggregators::{GaussianAggregator2d, Histogram, StatsAggregator};
use crate::data::{CoordinateAccess, LabelAccess};

/// Histogram and bivariate Gaussian side by side.
///
/// Every sample feeds the Gaussian; only labelled samples feed the
/// histogram. A leaf reached exclusively by unlabelled samples therefore
/// keeps a histogram with `sample_count == 0`, which is how the label
/// transduction step running after training recognizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct SemiSupervisedAggregator {
    histogram: Histogram,
    gaussian: GaussianAggregator2d,
}

impl SemiSupervisedAggregator {
    /// Create an empty aggregator for `n_classes` classes with Gaussian
    /// prior hyperparameters `a` and `b`.
    pub fn new(n_classes: u32, a: f64, b: f64) -> Self {
        Self {
            histogram: Histogram::new(n_classes),
            gaussian: GaussianAggregator2d::new(a, b),
        }
    }

    /// The supervised sub-aggregator.
    #[inline]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// The unsupervised sub-aggregator.
    #[inline]
    pub fn gaussian(&self) -> &GaussianAggregator2d {
        &self.gaussian
    }

    /// Reset both sub-aggregators.
    pub fn clear(&mut self) {
        self.histogram.clear();
        self.gaussian.clear();
    }

    /// Merge both sub-aggregators.
    pub fn merge(&mut self, other: &Self) {
        self.histogram.merge(&other.histogram);
        self.gaussian.merge(&other.gaussian);
    }

    pub(crate) fn from_parts(histogram: Histogram, gaussian: GaussianAggregator2d) -> Self {
        Self { histogram, gaussian }
    }
}

impl<D: CoordinateAccess + LabelAccess + ?Sized> StatsAggregator<D> for SemiSupervisedAggregator {
    fn clear(&mut self) {
        SemiSupervisedAggregator::clear(self);
    }

    fn aggregate_one(&mut self, data: &D, index: u32) {
        // Density statistics always; class statistics only when labelled.
        StatsAggregator::<D>::aggregate_one(&mut self.gaussian, data, index);
        StatsAggregator::<D>::aggregate_one(&mut self.histogram, data, index);
    }

    fn merge(&mut self, other: &Self) {
        SemiSupervisedAggregator::merge(self, other);
    }

    /// Every sample is counted, labelled or not.
    #[inline]
    fn sample_count(&self) -> u32 {
        self.gaussian.sample_count()
    }

    /// The supervised term; the semi-supervised information gain reads the
    /// sub-aggregators directly.
    #[inline]
    fn entropy(&self) -> f64 {
        self.histogram.entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataPointCollection, PointCollection};

    fn mixed_data() -> PointCollection {
        PointCollection::from_vec(
            vec![0.0, 0.0, 1.0, 0.0, 2.0, 1.0, 3.0, 1.0],
            4,
            2,
        )
        .with_labels(vec![Some(0), None, Some(1), None])
        .unwrap()
    }

    #[test]
    fn histogram_sees_only_labelled_samples() {
        let data = mixed_data();
        let mut agg = SemiSupervisedAggregator::new(2, 10.0, 400.0);
        for i in 0..data.count() {
            agg.aggregate_one(&data, i);
        }
        assert_eq!(StatsAggregator::<PointCollection>::sample_count(&agg), 4);
        assert_eq!(agg.gaussian().sample_count(), 4);
        assert_eq!(agg.histogram().sample_count(), 2);
        assert_eq!(agg.histogram().bin(0), 1);
        assert_eq!(agg.histogram().bin(1), 1);
    }

    #[test]
    fn merge_merges_both_parts() {
        let data = mixed_data();
        let mut a = SemiSupervisedAggregator::new(2, 10.0, 400.0);
        let mut b = SemiSupervisedAggregator::new(2, 10.0, 400.0);
        a.aggregate_one(&data, 0);
        a.aggregate_one(&data, 1);
        b.aggregate_one(&data, 2);
        b.aggregate_one(&data, 3);
        a.merge(&b);
        assert_eq!(a.gaussian().sample_count(), 4);
        assert_eq!(a.histogram().sample_count(), 2);
    }
}
