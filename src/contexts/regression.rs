//! 1-D to 1-D regression.

use crate::aggregators::LinearFitAggregator1d;
use crate::data::{CoordinateAccess, TargetAccess};
use crate::features::AxisAlignedFeature;
use crate::random::Random;
use crate::training::context::{DataShapeError, TrainingContext};

use super::weighted_entropy_gain;

/// Training context for regression of a scalar target against 1-D points.
///
/// Every node fits a Bayesian linear model; leaves with an ill-conditioned
/// fit (fewer than three samples, or constant x) score infinite entropy
/// and are never produced by a split.
#[derive(Debug, Clone, Default)]
pub struct RegressionContext {
    /// A best candidate whose gain falls below this becomes a leaf.
    pub min_gain: f64,
}

impl RegressionContext {
    /// Create a context with the reference termination threshold.
    pub fn new() -> Self {
        Self { min_gain: 0.05 }
    }
}

impl<D> TrainingContext<D> for RegressionContext
where
    D: CoordinateAccess + TargetAccess + ?Sized,
{
    type Feature = AxisAlignedFeature;
    type Stats = LinearFitAggregator1d;

    /// The single input axis; nothing to randomize in 1-D.
    fn random_feature(&self, _random: &mut Random) -> AxisAlignedFeature {
        AxisAlignedFeature::new(0)
    }

    fn empty_stats(&self) -> LinearFitAggregator1d {
        LinearFitAggregator1d::new()
    }

    fn information_gain(
        &self,
        parent: &LinearFitAggregator1d,
        left: &LinearFitAggregator1d,
        right: &LinearFitAggregator1d,
    ) -> f64 {
        weighted_entropy_gain::<D, _>(parent, left, right)
    }

    fn should_terminate(
        &self,
        _parent: &LinearFitAggregator1d,
        _left: &LinearFitAggregator1d,
        _right: &LinearFitAggregator1d,
        gain: f64,
    ) -> bool {
        gain < self.min_gain
    }

    fn validate_data(&self, data: &D) -> Result<(), DataShapeError> {
        if data.dimensions() != 1 {
            return Err(DataShapeError(format!(
                "regression expects 1-dimensional points, got {}-dimensional",
                data.dimensions()
            )));
        }
        if !data.has_targets() {
            return Err(DataShapeError(
                "regression training data must carry target values".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PointCollection;

    fn segment(x0: f64, slope: f64, n: usize) -> LinearFitAggregator1d {
        let mut agg = LinearFitAggregator1d::new();
        for i in 0..n {
            let x = x0 + i as f64 * 0.01;
            // Small curvature so no segment is perfectly collinear.
            agg.add_sample(x, slope * x + 0.02 * (9.0 * x).sin());
        }
        agg
    }

    #[test]
    fn splitting_a_kink_has_positive_gain() {
        // Parent covers two branches of different slope; each side alone
        // fits much better.
        let context = RegressionContext::new();
        let left = segment(0.0, 1.0, 30);
        let right = segment(0.3, -2.0, 30);
        let mut parent = left;
        parent.merge(&right);

        let gain =
            TrainingContext::<PointCollection>::information_gain(&context, &parent, &left, &right);
        assert!(gain.is_finite());

        // An undersized side never wins: its infinite entropy is guarded
        // into a zero gain only when empty, otherwise it sinks the score.
        let tiny = segment(0.0, 1.0, 2);
        let degenerate =
            TrainingContext::<PointCollection>::information_gain(&context, &parent, &tiny, &right);
        assert_eq!(degenerate, f64::NEG_INFINITY);
    }

    #[test]
    fn empty_side_gains_zero() {
        let context = RegressionContext::new();
        let parent = segment(0.0, 1.0, 20);
        let empty = LinearFitAggregator1d::new();
        let gain =
            TrainingContext::<PointCollection>::information_gain(&context, &parent, &parent, &empty);
        assert_eq!(gain, 0.0);
    }

    #[test]
    fn validate_requires_targets_and_one_dimension() {
        let context = RegressionContext::new();

        let no_targets = PointCollection::from_vec(vec![0.0; 4], 4, 1);
        assert!(TrainingContext::validate_data(&context, &no_targets).is_err());

        let two_d = PointCollection::from_vec(vec![0.0; 8], 4, 2)
            .with_targets(vec![0.0; 4])
            .unwrap();
        assert!(TrainingContext::validate_data(&context, &two_d).is_err());

        let good = PointCollection::from_vec(vec![0.0; 4], 4, 1)
            .with_targets(vec![0.0; 4])
            .unwrap();
        assert!(TrainingContext::validate_data(&context, &good).is_ok());
    }
}
