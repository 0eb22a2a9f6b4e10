//! Semi-supervised classification over 2-D points.

use crate::aggregators::SemiSupervisedAggregator;
use crate::data::{CoordinateAccess, LabelAccess};
use crate::features::{FeatureFactory, LinearFeature2d};
use crate::random::Random;
use crate::training::context::{DataShapeError, TrainingContext};

/// Training context for classification from partially labelled 2-D points.
///
/// Information gain is a weighted sum of a supervised term over the
/// labelled samples (histogram entropy) and an unsupervised term over all
/// samples (Gaussian differential entropy). `alpha` sets the importance of
/// the unsupervised term relative to the supervised one.
#[derive(Debug, Clone)]
pub struct SemiSupervisedContext {
    n_classes: u32,
    a: f64,
    b: f64,
    /// Weight of the unsupervised gain term.
    pub alpha: f64,
    /// A best candidate whose gain falls below this becomes a leaf.
    pub min_gain: f64,
}

impl SemiSupervisedContext {
    /// Create a context for `n_classes` classes with Gaussian prior
    /// hyperparameters `a` and `b`.
    pub fn new(n_classes: u32, a: f64, b: f64) -> Self {
        Self {
            n_classes,
            a,
            b,
            alpha: 0.4,
            min_gain: 0.4,
        }
    }
}

impl<D> TrainingContext<D> for SemiSupervisedContext
where
    D: CoordinateAccess + LabelAccess + ?Sized,
{
    type Feature = LinearFeature2d;
    type Stats = SemiSupervisedAggregator;

    fn random_feature(&self, random: &mut Random) -> LinearFeature2d {
        LinearFeature2d::create_random(random, 2)
    }

    fn empty_stats(&self) -> SemiSupervisedAggregator {
        SemiSupervisedAggregator::new(self.n_classes, self.a, self.b)
    }

    fn information_gain(
        &self,
        parent: &SemiSupervisedAggregator,
        left: &SemiSupervisedAggregator,
        right: &SemiSupervisedAggregator,
    ) -> f64 {
        // Supervised term over the labelled samples only.
        let supervised = {
            let left = left.histogram();
            let right = right.histogram();
            let total = left.sample_count() + right.sample_count();
            if total <= 1 {
                0.0
            } else {
                let after = (left.sample_count() as f64 * left.entropy()
                    + right.sample_count() as f64 * right.entropy())
                    / total as f64;
                parent.histogram().entropy() - after
            }
        };

        // Unsupervised term over every sample.
        let unsupervised = {
            let left = left.gaussian();
            let right = right.gaussian();
            let n_left = left.sample_count() as f64;
            let n_right = right.sample_count() as f64;
            if n_left == 0.0 || n_right == 0.0 {
                0.0
            } else {
                let after = (n_left * left.entropy() + n_right * right.entropy())
                    / (n_left + n_right);
                parent.gaussian().entropy() - after
            }
        };

        supervised + self.alpha * unsupervised
    }

    fn should_terminate(
        &self,
        _parent: &SemiSupervisedAggregator,
        _left: &SemiSupervisedAggregator,
        _right: &SemiSupervisedAggregator,
        gain: f64,
    ) -> bool {
        gain < self.min_gain
    }

    fn validate_data(&self, data: &D) -> Result<(), DataShapeError> {
        if data.dimensions() != 2 {
            return Err(DataShapeError(format!(
                "semi-supervised classification expects 2-dimensional points, got {}-dimensional",
                data.dimensions()
            )));
        }
        if !data.has_labels() {
            return Err(DataShapeError(
                "semi-supervised training data must carry (partial) labels".into(),
            ));
        }
        Ok(())
    }
}
