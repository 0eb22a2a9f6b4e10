//! Density estimation over 2-D points.

use crate::aggregators::GaussianAggregator2d;
use crate::data::CoordinateAccess;
use crate::features::{AxisAlignedFeature, FeatureFactory};
use crate::random::Random;
use crate::training::context::{DataShapeError, TrainingContext};

use super::weighted_entropy_gain;

/// Training context for unsupervised 2-D density estimation.
///
/// Splits are axis-aligned; every node fits a bivariate Gaussian under a
/// conjugate prior with hyperparameters `a` and `b`.
#[derive(Debug, Clone)]
pub struct DensityContext {
    a: f64,
    b: f64,
    /// A best candidate whose gain falls below this becomes a leaf.
    pub min_gain: f64,
}

impl DensityContext {
    /// Create a context with Gaussian prior hyperparameters `a` and `b`.
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b, min_gain: 0.25 }
    }
}

impl<D> TrainingContext<D> for DensityContext
where
    D: CoordinateAccess + ?Sized,
{
    type Feature = AxisAlignedFeature;
    type Stats = GaussianAggregator2d;

    fn random_feature(&self, random: &mut Random) -> AxisAlignedFeature {
        AxisAlignedFeature::create_random(random, 2)
    }

    fn empty_stats(&self) -> GaussianAggregator2d {
        GaussianAggregator2d::new(self.a, self.b)
    }

    fn information_gain(
        &self,
        parent: &GaussianAggregator2d,
        left: &GaussianAggregator2d,
        right: &GaussianAggregator2d,
    ) -> f64 {
        weighted_entropy_gain::<D, _>(parent, left, right)
    }

    fn should_terminate(
        &self,
        _parent: &GaussianAggregator2d,
        _left: &GaussianAggregator2d,
        _right: &GaussianAggregator2d,
        gain: f64,
    ) -> bool {
        gain < self.min_gain
    }

    fn validate_data(&self, data: &D) -> Result<(), DataShapeError> {
        if data.dimensions() != 2 {
            return Err(DataShapeError(format!(
                "density estimation expects 2-dimensional points, got {}-dimensional",
                data.dimensions()
            )));
        }
        Ok(())
    }
}
