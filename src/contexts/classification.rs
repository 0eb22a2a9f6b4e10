//! Supervised classification.

use std::marker::PhantomData;

use crate::aggregators::Histogram;
use crate::data::{CoordinateAccess, LabelAccess};
use crate::features::{FeatureFactory, FeatureResponse};
use crate::random::Random;
use crate::training::context::{DataShapeError, TrainingContext};

/// Training context for multi-class classification over labelled points.
///
/// Generic over the split function kind, so the same context serves
/// axis-aligned and linear splits.
#[derive(Debug, Clone)]
pub struct ClassificationContext<F> {
    n_classes: u32,
    dimensions: u32,
    /// A best candidate whose gain falls below this becomes a leaf.
    pub min_gain: f64,
    _feature: PhantomData<F>,
}

impl<F> ClassificationContext<F> {
    /// Create a context for `n_classes` classes over `dimensions`-D points.
    pub fn new(n_classes: u32, dimensions: u32) -> Self {
        Self {
            n_classes,
            dimensions,
            min_gain: 0.01,
            _feature: PhantomData,
        }
    }

    /// Number of classes.
    #[inline]
    pub fn n_classes(&self) -> u32 {
        self.n_classes
    }
}

impl<D, F> TrainingContext<D> for ClassificationContext<F>
where
    D: CoordinateAccess + LabelAccess + ?Sized,
    F: FeatureResponse<D> + FeatureFactory,
{
    type Feature = F;
    type Stats = Histogram;

    fn random_feature(&self, random: &mut Random) -> F {
        F::create_random(random, self.dimensions)
    }

    fn empty_stats(&self) -> Histogram {
        Histogram::new(self.n_classes)
    }

    fn information_gain(&self, parent: &Histogram, left: &Histogram, right: &Histogram) -> f64 {
        let total = left.sample_count() + right.sample_count();
        if total <= 1 {
            return 0.0;
        }
        let entropy_after = (left.sample_count() as f64 * left.entropy()
            + right.sample_count() as f64 * right.entropy())
            / total as f64;
        parent.entropy() - entropy_after
    }

    fn should_terminate(
        &self,
        _parent: &Histogram,
        _left: &Histogram,
        _right: &Histogram,
        gain: f64,
    ) -> bool {
        gain < self.min_gain
    }

    fn validate_data(&self, data: &D) -> Result<(), DataShapeError> {
        if data.dimensions() != self.dimensions as usize {
            return Err(DataShapeError(format!(
                "expected {}-dimensional points, got {}-dimensional",
                self.dimensions,
                data.dimensions()
            )));
        }
        if !data.has_labels() {
            return Err(DataShapeError(
                "classification training data must be labelled".into(),
            ));
        }
        if data.class_count() > self.n_classes {
            return Err(DataShapeError(format!(
                "data has {} classes but the context was built for {}",
                data.class_count(),
                self.n_classes
            )));
        }
        Ok(())
    }
}
