//! Task-specific training policy.

use thiserror::Error;

use crate::aggregators::StatsAggregator;
use crate::data::DataPointCollection;
use crate::features::FeatureResponse;
use crate::random::Random;

/// A collection does not provide what the task demands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("data shape mismatch: {0}")]
pub struct DataShapeError(pub String);

/// Everything that makes the generic trainer task-specific: how to sample
/// candidate features, which statistics to accumulate, how to score a
/// split, and when to stop.
///
/// The trainer is monomorphized over the context, so the feature and
/// statistics types are associated types rather than runtime objects:
/// response evaluation is the hot path and must not dispatch through a
/// table per sample.
pub trait TrainingContext<D: DataPointCollection + ?Sized> {
    /// Split function type of the trained trees.
    type Feature: FeatureResponse<D>;
    /// Statistics type accumulated at every node.
    type Stats: StatsAggregator<D>;

    /// Draw a candidate split function.
    fn random_feature(&self, random: &mut Random) -> Self::Feature;

    /// Create an empty statistics aggregator.
    fn empty_stats(&self) -> Self::Stats;

    /// Score a candidate partition of a parent's samples into two
    /// children. Higher is better; a candidate scoring `<= 0` never
    /// becomes a split.
    fn information_gain(
        &self,
        parent: &Self::Stats,
        left: &Self::Stats,
        right: &Self::Stats,
    ) -> f64;

    /// Consulted after the best candidate for a node has been chosen.
    /// Returning `true` turns the node into a leaf instead of a split.
    fn should_terminate(
        &self,
        parent: &Self::Stats,
        left: &Self::Stats,
        right: &Self::Stats,
        gain: f64,
    ) -> bool;

    /// Check that `data` provides what this task needs. Called once at
    /// the start of training.
    fn validate_data(&self, _data: &D) -> Result<(), DataShapeError> {
        Ok(())
    }
}
