//! Training parameters.

use thiserror::Error;

/// Parameter validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamValidationError {
    /// num_trees must be > 0.
    #[error("num_trees must be > 0")]
    InvalidTreeCount,

    /// max_decision_levels must be >= 1.
    #[error("max_decision_levels must be >= 1, got {0}")]
    InvalidMaxLevels(u32),

    /// num_candidate_features must be > 0.
    #[error("num_candidate_features must be > 0")]
    InvalidCandidateFeatures,

    /// num_candidate_thresholds_per_feature must be > 0.
    #[error("num_candidate_thresholds_per_feature must be > 0")]
    InvalidCandidateThresholds,
}

/// Parameters of forest training.
///
/// Use struct construction with `..Default::default()` for convenient
/// configuration.
#[derive(Debug, Clone)]
pub struct TrainingParameters {
    /// Number of trees in the forest.
    pub num_trees: u32,

    /// Number of decision levels below the root. A tree holds
    /// `2^(max_decision_levels + 1) - 1` node slots, and nodes on the
    /// deepest level are always leaves.
    pub max_decision_levels: u32,

    /// Candidate feature responses sampled per split node.
    pub num_candidate_features: u32,

    /// Candidate thresholds sampled per candidate feature.
    pub num_candidate_thresholds_per_feature: u32,

    /// Emit per-tree progress while training.
    pub verbose: bool,

    /// Number of threads for per-tree parallelism.
    ///
    /// - `0`: use rayon's global thread pool (default)
    /// - `1`: sequential execution
    /// - `n > 1`: parallel execution with up to `n` threads
    ///
    /// The trained forest is identical for any setting: per-tree random
    /// streams are drawn before the fan-out.
    pub n_threads: usize,
}

impl Default for TrainingParameters {
    fn default() -> Self {
        Self {
            num_trees: 10,
            max_decision_levels: 10,
            num_candidate_features: 10,
            num_candidate_thresholds_per_feature: 1,
            verbose: false,
            n_threads: 0,
        }
    }
}

impl TrainingParameters {
    /// Validate the parameters.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if self.num_trees == 0 {
            return Err(ParamValidationError::InvalidTreeCount);
        }
        if self.max_decision_levels < 1 {
            return Err(ParamValidationError::InvalidMaxLevels(self.max_decision_levels));
        }
        if self.num_candidate_features == 0 {
            return Err(ParamValidationError::InvalidCandidateFeatures);
        }
        if self.num_candidate_thresholds_per_feature == 0 {
            return Err(ParamValidationError::InvalidCandidateThresholds);
        }
        Ok(())
    }
}
