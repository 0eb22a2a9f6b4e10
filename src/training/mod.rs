//! Training infrastructure.
//!
//! This module provides the generic tree-growing engine and the pieces it
//! is parameterized over:
//!
//! - [`TrainingParameters`]: forest size, depth and candidate budgets
//! - [`TrainingContext`]: task-specific policy (features, statistics,
//!   information gain, termination)
//! - [`ForestTrainer`]: the per-node optimizer and per-tree fan-out
//! - [`TrainingLogger`], [`Verbosity`]: progress reporting
//!
//! Concrete contexts for the four supported tasks live in
//! [`crate::contexts`].

pub mod context;
pub mod logger;
pub mod params;
pub mod trainer;

pub use context::{DataShapeError, TrainingContext};
pub use logger::{TrainingLogger, Verbosity};
pub use params::{ParamValidationError, TrainingParameters};
pub use trainer::{ForestTrainer, TrainError};
