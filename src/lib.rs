//! sherwood: a decision forest framework.
//!
//! One generic tree-growing engine serves four learning tasks
//! (classification, regression, density estimation and semi-supervised
//! classification) through four orthogonal polymorphism points: the
//! feature response, the statistics aggregator, the training context and
//! the data point collection.
//!
//! # Key Types
//!
//! - [`Forest`] / [`Tree`] / [`Node`] - flat-array tree storage with
//!   batched inference and binary (de)serialization
//! - [`ForestTrainer`] / [`TrainingParameters`] - the recursive per-node
//!   optimizer and its configuration
//! - [`TrainingContext`] - task-specific policy implemented by the
//!   contexts in [`contexts`]
//! - [`FeatureResponse`] / [`StatsAggregator`] - the split-function and
//!   node-statistics abstractions, with reference implementations in
//!   [`features`] and [`aggregators`]
//! - [`PointCollection`] - dense reference data collection
//!
//! # Training
//!
//! ```ignore
//! use sherwood::{
//!     AxisAlignedFeature, ClassificationContext, Forest, PointCollection, Random,
//!     TrainingParameters,
//! };
//!
//! let data = PointCollection::from_vec(points, n, 2).with_labels(labels)?;
//! let context = ClassificationContext::<AxisAlignedFeature>::new(2, 2);
//! let parameters = TrainingParameters { num_trees: 10, ..Default::default() };
//! let forest = Forest::train(&mut Random::new(42), &parameters, &context, &data)?;
//! let leaf_indices = forest.apply(&data)?;
//! ```

pub mod aggregators;
pub mod contexts;
pub mod data;
pub mod features;
pub mod io;
pub mod random;
pub mod training;
pub mod tree;
pub mod utils;

// High-level types most users want in scope.
pub use aggregators::{
    GaussianAggregator2d, GaussianPdf2d, Histogram, LinearFitAggregator1d,
    SemiSupervisedAggregator, StatsAggregator,
};
pub use contexts::{
    ClassificationContext, DensityContext, RegressionContext, SemiSupervisedContext,
};
pub use data::{
    CoordinateAccess, DataError, DataPointCollection, LabelAccess, PointCollection, TargetAccess,
};
pub use features::{AxisAlignedFeature, FeatureFactory, FeatureResponse, LinearFeature2d};
pub use io::{DeserializeError, Persist, SerializeError};
pub use random::Random;
pub use training::{
    ForestTrainer, TrainError, TrainingContext, TrainingLogger, TrainingParameters, Verbosity,
};
pub use tree::{Forest, Node, Tree, TreeError};
pub use utils::{run_with_threads, Parallelism};
