//! The tree-growing engine.
//!
//! One generic trainer serves every task. At each node it draws candidate
//! split functions from the training context, samples thresholds between
//! the extreme responses, partitions the node's samples for every
//! candidate and keeps the one with maximum information gain. The node
//! becomes a leaf when the depth limit is reached, when no candidate
//! separates the data, or when the context says to stop.
//!
//! # Data layout
//!
//! The trainer owns a permutation of the sample indices `0..N`. Every node
//! works on a half-open range of that permutation; committing a split
//! reorders the range in place so that samples responding below the
//! threshold occupy the front. Children receive the two sub-ranges, and
//! no per-node sample lists are ever allocated.
//!
//! # Determinism
//!
//! Each tree trains from its own [`Random`] forked off the master source
//! before the per-tree fan-out, so a fixed seed yields a bitwise identical
//! forest under any thread count. Ties on gain resolve to the first-seen
//! candidate.

use thiserror::Error;

use crate::aggregators::StatsAggregator;
use crate::data::DataPointCollection;
use crate::features::FeatureResponse;
use crate::random::Random;
use crate::tree::{Forest, Node, Tree, TreeError};
use crate::utils::{run_with_threads, Parallelism};

use super::context::{DataShapeError, TrainingContext};
use super::logger::{TrainingLogger, Verbosity};
use super::params::{ParamValidationError, TrainingParameters};

// =============================================================================
// TrainError
// =============================================================================

/// Errors surfaced by [`ForestTrainer::train`].
#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid training parameters.
    #[error(transparent)]
    InvalidParameters(#[from] ParamValidationError),

    /// The collection does not provide what the task demands.
    #[error(transparent)]
    DataShape(#[from] DataShapeError),

    /// A trained tree failed validation.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

// =============================================================================
// ForestTrainer
// =============================================================================

/// Trains forests of decision trees.
pub struct ForestTrainer;

impl ForestTrainer {
    /// Train a forest.
    ///
    /// Training is a pure function of the random source, the parameters,
    /// the context and the data: repeated runs from the same seed produce
    /// identical forests.
    pub fn train<D, C>(
        random: &mut Random,
        parameters: &TrainingParameters,
        context: &C,
        data: &D,
    ) -> Result<Forest<C::Feature, C::Stats>, TrainError>
    where
        D: DataPointCollection + Sync + ?Sized,
        C: TrainingContext<D> + Sync,
        C::Feature: Send,
        C::Stats: Send,
    {
        parameters.validate()?;
        context.validate_data(data)?;

        let logger = TrainingLogger::new(if parameters.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Silent
        });

        // Per-tree random streams are drawn up front so the result does
        // not depend on the execution strategy.
        let tree_randoms: Vec<(usize, Random)> = (0..parameters.num_trees as usize)
            .map(|t| (t, random.fork()))
            .collect();

        let num_trees = parameters.num_trees;
        let parallelism = Parallelism::from_threads(parameters.n_threads);
        let trees = run_with_threads(parameters.n_threads, || {
            parallelism.maybe_par_map(tree_randoms, |(t, tree_random)| {
                logger.verbose(format!("Training tree {} of {}.", t + 1, num_trees));
                Self::train_tree(tree_random, parameters, context, data)
            })
        });

        let mut forest = Forest::new();
        for tree in trees {
            forest.add_tree(tree)?;
        }
        Ok(forest)
    }

    /// Train a single tree from its own random source.
    pub fn train_tree<D, C>(
        random: Random,
        parameters: &TrainingParameters,
        context: &C,
        data: &D,
    ) -> Tree<C::Feature, C::Stats>
    where
        D: DataPointCollection + ?Sized,
        C: TrainingContext<D>,
    {
        let n = data.count();
        let mut root_stats = context.empty_stats();
        for i in 0..n {
            root_stats.aggregate_one(data, i);
        }

        let mut trainer = NodeTrainer {
            random,
            parameters,
            context,
            data,
            permutation: (0..n).collect(),
            responses: Vec::with_capacity(n as usize),
            tree: Tree::new(parameters.max_decision_levels),
        };
        trainer.train_node(0, 0, n as usize, 0, root_stats);
        trainer.tree
    }
}

impl<F, S> Forest<F, S> {
    /// Train a forest; convenience for [`ForestTrainer::train`].
    pub fn train<D, C>(
        random: &mut Random,
        parameters: &TrainingParameters,
        context: &C,
        data: &D,
    ) -> Result<Self, TrainError>
    where
        D: DataPointCollection + Sync + ?Sized,
        C: TrainingContext<D, Feature = F, Stats = S> + Sync,
        F: FeatureResponse<D> + Send,
        S: StatsAggregator<D> + Send,
    {
        ForestTrainer::train(random, parameters, context, data)
    }
}

// =============================================================================
// Per-node optimization
// =============================================================================

struct SplitCandidate<F, S> {
    feature: F,
    threshold: f32,
    left: S,
    right: S,
}

/// Trains one tree, node by node.
struct NodeTrainer<'a, D, C>
where
    D: DataPointCollection + ?Sized,
    C: TrainingContext<D>,
{
    random: Random,
    parameters: &'a TrainingParameters,
    context: &'a C,
    data: &'a D,
    /// Permutation of sample indices; each node owns a sub-range.
    permutation: Vec<u32>,
    /// Response scratch for the current node, aligned with the current
    /// permutation range, so responses are shared across the thresholds
    /// of one feature.
    responses: Vec<f32>,
    tree: Tree<C::Feature, C::Stats>,
}

impl<D, C> NodeTrainer<'_, D, C>
where
    D: DataPointCollection + ?Sized,
    C: TrainingContext<D>,
{
    /// Optimize node `node` over `permutation[lo..hi]` at `depth`.
    ///
    /// `stats` already summarize the range.
    fn train_node(&mut self, node: usize, lo: usize, hi: usize, depth: u32, stats: C::Stats) {
        if depth == self.parameters.max_decision_levels || lo == hi {
            self.tree.set_node(node, Node::Leaf { stats });
            return;
        }

        let mut best: Option<SplitCandidate<C::Feature, C::Stats>> = None;
        let mut best_gain = f64::NEG_INFINITY;

        for _ in 0..self.parameters.num_candidate_features {
            let feature = self.context.random_feature(&mut self.random);

            self.responses.clear();
            self.responses.extend(
                self.permutation[lo..hi]
                    .iter()
                    .map(|&s| feature.response(self.data, s)),
            );

            let mut r_min = f32::INFINITY;
            let mut r_max = f32::NEG_INFINITY;
            for &r in &self.responses {
                r_min = r_min.min(r);
                r_max = r_max.max(r);
            }
            // A feature that cannot separate the range is skipped.
            if r_min == r_max {
                continue;
            }

            for _ in 0..self.parameters.num_candidate_thresholds_per_feature {
                let threshold = r_min + (self.random.next_unit() as f32) * (r_max - r_min);

                let mut left = self.context.empty_stats();
                let mut right = self.context.empty_stats();
                for (offset, &s) in self.permutation[lo..hi].iter().enumerate() {
                    if self.responses[offset] < threshold {
                        left.aggregate_one(self.data, s);
                    } else {
                        right.aggregate_one(self.data, s);
                    }
                }

                let gain = self.context.information_gain(&stats, &left, &right);
                // Strict comparison: ties resolve to the first-seen
                // candidate, and NaN gains are never selected.
                if gain > best_gain {
                    best_gain = gain;
                    best = Some(SplitCandidate {
                        feature: feature.clone(),
                        threshold,
                        left,
                        right,
                    });
                }
            }
        }

        let Some(candidate) = best else {
            self.tree.set_node(node, Node::Leaf { stats });
            return;
        };
        if best_gain <= 0.0
            || self
                .context
                .should_terminate(&stats, &candidate.left, &candidate.right, best_gain)
        {
            self.tree.set_node(node, Node::Leaf { stats });
            return;
        }

        let SplitCandidate { feature, threshold, left, right } = candidate;

        // Recompute responses for the winning feature, then reorder the
        // range in place so the left child's samples come first.
        self.responses.clear();
        self.responses.extend(
            self.permutation[lo..hi]
                .iter()
                .map(|&s| feature.response(self.data, s)),
        );
        let pivot = lo
            + partition_in_place(
                &mut self.permutation[lo..hi],
                &mut self.responses,
                threshold,
            );

        self.tree
            .set_node(node, Node::Split { feature, threshold, stats });
        self.train_node(2 * node + 1, lo, pivot, depth + 1, left);
        self.train_node(2 * node + 2, pivot, hi, depth + 1, right);
    }
}

/// Two-pointer in-place partition: entries whose response is strictly
/// below `threshold` end up in the front. Returns the pivot offset.
fn partition_in_place(permutation: &mut [u32], responses: &mut [f32], threshold: f32) -> usize {
    debug_assert_eq!(permutation.len(), responses.len());

    let mut left = 0;
    let mut right = permutation.len();
    while left < right {
        if responses[left] < threshold {
            left += 1;
        } else {
            right -= 1;
            permutation.swap(left, right);
            responses.swap(left, right);
        }
    }
    left
}
