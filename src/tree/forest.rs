//! Forest container.

use super::tree::{Tree, TreeError};
use crate::data::DataPointCollection;
use crate::features::FeatureResponse;
use crate::training::logger::TrainingLogger;

/// An ordered collection of decision trees sharing one feature and one
/// statistics type.
///
/// Trees are owned by the forest. At inference every sample is pushed
/// through every tree's descent, yielding one leaf index per (tree,
/// sample) pair; reducing those statistics is task-specific and left to
/// the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest<F, S> {
    trees: Vec<Tree<F, S>>,
}

impl<F, S> Forest<F, S> {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self { trees: Vec::new() }
    }

    /// Add a tree, validating its structure first.
    pub fn add_tree(&mut self, tree: Tree<F, S>) -> Result<(), TreeError> {
        tree.validate()?;
        self.trees.push(tree);
        Ok(())
    }

    /// Number of trees.
    #[inline]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Access one tree.
    #[inline]
    pub fn tree(&self, index: usize) -> &Tree<F, S> {
        &self.trees[index]
    }

    /// Iterate over the trees in order.
    pub fn trees(&self) -> impl Iterator<Item = &Tree<F, S>> {
        self.trees.iter()
    }

    pub(crate) fn from_trees(trees: Vec<Tree<F, S>>) -> Self {
        Self { trees }
    }

    /// Apply the forest to a set of data points.
    ///
    /// Returns one vector of leaf indices per tree; inner vectors follow
    /// the sample order of `data`.
    pub fn apply<D>(&self, data: &D) -> Result<Vec<Vec<usize>>, TreeError>
    where
        D: DataPointCollection + ?Sized,
        F: FeatureResponse<D>,
    {
        self.apply_logged(data, &TrainingLogger::silent())
    }

    /// Like [`apply`](Forest::apply), reporting per-tree progress through
    /// `logger`.
    pub fn apply_logged<D>(
        &self,
        data: &D,
        logger: &TrainingLogger,
    ) -> Result<Vec<Vec<usize>>, TreeError>
    where
        D: DataPointCollection + ?Sized,
        F: FeatureResponse<D>,
    {
        let mut leaf_indices = Vec::with_capacity(self.trees.len());
        for (t, tree) in self.trees.iter().enumerate() {
            logger.interest(format!("Applying tree {t}..."));
            leaf_indices.push(tree.apply(data)?);
        }
        logger.interest(format!("Applied {} trees.", self.trees.len()));
        Ok(leaf_indices)
    }
}
