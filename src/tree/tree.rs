//! Flat-array decision tree storage and traversal.

use thiserror::Error;

use super::node::Node;
use crate::data::DataPointCollection;
use crate::features::FeatureResponse;

/// Structural errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Descent reached an unwritten slot before a leaf.
    #[error("tree is corrupt: reached an unwritten node at index {node}")]
    CorruptTree { node: usize },

    /// A split node has an unwritten child.
    #[error("split node {node} has an unwritten child at index {child}")]
    NullChild { node: usize, child: usize },

    /// A split node sits on the deepest level, so its children fall
    /// outside the node array.
    #[error("split node {node} has children beyond the node array")]
    ChildOutOfBounds { node: usize },
}

/// A decision tree over nodes of depth at most `max_levels`.
///
/// The node array has `2^(max_levels + 1) - 1` slots and is indexed as a
/// complete binary tree (children of `i` at `2i + 1` and `2i + 2`). A
/// freshly created tree is all-[`Node::Null`]; training writes leaf and
/// split records top-down and everything below a leaf stays null.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<F, S> {
    max_levels: u32,
    nodes: Vec<Node<F, S>>,
}

impl<F, S> Tree<F, S> {
    /// Create an all-null tree sized for `max_levels` decision levels
    /// below the root.
    pub fn new(max_levels: u32) -> Self {
        let node_count = (1usize << (max_levels + 1)) - 1;
        let mut nodes = Vec::with_capacity(node_count);
        nodes.resize_with(node_count, || Node::Null);
        Self { max_levels, nodes }
    }

    /// Maximum number of decision levels below the root.
    #[inline]
    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    /// Number of node slots, written or not.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Access a node record.
    #[inline]
    pub fn node(&self, index: usize) -> &Node<F, S> {
        &self.nodes[index]
    }

    /// Overwrite a node record.
    ///
    /// Used by the trainer and by deserialization; also available to build
    /// trees by hand.
    #[inline]
    pub fn set_node(&mut self, index: usize, node: Node<F, S>) {
        self.nodes[index] = node;
    }

    /// Iterate over all node records in array order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<F, S>> {
        self.nodes.iter()
    }

    /// Check the structural invariants: the root is written, every split
    /// node has two written children, and no split sits on the deepest
    /// level.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.nodes[0].is_null() {
            return Err(TreeError::CorruptTree { node: 0 });
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if !node.is_split() {
                continue;
            }
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            if right >= self.nodes.len() {
                return Err(TreeError::ChildOutOfBounds { node: index });
            }
            for child in [left, right] {
                if self.nodes[child].is_null() {
                    return Err(TreeError::NullChild { node: index, child });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn from_parts(max_levels: u32, nodes: Vec<Node<F, S>>) -> Self {
        debug_assert_eq!(nodes.len(), (1usize << (max_levels + 1)) - 1);
        Self { max_levels, nodes }
    }
}

impl<F, S> Tree<F, S> {
    /// Route one sample from the root to a leaf and return the leaf's
    /// node index.
    ///
    /// Fails with [`TreeError::CorruptTree`] if an unwritten node is
    /// reached before a leaf.
    pub fn descend<D>(&self, data: &D, index: u32) -> Result<usize, TreeError>
    where
        D: ?Sized,
        F: FeatureResponse<D>,
    {
        let mut current = 0usize;
        loop {
            match &self.nodes[current] {
                Node::Leaf { .. } => return Ok(current),
                Node::Null => return Err(TreeError::CorruptTree { node: current }),
                Node::Split { feature, threshold, .. } => {
                    let response = feature.response(data, index);
                    current = if response < *threshold {
                        2 * current + 1
                    } else {
                        2 * current + 2
                    };
                }
            }
        }
    }

    /// Route every sample of `data` to a leaf.
    ///
    /// The output preserves sample order: element `i` is the leaf index of
    /// sample `i`.
    pub fn apply<D>(&self, data: &D) -> Result<Vec<usize>, TreeError>
    where
        D: DataPointCollection + ?Sized,
        F: FeatureResponse<D>,
    {
        (0..data.count()).map(|i| self.descend(data, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PointCollection;
    use crate::features::AxisAlignedFeature;

    /// root: x0 < 0.5 ? leaf(1) : leaf(2)
    fn stump() -> Tree<AxisAlignedFeature, u32> {
        let mut tree = Tree::new(1);
        tree.set_node(
            0,
            Node::Split { feature: AxisAlignedFeature::new(0), threshold: 0.5, stats: 10 },
        );
        tree.set_node(1, Node::Leaf { stats: 4 });
        tree.set_node(2, Node::Leaf { stats: 6 });
        tree
    }

    #[test]
    fn new_tree_is_all_null() {
        let tree: Tree<AxisAlignedFeature, u32> = Tree::new(3);
        assert_eq!(tree.node_count(), 15);
        assert_eq!(tree.max_levels(), 3);
        assert!(tree.nodes().all(Node::is_null));
    }

    #[test]
    fn descend_routes_by_threshold() {
        let tree = stump();
        let data = PointCollection::from_vec(vec![0.3, 0.0, 0.7, 0.0, 0.5, 0.0], 3, 2);
        assert_eq!(tree.descend(&data, 0), Ok(1));
        assert_eq!(tree.descend(&data, 1), Ok(2));
        // Equal response goes right.
        assert_eq!(tree.descend(&data, 2), Ok(2));
    }

    #[test]
    fn apply_preserves_sample_order() {
        let tree = stump();
        let data = PointCollection::from_vec(vec![0.9, 0.0, 0.1, 0.0], 2, 2);
        assert_eq!(tree.apply(&data).unwrap(), vec![2, 1]);
    }

    #[test]
    fn descend_into_null_is_corrupt() {
        let mut tree = stump();
        tree.set_node(1, Node::Null);
        let data = PointCollection::from_vec(vec![0.0, 0.0], 1, 2);
        assert_eq!(
            tree.descend(&data, 0),
            Err(TreeError::CorruptTree { node: 1 })
        );
    }

    #[test]
    fn validate_accepts_stump() {
        assert_eq!(stump().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_null_root() {
        let tree: Tree<AxisAlignedFeature, u32> = Tree::new(2);
        assert_eq!(tree.validate(), Err(TreeError::CorruptTree { node: 0 }));
    }

    #[test]
    fn validate_rejects_missing_child() {
        let mut tree = stump();
        tree.set_node(2, Node::Null);
        assert_eq!(
            tree.validate(),
            Err(TreeError::NullChild { node: 0, child: 2 })
        );
    }

    #[test]
    fn validate_rejects_split_on_deepest_level() {
        let mut tree: Tree<AxisAlignedFeature, u32> = Tree::new(1);
        tree.set_node(
            0,
            Node::Split { feature: AxisAlignedFeature::new(0), threshold: 0.0, stats: 1 },
        );
        tree.set_node(
            1,
            Node::Split { feature: AxisAlignedFeature::new(0), threshold: 0.0, stats: 1 },
        );
        tree.set_node(2, Node::Leaf { stats: 1 });
        assert_eq!(tree.validate(), Err(TreeError::ChildOutOfBounds { node: 1 }));
    }
}
