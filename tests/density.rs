//! End-to-end density estimation.

use sherwood::{
    AxisAlignedFeature, DensityContext, Forest, GaussianAggregator2d, Node, PointCollection,
    Random, Tree, TrainingParameters,
};

/// 200 standard-normal points via Box-Muller over a deterministic
/// uniform source.
fn normal_data() -> PointCollection {
    let mut uniform = Random::new(1234);
    let mut points = Vec::with_capacity(400);
    for _ in 0..200 {
        let u1 = uniform.next_unit().max(1e-12);
        let u2 = uniform.next_unit();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = std::f64::consts::TAU * u2;
        points.push((radius * angle.cos()) as f32);
        points.push((radius * angle.sin()) as f32);
    }
    PointCollection::from_vec(points, 200, 2)
}

/// Axis-aligned bounds of a leaf's cell.
#[derive(Clone)]
struct Bounds {
    lower: [f32; 2],
    upper: [f32; 2],
}

impl Bounds {
    fn unbounded() -> Self {
        Self {
            lower: [f32::NEG_INFINITY; 2],
            upper: [f32::INFINITY; 2],
        }
    }

    fn contains(&self, point: (f32, f32)) -> bool {
        let (x, y) = point;
        self.lower[0] <= x && x < self.upper[0] && self.lower[1] <= y && y < self.upper[1]
    }
}

/// Walk the tree, assigning every leaf the axis-aligned cell its splits
/// carve out.
fn collect_leaf_bounds(
    tree: &Tree<AxisAlignedFeature, GaussianAggregator2d>,
    node: usize,
    bounds: Bounds,
    out: &mut Vec<(usize, Bounds)>,
) {
    match tree.node(node) {
        Node::Null => {}
        Node::Leaf { .. } => out.push((node, bounds)),
        Node::Split { feature, threshold, .. } => {
            let axis = feature.axis() as usize;
            let mut left = bounds.clone();
            left.upper[axis] = *threshold;
            collect_leaf_bounds(tree, 2 * node + 1, left, out);
            let mut right = bounds;
            right.lower[axis] = *threshold;
            collect_leaf_bounds(tree, 2 * node + 2, right, out);
        }
    }
}

#[test]
fn leaf_cells_partition_the_plane() {
    let data = normal_data();
    let context = DensityContext::new(0.0, 900.0);
    let parameters = TrainingParameters {
        num_trees: 1,
        max_decision_levels: 3,
        num_candidate_features: 5,
        num_candidate_thresholds_per_feature: 1,
        ..Default::default()
    };

    let forest = Forest::train(&mut Random::new(42), &parameters, &context, &data).unwrap();
    let tree = forest.tree(0);

    let mut leaves = Vec::new();
    collect_leaf_bounds(tree, 0, Bounds::unbounded(), &mut leaves);
    assert!(!leaves.is_empty());

    // The probability mass tracked by the leaves accounts for every
    // training point exactly once.
    let total: u32 = leaves
        .iter()
        .map(|(node, _)| tree.node(*node).stats().unwrap().sample_count())
        .sum();
    assert_eq!(total, 200);

    // Descent agrees with the cells: every probe point lands in the one
    // leaf whose cell contains it, so the cells cover the plane with no
    // gaps or overlaps.
    for i in -10..=10 {
        for j in -10..=10 {
            let point = (i as f32 * 0.3, j as f32 * 0.3);
            let probe = PointCollection::from_vec(vec![point.0, point.1], 1, 2);
            let reached = tree.descend(&probe, 0).unwrap();

            let containing: Vec<usize> = leaves
                .iter()
                .filter(|(_, bounds)| bounds.contains(point))
                .map(|(node, _)| *node)
                .collect();
            assert_eq!(containing, vec![reached]);
        }
    }
}

#[test]
fn every_leaf_density_is_proper() {
    let data = normal_data();
    let context = DensityContext::new(0.0, 900.0);
    let parameters = TrainingParameters {
        num_trees: 1,
        max_decision_levels: 3,
        num_candidate_features: 5,
        num_candidate_thresholds_per_feature: 1,
        ..Default::default()
    };

    let forest = Forest::train(&mut Random::new(9), &parameters, &context, &data).unwrap();
    for node in forest.tree(0).nodes() {
        let Some(stats) = node.stats() else { continue };
        if stats.sample_count() == 0 {
            continue;
        }
        // The prior keeps every fitted covariance positive-definite.
        let pdf = stats.pdf();
        assert!(pdf.entropy().is_finite());
        assert!(pdf.variance_x() > 0.0);
        assert!(pdf.variance_y() > 0.0);
        assert!(pdf.probability(pdf.mean_x() as f32, pdf.mean_y() as f32) > 0.0);
    }
}
