//! End-to-end semi-supervised classification.

use sherwood::{
    Forest, PointCollection, Random, SemiSupervisedContext, StatsAggregator, TrainingParameters,
};

/// 20 labelled points in two tight clusters plus 200 unlabelled points
/// spread over the plane.
fn partially_labelled_data() -> PointCollection {
    let mut points = Vec::new();
    let mut labels = Vec::new();

    for class in 0..2u32 {
        let cx = if class == 0 { -1.5f32 } else { 1.5 };
        for i in 0..10 {
            let t = i as f32 * 0.67;
            points.extend([cx + 0.1 * t.sin(), 0.1 * t.cos()]);
            labels.push(Some(class));
        }
    }

    // A 20 x 10 grid of unlabelled points over [-3, 3] x [-1.5, 1.5].
    for i in 0..20 {
        for j in 0..10 {
            points.extend([
                -3.0 + i as f32 * (6.0 / 19.0),
                -1.5 + j as f32 * (3.0 / 9.0),
            ]);
            labels.push(None);
        }
    }

    PointCollection::from_vec(points, 220, 2)
        .with_labels(labels)
        .unwrap()
}

#[test]
fn unlabelled_leaves_keep_an_empty_histogram() {
    let data = partially_labelled_data();
    let mut context = SemiSupervisedContext::new(2, 0.5, 4.0);
    // Let the unsupervised term keep splitting once the few labelled
    // samples are separated.
    context.min_gain = 0.05;

    let parameters = TrainingParameters {
        num_trees: 1,
        max_decision_levels: 5,
        num_candidate_features: 10,
        num_candidate_thresholds_per_feature: 10,
        ..Default::default()
    };

    let forest = Forest::train(&mut Random::new(42), &parameters, &context, &data).unwrap();
    let tree = forest.tree(0);

    let mut total_points = 0;
    let mut total_labelled = 0;
    let mut unlabelled_leaves = 0;
    let mut leaves = 0;
    for node in tree.nodes() {
        if !node.is_leaf() {
            continue;
        }
        leaves += 1;
        let stats = node.stats().unwrap();
        let gaussian_count = stats.gaussian().sample_count();
        let histogram_count = stats.histogram().sample_count();

        // The histogram only ever sees labelled samples.
        assert!(histogram_count <= gaussian_count);
        total_points += gaussian_count;
        total_labelled += histogram_count;
        if histogram_count == 0 && gaussian_count > 0 {
            unlabelled_leaves += 1;
        }
    }

    assert_eq!(total_points, 220);
    assert_eq!(total_labelled, 20);
    assert!(leaves >= 2, "the clusters should force at least one split");
    // Label transduction runs after training and needs to recognize the
    // leaves that saw no labels; they are exactly those with an empty
    // histogram sub-aggregator.
    assert!(
        unlabelled_leaves > 0,
        "spread unlabelled data should populate at least one label-free leaf"
    );
}

#[test]
fn all_samples_are_routed_at_inference() {
    let data = partially_labelled_data();
    let context = SemiSupervisedContext::new(2, 10.0, 400.0);
    let parameters = TrainingParameters {
        num_trees: 3,
        max_decision_levels: 4,
        num_candidate_features: 10,
        num_candidate_thresholds_per_feature: 5,
        ..Default::default()
    };

    let forest = Forest::train(&mut Random::new(5), &parameters, &context, &data).unwrap();
    let leaf_indices = forest.apply(&data).unwrap();
    assert_eq!(leaf_indices.len(), 3);
    for (t, row) in leaf_indices.iter().enumerate() {
        assert_eq!(row.len(), 220);
        for (i, &leaf) in row.iter().enumerate() {
            let node = forest.tree(t).node(leaf);
            assert!(node.is_leaf(), "sample {i} must end on a leaf");
        }
    }
}

#[test]
fn composite_counts_follow_the_labelling() {
    let data = partially_labelled_data();
    let context = SemiSupervisedContext::new(2, 10.0, 400.0);
    let parameters = TrainingParameters {
        num_trees: 1,
        max_decision_levels: 3,
        ..Default::default()
    };

    let forest = Forest::train(&mut Random::new(8), &parameters, &context, &data).unwrap();
    let root = forest.tree(0).node(0).stats().unwrap();
    assert_eq!(StatsAggregator::<PointCollection>::sample_count(root), 220);
    assert_eq!(root.gaussian().sample_count(), 220);
    assert_eq!(root.histogram().sample_count(), 20);
    assert_eq!(root.histogram().bin(0), 10);
    assert_eq!(root.histogram().bin(1), 10);
}
