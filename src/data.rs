//! Data point collections.
//!
//! The tree engine never inspects feature values itself: it only needs to
//! know how many samples a collection holds. Everything else (coordinates,
//! class labels, regression targets) is accessed through the capability
//! traits below, and only by concrete feature responses, aggregators and
//! training contexts that declare the corresponding bound.
//!
//! [`PointCollection`] is the reference implementation: a dense matrix of
//! low-dimensional points with optional labels and optional targets.

use ndarray::Array2;
use thiserror::Error;

// =============================================================================
// Capability traits
// =============================================================================

/// An opaque set of N samples indexed `0..N-1`.
pub trait DataPointCollection {
    /// Number of samples in the collection.
    fn count(&self) -> u32;
}

/// Collections whose samples are points in a real vector space.
pub trait CoordinateAccess: DataPointCollection {
    /// Dimensionality of every point.
    fn dimensions(&self) -> usize;

    /// Coordinate of sample `index` on `axis`.
    fn coordinate(&self, index: u32, axis: usize) -> f32;
}

/// Collections carrying (possibly partial) class labels.
pub trait LabelAccess: DataPointCollection {
    /// Class label of sample `index`, or `None` if the sample is unlabelled.
    fn label(&self, index: u32) -> Option<u32>;

    /// Number of distinct classes the collection was built with.
    fn class_count(&self) -> u32;

    /// Whether the collection carries labels at all.
    fn has_labels(&self) -> bool;
}

/// Collections carrying real-valued regression targets.
pub trait TargetAccess: DataPointCollection {
    /// Target value of sample `index`.
    fn target(&self, index: u32) -> f32;

    /// Whether the collection carries target values at all.
    fn has_targets(&self) -> bool;
}

// =============================================================================
// PointCollection
// =============================================================================

/// Construction errors for [`PointCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A label or target vector does not match the number of points.
    #[error("expected {expected} {what}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Dense collection of low-dimensional points.
///
/// Points are stored row-major: row `i` is sample `i`. Labels and targets
/// are optional; accessors on samples of a collection built without them
/// answer "absent" (`label` returns `None`, `has_targets` returns `false`).
#[derive(Debug, Clone)]
pub struct PointCollection {
    points: Array2<f32>,
    labels: Option<Vec<Option<u32>>>,
    targets: Option<Vec<f32>>,
    class_count: u32,
}

impl PointCollection {
    /// Create a collection from a points matrix of shape `(n, dimensions)`.
    pub fn from_points(points: Array2<f32>) -> Self {
        Self {
            points,
            labels: None,
            targets: None,
            class_count: 0,
        }
    }

    /// Create a collection from a flat row-major buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != n * dimensions`.
    pub fn from_vec(data: Vec<f32>, n: usize, dimensions: usize) -> Self {
        let points = Array2::from_shape_vec((n, dimensions), data)
            .expect("buffer length must equal n * dimensions");
        Self::from_points(points)
    }

    /// Attach class labels, one per point. `None` marks an unlabelled sample.
    ///
    /// The class count is taken as `max(label) + 1` over the labelled samples.
    pub fn with_labels(mut self, labels: Vec<Option<u32>>) -> Result<Self, DataError> {
        if labels.len() != self.points.nrows() {
            return Err(DataError::LengthMismatch {
                what: "labels",
                expected: self.points.nrows(),
                actual: labels.len(),
            });
        }
        self.class_count = labels
            .iter()
            .flatten()
            .max()
            .map_or(0, |&max| max + 1);
        self.labels = Some(labels);
        Ok(self)
    }

    /// Attach regression targets, one per point.
    pub fn with_targets(mut self, targets: Vec<f32>) -> Result<Self, DataError> {
        if targets.len() != self.points.nrows() {
            return Err(DataError::LengthMismatch {
                what: "targets",
                expected: self.points.nrows(),
                actual: targets.len(),
            });
        }
        self.targets = Some(targets);
        Ok(self)
    }

    /// The point of sample `index` as a coordinate slice.
    pub fn point(&self, index: u32) -> &[f32] {
        self.points
            .row(index as usize)
            .to_slice()
            .expect("row-major points are contiguous")
    }
}

impl DataPointCollection for PointCollection {
    #[inline]
    fn count(&self) -> u32 {
        self.points.nrows() as u32
    }
}

impl CoordinateAccess for PointCollection {
    #[inline]
    fn dimensions(&self) -> usize {
        self.points.ncols()
    }

    #[inline]
    fn coordinate(&self, index: u32, axis: usize) -> f32 {
        self.points[(index as usize, axis)]
    }
}

impl LabelAccess for PointCollection {
    #[inline]
    fn label(&self, index: u32) -> Option<u32> {
        self.labels.as_ref().and_then(|l| l[index as usize])
    }

    #[inline]
    fn class_count(&self) -> u32 {
        self.class_count
    }

    #[inline]
    fn has_labels(&self) -> bool {
        self.labels.is_some()
    }
}

impl TargetAccess for PointCollection {
    #[inline]
    fn target(&self, index: u32) -> f32 {
        self.targets.as_ref().map_or(f32::NAN, |t| t[index as usize])
    }

    #[inline]
    fn has_targets(&self) -> bool {
        self.targets.is_some()
    }
}
