//! Feature response functions.
//!
//! A feature response maps a sample to a scalar; split nodes compare that
//! scalar against a learned threshold to route the sample left or right.
//! Responses are small `Copy` values so a whole tree stays contiguous in
//! memory.

use crate::data::CoordinateAccess;
use crate::random::Random;

/// Scalar response of a sample under some learned feature.
///
/// The trainer is generic over this trait and evaluates it in its hot loop;
/// implementations are plain data and must be cheap to call and to clone.
pub trait FeatureResponse<D: ?Sized>: Clone {
    /// Response of sample `index` in `data`.
    fn response(&self, data: &D, index: u32) -> f32;
}

/// Random construction of feature responses.
///
/// `dimensions` is the dimensionality of the training points; responses
/// that do not depend on it ignore it.
pub trait FeatureFactory: Sized {
    /// Draw a random feature response.
    fn create_random(random: &mut Random, dimensions: u32) -> Self;
}

// =============================================================================
// AxisAlignedFeature
// =============================================================================

/// Orders data points by one of their coordinates, i.e. by projecting them
/// onto a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisAlignedFeature {
    axis: u32,
}

impl AxisAlignedFeature {
    /// Create a feature for the given zero-based axis.
    pub fn new(axis: u32) -> Self {
        Self { axis }
    }

    /// The axis this feature projects onto.
    #[inline]
    pub fn axis(&self) -> u32 {
        self.axis
    }
}

impl FeatureFactory for AxisAlignedFeature {
    fn create_random(random: &mut Random, dimensions: u32) -> Self {
        Self::new(random.next_int(0, dimensions))
    }
}

impl<D: CoordinateAccess + ?Sized> FeatureResponse<D> for AxisAlignedFeature {
    #[inline]
    fn response(&self, data: &D, index: u32) -> f32 {
        data.coordinate(index, self.axis as usize)
    }
}

// =============================================================================
// LinearFeature2d
// =============================================================================

/// Orders 2-D data points by a linear combination of their coordinates,
/// i.e. by projecting them onto a direction vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFeature2d {
    dx: f32,
    dy: f32,
}

impl LinearFeature2d {
    /// Create a feature for the given direction vector.
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// The direction vector.
    #[inline]
    pub fn direction(&self) -> (f32, f32) {
        (self.dx, self.dy)
    }
}

impl FeatureFactory for LinearFeature2d {
    /// Direction components drawn uniformly from `[-1, 1)`.
    fn create_random(random: &mut Random, _dimensions: u32) -> Self {
        Self::new(
            (2.0 * random.next_unit() - 1.0) as f32,
            (2.0 * random.next_unit() - 1.0) as f32,
        )
    }
}

impl<D: CoordinateAccess + ?Sized> FeatureResponse<D> for LinearFeature2d {
    #[inline]
    fn response(&self, data: &D, index: u32) -> f32 {
        self.dx * data.coordinate(index, 0) + self.dy * data.coordinate(index, 1)
    }
}
