//! Versioned binary forest format.
//!
//! A serialized forest is a little-endian stream:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ ASCII header "MicrosoftResearch.Cambridge.Sherwood.Forest"   │
//! │ i32 major_version (= 0)                                      │
//! │ i32 minor_version (= 0)                                      │
//! │ i32 tree_count                                               │
//! │ tree records …                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tree record is `i32 max_decision_levels`, `i32 node_count`, then
//! one record per node in array order: a status byte (0 = null, 1 = leaf,
//! 2 = split); for a split, the feature blob and an `f64` threshold; for a
//! leaf or split, the statistics blob. Null slots are a bare status byte.
//!
//! Feature and statistics blobs are the fixed-size plain-data images
//! defined by the [`Persist`] implementations in this module. Endianness
//! is preserved across platforms that share endianness; cross-endian
//! interchange is not attempted.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::aggregators::{
    GaussianAggregator2d, Histogram, LinearFitAggregator1d, SemiSupervisedAggregator,
};
use crate::features::{AxisAlignedFeature, LinearFeature2d};
use crate::tree::{Forest, Node, Tree};

// ============================================================================
// Constants
// ============================================================================

/// ASCII stream header (no terminating NUL).
pub const FOREST_HEADER: &[u8] = b"MicrosoftResearch.Cambridge.Sherwood.Forest";

/// Current format version (major).
pub const VERSION_MAJOR: i32 = 0;

/// Current format version (minor).
pub const VERSION_MINOR: i32 = 0;

const STATUS_NULL: u8 = 0;
const STATUS_LEAF: u8 = 1;
const STATUS_SPLIT: u8 = 2;

/// Caps on deserialized sizes, so a corrupt stream cannot demand an
/// implausible allocation before the truncation is noticed.
const MAX_DECISION_LEVELS: i32 = 30;
const MAX_HISTOGRAM_BINS: u32 = 1 << 20;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while writing a forest.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur while reading a forest.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// The stream does not start with the forest header.
    #[error("unsupported forest format")]
    UnsupportedFormat,

    /// The stream carries a version this build cannot read.
    #[error("unsupported forest version {major}.{minor}")]
    UnsupportedVersion { major: i32, minor: i32 },

    /// The stream ended early or carries inconsistent records.
    #[error("corrupt forest stream: {0}")]
    CorruptStream(String),

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for DeserializeError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            DeserializeError::CorruptStream("unexpected end of stream".into())
        } else {
            DeserializeError::Io(error)
        }
    }
}

// ============================================================================
// Little-endian primitives
// ============================================================================

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<(), SerializeError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), SerializeError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> Result<(), SerializeError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f64<W: Write>(writer: &mut W, value: f64) -> Result<(), SerializeError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, DeserializeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, DeserializeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, DeserializeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64, DeserializeError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, DeserializeError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

// ============================================================================
// Persist
// ============================================================================

/// Fixed-layout binary image of a feature or statistics value.
pub trait Persist: Sized {
    /// Write the binary image.
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError>;

    /// Read the binary image back.
    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError>;
}

impl Persist for AxisAlignedFeature {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        write_u32(writer, self.axis())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        Ok(AxisAlignedFeature::new(read_u32(reader)?))
    }
}

impl Persist for LinearFeature2d {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let (dx, dy) = self.direction();
        write_f32(writer, dx)?;
        write_f32(writer, dy)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let dx = read_f32(reader)?;
        let dy = read_f32(reader)?;
        Ok(LinearFeature2d::new(dx, dy))
    }
}

impl Persist for Histogram {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        write_u32(writer, self.bin_count())?;
        for &bin in self.bins() {
            write_u32(writer, bin)?;
        }
        write_u32(writer, self.sample_count())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let bin_count = read_u32(reader)?;
        if bin_count > MAX_HISTOGRAM_BINS {
            return Err(DeserializeError::CorruptStream(format!(
                "implausible histogram bin count {bin_count}"
            )));
        }
        let mut bins = Vec::with_capacity(bin_count as usize);
        for _ in 0..bin_count {
            bins.push(read_u32(reader)?);
        }
        let sample_count = read_u32(reader)?;
        Ok(Histogram::from_parts(bins, sample_count))
    }
}

impl Persist for GaussianAggregator2d {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let (sample_count, sx, sy, sxx, syy, sxy, a, b) = self.parts();
        write_u32(writer, sample_count)?;
        for value in [sx, sy, sxx, syy, sxy, a, b] {
            write_f64(writer, value)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let sample_count = read_u32(reader)?;
        let sx = read_f64(reader)?;
        let sy = read_f64(reader)?;
        let sxx = read_f64(reader)?;
        let syy = read_f64(reader)?;
        let sxy = read_f64(reader)?;
        let a = read_f64(reader)?;
        let b = read_f64(reader)?;
        Ok(GaussianAggregator2d::from_parts(
            sample_count, sx, sy, sxx, syy, sxy, a, b,
        ))
    }
}

impl Persist for LinearFitAggregator1d {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let (sample_count, (xtx_11, xtx_12, xtx_22), (xty_1, xty_2), y2) = self.parts();
        write_u32(writer, sample_count)?;
        for value in [xtx_11, xtx_12, xtx_22, xty_1, xty_2, y2] {
            write_f64(writer, value)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let sample_count = read_u32(reader)?;
        let xtx_11 = read_f64(reader)?;
        let xtx_12 = read_f64(reader)?;
        let xtx_22 = read_f64(reader)?;
        let xty_1 = read_f64(reader)?;
        let xty_2 = read_f64(reader)?;
        let y2 = read_f64(reader)?;
        Ok(LinearFitAggregator1d::from_parts(
            sample_count,
            (xtx_11, xtx_12, xtx_22),
            (xty_1, xty_2),
            y2,
        ))
    }
}

impl Persist for SemiSupervisedAggregator {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        self.histogram().write_to(writer)?;
        self.gaussian().write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let histogram = Histogram::read_from(reader)?;
        let gaussian = GaussianAggregator2d::read_from(reader)?;
        Ok(SemiSupervisedAggregator::from_parts(histogram, gaussian))
    }
}

// ============================================================================
// Node records
// ============================================================================

fn write_node<F, S, W>(node: &Node<F, S>, writer: &mut W) -> Result<(), SerializeError>
where
    F: Persist,
    S: Persist,
    W: Write,
{
    match node {
        Node::Null => writer.write_all(&[STATUS_NULL]).map_err(Into::into),
        Node::Leaf { stats } => {
            writer.write_all(&[STATUS_LEAF])?;
            stats.write_to(writer)
        }
        Node::Split { feature, threshold, stats } => {
            writer.write_all(&[STATUS_SPLIT])?;
            feature.write_to(writer)?;
            write_f64(writer, *threshold as f64)?;
            stats.write_to(writer)
        }
    }
}

fn read_node<F, S, R>(reader: &mut R) -> Result<Node<F, S>, DeserializeError>
where
    F: Persist,
    S: Persist,
    R: Read,
{
    match read_u8(reader)? {
        STATUS_NULL => Ok(Node::Null),
        STATUS_LEAF => Ok(Node::Leaf { stats: S::read_from(reader)? }),
        STATUS_SPLIT => {
            let feature = F::read_from(reader)?;
            let threshold = read_f64(reader)? as f32;
            let stats = S::read_from(reader)?;
            Ok(Node::Split { feature, threshold, stats })
        }
        status => Err(DeserializeError::CorruptStream(format!(
            "unknown node status byte {status}"
        ))),
    }
}

// ============================================================================
// Tree and forest streams
// ============================================================================

impl<F: Persist, S: Persist> Tree<F, S> {
    /// Write this tree's record.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        write_i32(writer, self.max_levels() as i32)?;
        write_i32(writer, self.node_count() as i32)?;
        for node in self.nodes() {
            write_node(node, writer)?;
        }
        Ok(())
    }

    /// Read one tree record.
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let max_levels = read_i32(reader)?;
        if !(1..=MAX_DECISION_LEVELS).contains(&max_levels) {
            return Err(DeserializeError::CorruptStream(format!(
                "implausible decision level count {max_levels}"
            )));
        }
        let node_count = read_i32(reader)?;
        let expected = (1i64 << (max_levels + 1)) - 1;
        if node_count as i64 != expected {
            return Err(DeserializeError::CorruptStream(format!(
                "node count {node_count} does not match {max_levels} decision levels"
            )));
        }

        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            nodes.push(read_node(reader)?);
        }
        Ok(Tree::from_parts(max_levels as u32, nodes))
    }
}

impl<F: Persist, S: Persist> Forest<F, S> {
    /// Write the forest to a binary stream.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        writer.write_all(FOREST_HEADER)?;
        write_i32(writer, VERSION_MAJOR)?;
        write_i32(writer, VERSION_MINOR)?;
        write_i32(writer, self.tree_count() as i32)?;
        for tree in self.trees() {
            tree.serialize(writer)?;
        }
        Ok(())
    }

    /// Read a forest from a binary stream.
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self, DeserializeError> {
        let mut header = [0u8; FOREST_HEADER.len()];
        reader.read_exact(&mut header)?;
        if header != FOREST_HEADER {
            return Err(DeserializeError::UnsupportedFormat);
        }

        let major = read_i32(reader)?;
        let minor = read_i32(reader)?;
        if (major, minor) != (VERSION_MAJOR, VERSION_MINOR) {
            return Err(DeserializeError::UnsupportedVersion { major, minor });
        }

        let tree_count = read_i32(reader)?;
        if tree_count < 0 {
            return Err(DeserializeError::CorruptStream(format!(
                "negative tree count {tree_count}"
            )));
        }

        let mut trees = Vec::with_capacity(tree_count as usize);
        for _ in 0..tree_count {
            trees.push(Tree::deserialize(reader)?);
        }
        Ok(Forest::from_trees(trees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::StatsAggregator;
    use crate::data::PointCollection;

    fn sample_histogram() -> Histogram {
        Histogram::from_parts(vec![3, 0, 7], 10)
    }

    fn stump() -> Tree<AxisAlignedFeature, Histogram> {
        let mut tree = Tree::new(1);
        tree.set_node(
            0,
            Node::Split {
                feature: AxisAlignedFeature::new(1),
                threshold: 0.25,
                stats: sample_histogram(),
            },
        );
        tree.set_node(1, Node::Leaf { stats: Histogram::from_parts(vec![3, 0, 0], 3) });
        tree.set_node(2, Node::Leaf { stats: Histogram::from_parts(vec![0, 0, 7], 7) });
        tree
    }

    fn forest() -> Forest<AxisAlignedFeature, Histogram> {
        let mut forest = Forest::new();
        forest.add_tree(stump()).unwrap();
        forest
    }

    #[test]
    fn stream_layout_is_bit_exact() {
        let mut bytes = Vec::new();
        forest().serialize(&mut bytes).unwrap();

        // ASCII header, no NUL.
        assert_eq!(&bytes[..43], b"MicrosoftResearch.Cambridge.Sherwood.Forest");
        // Versions 0.0 and one tree, little-endian.
        assert_eq!(&bytes[43..47], &0i32.to_le_bytes());
        assert_eq!(&bytes[47..51], &0i32.to_le_bytes());
        assert_eq!(&bytes[51..55], &1i32.to_le_bytes());
        // Tree record: one decision level, three node slots.
        assert_eq!(&bytes[55..59], &1i32.to_le_bytes());
        assert_eq!(&bytes[59..63], &3i32.to_le_bytes());
        // Root: split status, u32 axis, f64 threshold.
        assert_eq!(bytes[63], 2);
        assert_eq!(&bytes[64..68], &1u32.to_le_bytes());
        assert_eq!(&bytes[68..76], &0.25f64.to_le_bytes());
    }

    #[test]
    fn forest_roundtrip_is_identity() {
        let original = forest();
        let mut bytes = Vec::new();
        original.serialize(&mut bytes).unwrap();

        let restored: Forest<AxisAlignedFeature, Histogram> =
            Forest::deserialize(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, original);

        let data = PointCollection::from_vec(vec![0.0, 0.1, 0.0, 0.9], 2, 2);
        assert_eq!(
            restored.apply(&data).unwrap(),
            original.apply(&data).unwrap()
        );
    }

    #[test]
    fn null_slots_survive_roundtrip() {
        let mut tree: Tree<AxisAlignedFeature, Histogram> = Tree::new(2);
        tree.set_node(0, Node::Leaf { stats: sample_histogram() });
        let mut bytes = Vec::new();
        tree.serialize(&mut bytes).unwrap();

        let restored: Tree<AxisAlignedFeature, Histogram> =
            Tree::deserialize(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, tree);
        assert!(restored.node(3).is_null());
    }

    #[test]
    fn wrong_header_is_unsupported_format() {
        let mut bytes = Vec::new();
        forest().serialize(&mut bytes).unwrap();
        bytes[0] = b'X';

        let result = Forest::<AxisAlignedFeature, Histogram>::deserialize(&mut bytes.as_slice());
        assert!(matches!(result, Err(DeserializeError::UnsupportedFormat)));
    }

    #[test]
    fn future_version_is_rejected() {
        let mut bytes = Vec::new();
        forest().serialize(&mut bytes).unwrap();
        // Major version field sits right after the header.
        bytes[43..47].copy_from_slice(&7i32.to_le_bytes());

        let result = Forest::<AxisAlignedFeature, Histogram>::deserialize(&mut bytes.as_slice());
        assert!(matches!(
            result,
            Err(DeserializeError::UnsupportedVersion { major: 7, minor: 0 })
        ));
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let mut bytes = Vec::new();
        forest().serialize(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 5);

        let result = Forest::<AxisAlignedFeature, Histogram>::deserialize(&mut bytes.as_slice());
        assert!(matches!(result, Err(DeserializeError::CorruptStream(_))));
    }

    #[test]
    fn unknown_status_byte_is_corrupt() {
        let mut bytes = Vec::new();
        forest().serialize(&mut bytes).unwrap();
        // First node status byte.
        bytes[63] = 9;

        let result = Forest::<AxisAlignedFeature, Histogram>::deserialize(&mut bytes.as_slice());
        assert!(matches!(result, Err(DeserializeError::CorruptStream(_))));
    }

    #[test]
    fn node_count_mismatch_is_corrupt() {
        let mut bytes = Vec::new();
        stump().serialize(&mut bytes).unwrap();
        // Claim 7 nodes while the level count says 3.
        bytes[4..8].copy_from_slice(&7i32.to_le_bytes());

        let result = Tree::<AxisAlignedFeature, Histogram>::deserialize(&mut bytes.as_slice());
        assert!(matches!(result, Err(DeserializeError::CorruptStream(_))));
    }

    #[test]
    fn linear_feature_blob_roundtrip() {
        let feature = LinearFeature2d::new(0.75, -0.5);
        let mut bytes = Vec::new();
        feature.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 8);
        let restored = LinearFeature2d::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, feature);
    }

    #[test]
    fn aggregator_blobs_roundtrip() {
        let mut gaussian = GaussianAggregator2d::new(10.0, 400.0);
        gaussian.add_point(1.0, 2.0);
        gaussian.add_point(-0.5, 0.25);
        let mut bytes = Vec::new();
        gaussian.write_to(&mut bytes).unwrap();
        let restored = GaussianAggregator2d::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, gaussian);

        let mut fit = LinearFitAggregator1d::new();
        fit.add_sample(0.5, 1.5);
        fit.add_sample(0.75, 2.25);
        let mut bytes = Vec::new();
        fit.write_to(&mut bytes).unwrap();
        let restored = LinearFitAggregator1d::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, fit);

        let composite = SemiSupervisedAggregator::from_parts(sample_histogram(), gaussian);
        let mut bytes = Vec::new();
        composite.write_to(&mut bytes).unwrap();
        let restored = SemiSupervisedAggregator::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored.histogram().sample_count(), 10);
        assert_eq!(
            StatsAggregator::<PointCollection>::sample_count(&restored),
            2
        );
    }
}
