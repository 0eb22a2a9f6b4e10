//! Per-class count histogram for classification.

use crate::aggregators::StatsAggregator;
use crate::data::LabelAccess;

/// Counts samples per class.
///
/// The bin count is a runtime parameter; a histogram built for K classes
/// holds K bins. Only labelled samples are counted: aggregating an
/// unlabelled sample is a no-op, which is what lets the semi-supervised
/// composite reuse this type unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u32>,
    sample_count: u32,
}

impl Histogram {
    /// Create an empty histogram with one bin per class.
    pub fn new(n_classes: u32) -> Self {
        Self {
            bins: vec![0; n_classes as usize],
            sample_count: 0,
        }
    }

    /// Number of bins.
    #[inline]
    pub fn bin_count(&self) -> u32 {
        self.bins.len() as u32
    }

    /// Count in one bin.
    #[inline]
    pub fn bin(&self, class_index: u32) -> u32 {
        self.bins[class_index as usize]
    }

    /// Number of samples aggregated.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Reset all bins.
    pub fn clear(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0);
        self.sample_count = 0;
    }

    /// Add another histogram's counts to this one.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.bins.len(), other.bins.len());
        for (bin, &count) in self.bins.iter_mut().zip(&other.bins) {
            *bin += count;
        }
        self.sample_count += other.sample_count;
    }

    /// Empirical probability of a class, or 0 for an empty histogram.
    pub fn probability(&self, class_index: u32) -> f32 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.bins[class_index as usize] as f32 / self.sample_count as f32
    }

    /// Index of the fullest bin. Ties resolve to the lowest index.
    pub fn tallest_bin(&self) -> u32 {
        let mut tallest = 0;
        for (index, &count) in self.bins.iter().enumerate() {
            if count > self.bins[tallest] {
                tallest = index;
            }
        }
        tallest as u32
    }

    /// Shannon entropy in bits, with the convention `0 * log 0 = 0`.
    /// The empty histogram has entropy 0.
    pub fn entropy(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        let n = self.sample_count as f64;
        let mut result = 0.0;
        for &count in &self.bins {
            if count > 0 {
                let p = count as f64 / n;
                result -= p * p.log2();
            }
        }
        result
    }

    pub(crate) fn from_parts(bins: Vec<u32>, sample_count: u32) -> Self {
        Self { bins, sample_count }
    }

    pub(crate) fn bins(&self) -> &[u32] {
        &self.bins
    }
}

impl<D: LabelAccess + ?Sized> StatsAggregator<D> for Histogram {
    fn clear(&mut self) {
        Histogram::clear(self);
    }

    fn aggregate_one(&mut self, data: &D, index: u32) {
        if let Some(label) = data.label(index) {
            self.bins[label as usize] += 1;
            self.sample_count += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        Histogram::merge(self, other);
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    fn entropy(&self) -> f64 {
        Histogram::entropy(self)
    }
}
