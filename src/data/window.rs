//! # Coordinate Windows
//!
//! A window is a contiguous run of whole segments of one individual, together
//! with the derived site range, ambiguous-site range and the offset of its
//! first block in the individual's transition-probability array.
//!
//! Windows produced by [`WindowBuilder`] overlap by exactly one segment: the
//! last segment of window `w` is the first segment of window `w + 1`, so every
//! segment boundary belongs to exactly one window and the output blocks of
//! consecutive windows are contiguous.

use std::ops::Range;

use crate::data::genotype::GenotypeRecord;
use crate::error::{Result, SegphaseError};

/// Coordinates of one (individual, window) engine invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinates {
    /// First segment (inclusive)
    pub segment_first: usize,
    /// Last segment (inclusive)
    pub segment_last: usize,
    /// First site (inclusive)
    pub locus_first: usize,
    /// Last site (inclusive)
    pub locus_last: usize,
    /// Indices of the ambiguous sites inside the window
    pub ambiguous: Range<usize>,
    /// Offset of the window's first output block; this is the prior block
    /// when the window starts at segment 0
    pub transition_first: usize,
}

impl Coordinates {
    /// Derive coordinates for segments `segment_first..=segment_last`
    pub fn new<G: GenotypeRecord>(
        genotype: &G,
        segment_first: usize,
        segment_last: usize,
        transition_first: usize,
    ) -> Result<Self> {
        if segment_first > segment_last || segment_last >= genotype.n_segments() {
            return Err(SegphaseError::invalid_data(format!(
                "segment window {}..={} outside 0..{}",
                segment_first,
                segment_last,
                genotype.n_segments()
            )));
        }
        let locus_first = genotype.segment_start(segment_first);
        let locus_last = genotype.segment_end(segment_last);
        let ambiguous =
            genotype.ambiguous_before(locus_first)..genotype.ambiguous_before(locus_last + 1);

        Ok(Self {
            segment_first,
            segment_last,
            locus_first,
            locus_last,
            ambiguous,
            transition_first,
        })
    }

    /// A single window spanning the whole individual
    pub fn whole<G: GenotypeRecord>(genotype: &G) -> Result<Self> {
        Self::new(genotype, 0, genotype.n_segments() - 1, 0)
    }

    /// Number of segments in the window
    pub fn n_segments(&self) -> usize {
        self.segment_last - self.segment_first + 1
    }

    /// Number of sites in the window
    pub fn n_sites(&self) -> usize {
        self.locus_last - self.locus_first + 1
    }

    /// Whether the window starts at the individual's first segment
    pub fn starts_individual(&self) -> bool {
        self.segment_first == 0
    }

    /// Exact number of probabilities this window writes
    pub fn n_transitions<G: GenotypeRecord>(&self, genotype: &G) -> usize {
        let prior = if self.starts_individual() {
            genotype.count_diplotypes(0)
        } else {
            0
        };
        let boundaries: usize = (self.segment_first + 1..=self.segment_last)
            .map(|s| genotype.count_diplotypes(s - 1) * genotype.count_diplotypes(s))
            .sum();
        prior + boundaries
    }

    /// Slots of the individual's transition array written by this window
    pub fn transition_range<G: GenotypeRecord>(&self, genotype: &G) -> Range<usize> {
        self.transition_first..self.transition_first + self.n_transitions(genotype)
    }
}

/// Builder splitting an individual into overlapping segment windows
#[derive(Clone, Debug)]
pub struct WindowBuilder {
    /// Maximum segments per window, shared segment included
    max_segments: usize,
}

impl WindowBuilder {
    /// Create a new window builder with default settings
    pub fn new() -> Self {
        Self { max_segments: 256 }
    }

    /// Set the maximum number of segments per window
    pub fn max_segments(mut self, n: usize) -> Self {
        self.max_segments = n;
        self
    }

    /// Partition `genotype` into windows with contiguous output offsets
    pub fn build<G: GenotypeRecord>(&self, genotype: &G) -> Result<Vec<Coordinates>> {
        if self.max_segments < 2 {
            return Err(SegphaseError::config(format!(
                "windows need at least 2 segments to share a boundary, got {}",
                self.max_segments
            )));
        }

        let n_segments = genotype.n_segments();
        let mut windows = Vec::with_capacity(n_segments / (self.max_segments - 1) + 1);
        let mut first = 0;
        let mut offset = 0;
        loop {
            let last = (first + self.max_segments - 1).min(n_segments - 1);
            let window = Coordinates::new(genotype, first, last, offset)?;
            offset += window.n_transitions(genotype);
            windows.push(window);
            if last == n_segments - 1 {
                break;
            }
            first = last;
        }
        Ok(windows)
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
