//! # Haplotype and Individual Indices
//!
//! Zero-cost newtypes for indexing the global haplotype matrix and the
//! individuals being phased.

/// Zero-cost newtype for individual (sample) indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SampleIdx(pub u32);

impl SampleIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// Get the first haplotype index for this individual (diploid layout)
    pub fn hap1(self) -> HapIdx {
        HapIdx::new(self.0 * 2)
    }

    /// Get the second haplotype index for this individual (diploid layout)
    pub fn hap2(self) -> HapIdx {
        HapIdx::new(self.0 * 2 + 1)
    }
}

impl From<usize> for SampleIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Zero-cost newtype for haplotype indices (rows of the haplotype matrix)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HapIdx(pub u32);

impl HapIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for HapIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}
