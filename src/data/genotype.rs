//! # Genotype Record
//!
//! ## Role
//! Read-only per-individual genotype state consumed by the HMM engine.
//!
//! ## Layout
//! - `allele0`: one bit per site, the allele both strands carry at a
//!   homozygous site (meaningless at ambiguous sites).
//! - `ambiguous`: one bit per site, set for heterozygous / unresolved sites.
//! - `codes`: one byte per ambiguous site, in site order. Bit `h` is the
//!   allele carried by copying state `h` at that site.
//! - `lengths` / `masks`: per-segment site count and 64-bit diplotype
//!   compatibility mask (see [`crate::data::diplotype`]).

use bitvec::prelude::*;

use crate::data::diplotype::{count_diplotypes, heterozygous_mask, HAP_STATES};
use crate::error::{Result, SegphaseError};

/// Maximum heterozygous sites per segment in the standard layout
pub const MAX_HETS_PER_SEGMENT: usize = 3;

/// Read-only genotype accessor used by the engine.
pub trait GenotypeRecord {
    /// Number of sites
    fn n_sites(&self) -> usize;

    /// Number of segments
    fn n_segments(&self) -> usize;

    /// Observed allele at a homozygous site
    fn allele0(&self, site: usize) -> bool;

    /// Whether `site` is heterozygous / unresolved
    fn is_ambiguous(&self, site: usize) -> bool;

    /// Ambiguity code of the `amb_index`-th ambiguous site
    fn ambiguity_code(&self, amb_index: usize) -> u8;

    /// Number of sites in `segment`
    fn segment_length(&self, segment: usize) -> usize;

    /// Diplotype compatibility mask of `segment`
    fn diplotype_mask(&self, segment: usize) -> u64;

    /// First site of `segment`
    fn segment_start(&self, segment: usize) -> usize;

    /// Number of ambiguous sites strictly before `site`
    fn ambiguous_before(&self, site: usize) -> usize;

    /// Last site of `segment`
    fn segment_end(&self, segment: usize) -> usize {
        self.segment_start(segment) + self.segment_length(segment) - 1
    }

    /// Number of diplotypes allowed over `segment`
    fn count_diplotypes(&self, segment: usize) -> usize {
        count_diplotypes(self.diplotype_mask(segment))
    }

    /// Total number of transition probabilities an individual produces:
    /// the segment-0 prior plus one block per segment boundary.
    fn n_transitions(&self) -> usize {
        let boundaries: usize = (1..self.n_segments())
            .map(|s| self.count_diplotypes(s - 1) * self.count_diplotypes(s))
            .sum();
        self.count_diplotypes(0) + boundaries
    }
}

/// Observation at one site, as handed to [`GenotypeBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Site {
    /// Both strands carry this allele
    Hom(bool),
    /// Ambiguity code: bit `h` is the allele of copying state `h`
    Ambiguous(u8),
}

/// Bit-packed genotype record for one individual.
#[derive(Clone, Debug)]
pub struct Genotype {
    allele0: BitVec<u64, Lsb0>,
    ambiguous: BitVec<u64, Lsb0>,
    codes: Vec<u8>,
    lengths: Vec<u32>,
    masks: Vec<u64>,
    /// `segment_starts[s]` = first site of segment `s`; one extra trailing entry
    segment_starts: Vec<usize>,
}

impl Genotype {
    /// Build with the standard segment layout from the individual's current
    /// haplotype pair.
    ///
    /// A new segment starts at every fourth heterozygous site. At the `j`-th
    /// het of a segment, copying state `h` carries `hap0`'s allele when bit
    /// `j` of `h` is clear and `hap1`'s allele otherwise, so state 0 is the
    /// current first haplotype and state 7 (with three hets) the second.
    pub fn from_haplotypes(hap0: &[bool], hap1: &[bool]) -> Result<Self> {
        if hap0.len() != hap1.len() {
            return Err(SegphaseError::invalid_data(format!(
                "haplotype lengths differ: {} vs {}",
                hap0.len(),
                hap1.len()
            )));
        }

        let mut builder = GenotypeBuilder::new();
        let mut sites = Vec::new();
        let mut n_het = 0;
        for (&a0, &a1) in hap0.iter().zip(hap1) {
            if a0 == a1 {
                sites.push(Site::Hom(a0));
                continue;
            }
            if n_het == MAX_HETS_PER_SEGMENT {
                builder.push_segment(&sites, heterozygous_mask(n_het));
                sites.clear();
                n_het = 0;
            }
            let mut code = 0u8;
            for h in 0..HAP_STATES {
                let flipped = (h >> n_het) & 1 == 1;
                if a0 != flipped {
                    code |= 1 << h;
                }
            }
            sites.push(Site::Ambiguous(code));
            n_het += 1;
        }
        if !sites.is_empty() {
            builder.push_segment(&sites, heterozygous_mask(n_het));
        }
        builder.build()
    }

    /// Number of ambiguous sites
    pub fn n_ambiguous(&self) -> usize {
        self.codes.len()
    }

}

impl GenotypeRecord for Genotype {
    fn n_sites(&self) -> usize {
        self.allele0.len()
    }

    fn n_segments(&self) -> usize {
        self.lengths.len()
    }

    #[inline]
    fn allele0(&self, site: usize) -> bool {
        self.allele0[site]
    }

    #[inline]
    fn is_ambiguous(&self, site: usize) -> bool {
        self.ambiguous[site]
    }

    #[inline]
    fn ambiguity_code(&self, amb_index: usize) -> u8 {
        self.codes[amb_index]
    }

    #[inline]
    fn segment_length(&self, segment: usize) -> usize {
        self.lengths[segment] as usize
    }

    #[inline]
    fn diplotype_mask(&self, segment: usize) -> u64 {
        self.masks[segment]
    }

    fn segment_start(&self, segment: usize) -> usize {
        self.segment_starts[segment]
    }

    fn ambiguous_before(&self, site: usize) -> usize {
        self.ambiguous[..site].count_ones()
    }
}

/// Incremental builder for [`Genotype`] with explicit segments.
#[derive(Clone, Debug, Default)]
pub struct GenotypeBuilder {
    allele0: BitVec<u64, Lsb0>,
    ambiguous: BitVec<u64, Lsb0>,
    codes: Vec<u8>,
    lengths: Vec<u32>,
    masks: Vec<u64>,
}

impl GenotypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment; validity is checked in [`GenotypeBuilder::build`]
    pub fn push_segment(&mut self, sites: &[Site], mask: u64) -> &mut Self {
        for site in sites {
            match *site {
                Site::Hom(allele) => {
                    self.allele0.push(allele);
                    self.ambiguous.push(false);
                }
                Site::Ambiguous(code) => {
                    self.allele0.push(code & 1 == 1);
                    self.ambiguous.push(true);
                    self.codes.push(code);
                }
            }
        }
        self.lengths.push(sites.len() as u32);
        self.masks.push(mask);
        self
    }

    pub fn build(&self) -> Result<Genotype> {
        if self.lengths.is_empty() {
            return Err(SegphaseError::invalid_data("genotype has no segments"));
        }
        if let Some(s) = self.lengths.iter().position(|&l| l == 0) {
            return Err(SegphaseError::invalid_data(format!("segment {} is empty", s)));
        }
        if let Some(s) = self.masks.iter().position(|&m| m == 0) {
            return Err(SegphaseError::invalid_data(format!(
                "segment {} allows no diplotype",
                s
            )));
        }

        let mut segment_starts = Vec::with_capacity(self.lengths.len() + 1);
        let mut start = 0usize;
        segment_starts.push(start);
        for &len in &self.lengths {
            start += len as usize;
            segment_starts.push(start);
        }

        Ok(Genotype {
            allele0: self.allele0.clone(),
            ambiguous: self.ambiguous.clone(),
            codes: self.codes.clone(),
            lengths: self.lengths.clone(),
            masks: self.masks.clone(),
            segment_starts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_layout() {
        let g = GenotypeBuilder::new()
            .push_segment(&[Site::Hom(true), Site::Ambiguous(0b1010_1010)], 0b11)
            .push_segment(&[Site::Hom(false)], 1 << 5)
            .build()
            .unwrap();

        assert_eq!(g.n_sites(), 3);
        assert_eq!(g.n_segments(), 2);
        assert_eq!(g.n_ambiguous(), 1);
        assert!(g.allele0(0));
        assert!(g.is_ambiguous(1));
        assert!(!g.is_ambiguous(2));
        assert_eq!(g.ambiguity_code(0), 0b1010_1010);
        assert_eq!(g.segment_start(1), 2);
        assert_eq!(g.segment_end(0), 1);
        assert_eq!(g.count_diplotypes(0), 2);
        assert_eq!(g.count_diplotypes(1), 1);
        assert_eq!(g.ambiguous_before(2), 1);
        assert_eq!(g.n_transitions(), 2 + 2);
    }

    #[test]
    fn test_builder_rejects_empty_mask() {
        let err = GenotypeBuilder::new()
            .push_segment(&[Site::Hom(true)], 0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("segment 0"));
    }

    #[test]
    fn test_builder_rejects_empty_segment() {
        assert!(GenotypeBuilder::new()
            .push_segment(&[Site::Hom(true)], 1)
            .push_segment(&[], 1)
            .build()
            .is_err());
        assert!(GenotypeBuilder::new().build().is_err());
    }

    #[test]
    fn test_from_haplotypes_segments_every_three_hets() {
        // hets at 1, 2, 4, 6, 7
        let hap0 = [false, true, false, true, true, false, false, true];
        let hap1 = [false, false, true, true, false, false, true, false];
        let g = Genotype::from_haplotypes(&hap0, &hap1).unwrap();

        assert_eq!(g.n_segments(), 2);
        assert_eq!(g.segment_length(0), 6);
        assert_eq!(g.segment_length(1), 2);
        assert_eq!(g.n_ambiguous(), 5);
        assert_eq!(g.count_diplotypes(0), 8);
        assert_eq!(g.count_diplotypes(1), 16);
    }

    #[test]
    fn test_from_haplotypes_codes_track_phase() {
        let hap0 = [true, false, true];
        let hap1 = [false, true, false];
        let g = Genotype::from_haplotypes(&hap0, &hap1).unwrap();

        for amb in 0..3 {
            let code = g.ambiguity_code(amb);
            // state 0 carries hap0, state 7 carries hap1
            assert_eq!(code & 1 == 1, hap0[amb]);
            assert_eq!((code >> 7) & 1 == 1, hap1[amb]);
        }
        // state 1 flips only the first het
        assert_eq!((g.ambiguity_code(0) >> 1) & 1 == 1, hap1[0]);
        assert_eq!((g.ambiguity_code(1) >> 1) & 1 == 1, hap0[1]);
    }

    #[test]
    fn test_from_haplotypes_all_homozygous() {
        let hap = [true, false, false];
        let g = Genotype::from_haplotypes(&hap, &hap).unwrap();
        assert_eq!(g.n_segments(), 1);
        assert_eq!(g.count_diplotypes(0), 64);
        assert_eq!(g.n_transitions(), 64);
    }
}
