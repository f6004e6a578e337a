//! # Conditioning Panel
//!
//! Bit-packed storage for the global haplotype matrix that conditioning
//! haplotypes are drawn from. One bit per (haplotype, site): 0 = REF, 1 = ALT.
//!
//! The engine only ever reads the panel through [`ConditioningPanel`], so any
//! storage that can answer `allele(hap, site)` may stand in for the matrix.

use bitvec::prelude::*;

use crate::data::HapIdx;
use crate::error::{Result, SegphaseError};

/// Read-only allele accessor over a haplotype panel.
pub trait ConditioningPanel {
    /// Allele carried by haplotype `hap` at `site` (true = ALT)
    fn allele(&self, hap: HapIdx, site: usize) -> bool;

    /// Number of haplotypes in the panel
    fn n_haps(&self) -> usize;

    /// Number of sites in the panel
    fn n_sites(&self) -> usize;
}

/// Dense bit matrix of haplotypes x sites, hap-major.
#[derive(Clone, Debug)]
pub struct HaplotypeMatrix {
    /// Bit `hap * n_sites + site`
    bits: BitVec<u64, Lsb0>,
    n_haps: usize,
    n_sites: usize,
}

impl HaplotypeMatrix {
    /// Create an all-REF matrix
    pub fn new(n_haps: usize, n_sites: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; n_haps * n_sites],
            n_haps,
            n_sites,
        }
    }

    /// Create from a function `(hap, site) -> allele`
    pub fn from_fn<F>(n_haps: usize, n_sites: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut matrix = Self::new(n_haps, n_sites);
        for h in 0..n_haps {
            let row = h * n_sites;
            for s in 0..n_sites {
                if f(h, s) {
                    matrix.bits.set(row + s, true);
                }
            }
        }
        matrix
    }

    /// Create from one allele row per haplotype; rows must share a length
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n_sites = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_sites) {
            return Err(SegphaseError::invalid_data(format!(
                "haplotype {} has {} sites, expected {}",
                bad,
                rows[bad].len(),
                n_sites
            )));
        }
        Ok(Self::from_fn(rows.len(), n_sites, |h, s| rows[h][s]))
    }

    #[inline(always)]
    fn index(&self, hap: HapIdx, site: usize) -> usize {
        hap.as_usize() * self.n_sites + site
    }

    /// Get allele at (hap, site)
    #[inline]
    pub fn get(&self, hap: HapIdx, site: usize) -> bool {
        self.bits[self.index(hap, site)]
    }

    /// Set allele at (hap, site)
    pub fn set(&mut self, hap: HapIdx, site: usize, allele: bool) {
        let idx = self.index(hap, site);
        self.bits.set(idx, allele);
    }
}

impl ConditioningPanel for HaplotypeMatrix {
    #[inline]
    fn allele(&self, hap: HapIdx, site: usize) -> bool {
        self.get(hap, site)
    }

    fn n_haps(&self) -> usize {
        self.n_haps
    }

    fn n_sites(&self) -> usize {
        self.n_sites
    }
}
