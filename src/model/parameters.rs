//! # HMM Parameter Table
//!
//! Per-site transition masses and the two emission likelihoods, precomputed
//! once per outer iteration and shared read-only by every engine.
//!
//! ## Li-Stephens Transition Mass
//! `transition(l)` is the probability mass of switching conditioning
//! haplotype between site `l` and site `l + 1`:
//!
//! ```text
//! t(l) = 1 - exp(-0.04 * Ne * d(l) / n)
//!
//! where:
//!   Ne   = effective population size
//!   d(l) = genetic distance in cM between sites l and l + 1
//!   n    = number of haplotypes in the panel
//! ```
//!
//! The engine spreads `t(l)` uniformly over its K conditioning haplotypes.

use crate::error::{Result, SegphaseError};

/// Default mismatch (genotyping error) likelihood
pub const DEFAULT_MISMATCH: f64 = 1e-4;

/// Read-only table of per-site HMM parameters.
#[derive(Clone, Debug)]
pub struct HmmParameters {
    /// Transition mass between site `l` and `l + 1`
    t: Vec<f64>,
    /// `1 - t`
    nt: Vec<f64>,
    /// Emission likelihood when the conditioning allele matches
    ee: f64,
    /// Emission likelihood when it does not
    ed: f64,
}

impl HmmParameters {
    /// Build from explicit per-site transition masses.
    pub fn new(transition: Vec<f64>, match_likelihood: f64, mismatch_likelihood: f64) -> Result<Self> {
        if let Some(l) = transition.iter().position(|t| !(0.0..=1.0).contains(t)) {
            return Err(SegphaseError::invalid_data(format!(
                "transition mass {} at site {} is outside [0, 1]",
                transition[l], l
            )));
        }
        for (name, value) in [("match", match_likelihood), ("mismatch", mismatch_likelihood)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SegphaseError::invalid_data(format!(
                    "{} likelihood must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        let nt = transition.iter().map(|t| 1.0 - t).collect();
        Ok(Self {
            t: transition,
            nt,
            ee: match_likelihood,
            ed: mismatch_likelihood,
        })
    }

    /// Same transition mass at every site
    pub fn uniform(
        n_sites: usize,
        transition: f64,
        match_likelihood: f64,
        mismatch_likelihood: f64,
    ) -> Result<Self> {
        Self::new(vec![transition; n_sites], match_likelihood, mismatch_likelihood)
    }

    /// Derive transition masses from inter-site genetic distances (cM).
    ///
    /// `dist_cm[l]` is the distance between site `l` and `l + 1`; the final
    /// entry is never read by the engine.
    pub fn from_genetic_distances(dist_cm: &[f64], ne: f64, n_haps: usize, error: f64) -> Result<Self> {
        if ne <= 0.0 || n_haps == 0 {
            return Err(SegphaseError::invalid_data(format!(
                "need Ne > 0 and at least one haplotype, got Ne={} n_haps={}",
                ne, n_haps
            )));
        }
        if let Some(l) = dist_cm.iter().position(|d| !d.is_finite() || *d < 0.0) {
            return Err(SegphaseError::invalid_data(format!(
                "genetic distance {} at site {} is invalid",
                dist_cm[l], l
            )));
        }
        let scale = 0.04 * ne / n_haps as f64;
        let t = dist_cm.iter().map(|d| -(-scale * d).exp_m1()).collect();
        Self::new(t, 1.0, error)
    }

    /// Number of sites covered
    pub fn n_sites(&self) -> usize {
        self.t.len()
    }

    #[inline(always)]
    pub fn transition(&self, site: usize) -> f64 {
        self.t[site]
    }

    #[inline(always)]
    pub fn no_transition(&self, site: usize) -> f64 {
        self.nt[site]
    }

    #[inline(always)]
    pub fn match_likelihood(&self) -> f64 {
        self.ee
    }

    #[inline(always)]
    pub fn mismatch_likelihood(&self) -> f64 {
        self.ed
    }
}
