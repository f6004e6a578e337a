//! # Synthetic Cohorts
//!
//! Seeded generator of a conditioning panel and a set of individuals for the
//! driver binary, the benches and the integration tests.
//!
//! - Founder haplotypes are drawn per site with an alternate-allele frequency
//!   chosen so two random founders are heterozygous at the requested rate.
//! - Each individual owns panel haplotypes `2i` and `2i + 1`, rewritten as
//!   mosaics of founders with switches driven by the HMM transition masses
//!   and allele flips at the mismatch rate.
//! - The individual's starting phase is its truth with every heterozygous
//!   site swapped with probability one half.
//! - Conditioning sets are K distinct panel haplotypes, never the
//!   individual's own two.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{Genotype, HapIdx, HaplotypeMatrix, SampleIdx};
use crate::error::{Result, SegphaseError};
use crate::model::parameters::{HmmParameters, DEFAULT_MISMATCH};

/// One generated individual
#[derive(Clone, Debug)]
pub struct SyntheticIndividual {
    pub sample: SampleIdx,
    /// True haplotypes
    pub truth: [Vec<bool>; 2],
    /// Genotype record in the standard layout, built from the scrambled phase
    pub genotype: Genotype,
    /// Conditioning haplotypes, ascending
    pub conditioning: Vec<HapIdx>,
}

/// Panel, parameters and individuals of one generated cohort
#[derive(Clone, Debug)]
pub struct SyntheticCohort {
    pub panel: HaplotypeMatrix,
    pub params: HmmParameters,
    pub individuals: Vec<SyntheticIndividual>,
}

/// Builder for [`SyntheticCohort`]
#[derive(Clone, Debug)]
pub struct CohortBuilder {
    n_individuals: usize,
    n_haps: usize,
    n_sites: usize,
    n_cond: usize,
    heterozygosity: f64,
    ne: f64,
    error: f64,
    cm_per_site: f64,
    seed: u64,
}

impl CohortBuilder {
    pub fn new() -> Self {
        Self {
            n_individuals: 10,
            n_haps: 200,
            n_sites: 1_000,
            n_cond: 32,
            heterozygosity: 0.1,
            ne: 15_000.0,
            error: DEFAULT_MISMATCH,
            cm_per_site: 0.002,
            seed: 42,
        }
    }

    pub fn n_individuals(mut self, n: usize) -> Self {
        self.n_individuals = n;
        self
    }

    pub fn n_haps(mut self, n: usize) -> Self {
        self.n_haps = n;
        self
    }

    pub fn n_sites(mut self, n: usize) -> Self {
        self.n_sites = n;
        self
    }

    pub fn n_cond(mut self, n: usize) -> Self {
        self.n_cond = n;
        self
    }

    /// Expected heterozygous fraction between two founders, at most 0.5
    pub fn heterozygosity(mut self, h: f64) -> Self {
        self.heterozygosity = h;
        self
    }

    pub fn ne(mut self, ne: f64) -> Self {
        self.ne = ne;
        self
    }

    pub fn error(mut self, error: f64) -> Self {
        self.error = error;
        self
    }

    /// Mean genetic distance between adjacent sites
    pub fn cm_per_site(mut self, cm: f64) -> Self {
        self.cm_per_site = cm;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_sites == 0 || self.n_cond == 0 {
            return Err(SegphaseError::invalid_data(
                "cohort needs at least one site and one conditioning haplotype",
            ));
        }
        if self.n_haps <= 2 * self.n_individuals {
            return Err(SegphaseError::invalid_data(format!(
                "{} haplotypes leave no founders for {} individuals",
                self.n_haps, self.n_individuals
            )));
        }
        if self.n_cond > self.n_haps - 2 {
            return Err(SegphaseError::invalid_data(format!(
                "cannot draw {} conditioning haplotypes from {} others",
                self.n_cond,
                self.n_haps - 2
            )));
        }
        if !(self.heterozygosity > 0.0 && self.heterozygosity <= 0.5) {
            return Err(SegphaseError::invalid_data(format!(
                "heterozygosity must be in (0, 0.5], got {}",
                self.heterozygosity
            )));
        }
        if !(0.0..1.0).contains(&self.error) {
            return Err(SegphaseError::invalid_data(format!(
                "error rate must be in [0, 1), got {}",
                self.error
            )));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<SyntheticCohort> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let dist_cm: Vec<f64> = (0..self.n_sites)
            .map(|_| rng.gen::<f64>() * 2.0 * self.cm_per_site)
            .collect();
        let params = HmmParameters::from_genetic_distances(&dist_cm, self.ne, self.n_haps, self.error)?;

        // 2p(1-p) = h
        let p_max = (1.0 - (1.0 - 2.0 * self.heterozygosity).sqrt()) / 2.0;
        let freqs: Vec<f64> = (0..self.n_sites)
            .map(|_| rng.gen_range(0.5 * p_max..=p_max.min(0.5)))
            .collect();
        let mut panel = HaplotypeMatrix::from_fn(self.n_haps, self.n_sites, |_, s| rng.gen_bool(freqs[s]));

        let founders = 2 * self.n_individuals..self.n_haps;
        let mut individuals = Vec::with_capacity(self.n_individuals);
        for i in 0..self.n_individuals {
            let sample = SampleIdx::from(i);
            let truth = [
                self.mosaic(&mut rng, &panel, &params, founders.clone()),
                self.mosaic(&mut rng, &panel, &params, founders.clone()),
            ];
            for (hap, alleles) in [sample.hap1(), sample.hap2()].into_iter().zip(&truth) {
                for (s, &a) in alleles.iter().enumerate() {
                    panel.set(hap, s, a);
                }
            }

            let mut start = truth.clone();
            for s in 0..self.n_sites {
                if start[0][s] != start[1][s] && rng.gen_bool(0.5) {
                    let a = start[0][s];
                    start[0][s] = start[1][s];
                    start[1][s] = a;
                }
            }
            let genotype = Genotype::from_haplotypes(&start[0], &start[1])?;

            let mut conditioning: Vec<HapIdx> = rand::seq::index::sample(&mut rng, self.n_haps - 2, self.n_cond)
                .into_iter()
                .map(|h| if h >= 2 * i { HapIdx::from(h + 2) } else { HapIdx::from(h) })
                .collect();
            conditioning.sort_unstable();

            individuals.push(SyntheticIndividual {
                sample,
                truth,
                genotype,
                conditioning,
            });
        }

        Ok(SyntheticCohort {
            panel,
            params,
            individuals,
        })
    }

    fn mosaic(
        &self,
        rng: &mut StdRng,
        panel: &HaplotypeMatrix,
        params: &HmmParameters,
        founders: std::ops::Range<usize>,
    ) -> Vec<bool> {
        let mut source = HapIdx::from(rng.gen_range(founders.clone()));
        (0..self.n_sites)
            .map(|s| {
                if s > 0 && rng.gen_bool(params.transition(s - 1)) {
                    source = HapIdx::from(rng.gen_range(founders.clone()));
                }
                panel.get(source, s) != rng.gen_bool(self.error)
            })
            .collect()
    }
}

impl Default for CohortBuilder {
    fn default() -> Self {
        Self::new()
    }
}
