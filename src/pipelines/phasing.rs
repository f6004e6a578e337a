//! # Phasing Batch
//!
//! Runs one [`SegmentHmm`] per (individual, window) and assembles each
//! individual's diplotype transition array.
//!
//! Individuals are processed in parallel with rayon; the windows of one
//! individual run in order on the same worker. A window that ends in an
//! unrecoverable underflow leaves its slots of the caller's array untouched,
//! so the previous values survive and the window index is reported.

use std::cell::RefCell;

use rayon::prelude::*;
use tracing::{info_span, instrument, warn};

use crate::data::{ConditioningPanel, Coordinates, Genotype, GenotypeRecord, HapIdx, WindowBuilder};
use crate::error::{Result, SegphaseError};
use crate::model::parameters::HmmParameters;
use crate::model::segment_hmm::SegmentHmm;
use crate::utils::telemetry::PhasingCounters;

thread_local! {
    /// Per-worker output block for one window
    static WINDOW_SCRATCH: RefCell<Vec<f64>> = const { RefCell::new(Vec::new()) };
}

/// One individual ready for the engine: genotype, conditioning set and windows
#[derive(Clone, Debug)]
pub struct PhasingTarget {
    pub genotype: Genotype,
    pub conditioning: Vec<HapIdx>,
    pub windows: Vec<Coordinates>,
}

impl PhasingTarget {
    pub fn new(genotype: Genotype, conditioning: Vec<HapIdx>, windows: &WindowBuilder) -> Result<Self> {
        if conditioning.is_empty() {
            return Err(SegphaseError::invalid_data("conditioning set is empty"));
        }
        let windows = windows.build(&genotype)?;
        Ok(Self {
            genotype,
            conditioning,
            windows,
        })
    }

    /// Length of the individual's transition array
    pub fn n_transitions(&self) -> usize {
        self.genotype.n_transitions()
    }

    /// Zeroed transition array of the right size
    pub fn transition_buffer(&self) -> Vec<f64> {
        vec![0.0; self.n_transitions()]
    }
}

/// Result of one individual's run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndividualOutcome {
    /// Boundaries resolved with the additive fallback, over all windows
    pub n_recovered: usize,
    /// Windows whose update was discarded
    pub failed_windows: Vec<usize>,
}

impl IndividualOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_windows.is_empty()
    }
}

/// Shared read-only inputs of a batch
pub struct PhasingBatch<'a, P> {
    panel: &'a P,
    params: &'a HmmParameters,
    counters: &'a PhasingCounters,
}

impl<'a, P> PhasingBatch<'a, P>
where
    P: ConditioningPanel + Sync,
{
    pub fn new(panel: &'a P, params: &'a HmmParameters, counters: &'a PhasingCounters) -> Self {
        Self {
            panel,
            params,
            counters,
        }
    }

    /// Phase every target, writing into the matching caller-owned array.
    #[instrument(skip_all, fields(n_individuals = targets.len()))]
    pub fn run(&self, targets: &[PhasingTarget], outputs: &mut [Vec<f64>]) -> Result<Vec<IndividualOutcome>> {
        if targets.len() != outputs.len() {
            return Err(SegphaseError::invalid_data(format!(
                "{} targets but {} transition arrays",
                targets.len(),
                outputs.len()
            )));
        }
        self.check_inputs(targets, outputs)?;

        info_span!("phase_individuals").in_scope(|| {
            targets
                .par_iter()
                .zip(outputs.par_iter_mut())
                .map(|(target, out)| {
                    let outcome = self.run_individual(target, out);
                    self.counters.record_individual();
                    outcome
                })
                .collect()
        })
    }

    fn check_inputs(&self, targets: &[PhasingTarget], outputs: &[Vec<f64>]) -> Result<()> {
        let n_sites = self.panel.n_sites();
        if self.params.n_sites() != n_sites {
            return Err(SegphaseError::invalid_data(format!(
                "parameter table covers {} sites, panel {}",
                self.params.n_sites(),
                n_sites
            )));
        }
        for (i, (target, out)) in targets.iter().zip(outputs).enumerate() {
            if target.genotype.n_sites() != n_sites {
                return Err(SegphaseError::invalid_data(format!(
                    "individual {} has {} sites, panel {}",
                    i,
                    target.genotype.n_sites(),
                    n_sites
                )));
            }
            if let Some(hap) = target.conditioning.iter().find(|h| h.as_usize() >= self.panel.n_haps()) {
                return Err(SegphaseError::invalid_data(format!(
                    "individual {} conditions on haplotype {} outside the panel",
                    i,
                    hap.as_usize()
                )));
            }
            if out.len() < target.n_transitions() {
                return Err(SegphaseError::invalid_data(format!(
                    "individual {} needs {} transition slots, got {}",
                    i,
                    target.n_transitions(),
                    out.len()
                )));
            }
        }
        Ok(())
    }

    fn run_individual(&self, target: &PhasingTarget, out: &mut [f64]) -> Result<IndividualOutcome> {
        WINDOW_SCRATCH.with(|scratch| {
            let mut scratch = scratch.borrow_mut();
            let mut outcome = IndividualOutcome::default();

            for (w, window) in target.windows.iter().enumerate() {
                let range = window.transition_range(&target.genotype);
                let local = Coordinates {
                    transition_first: 0,
                    ..window.clone()
                };
                scratch.clear();
                scratch.resize(range.len(), 0.0);

                let hmm = SegmentHmm::new(
                    self.panel,
                    &target.conditioning,
                    &target.genotype,
                    self.params,
                    &local,
                );
                match hmm.expectation(&mut scratch) {
                    Ok(n_recovered) => {
                        out[range].copy_from_slice(&scratch);
                        outcome.n_recovered += n_recovered;
                        self.counters.record_window(n_recovered, window.n_sites());
                    }
                    Err(e) if e.is_underflow() => {
                        warn!(window = w, error = %e, "discarding window update");
                        outcome.failed_windows.push(w);
                        self.counters.record_failure(window.n_sites());
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GenotypeBuilder, HaplotypeMatrix, Site};
    use crate::utils::synthetic::CohortBuilder;

    /// Block sizes of an individual's transition array, in output order
    fn block_sizes(genotype: &Genotype) -> Vec<usize> {
        let mut sizes = vec![genotype.count_diplotypes(0)];
        for s in 1..genotype.n_segments() {
            sizes.push(genotype.count_diplotypes(s - 1) * genotype.count_diplotypes(s));
        }
        sizes
    }

    #[test]
    fn test_windows_fill_every_block() {
        let cohort = CohortBuilder::new()
            .n_individuals(3)
            .n_haps(30)
            .n_sites(400)
            .n_cond(10)
            .heterozygosity(0.3)
            .seed(11)
            .build()
            .unwrap();
        let counters = PhasingCounters::new();
        let batch = PhasingBatch::new(&cohort.panel, &cohort.params, &counters);

        let targets: Vec<PhasingTarget> = cohort
            .individuals
            .iter()
            .map(|ind| {
                PhasingTarget::new(
                    ind.genotype.clone(),
                    ind.conditioning.clone(),
                    &WindowBuilder::new().max_segments(4),
                )
                .unwrap()
            })
            .collect();
        assert!(targets[0].windows.len() > 1);

        let mut outputs: Vec<Vec<f64>> = targets.iter().map(|t| vec![-1.0; t.n_transitions()]).collect();
        let outcomes = batch.run(&targets, &mut outputs).unwrap();
        assert!(outcomes.iter().all(|o| o.is_complete()));

        for (target, out) in targets.iter().zip(&outputs) {
            let mut offset = 0;
            for size in block_sizes(&target.genotype) {
                let block = &out[offset..offset + size];
                assert!(block.iter().all(|&p| (0.0..=1.0).contains(&p)));
                assert!((block.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                offset += size;
            }
            assert_eq!(offset, out.len());
        }

        let snap = counters.snapshot();
        assert_eq!(snap.individuals_done, 3);
        let n_windows: usize = targets.iter().map(|t| t.windows.len()).sum();
        assert_eq!(snap.windows_run, n_windows as u64);
        assert_eq!(snap.windows_failed, 0);
    }

    #[test]
    fn test_failed_window_keeps_previous_values() {
        // every emission is tiny, so the second segment cannot be reached
        let mut builder = GenotypeBuilder::new();
        let seg = [
            Site::Ambiguous(0x0f),
            Site::Ambiguous(0x33),
            Site::Hom(false),
            Site::Hom(true),
        ];
        builder.push_segment(&seg, u64::MAX).push_segment(&seg, u64::MAX);
        let genotype = builder.build().unwrap();
        let panel = HaplotypeMatrix::from_fn(3, 8, |h, s| (h + s) % 2 == 0);
        let params = HmmParameters::uniform(8, 0.01, 1e-200, 1e-200).unwrap();
        let counters = PhasingCounters::new();
        let batch = PhasingBatch::new(&panel, &params, &counters);

        let target = PhasingTarget::new(
            genotype,
            vec![HapIdx::new(0), HapIdx::new(1), HapIdx::new(2)],
            &WindowBuilder::new(),
        )
        .unwrap();
        let mut outputs = vec![vec![-1.0; target.n_transitions()]];
        let outcomes = batch.run(std::slice::from_ref(&target), &mut outputs).unwrap();

        assert_eq!(outcomes[0].failed_windows, vec![0]);
        assert!(outputs[0].iter().all(|&v| v == -1.0));
        let snap = counters.snapshot();
        assert_eq!(snap.windows_failed, 1);
        assert_eq!(snap.windows_run, 1);
    }

    #[test]
    fn test_rejects_short_output() {
        let cohort = CohortBuilder::new().n_individuals(1).n_haps(20).n_sites(50).n_cond(4).build().unwrap();
        let counters = PhasingCounters::new();
        let batch = PhasingBatch::new(&cohort.panel, &cohort.params, &counters);
        let ind = &cohort.individuals[0];
        let target = PhasingTarget::new(ind.genotype.clone(), ind.conditioning.clone(), &WindowBuilder::new()).unwrap();

        let mut outputs = vec![vec![0.0; target.n_transitions() - 1]];
        assert!(batch.run(std::slice::from_ref(&target), &mut outputs).is_err());
        let mut outputs: Vec<Vec<f64>> = Vec::new();
        assert!(batch.run(std::slice::from_ref(&target), &mut outputs).is_err());
    }
}
