//! # Segment HMM Engine
//!
//! Forward-backward over one individual and one coordinate window, followed
//! by the derivation of diplotype transition probabilities at every segment
//! boundary of the window.
//!
//! ## Key Concepts
//! - Two probability buffers ("strands") are updated on alternating sites:
//!   even window-relative sites update strand 1, odd sites strand 0. Each
//!   update reads the *other* buffer, which holds the previous site.
//! - Inside a segment sites are linked by a full run update. The first site
//!   of a segment (last, when walking backward) is linked by a collapse update
//!   that only uses per-haplotype marginals of the previous site.
//! - Buffers are renormalised every [`SCALE_STRIDE`] sites.
//! - Forward snapshots are taken at each segment's last site, backward
//!   snapshots at each segment's first site.
//!
//! The engine is constructed per (individual, window) and consumed by
//! [`SegmentHmm::expectation`]; nothing survives the call.

use tracing::{debug, info_span};

use crate::data::{
    CompatibleDiplotypes, ConditioningPanel, Coordinates, GenotypeRecord, HapIdx, HAP_STATES,
};
use crate::error::{Result, SegphaseError, UnderflowStage};
use crate::model::kernels::{StateBlock, StrandState};
use crate::model::parameters::HmmParameters;
use crate::model::transitions::{is_degenerate, DiplotypeForm, HapTransitions};

/// Sites between two renormalisations of the active buffer
pub const SCALE_STRIDE: usize = 50;

/// Direction of a recursion pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Site whose transition mass links `locus` to the previously visited site
    #[inline]
    fn transition_site(self, locus: usize) -> usize {
        match self {
            Direction::Forward => locus - 1,
            Direction::Backward => locus,
        }
    }
}

/// How the active buffer is linked to the previously visited site
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    /// First site of the pass
    Start,
    /// Crossing into a new segment
    Collapse,
    /// Within a segment
    Run,
}

/// One site of a recursion pass
struct SiteStep {
    locus: usize,
    rel: usize,
    ambiguous: Option<usize>,
    link: Link,
    direction: Direction,
    /// Whether per-haplotype marginals are needed by the next collapse
    segment_edge: bool,
}

/// Per-(individual, window) forward-backward engine.
pub struct SegmentHmm<'a, P, G> {
    panel: &'a P,
    conditioning: &'a [HapIdx],
    genotype: &'a G,
    params: &'a HmmParameters,
    window: &'a Coordinates,

    strands: [StrandState; 2],
    /// Conditioning alleles at the current site
    alleles: Vec<bool>,
    /// Compatible diplotypes of every segment in the window
    diplotypes: Vec<CompatibleDiplotypes>,

    /// Forward snapshot per window segment, `K` blocks each
    alpha: Vec<StateBlock>,
    alpha_sum: Vec<StateBlock>,
    /// Backward snapshot per window segment, `K` blocks each
    beta: Vec<StateBlock>,
    /// Backward per-state marginal at the individual's first site
    beta_sum: StateBlock,
}

impl<'a, P, G> SegmentHmm<'a, P, G>
where
    P: ConditioningPanel,
    G: GenotypeRecord,
{
    /// Allocate the engine state for one window.
    ///
    /// `conditioning` lists the K panel haplotypes this individual copies from.
    pub fn new(
        panel: &'a P,
        conditioning: &'a [HapIdx],
        genotype: &'a G,
        params: &'a HmmParameters,
        window: &'a Coordinates,
    ) -> Self {
        let n_cond = conditioning.len();
        let n_segments = window.n_segments();
        let diplotypes = (window.segment_first..=window.segment_last)
            .map(|s| CompatibleDiplotypes::from_mask(genotype.diplotype_mask(s)))
            .collect();

        Self {
            panel,
            conditioning,
            genotype,
            params,
            window,
            strands: [StrandState::new(n_cond), StrandState::new(n_cond)],
            alleles: vec![false; n_cond],
            diplotypes,
            alpha: vec![[0.0; HAP_STATES]; n_segments * n_cond],
            alpha_sum: vec![[0.0; HAP_STATES]; n_segments],
            beta: vec![[0.0; HAP_STATES]; n_segments * n_cond],
            beta_sum: [0.0; HAP_STATES],
        }
    }

    /// Number of conditioning haplotypes
    pub fn n_cond(&self) -> usize {
        self.conditioning.len()
    }

    /// Run forward, backward and the transition derivation, writing this
    /// window's blocks into `out` starting at `window.transition_first`.
    ///
    /// Returns the number of boundaries that needed the additive fallback.
    /// An [`SegphaseError::Underflow`] means the window is unusable and the
    /// caller must discard its update; `out` may then be partially written.
    pub fn expectation(mut self, out: &mut [f64]) -> Result<usize> {
        let window = self.window;
        let range = window.transition_range(self.genotype);
        if out.len() < range.end {
            return Err(SegphaseError::invalid_data(format!(
                "transition array holds {} values, window writes up to {}",
                out.len(),
                range.end
            )));
        }

        let _span = info_span!(
            "segment_hmm",
            segments = window.n_segments(),
            sites = window.n_sites()
        )
        .entered();

        info_span!("forward").in_scope(|| self.forward());
        info_span!("backward").in_scope(|| self.backward());

        let mut cursor = range.start;
        if window.starts_individual() {
            let n = self.diplotypes[0].len();
            self.fill_prior(&mut out[cursor..cursor + n])?;
            cursor += n;
        }

        let n_cond = self.n_cond();
        let mut n_recovered = 0;
        let mut boundary_locus = window.locus_first;
        for segment in window.segment_first + 1..=window.segment_last {
            let rel = segment - window.segment_first;
            boundary_locus += self.genotype.segment_length(segment - 1);
            let site = boundary_locus - 1;

            let hprobs = HapTransitions::compute(
                &self.alpha[(rel - 1) * n_cond..rel * n_cond],
                &self.alpha_sum[rel - 1],
                &self.beta[rel * n_cond..(rel + 1) * n_cond],
                self.params.no_transition(site),
                self.params.transition(site),
            );
            if hprobs.is_degenerate() {
                return Err(SegphaseError::underflow(segment, UnderflowStage::Haplotype));
            }

            let prev = &self.diplotypes[rel - 1];
            let next = &self.diplotypes[rel];
            let n = prev.len() * next.len();
            match hprobs.fill_diplotypes(prev, next, &mut out[cursor..cursor + n]) {
                Some(DiplotypeForm::Product) => {}
                Some(DiplotypeForm::Sum) => {
                    n_recovered += 1;
                    debug!(segment, "diplotype product underflowed, used additive form");
                }
                None => {
                    return Err(SegphaseError::underflow(segment, UnderflowStage::Diplotype));
                }
            }
            cursor += n;
        }

        Ok(n_recovered)
    }

    /// Diplotype prior over segment 0 from the backward marginal at site 0
    fn fill_prior(&self, out: &mut [f64]) -> Result<()> {
        let sum_hap: f64 = self.beta_sum.iter().sum();
        let mut sum_dip = 0.0;
        for (slot, d) in out.iter_mut().zip(self.diplotypes[0].iter()) {
            *slot = (self.beta_sum[d.hap0()] / sum_hap) * (self.beta_sum[d.hap1()] / sum_hap);
            sum_dip += *slot;
        }
        if is_degenerate(sum_dip) {
            return Err(SegphaseError::underflow(0, UnderflowStage::Prior));
        }
        for slot in out.iter_mut() {
            *slot /= sum_dip;
        }
        Ok(())
    }

    /// Forward pass: fills `alpha` / `alpha_sum` at each segment's last site
    pub(crate) fn forward(&mut self) {
        let window = self.window;
        let n_cond = self.n_cond();
        let mut segment = window.segment_first;
        let mut segment_locus = 0;
        let mut ambiguous = window.ambiguous.start;

        for locus in window.locus_first..=window.locus_last {
            let rel = locus - window.locus_first;
            let length = self.genotype.segment_length(segment);
            let is_amb = self.genotype.is_ambiguous(locus);
            let last_in_segment = segment_locus == length - 1;

            let link = if rel == 0 {
                Link::Start
            } else if segment_locus == 0 {
                Link::Collapse
            } else {
                Link::Run
            };
            let active = self.update_site(SiteStep {
                locus,
                rel,
                ambiguous: is_amb.then_some(ambiguous),
                link,
                direction: Direction::Forward,
                segment_edge: last_in_segment,
            });

            if last_in_segment {
                let s = segment - window.segment_first;
                let strand = &self.strands[active];
                self.alpha[s * n_cond..(s + 1) * n_cond].copy_from_slice(&strand.prob);
                self.alpha_sum[s] = strand.sum_h;
            }

            if is_amb {
                ambiguous += 1;
            }
            segment_locus += 1;
            if segment_locus >= length {
                segment += 1;
                segment_locus = 0;
            }
        }
    }

    /// Backward pass: fills `beta` at each segment's first site (bar the
    /// window's first site) and `beta_sum` at the individual's first site
    pub(crate) fn backward(&mut self) {
        let window = self.window;
        let n_cond = self.n_cond();
        let mut segment = window.segment_last;
        let mut segment_locus = self.genotype.segment_length(segment) - 1;
        let mut ambiguous_end = window.ambiguous.end;

        for locus in (window.locus_first..=window.locus_last).rev() {
            let rel = locus - window.locus_first;
            let length = self.genotype.segment_length(segment);
            let ambiguous = if self.genotype.is_ambiguous(locus) {
                ambiguous_end -= 1;
                Some(ambiguous_end)
            } else {
                None
            };
            let first_in_segment = segment_locus == 0;

            let link = if locus == window.locus_last {
                Link::Start
            } else if segment_locus == length - 1 {
                Link::Collapse
            } else {
                Link::Run
            };
            let active = self.update_site(SiteStep {
                locus,
                rel,
                ambiguous,
                link,
                direction: Direction::Backward,
                segment_edge: first_in_segment,
            });

            if first_in_segment && locus != window.locus_first {
                let s = segment - window.segment_first;
                self.beta[s * n_cond..(s + 1) * n_cond].copy_from_slice(&self.strands[active].prob);
            }
            if locus == 0 {
                self.beta_sum = self.strands[active].sum_h;
            }

            if segment_locus > 0 {
                segment_locus -= 1;
            } else if segment > window.segment_first {
                segment -= 1;
                segment_locus = self.genotype.segment_length(segment) - 1;
            }
        }
    }

    /// Emission, transition, marginals and scaling for one site. Returns the
    /// index of the strand that was updated.
    #[inline]
    fn update_site(&mut self, step: SiteStep) -> usize {
        for (allele, &hap) in self.alleles.iter_mut().zip(self.conditioning) {
            *allele = self.panel.allele(hap, step.locus);
        }

        let active = if step.rel % 2 == 0 { 1 } else { 0 };
        let [strand0, strand1] = &mut self.strands;
        let (current, other) = if active == 1 {
            (strand1, &*strand0)
        } else {
            (strand0, &*strand1)
        };

        let ee = self.params.match_likelihood();
        let ed = self.params.mismatch_likelihood();
        match step.ambiguous {
            Some(idx) => {
                let code = self.genotype.ambiguity_code(idx);
                current.emit_ambiguous(&self.alleles, code, ee, ed);
            }
            None => {
                let observed = self.genotype.allele0(step.locus);
                current.emit_homozygous(&self.alleles, observed, ee, ed);
            }
        }

        if step.link != Link::Start {
            let site = step.direction.transition_site(step.locus);
            let nt = self.params.no_transition(site);
            let t = self.params.transition(site);
            match step.link {
                Link::Collapse => current.collapse(other, nt, t),
                _ => current.run(other, nt, t),
            }
        }

        current.sum_over_h();
        if step.segment_edge {
            current.sum_over_k();
        }
        if step.rel % SCALE_STRIDE == 0 {
            current.scale();
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Diplotype, Genotype, GenotypeBuilder, HaplotypeMatrix, Site};

    fn panel_and_genotype(n_sites: usize) -> (HaplotypeMatrix, Vec<HapIdx>, Genotype) {
        let panel = HaplotypeMatrix::from_fn(6, n_sites, |h, s| (h * 7 + s * 3) % 5 < 2);
        let cond: Vec<HapIdx> = (0..6).map(HapIdx::new).collect();
        let hap0: Vec<bool> = (0..n_sites).map(|s| s % 3 == 0).collect();
        let hap1: Vec<bool> = (0..n_sites).map(|s| s % 4 == 0).collect();
        let genotype = Genotype::from_haplotypes(&hap0, &hap1).unwrap();
        (panel, cond, genotype)
    }

    #[test]
    fn test_scaled_site_has_unit_total() {
        // last relative site is 100, a multiple of the stride
        let (panel, cond, genotype) = panel_and_genotype(101);
        let params = HmmParameters::uniform(101, 0.01, 1.0, 0.01).unwrap();
        let window = Coordinates::whole(&genotype).unwrap();

        let mut hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        hmm.forward();
        let active = &hmm.strands[1];
        assert_eq!(active.total, 1.0);
        let total: f64 = active.prob.iter().flat_map(|b| b.iter()).sum();
        assert!((total - 1.0).abs() < 1e-12);

        hmm.backward();
        let active = &hmm.strands[1];
        let total: f64 = active.prob.iter().flat_map(|b| b.iter()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_marginals_track_buffer() {
        let (panel, cond, genotype) = panel_and_genotype(37);
        let params = HmmParameters::uniform(37, 0.02, 1.0, 0.05).unwrap();
        let window = Coordinates::whole(&genotype).unwrap();

        let mut hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        hmm.forward();
        for strand in &hmm.strands {
            for h in 0..HAP_STATES {
                let direct: f64 = strand.prob.iter().map(|b| b[h]).sum();
                assert!((direct - strand.sum_h[h]).abs() <= 1e-12 * direct.max(1.0));
            }
        }
    }

    #[test]
    fn test_snapshots_cover_every_segment() {
        let (panel, cond, genotype) = panel_and_genotype(60);
        let params = HmmParameters::uniform(60, 0.01, 1.0, 0.01).unwrap();
        let window = Coordinates::whole(&genotype).unwrap();
        assert!(window.n_segments() > 2);

        let mut hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        hmm.forward();
        hmm.backward();
        let n_cond = cond.len();
        for s in 0..window.n_segments() {
            assert!(hmm.alpha_sum[s].iter().all(|&v| v > 0.0));
            assert!(hmm.alpha[s * n_cond..(s + 1) * n_cond]
                .iter()
                .all(|b| b.iter().all(|&v| v > 0.0)));
            if s > 0 {
                assert!(hmm.beta[s * n_cond..(s + 1) * n_cond]
                    .iter()
                    .all(|b| b.iter().all(|&v| v > 0.0)));
            }
        }
        assert!(hmm.beta_sum.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_beta_sum_only_at_individual_start() {
        let (panel, cond, genotype) = panel_and_genotype(60);
        let params = HmmParameters::uniform(60, 0.01, 1.0, 0.01).unwrap();
        let window = Coordinates::new(&genotype, 1, genotype.n_segments() - 1, 0).unwrap();

        let mut hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        hmm.backward();
        assert_eq!(hmm.beta_sum, [0.0; HAP_STATES]);
    }

    #[test]
    fn test_output_too_small_is_rejected() {
        let mut builder = GenotypeBuilder::new();
        builder
            .push_segment(&[Site::Hom(true), Site::Ambiguous(0x0f)], u64::MAX)
            .push_segment(&[Site::Hom(false)], 0b11);
        let genotype = builder.build().unwrap();
        let panel = HaplotypeMatrix::from_fn(2, 3, |h, s| h == s);
        let cond = vec![HapIdx::new(0), HapIdx::new(1)];
        let params = HmmParameters::uniform(3, 0.01, 1.0, 0.01).unwrap();
        let window = Coordinates::whole(&genotype).unwrap();

        let mut out = vec![0.0; 64];
        let hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        let err = hmm.expectation(&mut out).unwrap_err();
        assert!(!err.is_underflow());

        let mut out = vec![0.0; 64 + 128];
        let hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        assert_eq!(hmm.expectation(&mut out).unwrap(), 0);
    }

    /// One unscaled recursion step written out over `(k, h)`
    fn reference_step(
        prev: &[StateBlock],
        emission: &[StateBlock],
        nt: f64,
        t: f64,
        collapse: bool,
    ) -> Vec<StateBlock> {
        let n_cond = prev.len() as f64;
        let total: f64 = prev.iter().flatten().sum();
        let mut next = emission.to_vec();
        for (k, block) in next.iter_mut().enumerate() {
            for h in 0..HAP_STATES {
                let column: f64 = prev.iter().map(|b| b[h]).sum();
                let from = if collapse {
                    prev[k].iter().sum::<f64>() * nt + total * t / n_cond
                } else {
                    prev[k][h] * nt + column * t / n_cond
                };
                block[h] *= from;
            }
        }
        next
    }

    fn push_normalised(out: &mut Vec<f64>, block: Vec<f64>) {
        let total: f64 = block.iter().sum();
        out.extend(block.into_iter().map(|v| v / total));
    }

    /// Transition blocks of one window from a plain, unscaled forward-backward
    fn reference_transitions(
        panel: &HaplotypeMatrix,
        cond: &[HapIdx],
        genotype: &Genotype,
        params: &HmmParameters,
        window: &Coordinates,
    ) -> Vec<f64> {
        let first = window.locus_first;
        let n = window.n_sites();
        let n_cond = cond.len() as f64;
        let segments = window.segment_first..=window.segment_last;
        let starts: Vec<usize> = segments.clone().map(|s| genotype.segment_start(s)).collect();
        let lists: Vec<CompatibleDiplotypes> = segments
            .map(|s| CompatibleDiplotypes::from_mask(genotype.diplotype_mask(s)))
            .collect();

        let mut amb = window.ambiguous.start;
        let mut emission = Vec::with_capacity(n);
        for locus in first..=window.locus_last {
            let code = if genotype.is_ambiguous(locus) {
                amb += 1;
                Some(genotype.ambiguity_code(amb - 1))
            } else {
                None
            };
            let site: Vec<StateBlock> = cond
                .iter()
                .map(|&hap| {
                    let allele = panel.allele(hap, locus);
                    let mut block = [0.0; HAP_STATES];
                    for (h, v) in block.iter_mut().enumerate() {
                        let observed = match code {
                            Some(c) => (c >> h) & 1 == 1,
                            None => genotype.allele0(locus),
                        };
                        *v = if allele == observed {
                            params.match_likelihood()
                        } else {
                            params.mismatch_likelihood()
                        };
                    }
                    block
                })
                .collect();
            emission.push(site);
        }

        let mut alpha = vec![emission[0].clone()];
        for rel in 1..n {
            let site = first + rel - 1;
            let next = reference_step(
                &alpha[rel - 1],
                &emission[rel],
                params.no_transition(site),
                params.transition(site),
                starts.contains(&(site + 1)),
            );
            alpha.push(next);
        }

        let mut beta = vec![Vec::new(); n];
        beta[n - 1] = emission[n - 1].clone();
        for rel in (0..n - 1).rev() {
            let site = first + rel;
            let next = reference_step(
                &beta[rel + 1],
                &emission[rel],
                params.no_transition(site),
                params.transition(site),
                starts.contains(&(site + 1)),
            );
            beta[rel] = next;
        }

        let mut out = Vec::new();
        if window.starts_individual() {
            let sums: Vec<f64> = (0..HAP_STATES).map(|h| beta[0].iter().map(|b| b[h]).sum()).collect();
            let block = lists[0].iter().map(|d| sums[d.hap0()] * sums[d.hap1()]).collect();
            push_normalised(&mut out, block);
        }
        for rel in 1..lists.len() {
            let end = starts[rel] - 1;
            let (a, b) = (&alpha[end - first], &beta[end + 1 - first]);
            let (nt, t) = (params.no_transition(end), params.transition(end));
            let mut hprobs = [[0.0; HAP_STATES]; HAP_STATES];
            for (h1, row) in hprobs.iter_mut().enumerate() {
                let column: f64 = a.iter().map(|x| x[h1]).sum();
                for (h2, v) in row.iter_mut().enumerate() {
                    for k in 0..a.len() {
                        *v += (a[k][h1] * nt + column * t / n_cond) * b[k][h2];
                    }
                }
            }
            let mut block = Vec::new();
            for p in lists[rel - 1].iter() {
                for q in lists[rel].iter() {
                    block.push(hprobs[p.hap0()][q.hap0()] * hprobs[p.hap1()][q.hap1()]);
                }
            }
            push_normalised(&mut out, block);
        }
        out
    }

    fn pairs(list: &[(usize, usize)]) -> u64 {
        list.iter()
            .fold(0u64, |mask, &(h0, h1)| mask | 1 << Diplotype::new(h0, h1).index())
    }

    /// Three segments, two conditioning haplotypes and a different
    /// transition mass at every site
    fn varied_fixture() -> (HaplotypeMatrix, Vec<HapIdx>, Genotype, HmmParameters) {
        let mut builder = GenotypeBuilder::new();
        builder
            .push_segment(
                &[Site::Hom(true), Site::Ambiguous(0b1100_1010), Site::Hom(false)],
                pairs(&[(0, 7), (1, 6), (3, 4), (6, 1)]),
            )
            .push_segment(
                &[
                    Site::Ambiguous(0b0101_0011),
                    Site::Hom(true),
                    Site::Ambiguous(0b1111_0000),
                    Site::Hom(true),
                ],
                pairs(&[(0, 5), (2, 2), (7, 0)]),
            )
            .push_segment(
                &[Site::Hom(false), Site::Ambiguous(0b0011_1100)],
                pairs(&[(1, 1), (4, 6)]),
            );
        let genotype = builder.build().unwrap();
        let panel = HaplotypeMatrix::from_fn(3, 9, |h, s| (h + 2 * s) % 3 == 0);
        let cond = vec![HapIdx::new(2), HapIdx::new(0)];
        let t = vec![0.3, 0.05, 0.2, 0.01, 0.4, 0.15, 0.25, 0.08, 0.12];
        let params = HmmParameters::new(t, 1.0, 0.1).unwrap();
        (panel, cond, genotype, params)
    }

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            assert!((g - w).abs() <= 1e-10 * w.abs(), "slot {}: {} vs {}", i, g, w);
        }
    }

    #[test]
    fn test_whole_window_matches_plain_recursion() {
        let (panel, cond, genotype, params) = varied_fixture();
        let window = Coordinates::whole(&genotype).unwrap();
        // prior 4, then 4 * 3 and 3 * 2
        assert_eq!(window.n_transitions(&genotype), 4 + 12 + 6);

        let mut out = vec![f64::NAN; window.n_transitions(&genotype)];
        let hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        assert_eq!(hmm.expectation(&mut out).unwrap(), 0);
        let want = reference_transitions(&panel, &cond, &genotype, &params, &window);
        assert_close(&out, &want);
    }

    #[test]
    fn test_interior_window_matches_plain_recursion() {
        let (panel, cond, genotype, params) = varied_fixture();
        let window = Coordinates::new(&genotype, 1, 2, 0).unwrap();

        let mut out = vec![f64::NAN; window.n_transitions(&genotype)];
        let hmm = SegmentHmm::new(&panel, &cond, &genotype, &params, &window);
        assert_eq!(hmm.expectation(&mut out).unwrap(), 0);
        let want = reference_transitions(&panel, &cond, &genotype, &params, &window);
        assert_eq!(want.len(), 6);
        assert_close(&out, &want);
    }

    #[test]
    fn test_transition_masses_change_the_result() {
        let (panel, cond, genotype, params) = varied_fixture();
        let window = Coordinates::whole(&genotype).unwrap();
        let mut shifted_t: Vec<f64> = (0..9).map(|l| params.transition(l)).collect();
        shifted_t.rotate_left(1);
        let shifted = HmmParameters::new(shifted_t, 1.0, 0.1).unwrap();

        let mut a = vec![0.0; window.n_transitions(&genotype)];
        let mut b = a.clone();
        SegmentHmm::new(&panel, &cond, &genotype, &params, &window)
            .expectation(&mut a)
            .unwrap();
        SegmentHmm::new(&panel, &cond, &genotype, &shifted, &window)
            .expectation(&mut b)
            .unwrap();
        assert!(a.iter().zip(&b).any(|(x, y)| (x - y).abs() > 1e-6));
    }
}
