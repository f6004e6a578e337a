//! # Per-Site Kernels
//!
//! Emission, transition, summation and scaling updates over one strand's
//! probability buffer. A buffer holds one [`StateBlock`] per conditioning
//! haplotype; lane `h` of block `k` is the joint likelihood of copying
//! conditioning haplotype `k` while in copying state `h`.
//!
//! Elementwise updates run on two `f64x4` lanes per block. Reductions are
//! written as plain per-lane loops so the summation order is fixed: per-state
//! sums accumulate over `k` in order, totals add the eight lane sums in order.

use wide::f64x4;

use crate::data::HAP_STATES;

/// One conditioning haplotype's likelihoods across the copying states
pub type StateBlock = [f64; HAP_STATES];

#[inline(always)]
fn split(block: &StateBlock) -> (f64x4, f64x4) {
    (
        f64x4::from([block[0], block[1], block[2], block[3]]),
        f64x4::from([block[4], block[5], block[6], block[7]]),
    )
}

#[inline(always)]
fn join(block: &mut StateBlock, lo: f64x4, hi: f64x4) {
    let lo: [f64; 4] = lo.into();
    let hi: [f64; 4] = hi.into();
    block[..4].copy_from_slice(&lo);
    block[4..].copy_from_slice(&hi);
}

/// Probability buffer of one strand plus its marginals.
#[derive(Clone, Debug)]
pub struct StrandState {
    /// `K` blocks of per-state likelihoods
    pub prob: Vec<StateBlock>,
    /// Sum over conditioning haplotypes, per copying state
    pub sum_h: StateBlock,
    /// Sum over copying states, per conditioning haplotype
    pub sum_k: Vec<f64>,
    /// Grand total
    pub total: f64,
}

impl StrandState {
    /// Fresh buffer with every likelihood and marginal at 1.0
    pub fn new(n_cond: usize) -> Self {
        Self {
            prob: vec![[1.0; HAP_STATES]; n_cond],
            sum_h: [1.0; HAP_STATES],
            sum_k: vec![1.0; n_cond],
            total: 1.0,
        }
    }

    /// Number of conditioning haplotypes
    #[inline]
    pub fn n_cond(&self) -> usize {
        self.prob.len()
    }

    /// Emission at a homozygous site: every state of haplotype `k` sees the
    /// same match / mismatch likelihood.
    #[inline]
    pub fn emit_homozygous(&mut self, cond_alleles: &[bool], observed: bool, ee: f64, ed: f64) {
        for (block, &allele) in self.prob.iter_mut().zip(cond_alleles) {
            block.fill(if allele != observed { ed } else { ee });
        }
    }

    /// Emission at an ambiguous site. Bit `h` of `code` is the allele carried
    /// by copying state `h`; one template is built per conditioning allele.
    #[inline]
    pub fn emit_ambiguous(&mut self, cond_alleles: &[bool], code: u8, ee: f64, ed: f64) {
        let mut ref_template = [0.0; HAP_STATES];
        let mut alt_template = [0.0; HAP_STATES];
        for h in 0..HAP_STATES {
            let carries_alt = (code >> h) & 1 == 1;
            ref_template[h] = if carries_alt { ed } else { ee };
            alt_template[h] = if carries_alt { ee } else { ed };
        }
        for (block, &allele) in self.prob.iter_mut().zip(cond_alleles) {
            *block = if allele { alt_template } else { ref_template };
        }
    }

    /// Transition across a segment boundary. Each haplotype block is scaled
    /// by the other strand's per-haplotype marginal times `nt`, plus the other
    /// strand's total times `t` spread uniformly over the K haplotypes.
    #[inline]
    pub fn collapse(&mut self, other: &StrandState, nt: f64, t: f64) {
        let jump = other.total * t / self.n_cond() as f64;
        for (block, &other_k) in self.prob.iter_mut().zip(&other.sum_k) {
            let factor = f64x4::splat(other_k * nt + jump);
            let (lo, hi) = split(block);
            join(block, lo * factor, hi * factor);
        }
    }

    /// Transition between consecutive sites of one segment:
    /// `p[k][h] *= other[k][h] * nt + other_sum_h[h] * t / K`.
    #[inline]
    pub fn run(&mut self, other: &StrandState, nt: f64, t: f64) {
        let tfreq = t / self.n_cond() as f64;
        let mut jump = [0.0; HAP_STATES];
        for h in 0..HAP_STATES {
            jump[h] = other.sum_h[h] * tfreq;
        }
        let (jump_lo, jump_hi) = split(&jump);
        let nt = f64x4::splat(nt);
        for (block, other_block) in self.prob.iter_mut().zip(&other.prob) {
            let (lo, hi) = split(block);
            let (other_lo, other_hi) = split(other_block);
            join(
                block,
                lo * (other_lo * nt + jump_lo),
                hi * (other_hi * nt + jump_hi),
            );
        }
    }

    /// Recompute `sum_h` and `total`
    #[inline]
    pub fn sum_over_h(&mut self) {
        let mut sums = [0.0; HAP_STATES];
        for block in &self.prob {
            for h in 0..HAP_STATES {
                sums[h] += block[h];
            }
        }
        self.sum_h = sums;
        self.total = sums.iter().sum();
    }

    /// Recompute `sum_k`
    #[inline]
    pub fn sum_over_k(&mut self) {
        for (sum, block) in self.sum_k.iter_mut().zip(&self.prob) {
            *sum = block.iter().sum();
        }
    }

    /// Divide the buffer and its marginals by the grand total
    #[inline]
    pub fn scale(&mut self) {
        let scaling = 1.0 / self.total;
        let factor = f64x4::splat(scaling);
        for (block, sum) in self.prob.iter_mut().zip(self.sum_k.iter_mut()) {
            let (lo, hi) = split(block);
            join(block, lo * factor, hi * factor);
            *sum *= scaling;
        }
        for s in self.sum_h.iter_mut() {
            *s *= scaling;
        }
        self.total = 1.0;
    }
}
