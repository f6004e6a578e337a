//! # Boundary Transitions
//!
//! Derivation of transition probabilities across one segment boundary from
//! the forward snapshot at the end of the previous segment and the backward
//! snapshot at the start of the next one.
//!
//! The copying-state matrix `HProbs[h1][h2]` is expanded into diplotype
//! pairs in product form `HProbs[p.h0][n.h0] * HProbs[p.h1][n.h1]`. When the
//! product form underflows the block is rebuilt in additive form, which keeps
//! the relative ordering of pairs while staying representable.

use crate::data::{CompatibleDiplotypes, HAP_STATES};
use crate::model::kernels::StateBlock;

/// How a diplotype block was resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiplotypeForm {
    /// Product of the two strands' copying-state transitions
    Product,
    /// Additive fallback after the product form underflowed
    Sum,
}

/// Whether a probability mass is unusable as a normaliser
#[inline]
pub fn is_degenerate(mass: f64) -> bool {
    mass.is_nan() || mass < f64::MIN_POSITIVE
}

/// `H x H` copying-state transition matrix across one boundary.
#[derive(Clone, Debug)]
pub struct HapTransitions {
    probs: [StateBlock; HAP_STATES],
    sum: f64,
}

impl HapTransitions {
    /// Combine the previous segment's forward snapshot with the next
    /// segment's backward snapshot.
    ///
    /// `nt` and `t` are the (no-)transition masses between the previous
    /// segment's last site and the next segment's first site.
    pub fn compute(
        alpha: &[StateBlock],
        alpha_sum: &StateBlock,
        beta: &[StateBlock],
        nt: f64,
        t: f64,
    ) -> Self {
        let n_cond = alpha.len() as f64;
        let mut probs = [[0.0; HAP_STATES]; HAP_STATES];
        let mut sum = 0.0;
        for (h1, row) in probs.iter_mut().enumerate() {
            let jump = alpha_sum[h1] * t / n_cond;
            let mut acc = [0.0; HAP_STATES];
            for (a, b) in alpha.iter().zip(beta) {
                let stay = a[h1] * nt + jump;
                for h2 in 0..HAP_STATES {
                    acc[h2] += stay * b[h2];
                }
            }
            *row = acc;
            sum += acc.iter().sum::<f64>();
        }
        Self { probs, sum }
    }

    /// Whether the matrix cannot be normalised
    pub fn is_degenerate(&self) -> bool {
        is_degenerate(self.sum)
    }

    /// Write the normalised diplotype-pair block for `prev -> next` into
    /// `out` (length `prev.len() * next.len()`, previous-major order).
    ///
    /// Returns `None` when both the product and the additive form underflow.
    ///
    /// # Panics
    /// If `out` does not hold exactly one slot per pair.
    pub fn fill_diplotypes(
        &self,
        prev: &CompatibleDiplotypes,
        next: &CompatibleDiplotypes,
        out: &mut [f64],
    ) -> Option<DiplotypeForm> {
        assert_eq!(out.len(), prev.len() * next.len(), "diplotype block size");
        let scaling = 1.0 / self.sum;

        let mut form = DiplotypeForm::Product;
        let mut total = self.expand(prev, next, out, |a, b| (a * scaling) * (b * scaling));
        if is_degenerate(total) {
            form = DiplotypeForm::Sum;
            total = self.expand(prev, next, out, |a, b| (a * scaling) + (b * scaling));
            if is_degenerate(total) {
                return None;
            }
        }

        for slot in out.iter_mut() {
            *slot /= total;
        }
        Some(form)
    }

    #[inline]
    fn expand<F>(
        &self,
        prev: &CompatibleDiplotypes,
        next: &CompatibleDiplotypes,
        out: &mut [f64],
        combine: F,
    ) -> f64
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut total = 0.0;
        let mut slot = 0;
        for p in prev.iter() {
            let row0 = &self.probs[p.hap0()];
            let row1 = &self.probs[p.hap1()];
            for n in next.iter() {
                let value = combine(row0[n.hap0()], row1[n.hap1()]);
                out[slot] = value;
                total += value;
                slot += 1;
            }
        }
        total
    }
}
