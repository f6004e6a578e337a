//! # Model Module
//!
//! The diploid Li-Stephens copying model evaluated per individual and window.
//!
//! ## Core Algorithms
//! - `kernels`: per-site emission / transition / scaling updates on one strand
//! - `segment_hmm`: forward-backward over a coordinate window
//! - `transitions`: boundary haplotype matrix and diplotype-pair expansion
//! - `parameters`: per-site transition masses and emission likelihoods

pub mod kernels;
pub mod parameters;
pub mod segment_hmm;
pub mod transitions;

pub use kernels::{StateBlock, StrandState};
pub use parameters::HmmParameters;
pub use segment_hmm::{SegmentHmm, SCALE_STRIDE};
pub use transitions::{DiplotypeForm, HapTransitions};
