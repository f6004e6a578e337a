//! # Pipeline Module
//!
//! High-level orchestration of the phasing engine over many individuals.
//! Coordinates windowing, parallel execution and failure bookkeeping.

pub mod phasing;

pub use phasing::{IndividualOutcome, PhasingBatch, PhasingTarget};
