//! # Segphase Library
//!
//! Per-individual diploid HMM engine for segment-based haplotype phasing.
//! For one individual and one window of genotype segments it runs a scaled
//! forward-backward pass over eight copying states per conditioning
//! haplotype and derives normalised transition probabilities between the
//! compatible diplotypes of consecutive segments.
//!
//! ## Modules
//! - `config`: CLI argument parsing and validation
//! - `data`: Panel, genotype, diplotype and window collaborators
//! - `error`: Error types and result aliases
//! - `model`: Kernels, parameter table and the segment HMM engine
//! - `pipelines`: Parallel per-individual driver
//! - `utils`: Outcome counters and synthetic cohorts

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipelines;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use data::{
    CompatibleDiplotypes, ConditioningPanel, Coordinates, Diplotype, Genotype, GenotypeBuilder,
    GenotypeRecord, HapIdx, HaplotypeMatrix, SampleIdx, Site, WindowBuilder,
};
pub use error::{Result, SegphaseError, UnderflowStage};
pub use model::{HmmParameters, SegmentHmm};
pub use pipelines::{IndividualOutcome, PhasingBatch, PhasingTarget};
