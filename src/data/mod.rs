//! # Data Module
//!
//! Read-only collaborators of the HMM engine. This is the core "Model input"
//! layer: everything here is built once per outer iteration and shared,
//! immutably, by every engine invocation.
//!
//! ## Contents
//! - `haplotype`: `HapIdx` / `SampleIdx` newtypes
//! - `panel`: bit-packed conditioning haplotype matrix
//! - `genotype`: per-individual genotype record (ambiguity codes, segments)
//! - `diplotype`: copying-state pair arithmetic and compatibility lists
//! - `window`: coordinate windows over an individual's segments

pub mod diplotype;
pub mod genotype;
pub mod haplotype;
pub mod panel;
pub mod window;

// Re-export commonly used types
pub use diplotype::{CompatibleDiplotypes, Diplotype, HAP_STATES, N_DIPLOTYPES};
pub use genotype::{Genotype, GenotypeBuilder, GenotypeRecord, Site};
pub use haplotype::{HapIdx, SampleIdx};
pub use panel::{ConditioningPanel, HaplotypeMatrix};
pub use window::{Coordinates, WindowBuilder};
