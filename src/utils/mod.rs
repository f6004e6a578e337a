//! # Utilities Module
//!
//! ## Role
//! Cross-cutting helpers that don't belong in domain-specific modules.
//!
//! ## Sub-modules
//! - `telemetry`: atomic outcome counters updated from rayon workers
//! - `synthetic`: seeded panels and individuals for the driver, benches and tests

pub mod synthetic;
pub mod telemetry;
