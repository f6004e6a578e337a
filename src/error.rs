//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use std::fmt;

use thiserror::Error;

/// Which aggregate collapsed when a segment boundary could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnderflowStage {
    /// Total mass of the segment-0 diplotype prior
    Prior,
    /// Total mass of the `H x H` copying-state transition matrix
    Haplotype,
    /// Total mass of the diplotype-pair block, after the additive fallback
    Diplotype,
}

impl fmt::Display for UnderflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnderflowStage::Prior => f.write_str("diplotype prior mass"),
            UnderflowStage::Haplotype => f.write_str("haplotype transition mass"),
            UnderflowStage::Diplotype => f.write_str("diplotype transition mass"),
        }
    }
}

/// Main error type for segphase operations
#[derive(Error, Debug)]
pub enum SegphaseError {
    /// Unrecoverable underflow (or NaN) at the boundary entering `segment`.
    /// The caller must discard the update for this individual and window.
    #[error("Numerical underflow entering segment {segment}: {stage} is zero or NaN")]
    Underflow {
        segment: usize,
        stage: UnderflowStage,
    },

    /// Invalid data errors (length mismatches, empty masks, bad windows)
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Configuration errors (invalid CLI arguments)
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Type alias for Results using SegphaseError
pub type Result<T> = std::result::Result<T, SegphaseError>;

impl SegphaseError {
    /// Create an underflow error
    pub fn underflow(segment: usize, stage: UnderflowStage) -> Self {
        Self::Underflow { segment, stage }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is the numerical failure signal of the engine
    pub fn is_underflow(&self) -> bool {
        matches!(self, Self::Underflow { .. })
    }
}
