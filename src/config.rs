//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation for the synthetic-cohort driver.
//!
//! The engine itself takes no configuration; everything here shapes the
//! generated cohort and the batch run.
//!
//! ## Example CLI
//! ```bash
//! segphase --individuals 200 --panel-haps 2000 --conditioning 64 --sites 20000 --nthreads 8
//! ```

use clap::Parser;

use crate::error::{Result, SegphaseError};
use crate::model::parameters::DEFAULT_MISMATCH;

/// Driver configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "segphase", version, about = "Segment-based diploid HMM phasing on a synthetic cohort")]
pub struct Config {
    /// Number of individuals to phase
    #[arg(long, default_value_t = 100)]
    pub individuals: usize,

    /// Haplotypes in the conditioning panel (individuals' own included)
    #[arg(long, default_value_t = 1_000)]
    pub panel_haps: usize,

    /// Conditioning haplotypes per individual (K)
    #[arg(long, default_value_t = 64)]
    pub conditioning: usize,

    /// Number of sites
    #[arg(long, default_value_t = 5_000)]
    pub sites: usize,

    /// Expected heterozygous fraction between two founder haplotypes
    #[arg(long, default_value_t = 0.1)]
    pub heterozygosity: f64,

    /// Effective population size
    #[arg(long, default_value_t = 15_000.0)]
    pub ne: f64,

    /// Allelic mismatch rate
    #[arg(long, default_value_t = DEFAULT_MISMATCH)]
    pub err: f64,

    /// Mean genetic distance between adjacent sites (cM)
    #[arg(long, default_value_t = 0.002)]
    pub cm_per_site: f64,

    /// Maximum segments per window, shared boundary segment included
    #[arg(long, default_value_t = 256)]
    pub window_segments: usize,

    /// Number of threads (default: all cores)
    #[arg(long)]
    pub nthreads: Option<usize>,

    /// Random seed for the synthetic cohort
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print span timings
    #[arg(long)]
    pub profile: bool,
}

impl Config {
    /// Parse from the process arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.individuals == 0 || self.sites == 0 {
            return Err(SegphaseError::config("need at least one individual and one site"));
        }
        if self.conditioning == 0 {
            return Err(SegphaseError::config("conditioning set size must be positive"));
        }
        if self.panel_haps <= 2 * self.individuals {
            return Err(SegphaseError::config(format!(
                "panel of {} haplotypes is too small for {} individuals",
                self.panel_haps, self.individuals
            )));
        }
        if self.conditioning + 2 > self.panel_haps {
            return Err(SegphaseError::config(format!(
                "conditioning size {} exceeds the {} haplotypes available",
                self.conditioning,
                self.panel_haps - 2
            )));
        }
        if !(self.heterozygosity > 0.0 && self.heterozygosity <= 0.5) {
            return Err(SegphaseError::config(format!(
                "heterozygosity must be in (0, 0.5], got {}",
                self.heterozygosity
            )));
        }
        if self.ne <= 0.0 {
            return Err(SegphaseError::config(format!("ne must be positive, got {}", self.ne)));
        }
        if !(0.0..1.0).contains(&self.err) {
            return Err(SegphaseError::config(format!("err must be in [0, 1), got {}", self.err)));
        }
        if !(self.cm_per_site >= 0.0 && self.cm_per_site.is_finite()) {
            return Err(SegphaseError::config(format!(
                "cm-per-site must be finite and non-negative, got {}",
                self.cm_per_site
            )));
        }
        if self.window_segments < 2 {
            return Err(SegphaseError::config(format!(
                "window-segments must be at least 2, got {}",
                self.window_segments
            )));
        }
        if self.nthreads == Some(0) {
            return Err(SegphaseError::config("nthreads must be positive"));
        }
        Ok(())
    }

    /// Thread count, defaulting to the available parallelism
    pub fn nthreads(&self) -> usize {
        self.nthreads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
