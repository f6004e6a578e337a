//! # Phasing Counters
//!
//! Thread-safe tallies of engine outcomes. Uses atomic counters that can be
//! cheaply updated from rayon parallel iterators.
//!
//! All fields use relaxed ordering since readers only need the totals once
//! the parallel section has joined.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals over every (individual, window) invocation of a batch.
#[derive(Debug, Default)]
pub struct PhasingCounters {
    windows_run: AtomicU64,
    windows_failed: AtomicU64,
    boundaries_recovered: AtomicU64,
    sites_processed: AtomicU64,
    individuals_done: AtomicU64,
}

impl PhasingCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_window(&self, n_recovered: usize, n_sites: usize) {
        self.windows_run.fetch_add(1, Ordering::Relaxed);
        self.sites_processed.fetch_add(n_sites as u64, Ordering::Relaxed);
        self.boundaries_recovered
            .fetch_add(n_recovered as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self, n_sites: usize) {
        self.windows_run.fetch_add(1, Ordering::Relaxed);
        self.sites_processed.fetch_add(n_sites as u64, Ordering::Relaxed);
        self.windows_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_individual(&self) {
        self.individuals_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            windows_run: self.windows_run.load(Ordering::Relaxed),
            windows_failed: self.windows_failed.load(Ordering::Relaxed),
            boundaries_recovered: self.boundaries_recovered.load(Ordering::Relaxed),
            sites_processed: self.sites_processed.load(Ordering::Relaxed),
            individuals_done: self.individuals_done.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`PhasingCounters`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub windows_run: u64,
    pub windows_failed: u64,
    pub boundaries_recovered: u64,
    pub sites_processed: u64,
    pub individuals_done: u64,
}
