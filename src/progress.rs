//! Progress tracking for cohort featurization.
//!
//! Samples are featurized in parallel, so the counters are atomics and the
//! callback may be invoked from any worker thread.
//!
//! # Example
//!
//! ```rust,no_run
//! use kmerfeat::builder::FeatureTableBuilder;
//!
//! let report = FeatureTableBuilder::new()
//!     .k(3)?
//!     .build_with_progress("fasta/", "meta.csv", |progress| {
//!         eprintln!(
//!             "{}/{} samples ({} bases)",
//!             progress.samples_processed, progress.samples_total, progress.bases_processed
//!         );
//!     })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Progress snapshot during cohort featurization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Number of samples attempted so far, degraded ones included.
    pub samples_processed: u64,
    /// Number of distinct samples in the cohort.
    pub samples_total: u64,
    /// Total residues read so far.
    pub bases_processed: u64,
}

/// Thread-safe progress tracker using atomic counters.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    samples: AtomicU64,
    total: AtomicU64,
    bases: AtomicU64,
}

impl ProgressTracker {
    /// Create a new progress tracker expecting `total` samples.
    #[must_use]
    pub const fn new(total: u64) -> Self {
        Self {
            samples: AtomicU64::new(0),
            total: AtomicU64::new(total),
            bases: AtomicU64::new(0),
        }
    }

    /// Record that a sample has been processed.
    ///
    /// # Arguments
    ///
    /// * `bases` - The number of residues read for the sample (0 if it was degraded).
    pub fn record_sample(&self, bases: u64) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.bases.fetch_add(bases, Ordering::Relaxed);
    }

    /// Get a snapshot of the current progress.
    pub fn snapshot(&self) -> Progress {
        Progress {
            samples_processed: self.samples.load(Ordering::Relaxed),
            samples_total: self.total.load(Ordering::Relaxed),
            bases_processed: self.bases.load(Ordering::Relaxed),
        }
    }
}
