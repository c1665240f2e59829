//! Per-sample feature extraction.
//!
//! [`featurize`] is the only place features are computed. The cohort build
//! and inference-time alignment both call it, so a sample always produces the
//! same values on either side.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::{
    error::FeatureError,
    kmer::{count_kmers, KmerCounts, KmerLength},
    reader::read_sequence,
};

/// Normalized k-mer frequencies for one sample, in first-occurrence order.
///
/// Each count is divided by the number of windows in the sequence, skipped
/// ambiguous windows included, so frequencies of a sequence holding ambiguous
/// residues sum to less than one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmerFrequencies {
    entries: Vec<(String, f64)>,
    slots: FxHashMap<String, usize>,
}

impl KmerFrequencies {
    fn normalize(counts: KmerCounts) -> Self {
        let windows = counts.windows() as f64;
        let entries: Vec<(String, f64)> = counts
            .into_entries()
            .into_iter()
            .map(|(kmer, count)| (kmer, f64::from(count) / windows))
            .collect();
        let slots = entries
            .iter()
            .enumerate()
            .map(|(slot, (kmer, _))| (kmer.clone(), slot))
            .collect();
        Self { entries, slots }
    }

    /// Frequency of `kmer`, if it occurred.
    #[must_use]
    pub fn get(&self, kmer: &str) -> Option<f64> {
        self.slots.get(kmer).map(|&slot| self.entries[slot].1)
    }

    /// Iterates over `(kmer, frequency)` in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(kmer, freq)| (kmer.as_str(), *freq))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The features of one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleFeatures {
    /// Total residue count, ambiguous residues included.
    pub seq_len: u64,
    /// Fraction of `G` and `C` residues; `0.0` for an empty sample.
    pub gc: f64,
    pub kmer_freqs: KmerFrequencies,
}

impl SampleFeatures {
    /// Features of a sample with no residues: zero length, zero GC, no k-mers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.seq_len == 0
    }
}

/// Computes the features of an uppercase residue string.
///
/// # Example
///
/// ```rust
/// use kmerfeat::features::featurize;
/// use kmerfeat::kmer::KmerLength;
///
/// let features = featurize(b"AAAGGG", KmerLength::new(3)?);
/// assert_eq!(features.seq_len, 6);
/// assert_eq!(features.gc, 0.5);
/// assert_eq!(features.kmer_freqs.get("AAG"), Some(0.25));
/// # Ok::<(), kmerfeat::error::ParameterError>(())
/// ```
#[must_use]
pub fn featurize(seq: &[u8], k: KmerLength) -> SampleFeatures {
    if seq.is_empty() {
        return SampleFeatures::empty();
    }

    let total = seq.len();
    let gc_count = seq.iter().filter(|b| matches!(b, b'G' | b'C')).count();

    // Shorter than k means no k-mers, so the zero divisor is never used.
    let kmer_freqs = KmerFrequencies::normalize(count_kmers(seq, k));

    SampleFeatures {
        seq_len: total as u64,
        gc: gc_count as f64 / total as f64,
        kmer_freqs,
    }
}

/// Reads a sequence file and computes its features.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed. An empty file is
/// not an error; it yields [`SampleFeatures::empty`].
pub fn featurize_file<P: AsRef<Path>>(path: P, k: KmerLength) -> Result<SampleFeatures, FeatureError> {
    let seq = read_sequence(path)?;
    Ok(featurize(&seq, k))
}
