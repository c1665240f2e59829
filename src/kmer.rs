//! K-mer length validation and windowed k-mer counting.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// The placeholder residue for an unknown base.
///
/// Any residue outside `A`, `C`, `G`, `T` is handled the same way.
pub const AMBIGUITY_SYMBOL: u8 = b'N';

/// A validated k-mer length (`k >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct KmerLength(usize);

impl KmerLength {
    /// Smallest accepted k-mer length.
    pub const MIN: usize = 1;

    /// Creates a new `KmerLength`, rejecting zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kmerfeat::kmer::KmerLength;
    ///
    /// assert_eq!(KmerLength::new(3)?.get(), 3);
    /// assert!(KmerLength::new(0).is_err());
    /// # Ok::<(), kmerfeat::error::ParameterError>(())
    /// ```
    pub const fn new(k: usize) -> Result<Self, ParameterError> {
        if k < Self::MIN {
            return Err(ParameterError::KmerLength { k, min: Self::MIN });
        }
        Ok(Self(k))
    }

    /// Returns the raw length.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Number of length-`k` windows in a sequence of `len` residues,
    /// whether or not they contain an ambiguous residue.
    #[must_use]
    pub const fn windows(self, len: usize) -> usize {
        (len + 1).saturating_sub(self.0)
    }
}

impl TryFrom<usize> for KmerLength {
    type Error = ParameterError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}

impl From<KmerLength> for usize {
    fn from(k: KmerLength) -> Self {
        k.0
    }
}

impl fmt::Display for KmerLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns `true` for `A`, `C`, `G` and `T`.
#[must_use]
pub const fn is_unambiguous(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Raw k-mer counts for one sequence, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmerCounts {
    entries: Vec<(String, u32)>,
    windows: usize,
}

impl KmerCounts {
    /// Count of `kmer`, if it occurred.
    #[must_use]
    pub fn get(&self, kmer: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(key, _)| key == kmer)
            .map(|(_, count)| *count)
    }

    /// Iterates over `(kmer, count)` in the order each k-mer first occurred.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(kmer, count)| (kmer.as_str(), *count))
    }

    /// Number of distinct k-mers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the number of windows that were counted.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    /// All windows of the sequence, including the skipped ones.
    #[must_use]
    pub const fn windows(&self) -> usize {
        self.windows
    }

    pub(crate) fn into_entries(self) -> Vec<(String, u32)> {
        self.entries
    }
}

/// Counts every length-`k` window of `seq` that contains only `A`, `C`, `G`, `T`.
///
/// A window holding an ambiguous residue is skipped, and the scan jumps past
/// that residue since every window overlapping it would be skipped as well.
/// `seq` is expected to be uppercase already.
///
/// # Example
///
/// ```rust
/// use kmerfeat::kmer::{count_kmers, KmerLength};
///
/// let counts = count_kmers(b"ACGNACG", KmerLength::new(3)?);
/// assert_eq!(counts.get("ACG"), Some(2));
/// assert_eq!(counts.windows(), 5);
/// # Ok::<(), kmerfeat::error::ParameterError>(())
/// ```
#[must_use]
pub fn count_kmers(seq: &[u8], k: KmerLength) -> KmerCounts {
    let k_val = k.get();
    let windows = k.windows(seq.len());
    let mut entries: Vec<(String, u32)> = Vec::new();

    if seq.len() < k_val {
        return KmerCounts { entries, windows };
    }

    let mut slots: FxHashMap<&[u8], usize> = FxHashMap::default();
    let mut i = 0;

    while i <= seq.len() - k_val {
        let sub = &seq[i..i + k_val];

        match sub.iter().rposition(|b| !is_unambiguous(*b)) {
            None => {
                if let Some(&slot) = slots.get(sub) {
                    entries[slot].1 += 1;
                } else {
                    slots.insert(sub, entries.len());
                    entries.push((sub.iter().copied().map(char::from).collect(), 1));
                }
                i += 1;
            }
            // Skip past the invalid base
            Some(position) => i += position + 1,
        }
    }

    KmerCounts { entries, windows }
}
