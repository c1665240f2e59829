//! Cohort-wide vocabulary selection.
//!
//! The vocabulary is the ordered list of k-mers that become feature-table
//! columns. K-mers are ranked by the sum of their normalized frequencies over
//! the cohort; equal sums keep the order in which the k-mers were first seen
//! while folding over the cohort, so the same cohort in the same order always
//! yields the same vocabulary.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::ParameterError,
    features::{KmerFrequencies, SampleFeatures},
};

#[cfg(feature = "tracing")]
use tracing::debug;

/// A validated vocabulary size (`n >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct VocabSize(usize);

impl VocabSize {
    /// Smallest accepted vocabulary size.
    pub const MIN: usize = 1;

    /// Creates a new `VocabSize`, rejecting zero.
    pub const fn new(size: usize) -> Result<Self, ParameterError> {
        if size < Self::MIN {
            return Err(ParameterError::VocabSize {
                size,
                min: Self::MIN,
            });
        }
        Ok(Self(size))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for VocabSize {
    type Error = ParameterError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<VocabSize> for usize {
    fn from(size: VocabSize) -> Self {
        size.0
    }
}

impl fmt::Display for VocabSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered k-mers selected as feature columns. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    kmers: Vec<String>,
}

impl Vocabulary {
    #[must_use]
    pub fn kmers(&self) -> &[String] {
        &self.kmers
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.kmers.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Values of `freqs` in vocabulary order, `0.0` for absent k-mers.
    #[must_use]
    pub fn project(&self, freqs: &KmerFrequencies) -> Vec<f64> {
        self.iter()
            .map(|kmer| freqs.get(kmer).unwrap_or(0.0))
            .collect()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(kmers: Vec<String>) -> Self {
        Self { kmers }
    }
}

/// Accumulates normalized frequencies across a cohort.
///
/// Feed samples with [`add`](Self::add) in cohort order, then call
/// [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct VocabularyBuilder {
    totals: Vec<(String, f64)>,
    slots: FxHashMap<String, usize>,
}

impl VocabularyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample's frequencies to the running totals.
    pub fn add(&mut self, freqs: &KmerFrequencies) {
        for (kmer, freq) in freqs.iter() {
            if let Some(&slot) = self.slots.get(kmer) {
                self.totals[slot].1 += freq;
            } else {
                self.slots.insert(kmer.to_string(), self.totals.len());
                self.totals.push((kmer.to_string(), freq));
            }
        }
    }

    /// Number of distinct k-mers seen so far.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.totals.len()
    }

    /// Accumulated frequency of `kmer`.
    #[must_use]
    pub fn total(&self, kmer: &str) -> Option<f64> {
        self.slots.get(kmer).map(|&slot| self.totals[slot].1)
    }

    /// Ranks the accumulated k-mers and keeps the first `size`.
    #[must_use]
    pub fn build(self, size: VocabSize) -> Vocabulary {
        let mut totals = self.totals;
        #[cfg(feature = "tracing")]
        let distinct = totals.len();

        // Stable sort: equal totals stay in first-seen order.
        totals.sort_by(|a, b| b.1.total_cmp(&a.1));
        totals.truncate(size.get());

        #[cfg(feature = "tracing")]
        debug!(distinct, selected = totals.len(), "Ranked cohort k-mers");

        Vocabulary {
            kmers: totals.into_iter().map(|(kmer, _)| kmer).collect(),
        }
    }
}

/// Folds a cohort, in order, into a vocabulary of at most `size` k-mers.
pub fn build_vocabulary<'a, I>(cohort: I, size: VocabSize) -> Vocabulary
where
    I: IntoIterator<Item = &'a SampleFeatures>,
{
    let mut builder = VocabularyBuilder::new();
    for features in cohort {
        builder.add(&features.kmer_freqs);
    }
    builder.build(size)
}
