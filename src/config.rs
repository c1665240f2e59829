//! Pipeline parameters.

use crate::{error::ParameterError, kmer::KmerLength, vocabulary::VocabSize};

/// Default k-mer length.
pub const DEFAULT_K: usize = 3;

/// Default number of k-mers kept in the vocabulary.
pub const DEFAULT_TOP_KMERS: usize = 200;

/// Validated parameters of a feature table build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureParams {
    pub k: KmerLength,
    pub top_kmers: VocabSize,
}

impl FeatureParams {
    /// Validates raw parameters. Nothing is read before this succeeds.
    pub const fn new(k: usize, top_kmers: usize) -> Result<Self, ParameterError> {
        let k = match KmerLength::new(k) {
            Ok(k) => k,
            Err(e) => return Err(e),
        };
        let top_kmers = match VocabSize::new(top_kmers) {
            Ok(n) => n,
            Err(e) => return Err(e),
        };
        Ok(Self { k, top_kmers })
    }
}

// Checked at compile time.
#[allow(clippy::panic)]
const DEFAULT_PARAMS: FeatureParams = match FeatureParams::new(DEFAULT_K, DEFAULT_TOP_KMERS) {
    Ok(params) => params,
    Err(_) => panic!("default parameters are out of range"),
};

impl Default for FeatureParams {
    fn default() -> Self {
        DEFAULT_PARAMS
    }
}
