//! Inference-time alignment of a new sample to a persisted schema.
//!
//! A classifier trained on a feature table only has weights for that table's
//! columns. [`InferenceAligner`] featurizes a new sample with the build's
//! k-mer length and orders its values by the schema's vocabulary. K-mers
//! outside the vocabulary are dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use kmerfeat::align::InferenceAligner;
//! use kmerfeat::schema::FeatureSchema;
//!
//! let schema = FeatureSchema::load("out/features.csv.schema.json")?;
//! let aligned = InferenceAligner::new(Some(schema))?.align_file("new_sample.fasta")?;
//! println!("{:?}", aligned.numeric());
//! # Ok::<(), kmerfeat::error::FeatureError>(())
//! ```

use std::path::Path;

use serde::Serialize;

use crate::{
    error::{FeatureError, ParameterError},
    features::{featurize, SampleFeatures},
    kmer::KmerLength,
    reader::read_sequence,
    schema::FeatureSchema,
};

#[cfg(feature = "tracing")]
use tracing::debug;

/// One sample's features in schema column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedFeatures {
    pub seq_len: u64,
    pub gc: f64,
    /// One value per schema vocabulary k-mer, `0.0` when absent.
    pub kmer_values: Vec<f64>,
}

impl AlignedFeatures {
    /// The classifier input: `seq_len`, `gc`, then the k-mer values, matching
    /// [`FeatureSchema::numeric_columns`].
    #[must_use]
    pub fn numeric(&self) -> Vec<f64> {
        [self.seq_len as f64, self.gc]
            .into_iter()
            .chain(self.kmer_values.iter().copied())
            .collect()
    }
}

/// Aligns samples to a fixed schema.
#[derive(Debug, Clone)]
pub struct InferenceAligner {
    schema: FeatureSchema,
}

impl InferenceAligner {
    /// Creates an aligner for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingSchema`] if `schema` is `None`.
    pub fn new(schema: Option<FeatureSchema>) -> Result<Self, FeatureError> {
        let schema = schema.ok_or(FeatureError::MissingSchema)?;
        Ok(Self { schema })
    }

    /// Checks that `k` is the length the schema was built with.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidParameter`] on a mismatch.
    pub fn expect_k(self, k: KmerLength) -> Result<Self, FeatureError> {
        if k != self.schema.k() {
            return Err(ParameterError::KmerLengthMismatch {
                requested: k.get(),
                schema: self.schema.k().get(),
            }
            .into());
        }
        Ok(self)
    }

    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Orders already computed features by the schema.
    #[must_use]
    pub fn align_features(&self, features: &SampleFeatures) -> AlignedFeatures {
        AlignedFeatures {
            seq_len: features.seq_len,
            gc: features.gc,
            kmer_values: self.schema.vocabulary().project(&features.kmer_freqs),
        }
    }

    /// Featurizes a residue string (any case) and aligns it.
    #[must_use]
    pub fn align_sequence(&self, seq: &[u8]) -> AlignedFeatures {
        let seq = seq.to_ascii_uppercase();
        self.align_features(&featurize(&seq, self.schema.k()))
    }

    /// Reads a sequence file, featurizes it and aligns it.
    ///
    /// An empty file aligns to an all-zero vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn align_file<P: AsRef<Path>>(&self, path: P) -> Result<AlignedFeatures, FeatureError> {
        let path = path.as_ref();
        let seq = read_sequence(path)?;
        let features = featurize(&seq, self.schema.k());

        #[cfg(feature = "tracing")]
        debug!(
            path = ?path,
            seq_len = features.seq_len,
            kmers = features.kmer_freqs.len(),
            vocabulary = self.schema.vocabulary().len(),
            "Aligning sample to schema"
        );

        Ok(self.align_features(&features))
    }
}

/// Aligns the sample at `path` to `schema`.
///
/// The schema is checked before the file is touched.
///
/// # Errors
///
/// Returns [`FeatureError::MissingSchema`] if `schema` is `None`,
/// [`FeatureError::InvalidParameter`] if `k` is given and differs from the
/// schema's, or a read error for the sample file.
pub fn align_sample<P: AsRef<Path>>(
    path: P,
    schema: Option<&FeatureSchema>,
    k: Option<KmerLength>,
) -> Result<AlignedFeatures, FeatureError> {
    let mut aligner = InferenceAligner::new(schema.cloned())?;
    if let Some(k) = k {
        aligner = aligner.expect_k(k)?;
    }
    aligner.align_file(path)
}
