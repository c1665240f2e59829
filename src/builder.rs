//! Builder pattern API for feature table builds.
//!
//! # Example
//!
//! ```rust,no_run
//! use kmerfeat::builder::FeatureTableBuilder;
//!
//! let report = FeatureTableBuilder::new()
//!     .k(3)?
//!     .top_kmers(200)?
//!     .build("fasta/", "metadata.csv")?;
//!
//! for issue in &report.issues {
//!     eprintln!("degraded: {issue}");
//! }
//! report.persist("out/features.csv".as_ref(), None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use crate::{
    config::FeatureParams,
    error::{FeatureError, ParameterError},
    kmer::KmerLength,
    metadata::SampleRecord,
    pipeline::{build_feature_table_with_progress, build_from_records, BuildReport},
    progress::Progress,
    vocabulary::VocabSize,
};

/// A builder for configuring feature table builds.
///
/// Parameters are validated as they are set, so a configured builder can
/// never start reading files with an invalid k or vocabulary size.
#[derive(Debug, Clone, Default)]
pub struct FeatureTableBuilder {
    params: FeatureParams,
}

impl FeatureTableBuilder {
    /// Creates a builder with `k = 3` and 200 vocabulary k-mers.
    ///
    /// ```rust
    /// use kmerfeat::builder::FeatureTableBuilder;
    ///
    /// let builder = FeatureTableBuilder::new();
    /// assert_eq!(builder.params().k.get(), 3);
    /// assert_eq!(builder.params().top_kmers.get(), 200);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the k-mer length.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::KmerLength`] if `k` is zero.
    pub fn k(mut self, k: usize) -> Result<Self, ParameterError> {
        self.params.k = KmerLength::new(k)?;
        Ok(self)
    }

    /// Sets the number of k-mers kept in the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::VocabSize`] if `n` is zero.
    ///
    /// ```rust
    /// use kmerfeat::builder::FeatureTableBuilder;
    ///
    /// assert!(FeatureTableBuilder::new().top_kmers(0).is_err());
    /// ```
    pub fn top_kmers(mut self, n: usize) -> Result<Self, ParameterError> {
        self.params.top_kmers = VocabSize::new(n)?;
        Ok(self)
    }

    /// Replaces all parameters with pre-validated ones.
    #[must_use]
    pub const fn params_validated(mut self, params: FeatureParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub const fn params(&self) -> FeatureParams {
        self.params
    }

    /// Builds the table for the samples listed in `metadata_path`, reading
    /// sequences from `fasta_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read. Missing or unreadable
    /// sample files do not fail the build; see [`BuildReport::issues`].
    pub fn build<D, M>(&self, fasta_dir: D, metadata_path: M) -> Result<BuildReport, FeatureError>
    where
        D: AsRef<Path>,
        M: AsRef<Path>,
    {
        self.build_with_progress(fasta_dir, metadata_path, |_| {})
    }

    /// Like [`build`](Self::build), invoking `callback` after each sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    pub fn build_with_progress<D, M, F>(
        &self,
        fasta_dir: D,
        metadata_path: M,
        callback: F,
    ) -> Result<BuildReport, FeatureError>
    where
        D: AsRef<Path>,
        M: AsRef<Path>,
        F: Fn(Progress) + Send + Sync,
    {
        build_feature_table_with_progress(fasta_dir, metadata_path, self.params, callback)
    }

    /// Builds the table for an in-memory cohort.
    pub fn build_records<D: AsRef<Path>>(
        &self,
        fasta_dir: D,
        metadata: &[SampleRecord],
    ) -> BuildReport {
        build_from_records(fasta_dir.as_ref(), metadata, self.params, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_validate() {
        assert!(FeatureTableBuilder::new().k(0).is_err());
        assert!(FeatureTableBuilder::new().top_kmers(0).is_err());
    }

    #[test]
    fn setters_update_params() {
        let builder = FeatureTableBuilder::new().k(5).unwrap().top_kmers(7).unwrap();
        assert_eq!(builder.params(), FeatureParams::new(5, 7).unwrap());
    }
}
