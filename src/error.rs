//! Error types for kmerfeat.
//!
//! Parameter errors are fatal and surface before any I/O. Per-sample problems
//! (a missing or empty sequence file) are not errors at the pipeline level:
//! they degrade a single row and are collected into the build report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in kmerfeat operations.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A pipeline parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    /// A sample's sequence file could not be located under any known extension.
    #[error("no sequence file for sample '{sample_id}' (tried {})", display_paths(.attempted))]
    MissingSampleFile {
        sample_id: String,
        attempted: Vec<PathBuf>,
    },

    /// A sequence file resolved to zero residues.
    #[error("sequence file '{path}' contains no residues")]
    EmptySequence { path: PathBuf },

    /// Alignment was requested without a persisted feature schema.
    #[error("no feature schema supplied; alignment needs the schema persisted at build time")]
    MissingSchema,

    /// Failed to read sequence file.
    #[error("failed to read sequence file '{path}': {source}")]
    SequenceRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to parse sequence record.
    #[error("failed to parse sequence record in '{path}': {details}")]
    SequenceParse { details: String, path: PathBuf },

    /// Failed to read the sample metadata table.
    #[error("failed to read metadata '{path}': {source}")]
    MetadataRead {
        #[source]
        source: csv::Error,
        path: PathBuf,
    },

    /// Failed to read a persisted feature table.
    #[error("failed to read feature table '{path}': {details}")]
    TableRead { details: String, path: PathBuf },

    /// Failed to write the feature table.
    #[error("failed to write feature table '{path}': {source}")]
    TableWrite {
        #[source]
        source: csv::Error,
        path: PathBuf,
    },

    /// Failed to read a feature schema file.
    #[error("failed to read feature schema '{path}': {details}")]
    SchemaRead { details: String, path: PathBuf },

    /// Failed to write a feature schema file.
    #[error("failed to write feature schema '{path}': {details}")]
    SchemaWrite { details: String, path: PathBuf },

    /// A schema was readable but violates its own invariants.
    #[error("invalid feature schema: {details}")]
    InvalidSchema { details: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error for an out-of-range pipeline parameter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterError {
    /// K-mer length must be at least one.
    #[error("k-mer length {k} is out of range: must be at least {min}")]
    KmerLength { k: usize, min: usize },

    /// Vocabulary size must be at least one.
    #[error("vocabulary size {size} is out of range: must be at least {min}")]
    VocabSize { size: usize, min: usize },

    /// The k requested at inference does not match the k the schema was built with.
    #[error("k-mer length {requested} does not match the schema's k-mer length {schema}")]
    KmerLengthMismatch { requested: usize, schema: usize },
}
