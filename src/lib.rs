//! # kmerfeat
//!
//! Fixed-width k-mer frequency features for DNA sequence classification.
//!
//! A cohort build reads one FASTA file per sample, computes each sample's
//! length, GC fraction and normalized k-mer frequencies, selects the most
//! frequent k-mers across the cohort as a shared vocabulary, and writes a
//! feature table with one column per vocabulary k-mer. The vocabulary is
//! persisted as a [`schema::FeatureSchema`] next to the table, and
//! [`align::InferenceAligner`] uses it to turn a new sample into a vector
//! with exactly the table's columns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmerfeat::align::align_sample;
//! use kmerfeat::builder::FeatureTableBuilder;
//!
//! let report = FeatureTableBuilder::new()
//!     .k(3)?
//!     .top_kmers(200)?
//!     .build("fasta/", "metadata.csv")?;
//! let schema_path = report.persist("out/features.csv".as_ref(), None)?;
//!
//! let schema = kmerfeat::schema::FeatureSchema::load(schema_path)?;
//! let aligned = align_sample("new.fasta", Some(&schema), None)?;
//! assert_eq!(aligned.numeric().len(), schema.numeric_columns().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - `rust-bio` (default): read FASTA with `bio`
//! - `needletail`: read FASTA with `needletail`
//! - `tracing` (default): spans and events via `tracing`

pub mod align;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod kmer;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod reader;
pub mod schema;
pub mod table;
pub mod vocabulary;
