//! The cohort metadata table.
//!
//! A CSV file with at least `sample_id` and `label` columns. Other columns
//! are ignored. Row order is the cohort order.

use std::{io::Read, path::Path};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// One cohort member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub sample_id: String,
    pub label: String,
}

impl SampleRecord {
    pub fn new(sample_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            label: label.into(),
        }
    }
}

/// Reads the metadata table at `path`.
///
/// # Errors
///
/// Returns [`FeatureError::MetadataRead`] if the file cannot be opened, a
/// required column is missing, or a row is malformed.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<SampleRecord>, FeatureError> {
    let path = path.as_ref();
    let to_err = |source: csv::Error| FeatureError::MetadataRead {
        source,
        path: path.to_path_buf(),
    };

    let reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(to_err)?;
    collect_records(reader).map_err(to_err)
}

/// Reads metadata rows from any CSV source.
pub fn read_metadata_from<R: Read>(source: R) -> Result<Vec<SampleRecord>, csv::Error> {
    collect_records(ReaderBuilder::new().trim(Trim::All).from_reader(source))
}

fn collect_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<SampleRecord>, csv::Error> {
    reader.deserialize().collect()
}
