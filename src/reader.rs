//! Sequence file resolution and reading.
//!
//! A sample's residues are every FASTA record in its file, concatenated in
//! file order and uppercased.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use bytes::{Bytes, BytesMut};

use crate::error::FeatureError;

#[cfg(feature = "tracing")]
use tracing::debug;

/// File extensions tried, in order, when locating `<sample_id>.<ext>`.
pub const SEQUENCE_EXTENSIONS: [&str; 2] = ["fasta", "fa"];

/// Every path that may hold the sequence of `sample_id`, in lookup order.
///
/// # Example
///
/// ```rust
/// use kmerfeat::reader::candidate_paths;
/// use std::path::{Path, PathBuf};
///
/// let paths = candidate_paths(Path::new("seqs"), "S1");
/// assert_eq!(paths, vec![PathBuf::from("seqs/S1.fasta"), PathBuf::from("seqs/S1.fa")]);
/// ```
#[must_use]
pub fn candidate_paths(dir: &Path, sample_id: &str) -> Vec<PathBuf> {
    SEQUENCE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{sample_id}.{ext}")))
        .collect()
}

/// Finds the sequence file for `sample_id` in `dir`.
///
/// # Errors
///
/// Returns [`FeatureError::MissingSampleFile`] with every attempted path if
/// none of them is a file.
pub fn resolve_sample_path(dir: &Path, sample_id: &str) -> Result<PathBuf, FeatureError> {
    let attempted = candidate_paths(dir, sample_id);
    match attempted.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(FeatureError::MissingSampleFile {
            sample_id: sample_id.to_string(),
            attempted,
        }),
    }
}

/// Reads every record of a FASTA file into one uppercase residue string.
///
/// An empty file yields an empty string rather than an error.
///
/// # Errors
///
/// Returns [`FeatureError::SequenceRead`] if the file cannot be opened and
/// [`FeatureError::SequenceParse`] if a record is malformed.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<Bytes, FeatureError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FeatureError::SequenceRead {
        source,
        path: path.to_path_buf(),
    })?;

    let mut residues = BytesMut::new();
    let records = append_records(file, path, &mut residues)?;
    residues.make_ascii_uppercase();

    #[cfg(feature = "tracing")]
    debug!(path = ?path, records, residues = residues.len(), "Read sequence file");

    Ok(residues.freeze())
}

#[cfg(not(feature = "needletail"))]
fn append_records(file: File, path: &Path, residues: &mut BytesMut) -> Result<usize, FeatureError> {
    use bio::io::fasta;

    let mut records = 0;
    for record in fasta::Reader::new(file).records() {
        let record = record.map_err(|e| FeatureError::SequenceParse {
            details: e.to_string(),
            path: path.to_path_buf(),
        })?;
        residues.extend_from_slice(record.seq());
        records += 1;
    }
    Ok(records)
}

#[cfg(feature = "needletail")]
fn append_records(file: File, path: &Path, residues: &mut BytesMut) -> Result<usize, FeatureError> {
    use needletail::errors::ParseErrorKind;

    let mut reader = match needletail::parse_fastx_reader(file) {
        Ok(reader) => reader,
        Err(e) if e.kind == ParseErrorKind::EmptyFile => return Ok(0),
        Err(e) => {
            return Err(FeatureError::SequenceParse {
                details: e.to_string(),
                path: path.to_path_buf(),
            })
        }
    };

    let mut records = 0;
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| FeatureError::SequenceParse {
            details: e.to_string(),
            path: path.to_path_buf(),
        })?;
        residues.extend_from_slice(&record.seq());
        records += 1;
    }
    Ok(records)
}
