//! Feature table assembly and CSV persistence.
//!
//! The table has one row per metadata row, in metadata order, and the columns
//! `sample_id, label, seq_len, gc, k_<kmer>...` fixed by its schema. A sample
//! without features (missing file, unreadable file, no residues) still gets a
//! row, with every numeric column zero.

use std::{fs, io::Write, path::Path};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rustc_hash::FxHashMap;

use crate::{
    error::FeatureError,
    features::SampleFeatures,
    kmer::KmerLength,
    metadata::SampleRecord,
    schema::{FeatureSchema, LABEL_COLUMN, SAMPLE_ID_COLUMN, SCALAR_COLUMNS},
    vocabulary::Vocabulary,
};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Per-sample features keyed by sample id.
pub type SampleFeatureMap = FxHashMap<String, SampleFeatures>;

/// One feature table row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub sample_id: String,
    pub label: String,
    pub seq_len: u64,
    pub gc: f64,
    /// One value per vocabulary k-mer, in vocabulary order.
    pub kmer_values: Vec<f64>,
}

impl FeatureRow {
    fn from_features(record: &SampleRecord, features: &SampleFeatures, vocab: &Vocabulary) -> Self {
        Self {
            sample_id: record.sample_id.clone(),
            label: record.label.clone(),
            seq_len: features.seq_len,
            gc: features.gc,
            kmer_values: vocab.project(&features.kmer_freqs),
        }
    }

    /// The values a classifier sees: `seq_len`, `gc`, then the k-mer values.
    #[must_use]
    pub fn numeric(&self) -> Vec<f64> {
        [self.seq_len as f64, self.gc]
            .into_iter()
            .chain(self.kmer_values.iter().copied())
            .collect()
    }

    fn to_record(&self) -> Vec<String> {
        [
            self.sample_id.clone(),
            self.label.clone(),
            self.seq_len.to_string(),
            self.gc.to_string(),
        ]
        .into_iter()
        .chain(self.kmer_values.iter().map(ToString::to_string))
        .collect()
    }
}

/// A vocabulary-aligned feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    schema: FeatureSchema,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// The first row for `sample_id`.
    #[must_use]
    pub fn row(&self, sample_id: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|row| row.sample_id == sample_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as CSV, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::TableWrite`] if the file cannot be written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), FeatureError> {
        let path = path.as_ref();
        let to_err = |source: csv::Error| FeatureError::TableWrite {
            source,
            path: path.to_path_buf(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| to_err(e.into()))?;
        }
        let file = fs::File::create(path).map_err(|e| to_err(e.into()))?;
        self.write_to(file).map_err(to_err)?;

        #[cfg(feature = "tracing")]
        info!(path = ?path, rows = self.rows.len(), columns = self.schema.columns().len(), "Wrote feature table");

        Ok(())
    }

    /// Writes the table as CSV to any writer.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(self.schema.columns())?;
        for row in &self.rows {
            writer.write_record(row.to_record())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a table written by [`write_csv`](Self::write_csv).
    ///
    /// The header does not record the k-mer length, so `k` must be the one
    /// the table was built with.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::TableRead`] if the file cannot be read, its
    /// leading columns are not `sample_id, label, seq_len, gc`, or a value
    /// does not parse; [`FeatureError::InvalidSchema`] if the k-mer columns do
    /// not match `k`.
    pub fn read_csv<P: AsRef<Path>>(path: P, k: KmerLength) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let read_err = |details: String| FeatureError::TableRead {
            details,
            path: path.to_path_buf(),
        };

        let mut reader = ReaderBuilder::new()
            .from_path(path)
            .map_err(|e| read_err(e.to_string()))?;
        let header = reader.headers().map_err(|e| read_err(e.to_string()))?.clone();

        let leading: Vec<&str> = header.iter().take(4).collect();
        let expected = [SAMPLE_ID_COLUMN, LABEL_COLUMN, SCALAR_COLUMNS[0], SCALAR_COLUMNS[1]];
        if leading != expected {
            return Err(read_err(format!(
                "header starts with {leading:?}, expected {expected:?}"
            )));
        }
        let schema = FeatureSchema::from_header(header.iter(), k)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| read_err(e.to_string()))?;
            rows.push(parse_row(&record).map_err(read_err)?);
        }

        #[cfg(feature = "tracing")]
        debug!(path = ?path, rows = rows.len(), "Read feature table");

        Ok(Self { schema, rows })
    }
}

fn parse_row(record: &StringRecord) -> Result<FeatureRow, String> {
    let field = |i: usize| record.get(i).ok_or_else(|| format!("missing column {i}"));
    let number = |i: usize| -> Result<f64, String> {
        let raw = field(i)?;
        raw.parse()
            .map_err(|e| format!("column {i}: '{raw}' is not a number: {e}"))
    };

    let seq_len_raw = field(2)?;
    let seq_len = seq_len_raw
        .parse()
        .map_err(|e| format!("column 2: '{seq_len_raw}' is not a length: {e}"))?;

    Ok(FeatureRow {
        sample_id: field(0)?.to_string(),
        label: field(1)?.to_string(),
        seq_len,
        gc: number(3)?,
        kmer_values: (4..record.len()).map(number).collect::<Result<_, _>>()?,
    })
}

/// Joins metadata, per-sample features and a schema into a table.
///
/// Every metadata row yields exactly one table row, in metadata order. A
/// sample absent from `features` gets `seq_len = 0`, `gc = 0` and all-zero
/// k-mer values; its label is kept.
#[must_use]
pub fn assemble(
    metadata: &[SampleRecord],
    features: &SampleFeatureMap,
    schema: FeatureSchema,
) -> FeatureTable {
    let empty = SampleFeatures::empty();
    let rows = metadata
        .iter()
        .map(|record| {
            let sample = features.get(&record.sample_id).unwrap_or(&empty);
            FeatureRow::from_features(record, sample, schema.vocabulary())
        })
        .collect();
    FeatureTable { schema, rows }
}
