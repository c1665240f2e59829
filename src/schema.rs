//! The persisted feature schema.
//!
//! A schema fixes everything inference needs to reproduce a training row:
//! the k-mer length, the normalization, the column naming, and the
//! vocabulary in column order. It is written as JSON next to the feature
//! table at build time.
//!
//! Tables built without a schema file can still be aligned against: the
//! vocabulary is recovered from the table header by stripping the k-mer
//! column prefix (see [`FeatureSchema::from_header`]).
//!
//! # Example
//!
//! ```rust
//! use kmerfeat::kmer::KmerLength;
//! use kmerfeat::schema::FeatureSchema;
//! use kmerfeat::vocabulary::Vocabulary;
//!
//! let vocab = Vocabulary::from(vec!["ACG".to_string(), "CGT".to_string()]);
//! let schema = FeatureSchema::new(KmerLength::new(3)?, vocab);
//! assert_eq!(
//!     schema.columns(),
//!     ["sample_id", "label", "seq_len", "gc", "k_ACG", "k_CGT"]
//! );
//! # Ok::<(), kmerfeat::error::ParameterError>(())
//! ```

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    error::FeatureError,
    kmer::{is_unambiguous, KmerLength},
    vocabulary::Vocabulary,
};

/// Current schema format version.
pub const SCHEMA_VERSION: u32 = 1;

/// Prefix marking a k-mer column in the feature table header.
pub const KMER_COLUMN_PREFIX: &str = "k_";

/// Sample identifier column.
pub const SAMPLE_ID_COLUMN: &str = "sample_id";

/// Label column.
pub const LABEL_COLUMN: &str = "label";

/// Numeric columns that precede the k-mer columns.
pub const SCALAR_COLUMNS: [&str; 2] = ["seq_len", "gc"];

/// How k-mer counts were turned into frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Count divided by `len - k + 1`, ambiguous windows included.
    #[default]
    AllWindows,
}

/// The vocabulary contract shared by the feature table and inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    version: u32,
    k: KmerLength,
    kmer_column_prefix: String,
    normalization: Normalization,
    vocabulary: Vocabulary,
}

impl FeatureSchema {
    #[must_use]
    pub fn new(k: KmerLength, vocabulary: Vocabulary) -> Self {
        Self {
            version: SCHEMA_VERSION,
            k,
            kmer_column_prefix: KMER_COLUMN_PREFIX.to_string(),
            normalization: Normalization::AllWindows,
            vocabulary,
        }
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub const fn k(&self) -> KmerLength {
        self.k
    }

    #[must_use]
    pub const fn normalization(&self) -> Normalization {
        self.normalization
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Header name of the column holding `kmer`.
    #[must_use]
    pub fn kmer_column(&self, kmer: &str) -> String {
        format!("{}{kmer}", self.kmer_column_prefix)
    }

    /// The k-mer column names, in vocabulary order.
    #[must_use]
    pub fn kmer_columns(&self) -> Vec<String> {
        self.vocabulary
            .iter()
            .map(|kmer| self.kmer_column(kmer))
            .collect()
    }

    /// The numeric columns a classifier consumes: `seq_len`, `gc`, then k-mers.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        SCALAR_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(self.kmer_columns())
            .collect()
    }

    /// The full feature table header.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        [SAMPLE_ID_COLUMN, LABEL_COLUMN]
            .iter()
            .map(ToString::to_string)
            .chain(self.numeric_columns())
            .collect()
    }

    /// Recovers a schema from a feature table header.
    ///
    /// Every column starting with [`KMER_COLUMN_PREFIX`] contributes its
    /// suffix to the vocabulary, in header order. The header does not record
    /// k, so the caller supplies it and it is checked against every k-mer.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidSchema`] if a recovered k-mer does not
    /// have length `k` or is repeated.
    pub fn from_header<I, S>(header: I, k: KmerLength) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kmers: Vec<String> = header
            .into_iter()
            .filter_map(|column| {
                column
                    .as_ref()
                    .strip_prefix(KMER_COLUMN_PREFIX)
                    .map(ToString::to_string)
            })
            .collect();
        let schema = Self::new(k, Vocabulary::from(kmers));
        schema.validate()?;
        Ok(schema)
    }

    /// Checks the schema's internal invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidSchema`] on an unknown version, an empty
    /// column prefix, or a vocabulary entry that is repeated, has the wrong
    /// length, or holds a residue other than `A`, `C`, `G`, `T`.
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.version != SCHEMA_VERSION {
            return Err(FeatureError::InvalidSchema {
                details: format!(
                    "unsupported version {} (expected {SCHEMA_VERSION})",
                    self.version
                ),
            });
        }
        if self.kmer_column_prefix.is_empty() {
            return Err(FeatureError::InvalidSchema {
                details: "k-mer column prefix is empty".to_string(),
            });
        }

        let k = self.k.get();
        let mut seen = FxHashSet::default();
        for kmer in self.vocabulary.iter() {
            if kmer.len() != k || !kmer.bytes().all(is_unambiguous) {
                return Err(FeatureError::InvalidSchema {
                    details: format!("'{kmer}' is not a {k}-mer over A, C, G, T"),
                });
            }
            if !seen.insert(kmer) {
                return Err(FeatureError::InvalidSchema {
                    details: format!("'{kmer}' appears more than once"),
                });
            }
        }
        Ok(())
    }

    /// Where the schema of the table at `table_path` is stored by default.
    ///
    /// ```rust
    /// use kmerfeat::schema::FeatureSchema;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(
    ///     FeatureSchema::default_path(Path::new("out/features.csv")),
    ///     PathBuf::from("out/features.csv.schema.json")
    /// );
    /// ```
    #[must_use]
    pub fn default_path(table_path: &Path) -> PathBuf {
        let mut name = table_path.as_os_str().to_os_string();
        name.push(".schema.json");
        PathBuf::from(name)
    }

    /// Writes the schema as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::SchemaWrite`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FeatureError> {
        let path = path.as_ref();
        let write_err = |details: String| FeatureError::SchemaWrite {
            details,
            path: path.to_path_buf(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| write_err(e.to_string()))?;
        writeln!(writer).map_err(|e| write_err(e.to_string()))?;
        writer.flush().map_err(|e| write_err(e.to_string()))
    }

    /// Reads and validates a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::SchemaRead`] if the file cannot be read or
    /// parsed, and [`FeatureError::InvalidSchema`] if it fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let read_err = |details: String| FeatureError::SchemaRead {
            details,
            path: path.to_path_buf(),
        };

        let file = File::open(path).map_err(|e| read_err(e.to_string()))?;
        let schema: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| read_err(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }
}
