//! Cohort feature table build.
//!
//! Samples are featurized in parallel with rayon, one task per distinct
//! sample id, into a `DashMap`. The vocabulary is then folded sequentially in
//! metadata order, which keeps frequency sums and tie-breaks independent of
//! the thread count. A sample whose file is missing, unreadable, or empty is
//! reported and its row is zero-filled; it never aborts the build.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::{
    config::FeatureParams,
    error::FeatureError,
    features::{featurize, SampleFeatures},
    kmer::KmerLength,
    metadata::{read_metadata, SampleRecord},
    progress::{Progress, ProgressTracker},
    reader::{read_sequence, resolve_sample_path},
    schema::FeatureSchema,
    table::{assemble, FeatureTable, SampleFeatureMap},
    vocabulary::VocabularyBuilder,
};

#[cfg(feature = "tracing")]
use tracing::{debug, info, info_span, warn};

/// A `DashMap` w/ `FxHasher`, keyed by sample id.
type DashFx = DashMap<String, SampleFeatures, FxBuildHasher>;

/// Why a sample's row was degraded to zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleIssue {
    /// No `<sample_id>.fasta` or `<sample_id>.fa` in the sequence directory.
    Missing {
        sample_id: String,
        attempted: Vec<PathBuf>,
    },
    /// The file exists but could not be read or parsed.
    Unreadable {
        sample_id: String,
        path: PathBuf,
        reason: String,
    },
    /// The file holds no residues.
    Empty { sample_id: String, path: PathBuf },
}

impl SampleIssue {
    #[must_use]
    pub fn sample_id(&self) -> &str {
        match self {
            Self::Missing { sample_id, .. }
            | Self::Unreadable { sample_id, .. }
            | Self::Empty { sample_id, .. } => sample_id,
        }
    }

    fn from_error(sample_id: &str, err: FeatureError) -> Self {
        match err {
            FeatureError::MissingSampleFile {
                sample_id,
                attempted,
            } => Self::Missing {
                sample_id,
                attempted,
            },
            FeatureError::EmptySequence { path } => Self::Empty {
                sample_id: sample_id.to_string(),
                path,
            },
            FeatureError::SequenceRead { ref path, .. }
            | FeatureError::SequenceParse { ref path, .. } => Self::Unreadable {
                sample_id: sample_id.to_string(),
                path: path.clone(),
                reason: err.to_string(),
            },
            other => Self::Unreadable {
                sample_id: sample_id.to_string(),
                path: PathBuf::new(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for SampleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing {
                sample_id,
                attempted,
            } => {
                let tried: Vec<_> = attempted.iter().map(|p| p.display().to_string()).collect();
                write!(f, "{sample_id}: missing (tried {})", tried.join(", "))
            }
            Self::Unreadable {
                sample_id, reason, ..
            } => write!(f, "{sample_id}: unreadable ({reason})"),
            Self::Empty { sample_id, path } => {
                write!(f, "{sample_id}: no residues in {}", path.display())
            }
        }
    }
}

/// The outcome of a cohort build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub table: FeatureTable,
    /// Samples whose rows were zero-filled, in first-appearance order.
    pub issues: Vec<SampleIssue>,
}

impl BuildReport {
    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        self.table.schema()
    }

    /// Writes the table to `table_path` and its schema to `schema_path`
    /// (or [`FeatureSchema::default_path`] when `None`).
    ///
    /// Returns the path the schema was written to.
    pub fn persist(
        &self,
        table_path: &Path,
        schema_path: Option<&Path>,
    ) -> Result<PathBuf, FeatureError> {
        let schema_path = schema_path.map_or_else(
            || FeatureSchema::default_path(table_path),
            Path::to_path_buf,
        );
        self.table.write_csv(table_path)?;
        self.schema().save(&schema_path)?;
        Ok(schema_path)
    }
}

/// Builds a feature table from a sequence directory and a metadata file.
///
/// # Errors
///
/// Fails only if the metadata cannot be read. Per-sample problems are
/// returned in [`BuildReport::issues`].
pub fn build_feature_table<D, M>(
    fasta_dir: D,
    metadata_path: M,
    params: FeatureParams,
) -> Result<BuildReport, FeatureError>
where
    D: AsRef<Path>,
    M: AsRef<Path>,
{
    build_feature_table_with_progress(fasta_dir, metadata_path, params, |_| {})
}

/// Like [`build_feature_table`], invoking `callback` after each sample.
///
/// # Errors
///
/// Fails only if the metadata cannot be read.
pub fn build_feature_table_with_progress<D, M, F>(
    fasta_dir: D,
    metadata_path: M,
    params: FeatureParams,
    callback: F,
) -> Result<BuildReport, FeatureError>
where
    D: AsRef<Path>,
    M: AsRef<Path>,
    F: Fn(Progress) + Send + Sync,
{
    let metadata = read_metadata(metadata_path)?;

    #[cfg(feature = "tracing")]
    info!(
        samples = metadata.len(),
        k = params.k.get(),
        top_kmers = params.top_kmers.get(),
        "Building feature table"
    );

    Ok(build_from_records(
        fasta_dir.as_ref(),
        &metadata,
        params,
        callback,
    ))
}

/// Builds a feature table for an in-memory cohort.
pub fn build_from_records<F>(
    fasta_dir: &Path,
    metadata: &[SampleRecord],
    params: FeatureParams,
    callback: F,
) -> BuildReport
where
    F: Fn(Progress) + Send + Sync,
{
    let (features, issues) = featurize_cohort(fasta_dir, metadata, params.k, &callback);

    #[cfg(feature = "tracing")]
    let _vocab_span = info_span!("build_vocabulary").entered();

    let mut builder = VocabularyBuilder::new();
    for record in metadata {
        if let Some(sample) = features.get(&record.sample_id) {
            builder.add(&sample.kmer_freqs);
        }
    }
    let schema = FeatureSchema::new(params.k, builder.build(params.top_kmers));

    #[cfg(feature = "tracing")]
    {
        drop(_vocab_span);
        info!(
            vocabulary = schema.vocabulary().len(),
            degraded = issues.len(),
            "Feature table assembled"
        );
    }

    BuildReport {
        table: assemble(metadata, &features, schema),
        issues,
    }
}

/// Featurizes every distinct sample of the cohort in parallel.
///
/// Returns the features of every sample that produced residues, plus one
/// issue per sample that did not, in first-appearance order.
pub fn featurize_cohort<F>(
    fasta_dir: &Path,
    metadata: &[SampleRecord],
    k: KmerLength,
    callback: &F,
) -> (SampleFeatureMap, Vec<SampleIssue>)
where
    F: Fn(Progress) + Send + Sync,
{
    let mut seen = FxHashSet::default();
    let sample_ids: Vec<&str> = metadata
        .iter()
        .map(|record| record.sample_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect();

    #[cfg(feature = "tracing")]
    let _span = info_span!("featurize_cohort", samples = sample_ids.len()).entered();

    let tracker = ProgressTracker::new(sample_ids.len() as u64);
    let features: DashFx = DashMap::with_hasher(FxBuildHasher);

    let issues: Vec<SampleIssue> = sample_ids
        .par_iter()
        .filter_map(|&sample_id| {
            let outcome = featurize_sample(fasta_dir, sample_id, k);
            let bases = outcome.as_ref().map_or(0, |sample| sample.seq_len);
            tracker.record_sample(bases);
            callback(tracker.snapshot());

            match outcome {
                Ok(sample) => {
                    features.insert(sample_id.to_string(), sample);
                    None
                }
                Err(err) => Some(SampleIssue::from_error(sample_id, err)),
            }
        })
        .collect();

    #[cfg(feature = "tracing")]
    {
        for issue in &issues {
            warn!(sample_id = issue.sample_id(), issue = %issue, "Sample degraded to zero features");
        }
        debug!(
            featurized = features.len(),
            degraded = issues.len(),
            "Featurized cohort"
        );
    }

    (features.into_iter().collect(), issues)
}

fn featurize_sample(
    fasta_dir: &Path,
    sample_id: &str,
    k: KmerLength,
) -> Result<SampleFeatures, FeatureError> {
    let path = resolve_sample_path(fasta_dir, sample_id)?;
    let seq = read_sequence(&path)?;
    if seq.is_empty() {
        return Err(FeatureError::EmptySequence { path });
    }
    Ok(featurize(&seq, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::TempDir;

    fn cohort_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn params(k: usize, top: usize) -> FeatureParams {
        FeatureParams::new(k, top).unwrap()
    }

    #[test]
    fn missing_sample_is_reported_and_zero_filled() {
        let dir = cohort_dir(&[("S1.fasta", ">a\nAAAGGG\n")]);
        let metadata = vec![SampleRecord::new("S1", "1"), SampleRecord::new("S9", "0")];
        let report = build_from_records(dir.path(), &metadata, params(3, 10), |_| {});

        assert_eq!(report.table.len(), 2);
        assert_eq!(
            report.issues,
            vec![SampleIssue::Missing {
                sample_id: "S9".to_string(),
                attempted: vec![dir.path().join("S9.fasta"), dir.path().join("S9.fa")],
            }]
        );
        let s9 = report.table.row("S9").unwrap();
        assert_eq!(s9.label, "0");
        assert!(s9.numeric().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn empty_and_unreadable_files_are_degraded() {
        let dir = cohort_dir(&[
            ("S1.fa", ">a\nACGT\n"),
            ("S2.fasta", ""),
            ("S3.fasta", "not a fasta file\n"),
        ]);
        let metadata = vec![
            SampleRecord::new("S1", "1"),
            SampleRecord::new("S2", "0"),
            SampleRecord::new("S3", "0"),
        ];
        let report = build_from_records(dir.path(), &metadata, params(2, 10), |_| {});

        assert_eq!(report.table.len(), 3);
        let degraded: Vec<_> = report.issues.iter().map(SampleIssue::sample_id).collect();
        assert_eq!(degraded, vec!["S2", "S3"]);
        assert!(matches!(report.issues[0], SampleIssue::Empty { .. }));
        assert!(matches!(report.issues[1], SampleIssue::Unreadable { .. }));
    }

    #[test]
    fn duplicate_ids_are_read_once_and_counted_per_row() {
        let dir = cohort_dir(&[("A.fasta", ">a\nACGT\n"), ("B.fasta", ">b\nCCCC\n")]);
        let metadata = vec![
            SampleRecord::new("B", "0"),
            SampleRecord::new("A", "1"),
            SampleRecord::new("A", "1"),
        ];
        let calls = AtomicU64::new(0);
        let report = build_from_records(dir.path(), &metadata, params(2, 1), |_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(report.table.len(), 3);
        // CC: 1.0 from B. AC, CG, GT: 1/3 from each A row, 2/3 in total.
        assert_eq!(report.schema().vocabulary().kmers(), ["CC".to_string()]);
    }

    #[test]
    fn progress_reaches_total() {
        let dir = cohort_dir(&[("S1.fasta", ">a\nACGTACGT\n")]);
        let metadata = vec![SampleRecord::new("S1", "x"), SampleRecord::new("S2", "y")];
        let last = std::sync::Mutex::new(Progress::default());
        let _ = build_from_records(dir.path(), &metadata, params(3, 5), |progress| {
            let mut last = last.lock().unwrap();
            if progress.samples_processed > last.samples_processed {
                *last = progress;
            }
        });
        let last = last.into_inner().unwrap();
        assert_eq!(last.samples_processed, 2);
        assert_eq!(last.samples_total, 2);
    }

    #[test]
    fn persist_writes_table_and_schema() {
        let dir = cohort_dir(&[("S1.fasta", ">a\nAAAGGG\n")]);
        let out = TempDir::new().unwrap();
        let metadata = vec![SampleRecord::new("S1", "1")];
        let report = build_from_records(dir.path(), &metadata, params(3, 10), |_| {});

        let table_path = out.path().join("data").join("features.csv");
        let schema_path = report.persist(&table_path, None).unwrap();

        assert_eq!(schema_path, out.path().join("data").join("features.csv.schema.json"));
        assert_eq!(&FeatureSchema::load(&schema_path).unwrap(), report.schema());
        let reread = FeatureTable::read_csv(&table_path, report.schema().k()).unwrap();
        assert_eq!(reread, report.table);
    }
}
