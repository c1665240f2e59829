//! Command-line interface definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{DEFAULT_K, DEFAULT_TOP_KMERS};

/// K-mer frequency feature tables for DNA sequence classification.
#[derive(Parser, Debug)]
#[command(name = "kmerfeat")]
#[command(version, author, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a feature table and its schema from a cohort of FASTA files
    Build(BuildArgs),
    /// Align one new sample to the schema of a built feature table
    Align(AlignArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Directory holding <sample_id>.fasta or <sample_id>.fa files
    #[arg(long)]
    pub fasta_dir: PathBuf,

    /// CSV with at least `sample_id` and `label` columns
    #[arg(long)]
    pub meta: PathBuf,

    /// Output feature table (CSV)
    #[arg(long)]
    pub out: PathBuf,

    /// K-mer length
    #[arg(short, long, default_value_t = DEFAULT_K, value_parser = parse_positive)]
    pub k: usize,

    /// Number of most frequent k-mers kept as columns
    #[arg(long, default_value_t = DEFAULT_TOP_KMERS, value_parser = parse_positive)]
    pub top_kmers: usize,

    /// Where to write the schema [default: <out>.schema.json]
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AlignArgs {
    /// FASTA file of the sample to align
    #[arg(long)]
    pub fasta: PathBuf,

    /// Schema written by `build`
    #[arg(long, conflicts_with = "features")]
    pub schema: Option<PathBuf>,

    /// Feature table written by `build`; its header stands in for the schema
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// K-mer length; must match the schema. Required with --features [default: 3]
    #[arg(short, long, value_parser = parse_positive)]
    pub k: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tsv")]
    pub format: OutputFormat,
}

/// Output format for an aligned vector.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Tab-separated `column\tvalue` lines
    #[default]
    Tsv,
    /// JSON object with columns and values
    Json,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults() {
        let cli = Cli::parse_from([
            "kmerfeat", "build", "--fasta-dir", "d", "--meta", "m.csv", "--out", "o.csv",
        ]);
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.k, 3);
                assert_eq!(args.top_kmers, 200);
                assert!(args.schema.is_none());
            }
            Command::Align(_) => panic!("expected build"),
        }
    }

    #[test]
    fn zero_k_is_rejected() {
        let parsed = Cli::try_parse_from([
            "kmerfeat", "build", "--fasta-dir", "d", "--meta", "m.csv", "--out", "o.csv", "-k",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn schema_and_features_conflict() {
        let parsed = Cli::try_parse_from([
            "kmerfeat", "align", "--fasta", "x.fa", "--schema", "s.json", "--features", "t.csv",
        ]);
        assert!(parsed.is_err());
    }
}
