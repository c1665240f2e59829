use std::{
    error::Error,
    io::{stdout, BufWriter, Write},
    process,
};

use clap::Parser;
use colored::Colorize;
use kmerfeat::{
    align::align_sample,
    builder::FeatureTableBuilder,
    cli::{AlignArgs, BuildArgs, Cli, Command, OutputFormat},
    config::{FeatureParams, DEFAULT_K},
    kmer::KmerLength,
    schema::FeatureSchema,
    table::FeatureTable,
};
use serde::Serialize;

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    init_tracing();

    let result = match cli.command {
        Command::Build(args) => build(args, cli.quiet),
        Command::Align(args) => align(args, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!(
            "{}\n {}",
            "Application error:".blue().bold(),
            e.to_string().blue()
        );
        process::exit(1);
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (errors only by default).
#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(args: BuildArgs, quiet: bool) -> Result<(), Box<dyn Error>> {
    let params = FeatureParams::new(args.k, args.top_kmers)?;

    if !quiet {
        println!("{}: {}", "k-length".bold(), params.k.to_string().blue().bold());
        println!("{}: {}", "top k-mers".bold(), params.top_kmers.to_string().blue().bold());
        println!("{}: {}", "sequences".bold(), args.fasta_dir.display().to_string().underline().bold().blue());
        println!("{}: {}", "metadata".bold(), args.meta.display().to_string().underline().bold().blue());
        println!();
    }

    let report = FeatureTableBuilder::new()
        .params_validated(params)
        .build(&args.fasta_dir, &args.meta)?;

    for issue in &report.issues {
        eprintln!("{} {}", "Degraded sample:".yellow().bold(), issue);
    }

    let schema_path = report.persist(&args.out, args.schema.as_deref())?;

    if !quiet {
        println!(
            "{}: {} rows, {} k-mer columns, {} degraded",
            "features".bold(),
            report.table.len(),
            report.schema().vocabulary().len(),
            report.issues.len()
        );
        println!("{}: {}", "table".bold(), args.out.display().to_string().underline().blue());
        println!("{}: {}", "schema".bold(), schema_path.display().to_string().underline().blue());
    }
    Ok(())
}

#[derive(Serialize)]
struct AlignedOutput<'a> {
    columns: &'a [String],
    values: &'a [f64],
}

fn align(args: AlignArgs, quiet: bool) -> Result<(), Box<dyn Error>> {
    let k = args.k.map(KmerLength::new).transpose()?;

    let schema = match (&args.schema, &args.features) {
        (Some(path), _) => Some(FeatureSchema::load(path)?),
        (None, Some(table)) => {
            let k = match k {
                Some(k) => k,
                None => KmerLength::new(DEFAULT_K)?,
            };
            Some(FeatureTable::read_csv(table, k)?.schema().clone())
        }
        (None, None) => None,
    };

    let aligned = align_sample(&args.fasta, schema.as_ref(), k)?;

    // align_sample only succeeds with a schema.
    let columns = schema.map(|s| s.numeric_columns()).unwrap_or_default();
    let values = aligned.numeric();

    if !quiet {
        eprintln!("{}: {}", "sample".bold(), args.fasta.display().to_string().underline().bold().blue());
        eprintln!("{}: {}", "columns".bold(), columns.len().to_string().blue().bold());
    }

    let mut buf = BufWriter::new(stdout());
    match args.format {
        OutputFormat::Tsv => {
            for (column, value) in columns.iter().zip(&values) {
                writeln!(buf, "{column}\t{value}")?;
            }
        }
        OutputFormat::Json => {
            let output = AlignedOutput {
                columns: &columns,
                values: &values,
            };
            serde_json::to_writer_pretty(&mut buf, &output)?;
            writeln!(buf)?;
        }
    }
    buf.flush()?;
    Ok(())
}
