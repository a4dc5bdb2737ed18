// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-csq CLI
//!
//! Command-line interface for HGVS consequence annotation.

use clap::{Parser, Subcommand};
use ferro_csq::config::CsqConfig;
use ferro_csq::convert::hgvs_to_variant;
use ferro_csq::parallel::BatchStats;
use ferro_csq::{
    CsqError, FastaProvider, GenomicVariant, HgvsAnnotator, Transcript, TranscriptIndex,
    VariantConsequence,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferro-csq")]
#[command(author, version, about = "HGVS consequence annotator")]
#[command(long_about = "Annotate genomic variants with HGVS c./p. descriptions and consequences.

Examples:
  ferro-csq annotate --reference genome.fa --transcripts transcripts.json -i variants.tsv
  cat variants.tsv | ferro-csq annotate --reference genome.fa --transcripts transcripts.json
  ferro-csq convert --reference genome.fa --transcripts transcripts.json NM_000001.1 'c.88+2T>G'")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate `chrom pos ref alt` lines against overlapping transcripts
    Annotate {
        /// Reference FASTA file (indexed with .fai, or indexed on the fly)
        #[arg(long)]
        reference: PathBuf,

        /// Transcript models as JSON
        #[arg(long)]
        transcripts: PathBuf,

        /// Input file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output TSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: .ferro-csq.toml or ~/.config/ferro/csq.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of worker threads (0 = all cores)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Convert a transcript HGVS description to a genomic variant
    Convert {
        /// Reference FASTA file
        #[arg(long)]
        reference: PathBuf,

        /// Transcript models as JSON
        #[arg(long)]
        transcripts: PathBuf,

        /// Transcript name
        transcript: String,

        /// HGVS description (e.g. c.88+2T>G)
        hgvs: String,
    },
}

const HEADER: &str = "allele\ttranscript\tgene\thgvs_c\thgvs_p\texon\tintron\tconsequences\timpact";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Annotate {
            reference,
            transcripts,
            input,
            output,
            config,
            threads,
        } => run_annotate(
            &reference,
            &transcripts,
            &input,
            output.as_ref(),
            config.as_ref(),
            threads,
        ),
        Commands::Convert {
            reference,
            transcripts,
            transcript,
            hgvs,
        } => run_convert(&reference, &transcripts, &transcript, &hgvs),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CsqConfig, CsqError> {
    match path {
        Some(path) => CsqConfig::load_from_path(path),
        None => Ok(CsqConfig::load().unwrap_or_default()),
    }
}

/// Parse a `chrom pos ref alt` line; `-` marks an empty allele
fn parse_variant_line(line: &str) -> Result<GenomicVariant, CsqError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let invalid = |msg: &str| CsqError::InvalidVariant {
        variant: line.to_string(),
        msg: msg.to_string(),
    };
    let [chrom, pos, ref_allele, alt_allele] = fields[..] else {
        return Err(invalid("expected 4 columns: chrom pos ref alt"));
    };
    let start: u64 = pos.parse().map_err(|_| invalid("position is not a number"))?;
    Ok(GenomicVariant::new(chrom, start, ref_allele, alt_allele))
}

fn read_variants(input: &Path) -> Result<Vec<GenomicVariant>, Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = if input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };

    let mut variants = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_variant_line(trimmed) {
            Ok(variant) => variants.push(variant),
            Err(e) => eprintln!("Skipping line {}: {}", i + 1, e),
        }
    }
    Ok(variants)
}

fn format_row(transcript: &Transcript, csq: &VariantConsequence) -> String {
    let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        csq.allele,
        transcript.name(),
        transcript.gene(),
        csq.hgvs_c,
        csq.hgvs_p,
        number(csq.exon_number),
        number(csq.intron_number),
        csq.types_to_string("&"),
        csq.impact.as_str()
    )
}

fn run_annotate(
    reference: &Path,
    transcripts: &Path,
    input: &Path,
    output: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    threads: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(threads) = threads {
        config.parallel.num_threads = threads;
    }
    let annotator = HgvsAnnotator::new(config.annotator)?;
    let index = TranscriptIndex::from_json(transcripts)?;
    // Fail early on a bad FASTA rather than once per worker.
    FastaProvider::new(reference)?;

    let variants = read_variants(input)?;
    let flank = annotator.config().max_dist_to_transcript;
    let jobs: Vec<(&Transcript, GenomicVariant)> = variants
        .iter()
        .flat_map(|variant| {
            let end = variant.start + (variant.ref_bases().len() as u64).saturating_sub(1);
            index
                .overlapping(&variant.chrom, variant.start, end, flank)
                .into_iter()
                .map(move |transcript| (transcript, variant.clone()))
        })
        .collect();

    #[cfg(feature = "parallel")]
    let results = ferro_csq::parallel::annotate_batch(
        &annotator,
        || FastaProvider::new(reference),
        &jobs,
        &config.parallel,
    );
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<VariantConsequence, CsqError>> = {
        let provider = FastaProvider::new(reference)?;
        jobs.iter()
            .map(|(transcript, variant)| annotator.annotate(transcript, variant, &provider))
            .collect()
    };

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    writeln!(writer, "{}", HEADER)?;
    for ((transcript, variant), result) in jobs.iter().zip(&results) {
        match result {
            Ok(csq) => writeln!(writer, "{}", format_row(transcript, csq))?,
            Err(e) => eprintln!("ERROR: {} on {} - {}", variant, transcript.name(), e),
        }
    }
    writer.flush()?;

    let stats = BatchStats::from_results(&results);
    eprintln!(
        "Annotated {} variants against {} transcripts: {} succeeded, {} failed",
        variants.len(),
        index.len(),
        stats.success,
        stats.errors
    );
    Ok(())
}

fn run_convert(
    reference: &Path,
    transcripts: &Path,
    name: &str,
    hgvs: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = TranscriptIndex::from_json(transcripts)?;
    let transcript = index
        .get(name)
        .ok_or_else(|| format!("transcript {} not found in {}", name, transcripts.display()))?;
    let provider = FastaProvider::new(reference)?;
    let variant = hgvs_to_variant(transcript, hgvs, &provider)?;
    let allele = |bases: &str| match bases {
        "" => "-".to_string(),
        bases => bases.to_string(),
    };
    println!(
        "{}\t{}\t{}\t{}",
        variant.chrom,
        variant.start,
        allele(&variant.ref_allele),
        allele(&variant.alt_allele)
    );
    Ok(())
}
