//! Conversion of transcript HGVS descriptions to genomic variants
//!
//! The inverse of annotation: `c.`/`n.` descriptions are parsed, their
//! positions mapped through the transcript, and any stated reference bases
//! checked against the provider.
//!
//! Deletions, delins and substitutions carry their reference bases.
//! Insertions and duplications come back with an empty reference allele and
//! `start` set to the base they follow.

pub mod parser;

use crate::error::CsqError;
use crate::reference::{ReferenceProvider, Strand, Transcript};
use crate::sequence::reverse_complement;
use crate::variant::GenomicVariant;
pub use parser::{parse_description, HgvsDescription, NaEdit};

/// Convert a transcript-level HGVS description to a genomic variant
pub fn hgvs_to_variant<P: ReferenceProvider + ?Sized>(
    transcript: &Transcript,
    hgvs: &str,
    provider: &P,
) -> Result<GenomicVariant, CsqError> {
    let description = parse_description(hgvs)?;
    let invalid = |msg: String| CsqError::InvalidHgvs {
        input: hgvs.to_string(),
        msg,
    };

    if let Some(accession) = &description.accession {
        if accession != transcript.name() {
            return Err(invalid(format!(
                "describes {}, not {}",
                accession,
                transcript.name()
            )));
        }
    }
    if description.system != transcript.coordinate_system() {
        return Err(invalid(format!(
            "{} uses {} numbering",
            transcript.name(),
            transcript.coordinate_system().prefix()
        )));
    }

    let first = transcript.position_to_genomic(&description.start)?;
    let last = match &description.end {
        Some(end) => transcript.position_to_genomic(end)?,
        None => first,
    };
    let (lo, hi) = (first.min(last), first.max(last));
    let chrom = transcript.chromosome();
    let strand = transcript.strand();
    let forward = |seq: &str| match strand {
        Strand::Plus => seq.to_string(),
        Strand::Minus => reverse_complement(seq),
    };

    let reference = || provider.sequence_exact(chrom, lo, hi - lo + 1);
    // Stated bases are in transcript orientation.
    let verify = |stated: &str, found: &str| {
        if forward(stated) == found {
            Ok(())
        } else {
            Err(CsqError::ReferenceMismatch {
                location: hgvs.to_string(),
                expected: stated.to_string(),
                found: forward(found),
            })
        }
    };

    let variant = match &description.edit {
        NaEdit::Substitution {
            reference: stated,
            alternate,
        } => {
            if lo != hi {
                return Err(invalid("a substitution covers exactly one base".to_string()));
            }
            let found = reference()?;
            verify(&stated.to_string(), &found)?;
            GenomicVariant::new(chrom, lo, found, forward(&alternate.to_string()))
        }
        NaEdit::Deletion { sequence, length } => {
            let found = reference()?;
            if let Some(stated) = sequence {
                verify(stated, &found)?;
            }
            if let Some(n) = length {
                if *n != hi - lo + 1 {
                    return Err(invalid(format!(
                        "deletion of {} bases over {} positions",
                        n,
                        hi - lo + 1
                    )));
                }
            }
            GenomicVariant::new(chrom, lo, found, "")
        }
        NaEdit::Delins { deleted, inserted } => {
            let found = reference()?;
            if let Some(stated) = deleted {
                verify(stated, &found)?;
            }
            GenomicVariant::new(chrom, lo, found, forward(inserted))
        }
        NaEdit::Duplication { sequence } => {
            let found = reference()?;
            if let Some(stated) = sequence {
                verify(stated, &found)?;
            }
            GenomicVariant::new(chrom, hi, "", found)
        }
        NaEdit::Insertion { sequence } => {
            if description.end.is_none() || hi != lo + 1 {
                return Err(invalid(
                    "an insertion needs two adjacent flanking positions".to_string(),
                ));
            }
            GenomicVariant::new(chrom, lo, "", forward(sequence))
        }
    };
    Ok(variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Interval, MockProvider};

    //          1         2         3
    // 123456789012345678901234567890
    const GENOME: &str = "GGATGCCTTAGGTAAGCCCCAGAAATAGCC";

    fn transcript(strand: Strand) -> Transcript {
        let coding = match strand {
            Strand::Plus => (3, 26),
            Strand::Minus => (26, 3),
        };
        Transcript::new(
            "TX1",
            "GENE",
            "chr1",
            strand,
            vec![Interval::new(1, 12), Interval::new(21, 30)],
            Some(coding),
        )
        .unwrap()
    }

    fn provider() -> MockProvider {
        MockProvider::new().with_sequence("chr1", GENOME)
    }

    #[test]
    fn test_substitution_plus() {
        let v = hgvs_to_variant(&transcript(Strand::Plus), "c.4C>A", &provider()).unwrap();
        assert_eq!(v, GenomicVariant::new("chr1", 6, "C", "A"));
    }

    #[test]
    fn test_substitution_minus_is_complemented() {
        // c.1 is genomic 26 (T); transcript base is A
        let v = hgvs_to_variant(&transcript(Strand::Minus), "c.1A>G", &provider()).unwrap();
        assert_eq!(v, GenomicVariant::new("chr1", 26, "T", "C"));
    }

    #[test]
    fn test_intronic_deletion() {
        let v = hgvs_to_variant(&transcript(Strand::Plus), "c.10+1_10+2del", &provider())
            .unwrap();
        assert_eq!(v, GenomicVariant::new("chr1", 13, "TA", ""));
    }

    #[test]
    fn test_insertion_and_duplication() {
        let tx = transcript(Strand::Plus);
        let ins = hgvs_to_variant(&tx, "c.1_2insTTT", &provider()).unwrap();
        assert_eq!(ins, GenomicVariant::new("chr1", 3, "", "TTT"));

        let dup = hgvs_to_variant(&tx, "c.2_3dup", &provider()).unwrap();
        assert_eq!(dup, GenomicVariant::new("chr1", 5, "", "TG"));
    }

    #[test]
    fn test_reference_mismatch() {
        let err = hgvs_to_variant(&transcript(Strand::Plus), "c.4G>A", &provider()).unwrap_err();
        assert!(matches!(err, CsqError::ReferenceMismatch { .. }));
        let err =
            hgvs_to_variant(&transcript(Strand::Plus), "c.1_2delAA", &provider()).unwrap_err();
        assert!(matches!(err, CsqError::ReferenceMismatch { .. }));
    }

    #[test]
    fn test_wrong_transcript_or_system() {
        let tx = transcript(Strand::Plus);
        assert!(matches!(
            hgvs_to_variant(&tx, "TX2:c.4C>A", &provider()),
            Err(CsqError::InvalidHgvs { .. })
        ));
        assert!(matches!(
            hgvs_to_variant(&tx, "n.4C>A", &provider()),
            Err(CsqError::InvalidHgvs { .. })
        ));
        assert!(matches!(
            hgvs_to_variant(&tx, "c.1_3insA", &provider()),
            Err(CsqError::InvalidHgvs { .. })
        ));
    }
}
