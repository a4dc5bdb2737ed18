//! HGVS annotation of genomic variants against transcripts
//!
//! [`HgvsAnnotator::annotate`] normalizes a variant towards the transcript's
//! 3' end, locates the affected bases, and folds region, splice and protein
//! results into a [`VariantConsequence`].
//!
//! # Example
//!
//! ```
//! use ferro_csq::{GenomicVariant, HgvsAnnotator, Interval, MockProvider, Strand, Transcript};
//!
//! let provider = MockProvider::new().with_sequence("chr1", "ATGGCCAAATAAGGGCCC");
//! let transcript = Transcript::new(
//!     "TX1",
//!     "GENE",
//!     "chr1",
//!     Strand::Plus,
//!     vec![Interval::new(1, 18)],
//!     Some((1, 12)),
//! )
//! .unwrap();
//!
//! let annotator = HgvsAnnotator::default();
//! let variant = GenomicVariant::new("chr1", 5, "C", "A");
//! let csq = annotator.annotate(&transcript, &variant, &provider).unwrap();
//! assert_eq!(csq.hgvs_c, "c.5C>A");
//! assert_eq!(csq.hgvs_p, "p.Ala2Asp");
//! ```

pub mod protein;
pub mod splice;

use log::debug;
use std::collections::BTreeSet;

use crate::config::AnnotatorConfig;
use crate::coords::{Locus, Region, Segment};
use crate::effect::{Consequence, Impact, VariantConsequence};
use crate::error::CsqError;
use crate::normalize::{NormalizeConfig, NormalizedVariant, Normalizer};
use crate::reference::{Biotype, ReferenceProvider, Strand, Transcript};
use crate::sequence::{reverse_complement, CodonTable};
use crate::variant::{GenomicVariant, VariantKind};
pub use protein::{protein_change, CodingEdit, CodingSequence, ProteinChange};
pub use splice::{splice_hits, SpliceHits, SpliceQuery};

/// A normalized variant in the shape the annotator reasons about
///
/// Positions are genomic and 1-based; sequences are on the forward strand.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GenomicEdit {
    Substitution {
        pos: u64,
        ref_base: String,
        alt_base: String,
    },
    Deletion {
        start: u64,
        end: u64,
    },
    Insertion {
        after: u64,
        inserted: String,
    },
    /// An insertion that repeats the bases `[start, end]`
    Duplication {
        start: u64,
        end: u64,
        after: u64,
        inserted: String,
    },
    Delins {
        start: u64,
        end: u64,
        inserted: String,
    },
}

impl GenomicEdit {
    fn from_normalized<P: ReferenceProvider + ?Sized>(
        variant: &NormalizedVariant,
        strand: Strand,
        provider: &P,
    ) -> Result<Self, CsqError> {
        Ok(match variant.kind {
            VariantKind::Snv => GenomicEdit::Substitution {
                pos: variant.start,
                ref_base: variant.ref_allele.clone(),
                alt_base: variant.alt_allele.clone(),
            },
            VariantKind::Deletion => GenomicEdit::Deletion {
                start: variant.start,
                end: variant.end(),
            },
            VariantKind::Delins => GenomicEdit::Delins {
                start: variant.start,
                end: variant.end(),
                inserted: variant.alt_allele.clone(),
            },
            VariantKind::Insertion => {
                let after = variant.start;
                let inserted = variant.alt_allele.clone();
                match duplicated_span(provider, &variant.chrom, after, &inserted, strand)? {
                    Some((start, end)) => GenomicEdit::Duplication {
                        start,
                        end,
                        after,
                        inserted,
                    },
                    None => GenomicEdit::Insertion { after, inserted },
                }
            }
        })
    }

    /// Lowest and highest located base
    fn span(&self) -> (u64, u64) {
        match *self {
            GenomicEdit::Substitution { pos, .. } => (pos, pos),
            GenomicEdit::Insertion { after, .. } => (after, after + 1),
            GenomicEdit::Deletion { start, end }
            | GenomicEdit::Delins { start, end, .. }
            | GenomicEdit::Duplication { start, end, .. } => (start, end),
        }
    }

    /// Bases used for region and protein classification
    ///
    /// Insertions and duplications are placed by the two bases flanking the
    /// new sequence; a duplication's copied span only matters for `c.`.
    fn site(&self) -> (u64, u64) {
        match *self {
            GenomicEdit::Insertion { after, .. } | GenomicEdit::Duplication { after, .. } => {
                (after, after + 1)
            }
            _ => self.span(),
        }
    }

    fn is_insertion(&self) -> bool {
        matches!(
            self,
            GenomicEdit::Insertion { .. } | GenomicEdit::Duplication { .. }
        )
    }

    fn splice_query(&self) -> SpliceQuery {
        match *self {
            GenomicEdit::Insertion { after, .. } | GenomicEdit::Duplication { after, .. } => {
                SpliceQuery::Insertion(after)
            }
            _ => {
                let (start, end) = self.span();
                SpliceQuery::Span(start, end)
            }
        }
    }
}

/// The duplicated span when `inserted` repeats the bases 5' of the insertion
/// point in transcript direction
fn duplicated_span<P: ReferenceProvider + ?Sized>(
    provider: &P,
    chrom: &str,
    after: u64,
    inserted: &str,
    strand: Strand,
) -> Result<Option<(u64, u64)>, CsqError> {
    let len = inserted.len() as u64;
    let (start, end) = match strand {
        Strand::Plus if after < len => return Ok(None),
        Strand::Plus => (after - len + 1, after),
        Strand::Minus => (after + 1, after + len),
    };
    match provider.sequence_exact(chrom, start, len) {
        Ok(seq) if seq.eq_ignore_ascii_case(inserted) => Ok(Some((start, end))),
        Ok(_) | Err(CsqError::SequenceNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Computes HGVS descriptions and consequence tags
#[derive(Debug, Clone, Default)]
pub struct HgvsAnnotator {
    config: AnnotatorConfig,
}

impl HgvsAnnotator {
    /// Create an annotator, validating the configuration
    pub fn new(config: AnnotatorConfig) -> Result<Self, CsqError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate a variant against one transcript
    ///
    /// The variant is normalized first, so callers may pass VCF-style
    /// anchored alleles. Variants farther than `max_dist_to_transcript` from
    /// the transcript are rejected with [`CsqError::OutOfRange`].
    pub fn annotate<P: ReferenceProvider + ?Sized>(
        &self,
        transcript: &Transcript,
        variant: &GenomicVariant,
        provider: &P,
    ) -> Result<VariantConsequence, CsqError> {
        if variant.chrom != transcript.chromosome() {
            return Err(CsqError::InvalidVariant {
                variant: variant.to_string(),
                msg: format!(
                    "transcript {} is on {}",
                    transcript.name(),
                    transcript.chromosome()
                ),
            });
        }

        let strand = transcript.strand();
        let normalizer = Normalizer::with_config(
            provider,
            NormalizeConfig::for_strand(strand).with_window_size(self.config.window_size),
        );
        let normalized = normalizer.normalize(variant)?;
        let edit = GenomicEdit::from_normalized(&normalized, strand, provider)?;
        let allele = if normalized.alt_allele.is_empty() {
            "-".to_string()
        } else {
            normalized.alt_allele.clone()
        };

        if let Some(side) = self.flanking_side(transcript, &edit, variant)? {
            return Ok(VariantConsequence {
                allele,
                consequences: BTreeSet::from([side, Consequence::IntergenicVariant]),
                impact: Impact::Modifier,
                ..Default::default()
            });
        }

        let locate = |(lo, hi): (u64, u64)| match strand {
            Strand::Plus => (transcript.locate(lo), transcript.locate(hi)),
            Strand::Minus => (transcript.locate(hi), transcript.locate(lo)),
        };
        let (first, last) = locate(edit.site());
        let hits = splice_hits(transcript, edit.splice_query(), &self.config);

        let mut consequences = region_tags(transcript, &edit, &first, &last);
        consequences.extend(splice_tags(&hits));
        let (exon_number, intron_number) = numbering(&edit, &first, &last);
        let hgvs_c = {
            let (from, to) = locate(edit.span());
            format_hgvs_c(transcript, &edit, &from, &to)
        };

        let hgvs_p = match protein_effect(transcript, &edit, &first, &last, &hits, provider)? {
            Some(change) => {
                if !change.consequences.is_empty() {
                    consequences.remove(&Consequence::CodingSequenceVariant);
                }
                consequences.extend(change.consequences);
                change.hgvs_p
            }
            None => String::new(),
        };
        let impact = Impact::max_of(&consequences);

        Ok(VariantConsequence {
            allele,
            hgvs_c,
            hgvs_p,
            exon_number,
            intron_number,
            consequences,
            impact,
        })
    }

    /// The up/downstream tag of a variant entirely outside the transcript
    fn flanking_side(
        &self,
        transcript: &Transcript,
        edit: &GenomicEdit,
        variant: &GenomicVariant,
    ) -> Result<Option<Consequence>, CsqError> {
        let (first, last) = (transcript.start(), transcript.end());
        let (below, distance) = match *edit {
            GenomicEdit::Insertion { after, .. } if after >= last => (false, after + 1 - last),
            GenomicEdit::Insertion { after, .. } if after < first => (true, first - after),
            GenomicEdit::Insertion { .. } => return Ok(None),
            _ => {
                let (start, end) = edit.span();
                if end < first {
                    (true, first - end)
                } else if start > last {
                    (false, start - last)
                } else {
                    return Ok(None);
                }
            }
        };
        if distance > self.config.max_dist_to_transcript {
            return Err(CsqError::OutOfRange {
                variant: variant.to_string(),
                transcript: transcript.name().to_string(),
                distance,
                max_dist: self.config.max_dist_to_transcript,
            });
        }
        let upstream = below == (transcript.strand() == Strand::Plus);
        Ok(Some(if upstream {
            Consequence::UpstreamGeneVariant
        } else {
            Consequence::DownstreamGeneVariant
        }))
    }
}

fn is_exonic_cds(locus: &Locus) -> bool {
    matches!(locus.region, Region::Exon(_)) && locus.position.segment() == Segment::Cds
}

fn region_tags(
    transcript: &Transcript,
    edit: &GenomicEdit,
    first: &Locus,
    last: &Locus,
) -> BTreeSet<Consequence> {
    let mut tags = BTreeSet::new();
    for locus in [first, last] {
        match (locus.region, locus.position.segment()) {
            (Region::Upstream(_), _) => tags.insert(Consequence::UpstreamGeneVariant),
            (Region::Downstream(_), _) => tags.insert(Consequence::DownstreamGeneVariant),
            (Region::Intron(_), _) => {
                if !transcript.is_coding() {
                    tags.insert(Consequence::NonCodingTranscriptVariant);
                }
                tags.insert(Consequence::IntronVariant)
            }
            (Region::Exon(_), Segment::FivePrimeUtr) => tags.insert(Consequence::FivePrimeUtrVariant),
            (Region::Exon(_), Segment::Cds) => tags.insert(Consequence::CodingSequenceVariant),
            (Region::Exon(_), Segment::ThreePrimeUtr) => {
                tags.insert(Consequence::ThreePrimeUtrVariant)
            }
            (Region::Exon(_), Segment::NonCoding) => {
                tags.insert(Consequence::NonCodingTranscriptExonVariant)
            }
        };
    }

    // Deletions can remove coding exons without either end landing in one.
    let (lo, hi) = edit.span();
    let spans_coding = !edit.is_insertion()
        && transcript.coding_regions().iter().any(|r| r.overlaps(lo, hi));
    if spans_coding {
        tags.insert(Consequence::CodingSequenceVariant);
    }
    if transcript.biotype() == Biotype::NonsenseMediatedDecay {
        tags.insert(Consequence::NmdTranscriptVariant);
    }
    tags
}

fn splice_tags(hits: &SpliceHits) -> Vec<Consequence> {
    let mut tags = Vec::new();
    if hits.donor {
        tags.push(Consequence::SpliceDonorVariant);
    }
    if hits.acceptor {
        tags.push(Consequence::SpliceAcceptorVariant);
    }
    if hits.region {
        tags.push(Consequence::SpliceRegionVariant);
    }
    tags
}

fn numbering(edit: &GenomicEdit, first: &Locus, last: &Locus) -> (Option<u32>, Option<u32>) {
    let insertion = edit.is_insertion();
    match (first.region, last.region) {
        (Region::Exon(a), Region::Exon(b)) if a == b => (Some(a), None),
        (Region::Intron(a), Region::Intron(b)) if a == b => (None, Some(a)),
        (Region::Exon(exon), Region::Intron(_)) | (Region::Intron(_), Region::Exon(exon))
            if insertion =>
        {
            (Some(exon), None)
        }
        _ => (None, None),
    }
}

fn oriented(seq: &str, strand: Strand) -> String {
    match strand {
        Strand::Plus => seq.to_string(),
        Strand::Minus => reverse_complement(seq),
    }
}

fn format_hgvs_c(transcript: &Transcript, edit: &GenomicEdit, first: &Locus, last: &Locus) -> String {
    let prefix = transcript.coordinate_system().prefix();
    let strand = transcript.strand();
    let (lo, hi) = edit.span();
    let range = if lo == hi {
        first.position.to_string()
    } else {
        format!("{}_{}", first.position, last.position)
    };

    match edit {
        GenomicEdit::Substitution {
            ref_base, alt_base, ..
        } => format!(
            "{}{}{}>{}",
            prefix,
            first.position,
            oriented(ref_base, strand),
            oriented(alt_base, strand)
        ),
        GenomicEdit::Deletion { .. } => format!("{}{}del", prefix, range),
        GenomicEdit::Insertion { inserted, .. } => format!(
            "{}{}_{}ins{}",
            prefix,
            first.position,
            last.position,
            oriented(inserted, strand)
        ),
        GenomicEdit::Duplication { .. } => format!("{}{}dup", prefix, range),
        GenomicEdit::Delins { inserted, .. } => {
            format!("{}{}delins{}", prefix, range, oriented(inserted, strand))
        }
    }
}

/// Protein consequence, or `None` when no `p.` description applies
fn protein_effect<P: ReferenceProvider + ?Sized>(
    transcript: &Transcript,
    edit: &GenomicEdit,
    first: &Locus,
    last: &Locus,
    hits: &SpliceHits,
    provider: &P,
) -> Result<Option<ProteinChange>, CsqError> {
    if !transcript.is_coding() {
        return Ok(None);
    }
    let loci = [first, last];
    let is_intron = |l: &&Locus| matches!(l.region, Region::Intron(_));

    if loci.iter().all(is_intron) && first.region == last.region {
        let coding_flank = loci.iter().any(|l| l.position.segment() == Segment::Cds);
        return Ok((hits.site() && coding_flank).then(|| ProteinChange::unknown(Vec::new())));
    }

    let touches_cds = match edit {
        GenomicEdit::Insertion { .. } | GenomicEdit::Duplication { .. } => {
            let mut exonic = loci
                .iter()
                .filter(|l| matches!(l.region, Region::Exon(_)))
                .peekable();
            exonic.peek().is_some() && exonic.all(|l| is_exonic_cds(l))
        }
        _ => {
            let (lo, hi) = edit.span();
            transcript.coding_regions().iter().any(|r| r.overlaps(lo, hi))
                || loci.iter().any(|l| is_exonic_cds(l))
        }
    };
    if !touches_cds {
        return Ok(None);
    }

    let ambiguous = loci.iter().any(|l| !matches!(l.region, Region::Exon(_)))
        || first.region != last.region
        || first.position.segment() != last.position.segment()
        || hits.site();
    if ambiguous {
        debug!(
            "{}: {}_{} has no unambiguous reading frame, reporting p.?",
            transcript.name(),
            first.position,
            last.position
        );
        return Ok(Some(ProteinChange::unknown(lost_codons(transcript, edit)?)));
    }

    let cds_index = |l: &Locus| {
        l.position.cds_index().map(|n| n as usize).ok_or_else(|| {
            CsqError::coordinates(format!("{} is not a coding position", l.position))
        })
    };
    let a = cds_index(first)?;
    let b = cds_index(last)?;
    let strand = transcript.strand();
    let bases = |seq: &str| oriented(seq, strand).into_bytes();

    let coding_edit = match edit {
        GenomicEdit::Substitution { alt_base, .. } => CodingEdit {
            start: a - 1,
            deleted: 1,
            inserted: bases(alt_base),
        },
        GenomicEdit::Deletion { .. } => CodingEdit {
            start: a - 1,
            deleted: b - a + 1,
            inserted: Vec::new(),
        },
        GenomicEdit::Delins { inserted, .. } => CodingEdit {
            start: a - 1,
            deleted: b - a + 1,
            inserted: bases(inserted),
        },
        // Flanks are c.a and c.a+1; the new bases precede 0-based index a.
        GenomicEdit::Insertion { inserted, .. } | GenomicEdit::Duplication { inserted, .. } => {
            CodingEdit {
                start: a,
                deleted: 0,
                inserted: bases(inserted),
            }
        }
    };

    let cds = CodingSequence::fetch(transcript, provider)?;
    let table = CodonTable::for_chromosome(transcript.chromosome());
    protein_change(&cds, &coding_edit, table).map(Some)
}

/// Start and stop codons removed by a deletion with no reading frame to translate
fn lost_codons(transcript: &Transcript, edit: &GenomicEdit) -> Result<Vec<Consequence>, CsqError> {
    let length = transcript.coding_length();
    if edit.is_insertion() || length < 3 {
        return Ok(Vec::new());
    }
    let (lo, hi) = edit.span();
    let removes = |first: u64| -> Result<bool, CsqError> {
        for n in first..first + 3 {
            let pos = transcript.cdna_to_genomic(n)?;
            if lo <= pos && pos <= hi {
                return Ok(true);
            }
        }
        Ok(false)
    };

    let mut tags = Vec::new();
    if removes(1)? {
        tags.push(Consequence::StartLost);
    }
    if removes(length - 2)? {
        tags.push(Consequence::StopLost);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Interval, MockProvider};

    // 1-based ruler for GENOME:
    //          1         2         3         4         5
    // 123456789012345678901234567890123456789012345678901234
    const GENOME: &str = "CCCCCATGGCCAAGGGTAAGTTTTTTTTCAGAGAAGAAGTAGCATTTGAGGCCC";

    // Exons 4-15 and 32-49, coding 6..42: ATG GCC AAG G|AG AAG AAG TAG
    fn plus_transcript() -> Transcript {
        Transcript::new(
            "TX1",
            "GENE1",
            "chr1",
            Strand::Plus,
            vec![Interval::new(4, 15), Interval::new(32, 49)],
            Some((6, 42)),
        )
        .unwrap()
    }

    fn provider() -> MockProvider {
        MockProvider::new().with_sequence("chr1", GENOME)
    }

    fn annotate(variant: GenomicVariant) -> VariantConsequence {
        HgvsAnnotator::default()
            .annotate(&plus_transcript(), &variant, &provider())
            .unwrap()
    }

    #[test]
    fn test_missense_snv() {
        // c.5 C>A: GCC -> GAC
        let csq = annotate(GenomicVariant::new("chr1", 10, "C", "A"));
        assert_eq!(csq.hgvs_c, "c.5C>A");
        assert_eq!(csq.hgvs_p, "p.Ala2Asp");
        assert_eq!(csq.exon_number, Some(1));
        assert!(csq.has(Consequence::MissenseVariant));
        assert!(!csq.has(Consequence::CodingSequenceVariant));
        assert_eq!(csq.impact, Impact::Moderate);
    }

    #[test]
    fn test_split_codon_across_exons() {
        // c.10 G (last exon-1 base) and c.11 A: codon 4 is G|AG = Glu
        let csq = annotate(GenomicVariant::new("chr1", 33, "A", "T"));
        assert_eq!(csq.hgvs_c, "c.11A>T");
        assert_eq!(csq.hgvs_p, "p.Glu4Val");
        assert_eq!(csq.exon_number, Some(2));
    }

    #[test]
    fn test_donor_site_snv() {
        // c.10+2
        let csq = annotate(GenomicVariant::new("chr1", 17, "T", "C"));
        assert_eq!(csq.hgvs_c, "c.10+2T>C");
        assert_eq!(csq.hgvs_p, "p.?");
        assert_eq!(csq.intron_number, Some(1));
        assert!(csq.has(Consequence::SpliceDonorVariant));
        assert!(csq.has(Consequence::SpliceRegionVariant));
        assert!(csq.has(Consequence::IntronVariant));
        assert_eq!(csq.impact, Impact::High);
    }

    #[test]
    fn test_deep_intronic_snv() {
        // c.10+7 lies in the splice region but not the donor site
        let csq = annotate(GenomicVariant::new("chr1", 22, "T", "G"));
        assert_eq!(csq.hgvs_c, "c.10+7T>G");
        assert_eq!(csq.hgvs_p, "");
        assert!(csq.has(Consequence::SpliceRegionVariant));
        assert!(!csq.has(Consequence::SpliceDonorVariant));
        // c.11-7 on the acceptor side
        let csq = annotate(GenomicVariant::new("chr1", 25, "T", "G"));
        assert_eq!(csq.hgvs_c, "c.11-7T>G");
    }

    #[test]
    fn test_inframe_deletion_shifted() {
        // Delete one AAG of the repeat in exon 2: c.13_15 shifts to c.16_18
        let csq = annotate(GenomicVariant::new("chr1", 33, "GAAG", "G"));
        assert_eq!(csq.hgvs_c, "c.16_18del");
        assert_eq!(csq.hgvs_p, "p.Lys6del");
        assert!(csq.has(Consequence::InframeDeletion));
    }

    #[test]
    fn test_duplication() {
        let csq = annotate(GenomicVariant::new("chr1", 33, "G", "GAAG"));
        assert_eq!(csq.hgvs_c, "c.16_18dup");
        assert_eq!(csq.hgvs_p, "p.Lys6dup");
        assert!(csq.has(Consequence::InframeInsertion));
    }

    #[test]
    fn test_frameshift() {
        // One C of c.5_6 deleted: ATG GCA AGG AGA AGA AGT AGC ATT TGA
        let csq = annotate(GenomicVariant::new("chr1", 9, "GC", "G"));
        assert_eq!(csq.hgvs_c, "c.6del");
        assert_eq!(csq.hgvs_p, "p.Lys3ArgfsTer7");
        assert!(csq.has(Consequence::FrameshiftVariant));
        assert_eq!(csq.impact, Impact::High);
    }

    #[test]
    fn test_utr_variants() {
        let csq = annotate(GenomicVariant::new("chr1", 5, "C", "A"));
        assert_eq!(csq.hgvs_c, "c.-1C>A");
        assert_eq!(csq.hgvs_p, "");
        assert!(csq.has(Consequence::FivePrimeUtrVariant));

        let csq = annotate(GenomicVariant::new("chr1", 45, "T", "A"));
        assert_eq!(csq.hgvs_c, "c.*3T>A");
        assert_eq!(csq.hgvs_p, "");
        assert!(csq.has(Consequence::ThreePrimeUtrVariant));
        assert_eq!(csq.impact, Impact::Modifier);
    }

    #[test]
    fn test_upstream_and_out_of_range() {
        let transcript = plus_transcript();
        let annotator =
            HgvsAnnotator::new(AnnotatorConfig::new().with_max_dist_to_transcript(1)).unwrap();
        let csq = annotator
            .annotate(&transcript, &GenomicVariant::new("chr1", 3, "C", "G"), &provider())
            .unwrap();
        assert_eq!(
            csq.consequences,
            BTreeSet::from([
                Consequence::UpstreamGeneVariant,
                Consequence::IntergenicVariant
            ])
        );
        assert_eq!(csq.hgvs_c, "");

        let err = annotator
            .annotate(&transcript, &GenomicVariant::new("chr1", 1, "C", "G"), &provider())
            .unwrap_err();
        assert!(matches!(err, CsqError::OutOfRange { distance: 3, .. }));
    }

    #[test]
    fn test_wrong_chromosome() {
        let err = HgvsAnnotator::default()
            .annotate(
                &plus_transcript(),
                &GenomicVariant::new("chr2", 10, "C", "A"),
                &provider(),
            )
            .unwrap_err();
        assert!(matches!(err, CsqError::InvalidVariant { .. }));
    }
}
