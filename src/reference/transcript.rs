//! Transcript coordinate model
//!
//! # Coordinate System
//!
//! All genomic coordinates in this module are **1-based inclusive**:
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `Interval.start`, `Interval.end` | 1-based | Genomic, inclusive |
//! | `coding_start` | 1-based | First base of the start codon, in transcript direction |
//! | `coding_end` | 1-based | Last base of the stop codon, in transcript direction |
//! | exonic index | 1-based | Position along the spliced transcript, 5' to 3' |
//!
//! Regions are always stored in ascending genomic order. Exon and intron
//! numbers count from the transcript's 5' end, so they run backwards along the
//! genome on the minus strand, and `coding_start > coding_end` there.

use crate::coords::{Anchor, CoordinateSystem, Locus, Region, TxPosition};
use crate::error::CsqError;
use crate::sequence::is_mitochondrial;
use serde::{Deserialize, Serialize};

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// Gene-model source the transcript was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    /// Curated consensus CDS
    Ccds,
    #[default]
    Ensembl,
}

/// Transcript biotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biotype {
    ProteinCoding,
    NonsenseMediatedDecay,
    NonCoding,
}

/// A closed genomic interval (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bases covered
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end && end >= self.start
    }

    /// Intersection with `[start, end]`, if any
    pub fn intersect(&self, start: u64, end: u64) -> Option<Interval> {
        let s = self.start.max(start);
        let e = self.end.min(end);
        (s <= e).then(|| Interval::new(s, e))
    }
}

/// Result of an exon lookup for a genomic interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExonOverlap {
    /// Lies within one exon (1-based, transcript order)
    Exon(u32),
    /// Overlaps more than one exon, or one exon only partly
    MultipleExons,
    /// Overlaps no exon
    NotFound,
}

impl ExonOverlap {
    /// The exon number, if exactly one exon is hit
    pub fn number(&self) -> Option<u32> {
        match self {
            ExonOverlap::Exon(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodingBounds {
    start: u64,
    end: u64,
    start_index: u64,
    end_index: u64,
}

/// An immutable transcript model
///
/// Construct with [`Transcript::new`]; every invariant is checked there, and the
/// coding/UTR partitions are derived once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TranscriptRecord", into = "TranscriptRecord")]
pub struct Transcript {
    name: String,
    gene: String,
    source: TranscriptSource,
    strand: Strand,
    chromosome: String,
    biotype: Biotype,
    regions: Vec<Interval>,
    coding: Option<CodingBounds>,
    coding_regions: Vec<Interval>,
    utr5: Vec<Interval>,
    utr3: Vec<Interval>,
}

impl Transcript {
    /// Build a transcript from ordered exon regions and optional coding bounds.
    ///
    /// `coding` is `(coding_start, coding_end)` in transcript direction.
    pub fn new(
        name: impl Into<String>,
        gene: impl Into<String>,
        chromosome: impl Into<String>,
        strand: Strand,
        regions: Vec<Interval>,
        coding: Option<(u64, u64)>,
    ) -> Result<Self, CsqError> {
        let name = name.into();
        let malformed = |msg: String| CsqError::MalformedTranscript {
            transcript: name.clone(),
            msg,
        };

        if regions.is_empty() {
            return Err(malformed("no regions".to_string()));
        }
        for region in &regions {
            if region.start == 0 || region.start > region.end {
                return Err(malformed(format!(
                    "invalid region {}-{}",
                    region.start, region.end
                )));
            }
        }
        for pair in regions.windows(2) {
            if pair[1].start <= pair[0].end + 1 {
                return Err(malformed(format!(
                    "regions {}-{} and {}-{} are misordered, overlapping or adjacent",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        let coding = match coding {
            None => None,
            Some((start, end)) => {
                let ordered = match strand {
                    Strand::Plus => start <= end,
                    Strand::Minus => start >= end,
                };
                if !ordered {
                    return Err(malformed(format!(
                        "coding start {} and end {} are inverted for strand {}",
                        start, end, strand
                    )));
                }
                let start_index = exonic_index(&regions, strand, start).ok_or_else(|| {
                    malformed(format!("coding start {} lies outside all regions", start))
                })?;
                let end_index = exonic_index(&regions, strand, end).ok_or_else(|| {
                    malformed(format!("coding end {} lies outside all regions", end))
                })?;
                Some(CodingBounds {
                    start,
                    end,
                    start_index,
                    end_index,
                })
            }
        };

        let (coding_regions, utr5, utr3) = match coding {
            None => (Vec::new(), Vec::new(), Vec::new()),
            Some(bounds) => partition(&regions, strand, bounds.start, bounds.end),
        };

        Ok(Self {
            name,
            gene: gene.into(),
            source: TranscriptSource::default(),
            strand,
            chromosome: chromosome.into(),
            biotype: if coding.is_some() {
                Biotype::ProteinCoding
            } else {
                Biotype::NonCoding
            },
            regions,
            coding,
            coding_regions,
            utr5,
            utr3,
        })
    }

    /// Set the gene-model source
    pub fn with_source(mut self, source: TranscriptSource) -> Self {
        self.source = source;
        self
    }

    /// Set the biotype
    pub fn with_biotype(mut self, biotype: Biotype) -> Self {
        self.biotype = biotype;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn source(&self) -> TranscriptSource {
        self.source
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn biotype(&self) -> Biotype {
        self.biotype
    }

    /// Exon regions in ascending genomic order
    pub fn regions(&self) -> &[Interval] {
        &self.regions
    }

    /// Coding parts of the exons in ascending genomic order
    pub fn coding_regions(&self) -> &[Interval] {
        &self.coding_regions
    }

    /// 5' UTR parts of the exons in ascending genomic order
    pub fn utr5_regions(&self) -> &[Interval] {
        &self.utr5
    }

    /// 3' UTR parts of the exons in ascending genomic order
    pub fn utr3_regions(&self) -> &[Interval] {
        &self.utr3
    }

    pub fn is_coding(&self) -> bool {
        self.coding.is_some()
    }

    pub fn is_plus_strand(&self) -> bool {
        self.strand == Strand::Plus
    }

    pub fn is_mitochondrial(&self) -> bool {
        is_mitochondrial(&self.chromosome)
    }

    /// Genomic position of the first start-codon base
    pub fn coding_start(&self) -> Option<u64> {
        self.coding.map(|c| c.start)
    }

    /// Genomic position of the last stop-codon base
    pub fn coding_end(&self) -> Option<u64> {
        self.coding.map(|c| c.end)
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        if self.is_coding() {
            CoordinateSystem::Coding
        } else {
            CoordinateSystem::NonCoding
        }
    }

    /// Lowest genomic position covered by the transcript
    pub fn start(&self) -> u64 {
        self.regions[0].start
    }

    /// Highest genomic position covered by the transcript
    pub fn end(&self) -> u64 {
        self.regions[self.regions.len() - 1].end
    }

    pub fn exon_count(&self) -> usize {
        self.regions.len()
    }

    /// Length of the spliced transcript
    pub fn transcript_length(&self) -> u64 {
        self.regions.iter().map(Interval::len).sum()
    }

    /// Length of the coding sequence including the stop codon
    pub fn coding_length(&self) -> u64 {
        self.coding_regions.iter().map(Interval::len).sum()
    }

    /// Whether `[start, end]` overlaps the transcript span
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end() && end >= self.start()
    }

    /// Exons in transcript order with their numbers
    pub fn exons(&self) -> Vec<(u32, Interval)> {
        let n = self.regions.len();
        (0..n)
            .map(|i| {
                let idx = match self.strand {
                    Strand::Plus => i,
                    Strand::Minus => n - 1 - i,
                };
                ((i + 1) as u32, self.regions[idx])
            })
            .collect()
    }

    /// Introns in transcript order with their numbers
    pub fn introns(&self) -> Vec<(u32, Interval)> {
        let n = self.regions.len();
        let mut introns: Vec<(u32, Interval)> = self
            .regions
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let number = match self.strand {
                    Strand::Plus => i + 1,
                    Strand::Minus => n - 1 - i,
                };
                (number as u32, Interval::new(pair[0].end + 1, pair[1].start - 1))
            })
            .collect();
        introns.sort_by_key(|(number, _)| *number);
        introns
    }

    /// Genomic position of coding base `n` (1-based)
    pub fn cdna_to_genomic(&self, n: u64) -> Result<u64, CsqError> {
        if !self.is_coding() {
            return Err(CsqError::coordinates(format!(
                "transcript {} is non-coding",
                self.name
            )));
        }
        let length = self.coding_length();
        if n < 1 || n > length {
            return Err(CsqError::coordinates(format!(
                "coding position {} outside 1-{} of {}",
                n, length, self.name
            )));
        }
        walk(&self.coding_regions, self.strand, n).ok_or_else(|| {
            CsqError::coordinates(format!("coding position {} not mappable", n))
        })
    }

    /// Genomic position of transcript base `n` (1-based)
    pub fn ndna_to_genomic(&self, n: u64) -> Result<u64, CsqError> {
        let length = self.transcript_length();
        if n < 1 || n > length {
            return Err(CsqError::coordinates(format!(
                "transcript position {} outside 1-{} of {}",
                n, length, self.name
            )));
        }
        walk(&self.regions, self.strand, n).ok_or_else(|| {
            CsqError::coordinates(format!("transcript position {} not mappable", n))
        })
    }

    /// Exon membership of `[start, end]`
    ///
    /// An interval that only partly overlaps a single exon counts as
    /// [`ExonOverlap::MultipleExons`].
    pub fn exon_number(&self, start: u64, end: u64) -> ExonOverlap {
        let mut hits = self
            .exons()
            .into_iter()
            .filter(|(_, exon)| exon.overlaps(start, end));
        match (hits.next(), hits.next()) {
            (None, _) => ExonOverlap::NotFound,
            (Some((number, exon)), None) if exon.start <= start && end <= exon.end => {
                ExonOverlap::Exon(number)
            }
            _ => ExonOverlap::MultipleExons,
        }
    }

    /// Intron number if `[start, end]` lies entirely within one intron
    pub fn intron_number(&self, start: u64, end: u64) -> Option<u32> {
        self.introns()
            .into_iter()
            .find(|(_, intron)| intron.start <= start && end <= intron.end)
            .map(|(number, _)| number)
    }

    /// Locate a genomic base relative to this transcript.
    ///
    /// Intronic bases are anchored to the nearest exon boundary; a base
    /// exactly in the middle of an intron is anchored to the 5' exon.
    pub fn locate(&self, pos: u64) -> Locus {
        let first = self.start();
        let last = self.end();
        let length = self.transcript_length() as i64;

        if pos < first || pos > last {
            let (before_first, distance) = if pos < first {
                (true, first - pos)
            } else {
                (false, pos - last)
            };
            let upstream = before_first == (self.strand == Strand::Plus);
            let (region, index) = if upstream {
                (Region::Upstream(distance), 1 - distance as i64)
            } else {
                (Region::Downstream(distance), length + distance as i64)
            };
            return Locus {
                region,
                position: TxPosition::exonic(self.anchor_at(index)),
            };
        }

        for (number, exon) in self.exons() {
            if exon.contains(pos) {
                let index = self.exonic_index_unchecked(pos);
                return Locus {
                    region: Region::Exon(number),
                    position: TxPosition::exonic(self.anchor_at(index as i64)),
                };
            }
        }

        // Intronic: find the flanking exons in genomic order.
        let i = self
            .regions
            .windows(2)
            .position(|pair| pair[0].end < pos && pos < pair[1].start)
            .unwrap_or(0);
        let left = self.regions[i];
        let right = self.regions[i + 1];
        let to_left = (pos - left.end) as i64;
        let to_right = (right.start - pos) as i64;
        let n = self.regions.len();

        let (number, anchor_pos, offset) = match self.strand {
            Strand::Plus => {
                let number = (i + 1) as u32;
                if to_left <= to_right {
                    (number, left.end, to_left)
                } else {
                    (number, right.start, -to_right)
                }
            }
            Strand::Minus => {
                let number = (n - 1 - i) as u32;
                if to_right <= to_left {
                    (number, right.start, to_right)
                } else {
                    (number, left.end, -to_left)
                }
            }
        };
        let index = self.exonic_index_unchecked(anchor_pos);
        Locus {
            region: Region::Intron(number),
            position: TxPosition::with_offset(self.anchor_at(index as i64), offset),
        }
    }

    /// Genomic position of a structured transcript position
    pub fn position_to_genomic(&self, position: &TxPosition) -> Result<u64, CsqError> {
        let index = self.anchor_index(position.anchor)?;
        let length = self.transcript_length() as i64;
        let base = if index >= 1 && index <= length {
            walk(&self.regions, self.strand, index as u64).ok_or_else(|| {
                CsqError::coordinates(format!("position {} not mappable", position))
            })? as i64
        } else {
            let beyond = if index < 1 { 1 - index } else { index - length };
            let five_prime = index < 1;
            match (self.strand, five_prime) {
                (Strand::Plus, true) | (Strand::Minus, false) => self.start() as i64 - beyond,
                (Strand::Plus, false) | (Strand::Minus, true) => self.end() as i64 + beyond,
            }
        };

        let genomic = match self.strand {
            Strand::Plus => base + position.offset,
            Strand::Minus => base - position.offset,
        };
        if genomic < 1 {
            return Err(CsqError::coordinates(format!(
                "position {} maps before the chromosome start",
                position
            )));
        }
        let genomic = genomic as u64;
        if position.offset != 0 {
            let in_span = genomic >= self.start() && genomic <= self.end();
            let in_exon = self.regions.iter().any(|r| r.contains(genomic));
            let anchored_at_boundary = self
                .regions
                .iter()
                .any(|r| base as u64 == r.start || base as u64 == r.end);
            if !in_span || in_exon || !anchored_at_boundary {
                return Err(CsqError::coordinates(format!(
                    "intronic position {} is not inside an intron of {}",
                    position, self.name
                )));
            }
        }
        Ok(genomic)
    }

    fn exonic_index_unchecked(&self, pos: u64) -> u64 {
        exonic_index(&self.regions, self.strand, pos).unwrap_or(0)
    }

    /// Anchor for a (possibly out-of-transcript) exonic index
    fn anchor_at(&self, index: i64) -> Anchor {
        match self.coding {
            Some(bounds) => {
                let s = bounds.start_index as i64;
                let e = bounds.end_index as i64;
                if index < s {
                    Anchor::Cds(index - s)
                } else if index <= e {
                    Anchor::Cds(index - s + 1)
                } else {
                    Anchor::Utr3((index - e) as u64)
                }
            }
            None => {
                let length = self.transcript_length() as i64;
                if index < 1 {
                    Anchor::Tx(index - 1)
                } else if index <= length {
                    Anchor::Tx(index)
                } else {
                    Anchor::TxDownstream((index - length) as u64)
                }
            }
        }
    }

    /// Exonic index for an anchor (inverse of `anchor_at`)
    fn anchor_index(&self, anchor: Anchor) -> Result<i64, CsqError> {
        let wrong_system = || {
            CsqError::coordinates(format!(
                "position {} does not use the {} numbering of {}",
                anchor,
                self.coordinate_system().prefix(),
                self.name
            ))
        };
        match (anchor, self.coding) {
            (Anchor::Cds(0), _) | (Anchor::Tx(0), _) | (Anchor::Utr3(0), _) => Err(
                CsqError::coordinates("position 0 does not exist in HGVS numbering"),
            ),
            (Anchor::TxDownstream(0), _) => Err(CsqError::coordinates(
                "position *0 does not exist in HGVS numbering",
            )),
            (Anchor::Cds(n), Some(bounds)) if n > 0 => Ok(bounds.start_index as i64 + n - 1),
            (Anchor::Cds(n), Some(bounds)) => Ok(bounds.start_index as i64 + n),
            (Anchor::Utr3(n), Some(bounds)) => Ok(bounds.end_index as i64 + n as i64),
            (Anchor::Tx(n), None) if n > 0 => Ok(n),
            (Anchor::Tx(n), None) => Ok(n + 1),
            (Anchor::TxDownstream(n), None) => Ok(self.transcript_length() as i64 + n as i64),
            _ => Err(wrong_system()),
        }
    }
}

/// 1-based index of `pos` along the spliced transcript
fn exonic_index(regions: &[Interval], strand: Strand, pos: u64) -> Option<u64> {
    let mut before = 0;
    let ordered: Box<dyn Iterator<Item = &Interval>> = match strand {
        Strand::Plus => Box::new(regions.iter()),
        Strand::Minus => Box::new(regions.iter().rev()),
    };
    for region in ordered {
        if region.contains(pos) {
            return Some(match strand {
                Strand::Plus => before + pos - region.start + 1,
                Strand::Minus => before + region.end - pos + 1,
            });
        }
        before += region.len();
    }
    None
}

/// Genomic position of the n-th base walking `regions` in transcript order
fn walk(regions: &[Interval], strand: Strand, n: u64) -> Option<u64> {
    let mut remaining = n;
    let ordered: Box<dyn Iterator<Item = &Interval>> = match strand {
        Strand::Plus => Box::new(regions.iter()),
        Strand::Minus => Box::new(regions.iter().rev()),
    };
    for region in ordered {
        if remaining <= region.len() {
            return Some(match strand {
                Strand::Plus => region.start + remaining - 1,
                Strand::Minus => region.end - (remaining - 1),
            });
        }
        remaining -= region.len();
    }
    None
}

/// Split exons into coding, 5' UTR and 3' UTR parts
fn partition(
    regions: &[Interval],
    strand: Strand,
    coding_start: u64,
    coding_end: u64,
) -> (Vec<Interval>, Vec<Interval>, Vec<Interval>) {
    let lo = coding_start.min(coding_end);
    let hi = coding_start.max(coding_end);
    let coding: Vec<Interval> = regions.iter().filter_map(|r| r.intersect(lo, hi)).collect();
    let left: Vec<Interval> = regions
        .iter()
        .filter_map(|r| if lo > 1 { r.intersect(1, lo - 1) } else { None })
        .collect();
    let right: Vec<Interval> = regions
        .iter()
        .filter_map(|r| r.intersect(hi + 1, u64::MAX))
        .collect();
    match strand {
        Strand::Plus => (coding, left, right),
        Strand::Minus => (coding, right, left),
    }
}

/// Serialized form of a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranscriptRecord {
    name: String,
    #[serde(default)]
    gene: String,
    #[serde(default)]
    source: TranscriptSource,
    strand: Strand,
    chromosome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    biotype: Option<Biotype>,
    regions: Vec<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coding_start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coding_end: Option<u64>,
}

impl TryFrom<TranscriptRecord> for Transcript {
    type Error = CsqError;

    fn try_from(record: TranscriptRecord) -> Result<Self, Self::Error> {
        let coding = match (record.coding_start, record.coding_end) {
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => {
                return Err(CsqError::MalformedTranscript {
                    transcript: record.name,
                    msg: "coding start and end must be given together".to_string(),
                })
            }
        };
        let mut transcript = Transcript::new(
            record.name,
            record.gene,
            record.chromosome,
            record.strand,
            record.regions,
            coding,
        )?
        .with_source(record.source);
        if let Some(biotype) = record.biotype {
            transcript = transcript.with_biotype(biotype);
        }
        Ok(transcript)
    }
}

impl From<Transcript> for TranscriptRecord {
    fn from(transcript: Transcript) -> Self {
        Self {
            coding_start: transcript.coding_start(),
            coding_end: transcript.coding_end(),
            biotype: Some(transcript.biotype),
            name: transcript.name,
            gene: transcript.gene,
            source: transcript.source,
            strand: transcript.strand,
            chromosome: transcript.chromosome,
            regions: transcript.regions,
        }
    }
}
