//! Splice site and splice region detection
//!
//! Every intron contributes two zones per side. On the donor side (the 5'
//! end of the intron in transcript direction) these are the two intronic
//! bases of the donor site, and a splice region that covers the last
//! `splice_region_ex` exonic bases plus the first `splice_region_in_5`
//! intronic bases. The acceptor side mirrors this with `splice_region_in_3`.
//! The free ends of the transcript have no introns and so no zones.

use crate::config::AnnotatorConfig;
use crate::reference::{Interval, Strand, Transcript};

/// Genomic footprint tested against the splice zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceQuery {
    /// Substituted or deleted bases, inclusive
    Span(u64, u64),
    /// Insertion between base `after` and base `after + 1`
    Insertion(u64),
}

impl SpliceQuery {
    fn hits(&self, zone: &Interval) -> bool {
        match *self {
            SpliceQuery::Span(start, end) => zone.overlaps(start, end),
            SpliceQuery::Insertion(after) => zone.contains(after) && zone.contains(after + 1),
        }
    }
}

/// Which splice zones a variant touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpliceHits {
    pub donor: bool,
    pub acceptor: bool,
    pub region: bool,
}

impl SpliceHits {
    /// Whether a donor or acceptor site is hit
    pub fn site(&self) -> bool {
        self.donor || self.acceptor
    }
}

/// Zones of one intron in genomic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IntronZones {
    donor: Interval,
    acceptor: Interval,
    donor_region: Interval,
    acceptor_region: Interval,
}

fn intron_zones(
    intron: Interval,
    left_exon: Interval,
    right_exon: Interval,
    strand: Strand,
    config: &AnnotatorConfig,
) -> IntronZones {
    let ex = config.splice_region_ex;
    // Sites and regions never reach past the intron or the flanking exons.
    let low_side = |intronic: u64| {
        Interval::new(
            intron.start.saturating_sub(ex).max(left_exon.start),
            (intron.start + intronic.saturating_sub(1)).min(intron.end),
        )
    };
    let high_side = |intronic: u64| {
        Interval::new(
            intron.end.saturating_sub(intronic.saturating_sub(1)).max(intron.start),
            (intron.end + ex).min(right_exon.end),
        )
    };
    let low_site = Interval::new(intron.start, (intron.start + 1).min(intron.end));
    let high_site = Interval::new(intron.end.saturating_sub(1).max(intron.start), intron.end);

    match strand {
        Strand::Plus => IntronZones {
            donor: low_site,
            acceptor: high_site,
            donor_region: low_side(config.splice_region_in_5),
            acceptor_region: high_side(config.splice_region_in_3),
        },
        Strand::Minus => IntronZones {
            donor: high_site,
            acceptor: low_site,
            donor_region: high_side(config.splice_region_in_5),
            acceptor_region: low_side(config.splice_region_in_3),
        },
    }
}

/// Test a variant footprint against every intron of a transcript
pub fn splice_hits(
    transcript: &Transcript,
    query: SpliceQuery,
    config: &AnnotatorConfig,
) -> SpliceHits {
    let mut hits = SpliceHits::default();
    for pair in transcript.regions().windows(2) {
        let intron = Interval::new(pair[0].end + 1, pair[1].start - 1);
        let zones = intron_zones(intron, pair[0], pair[1], transcript.strand(), config);
        hits.donor |= query.hits(&zones.donor);
        hits.acceptor |= query.hits(&zones.acceptor);
        hits.region |= query.hits(&zones.donor_region) || query.hits(&zones.acceptor_region);
    }
    hits.region |= hits.site();
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exons 101-200, 301-400, 501-600
    fn transcript(strand: Strand) -> Transcript {
        Transcript::new(
            "TX1",
            "GENE",
            "chr1",
            strand,
            vec![
                Interval::new(101, 200),
                Interval::new(301, 400),
                Interval::new(501, 600),
            ],
            None,
        )
        .unwrap()
    }

    fn hits(strand: Strand, query: SpliceQuery) -> SpliceHits {
        splice_hits(&transcript(strand), query, &AnnotatorConfig::default())
    }

    #[test]
    fn test_plus_strand_donor_and_acceptor() {
        let donor = hits(Strand::Plus, SpliceQuery::Span(202, 202));
        assert!(donor.donor && donor.region && !donor.acceptor);

        let acceptor = hits(Strand::Plus, SpliceQuery::Span(299, 299));
        assert!(acceptor.acceptor && acceptor.region && !acceptor.donor);
    }

    #[test]
    fn test_minus_strand_sides_swap() {
        let at_201 = hits(Strand::Minus, SpliceQuery::Span(201, 201));
        assert!(at_201.acceptor && !at_201.donor);

        let at_300 = hits(Strand::Minus, SpliceQuery::Span(300, 300));
        assert!(at_300.donor && !at_300.acceptor);
    }

    #[test]
    fn test_region_widths() {
        // Exonic side: 198-200 are region, 197 is not
        assert!(hits(Strand::Plus, SpliceQuery::Span(198, 198)).region);
        assert!(!hits(Strand::Plus, SpliceQuery::Span(197, 197)).region);
        // Intronic side: 201-208 are region, 209 is not
        assert!(hits(Strand::Plus, SpliceQuery::Span(208, 208)).region);
        assert!(!hits(Strand::Plus, SpliceQuery::Span(209, 209)).region);
        // Acceptor side: 293-300 and 301-303
        assert!(hits(Strand::Plus, SpliceQuery::Span(293, 293)).region);
        assert!(!hits(Strand::Plus, SpliceQuery::Span(292, 292)).region);
        assert!(hits(Strand::Plus, SpliceQuery::Span(303, 303)).region);
        assert!(!hits(Strand::Plus, SpliceQuery::Span(304, 304)).region);
    }

    #[test]
    fn test_transcript_ends_are_not_splice_sites() {
        assert_eq!(
            hits(Strand::Plus, SpliceQuery::Span(101, 102)),
            SpliceHits::default()
        );
        assert_eq!(
            hits(Strand::Plus, SpliceQuery::Span(599, 600)),
            SpliceHits::default()
        );
    }

    #[test]
    fn test_insertion_needs_both_flanks_in_zone() {
        // Between 200 (exon) and 201 (donor +1): both in the region, not both in the site
        let boundary = hits(Strand::Plus, SpliceQuery::Insertion(200));
        assert!(boundary.region && !boundary.donor);
        // Between +1 and +2
        assert!(hits(Strand::Plus, SpliceQuery::Insertion(201)).donor);
        // Between 197 (outside) and 198 (region)
        assert!(!hits(Strand::Plus, SpliceQuery::Insertion(197)).region);
    }

    #[test]
    fn test_deletion_spanning_site() {
        let del = hits(Strand::Plus, SpliceQuery::Span(195, 205));
        assert!(del.donor && del.region);
    }
}
