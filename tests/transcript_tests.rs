//! Transcript model and index tests

use ferro_csq::{
    Biotype, CoordinateSystem, CsqError, ExonOverlap, Interval, Region, Strand, Transcript,
    TranscriptIndex, TranscriptSource,
};
use rstest::rstest;
use std::io::Write;

fn plus() -> Transcript {
    Transcript::new(
        "NM_000001.1",
        "GENE",
        "chr1",
        Strand::Plus,
        vec![Interval::new(6, 16), Interval::new(35, 48)],
        Some((8, 43)),
    )
    .unwrap()
}

fn minus() -> Transcript {
    Transcript::new(
        "NM_000001.1",
        "GENE",
        "chr1",
        Strand::Minus,
        vec![Interval::new(6, 19), Interval::new(38, 48)],
        Some((46, 11)),
    )
    .unwrap()
}

#[rstest]
#[case::plus_start_codon(plus(), 8, "1", Region::Exon(1))]
#[case::plus_utr5(plus(), 6, "-2", Region::Exon(1))]
#[case::plus_donor(plus(), 18, "9+2", Region::Intron(1))]
#[case::plus_acceptor(plus(), 33, "10-2", Region::Intron(1))]
#[case::plus_stop(plus(), 43, "18", Region::Exon(2))]
#[case::plus_utr3(plus(), 48, "*5", Region::Exon(2))]
#[case::plus_upstream(plus(), 3, "-5", Region::Upstream(3))]
#[case::plus_downstream(plus(), 50, "*7", Region::Downstream(2))]
#[case::minus_start_codon(minus(), 46, "1", Region::Exon(1))]
#[case::minus_utr5(minus(), 48, "-2", Region::Exon(1))]
#[case::minus_donor(minus(), 36, "9+2", Region::Intron(1))]
#[case::minus_acceptor(minus(), 21, "10-2", Region::Intron(1))]
#[case::minus_stop(minus(), 11, "18", Region::Exon(2))]
#[case::minus_utr3(minus(), 6, "*5", Region::Exon(2))]
#[case::minus_upstream(minus(), 51, "-5", Region::Upstream(3))]
#[case::minus_downstream(minus(), 4, "*7", Region::Downstream(2))]
fn test_locate(
    #[case] transcript: Transcript,
    #[case] pos: u64,
    #[case] expected: &str,
    #[case] region: Region,
) {
    let locus = transcript.locate(pos);
    assert_eq!(locus.position.to_string(), expected);
    assert_eq!(locus.region, region);
    assert_eq!(transcript.position_to_genomic(&locus.position).unwrap(), pos);
}

#[test]
fn test_partitions() {
    let t = plus();
    assert_eq!(t.utr5_regions(), &[Interval::new(6, 7)]);
    assert_eq!(
        t.coding_regions(),
        &[Interval::new(8, 16), Interval::new(35, 43)]
    );
    assert_eq!(t.utr3_regions(), &[Interval::new(44, 48)]);
    assert_eq!(t.coding_length(), 18);
    assert_eq!(t.transcript_length(), 25);

    let m = minus();
    assert_eq!(m.utr5_regions(), &[Interval::new(47, 48)]);
    assert_eq!(m.utr3_regions(), &[Interval::new(6, 10)]);
    assert_eq!(m.coding_length(), 18);
}

#[test]
fn test_cdna_to_genomic() {
    assert_eq!(plus().cdna_to_genomic(10).unwrap(), 35);
    assert_eq!(minus().cdna_to_genomic(10).unwrap(), 19);
    assert!(matches!(
        plus().cdna_to_genomic(19),
        Err(CsqError::InvalidCoordinates { .. })
    ));
}

#[test]
fn test_exon_and_intron_numbers() {
    let m = minus();
    assert_eq!(m.exon_number(40, 40), ExonOverlap::Exon(1));
    assert_eq!(m.exon_number(10, 40), ExonOverlap::MultipleExons);
    assert_eq!(m.exon_number(25, 30), ExonOverlap::NotFound);
    // Partly exonic, partly intronic
    assert_eq!(m.exon_number(15, 25), ExonOverlap::MultipleExons);
    assert_eq!(m.exon_number(30, 38), ExonOverlap::MultipleExons);
    assert_eq!(m.exon_number(38, 48), ExonOverlap::Exon(1));
    assert_eq!(m.intron_number(25, 30), Some(1));
    assert_eq!(m.intron_number(19, 30), None);
}

#[test]
fn test_non_coding_uses_n_numbering() {
    let t = Transcript::new(
        "NR_000001.1",
        "GENE",
        "chr1",
        Strand::Plus,
        vec![Interval::new(6, 16), Interval::new(35, 48)],
        None,
    )
    .unwrap();
    assert_eq!(t.coordinate_system(), CoordinateSystem::NonCoding);
    assert_eq!(t.biotype(), Biotype::NonCoding);
    assert_eq!(t.locate(17).position.to_string(), "11+1");
    assert_eq!(t.locate(36).position.to_string(), "13");
    assert_eq!(t.locate(3).position.to_string(), "-3");
}

#[rstest]
#[case::adjacent(vec![Interval::new(6, 16), Interval::new(17, 48)])]
#[case::overlapping(vec![Interval::new(6, 20), Interval::new(17, 48)])]
#[case::descending(vec![Interval::new(35, 48), Interval::new(6, 16)])]
fn test_rejects_malformed_regions(#[case] regions: Vec<Interval>) {
    let err = Transcript::new("TX", "G", "chr1", Strand::Plus, regions, None).unwrap_err();
    assert!(matches!(err, CsqError::MalformedTranscript { .. }));
}

#[test]
fn test_index_from_json() {
    let json = r#"[
        {"name": "NM_000001.1", "gene": "GENE", "source": "ccds", "strand": "+",
         "chromosome": "chr1", "regions": [{"start": 6, "end": 16}, {"start": 35, "end": 48}],
         "coding_start": 8, "coding_end": 43},
        {"name": "NR_000002.1", "gene": "OTHER", "strand": "-", "chromosome": "chr1",
         "regions": [{"start": 2000, "end": 2100}]},
        {"name": "NM_000003.1", "gene": "FAR", "strand": "-", "chromosome": "chr2",
         "biotype": "nonsense_mediated_decay",
         "regions": [{"start": 100, "end": 200}], "coding_start": 190, "coding_end": 110}
    ]"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let index = TranscriptIndex::from_json(file.path()).unwrap();
    assert_eq!(index.len(), 3);

    let coding = index.get("NM_000001.1").unwrap();
    assert_eq!(coding, &plus().with_source(TranscriptSource::Ccds));

    let nmd = index.get("NM_000003.1").unwrap();
    assert_eq!(nmd.biotype(), Biotype::NonsenseMediatedDecay);
    assert_eq!(nmd.strand(), Strand::Minus);

    let names = |hits: Vec<&Transcript>| -> Vec<String> {
        hits.iter().map(|t| t.name().to_string()).collect()
    };
    assert_eq!(names(index.overlapping("chr1", 20, 20, 0)), vec!["NM_000001.1"]);
    assert!(index.overlapping("chr1", 1000, 1000, 500).is_empty());
    assert_eq!(
        names(index.overlapping("chr1", 1000, 1000, 1000)),
        vec!["NM_000001.1", "NR_000002.1"]
    );
}

#[test]
fn test_index_rejects_bad_transcript() {
    let json = r#"[{"name": "BAD", "strand": "+", "chromosome": "chr1",
        "regions": [{"start": 10, "end": 20}], "coding_start": 12}]"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    assert!(matches!(
        TranscriptIndex::from_json(file.path()),
        Err(CsqError::Json { .. })
    ));
}
