//! Normalization tests
//!
//! Trimming, 3'/5' shuffling through repeats, and reference checks against a
//! mock genome.

use ferro_csq::{
    CsqError, GenomicVariant, MockProvider, NormalizeConfig, Normalizer, ShuffleDirection,
    VariantKind,
};
use rstest::rstest;

//          1         2         3         4         5
// 12345678901234567890123456789012345678901234567890123
const GENOME: &str = "ACACACCATGGCTAAAGTAAGTCCCCCCTTTCAGGAAGAATGACATTTGTGTG";

fn normalizer(direction: ShuffleDirection) -> Normalizer<MockProvider> {
    Normalizer::with_config(
        MockProvider::new().with_sequence("chr1", GENOME),
        NormalizeConfig::new().with_direction(direction),
    )
}

#[test]
fn test_snv_passes_through() {
    let n = normalizer(ShuffleDirection::ThreePrime)
        .normalize(&GenomicVariant::new("chr1", 12, "c", "a"))
        .unwrap();
    assert_eq!(n.start, 12);
    assert_eq!(n.ref_allele, "C");
    assert_eq!(n.alt_allele, "A");
    assert_eq!(n.kind, VariantKind::Snv);
    assert_eq!(n.end(), 12);
}

#[rstest]
// VCF-style anchored deletion of one GAA in GAAGAA (35-40)
#[case::del_3prime(ShuffleDirection::ThreePrime, ("GGAA", "G", 34), (38, "GAA", ""))]
#[case::del_5prime(ShuffleDirection::FivePrime, ("GGAA", "G", 34), (35, "GAA", ""))]
// One C out of CCCCCC (23-28)
#[case::homopolymer_3prime(ShuffleDirection::ThreePrime, ("TC", "T", 22), (28, "C", ""))]
#[case::homopolymer_5prime(ShuffleDirection::FivePrime, ("TC", "T", 22), (23, "C", ""))]
// Insertion of GAA, rotated while shifting
#[case::ins_3prime(ShuffleDirection::ThreePrime, ("A", "AGAA", 40), (40, "", "GAA"))]
#[case::ins_5prime(ShuffleDirection::FivePrime, ("A", "AGAA", 40), (34, "", "GAA"))]
// Delins are trimmed but never shifted
#[case::delins(ShuffleDirection::ThreePrime, ("GCTA", "GTTA", 11), (12, "C", "T"))]
#[case::delins_multi(ShuffleDirection::ThreePrime, ("GGCT", "GAAT", 10), (11, "GC", "AA"))]
fn test_normalize(
    #[case] direction: ShuffleDirection,
    #[case] input: (&str, &str, u64),
    #[case] expected: (u64, &str, &str),
) {
    let (ref_allele, alt_allele, start) = input;
    let n = normalizer(direction)
        .normalize(&GenomicVariant::new("chr1", start, ref_allele, alt_allele))
        .unwrap();
    assert_eq!((n.start, n.ref_allele.as_str(), n.alt_allele.as_str()), expected);
}

#[test]
fn test_small_window_matches_default() {
    let variant = GenomicVariant::new("chr1", 22, "TC", "T");
    let small = Normalizer::with_config(
        MockProvider::new().with_sequence("chr1", GENOME),
        NormalizeConfig::new().with_window_size(1),
    );
    assert_eq!(
        small.normalize(&variant).unwrap(),
        normalizer(ShuffleDirection::ThreePrime)
            .normalize(&variant)
            .unwrap()
    );
}

#[test]
fn test_shift_stops_at_contig_end() {
    // Trailing G of GTGTG cannot move further right
    let n = normalizer(ShuffleDirection::ThreePrime)
        .normalize(&GenomicVariant::new("chr1", 52, "TG", "T"))
        .unwrap();
    assert_eq!(n.start, 53);
    assert_eq!(n.kind, VariantKind::Deletion);
}

#[test]
fn test_length_change() {
    let norm = normalizer(ShuffleDirection::ThreePrime);
    let del = norm
        .normalize(&GenomicVariant::new("chr1", 34, "GGAA", "G"))
        .unwrap();
    assert_eq!(del.length_change(), -3);
    assert_eq!(del.end(), 40);

    let ins = norm
        .normalize(&GenomicVariant::new("chr1", 40, "A", "AGAA"))
        .unwrap();
    assert_eq!(ins.length_change(), 3);
    assert_eq!(ins.kind, VariantKind::Insertion);
}

#[test]
fn test_to_vcf_adds_anchor_base() {
    let provider = MockProvider::new().with_sequence("chr1", GENOME);
    let norm = normalizer(ShuffleDirection::ThreePrime);

    let del = norm
        .normalize(&GenomicVariant::new("chr1", 34, "GGAA", "G"))
        .unwrap();
    assert_eq!(
        del.to_vcf(&provider).unwrap(),
        GenomicVariant::new("chr1", 37, "AGAA", "A")
    );

    let ins = norm
        .normalize(&GenomicVariant::new("chr1", 40, "A", "AGAA"))
        .unwrap();
    assert_eq!(
        ins.to_vcf(&provider).unwrap(),
        GenomicVariant::new("chr1", 40, "A", "AGAA")
    );
}

#[test]
fn test_normalized_form_is_stable() {
    let norm = normalizer(ShuffleDirection::ThreePrime);
    let once = norm
        .normalize(&GenomicVariant::new("chr1", 22, "TC", "T"))
        .unwrap();
    let twice = norm.normalize(&once.to_variant()).unwrap();
    assert_eq!(once, twice);
}

#[rstest]
#[case::reference_mismatch(GenomicVariant::new("chr1", 12, "G", "A"))]
#[case::off_contig(GenomicVariant::new("chr1", 100, "A", "G"))]
#[case::unknown_contig(GenomicVariant::new("chrUn", 1, "A", "G"))]
#[case::identical_alleles(GenomicVariant::new("chr1", 12, "C", "C"))]
#[case::bad_bases(GenomicVariant::new("chr1", 12, "C", "X"))]
#[case::position_zero(GenomicVariant::new("chr1", 0, "A", "G"))]
fn test_normalize_errors(#[case] variant: GenomicVariant) {
    let err = normalizer(ShuffleDirection::ThreePrime)
        .normalize(&variant)
        .unwrap_err();
    assert!(
        matches!(
            err,
            CsqError::ReferenceMismatch { .. }
                | CsqError::SequenceNotFound { .. }
                | CsqError::InvalidVariant { .. }
        ),
        "{:?}",
        err
    );
}
