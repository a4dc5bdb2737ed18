//! Consequence vocabulary and impact ranking.
//!
//! [`Consequence`] is the closed set of Sequence Ontology terms the annotator
//! emits. Variants are declared from most to least severe, so the derived
//! `Ord` sorts a [`VariantConsequence`]'s tag set with the worst tag first.
//!
//! # Example
//!
//! ```
//! use ferro_csq::effect::{Consequence, Impact};
//!
//! assert_eq!(Consequence::StopGained.impact(), Impact::High);
//! assert_eq!(Consequence::FivePrimeUtrVariant.so_term(), "5_prime_UTR_variant");
//! assert!(Consequence::SpliceDonorVariant < Consequence::SpliceRegionVariant);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Sequence Ontology consequence term.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Consequence {
    /// Within the two intronic bases before an exon.
    SpliceAcceptorVariant,
    /// Within the two intronic bases after an exon.
    SpliceDonorVariant,
    /// Introduces a premature stop codon.
    StopGained,
    /// Insertion/deletion causing frameshift.
    FrameshiftVariant,
    /// Stop codon changed to amino acid.
    StopLost,
    /// Start codon changed to other.
    StartLost,
    /// In-frame insertion of amino acids.
    InframeInsertion,
    /// In-frame deletion of amino acids.
    InframeDeletion,
    /// Amino acid substitution.
    MissenseVariant,
    /// Generic protein-altering variant.
    ProteinAlteringVariant,
    /// Near an exon/intron boundary.
    SpliceRegionVariant,
    /// Change in a trailing partial codon.
    IncompleteTerminalCodonVariant,
    /// Start codon unchanged.
    StartRetainedVariant,
    /// Stop codon unchanged.
    StopRetainedVariant,
    /// Silent change (codon change, same amino acid).
    SynonymousVariant,
    /// Coding sequence variant (general).
    CodingSequenceVariant,
    /// Variant in 5' UTR.
    FivePrimeUtrVariant,
    /// Variant in 3' UTR.
    ThreePrimeUtrVariant,
    /// Exonic variant in a non-coding transcript.
    NonCodingTranscriptExonVariant,
    /// Variant in intron.
    IntronVariant,
    /// Variant in a transcript subject to nonsense-mediated decay.
    NmdTranscriptVariant,
    /// Variant in a non-coding transcript.
    NonCodingTranscriptVariant,
    /// 5' of the transcript.
    UpstreamGeneVariant,
    /// 3' of the transcript.
    DownstreamGeneVariant,
    /// Outside the transcript.
    IntergenicVariant,
}

impl Consequence {
    /// All consequences, most severe first.
    pub const ALL: [Consequence; 25] = [
        Consequence::SpliceAcceptorVariant,
        Consequence::SpliceDonorVariant,
        Consequence::StopGained,
        Consequence::FrameshiftVariant,
        Consequence::StopLost,
        Consequence::StartLost,
        Consequence::InframeInsertion,
        Consequence::InframeDeletion,
        Consequence::MissenseVariant,
        Consequence::ProteinAlteringVariant,
        Consequence::SpliceRegionVariant,
        Consequence::IncompleteTerminalCodonVariant,
        Consequence::StartRetainedVariant,
        Consequence::StopRetainedVariant,
        Consequence::SynonymousVariant,
        Consequence::CodingSequenceVariant,
        Consequence::FivePrimeUtrVariant,
        Consequence::ThreePrimeUtrVariant,
        Consequence::NonCodingTranscriptExonVariant,
        Consequence::IntronVariant,
        Consequence::NmdTranscriptVariant,
        Consequence::NonCodingTranscriptVariant,
        Consequence::UpstreamGeneVariant,
        Consequence::DownstreamGeneVariant,
        Consequence::IntergenicVariant,
    ];

    /// Get the Sequence Ontology term.
    pub fn so_term(&self) -> &'static str {
        match self {
            Consequence::SpliceAcceptorVariant => "splice_acceptor_variant",
            Consequence::SpliceDonorVariant => "splice_donor_variant",
            Consequence::StopGained => "stop_gained",
            Consequence::FrameshiftVariant => "frameshift_variant",
            Consequence::StopLost => "stop_lost",
            Consequence::StartLost => "start_lost",
            Consequence::InframeInsertion => "inframe_insertion",
            Consequence::InframeDeletion => "inframe_deletion",
            Consequence::MissenseVariant => "missense_variant",
            Consequence::ProteinAlteringVariant => "protein_altering_variant",
            Consequence::SpliceRegionVariant => "splice_region_variant",
            Consequence::IncompleteTerminalCodonVariant => "incomplete_terminal_codon_variant",
            Consequence::StartRetainedVariant => "start_retained_variant",
            Consequence::StopRetainedVariant => "stop_retained_variant",
            Consequence::SynonymousVariant => "synonymous_variant",
            Consequence::CodingSequenceVariant => "coding_sequence_variant",
            Consequence::FivePrimeUtrVariant => "5_prime_UTR_variant",
            Consequence::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            Consequence::NonCodingTranscriptExonVariant => "non_coding_transcript_exon_variant",
            Consequence::IntronVariant => "intron_variant",
            Consequence::NmdTranscriptVariant => "NMD_transcript_variant",
            Consequence::NonCodingTranscriptVariant => "non_coding_transcript_variant",
            Consequence::UpstreamGeneVariant => "upstream_gene_variant",
            Consequence::DownstreamGeneVariant => "downstream_gene_variant",
            Consequence::IntergenicVariant => "intergenic_variant",
        }
    }

    /// Get the Sequence Ontology ID.
    pub fn so_id(&self) -> &'static str {
        match self {
            Consequence::SpliceAcceptorVariant => "SO:0001574",
            Consequence::SpliceDonorVariant => "SO:0001575",
            Consequence::StopGained => "SO:0001587",
            Consequence::FrameshiftVariant => "SO:0001589",
            Consequence::StopLost => "SO:0001578",
            Consequence::StartLost => "SO:0002012",
            Consequence::InframeInsertion => "SO:0001821",
            Consequence::InframeDeletion => "SO:0001822",
            Consequence::MissenseVariant => "SO:0001583",
            Consequence::ProteinAlteringVariant => "SO:0001818",
            Consequence::SpliceRegionVariant => "SO:0001630",
            Consequence::IncompleteTerminalCodonVariant => "SO:0001626",
            Consequence::StartRetainedVariant => "SO:0002019",
            Consequence::StopRetainedVariant => "SO:0001567",
            Consequence::SynonymousVariant => "SO:0001819",
            Consequence::CodingSequenceVariant => "SO:0001580",
            Consequence::FivePrimeUtrVariant => "SO:0001623",
            Consequence::ThreePrimeUtrVariant => "SO:0001624",
            Consequence::NonCodingTranscriptExonVariant => "SO:0001792",
            Consequence::IntronVariant => "SO:0001627",
            Consequence::NmdTranscriptVariant => "SO:0001621",
            Consequence::NonCodingTranscriptVariant => "SO:0001619",
            Consequence::UpstreamGeneVariant => "SO:0001631",
            Consequence::DownstreamGeneVariant => "SO:0001632",
            Consequence::IntergenicVariant => "SO:0001628",
        }
    }

    /// Get the impact level.
    pub fn impact(&self) -> Impact {
        match self {
            Consequence::SpliceAcceptorVariant
            | Consequence::SpliceDonorVariant
            | Consequence::StopGained
            | Consequence::FrameshiftVariant
            | Consequence::StopLost
            | Consequence::StartLost => Impact::High,

            Consequence::MissenseVariant
            | Consequence::InframeInsertion
            | Consequence::InframeDeletion
            | Consequence::ProteinAlteringVariant => Impact::Moderate,

            Consequence::SpliceRegionVariant
            | Consequence::IncompleteTerminalCodonVariant
            | Consequence::SynonymousVariant
            | Consequence::StartRetainedVariant
            | Consequence::StopRetainedVariant => Impact::Low,

            Consequence::CodingSequenceVariant
            | Consequence::FivePrimeUtrVariant
            | Consequence::ThreePrimeUtrVariant
            | Consequence::NonCodingTranscriptExonVariant
            | Consequence::IntronVariant
            | Consequence::NmdTranscriptVariant
            | Consequence::NonCodingTranscriptVariant
            | Consequence::UpstreamGeneVariant
            | Consequence::DownstreamGeneVariant
            | Consequence::IntergenicVariant => Impact::Modifier,
        }
    }
}

impl fmt::Display for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.so_term())
    }
}

impl FromStr for Consequence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Consequence::ALL
            .iter()
            .find(|c| c.so_term() == s)
            .copied()
            .ok_or_else(|| format!("Unknown consequence: {}", s))
    }
}

impl From<Consequence> for &'static str {
    fn from(c: Consequence) -> Self {
        c.so_term()
    }
}

impl TryFrom<String> for Consequence {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Variant impact level (VEP-style).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    /// Modifier - minimal predicted impact.
    #[default]
    Modifier,
    /// Low impact.
    Low,
    /// Moderate impact.
    Moderate,
    /// High impact (likely deleterious).
    High,
}

impl Impact {
    /// Get the impact as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Moderate => "MODERATE",
            Impact::Low => "LOW",
            Impact::Modifier => "MODIFIER",
        }
    }

    /// Highest impact over a set of consequences; `Modifier` when empty.
    pub fn max_of<'a>(consequences: impl IntoIterator<Item = &'a Consequence>) -> Impact {
        consequences
            .into_iter()
            .map(Consequence::impact)
            .max()
            .unwrap_or_default()
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of annotating one variant against one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantConsequence {
    /// Minimal alternate allele on the forward strand, `-` for deletions
    pub allele: String,
    /// `c.`/`n.` description; empty for variants outside the transcript
    pub hgvs_c: String,
    /// `p.` description; empty when not applicable
    pub hgvs_p: String,
    pub exon_number: Option<u32>,
    pub intron_number: Option<u32>,
    /// Consequence tags, most severe first
    pub consequences: BTreeSet<Consequence>,
    pub impact: Impact,
}

impl VariantConsequence {
    /// Whether a tag is present
    pub fn has(&self, consequence: Consequence) -> bool {
        self.consequences.contains(&consequence)
    }

    /// Most severe tag
    pub fn most_severe(&self) -> Option<Consequence> {
        self.consequences.first().copied()
    }

    /// SO terms joined by `sep`, most severe first
    pub fn types_to_string(&self, sep: &str) -> String {
        self.consequences
            .iter()
            .map(Consequence::so_term)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_sorted_and_complete() {
        let mut sorted = Consequence::ALL;
        sorted.sort();
        assert_eq!(sorted, Consequence::ALL);
        let unique: BTreeSet<_> = Consequence::ALL.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_so_term_round_trip() {
        for c in Consequence::ALL {
            assert_eq!(c.so_term().parse::<Consequence>().unwrap(), c);
            assert!(c.so_id().starts_with("SO:"));
        }
        assert!("not_a_term".parse::<Consequence>().is_err());
    }

    #[test]
    fn test_high_impact_terms() {
        let high: Vec<_> = Consequence::ALL
            .iter()
            .filter(|c| c.impact() == Impact::High)
            .copied()
            .collect();
        assert_eq!(
            high,
            vec![
                Consequence::SpliceAcceptorVariant,
                Consequence::SpliceDonorVariant,
                Consequence::StopGained,
                Consequence::FrameshiftVariant,
                Consequence::StopLost,
                Consequence::StartLost,
            ]
        );
    }

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::High > Impact::Moderate);
        assert!(Impact::Moderate > Impact::Low);
        assert!(Impact::Low > Impact::Modifier);
        assert_eq!(Impact::max_of(&[] as &[Consequence]), Impact::Modifier);
        assert_eq!(
            Impact::max_of(&[Consequence::IntronVariant, Consequence::SpliceRegionVariant]),
            Impact::Low
        );
    }

    #[test]
    fn test_types_to_string_most_severe_first() {
        let csq = VariantConsequence {
            consequences: [
                Consequence::CodingSequenceVariant,
                Consequence::SynonymousVariant,
                Consequence::SpliceRegionVariant,
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        assert_eq!(
            csq.types_to_string("&"),
            "splice_region_variant&synonymous_variant&coding_sequence_variant"
        );
        assert_eq!(csq.most_severe(), Some(Consequence::SpliceRegionVariant));
    }

    #[test]
    fn test_serde_uses_so_terms() {
        let json = serde_json::to_string(&Consequence::FivePrimeUtrVariant).unwrap();
        assert_eq!(json, "\"5_prime_UTR_variant\"");
        let parsed: Consequence = serde_json::from_str("\"stop_gained\"").unwrap();
        assert_eq!(parsed, Consequence::StopGained);
        assert_eq!(serde_json::to_string(&Impact::High).unwrap(), "\"HIGH\"");
    }
}
