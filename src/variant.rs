//! Genomic variant representation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural class of a variant, derived from its alleles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Single base substitution
    Snv,
    /// Pure insertion (empty reference allele)
    Insertion,
    /// Pure deletion (empty alternate allele)
    Deletion,
    /// Any other replacement, including multi-base substitutions
    Delins,
}

impl VariantKind {
    /// Classify a trimmed ref/alt pair
    pub fn classify(ref_allele: &str, alt_allele: &str) -> Self {
        match (ref_allele.len(), alt_allele.len()) {
            (1, 1) => VariantKind::Snv,
            (0, _) => VariantKind::Insertion,
            (_, 0) => VariantKind::Deletion,
            _ => VariantKind::Delins,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Snv => write!(f, "SNV"),
            VariantKind::Insertion => write!(f, "insertion"),
            VariantKind::Deletion => write!(f, "deletion"),
            VariantKind::Delins => write!(f, "delins"),
        }
    }
}

/// A single-allele genomic variant
///
/// `start` is 1-based. An empty (or `-`) reference allele describes an
/// insertion of `alt_allele` immediately after base `start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicVariant {
    pub chrom: String,
    pub start: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl GenomicVariant {
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
        }
    }

    /// Reference allele with the `-` placeholder mapped to the empty string
    pub fn ref_bases(&self) -> &str {
        strip_placeholder(&self.ref_allele)
    }

    /// Alternate allele with the `-` placeholder mapped to the empty string
    pub fn alt_bases(&self) -> &str {
        strip_placeholder(&self.alt_allele)
    }
}

impl fmt::Display for GenomicVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        write!(
            f,
            "{}:{}:{}>{}",
            self.chrom,
            self.start,
            show(self.ref_bases()),
            show(self.alt_bases())
        )
    }
}

fn strip_placeholder(allele: &str) -> &str {
    if allele == "-" {
        ""
    } else {
        allele
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(VariantKind::classify("A", "G"), VariantKind::Snv);
        assert_eq!(VariantKind::classify("", "AT"), VariantKind::Insertion);
        assert_eq!(VariantKind::classify("AT", ""), VariantKind::Deletion);
        assert_eq!(VariantKind::classify("AT", "GC"), VariantKind::Delins);
        assert_eq!(VariantKind::classify("A", "GC"), VariantKind::Delins);
    }

    #[test]
    fn test_placeholder_alleles() {
        let v = GenomicVariant::new("chr1", 10, "-", "AC");
        assert_eq!(v.ref_bases(), "");
        assert_eq!(v.alt_bases(), "AC");
        assert_eq!(v.to_string(), "chr1:10:->AC");
    }
}
