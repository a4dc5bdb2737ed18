//! Structured transcript positions
//!
//! HGVS positions such as `c.886+2`, `c.-35+2` or `c.*22-37` are kept as an
//! [`Anchor`] plus a signed intron offset until the final formatting step.
//!
//! # Anchor kinds
//!
//! | Anchor | Rendered | Meaning |
//! |--------|----------|---------|
//! | `Cds(n)`, n > 0 | `n` | n-th base of the coding sequence |
//! | `Cds(n)`, n < 0 | `-n` | 5' UTR (or upstream), counted back from `c.1` |
//! | `Utr3(n)` | `*n` | 3' UTR (or downstream), counted from the stop codon |
//! | `Tx(n)`, n > 0 | `n` | n-th base of a non-coding transcript |
//! | `Tx(n)`, n < 0 | `-n` | upstream of a non-coding transcript |
//! | `TxDownstream(n)` | `*n` | downstream of a non-coding transcript |
//!
//! Zero is never a valid anchor value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HGVS coordinate system of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// `c.` numbering relative to the coding sequence
    Coding,
    /// `n.` numbering relative to the transcript start
    NonCoding,
}

impl CoordinateSystem {
    /// Description prefix (`c.` or `n.`)
    pub fn prefix(&self) -> &'static str {
        match self {
            CoordinateSystem::Coding => "c.",
            CoordinateSystem::NonCoding => "n.",
        }
    }
}

/// The exonic base a position is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Cds(i64),
    Utr3(u64),
    Tx(i64),
    TxDownstream(u64),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Cds(n) | Anchor::Tx(n) => write!(f, "{}", n),
            Anchor::Utr3(n) | Anchor::TxDownstream(n) => write!(f, "*{}", n),
        }
    }
}

/// Transcript segment an anchor falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    FivePrimeUtr,
    Cds,
    ThreePrimeUtr,
    NonCoding,
}

/// A transcript position: an exonic anchor and a signed intronic offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxPosition {
    pub anchor: Anchor,
    /// Distance into the intron; positive after the anchor, negative before it
    pub offset: i64,
}

impl TxPosition {
    /// An exonic position
    pub fn exonic(anchor: Anchor) -> Self {
        Self { anchor, offset: 0 }
    }

    /// A position with an intronic offset
    pub fn with_offset(anchor: Anchor, offset: i64) -> Self {
        Self { anchor, offset }
    }

    /// Whether the position is intronic
    pub fn is_intronic(&self) -> bool {
        self.offset != 0
    }

    /// The segment the anchor belongs to
    pub fn segment(&self) -> Segment {
        match self.anchor {
            Anchor::Cds(n) if n < 0 => Segment::FivePrimeUtr,
            Anchor::Cds(_) => Segment::Cds,
            Anchor::Utr3(_) => Segment::ThreePrimeUtr,
            Anchor::Tx(_) | Anchor::TxDownstream(_) => Segment::NonCoding,
        }
    }

    /// Coding position if this is an exonic CDS base
    pub fn cds_index(&self) -> Option<u64> {
        match self.anchor {
            Anchor::Cds(n) if n > 0 && self.offset == 0 => Some(n as u64),
            _ => None,
        }
    }
}

impl fmt::Display for TxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.anchor)?;
        match self.offset {
            0 => Ok(()),
            o if o > 0 => write!(f, "+{}", o),
            o => write!(f, "{}", o),
        }
    }
}

/// Where a genomic base lies relative to a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// 5' of the transcript's first base, with the distance in bases
    Upstream(u64),
    /// 3' of the transcript's last base, with the distance in bases
    Downstream(u64),
    /// Exon number counted from the transcript 5' end
    Exon(u32),
    /// Intron number counted from the transcript 5' end
    Intron(u32),
}

/// A located genomic base: its region and its HGVS position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locus {
    pub region: Region,
    pub position: TxPosition,
}

impl Locus {
    /// Whether the base is outside the transcript span
    pub fn is_outside(&self) -> bool {
        matches!(self.region, Region::Upstream(_) | Region::Downstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_positions() {
        assert_eq!(TxPosition::exonic(Anchor::Cds(123)).to_string(), "123");
        assert_eq!(TxPosition::exonic(Anchor::Cds(-207)).to_string(), "-207");
        assert_eq!(TxPosition::exonic(Anchor::Utr3(48)).to_string(), "*48");
        assert_eq!(
            TxPosition::with_offset(Anchor::Cds(886), 2).to_string(),
            "886+2"
        );
        assert_eq!(
            TxPosition::with_offset(Anchor::Cds(-34), -2).to_string(),
            "-34-2"
        );
        assert_eq!(
            TxPosition::with_offset(Anchor::Utr3(22), -37).to_string(),
            "*22-37"
        );
        assert_eq!(TxPosition::exonic(Anchor::Tx(610)).to_string(), "610");
        assert_eq!(
            TxPosition::exonic(Anchor::TxDownstream(5)).to_string(),
            "*5"
        );
    }

    #[test]
    fn test_segment() {
        assert_eq!(
            TxPosition::exonic(Anchor::Cds(-1)).segment(),
            Segment::FivePrimeUtr
        );
        assert_eq!(TxPosition::exonic(Anchor::Cds(1)).segment(), Segment::Cds);
        assert_eq!(
            TxPosition::exonic(Anchor::Utr3(1)).segment(),
            Segment::ThreePrimeUtr
        );
        assert_eq!(
            TxPosition::exonic(Anchor::Tx(3)).segment(),
            Segment::NonCoding
        );
    }

    #[test]
    fn test_cds_index() {
        assert_eq!(TxPosition::exonic(Anchor::Cds(7)).cds_index(), Some(7));
        assert_eq!(TxPosition::with_offset(Anchor::Cds(7), 1).cds_index(), None);
        assert_eq!(TxPosition::exonic(Anchor::Cds(-7)).cds_index(), None);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(CoordinateSystem::Coding.prefix(), "c.");
        assert_eq!(CoordinateSystem::NonCoding.prefix(), "n.");
    }
}
