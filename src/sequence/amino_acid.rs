//! Amino acid alphabet used in protein change descriptions.

use serde::{Deserialize, Serialize};

/// Amino acid enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AminoAcid {
    Ala, // A
    Arg, // R
    Asn, // N
    Asp, // D
    Cys, // C
    Gln, // Q
    Glu, // E
    Gly, // G
    His, // H
    Ile, // I
    Leu, // L
    Lys, // K
    Met, // M
    Phe, // F
    Pro, // P
    Ser, // S
    Thr, // T
    Trp, // W
    Tyr, // Y
    Val, // V
    Ter, // * (stop codon)
}

impl AminoAcid {
    /// Parse from 3-letter code
    pub fn from_three_letter(s: &str) -> Option<Self> {
        match s {
            "Ala" => Some(Self::Ala),
            "Arg" => Some(Self::Arg),
            "Asn" => Some(Self::Asn),
            "Asp" => Some(Self::Asp),
            "Cys" => Some(Self::Cys),
            "Gln" => Some(Self::Gln),
            "Glu" => Some(Self::Glu),
            "Gly" => Some(Self::Gly),
            "His" => Some(Self::His),
            "Ile" => Some(Self::Ile),
            "Leu" => Some(Self::Leu),
            "Lys" => Some(Self::Lys),
            "Met" => Some(Self::Met),
            "Phe" => Some(Self::Phe),
            "Pro" => Some(Self::Pro),
            "Ser" => Some(Self::Ser),
            "Thr" => Some(Self::Thr),
            "Trp" => Some(Self::Trp),
            "Tyr" => Some(Self::Tyr),
            "Val" => Some(Self::Val),
            "Ter" => Some(Self::Ter),
            _ => None,
        }
    }

    /// Get 3-letter code
    pub fn to_three_letter(&self) -> &'static str {
        match self {
            Self::Ala => "Ala",
            Self::Arg => "Arg",
            Self::Asn => "Asn",
            Self::Asp => "Asp",
            Self::Cys => "Cys",
            Self::Gln => "Gln",
            Self::Glu => "Glu",
            Self::Gly => "Gly",
            Self::His => "His",
            Self::Ile => "Ile",
            Self::Leu => "Leu",
            Self::Lys => "Lys",
            Self::Met => "Met",
            Self::Phe => "Phe",
            Self::Pro => "Pro",
            Self::Ser => "Ser",
            Self::Thr => "Thr",
            Self::Trp => "Trp",
            Self::Tyr => "Tyr",
            Self::Val => "Val",
            Self::Ter => "Ter",
        }
    }

    /// Parse from 1-letter code (`*` for stop)
    pub fn from_one_letter(c: u8) -> Option<Self> {
        match c {
            b'A' => Some(Self::Ala),
            b'R' => Some(Self::Arg),
            b'N' => Some(Self::Asn),
            b'D' => Some(Self::Asp),
            b'C' => Some(Self::Cys),
            b'Q' => Some(Self::Gln),
            b'E' => Some(Self::Glu),
            b'G' => Some(Self::Gly),
            b'H' => Some(Self::His),
            b'I' => Some(Self::Ile),
            b'L' => Some(Self::Leu),
            b'K' => Some(Self::Lys),
            b'M' => Some(Self::Met),
            b'F' => Some(Self::Phe),
            b'P' => Some(Self::Pro),
            b'S' => Some(Self::Ser),
            b'T' => Some(Self::Thr),
            b'W' => Some(Self::Trp),
            b'Y' => Some(Self::Tyr),
            b'V' => Some(Self::Val),
            b'*' => Some(Self::Ter),
            _ => None,
        }
    }

    /// Whether this is the stop marker
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Ter)
    }
}

impl std::fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_three_letter())
    }
}

/// Concatenate three-letter codes, e.g. `PheLeuTer`
pub fn three_letter_string(aas: &[AminoAcid]) -> String {
    aas.iter().map(|aa| aa.to_three_letter()).collect()
}
