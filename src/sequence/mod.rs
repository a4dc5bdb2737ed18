//! Nucleotide sequence helpers and the genetic code.

pub mod amino_acid;
pub mod codon;

pub use amino_acid::{three_letter_string, AminoAcid};
pub use codon::{is_mitochondrial, CodonTable};

/// Complement of a single base; unknown characters are returned unchanged.
pub fn complement_base(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

/// Reverse complement of a nucleotide string.
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| complement_base(b) as char)
        .collect()
}

/// Whether every character is one of `ACGTN` (case-insensitive).
pub fn is_valid_dna(seq: &str) -> bool {
    seq.bytes()
        .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}
