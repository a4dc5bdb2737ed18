//! Genetic code tables and translation.

use crate::error::CsqError;
use crate::sequence::amino_acid::AminoAcid;
use std::sync::OnceLock;

/// Amino acids in NCBI order (first base TCAG, then second, then third).
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Vertebrate mitochondrial code (NCBI table 2): TGA=W, AGA/AGG=*, ATA=M.
const MITOCHONDRIAL_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG";

static STANDARD: OnceLock<CodonTable> = OnceLock::new();
static MITOCHONDRIAL: OnceLock<CodonTable> = OnceLock::new();

fn base_index(b: u8) -> Option<usize> {
    match b {
        b'T' | b't' | b'U' | b'u' => Some(0),
        b'C' | b'c' => Some(1),
        b'A' | b'a' => Some(2),
        b'G' | b'g' => Some(3),
        _ => None,
    }
}

/// Codon to amino acid lookup table.
#[derive(Debug, Clone)]
pub struct CodonTable {
    table: [AminoAcid; 64],
}

impl CodonTable {
    fn from_code(code: &[u8; 64]) -> Self {
        let mut table = [AminoAcid::Ter; 64];
        for (slot, &c) in table.iter_mut().zip(code.iter()) {
            // Both code strings only contain valid one-letter codes.
            *slot = AminoAcid::from_one_letter(c).unwrap_or(AminoAcid::Ter);
        }
        Self { table }
    }

    /// The standard genetic code (NCBI table 1).
    pub fn standard() -> &'static CodonTable {
        STANDARD.get_or_init(|| Self::from_code(STANDARD_CODE))
    }

    /// The vertebrate mitochondrial genetic code (NCBI table 2).
    pub fn mitochondrial() -> &'static CodonTable {
        MITOCHONDRIAL.get_or_init(|| Self::from_code(MITOCHONDRIAL_CODE))
    }

    /// Select the table for a chromosome name.
    pub fn for_chromosome(chrom: &str) -> &'static CodonTable {
        if is_mitochondrial(chrom) {
            Self::mitochondrial()
        } else {
            Self::standard()
        }
    }

    /// Translate a single codon.
    pub fn translate_codon(&self, codon: &[u8]) -> Result<AminoAcid, CsqError> {
        let invalid = || CsqError::InvalidCodon {
            codon: String::from_utf8_lossy(codon).into_owned(),
        };
        if codon.len() != 3 {
            return Err(invalid());
        }
        let i0 = base_index(codon[0]).ok_or_else(invalid)?;
        let i1 = base_index(codon[1]).ok_or_else(invalid)?;
        let i2 = base_index(codon[2]).ok_or_else(invalid)?;
        Ok(self.table[i0 * 16 + i1 * 4 + i2])
    }

    /// Whether the codon is a stop codon in this table.
    pub fn is_stop(&self, codon: &[u8]) -> bool {
        matches!(self.translate_codon(codon), Ok(AminoAcid::Ter))
    }

    /// Translate complete codons from the start of `seq`.
    ///
    /// A trailing partial codon is ignored. With `end_at_stop` translation stops
    /// after the first stop codon, which is included in the output.
    pub fn translate(&self, seq: &[u8], end_at_stop: bool) -> Result<Vec<AminoAcid>, CsqError> {
        let mut protein = Vec::with_capacity(seq.len() / 3);
        for codon in seq.chunks_exact(3) {
            let aa = self.translate_codon(codon)?;
            protein.push(aa);
            if end_at_stop && aa.is_stop() {
                break;
            }
        }
        Ok(protein)
    }

    /// Index of the first in-frame stop codon at or after codon `from`.
    pub fn find_stop(&self, seq: &[u8], from: usize) -> Result<Option<usize>, CsqError> {
        for (i, codon) in seq.chunks_exact(3).enumerate().skip(from) {
            if self.translate_codon(codon)?.is_stop() {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}

/// Whether a chromosome name denotes the mitochondrial genome.
pub fn is_mitochondrial(chrom: &str) -> bool {
    matches!(
        chrom.trim_start_matches("chr"),
        "M" | "MT" | "m" | "mt"
    )
}
