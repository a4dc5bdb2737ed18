//! Reference provider trait
//!
//! Defines the interface for random access to genomic sequence.

use crate::error::CsqError;

/// Trait for providing reference sequence data
///
/// Implementations are not required to be `Sync`: the FASTA provider keeps an
/// open file handle behind a `RefCell`. Concurrent callers each own a provider
/// (see [`crate::parallel`]).
pub trait ReferenceProvider {
    /// Get `length` bases starting at the 1-based position `start`
    ///
    /// The result is uppercase. It may be shorter than `length` when the
    /// region runs past the end of the contig; a `start` outside the contig
    /// is an error.
    fn sequence(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError>;

    /// Length of a contig, if known
    fn contig_length(&self, _chrom: &str) -> Option<u64> {
        None
    }

    /// Get a single base at a 1-based position
    fn base(&self, chrom: &str, pos: u64) -> Result<u8, CsqError> {
        let seq = self.sequence(chrom, pos, 1)?;
        seq.bytes().next().ok_or_else(|| CsqError::SequenceNotFound {
            chrom: chrom.to_string(),
            start: pos,
            end: pos,
        })
    }

    /// Get exactly `length` bases, failing if the contig ends early
    fn sequence_exact(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError> {
        let seq = self.sequence(chrom, start, length)?;
        if seq.len() as u64 != length {
            return Err(CsqError::SequenceNotFound {
                chrom: chrom.to_string(),
                start,
                end: start + length.saturating_sub(1),
            });
        }
        Ok(seq)
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for &P {
    fn sequence(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError> {
        (**self).sequence(chrom, start, length)
    }

    fn contig_length(&self, chrom: &str) -> Option<u64> {
        (**self).contig_length(chrom)
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for Box<P> {
    fn sequence(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError> {
        (**self).sequence(chrom, start, length)
    }

    fn contig_length(&self, chrom: &str) -> Option<u64> {
        (**self).contig_length(chrom)
    }
}
