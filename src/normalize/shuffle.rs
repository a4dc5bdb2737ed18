//! 3'/5' shuffling algorithm
//!
//! # Coordinate System
//!
//! Unlike the rest of the crate's array handling, this module works directly
//! on **1-based genomic positions**:
//!
//! | Value | Basis | Notes |
//! |-------|-------|-------|
//! | deletion `start`, `end` | 1-based | Inclusive span of deleted bases |
//! | insertion `after` | 1-based | Base the insertion follows; 0 = before base 1 |
//!
//! Reference bases are pulled lazily through a [`ReferenceWindow`], so a
//! shift through a long repeat costs one provider call per window.

use crate::error::CsqError;
use crate::normalize::config::ShuffleDirection;
use crate::reference::ReferenceProvider;

/// Lazily fetched reference bases around a variant
pub struct ReferenceWindow<'a, P: ReferenceProvider + ?Sized> {
    provider: &'a P,
    chrom: &'a str,
    window_size: u64,
    direction: ShuffleDirection,
    /// Extra bases kept behind the fetch point (in shift direction)
    span: u64,
    /// 1-based position of `bases[0]`
    offset: u64,
    bases: Vec<u8>,
    /// First position known to lie past the contig end
    contig_end: Option<u64>,
}

impl<'a, P: ReferenceProvider + ?Sized> ReferenceWindow<'a, P> {
    pub fn new(
        provider: &'a P,
        chrom: &'a str,
        window_size: u64,
        direction: ShuffleDirection,
    ) -> Self {
        Self {
            provider,
            chrom,
            window_size: window_size.max(1),
            direction,
            span: 0,
            offset: 0,
            bases: Vec::new(),
            contig_end: provider.contig_length(chrom).map(|len| len + 1),
        }
    }

    /// Keep at least `span` bases behind every fetch point, so both bases a
    /// deletion step compares come from one fetch
    pub fn widen(&mut self, span: u64) {
        self.span = self.span.max(span);
    }

    /// Base at a 1-based position, or `None` outside the contig
    pub fn base(&mut self, pos: u64) -> Result<Option<u8>, CsqError> {
        if pos == 0 || self.contig_end.is_some_and(|end| pos >= end) {
            return Ok(None);
        }
        if pos >= self.offset && pos < self.offset + self.bases.len() as u64 {
            return Ok(Some(self.bases[(pos - self.offset) as usize]));
        }

        let (from, length) = match self.direction {
            ShuffleDirection::ThreePrime => {
                let from = pos.saturating_sub(self.span).max(1);
                (from, pos - from + self.window_size)
            }
            ShuffleDirection::FivePrime => {
                let from = pos.saturating_sub(self.window_size - 1).max(1);
                (from, pos - from + 1 + self.span)
            }
        };
        let fetched = match self.provider.sequence(self.chrom, from, length) {
            Ok(seq) => seq.into_bytes(),
            Err(CsqError::SequenceNotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        if fetched.len() < length as usize {
            // The provider clips at the contig end.
            self.contig_end = Some(from + fetched.len() as u64);
        }
        self.offset = from;
        self.bases = fetched;

        if pos < self.offset + self.bases.len() as u64 {
            Ok(Some(self.bases[(pos - self.offset) as usize]))
        } else {
            Ok(None)
        }
    }
}

/// Result of a shuffle operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleResult {
    /// First affected position (deleted base, or the base an insertion follows)
    pub start: u64,
    /// Last deleted base; equal to `start` for insertions
    pub end: u64,
    /// Inserted bases after rotation; empty for deletions
    pub inserted: Vec<u8>,
    /// Whether the variant was moved
    pub shifted: bool,
}

/// Shuffle the deletion of `[start, end]` as far as the reference allows
pub fn shuffle_deletion<P: ReferenceProvider + ?Sized>(
    window: &mut ReferenceWindow<'_, P>,
    start: u64,
    end: u64,
    direction: ShuffleDirection,
) -> Result<ShuffleResult, CsqError> {
    let mut new_start = start;
    let mut new_end = end;
    window.widen(end - start + 1);

    match direction {
        ShuffleDirection::ThreePrime => loop {
            let next = window.base(new_end + 1)?;
            let first = window.base(new_start)?;
            match (next, first) {
                (Some(a), Some(b)) if a == b => {
                    new_start += 1;
                    new_end += 1;
                }
                _ => break,
            }
        },
        ShuffleDirection::FivePrime => {
            while new_start > 1 {
                let prev = window.base(new_start - 1)?;
                let last = window.base(new_end)?;
                match (prev, last) {
                    (Some(a), Some(b)) if a == b => {
                        new_start -= 1;
                        new_end -= 1;
                    }
                    _ => break,
                }
            }
        }
    }

    Ok(ShuffleResult {
        start: new_start,
        end: new_end,
        inserted: Vec::new(),
        shifted: new_start != start,
    })
}

/// Shuffle the insertion of `inserted` after base `after`, rotating the inserted bases
pub fn shuffle_insertion<P: ReferenceProvider + ?Sized>(
    window: &mut ReferenceWindow<'_, P>,
    after: u64,
    inserted: &[u8],
    direction: ShuffleDirection,
) -> Result<ShuffleResult, CsqError> {
    let mut alt = inserted.to_vec();
    let mut pos = after;

    if !alt.is_empty() {
        match direction {
            ShuffleDirection::ThreePrime => {
                while window.base(pos + 1)? == Some(alt[0]) {
                    alt.rotate_left(1);
                    pos += 1;
                }
            }
            ShuffleDirection::FivePrime => {
                while pos >= 1 && window.base(pos)? == alt.last().copied() {
                    alt.rotate_right(1);
                    pos -= 1;
                }
            }
        }
    }

    Ok(ShuffleResult {
        start: pos,
        end: pos,
        inserted: alt,
        shifted: pos != after,
    })
}
