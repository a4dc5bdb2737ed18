//! Normalization engine
//!
//! Turns a [`GenomicVariant`] into a minimal, shifted [`NormalizedVariant`]:
//!
//! 1. validate the alleles and check the reference allele against the provider;
//! 2. trim the common suffix, then the common prefix;
//! 3. shuffle pure insertions and deletions in the configured direction.
//!
//! SNVs and delins are never shifted. HGVS places a variant at its most 3'
//! position in transcript direction, so the annotator shuffles towards higher
//! coordinates for plus-strand transcripts and towards lower coordinates for
//! minus-strand ones (see [`ShuffleDirection::for_strand`]).
//!
//! # Coordinate Systems
//!
//! | Context | Basis | Notes |
//! |---------|-------|-------|
//! | `GenomicVariant.start` | 1-based | Insertions follow base `start` |
//! | `NormalizedVariant.start` | 1-based | Insertions follow base `start` |
//! | Allele slicing | 0-based | `usize` indices into the allele strings |

pub mod config;
pub mod shuffle;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CsqError;
use crate::reference::ReferenceProvider;
use crate::sequence::is_valid_dna;
use crate::variant::{GenomicVariant, VariantKind};
pub use config::{NormalizeConfig, ShuffleDirection};
use shuffle::{shuffle_deletion, shuffle_insertion, ReferenceWindow};

/// A minimal, shifted variant
///
/// For [`VariantKind::Insertion`] the reference allele is empty and the
/// inserted bases follow base `start`. Otherwise `ref_allele` covers
/// `[start, end()]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedVariant {
    pub chrom: String,
    pub start: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub kind: VariantKind,
}

impl NormalizedVariant {
    /// Last reference base covered; the anchor base for insertions
    pub fn end(&self) -> u64 {
        match self.kind {
            VariantKind::Insertion => self.start,
            _ => self.start + self.ref_allele.len() as u64 - 1,
        }
    }

    /// Net change in sequence length
    pub fn length_change(&self) -> i64 {
        self.alt_allele.len() as i64 - self.ref_allele.len() as i64
    }

    /// Convert back to the plain variant form, which normalizes to `self`
    pub fn to_variant(&self) -> GenomicVariant {
        GenomicVariant::new(
            self.chrom.clone(),
            self.start,
            self.ref_allele.clone(),
            self.alt_allele.clone(),
        )
    }

    /// VCF-style representation with a shared anchor base for indels
    ///
    /// The anchor is the base before the event, or the base after it when the
    /// event starts at position 1.
    pub fn to_vcf<P: ReferenceProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<GenomicVariant, CsqError> {
        match self.kind {
            VariantKind::Snv | VariantKind::Delins => Ok(self.to_variant()),
            VariantKind::Insertion if self.start >= 1 => {
                let anchor = provider.base(&self.chrom, self.start)? as char;
                Ok(GenomicVariant::new(
                    self.chrom.clone(),
                    self.start,
                    anchor.to_string(),
                    format!("{}{}", anchor, self.alt_allele),
                ))
            }
            VariantKind::Insertion => {
                let anchor = provider.base(&self.chrom, 1)? as char;
                Ok(GenomicVariant::new(
                    self.chrom.clone(),
                    1,
                    anchor.to_string(),
                    format!("{}{}", self.alt_allele, anchor),
                ))
            }
            VariantKind::Deletion if self.start > 1 => {
                let anchor = provider.base(&self.chrom, self.start - 1)? as char;
                Ok(GenomicVariant::new(
                    self.chrom.clone(),
                    self.start - 1,
                    format!("{}{}", anchor, self.ref_allele),
                    anchor.to_string(),
                ))
            }
            VariantKind::Deletion => {
                let anchor = provider.base(&self.chrom, self.end() + 1)? as char;
                Ok(GenomicVariant::new(
                    self.chrom.clone(),
                    self.start,
                    format!("{}{}", self.ref_allele, anchor),
                    anchor.to_string(),
                ))
            }
        }
    }
}

impl fmt::Display for NormalizedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_variant())
    }
}

/// Main normalizer
pub struct Normalizer<P: ReferenceProvider> {
    provider: P,
    config: NormalizeConfig,
}

impl<P: ReferenceProvider> Normalizer<P> {
    /// Create a new normalizer with default configuration
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: NormalizeConfig::default(),
        }
    }

    /// Create a normalizer with custom configuration
    pub fn with_config(provider: P, config: NormalizeConfig) -> Self {
        Self { provider, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalize a variant
    pub fn normalize(&self, variant: &GenomicVariant) -> Result<NormalizedVariant, CsqError> {
        let ref_allele = variant.ref_bases().to_ascii_uppercase();
        let alt_allele = variant.alt_bases().to_ascii_uppercase();
        let invalid = |msg: &str| CsqError::InvalidVariant {
            variant: variant.to_string(),
            msg: msg.to_string(),
        };

        if variant.start == 0 {
            return Err(invalid("positions are 1-based"));
        }
        if !is_valid_dna(&ref_allele) || !is_valid_dna(&alt_allele) {
            return Err(invalid("alleles may only contain A, C, G, T and N"));
        }
        if ref_allele == alt_allele {
            return Err(invalid("reference and alternate alleles are identical"));
        }

        self.check_reference(variant, &ref_allele)?;

        let (start, ref_trimmed, alt_trimmed) = trim(variant.start, &ref_allele, &alt_allele);
        let kind = VariantKind::classify(ref_trimmed, alt_trimmed);
        let direction = self.config.shuffle_direction;

        let normalized = match kind {
            VariantKind::Snv | VariantKind::Delins => NormalizedVariant {
                chrom: variant.chrom.clone(),
                start,
                ref_allele: ref_trimmed.to_string(),
                alt_allele: alt_trimmed.to_string(),
                kind,
            },
            VariantKind::Insertion => {
                let mut window = self.window(&variant.chrom);
                let result =
                    shuffle_insertion(&mut window, start, alt_trimmed.as_bytes(), direction)?;
                if result.shifted {
                    debug!(
                        "Shifted insertion {} from {} to {} ({})",
                        variant, start, result.start, direction
                    );
                }
                NormalizedVariant {
                    chrom: variant.chrom.clone(),
                    start: result.start,
                    ref_allele: String::new(),
                    alt_allele: String::from_utf8_lossy(&result.inserted).into_owned(),
                    kind,
                }
            }
            VariantKind::Deletion => {
                let end = start + ref_trimmed.len() as u64 - 1;
                let mut window = self.window(&variant.chrom);
                let result = shuffle_deletion(&mut window, start, end, direction)?;
                let ref_allele = if result.shifted {
                    debug!(
                        "Shifted deletion {} from {}-{} to {}-{} ({})",
                        variant, start, end, result.start, result.end, direction
                    );
                    self.provider.sequence_exact(
                        &variant.chrom,
                        result.start,
                        result.end - result.start + 1,
                    )?
                } else {
                    ref_trimmed.to_string()
                };
                NormalizedVariant {
                    chrom: variant.chrom.clone(),
                    start: result.start,
                    ref_allele,
                    alt_allele: String::new(),
                    kind,
                }
            }
        };
        Ok(normalized)
    }

    fn window<'a>(&'a self, chrom: &'a str) -> ReferenceWindow<'a, P> {
        ReferenceWindow::new(
            &self.provider,
            chrom,
            self.config.window_size,
            self.config.shuffle_direction,
        )
    }

    /// Reject a reference allele that disagrees with the genome
    fn check_reference(&self, variant: &GenomicVariant, ref_allele: &str) -> Result<(), CsqError> {
        if ref_allele.is_empty() {
            // The anchor base of an insertion must exist.
            self.provider.base(&variant.chrom, variant.start)?;
            return Ok(());
        }
        let found =
            self.provider
                .sequence_exact(&variant.chrom, variant.start, ref_allele.len() as u64)?;
        if found != ref_allele {
            return Err(CsqError::ReferenceMismatch {
                location: format!("{}:{}", variant.chrom, variant.start),
                expected: ref_allele.to_string(),
                found,
            });
        }
        Ok(())
    }
}

/// Trim the shared suffix, then the shared prefix
///
/// Returns the adjusted start; for an insertion that is the base the inserted
/// sequence follows.
fn trim<'a>(start: u64, ref_allele: &'a str, alt_allele: &'a str) -> (u64, &'a str, &'a str) {
    if ref_allele.is_empty() {
        return (start, ref_allele, alt_allele);
    }
    let (r, a) = (ref_allele.as_bytes(), alt_allele.as_bytes());
    let suffix = r
        .iter()
        .rev()
        .zip(a.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let r = &ref_allele[..r.len() - suffix];
    let a = &alt_allele[..a.len() - suffix];
    let prefix = r
        .bytes()
        .zip(a.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    let r = &r[prefix..];
    let a = &a[prefix..];
    let start = if r.is_empty() {
        start + prefix as u64 - 1
    } else {
        start + prefix as u64
    };
    (start, r, a)
}
