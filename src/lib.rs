// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-csq: HGVS consequence annotation
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Given a genomic variant and a transcript model, ferro-csq computes the
//! HGVS `c.`/`n.` and `p.` descriptions, the exon or intron the variant falls
//! in, a set of Sequence Ontology consequence tags, and an aggregate impact.
//!
//! # Example
//!
//! ```
//! use ferro_csq::{
//!     Consequence, GenomicVariant, HgvsAnnotator, Impact, Interval, MockProvider, Strand,
//!     Transcript,
//! };
//!
//! // Two exons, coding from base 3 to base 26
//! let provider = MockProvider::new().with_sequence("chr1", "GGATGCCTTAGGTAAGCCCCAGAAATAGCC");
//! let transcript = Transcript::new(
//!     "NM_000001.1",
//!     "GENE",
//!     "chr1",
//!     Strand::Plus,
//!     vec![Interval::new(1, 12), Interval::new(21, 30)],
//!     Some((3, 26)),
//! )
//! .unwrap();
//!
//! let annotator = HgvsAnnotator::default();
//! let variant = GenomicVariant::new("chr1", 14, "A", "G");
//! let csq = annotator.annotate(&transcript, &variant, &provider).unwrap();
//!
//! assert_eq!(csq.hgvs_c, "c.10+2A>G");
//! assert_eq!(csq.intron_number, Some(1));
//! assert!(csq.has(Consequence::SpliceDonorVariant));
//! assert_eq!(csq.impact, Impact::High);
//! ```

pub mod annotate;
pub mod config;
pub mod convert;
pub mod coords;
pub mod effect;
pub mod error;
pub mod normalize;
pub mod parallel;
pub mod reference;
pub mod sequence;
pub mod variant;

// Re-export commonly used types
pub use annotate::HgvsAnnotator;
pub use config::{AnnotatorConfig, CsqConfig};
pub use convert::{hgvs_to_variant, parse_description, HgvsDescription, NaEdit};
pub use effect::{Consequence, Impact, VariantConsequence};
pub use error::{CsqError, ErrorCode};
pub use normalize::{NormalizeConfig, NormalizedVariant, Normalizer, ShuffleDirection};
pub use reference::{
    Biotype, ExonOverlap, FastaProvider, Interval, MockProvider, ReferenceProvider, Strand,
    Transcript, TranscriptIndex, TranscriptSource,
};
pub use variant::{GenomicVariant, VariantKind};

// Re-export coordinate types used by transcript position mapping
pub use coords::{Anchor, CoordinateSystem, Locus, Region, TxPosition};

/// Result type alias for ferro-csq operations
pub type Result<T> = std::result::Result<T, CsqError>;
