//! Reference data abstraction
//!
//! Sequence providers and the transcript model.

pub mod fasta;
pub mod index;
pub mod mock;
pub mod provider;
pub mod transcript;

pub use fasta::FastaProvider;
pub use index::TranscriptIndex;
pub use mock::MockProvider;
pub use provider::ReferenceProvider;
pub use transcript::{Biotype, ExonOverlap, Interval, Strand, Transcript, TranscriptSource};
