//! Mock reference provider for testing

use crate::error::CsqError;
use crate::reference::provider::ReferenceProvider;
use std::collections::HashMap;
use std::path::Path;

/// In-memory reference provider
///
/// Each contig stores a sequence together with the 1-based genomic position of
/// its first base, so tests can model a small window of a real chromosome.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    contigs: HashMap<String, (u64, String)>,
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contig whose first base is position 1
    pub fn add_sequence(&mut self, chrom: impl Into<String>, sequence: impl Into<String>) {
        self.add_sequence_at(chrom, 1, sequence);
    }

    /// Add a contig fragment whose first base is the 1-based position `start`
    pub fn add_sequence_at(
        &mut self,
        chrom: impl Into<String>,
        start: u64,
        sequence: impl Into<String>,
    ) {
        self.contigs
            .insert(chrom.into(), (start, sequence.into().to_uppercase()));
    }

    /// Builder-style variant of [`MockProvider::add_sequence`]
    pub fn with_sequence(mut self, chrom: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.add_sequence(chrom, sequence);
        self
    }

    /// Load contigs from a JSON object of `{"chrom": "SEQUENCE"}`
    pub fn from_json(path: &Path) -> Result<Self, CsqError> {
        let content = std::fs::read_to_string(path)?;
        let map: HashMap<String, String> = serde_json::from_str(&content)?;
        let mut provider = Self::new();
        for (chrom, seq) in map {
            provider.add_sequence(chrom, seq);
        }
        Ok(provider)
    }
}

impl ReferenceProvider for MockProvider {
    fn sequence(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError> {
        let not_found = || CsqError::SequenceNotFound {
            chrom: chrom.to_string(),
            start,
            end: start + length.saturating_sub(1),
        };
        let (offset, seq) = self.contigs.get(chrom).ok_or_else(not_found)?;
        if start < *offset {
            return Err(not_found());
        }
        let from = (start - offset) as usize;
        if from >= seq.len() {
            return Err(not_found());
        }
        let to = (from + length as usize).min(seq.len());
        Ok(seq[from..to].to_string())
    }

    fn contig_length(&self, chrom: &str) -> Option<u64> {
        self.contigs
            .get(chrom)
            .map(|(offset, seq)| offset + seq.len() as u64 - 1)
    }
}
