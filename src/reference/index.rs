//! Chromosomal interval index over transcripts

use std::collections::HashMap;
use std::path::Path;

use crate::error::CsqError;
use crate::reference::transcript::Transcript;

/// Transcripts grouped by chromosome and sorted by start position
#[derive(Debug, Clone, Default)]
pub struct TranscriptIndex {
    by_chrom: HashMap<String, Vec<Transcript>>,
    /// Longest transcript span per chromosome, bounds the backwards scan
    max_span: HashMap<String, u64>,
}

impl TranscriptIndex {
    pub fn new(transcripts: impl IntoIterator<Item = Transcript>) -> Self {
        let mut by_chrom: HashMap<String, Vec<Transcript>> = HashMap::new();
        for transcript in transcripts {
            by_chrom
                .entry(transcript.chromosome().to_string())
                .or_default()
                .push(transcript);
        }
        let mut max_span = HashMap::new();
        for (chrom, list) in by_chrom.iter_mut() {
            list.sort_by(|a, b| (a.start(), a.name()).cmp(&(b.start(), b.name())));
            let longest = list
                .iter()
                .map(|t| t.end() - t.start() + 1)
                .max()
                .unwrap_or(0);
            max_span.insert(chrom.clone(), longest);
        }
        Self { by_chrom, max_span }
    }

    /// Load a JSON array of transcripts
    pub fn from_json(path: &Path) -> Result<Self, CsqError> {
        let content = std::fs::read_to_string(path)?;
        let transcripts: Vec<Transcript> = serde_json::from_str(&content)?;
        Ok(Self::new(transcripts))
    }

    /// Number of indexed transcripts
    pub fn len(&self) -> usize {
        self.by_chrom.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a transcript by name
    pub fn get(&self, name: &str) -> Option<&Transcript> {
        self.by_chrom
            .values()
            .flat_map(|list| list.iter())
            .find(|t| t.name() == name)
    }

    /// Transcripts whose span, extended by `flank` on both sides, overlaps `[start, end]`
    pub fn overlapping(&self, chrom: &str, start: u64, end: u64, flank: u64) -> Vec<&Transcript> {
        let Some(list) = self.by_chrom.get(chrom) else {
            return Vec::new();
        };
        let span = self.max_span.get(chrom).copied().unwrap_or(0);
        let lowest = start.saturating_sub(flank).saturating_sub(span);
        let upper = end.saturating_add(flank);
        let from = list.partition_point(|t| t.start() < lowest);
        list[from..]
            .iter()
            .take_while(|t| t.start() <= upper)
            .filter(|t| t.end().saturating_add(flank) >= start)
            .collect()
    }
}
