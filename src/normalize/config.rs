//! Normalization configuration options

use serde::{Deserialize, Serialize};

use crate::reference::Strand;

/// Direction for variant shuffling along the forward genomic strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleDirection {
    /// Shuffle towards higher coordinates (3' of a plus-strand transcript)
    #[default]
    ThreePrime,
    /// Shuffle towards lower coordinates (3' of a minus-strand transcript)
    FivePrime,
}

impl ShuffleDirection {
    /// Direction that moves a variant towards the 3' end of a transcript on `strand`
    pub fn for_strand(strand: Strand) -> Self {
        match strand {
            Strand::Plus => ShuffleDirection::ThreePrime,
            Strand::Minus => ShuffleDirection::FivePrime,
        }
    }
}

impl std::fmt::Display for ShuffleDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShuffleDirection::ThreePrime => f.write_str("3'"),
            ShuffleDirection::FivePrime => f.write_str("5'"),
        }
    }
}

/// Configuration for variant normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Direction to shuffle indels
    pub shuffle_direction: ShuffleDirection,

    /// Number of reference bases fetched per provider call while shuffling
    pub window_size: u64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            shuffle_direction: ShuffleDirection::ThreePrime,
            window_size: 100,
        }
    }
}

impl NormalizeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config shuffling towards the 3' end of a transcript on `strand`
    pub fn for_strand(strand: Strand) -> Self {
        Self::default().with_direction(ShuffleDirection::for_strand(strand))
    }

    /// Set shuffle direction
    pub fn with_direction(mut self, direction: ShuffleDirection) -> Self {
        self.shuffle_direction = direction;
        self
    }

    /// Set the reference fetch window, clamped to at least one base
    pub fn with_window_size(mut self, size: u64) -> Self {
        self.window_size = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NormalizeConfig::default();
        assert_eq!(config.shuffle_direction, ShuffleDirection::ThreePrime);
        assert_eq!(config.window_size, 100);
    }

    #[test]
    fn test_direction_for_strand() {
        assert_eq!(
            ShuffleDirection::for_strand(Strand::Plus),
            ShuffleDirection::ThreePrime
        );
        assert_eq!(
            NormalizeConfig::for_strand(Strand::Minus).shuffle_direction,
            ShuffleDirection::FivePrime
        );
    }

    #[test]
    fn test_window_size_clamped() {
        assert_eq!(NormalizeConfig::new().with_window_size(0).window_size, 1);
    }
}
