//! Configuration for ferro-csq.
//!
//! [`AnnotatorConfig`] carries the annotation parameters. [`CsqConfig`] is the
//! on-disk form, read from `.ferro-csq.toml` files.
//!
//! # Example Configuration
//!
//! ```toml
//! [annotator]
//! max_dist_to_transcript = 5000
//! splice_region_ex = 3
//! splice_region_in_5 = 8
//! splice_region_in_3 = 8
//! window_size = 100
//!
//! [parallel]
//! chunk_size = 1000
//! num_threads = 0
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-csq.toml` in current directory
//! 2. `~/.config/ferro/csq.toml`
//!
//! CLI flags take precedence over config file settings.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CsqError;
use crate::parallel::ParallelConfig;

/// Parameters of the HGVS annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Largest distance at which up/downstream variants are still annotated
    pub max_dist_to_transcript: u64,
    /// Exonic bases on each side of an intron that count as splice region
    pub splice_region_ex: u64,
    /// Intronic bases after the donor side that count as splice region
    pub splice_region_in_5: u64,
    /// Intronic bases before the acceptor side that count as splice region
    pub splice_region_in_3: u64,
    /// Reference bases fetched per provider call while normalizing
    pub window_size: u64,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_dist_to_transcript: 5000,
            splice_region_ex: 3,
            splice_region_in_5: 8,
            splice_region_in_3: 8,
            window_size: 100,
        }
    }
}

impl AnnotatorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dist_to_transcript(mut self, dist: u64) -> Self {
        self.max_dist_to_transcript = dist;
        self
    }

    pub fn with_splice_region_ex(mut self, width: u64) -> Self {
        self.splice_region_ex = width;
        self
    }

    pub fn with_splice_region_in_5(mut self, width: u64) -> Self {
        self.splice_region_in_5 = width;
        self
    }

    pub fn with_splice_region_in_3(mut self, width: u64) -> Self {
        self.splice_region_in_3 = width;
        self
    }

    pub fn with_window_size(mut self, size: u64) -> Self {
        self.window_size = size;
        self
    }

    /// Reject zero-valued parameters
    pub fn validate(&self) -> Result<(), CsqError> {
        let fields = [
            ("max_dist_to_transcript", self.max_dist_to_transcript),
            ("splice_region_ex", self.splice_region_ex),
            ("splice_region_in_5", self.splice_region_in_5),
            ("splice_region_in_3", self.splice_region_in_3),
            ("window_size", self.window_size),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(CsqError::Config {
                msg: format!("{} must be at least 1", name),
            }),
            None => Ok(()),
        }
    }
}

/// Parsed configuration from a `.ferro-csq.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsqConfig {
    pub annotator: AnnotatorConfig,
    pub parallel: ParallelConfig,
}

impl CsqConfig {
    /// Load configuration from the default locations.
    ///
    /// Searches for config in:
    /// 1. `.ferro-csq.toml` in current directory
    /// 2. `~/.config/ferro/csq.toml`
    pub fn load() -> Option<Self> {
        let candidates = std::iter::once(PathBuf::from(".ferro-csq.toml")).chain(
            dirs_home().map(|home| home.join(".config").join("ferro").join("csq.toml")),
        );
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(config) => {
                    debug!("Loaded configuration from {}", path.display());
                    return Some(config);
                }
                Err(e) => debug!("Ignoring {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, CsqError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, CsqError> {
        let config: CsqConfig = toml::from_str(content)?;
        config.annotator.validate()?;
        Ok(config)
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
