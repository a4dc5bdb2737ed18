//! Error types for ferro-csq
//!
//! Every failure the annotation pipeline can surface is a [`CsqError`] variant.
//! Each variant maps onto a stable [`ErrorCode`] so that batch drivers can
//! tally and filter failures without matching on message text.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (E1xxx)
    /// Malformed variant alleles
    InvalidVariant = 1001,
    /// Malformed HGVS description
    InvalidHgvs = 1002,
    /// Invalid nucleotide in a codon
    InvalidCodon = 1003,

    // Reference errors (E2xxx)
    /// Sequence not available from the provider
    SequenceNotFound = 2001,
    /// Reference allele disagrees with the genome
    ReferenceMismatch = 2002,

    // Transcript model errors (E3xxx)
    /// Transcript structure violates model invariants
    MalformedTranscript = 3001,
    /// Coordinate outside the transcript
    InvalidCoordinates = 3002,

    // Annotation errors (E4xxx)
    /// Variant too far away from the transcript
    OutOfRange = 4001,

    // IO and configuration errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidVariant => "invalid variant",
            ErrorCode::InvalidHgvs => "invalid HGVS description",
            ErrorCode::InvalidCodon => "untranslatable codon",
            ErrorCode::SequenceNotFound => "sequence not available",
            ErrorCode::ReferenceMismatch => "reference sequence mismatch",
            ErrorCode::MalformedTranscript => "malformed transcript",
            ErrorCode::InvalidCoordinates => "invalid coordinates",
            ErrorCode::OutOfRange => "variant out of range of transcript",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
            ErrorCode::ConfigError => "configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-csq
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsqError {
    /// Variant alleles are malformed
    #[error("Invalid variant {variant}: {msg}")]
    InvalidVariant { variant: String, msg: String },

    /// An HGVS description could not be parsed
    #[error("Invalid HGVS description '{input}': {msg}")]
    InvalidHgvs { input: String, msg: String },

    /// A codon containing bases outside ACGT
    #[error("Cannot translate codon '{codon}'")]
    InvalidCodon { codon: String },

    /// The reference provider has no sequence for the requested region
    #[error("Sequence not available for {chrom}:{start}-{end}")]
    SequenceNotFound { chrom: String, start: u64, end: u64 },

    /// Reference sequence mismatch
    #[error("Reference mismatch at {location}: expected {expected}, found {found}")]
    ReferenceMismatch {
        location: String,
        expected: String,
        found: String,
    },

    /// Transcript violates the coordinate model invariants
    #[error("Malformed transcript {transcript}: {msg}")]
    MalformedTranscript { transcript: String, msg: String },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// Variant lies beyond the maximum distance to the transcript
    #[error("Variant {variant} is {distance} bp from transcript {transcript} (maximum {max_dist})")]
    OutOfRange {
        variant: String,
        transcript: String,
        distance: u64,
        max_dist: u64,
    },

    /// IO error
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON error
    #[error("JSON error: {msg}")]
    Json { msg: String },

    /// Configuration error
    #[error("Configuration error: {msg}")]
    Config { msg: String },
}

impl CsqError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CsqError::InvalidVariant { .. } => ErrorCode::InvalidVariant,
            CsqError::InvalidHgvs { .. } => ErrorCode::InvalidHgvs,
            CsqError::InvalidCodon { .. } => ErrorCode::InvalidCodon,
            CsqError::SequenceNotFound { .. } => ErrorCode::SequenceNotFound,
            CsqError::ReferenceMismatch { .. } => ErrorCode::ReferenceMismatch,
            CsqError::MalformedTranscript { .. } => ErrorCode::MalformedTranscript,
            CsqError::InvalidCoordinates { .. } => ErrorCode::InvalidCoordinates,
            CsqError::OutOfRange { .. } => ErrorCode::OutOfRange,
            CsqError::Io { .. } => ErrorCode::IoError,
            CsqError::Json { .. } => ErrorCode::JsonError,
            CsqError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Shorthand for building a coordinate error
    pub(crate) fn coordinates(msg: impl Into<String>) -> Self {
        CsqError::InvalidCoordinates { msg: msg.into() }
    }
}

impl From<std::io::Error> for CsqError {
    fn from(err: std::io::Error) -> Self {
        CsqError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CsqError {
    fn from(err: serde_json::Error) -> Self {
        CsqError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CsqError {
    fn from(err: toml::de::Error) -> Self {
        CsqError::Config {
            msg: err.to_string(),
        }
    }
}
