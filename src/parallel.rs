//! Parallel batch annotation
//!
//! Annotates many (transcript, variant) pairs with rayon. Enable with the
//! `parallel` feature.
//!
//! Reference providers are not required to be `Sync`, so each worker builds
//! its own from a factory.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() -> Result<(), ferro_csq::CsqError> {
//! use ferro_csq::parallel::{annotate_batch, ParallelConfig};
//! use ferro_csq::{FastaProvider, GenomicVariant, HgvsAnnotator, TranscriptIndex};
//!
//! let index = TranscriptIndex::from_json("transcripts.json".as_ref())?;
//! let Some(transcript) = index.get("NM_000001.1") else { return Ok(()) };
//! let jobs = vec![(transcript, GenomicVariant::new("chr1", 12345, "A", "G"))];
//!
//! let annotator = HgvsAnnotator::default();
//! let results = annotate_batch(
//!     &annotator,
//!     || FastaProvider::new("genome.fa"),
//!     &jobs,
//!     &ParallelConfig::default(),
//! );
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CsqError;
use crate::reference::Transcript;
use crate::variant::GenomicVariant;

#[cfg(feature = "parallel")]
use {
    crate::annotate::HgvsAnnotator,
    crate::effect::VariantConsequence,
    crate::reference::ReferenceProvider,
    log::{info, warn},
    rayon::prelude::*,
};

/// One unit of batch work
pub type Job<'a> = (&'a Transcript, GenomicVariant);

/// Annotate jobs in parallel
///
/// Returns one result per job, in input order. When the provider factory
/// fails, every job handled by that worker carries the factory's error.
#[cfg(feature = "parallel")]
pub fn annotate_batch<P, F>(
    annotator: &HgvsAnnotator,
    provider_factory: F,
    jobs: &[Job<'_>],
    config: &ParallelConfig,
) -> Vec<Result<VariantConsequence, CsqError>>
where
    P: ReferenceProvider,
    F: Fn() -> Result<P, CsqError> + Sync + Send,
{
    let run = || -> Vec<Result<VariantConsequence, CsqError>> {
        jobs.par_iter()
            .with_min_len(config.chunk_size.max(1))
            .map_init(&provider_factory, |provider, (transcript, variant)| {
                match provider {
                    Ok(provider) => annotator.annotate(transcript, variant, &*provider),
                    Err(e) => Err(e.clone()),
                }
            })
            .collect()
    };

    let results = match config.num_threads {
        0 => run(),
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("Could not build a pool of {} threads ({}), using the global pool", n, e);
                run()
            }
        },
    };

    for ((transcript, variant), result) in jobs.iter().zip(&results) {
        if let Err(e) = result {
            warn!("{} on {}: {}", variant, transcript.name(), e);
        }
    }
    let stats = BatchStats::from_results(&results);
    info!(
        "Annotated {} of {} variant/transcript pairs ({:.1}%)",
        stats.success,
        stats.total,
        stats.success_rate()
    );
    results
}

/// Annotate jobs in parallel, dropping failures
///
/// Failed jobs are logged by [`annotate_batch`] and left out of the output.
#[cfg(feature = "parallel")]
pub fn annotate_batch_ok<P, F>(
    annotator: &HgvsAnnotator,
    provider_factory: F,
    jobs: &[Job<'_>],
    config: &ParallelConfig,
) -> Vec<VariantConsequence>
where
    P: ReferenceProvider,
    F: Fn() -> Result<P, CsqError> + Sync + Send,
{
    annotate_batch(annotator, provider_factory, jobs, config)
        .into_iter()
        .filter_map(Result::ok)
        .collect()
}

/// Configuration for parallel batch processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum number of jobs a worker takes at once
    pub chunk_size: usize,
    /// Number of threads (0 = use rayon default)
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            num_threads: 0,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size for batched processing
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the number of threads
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}

/// Outcome counts of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Total items processed
    pub total: usize,
    /// Successfully processed
    pub success: usize,
    /// Failed to process
    pub errors: usize,
}

impl BatchStats {
    /// Count the outcomes of a batch
    pub fn from_results<T>(results: &[Result<T, CsqError>]) -> Self {
        let success = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            success,
            errors: results.len() - success,
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}
