//! Batch scanning of many documents
//!
//! Documents are scanned in parallel by a fixed worker pool. One document
//! failing (missing file, unreadable snapshot, even a panic) is recorded as a
//! failed outcome and the rest of the batch carries on.
//!
//! # Example
//!
//! ```rust,no_run
//! use a11yscan::batch::{BatchManifest, BatchOptions, BatchScanner};
//! use a11yscan::{ScanConfig, Scanner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = BatchManifest::load("site-crawl/manifest.json")?;
//! let mut batch = BatchScanner::new(Scanner::new(ScanConfig::default()), BatchOptions::default());
//! batch.add_jobs(manifest.documents);
//!
//! let summary = batch.execute();
//! println!("{} of {} documents need review", summary.requires_review, summary.total);
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, ScanError};
use crate::scan::Scanner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub mod result;
pub mod worker;

pub use result::{BatchSummary, JobOutcome};
pub use worker::WorkerPool;

/// One document to scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    /// Label used in outcomes, typically the document URL or file name
    pub name: String,
    /// Document snapshot JSON
    pub snapshot: PathBuf,
    /// Validator report JSON
    pub validator_report: PathBuf,
}

impl ScanJob {
    pub fn new(
        name: impl Into<String>,
        snapshot: impl Into<PathBuf>,
        validator_report: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            snapshot: snapshot.into(),
            validator_report: validator_report.into(),
        }
    }
}

/// List of documents to scan, as read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub documents: Vec<ScanJob>,
}

impl BatchManifest {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScanError::InvalidConfig(format!("invalid batch manifest: {e}")))
    }

    /// Read a manifest; relative paths in it are taken relative to the
    /// manifest's own directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut manifest = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            for job in &mut manifest.documents {
                if job.snapshot.is_relative() {
                    job.snapshot = base.join(&job.snapshot);
                }
                if job.validator_report.is_relative() {
                    job.validator_report = base.join(&job.validator_report);
                }
            }
        }
        Ok(manifest)
    }
}

/// Options for batch scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of parallel workers
    pub parallelism: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get().min(8),
        }
    }
}

impl BatchOptions {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }
}

/// Collects scan jobs and runs them on a worker pool
pub struct BatchScanner {
    scanner: Arc<Scanner>,
    options: BatchOptions,
    jobs: Vec<ScanJob>,
}

impl BatchScanner {
    pub fn new(scanner: Scanner, options: BatchOptions) -> Self {
        Self {
            scanner: Arc::new(scanner),
            options,
            jobs: Vec::new(),
        }
    }

    pub fn add_job(&mut self, job: ScanJob) {
        self.jobs.push(job);
    }

    pub fn add_jobs(&mut self, jobs: impl IntoIterator<Item = ScanJob>) {
        self.jobs.extend(jobs);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Scan every job and tally the results
    pub fn execute(self) -> BatchSummary {
        if self.jobs.is_empty() {
            return BatchSummary::empty();
        }

        let start = Instant::now();
        let workers = self.options.parallelism.min(self.jobs.len());
        info!("scanning {} documents with {} workers", self.jobs.len(), workers);

        let pool = WorkerPool::new(workers, self.scanner);
        let outcomes = pool.process_jobs(self.jobs);
        let summary = BatchSummary::from_outcomes(outcomes, start.elapsed().as_millis() as u64);

        info!(
            "batch done: {} high, {} medium, {} low, {} failed",
            summary.high, summary.medium, summary.low, summary.failed
        );
        summary
    }
}
