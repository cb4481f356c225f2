//! Per-document outcomes and batch summaries

use crate::priority::PriorityTier;
use crate::scan::ScanReport;
use serde::Serialize;
use std::fmt;

/// Outcome of scanning one document in a batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Scanned {
        name: String,
        elapsed_ms: u64,
        report: Box<ScanReport>,
    },
    Failed {
        name: String,
        elapsed_ms: u64,
        error: String,
    },
}

impl JobOutcome {
    pub fn name(&self) -> &str {
        match self {
            JobOutcome::Scanned { name, .. } | JobOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_scanned(&self) -> bool {
        matches!(self, JobOutcome::Scanned { .. })
    }

    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            JobOutcome::Scanned { report, .. } => Some(report),
            JobOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobOutcome::Failed { error, .. } => Some(error),
            JobOutcome::Scanned { .. } => None,
        }
    }

    pub fn tier(&self) -> Option<PriorityTier> {
        self.report().map(|report| report.classification.tier)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Scanned { name, report, .. } => write!(
                f,
                "{name}: {} ({})",
                report.classification.tier, report.classification.rule
            ),
            JobOutcome::Failed { name, error, .. } => write!(f, "{name}: failed: {error}"),
        }
    }
}

/// Totals over a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scanned: usize,
    pub failed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Documents whose tier is High
    pub requires_review: usize,
    pub elapsed_ms: u64,
    /// Outcomes in submission order
    pub results: Vec<JobOutcome>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tally outcomes
    pub fn from_outcomes(results: Vec<JobOutcome>, elapsed_ms: u64) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            elapsed_ms,
            ..BatchSummary::default()
        };
        for outcome in &results {
            match outcome.tier() {
                Some(tier) => {
                    summary.scanned += 1;
                    match tier {
                        PriorityTier::High => summary.high += 1,
                        PriorityTier::Medium => summary.medium += 1,
                        PriorityTier::Low => summary.low += 1,
                    }
                }
                None => summary.failed += 1,
            }
        }
        summary.requires_review = summary.high;
        summary.results = results;
        summary
    }

    pub fn tier_count(&self, tier: PriorityTier) -> usize {
        match tier {
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => self.low,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.results.iter().filter(|r| !r.is_scanned())
    }

    /// Plain-text report
    pub fn format_report(&self) -> String {
        let mut report = format!(
            "Batch Scan Summary\n\
             ==================\n\
             Documents: {}\n\
             Scanned: {}\n\
             Failed: {}\n\
             High: {}  Medium: {}  Low: {}\n\
             Requires review: {}\n\
             Duration: {:.2}s\n",
            self.total,
            self.scanned,
            self.failed,
            self.high,
            self.medium,
            self.low,
            self.requires_review,
            self.elapsed_ms as f64 / 1000.0
        );

        if self.failed > 0 {
            report.push_str("\nFailures:\n");
            for outcome in self.failures() {
                report.push_str(&format!("  {outcome}\n"));
            }
        }
        report
    }
}
