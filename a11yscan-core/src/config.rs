//! Scan configuration
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "max_structure_depth": 64,
//!   "approved_generators": ["Equidox 7", "CommonLook PDF"]
//! }
//! ```
//!
//! The priority thresholds are not configurable: the tier contract with
//! downstream reporting is fixed.

use crate::error::{Result, ScanError};
use crate::metadata::DEFAULT_APPROVED_GENERATORS;
use crate::page_content::{
    PageContentClassifier, DEFAULT_FULL_PAGE_RATIO_MAX, DEFAULT_FULL_PAGE_RATIO_MIN,
};
use crate::structure::{
    StructureTreeWalker, DEFAULT_MAX_STRUCTURE_DEPTH, DEFAULT_MAX_STRUCTURE_NODES,
};
use crate::validation::{
    IgnoreProfile, ImmediateFailureProfile, ValidationReportAggregator, DEFAULT_IGNORE_PROFILE,
    DEFAULT_IMMEDIATE_FAILURES,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for scanning documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Structure tree nesting below which branches are cut
    pub max_structure_depth: usize,
    /// Structure nodes visited per document before the walk stops
    pub max_structure_nodes: usize,
    /// Validator rules excluded from all counts
    pub ignore_profile: IgnoreProfile,
    /// Validator rules that raise a hard flag
    pub immediate_failures: ImmediateFailureProfile,
    /// Producers trusted to emit accessible output
    pub approved_generators: Vec<String>,
    /// Inclusive image-to-page area ratio bounds for a full-page image
    pub full_page_ratio_min: f64,
    pub full_page_ratio_max: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_structure_depth: DEFAULT_MAX_STRUCTURE_DEPTH,
            max_structure_nodes: DEFAULT_MAX_STRUCTURE_NODES,
            ignore_profile: DEFAULT_IGNORE_PROFILE.clone(),
            immediate_failures: DEFAULT_IMMEDIATE_FAILURES.clone(),
            approved_generators: DEFAULT_APPROVED_GENERATORS
                .iter()
                .map(|g| g.to_string())
                .collect(),
            full_page_ratio_min: DEFAULT_FULL_PAGE_RATIO_MIN,
            full_page_ratio_max: DEFAULT_FULL_PAGE_RATIO_MAX,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ScanConfig = serde_json::from_str(json)
            .map_err(|e| ScanError::InvalidConfig(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_structure_depth == 0 {
            return Err(ScanError::InvalidConfig(
                "max_structure_depth must be at least 1".to_string(),
            ));
        }
        if self.max_structure_nodes == 0 {
            return Err(ScanError::InvalidConfig(
                "max_structure_nodes must be at least 1".to_string(),
            ));
        }
        let (min, max) = (self.full_page_ratio_min, self.full_page_ratio_max);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ScanError::InvalidConfig(format!(
                "full page ratio bounds must satisfy 0 < min <= max, got {min}..={max}"
            )));
        }
        Ok(())
    }

    pub fn with_max_structure_depth(mut self, depth: usize) -> Self {
        self.max_structure_depth = depth;
        self
    }

    pub fn with_max_structure_nodes(mut self, nodes: usize) -> Self {
        self.max_structure_nodes = nodes;
        self
    }

    pub fn with_ignore_profile(mut self, profile: IgnoreProfile) -> Self {
        self.ignore_profile = profile;
        self
    }

    pub fn with_immediate_failures(mut self, profile: ImmediateFailureProfile) -> Self {
        self.immediate_failures = profile;
        self
    }

    pub fn with_approved_generators<I, S>(mut self, generators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.approved_generators = generators.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_full_page_ratio(mut self, min: f64, max: f64) -> Self {
        self.full_page_ratio_min = min;
        self.full_page_ratio_max = max;
        self
    }

    pub fn aggregator(&self) -> ValidationReportAggregator {
        ValidationReportAggregator::new(
            self.ignore_profile.clone(),
            self.immediate_failures.clone(),
        )
    }

    pub fn walker(&self) -> StructureTreeWalker {
        StructureTreeWalker::new()
            .with_max_depth(self.max_structure_depth)
            .with_max_nodes(self.max_structure_nodes)
    }

    pub fn page_classifier(&self) -> PageContentClassifier {
        PageContentClassifier::new()
            .with_ratio_bounds(self.full_page_ratio_min, self.full_page_ratio_max)
    }
}
