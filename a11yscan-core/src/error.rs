use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("Invalid object reference: {0} {1} R")]
    InvalidObjectReference(u32, u16),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Machine-readable code attached to a [`ScanWarning`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    MalformedValidatorReport,
    MalformedRuleSummary,
    StructureDepthExceeded,
    StructureNodeBudgetExceeded,
    MetadataUnreadable,
    LayoutPageMismatch,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::MalformedValidatorReport => "MALFORMED_VALIDATOR_REPORT",
            WarningCode::MalformedRuleSummary => "MALFORMED_RULE_SUMMARY",
            WarningCode::StructureDepthExceeded => "STRUCTURE_DEPTH_EXCEEDED",
            WarningCode::StructureNodeBudgetExceeded => "STRUCTURE_NODE_BUDGET_EXCEEDED",
            WarningCode::MetadataUnreadable => "METADATA_UNREADABLE",
            WarningCode::LayoutPageMismatch => "LAYOUT_PAGE_MISMATCH",
        }
    }
}

/// A non-fatal problem found while scanning one document.
///
/// Warnings never change control flow: the scan still produces a report,
/// with the affected signal degraded to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub code: WarningCode,
    pub message: String,
}

impl ScanWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}
