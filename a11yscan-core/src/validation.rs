//! Conformance validator report aggregation
//!
//! Reduces the rule summaries of an external PDF/UA validator (veraPDF JSON
//! output) to violation and failed-check totals plus two hard flags.
//!
//! Two static profiles shape the result:
//!
//! - the **ignore profile** lists `(clause, test)` pairs that are dropped
//!   before counting; they contribute to nothing,
//! - the **immediate-failure profile** maps `(clause, test)` pairs to a hard
//!   flag ([`HardFlag`]). A match sets the flag for the rest of the report but
//!   the rule still counts toward the totals.
//!
//! A report that does not have the expected shape is not an error: the
//! aggregate is zero-valued and a [`ScanWarning`] explains why.

use crate::error::{ScanWarning, WarningCode};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// One rule summary row of a validator report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub clause_id: String,
    pub test_number: String,
    pub failed_checks: u64,
}

impl RuleViolation {
    pub fn new(clause_id: impl Into<String>, test_number: impl Into<String>, failed_checks: u64) -> Self {
        Self {
            clause_id: clause_id.into(),
            test_number: test_number.into(),
            failed_checks,
        }
    }
}

/// Set of `(clause, test number)` pairs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleProfile(BTreeMap<String, BTreeSet<String>>);

/// Rules excluded from all counts
pub type IgnoreProfile = RuleProfile;

impl RuleProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, clause: impl Into<String>, test: impl Into<String>) {
        self.0.entry(clause.into()).or_default().insert(test.into());
    }

    pub fn contains(&self, clause: &str, test: &str) -> bool {
        self.0.get(clause).is_some_and(|tests| tests.contains(test))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Into<String>, T: Into<String>> FromIterator<(C, T)> for RuleProfile {
    fn from_iter<I: IntoIterator<Item = (C, T)>>(iter: I) -> Self {
        let mut profile = RuleProfile::new();
        for (clause, test) in iter {
            profile.insert(clause, test);
        }
        profile
    }
}

/// Flag raised by an immediate-failure rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardFlag {
    /// The validator found no structure tree
    Untagged,
    /// The validator suspects the content is images of text
    SuspectImageOnly,
}

/// Rules that raise a hard flag regardless of other evidence
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImmediateFailureProfile(BTreeMap<String, BTreeMap<String, HardFlag>>);

impl ImmediateFailureProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, clause: impl Into<String>, test: impl Into<String>, flag: HardFlag) {
        self.0
            .entry(clause.into())
            .or_default()
            .insert(test.into(), flag);
    }

    pub fn lookup(&self, clause: &str, test: &str) -> Option<HardFlag> {
        self.0.get(clause).and_then(|tests| tests.get(test)).copied()
    }
}

const DEFAULT_IGNORED_RULES: &[(&str, &[&str])] = &[
    ("5", &["1", "2"]),
    ("7.1", &["4", "6", "7"]),
    (
        "7.2",
        &[
            "3", "10", "15", "16", "19", "26", "27", "28", "36", "37", "38", "39", "40", "41",
            "42", "43",
        ],
    ),
    ("7.9", &["1"]),
    ("7.10", &["2"]),
    ("7.15", &["1"]),
    ("7.18.1", &["1"]),
    ("7.18.2", &["1"]),
    ("7.18.3", &["1"]),
    ("7.18.4", &["2"]),
    ("7.18.6.2", &["1"]),
    ("7.18.8", &["1"]),
    ("7.20", &["1"]),
    ("7.21.3.1", &["1"]),
    ("7.21.3.2", &["1"]),
    ("7.21.3.3", &["1"]),
    ("7.21.4.1", &["2"]),
    ("7.21.4.2", &["1", "2"]),
];

lazy_static! {
    /// PDF/UA-1 rules that Acrobat-exported documents routinely trip without
    /// any practical accessibility impact
    pub static ref DEFAULT_IGNORE_PROFILE: IgnoreProfile = DEFAULT_IGNORED_RULES
        .iter()
        .flat_map(|(clause, tests)| tests.iter().map(move |test| (*clause, *test)))
        .collect();

    /// 7.1-11: no structure tree; 7.1-3: content neither tagged nor artifact,
    /// typical of a scanned page
    pub static ref DEFAULT_IMMEDIATE_FAILURES: ImmediateFailureProfile = {
        let mut profile = ImmediateFailureProfile::new();
        profile.insert("7.1", "11", HardFlag::Untagged);
        profile.insert("7.1", "3", HardFlag::SuspectImageOnly);
        profile
    };
}

/// Aggregated validator signals for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violation_count: u64,
    pub failed_check_count: u64,
    pub untagged: bool,
    pub suspect_image_only: bool,
}

/// Aggregate plus the soft warnings raised while reading the report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub warnings: Vec<ScanWarning>,
}

/// Applies the ignore and immediate-failure profiles to validator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReportAggregator {
    ignore: IgnoreProfile,
    immediate_failures: ImmediateFailureProfile,
}

impl Default for ValidationReportAggregator {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORE_PROFILE.clone(),
            DEFAULT_IMMEDIATE_FAILURES.clone(),
        )
    }
}

impl ValidationReportAggregator {
    pub fn new(ignore: IgnoreProfile, immediate_failures: ImmediateFailureProfile) -> Self {
        Self {
            ignore,
            immediate_failures,
        }
    }

    pub fn is_ignored(&self, violation: &RuleViolation) -> bool {
        self.ignore
            .contains(&violation.clause_id, &violation.test_number)
    }

    /// Count the violations that survive the ignore profile
    pub fn aggregate(&self, violations: &[RuleViolation]) -> ValidationReport {
        let mut report = ValidationReport::default();

        for violation in violations {
            if self.is_ignored(violation) {
                continue;
            }

            match self
                .immediate_failures
                .lookup(&violation.clause_id, &violation.test_number)
            {
                Some(HardFlag::Untagged) => report.untagged = true,
                Some(HardFlag::SuspectImageOnly) => report.suspect_image_only = true,
                None => {}
            }

            report.violation_count += 1;
            report.failed_check_count = report
                .failed_check_count
                .saturating_add(violation.failed_checks);
        }

        report
    }

    /// Aggregate a parsed validator report
    pub fn aggregate_json(&self, report: &Value) -> ValidationOutcome {
        match extract_rule_summaries(report) {
            Ok((violations, warnings)) => ValidationOutcome {
                report: self.aggregate(&violations),
                warnings,
            },
            Err(reason) => {
                warn!("validator report unusable: {}", reason);
                ValidationOutcome {
                    report: ValidationReport::default(),
                    warnings: vec![ScanWarning::new(
                        WarningCode::MalformedValidatorReport,
                        reason,
                    )],
                }
            }
        }
    }

    /// Aggregate raw validator output; text that is not JSON at all (for
    /// example an empty file from a crashed validator) yields a zero report
    pub fn aggregate_str(&self, json: &str) -> ValidationOutcome {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => self.aggregate_json(&value),
            Err(e) => {
                warn!("validator report is not JSON: {}", e);
                ValidationOutcome {
                    report: ValidationReport::default(),
                    warnings: vec![ScanWarning::new(
                        WarningCode::MalformedValidatorReport,
                        format!("report is not valid JSON: {e}"),
                    )],
                }
            }
        }
    }
}

/// Take a single element from a value that is either that element or a
/// non-empty list of them
fn first_of<'v>(value: &'v Value, what: &str) -> Result<&'v Value, String> {
    match value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| format!("{what} is an empty list")),
        other => Ok(other),
    }
}

fn field<'v>(value: &'v Value, key: &str, path: &str) -> Result<&'v Value, String> {
    value
        .get(key)
        .ok_or_else(|| format!("missing {path}"))
}

/// Clause ids and test numbers appear both as JSON strings and numbers
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract rule summaries from a veraPDF JSON report.
///
/// Expected shape: `report.jobs[0].validationResult[0].details.ruleSummaries`,
/// where the top level and `validationResult` may also be single objects.
/// An empty `ruleSummaries` list is a valid, violation-free report.
pub fn extract_rule_summaries(
    report: &Value,
) -> Result<(Vec<RuleViolation>, Vec<ScanWarning>), String> {
    let root = first_of(report, "report document")?;
    let jobs = field(field(root, "report", "report")?, "jobs", "report.jobs")?;
    let job = match jobs {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| "report.jobs is an empty list".to_string())?,
        _ => return Err("report.jobs is not a list".to_string()),
    };
    let result = first_of(
        field(job, "validationResult", "report.jobs[0].validationResult")?,
        "validationResult",
    )?;
    let summaries = field(
        field(result, "details", "validationResult.details")?,
        "ruleSummaries",
        "validationResult.details.ruleSummaries",
    )?
    .as_array()
    .ok_or_else(|| "ruleSummaries is not a list".to_string())?;

    let mut violations = Vec::with_capacity(summaries.len());
    let mut warnings = Vec::new();

    for (index, entry) in summaries.iter().enumerate() {
        let Some(clause) = entry.get("clause").and_then(scalar_text) else {
            warnings.push(ScanWarning::new(
                WarningCode::MalformedRuleSummary,
                format!("rule summary {index} has no clause; skipped"),
            ));
            continue;
        };
        let test = entry
            .get("testNumber")
            .and_then(scalar_text)
            .unwrap_or_default();
        let failed_checks = match entry.get("failedChecks").and_then(count) {
            Some(n) => n,
            None => {
                warnings.push(ScanWarning::new(
                    WarningCode::MalformedRuleSummary,
                    format!("rule summary {index} ({clause}-{test}) has no failedChecks; counted as 0"),
                ));
                0
            }
        };
        violations.push(RuleViolation::new(clause, test, failed_checks));
    }

    Ok((violations, warnings))
}
