//! Remediation priority classification
//!
//! A document's signals are folded into a [`DocumentFeatureVector`] and run
//! through one ordered decision table. The first rule that matches decides
//! the [`PriorityTier`]; later rules are never consulted. The binary
//! "requires review" answer is derived from the same table (`tier == High`)
//! so the two can never disagree.
//!
//! | # | Rule | Tier |
//! |---|------|------|
//! | 1 | document is not tagged | High |
//! | 2 | content is image only | High |
//! | 3 | more than 20 failed checks per page | High |
//! | 4 | has a form and more than 3 failed checks per page | High |
//! | 5 | produced by an approved generator | Low |
//! | 6 | at least 5 failed checks per page | Medium |
//! | 7 | any failed checks per page | Low |
//! | 8 | otherwise | Low |

use crate::page_content::TextType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors per page above which a document is High priority
pub const HIGH_ERROR_DENSITY: u64 = 20;

/// Errors per page above which a document with a form is High priority
pub const FORM_ERROR_DENSITY: u64 = 3;

/// Errors per page from which a document is Medium priority
pub const MEDIUM_ERROR_DENSITY: u64 = 5;

/// Everything the classifier looks at for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFeatureVector {
    pub violation_count: u64,
    pub failed_check_count: u64,
    pub tagged: bool,
    pub text_type: TextType,
    pub has_form: bool,
    pub title_set: bool,
    pub language_set: bool,
    pub page_count: u64,
    pub has_bookmarks: bool,
    pub approved_generator: bool,
    /// Informational: the validator flagged content as possibly scanned
    pub suspect_image_only: bool,
    /// Informational: heading levels form a valid hierarchy
    pub headings_valid: bool,
    /// Informational: images found under Figure elements, with/without alt text
    pub images_with_alt: u64,
    pub images_without_alt: u64,
}

impl DocumentFeatureVector {
    pub fn errors_per_page(&self) -> u64 {
        errors_per_page(self.failed_check_count, self.page_count)
    }
}

/// `failed_checks / page_count` rounded to the nearest integer, ties to
/// even; zero for a document with no pages.
pub fn errors_per_page(failed_checks: u64, page_count: u64) -> u64 {
    if page_count == 0 {
        return 0;
    }
    let quotient = failed_checks / page_count;
    let remainder = failed_checks % page_count;
    let rest = page_count - remainder;
    if remainder > rest || (remainder == rest && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Remediation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 3] = [PriorityTier::High, PriorityTier::Medium, PriorityTier::Low];

    /// Display color used by downstream reports; these values are fixed
    pub fn color(&self) -> &'static str {
        match self {
            PriorityTier::High => "#8B0000",
            PriorityTier::Medium => "#FF8C00",
            PriorityTier::Low => "#006400",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
            PriorityTier::Low => "Low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRule {
    Untagged,
    ImageOnly,
    HighErrorDensity,
    FormWithErrors,
    ApprovedGenerator,
    MediumErrorDensity,
    LowErrorDensity,
    NoErrors,
}

/// The decision table, in evaluation order
pub const DECISION_TABLE: [PriorityRule; 8] = [
    PriorityRule::Untagged,
    PriorityRule::ImageOnly,
    PriorityRule::HighErrorDensity,
    PriorityRule::FormWithErrors,
    PriorityRule::ApprovedGenerator,
    PriorityRule::MediumErrorDensity,
    PriorityRule::LowErrorDensity,
    PriorityRule::NoErrors,
];

impl PriorityRule {
    pub fn tier(&self) -> PriorityTier {
        match self {
            PriorityRule::Untagged
            | PriorityRule::ImageOnly
            | PriorityRule::HighErrorDensity
            | PriorityRule::FormWithErrors => PriorityTier::High,
            PriorityRule::MediumErrorDensity => PriorityTier::Medium,
            PriorityRule::ApprovedGenerator
            | PriorityRule::LowErrorDensity
            | PriorityRule::NoErrors => PriorityTier::Low,
        }
    }

    fn matches(&self, features: &DocumentFeatureVector, errors_per_page: u64) -> bool {
        match self {
            PriorityRule::Untagged => !features.tagged,
            PriorityRule::ImageOnly => features.text_type.is_image_only(),
            PriorityRule::HighErrorDensity => {
                features.page_count > 0 && errors_per_page > HIGH_ERROR_DENSITY
            }
            PriorityRule::FormWithErrors => {
                features.has_form && features.page_count > 0 && errors_per_page > FORM_ERROR_DENSITY
            }
            PriorityRule::ApprovedGenerator => features.approved_generator,
            PriorityRule::MediumErrorDensity => errors_per_page >= MEDIUM_ERROR_DENSITY,
            PriorityRule::LowErrorDensity => errors_per_page > 0,
            PriorityRule::NoErrors => true,
        }
    }

    /// Human-readable reason for audit output
    pub fn description(&self) -> &'static str {
        match self {
            PriorityRule::Untagged => "document is not tagged",
            PriorityRule::ImageOnly => "content is images of text only",
            PriorityRule::HighErrorDensity => "more than 20 failed checks per page",
            PriorityRule::FormWithErrors => "form with more than 3 failed checks per page",
            PriorityRule::ApprovedGenerator => "produced by an approved accessible generator",
            PriorityRule::MediumErrorDensity => "at least 5 failed checks per page",
            PriorityRule::LowErrorDensity => "fewer than 5 failed checks per page",
            PriorityRule::NoErrors => "no failed checks",
        }
    }
}

impl fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: PriorityTier,
    /// The rule that decided the tier
    pub rule: PriorityRule,
    pub errors_per_page: u64,
}

impl Classification {
    pub fn requires_review(&self) -> bool {
        self.tier == PriorityTier::High
    }

    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}

/// Run the decision table; the first matching rule wins
pub fn classify(features: &DocumentFeatureVector) -> Classification {
    let errors_per_page = features.errors_per_page();
    let rule = DECISION_TABLE
        .iter()
        .copied()
        .find(|rule| rule.matches(features, errors_per_page))
        .unwrap_or(PriorityRule::NoErrors);

    Classification {
        tier: rule.tier(),
        rule,
        errors_per_page,
    }
}

pub fn requires_review(features: &DocumentFeatureVector) -> bool {
    classify(features).requires_review()
}
