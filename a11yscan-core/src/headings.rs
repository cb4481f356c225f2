//! Heading hierarchy verification
//!
//! A document's heading levels, taken in tag-tree order, must contain exactly
//! one level-1 heading, start with it, and never descend more than one level
//! at a time.

use serde::Serialize;
use std::fmt;

/// First rule a heading sequence breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum HeadingIssue {
    /// No headings at all
    Empty,
    /// More than one level-1 heading
    MultipleTopLevel { count: usize },
    /// The first heading is not level 1
    FirstNotTopLevel { level: u8 },
    /// A heading is more than one level deeper than its predecessor
    SkippedLevel { index: usize, from: u8, to: u8 },
}

impl fmt::Display for HeadingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingIssue::Empty => write!(f, "document has no headings"),
            HeadingIssue::MultipleTopLevel { count } => {
                write!(f, "{count} level-1 headings, expected exactly one")
            }
            HeadingIssue::FirstNotTopLevel { level } => {
                write!(f, "first heading is H{level}, expected H1")
            }
            HeadingIssue::SkippedLevel { index, from, to } => {
                write!(f, "heading {index} jumps from H{from} to H{to}")
            }
        }
    }
}

/// Check a heading sequence, reporting the first rule it breaks.
///
/// Rules are applied in a fixed order, so a sequence breaking several of
/// them always reports the same issue.
pub fn check_heading_hierarchy(levels: &[u8]) -> Result<(), HeadingIssue> {
    let Some(&first) = levels.first() else {
        return Err(HeadingIssue::Empty);
    };

    let top_level = levels.iter().filter(|level| **level == 1).count();
    if top_level > 1 {
        return Err(HeadingIssue::MultipleTopLevel { count: top_level });
    }

    if first != 1 {
        return Err(HeadingIssue::FirstNotTopLevel { level: first });
    }

    for (index, pair) in levels.windows(2).enumerate() {
        if pair[1] > pair[0].saturating_add(1) {
            return Err(HeadingIssue::SkippedLevel {
                index: index + 1,
                from: pair[0],
                to: pair[1],
            });
        }
    }

    Ok(())
}

/// True when the heading sequence is well formed
pub fn verify_heading_hierarchy(levels: &[u8]) -> bool {
    check_heading_hierarchy(levels).is_ok()
}
