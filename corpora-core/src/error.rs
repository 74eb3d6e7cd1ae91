//! Error types for corpora-core.
//!
//! Two kinds of failure flow through the readers:
//!
//! - **Fatal** errors ([`Error::UnreadableInput`], [`Error::StructuralDesync`],
//!   [`Error::InvalidConfig`], [`Error::Io`]) stop the reader that raised them.
//! - **Recoverable** conditions are described by an [`Issue`] and collected in a
//!   [`Report`] while the stream keeps producing instances. When a caller asks
//!   for them to be surfaced, an issue converts into the matching error variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for corpora operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for corpora operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The input cannot be opened, or it is empty.
    #[error("Unreadable input {path}: {reason}")]
    UnreadableInput {
        /// Path or label of the input.
        path: String,
        /// Why it could not be read.
        reason: String,
    },

    /// Paired inputs (corpus and gold key, rows and labels) cannot be aligned.
    #[error("Structural desync: {0}")]
    StructuralDesync(String),

    /// A single record was malformed and skipped.
    #[error("Malformed record at {}: {}", .0.position, .0.message)]
    MalformedRecord(Issue),

    /// An instance has no gold annotation in the key file.
    #[error("Missing gold key at {}: {}", .0.position, .0.message)]
    MissingGoldKey(Issue),

    /// A canonical object would violate a schema invariant.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Reader configuration is contradictory or incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading an already opened input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unreadable input error.
    #[must_use]
    pub fn unreadable(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::UnreadableInput {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a structural desync error.
    #[must_use]
    pub fn desync(msg: impl Into<String>) -> Self {
        Self::StructuralDesync(msg.into())
    }

    /// Create a schema violation error.
    #[must_use]
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True if this error ends the reader that produced it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnreadableInput { .. }
                | Self::StructuralDesync(_)
                | Self::InvalidConfig(_)
                | Self::Io(_)
        )
    }

    /// The issue carried by a recoverable error, if any.
    #[must_use]
    pub fn issue(&self) -> Option<&Issue> {
        match self {
            Self::MalformedRecord(issue) | Self::MissingGoldKey(issue) => Some(issue),
            _ => None,
        }
    }
}

// =============================================================================
// Issues
// =============================================================================

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// File name or caller-provided label of the input.
    pub source: String,
    /// 1-based line of the first line of the record (0 when not line based).
    pub line: usize,
    /// 1-based ordinal of the record (block, row, sentence) within the input.
    pub record: usize,
}

impl Position {
    /// Create a position.
    pub fn new(source: impl Into<String>, line: usize, record: usize) -> Self {
        Self {
            source: source.into(),
            line,
            record,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{} (record {})", self.source, self.line, self.record)
        } else {
            write!(f, "{} (record {})", self.source, self.record)
        }
    }
}

/// Recoverable condition classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// One sentence, block or row was skipped.
    MalformedRecord,
    /// One instance lacks a gold annotation.
    MissingGoldKey,
    /// An instance failed an invariant at the validation boundary.
    SchemaViolation,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::MalformedRecord => "malformed record",
            IssueKind::MissingGoldKey => "missing gold key",
            IssueKind::SchemaViolation => "schema violation",
        };
        f.write_str(name)
    }
}

/// Whether the affected instance was still produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The instance was produced with this issue attached.
    Warning,
    /// The instance (or record) was not produced.
    Error,
}

/// One recoverable condition, tagged with the position of its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Condition class.
    pub kind: IssueKind,
    /// Whether the instance survived.
    pub severity: Severity,
    /// Source position of the record.
    pub position: Position,
    /// Human readable detail.
    pub message: String,
}

impl Issue {
    /// A malformed record that was skipped.
    pub fn malformed(position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::MalformedRecord,
            severity: Severity::Error,
            position,
            message: message.into(),
        }
    }

    /// An instance yielded without its gold key.
    pub fn missing_gold(position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::MissingGoldKey,
            severity: Severity::Warning,
            position,
            message: message.into(),
        }
    }

    /// A schema violation with the given severity.
    pub fn schema(position: Position, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::SchemaViolation,
            severity,
            position,
            message: message.into(),
        }
    }

    /// Convert into the error variant a caller sees when issues are surfaced.
    #[must_use]
    pub fn into_error(self) -> Error {
        match self.kind {
            IssueKind::MalformedRecord => Error::MalformedRecord(self),
            IssueKind::MissingGoldKey => Error::MissingGoldKey(self),
            IssueKind::SchemaViolation => {
                Error::SchemaViolation(format!("{}: {}", self.position, self.message))
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.position, self.message)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Side channel of recoverable issues accumulated while a stream is consumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// All issues in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Number of issues of one kind.
    #[must_use]
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Issues whose instance was still produced.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// Issues whose record was dropped.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// True if nothing was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Total number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// True if the report holds no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} issue(s): {} malformed, {} missing gold, {} schema",
            self.issues.len(),
            self.count(IssueKind::MalformedRecord),
            self.count(IssueKind::MissingGoldKey),
            self.count(IssueKind::SchemaViolation)
        )?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::unreadable("a.txt", "empty").is_fatal());
        assert!(Error::desync("no overlap").is_fatal());
        assert!(!Error::schema("bad span").is_fatal());
        let issue = Issue::malformed(Position::new("a.txt", 3, 1), "too few columns");
        assert!(!issue.into_error().is_fatal());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new("a.txt", 12, 3).to_string(), "a.txt:12 (record 3)");
        assert_eq!(Position::new("a.xml", 0, 2).to_string(), "a.xml (record 2)");
    }

    #[test]
    fn test_report_counts() {
        let mut report = Report::new();
        report.push(Issue::malformed(Position::new("x", 1, 1), "bad"));
        report.push(Issue::missing_gold(Position::new("x", 0, 2), "d0.s0.t0"));
        report.push(Issue::missing_gold(Position::new("x", 0, 3), "d0.s0.t1"));

        assert_eq!(report.len(), 3);
        assert_eq!(report.count(IssueKind::MissingGoldKey), 2);
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_issue_into_error_keeps_issue() {
        let issue = Issue::missing_gold(Position::new("k", 0, 1), "t000");
        let err = issue.clone().into_error();
        assert_eq!(err.issue(), Some(&issue));
    }
}
