//! Predicate-argument structures for Semantic Role Labeling.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// An inclusive, 1-based range of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenSpan {
    start: usize,
    end: usize,
}

impl TokenSpan {
    /// Create a span covering tokens `start..=end`.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] for `start == 0` or `start > end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start == 0 {
            return Err(Error::schema("token spans are 1-based, got start 0"));
        }
        if start > end {
            return Err(Error::schema(format!("empty span {}..={}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Span of a single token.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] for index `0`.
    pub fn single(index: usize) -> Result<Self> {
        Self::new(index, index)
    }

    /// First token index.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last token index (inclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Never true: spans cover at least one token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True if the span covers `index`.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// True if the span lies inside a sentence of `len` tokens.
    #[must_use]
    pub fn within(&self, len: usize) -> bool {
        self.end <= len
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..={}", self.start, self.end)
        }
    }
}

/// One labeled argument of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    role: String,
    span: TokenSpan,
}

impl Argument {
    /// Create an argument.
    pub fn new(role: impl Into<String>, span: TokenSpan) -> Self {
        Self {
            role: role.into(),
            span,
        }
    }

    /// Role label exactly as the source states it.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Covered tokens.
    #[must_use]
    pub fn span(&self) -> TokenSpan {
        self.span
    }

    /// Base role of a PropBank continuation label (`C-ARG1` -> `ARG1`).
    ///
    /// Discontinuous arguments stay separate arguments; this only names the
    /// role they continue.
    #[must_use]
    pub fn continuation_of(&self) -> Option<&str> {
        self.role.strip_prefix("C-")
    }

    /// Base role of a PropBank reference label (`R-ARG0` -> `ARG0`).
    #[must_use]
    pub fn reference_of(&self) -> Option<&str> {
        self.role.strip_prefix("R-")
    }
}

/// Whether one predicate may carry two arguments with the same role label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RolePolicy {
    /// Repeated labels are allowed.
    #[default]
    Permit,
    /// Repeated labels make the structure invalid.
    Reject,
}

/// A predicate with its frame and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateArgumentStructure {
    predicate: usize,
    predicate_span: TokenSpan,
    frame: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inventory: Option<String>,
    arguments: Vec<Argument>,
}

impl PredicateArgumentStructure {
    /// Create a structure.
    ///
    /// `predicate_span` covers every token of a multi-word predicate and must
    /// contain `predicate`.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] when the span misses the predicate or when
    /// `policy` is [`RolePolicy::Reject`] and a role label repeats.
    pub fn new(
        predicate: usize,
        predicate_span: TokenSpan,
        frame: impl Into<String>,
        arguments: Vec<Argument>,
        policy: RolePolicy,
    ) -> Result<Self> {
        let pas = Self {
            predicate,
            predicate_span,
            frame: frame.into(),
            inventory: None,
            arguments,
        };
        if !pas.predicate_span.contains(predicate) {
            return Err(Error::schema(format!(
                "predicate {} outside its span {}",
                predicate, pas.predicate_span
            )));
        }
        if policy == RolePolicy::Reject {
            if let Some(role) = pas.repeated_role() {
                return Err(Error::schema(format!(
                    "predicate {} ({}) repeats role {}",
                    predicate, pas.frame, role
                )));
            }
        }
        Ok(pas)
    }

    /// Tag the frame with the inventory it comes from.
    #[must_use]
    pub fn with_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    /// Index of the predicate head token.
    #[must_use]
    pub fn predicate(&self) -> usize {
        self.predicate
    }

    /// All tokens of the predicate.
    #[must_use]
    pub fn predicate_span(&self) -> TokenSpan {
        self.predicate_span
    }

    /// True if the predicate covers more than one token.
    #[must_use]
    pub fn is_multiword(&self) -> bool {
        self.predicate_span.len() > 1
    }

    /// Sense or frame identifier, verbatim from the source.
    #[must_use]
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Frame inventory, if known.
    #[must_use]
    pub fn inventory(&self) -> Option<&str> {
        self.inventory.as_deref()
    }

    /// Arguments in source order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// First role label that occurs more than once.
    #[must_use]
    pub fn repeated_role(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.arguments
            .iter()
            .map(Argument::role)
            .find(|role| !seen.insert(*role))
    }

    /// Largest token index this structure refers to.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.arguments
            .iter()
            .map(|a| a.span.end)
            .chain([self.predicate_span.end])
            .max()
            .unwrap_or(self.predicate)
    }

    /// Role tags in BIO encoding over a sentence of `len` tokens.
    ///
    /// Position `i` of the result is token `i + 1`.
    #[must_use]
    pub fn bio_tags(&self, len: usize) -> Vec<String> {
        let mut tags = vec!["O".to_string(); len];
        for arg in &self.arguments {
            if !arg.span.within(len) {
                continue;
            }
            tags[arg.span.start - 1] = format!("B-{}", arg.role);
            for i in arg.span.start..arg.span.end {
                tags[i] = format!("I-{}", arg.role);
            }
        }
        tags
    }
}
