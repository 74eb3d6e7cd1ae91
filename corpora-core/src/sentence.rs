//! Tokens, dependency edges and sentences.
//!
//! Token indices are 1-based, as in the CoNLL family of formats. A dependency
//! head of `0` is the artificial root.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single token of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    index: usize,
    form: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pos: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    features: BTreeMap<String, String>,
}

impl Token {
    /// Create a token at a 1-based position.
    pub fn new(index: usize, form: impl Into<String>) -> Self {
        Self {
            index,
            form: form.into(),
            lemma: None,
            pos: None,
            features: BTreeMap::new(),
        }
    }

    /// Set the lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Set the part-of-speech tag.
    #[must_use]
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Add one morphological feature.
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    /// Replace all morphological features.
    #[must_use]
    pub fn with_features(mut self, features: BTreeMap<String, String>) -> Self {
        self.features = features;
        self
    }

    /// 1-based position in the sentence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Surface form.
    #[must_use]
    pub fn form(&self) -> &str {
        &self.form
    }

    /// Lemma, if the source provides one.
    #[must_use]
    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_deref()
    }

    /// Part-of-speech tag, if the source provides one.
    #[must_use]
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }

    /// Morphological features.
    #[must_use]
    pub fn features(&self) -> &BTreeMap<String, String> {
        &self.features
    }

    /// Decode a CoNLL FEAT cell (`a=b|c=d`).
    ///
    /// `_` and the empty string mean no features. An entry without `=` maps
    /// to an empty value.
    #[must_use]
    pub fn parse_features(cell: &str) -> BTreeMap<String, String> {
        let mut features = BTreeMap::new();
        if cell.is_empty() || cell == "_" {
            return features;
        }
        for entry in cell.split('|').filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((name, value)) => features.insert(name.to_string(), value.to_string()),
                None => features.insert(entry.to_string(), String::new()),
            };
        }
        features
    }
}

/// Head and relation of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Head token index, `0` for the root.
    pub head: usize,
    /// Relation label, if the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl Dependency {
    /// Create an edge.
    pub fn new(head: usize, relation: Option<String>) -> Self {
        Self { head, relation }
    }

    /// True if the head is the artificial root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.head == 0
    }
}

/// An ordered sequence of tokens with an identifier and optional dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<String>,
    tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    dependencies: BTreeMap<usize, Dependency>,
}

impl Sentence {
    /// Create a sentence, checking token contiguity and dependency heads.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] when the sentence is empty, token indices
    /// are not exactly `1..=n`, or a dependency refers outside the sentence.
    pub fn new(
        id: impl Into<String>,
        tokens: Vec<Token>,
        dependencies: BTreeMap<usize, Dependency>,
    ) -> Result<Self> {
        let sentence = Self {
            id: id.into(),
            document: None,
            tokens,
            dependencies,
        };
        sentence.check()?;
        Ok(sentence)
    }

    /// Create a sentence without dependencies.
    pub fn from_tokens(id: impl Into<String>, tokens: Vec<Token>) -> Result<Self> {
        Self::new(id, tokens, BTreeMap::new())
    }

    /// Attach the identifier of the owning document.
    #[must_use]
    pub fn in_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Re-run the construction invariants.
    pub fn check(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(Error::schema(format!("sentence {} has no tokens", self.id)));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if token.index != i + 1 {
                return Err(Error::schema(format!(
                    "sentence {}: token {:?} has index {}, expected {}",
                    self.id,
                    token.form,
                    token.index,
                    i + 1
                )));
            }
        }
        let len = self.tokens.len();
        for (&child, dep) in &self.dependencies {
            if child == 0 || child > len {
                return Err(Error::schema(format!(
                    "sentence {}: dependency child {} outside 1..={}",
                    self.id, child, len
                )));
            }
            if dep.head > len {
                return Err(Error::schema(format!(
                    "sentence {}: head {} of token {} outside 0..={}",
                    self.id, dep.head, child, len
                )));
            }
            if dep.head == child {
                return Err(Error::schema(format!(
                    "sentence {}: token {} is its own head",
                    self.id, child
                )));
            }
        }
        Ok(())
    }

    /// Sentence identifier, unique within its document.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the owning document, if the format has documents.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// All tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token at a 1-based index.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&Token> {
        index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a constructed sentence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Dependency edges keyed by child index.
    #[must_use]
    pub fn dependencies(&self) -> &BTreeMap<usize, Dependency> {
        &self.dependencies
    }

    /// Dependency edge of one token.
    #[must_use]
    pub fn dependency(&self, child: usize) -> Option<&Dependency> {
        self.dependencies.get(&child)
    }

    /// Surface forms joined by single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
