//! Word-in-Context sentence pairs.

use crate::error::{Error, Result};
use crate::sentence::Sentence;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Gold label of a WiC pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WicLabel {
    /// Same sense (`true`) or different sense (`false`).
    Binary(bool),
    /// Probability that both targets share a sense.
    Graded(f64),
}

impl WicLabel {
    /// Collapse to a binary decision (graded labels at 0.5).
    #[must_use]
    pub fn same_sense(&self) -> bool {
        match *self {
            Self::Binary(same) => same,
            Self::Graded(p) => p >= 0.5,
        }
    }
}

impl FromStr for WicLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "T" | "t" | "True" | "true" | "TRUE" | "1" => Ok(Self::Binary(true)),
            "F" | "f" | "False" | "false" | "FALSE" | "0" => Ok(Self::Binary(false)),
            other => match other.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => Ok(Self::Graded(p)),
                _ => Err(Error::schema(format!("not a WiC label: {:?}", other))),
            },
        }
    }
}

/// One side of a WiC pair: a sentence and the target token in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WicTarget {
    sentence: Sentence,
    index: usize,
    surface: String,
}

impl WicTarget {
    /// Create a target; `surface` is the text the source marks at `index`.
    ///
    /// `surface` may be a part of the token (character-offset corpora mark
    /// the word without attached punctuation).
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] when `index` is outside the sentence or the
    /// surface does not occur in the token there.
    pub fn new(sentence: Sentence, index: usize, surface: impl Into<String>) -> Result<Self> {
        let target = Self {
            sentence,
            index,
            surface: surface.into(),
        };
        target.check()?;
        Ok(target)
    }

    /// Create a target whose surface is the whole token at `index`.
    pub fn at(sentence: Sentence, index: usize) -> Result<Self> {
        let surface = sentence
            .token(index)
            .map(|t| t.form().to_string())
            .ok_or_else(|| {
                Error::schema(format!(
                    "target index {} outside sentence {} of {} tokens",
                    index,
                    sentence.id(),
                    sentence.len()
                ))
            })?;
        Self::new(sentence, index, surface)
    }

    /// Re-run the construction invariants.
    pub fn check(&self) -> Result<()> {
        let token = self.sentence.token(self.index).ok_or_else(|| {
            Error::schema(format!(
                "target index {} outside sentence {} of {} tokens",
                self.index,
                self.sentence.id(),
                self.sentence.len()
            ))
        })?;
        if self.surface.is_empty() || !token.form().contains(self.surface.as_str()) {
            return Err(Error::schema(format!(
                "target {:?} does not occur at token {} ({:?})",
                self.surface,
                self.index,
                token.form()
            )));
        }
        Ok(())
    }

    /// The sentence.
    #[must_use]
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// 1-based index of the target token.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Target text as marked in the source.
    #[must_use]
    pub fn surface(&self) -> &str {
        &self.surface
    }
}

/// A pair of target word usages and whether they share a sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WicInstance {
    id: String,
    lemma: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pos: Option<String>,
    first: WicTarget,
    second: WicTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<WicLabel>,
}

impl WicInstance {
    /// Create a pair; `label` is `None` for unlabeled splits.
    pub fn new(
        id: impl Into<String>,
        lemma: impl Into<String>,
        pos: Option<String>,
        first: WicTarget,
        second: WicTarget,
        label: Option<WicLabel>,
    ) -> Self {
        Self {
            id: id.into(),
            lemma: lemma.into(),
            pos,
            first,
            second,
            label,
        }
    }

    /// Pair identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target lemma shared by both sentences.
    #[must_use]
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Part of speech of the target, if given.
    #[must_use]
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }

    /// First usage.
    #[must_use]
    pub fn first(&self) -> &WicTarget {
        &self.first
    }

    /// Second usage.
    #[must_use]
    pub fn second(&self) -> &WicTarget {
        &self.second
    }

    /// Gold label, if the split is labeled.
    #[must_use]
    pub fn label(&self) -> Option<WicLabel> {
        self.label
    }
}
