//! Annotated sentences, decoder output and documents.

use crate::error::{Error, Result};
use crate::sense::SenseAnnotation;
use crate::sentence::Sentence;
use crate::srl::PredicateArgumentStructure;
use crate::wic::WicInstance;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A sentence with the predicate and sense annotations that refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    sentence: Sentence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    predicates: Vec<PredicateArgumentStructure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    senses: Vec<SenseAnnotation>,
}

impl AnnotatedSentence {
    /// Attach annotations, checking every token reference against the sentence.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] when a predicate, predicate span, argument
    /// span or sense token lies outside the sentence.
    pub fn new(
        sentence: Sentence,
        predicates: Vec<PredicateArgumentStructure>,
        senses: Vec<SenseAnnotation>,
    ) -> Result<Self> {
        let annotated = Self {
            sentence,
            predicates,
            senses,
        };
        annotated.check_bounds()?;
        Ok(annotated)
    }

    /// A sentence without annotations.
    #[must_use]
    pub fn bare(sentence: Sentence) -> Self {
        Self {
            sentence,
            predicates: Vec::new(),
            senses: Vec::new(),
        }
    }

    /// Check every token reference against the sentence length.
    pub fn check_bounds(&self) -> Result<()> {
        let len = self.sentence.len();
        let id = self.sentence.id();
        for pas in &self.predicates {
            if pas.predicate() == 0 || pas.predicate() > len {
                return Err(Error::schema(format!(
                    "sentence {}: predicate {} outside 1..={}",
                    id,
                    pas.predicate(),
                    len
                )));
            }
            if !pas.predicate_span().within(len) {
                return Err(Error::schema(format!(
                    "sentence {}: predicate span {} outside 1..={}",
                    id,
                    pas.predicate_span(),
                    len
                )));
            }
            for arg in pas.arguments() {
                if !arg.span().within(len) {
                    return Err(Error::schema(format!(
                        "sentence {}: {} span {} outside 1..={}",
                        id,
                        arg.role(),
                        arg.span(),
                        len
                    )));
                }
            }
        }
        for sense in &self.senses {
            if sense.token() == 0 || sense.token() > len {
                return Err(Error::schema(format!(
                    "sentence {}: instance {} refers to token {} outside 1..={}",
                    id,
                    sense.instance_id(),
                    sense.token(),
                    len
                )));
            }
        }
        Ok(())
    }

    /// The sentence.
    #[must_use]
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// Predicate-argument structures in source order.
    #[must_use]
    pub fn predicates(&self) -> &[PredicateArgumentStructure] {
        &self.predicates
    }

    /// Sense annotations in source order.
    #[must_use]
    pub fn senses(&self) -> &[SenseAnnotation] {
        &self.senses
    }

    /// Drop sense annotations that fail `keep`.
    ///
    /// Used by readers configured to skip untagged instances.
    #[must_use]
    pub fn retain_senses(mut self, keep: impl FnMut(&SenseAnnotation) -> bool) -> Self {
        self.senses.retain(keep);
        self
    }

    /// Split into parts.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        Sentence,
        Vec<PredicateArgumentStructure>,
        Vec<SenseAnnotation>,
    ) {
        (self.sentence, self.predicates, self.senses)
    }
}

/// One canonical object produced by a decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instance {
    /// A sentence of an SRL or WSD corpus.
    Sentence(AnnotatedSentence),
    /// A WiC pair.
    Wic(WicInstance),
}

impl Instance {
    /// The annotated sentence, if this is one.
    #[must_use]
    pub fn as_sentence(&self) -> Option<&AnnotatedSentence> {
        match self {
            Self::Sentence(s) => Some(s),
            Self::Wic(_) => None,
        }
    }

    /// The WiC pair, if this is one.
    #[must_use]
    pub fn as_wic(&self) -> Option<&WicInstance> {
        match self {
            Self::Wic(w) => Some(w),
            Self::Sentence(_) => None,
        }
    }
}

impl From<AnnotatedSentence> for Instance {
    fn from(s: AnnotatedSentence) -> Self {
        Self::Sentence(s)
    }
}

impl From<WicInstance> for Instance {
    fn from(w: WicInstance) -> Self {
        Self::Wic(w)
    }
}

/// Sentences of one document, with annotation collections keyed by sentence id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "DocumentData")]
pub struct Document {
    id: String,
    sentences: Vec<Sentence>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    predicates: BTreeMap<String, Vec<PredicateArgumentStructure>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    senses: BTreeMap<String, Vec<SenseAnnotation>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    wic: Vec<WicInstance>,
    /// Position of each sentence id in `sentences`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct DocumentData {
    id: String,
    sentences: Vec<Sentence>,
    #[serde(default)]
    predicates: BTreeMap<String, Vec<PredicateArgumentStructure>>,
    #[serde(default)]
    senses: BTreeMap<String, Vec<SenseAnnotation>>,
    #[serde(default)]
    wic: Vec<WicInstance>,
}

impl From<DocumentData> for Document {
    fn from(data: DocumentData) -> Self {
        let index = data
            .sentences
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id().to_string(), i))
            .collect();
        Self {
            id: data.id,
            sentences: data.sentences,
            predicates: data.predicates,
            senses: data.senses,
            wic: data.wic,
            index,
        }
    }
}

impl Document {
    /// Create an empty document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Append a sentence and its annotations.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`] if the document already has a sentence
    /// with the same id.
    pub fn push(&mut self, annotated: AnnotatedSentence) -> Result<()> {
        let (sentence, predicates, senses) = annotated.into_parts();
        if self.index.contains_key(sentence.id()) {
            return Err(Error::schema(format!(
                "document {} already has sentence {}",
                self.id,
                sentence.id()
            )));
        }
        if !predicates.is_empty() {
            self.predicates.insert(sentence.id().to_string(), predicates);
        }
        if !senses.is_empty() {
            self.senses.insert(sentence.id().to_string(), senses);
        }
        self.index.insert(sentence.id().to_string(), self.sentences.len());
        self.sentences.push(sentence);
        Ok(())
    }

    /// Append a WiC pair.
    pub fn push_wic(&mut self, instance: WicInstance) {
        self.wic.push(instance);
    }

    /// Document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sentences in order.
    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Sentence by id.
    #[must_use]
    pub fn sentence(&self, id: &str) -> Option<&Sentence> {
        self.index.get(id).and_then(|&i| self.sentences.get(i))
    }

    /// Predicate-argument structures of one sentence.
    #[must_use]
    pub fn predicates(&self, sentence_id: &str) -> &[PredicateArgumentStructure] {
        self.predicates
            .get(sentence_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Sense annotations of one sentence.
    #[must_use]
    pub fn senses(&self, sentence_id: &str) -> &[SenseAnnotation] {
        self.senses.get(sentence_id).map_or(&[], Vec::as_slice)
    }

    /// WiC pairs.
    #[must_use]
    pub fn wic(&self) -> &[WicInstance] {
        &self.wic
    }

    /// Number of sentences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// True if the document has neither sentences nor WiC pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty() && self.wic.is_empty()
    }

    /// Total number of predicate-argument structures.
    #[must_use]
    pub fn predicate_count(&self) -> usize {
        self.predicates.values().map(Vec::len).sum()
    }

    /// Total number of sense annotations.
    #[must_use]
    pub fn sense_count(&self) -> usize {
        self.senses.values().map(Vec::len).sum()
    }
}
