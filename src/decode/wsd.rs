//! WSD Evaluation Framework format (Raganato et al., 2017).
//!
//! A corpus is an XML file plus a gold key file:
//!
//! ```text
//! <corpus lang="en" source="senseval2">
//!   <text id="d000">
//!     <sentence id="d000.s000">
//!       <wf lemma="the" pos="DET">The</wf>
//!       <instance id="d000.s000.t000" lemma="art" pos="NOUN">art</instance>
//!     </sentence>
//!   </text>
//! </corpus>
//! ```
//!
//! ```text
//! d000.s000.t000 art%1:06:00:: art%1:04:00::
//! ```
//!
//! The XML is parsed as a whole when the input is opened; sentences are
//! converted one at a time as the sequence is consumed.

use super::{open_text, source_name, Decoder, Input, RawLines, Step, StopAfterError, Steps};
use corpora_core::{
    AnnotatedSentence, Error, Issue, Position, Result, SenseAnnotation, SenseInventory, SenseLabel,
    Sentence, Token,
};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Read};
use std::path::Path;
use xmlem::{Document, Element, Node};

/// Decoder for one XML/key pair.
#[derive(Debug, Clone)]
pub struct WsdDecoder {
    inventory: SenseInventory,
}

impl Default for WsdDecoder {
    fn default() -> Self {
        Self {
            inventory: SenseInventory::wordnet30(),
        }
    }
}

impl WsdDecoder {
    /// Decoder tagging keys as WordNet 3.0 sense keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inventory gold keys belong to.
    #[must_use]
    pub fn with_inventory(mut self, inventory: SenseInventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Inventory gold keys are tagged with.
    #[must_use]
    pub fn inventory(&self) -> &SenseInventory {
        &self.inventory
    }

    /// Decode XML text and optional key text held in memory.
    pub fn decode_str(&self, xml: &str, keys: Option<&str>, source: &str) -> Result<Steps> {
        let corpus = parse_corpus(xml, source)?;
        let keys = keys
            .map(|text| parse_keys(text.as_bytes(), source))
            .transpose()?;
        build_steps(corpus, keys, self.inventory.clone())
    }
}

impl Decoder for WsdDecoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        let corpus = read_corpus(&input.data)?;
        let keys = read_keys(input.companion.as_deref())?;
        build_steps(corpus, keys, self.inventory.clone())
    }
}

// =============================================================================
// XML
// =============================================================================

/// Owned view of a corpus file, detached from the XML tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlCorpus {
    pub(crate) source: String,
    pub(crate) lang: Option<String>,
    pub(crate) sentences: Vec<XmlSentence>,
}

#[derive(Debug, Clone)]
pub(crate) struct XmlSentence {
    id: String,
    document: Option<String>,
    position: Position,
    tokens: Vec<XmlToken>,
    malformed: Option<String>,
}

#[derive(Debug, Clone)]
struct XmlToken {
    form: String,
    lemma: Option<String>,
    pos: Option<String>,
    /// `Some` for `<instance>` elements.
    instance: Option<String>,
}

impl XmlCorpus {
    fn instance_ids(&self) -> Vec<&str> {
        self.sentences
            .iter()
            .flat_map(|s| s.tokens.iter())
            .filter_map(|t| t.instance.as_deref())
            .collect()
    }
}

pub(crate) fn read_corpus(path: &Path) -> Result<XmlCorpus> {
    let mut reader = open_text(path)?;
    let mut xml = String::new();
    reader
        .read_to_string(&mut xml)
        .map_err(|e| Error::unreadable(path.display(), e.to_string()))?;
    parse_corpus(&xml, &source_name(path))
}

pub(crate) fn parse_corpus(xml: &str, source: &str) -> Result<XmlCorpus> {
    let doc = xml
        .parse::<Document>()
        .map_err(|e| Error::unreadable(source, e.to_string()))?;
    let root = doc.root();
    if root.name(&doc) != "corpus" {
        return Err(Error::unreadable(
            source,
            format!("expected <corpus> root, found <{}>", root.name(&doc)),
        ));
    }

    let mut corpus = XmlCorpus {
        source: source.to_string(),
        lang: root.attribute(&doc, "lang").map(str::to_string),
        sentences: Vec::new(),
    };
    for child in root.children(&doc) {
        match child.name(&doc) {
            "text" => {
                let document = child.attribute(&doc, "id").map(str::to_string);
                for sentence in child.children(&doc) {
                    if sentence.name(&doc) == "sentence" {
                        push_sentence(&mut corpus, &sentence, &doc, document.clone());
                    }
                }
            }
            "sentence" => push_sentence(&mut corpus, &child, &doc, None),
            _ => {}
        }
    }
    if corpus.sentences.is_empty() {
        return Err(Error::unreadable(source, "no sentences"));
    }
    log::debug!("{}: {} sentences", source, corpus.sentences.len());
    Ok(corpus)
}

fn push_sentence(corpus: &mut XmlCorpus, element: &Element, doc: &Document, document: Option<String>) {
    let record = corpus.sentences.len() + 1;
    let id = element
        .attribute(doc, "id")
        .map_or_else(|| record.to_string(), str::to_string);
    let mut sentence = XmlSentence {
        id,
        document,
        position: Position::new(corpus.source.as_str(), 0, record),
        tokens: Vec::new(),
        malformed: None,
    };
    for child in element.children(doc) {
        let name = child.name(doc);
        if name != "wf" && name != "instance" {
            continue;
        }
        let form = element_text(&child, doc);
        let instance = if name == "instance" {
            match child.attribute(doc, "id") {
                Some(id) => Some(id.to_string()),
                None => {
                    sentence.malformed = Some(format!(
                        "instance {:?} at token {} has no id",
                        form,
                        sentence.tokens.len() + 1
                    ));
                    None
                }
            }
        } else {
            None
        };
        if form.is_empty() && sentence.malformed.is_none() {
            sentence.malformed = Some(format!("empty <{}> at token {}", name, sentence.tokens.len() + 1));
        }
        sentence.tokens.push(XmlToken {
            form,
            lemma: child.attribute(doc, "lemma").map(str::to_string),
            pos: child.attribute(doc, "pos").map(str::to_string),
            instance,
        });
    }
    corpus.sentences.push(sentence);
}

fn element_text(element: &Element, doc: &Document) -> String {
    let mut text = String::new();
    for node in element.child_nodes(doc) {
        if let Node::Text(text_node) = node {
            text.push_str(text_node.as_str(doc));
        }
    }
    text.trim().to_string()
}

// =============================================================================
// Gold keys
// =============================================================================

/// Parsed key file: keys in file order plus malformed lines.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyFile {
    entries: Vec<(String, Vec<String>)>,
    issues: Vec<Issue>,
}

pub(crate) fn read_keys(path: Option<&Path>) -> Result<Option<KeyFile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let reader = open_text(path)?;
    parse_keys(reader, &source_name(path)).map(Some)
}

fn parse_keys<R: BufRead>(reader: R, source: &str) -> Result<KeyFile> {
    let mut keys = KeyFile::default();
    let mut seen = HashSet::new();
    for (i, line) in RawLines::new(reader).enumerate() {
        let line = match line? {
            Ok(line) => line,
            Err(_) => {
                let position = Position::new(source, i + 1, keys.entries.len() + keys.issues.len() + 1);
                keys.issues
                    .push(Issue::malformed(position, "key line is not valid UTF-8"));
                continue;
            }
        };
        let mut fields = line.split_whitespace();
        let Some(id) = fields.next() else {
            continue;
        };
        let position = Position::new(source, i + 1, keys.entries.len() + keys.issues.len() + 1);
        let senses: Vec<String> = fields.map(str::to_string).collect();
        if senses.is_empty() {
            keys.issues
                .push(Issue::malformed(position, format!("key line for {} has no key", id)));
        } else if !seen.insert(id.to_string()) {
            keys.issues
                .push(Issue::malformed(position, format!("duplicate key line for {}", id)));
        } else {
            keys.entries.push((id.to_string(), senses));
        }
    }
    Ok(keys)
}

/// Gold keys per instance id.
///
/// Keys are matched by id when any id is shared with the corpus, by position
/// when none is but the counts agree.
fn align(corpus: &XmlCorpus, entries: Vec<(String, Vec<String>)>) -> Result<HashMap<String, Vec<String>>> {
    let ids = corpus.instance_ids();
    let known: HashSet<&str> = ids.iter().copied().collect();
    if known.is_empty() || entries.iter().any(|(id, _)| known.contains(id.as_str())) {
        return Ok(entries.into_iter().collect());
    }
    if ids.len() != entries.len() {
        return Err(Error::desync(format!(
            "{}: {} instances but {} key lines and no shared ids",
            corpus.source,
            ids.len(),
            entries.len()
        )));
    }
    log::warn!(
        "{}: key ids do not match instance ids; aligning {} keys by position",
        corpus.source,
        ids.len()
    );
    Ok(ids
        .into_iter()
        .map(str::to_string)
        .zip(entries.into_iter().map(|(_, senses)| senses))
        .collect())
}

// =============================================================================
// Canonical objects
// =============================================================================

pub(crate) fn build_steps(
    corpus: XmlCorpus,
    keys: Option<KeyFile>,
    inventory: SenseInventory,
) -> Result<Steps> {
    let (gold, key_issues) = match keys {
        None => (None, Vec::new()),
        Some(keys) => (Some(align(&corpus, keys.entries)?), keys.issues),
    };
    for issue in &key_issues {
        log::warn!("skipping key line at {}: {}", issue.position, issue.message);
    }

    let sentences = corpus.sentences.into_iter().map(move |sentence| {
        Ok(convert_sentence(sentence, gold.as_ref(), &inventory))
    });
    let steps = key_issues
        .into_iter()
        .map(|issue| Ok(Step::Skipped(issue)))
        .chain(sentences);
    Ok(Box::new(StopAfterError::new(steps)))
}

fn convert_sentence(
    sentence: XmlSentence,
    gold: Option<&HashMap<String, Vec<String>>>,
    inventory: &SenseInventory,
) -> Step {
    let position = sentence.position;
    if let Some(message) = sentence.malformed {
        log::warn!("skipping WSD sentence at {}: {}", position, message);
        return Step::Skipped(Issue::malformed(position, message));
    }

    let mut tokens = Vec::with_capacity(sentence.tokens.len());
    let mut senses = Vec::new();
    let mut notes = Vec::new();
    for (i, xml) in sentence.tokens.into_iter().enumerate() {
        let index = i + 1;
        let mut token = Token::new(index, xml.form.as_str());
        if let Some(lemma) = &xml.lemma {
            token = token.with_lemma(lemma.as_str());
        }
        if let Some(pos) = &xml.pos {
            token = token.with_pos(pos.as_str());
        }
        tokens.push(token);

        let Some(instance) = xml.instance else {
            continue;
        };
        let label = match gold.map(|g| g.get(&instance)) {
            Some(Some(keys)) => SenseLabel::Tagged(keys.clone()),
            Some(None) => {
                notes.push(Issue::missing_gold(
                    position.clone(),
                    format!("no gold key for instance {}", instance),
                ));
                SenseLabel::Untagged
            }
            None => SenseLabel::Untagged,
        };
        let lemma = xml.lemma.unwrap_or_else(|| xml.form.to_lowercase());
        senses.push(SenseAnnotation::new(
            instance,
            index,
            lemma,
            xml.pos.unwrap_or_default(),
            label,
            inventory.clone(),
        ));
    }

    let built = Sentence::from_tokens(sentence.id, tokens).and_then(|s| {
        let s = match sentence.document {
            Some(doc) => s.in_document(doc),
            None => s,
        };
        AnnotatedSentence::new(s, Vec::new(), senses)
    });
    match built {
        Ok(annotated) => Step::Decoded {
            instance: annotated.into(),
            position,
            notes,
        },
        Err(e) => {
            log::warn!("skipping WSD sentence at {}: {}", position, e);
            Step::Skipped(Issue::malformed(position, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::{Instance, IssueKind};

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<corpus lang="en" source="toy">
  <text id="d000">
    <sentence id="d000.s000">
      <wf lemma="the" pos="DET">The</wf>
      <instance id="d000.s000.t000" lemma="art" pos="NOUN">art</instance>
      <wf lemma="of" pos="ADP">of</wf>
      <instance id="d000.s000.t001" lemma="change" pos="NOUN">change</instance>
    </sentence>
    <sentence id="d000.s001">
      <instance id="d000.s001.t000" lemma="be" pos="VERB">Is</instance>
      <wf lemma="it" pos="PRON">it</wf>
    </sentence>
  </text>
</corpus>
"#;

    fn collect(steps: Steps) -> Vec<Step> {
        steps.map(|s| s.unwrap()).collect()
    }

    fn annotated(step: &Step) -> (&AnnotatedSentence, &[Issue]) {
        match step {
            Step::Decoded {
                instance: Instance::Sentence(s),
                notes,
                ..
            } => (s, notes),
            other => panic!("expected sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_all_keys_present() {
        let keys = "d000.s000.t000 art%1:06:00::\nd000.s000.t001 change%1:11:00::\nd000.s001.t000 be%2:42:03::\n";
        let steps = collect(WsdDecoder::new().decode_str(XML, Some(keys), "toy").unwrap());
        assert_eq!(steps.len(), 2);
        let (first, notes) = annotated(&steps[0]);
        assert!(notes.is_empty());
        assert_eq!(first.sentence().id(), "d000.s000");
        assert_eq!(first.sentence().document(), Some("d000"));
        assert_eq!(first.sentence().len(), 4);
        assert_eq!(first.senses().len(), 2);
        assert_eq!(first.senses()[1].token(), 4);
        assert_eq!(first.senses()[0].label().keys(), ["art%1:06:00::".to_string()]);
        assert_eq!(first.senses()[0].inventory(), &SenseInventory::wordnet30());
    }

    #[test]
    fn test_missing_key_marks_untagged() {
        let keys = "d000.s000.t000 art%1:06:00::\nd000.s001.t000 be%2:42:03::\n";
        let steps = collect(WsdDecoder::new().decode_str(XML, Some(keys), "toy").unwrap());
        let (first, notes) = annotated(&steps[0]);
        assert_eq!(first.senses().len(), 2);
        assert!(first.senses()[1].label().is_untagged());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, IssueKind::MissingGoldKey);
    }

    #[test]
    fn test_positional_alignment_when_ids_differ() {
        let keys = "k1 art%1:06:00::\nk2 change%1:11:00::\nk3 be%2:42:03::\n";
        let steps = collect(WsdDecoder::new().decode_str(XML, Some(keys), "toy").unwrap());
        let (second, _) = annotated(&steps[1]);
        assert_eq!(second.senses()[0].label().keys(), ["be%2:42:03::".to_string()]);
    }

    #[test]
    fn test_desync_when_counts_differ() {
        let keys = "k1 art%1:06:00::\n";
        let result = WsdDecoder::new().decode_str(XML, Some(keys), "toy");
        assert!(matches!(result, Err(Error::StructuralDesync(_))));
    }

    #[test]
    fn test_key_line_without_key_is_skipped() {
        let keys = "d000.s000.t000\nd000.s000.t001 change%1:11:00::\nd000.s001.t000 be%2:42:03::\n";
        let steps = collect(WsdDecoder::new().decode_str(XML, Some(keys), "toy").unwrap());
        assert_eq!(steps.len(), 3);
        match &steps[0] {
            Step::Skipped(issue) => {
                assert_eq!(issue.kind, IssueKind::MalformedRecord);
                assert_eq!(issue.position.line, 1);
            }
            other => panic!("expected skip, got {:?}", other),
        }
        let (first, notes) = annotated(&steps[1]);
        assert!(first.senses()[0].label().is_untagged());
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_undecodable_key_line_is_skipped() {
        let bytes: &[u8] = b"d000.s000.t000 art%1:06:00::\nd000.s000.t001 caf\xe9%1:13:00::\nd000.s001.t000 be%2:42:03::\n";
        let keys = parse_keys(bytes, "toy.gold.key.txt").unwrap();
        assert_eq!(keys.entries.len(), 2);
        assert_eq!(keys.entries[1].0, "d000.s001.t000");
        assert_eq!(keys.issues.len(), 1);
        assert_eq!(keys.issues[0].kind, IssueKind::MalformedRecord);
        assert_eq!(keys.issues[0].position.line, 2);
    }

    #[test]
    fn test_instance_without_id_skips_sentence() {
        let xml = r#"<corpus lang="en"><text id="d1">
<sentence id="d1.s1"><instance lemma="x" pos="NOUN">x</instance></sentence>
<sentence id="d1.s2"><wf lemma="y" pos="NOUN">y</wf></sentence>
</text></corpus>"#;
        let steps = collect(WsdDecoder::new().decode_str(xml, None, "toy").unwrap());
        assert!(matches!(steps[0], Step::Skipped(_)));
        assert!(matches!(steps[1], Step::Decoded { .. }));
    }

    #[test]
    fn test_wrong_root_is_unreadable() {
        let result = WsdDecoder::new().decode_str("<root/>", None, "toy");
        assert!(matches!(result, Err(Error::UnreadableInput { .. })));
    }
}
