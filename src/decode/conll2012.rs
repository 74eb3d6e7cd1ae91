//! CoNLL-2012 (OntoNotes 5.0) format.
//!
//! ```text
//! doc part word# word POS parse pred-lemma frameset sense speaker NE arg1 … argN coref
//! ```
//!
//! Rows whose frameset column is not `-` are predicates; the i-th argument
//! column holds the bracketed spans of the i-th predicate:
//!
//! ```text
//! (ARG0*   ARG0 starts here
//! *        inside (or outside) a span
//! *)       span ends here
//! (V*)     the predicate itself; a V span over several rows is a
//!          multi-word predicate
//! ```
//!
//! `#begin document (name); part NNN` / `#end document` lines delimit
//! documents. Sentence ids count from 0 inside each document.

use super::{columns, open_text, source_name, Block, Blocks, Decoder, Input, Step, StopAfterError, Steps};
use corpora_core::{
    AnnotatedSentence, Argument, Error, Issue, Position, PredicateArgumentStructure, Result,
    RolePolicy, Sentence, Token, TokenSpan,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;
use std::path::{Path, PathBuf};

const DOC: usize = 0;
const PART: usize = 1;
const WORD_NUM: usize = 2;
const WORD: usize = 3;
const POS: usize = 4;
const PRED_LEMMA: usize = 6;
const FRAMESET: usize = 7;
const FIRST_ARG: usize = 11;
/// Columns without any argument column: 11 fixed plus coreference.
const MIN_COLUMNS: usize = 12;

/// Extension of gold files inside an OntoNotes release directory.
pub const GOLD_EXTENSION: &str = "gold_conll";

/// Decoder for CoNLL-2012 files or directories of `*.gold_conll` files.
#[derive(Debug, Clone)]
pub struct Conll2012Decoder {
    roles: RolePolicy,
}

impl Default for Conll2012Decoder {
    fn default() -> Self {
        Self {
            roles: RolePolicy::Reject,
        }
    }
}

impl Conll2012Decoder {
    /// Decoder rejecting repeated roles on one predicate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repeated-role policy.
    #[must_use]
    pub fn with_role_policy(mut self, roles: RolePolicy) -> Self {
        self.roles = roles;
        self
    }

    /// Decode from any buffered reader.
    pub fn decode_reader<R>(&self, reader: R, source: impl Into<String>) -> Steps
    where
        R: BufRead + Send + 'static,
    {
        let source = source.into();
        Box::new(StopAfterError::new(Conll2012Steps {
            blocks: Blocks::new(reader, source.clone()),
            source,
            roles: self.roles,
            document: None,
            marked: false,
            sentence_in_document: 0,
        }))
    }
}

impl Decoder for Conll2012Decoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        if !input.data.is_dir() {
            let reader = open_text(&input.data)?;
            return Ok(self.decode_reader(reader, source_name(&input.data)));
        }
        let files = gold_files(&input.data)?;
        log::debug!(
            "{} {} files under {}",
            files.len(),
            GOLD_EXTENSION,
            input.data.display()
        );
        let decoder = self.clone();
        let steps = files.into_iter().flat_map(move |path| match open_text(&path) {
            Ok(reader) => decoder.decode_reader(reader, source_name(&path)),
            Err(e) => Box::new(std::iter::once(Err(e))) as Steps,
        });
        Ok(Box::new(StopAfterError::new(steps)))
    }
}

/// All gold files below `dir`, sorted.
pub fn gold_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("**").join(format!("*.{}", GOLD_EXTENSION));
    let paths = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| Error::unreadable(dir.display(), e.to_string()))?;
    let mut files: Vec<PathBuf> = paths.filter_map(|p| p.ok()).collect();
    files.sort();
    if files.is_empty() {
        return Err(Error::unreadable(
            dir.display(),
            format!("no *.{} files", GOLD_EXTENSION),
        ));
    }
    Ok(files)
}

static BEGIN_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^begin document \((.+)\);\s*part\s+(\S+)").unwrap());

struct Conll2012Steps<R> {
    blocks: Blocks<R>,
    source: String,
    roles: RolePolicy,
    document: Option<String>,
    /// `document` was named by a `#begin document` marker.
    marked: bool,
    sentence_in_document: usize,
}

impl<R: BufRead> Conll2012Steps<R> {
    fn observe_comments(&mut self, block: &Block) {
        for comment in &block.comments {
            if let Some(caps) = BEGIN_DOCUMENT.captures(comment) {
                self.document = Some(format!("{}/{}", &caps[1], &caps[2]));
                self.marked = true;
                self.sentence_in_document = 0;
            } else if comment.starts_with("end document") {
                self.document = None;
                self.marked = false;
                self.sentence_in_document = 0;
            }
        }
    }

    fn decode_block(&mut self, block: &Block) -> Step {
        let position = Position::new(self.source.as_str(), block.line, block.ordinal);
        let rows: Vec<Vec<&str>> = block.rows.iter().map(|r| columns(r)).collect();

        // Sentence numbering advances even when a record turns out malformed,
        // so ids stay aligned with the source.
        let document = if self.marked {
            self.document.clone()
        } else {
            let columns = rows[0]
                .get(PART)
                .map(|part| format!("{}/{}", rows[0][DOC], part));
            if columns.is_some() && columns != self.document {
                self.document = columns.clone();
                self.sentence_in_document = 0;
            }
            columns
        };
        let sentence_id = self.sentence_in_document;
        self.sentence_in_document += 1;
        if let Some(issue) = block.encoding_issue(&self.source) {
            return Step::Skipped(issue);
        }

        let parsed = document
            .ok_or_else(|| "missing document and part columns".to_string())
            .and_then(|doc| parse_sentence(&rows, &doc, sentence_id, self.roles));
        match parsed {
            Ok(sentence) => Step::decoded(sentence, position),
            Err(message) => {
                log::warn!("skipping CoNLL-2012 block at {}: {}", position, message);
                Step::Skipped(Issue::malformed(position, message))
            }
        }
    }
}

impl<R: BufRead> Iterator for Conll2012Steps<R> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = match self.blocks.next()? {
                Ok(block) => block,
                Err(e) => return Some(Err(e)),
            };
            self.observe_comments(&block);
            if block.rows.is_empty() {
                continue;
            }
            return Some(Ok(self.decode_block(&block)));
        }
    }
}

/// `lemma.frameset` for PropBank numeric framesets, the frameset otherwise.
fn frame_name(lemma: &str, frameset: &str) -> String {
    if lemma != "-" && !frameset.is_empty() && frameset.chars().all(|c| c.is_ascii_digit()) {
        format!("{}.{}", lemma, frameset)
    } else {
        frameset.to_string()
    }
}

/// Labeled spans of one bracketed argument column.
fn bracket_spans(rows: &[Vec<&str>], column: usize) -> std::result::Result<Vec<(String, usize, usize)>, String> {
    let mut spans = Vec::new();
    let mut open: Option<(String, usize)> = None;
    for (i, row) in rows.iter().enumerate() {
        let cell = row[column];
        let token = i + 1;
        if !cell.contains('*') {
            return Err(format!("argument cell {:?} at token {} has no '*'", cell, token));
        }
        if let Some(rest) = cell.strip_prefix('(') {
            if let Some((label, _)) = &open {
                return Err(format!("span {} opened inside {} at token {}", rest, label, token));
            }
            let label = rest.split('*').next().unwrap_or_default();
            if label.is_empty() || label.contains('(') {
                return Err(format!("bad span opening {:?} at token {}", cell, token));
            }
            open = Some((label.to_string(), token));
        }
        if cell.ends_with(')') {
            let (label, start) = open
                .take()
                .ok_or_else(|| format!("span closed without opening at token {}", token))?;
            spans.push((label, start, token));
        }
    }
    if let Some((label, start)) = open {
        return Err(format!("span {} opened at token {} never closes", label, start));
    }
    Ok(spans)
}

fn parse_sentence(
    rows: &[Vec<&str>],
    document: &str,
    sentence_id: usize,
    roles: RolePolicy,
) -> std::result::Result<AnnotatedSentence, String> {
    let width = rows[0].len();
    if width < MIN_COLUMNS {
        return Err(format!("expected at least {} columns, found {}", MIN_COLUMNS, width));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(format!("row {} has {} columns, first row has {}", i + 1, row.len(), width));
    }

    let mut tokens = Vec::with_capacity(rows.len());
    for row in rows {
        let word_num: usize = row[WORD_NUM]
            .parse()
            .map_err(|_| format!("word number {:?} is not a number", row[WORD_NUM]))?;
        let mut token = Token::new(word_num + 1, row[WORD]).with_pos(row[POS]);
        if row[PRED_LEMMA] != "-" {
            token = token.with_lemma(row[PRED_LEMMA]);
        }
        tokens.push(token);
    }
    let sentence = Sentence::from_tokens(sentence_id.to_string(), tokens)
        .map_err(|e| e.to_string())?
        .in_document(document);

    let predicate_rows: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r[FRAMESET] != "-")
        .map(|(i, _)| i)
        .collect();
    let argument_columns = width - MIN_COLUMNS;
    if argument_columns != predicate_rows.len() {
        return Err(format!(
            "{} predicates but {} argument columns",
            predicate_rows.len(),
            argument_columns
        ));
    }

    let mut predicates = Vec::with_capacity(predicate_rows.len());
    for (i, &row_idx) in predicate_rows.iter().enumerate() {
        let token = row_idx + 1;
        let spans = bracket_spans(rows, FIRST_ARG + i)?;
        let mut predicate_span = None;
        let mut arguments = Vec::new();
        for (label, start, end) in spans {
            let span = TokenSpan::new(start, end).map_err(|e| e.to_string())?;
            if label == "V" {
                if predicate_span.is_some() {
                    return Err(format!("predicate at token {} has two V spans", token));
                }
                predicate_span = Some(span);
            } else {
                arguments.push(Argument::new(label, span));
            }
        }
        let predicate_span = match predicate_span {
            Some(span) => span,
            None => TokenSpan::single(token).map_err(|e| e.to_string())?,
        };
        let row = &rows[row_idx];
        let frame = frame_name(row[PRED_LEMMA], row[FRAMESET]);
        let pas = PredicateArgumentStructure::new(token, predicate_span, frame, arguments, roles)
            .map_err(|e| e.to_string())?;
        predicates.push(pas);
    }

    AnnotatedSentence::new(sentence, predicates, Vec::new()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::Instance;
    use std::io::Cursor;

    const DOC: &str = "\
#begin document (bc/cctv/00/cctv_0001); part 000
bc/cctv/00/cctv_0001\t0\t0\tThe\tDT\t(TOP(S(NP*\t-\t-\t-\tSpeaker#1\t*\t(ARG0*\t-
bc/cctv/00/cctv_0001\t0\t1\tcompany\tNN\t*)\t-\t-\t-\tSpeaker#1\t*\t*)\t-
bc/cctv/00/cctv_0001\t0\t2\tsaid\tVBD\t(VP*\tsay\t01\t1\tSpeaker#1\t*\t(V*)\t-
bc/cctv/00/cctv_0001\t0\t3\tyesterday\tNN\t(NP*))\t-\t-\t-\tSpeaker#1\t*\t(ARGM-TMP*)\t-

bc/cctv/00/cctv_0001\t0\t0\tThey\tPRP\t(TOP(S(NP*)\t-\t-\t-\tSpeaker#1\t*\t(ARG0*)\t-
bc/cctv/00/cctv_0001\t0\t1\tpicked\tVBD\t(VP*\tpick\t04\t-\tSpeaker#1\t*\t(V*\t-
bc/cctv/00/cctv_0001\t0\t2\tup\tRP\t(PRT*)\t-\t-\t-\tSpeaker#1\t*\t*)\t-
bc/cctv/00/cctv_0001\t0\t3\tit\tPRP\t(NP*)))\t-\t-\t-\tSpeaker#1\t*\t(ARG1*)\t-

#end document
";

    fn decode(text: &str) -> Vec<Step> {
        Conll2012Decoder::new()
            .decode_reader(Cursor::new(text.to_string()), "mem")
            .map(|s| s.unwrap())
            .collect()
    }

    fn sentence(step: &Step) -> &AnnotatedSentence {
        match step {
            Step::Decoded {
                instance: Instance::Sentence(s),
                ..
            } => s,
            other => panic!("expected sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_document_and_sentence_ids() {
        let steps = decode(DOC);
        assert_eq!(steps.len(), 2);
        let first = sentence(&steps[0]).sentence();
        assert_eq!(first.document(), Some("bc/cctv/00/cctv_0001/000"));
        assert_eq!(first.id(), "0");
        assert_eq!(sentence(&steps[1]).sentence().id(), "1");
    }

    #[test]
    fn test_propbank_frame_and_arguments() {
        let steps = decode(DOC);
        let pas = &sentence(&steps[0]).predicates()[0];
        assert_eq!(pas.frame(), "say.01");
        assert_eq!(pas.predicate(), 3);
        let roles: Vec<_> = pas.arguments().iter().map(|a| (a.role(), a.span().start(), a.span().end())).collect();
        assert_eq!(roles, vec![("ARG0", 1, 2), ("ARGM-TMP", 4, 4)]);
    }

    #[test]
    fn test_multiword_predicate_merged() {
        let steps = decode(DOC);
        let pas = &sentence(&steps[1]).predicates()[0];
        assert_eq!(pas.frame(), "pick.04");
        assert!(pas.is_multiword());
        assert_eq!(pas.predicate_span().start(), 2);
        assert_eq!(pas.predicate_span().end(), 3);
        assert_eq!(pas.arguments().len(), 2);
    }

    #[test]
    fn test_unbalanced_brackets_skip_block() {
        let text = "\
d\t0\t0\tRun\tVB\t*\trun\t01\t-\t-\t*\t(ARG0*\t-

d\t0\t0\tGo\tVB\t*\tgo\t01\t-\t-\t*\t(V*)\t-
";
        let steps = decode(text);
        assert_eq!(steps.len(), 2);
        assert!(matches!(steps[0], Step::Skipped(_)));
        assert_eq!(sentence(&steps[1]).predicates()[0].frame(), "go.01");
    }

    #[test]
    fn test_frame_name() {
        assert_eq!(frame_name("say", "01"), "say.01");
        assert_eq!(frame_name("-", "01"), "01");
        assert_eq!(frame_name("be", "be.03"), "be.03");
    }
}
