//! UniteD-SRL format.
//!
//! CoNLL-U style blocks with document and sentence metadata:
//!
//! ```text
//! # document_id = en_0001
//! # sentence_id = 3
//! 1   The      the      _           _       B-AGENT
//! 2   cat      cat      _           _       I-AGENT
//! 3   sleeps   sleep    SLEEP.01    B-V     _
//! ```
//!
//! Columns are `id form lemma frame roles…`, one role column per predicate.
//! Frames come from the inventory named in the configuration and are passed
//! through verbatim. A role column is span-based (BIO) when any label other
//! than `B-V` starts with `B-`, dependency-based (one token per role)
//! otherwise.

use super::bio::bio_to_spans;
use super::{columns, open_text, source_name, Block, Blocks, Decoder, Input, Step, StopAfterError, Steps};
use corpora_core::{
    AnnotatedSentence, Argument, Issue, Position, PredicateArgumentStructure, Result, RolePolicy,
    Sentence, Token, TokenSpan,
};
use std::io::BufRead;

const ID: usize = 0;
const FORM: usize = 1;
const LEMMA: usize = 2;
const FRAME: usize = 3;
const FIXED_COLUMNS: usize = 4;

/// Decoder for UniteD-SRL files.
#[derive(Debug, Clone, Default)]
pub struct UnitedDecoder {
    roles: RolePolicy,
    inventory: Option<String>,
}

impl UnitedDecoder {
    /// Decoder permitting repeated roles, frames untagged.
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

    /// Tag every frame with the inventory it comes from (e.g. `VerbAtlas`).
    #[must_use]
    pub fn with_frame_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    /// Decode from any buffered reader.
    pub fn decode_reader<R>(&self, reader: R, source: impl Into<String>) -> Steps
    where
        R: BufRead + Send + 'static,
    {
        let source = source.into();
        let decoder = self.clone();
        let steps = Blocks::new(reader, source.clone()).filter_map(move |block| match block {
            Err(e) => Some(Err(e)),
            Ok(block) if block.rows.is_empty() => None,
            Ok(block) => Some(Ok(decoder.decode_block(&block, &source))),
        });
        Box::new(StopAfterError::new(steps))
    }

    fn decode_block(&self, block: &Block, source: &str) -> Step {
        if let Some(issue) = block.encoding_issue(source) {
            return Step::Skipped(issue);
        }
        let position = Position::new(source, block.line, block.ordinal);
        match self.parse_sentence(block) {
            Ok(sentence) => Step::decoded(sentence, position),
            Err(message) => {
                log::warn!("skipping UniteD-SRL block at {}: {}", position, message);
                Step::Skipped(Issue::malformed(position, message))
            }
        }
    }

    fn parse_sentence(&self, block: &Block) -> std::result::Result<AnnotatedSentence, String> {
        let rows: Vec<Vec<&str>> = block.rows.iter().map(|r| columns(r)).collect();
        let width = rows[0].len();
        if width < FIXED_COLUMNS {
            return Err(format!("expected at least {} columns, found {}", FIXED_COLUMNS, width));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(format!("row {} has {} columns, first row has {}", i + 1, row.len(), width));
        }

        let first_id: usize = rows[0][ID]
            .parse()
            .map_err(|_| format!("token id {:?} is not a number", rows[0][ID]))?;
        if first_id > 1 {
            return Err(format!("token ids start at {}", first_id));
        }
        let mut tokens = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let id: usize = row[ID]
                .parse()
                .map_err(|_| format!("token id {:?} is not a number", row[ID]))?;
            if id != first_id + i {
                return Err(format!("token id {} out of sequence at row {}", id, i + 1));
            }
            // Quotes are stripped to empty forms by some exporters.
            let form = if row[FORM].is_empty() { "\"" } else { row[FORM] };
            let mut token = Token::new(i + 1, form);
            if row[LEMMA] != "_" && !row[LEMMA].is_empty() {
                token = token.with_lemma(row[LEMMA]);
            }
            tokens.push(token);
        }

        let (document, sentence_id) = metadata(block);
        let id = match (&document, sentence_id) {
            (Some(doc), Some(sent)) => format!("{}_{}", doc, sent),
            (None, Some(sent)) => sent,
            (_, None) => block.ordinal.to_string(),
        };
        let mut sentence = Sentence::from_tokens(id, tokens).map_err(|e| e.to_string())?;
        if let Some(doc) = document {
            sentence = sentence.in_document(doc);
        }

        let predicate_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[FRAME] != "_")
            .map(|(i, _)| i)
            .collect();
        if width - FIXED_COLUMNS != predicate_rows.len() {
            return Err(format!(
                "{} predicates but {} role columns",
                predicate_rows.len(),
                width - FIXED_COLUMNS
            ));
        }

        let mut predicates = Vec::with_capacity(predicate_rows.len());
        for (column, &row_idx) in predicate_rows.iter().enumerate() {
            let token = row_idx + 1;
            let cells: Vec<&str> = rows.iter().map(|r| r[FIXED_COLUMNS + column]).collect();
            let (predicate_span, arguments) = role_column(&cells, token)?;
            let mut pas = PredicateArgumentStructure::new(
                token,
                predicate_span,
                rows[row_idx][FRAME],
                arguments,
                self.roles,
            )
            .map_err(|e| e.to_string())?;
            if let Some(inventory) = &self.inventory {
                pas = pas.with_inventory(inventory.as_str());
            }
            predicates.push(pas);
        }

        AnnotatedSentence::new(sentence, predicates, Vec::new()).map_err(|e| e.to_string())
    }
}

impl Decoder for UnitedDecoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        let reader = open_text(&input.data)?;
        Ok(self.decode_reader(reader, source_name(&input.data)))
    }
}

/// `document_id` and `sentence_id` from the block comments.
fn metadata(block: &Block) -> (Option<String>, Option<String>) {
    let mut document = None;
    let mut sentence = None;
    for comment in &block.comments {
        if let Some((key, value)) = comment.split_once('=') {
            let value = value.trim().to_string();
            match key.trim() {
                "document_id" => document = Some(value),
                "sentence_id" => sentence = Some(value),
                _ => {}
            }
        }
    }
    (document, sentence)
}

fn is_predicate_label(label: &str) -> bool {
    matches!(label, "V" | "B-V")
}

fn is_span_based(cells: &[&str]) -> bool {
    cells
        .iter()
        .any(|c| c.starts_with("B-") && !is_predicate_label(c))
}

/// Predicate span and arguments of one role column.
fn role_column(
    cells: &[&str],
    predicate: usize,
) -> std::result::Result<(TokenSpan, Vec<Argument>), String> {
    let mut predicate_span = None;
    let mut arguments = Vec::new();
    if is_span_based(cells) {
        for span in bio_to_spans(cells) {
            let token_span = TokenSpan::new(span.start, span.end).map_err(|e| e.to_string())?;
            if span.label == "V" {
                predicate_span.get_or_insert(token_span);
            } else {
                arguments.push(Argument::new(span.label, token_span));
            }
        }
    } else {
        for (i, cell) in cells.iter().enumerate() {
            if *cell == "_" || cell.is_empty() || is_predicate_label(cell) {
                continue;
            }
            let span = TokenSpan::single(i + 1).map_err(|e| e.to_string())?;
            arguments.push(Argument::new(*cell, span));
        }
    }
    let predicate_span = match predicate_span {
        Some(span) => span,
        None => TokenSpan::single(predicate).map_err(|e| e.to_string())?,
    };
    Ok((predicate_span, arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::Instance;
    use std::io::Cursor;

    const SPANS: &str = "\
# document_id = en_0001
# sentence_id = 3
0\tThe\tthe\t_\tB-AGENT
1\tcat\tcat\t_\tI-AGENT
2\tsleeps\tsleep\tSLEEP.01\tB-V
3\t\t_\t_\t_
";

    const DEPENDENCIES: &str = "\
# sentence_id = 7
1\tCats\tcat\t_\tAgent\t_
2\tchase\tchase\tPURSUE\tV\t_
3\tmice\tmouse\t_\tPatient\tAgent
4\tthat\tthat\t_\t_\t_
5\trun\trun\tRUN\t_\tV
";

    fn decode(decoder: &UnitedDecoder, text: &str) -> Vec<Step> {
        decoder
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
    fn test_span_based_roles_and_metadata() {
        let decoder = UnitedDecoder::new().with_frame_inventory("VerbAtlas");
        let steps = decode(&decoder, SPANS);
        let annotated = sentence(&steps[0]);
        let s = annotated.sentence();
        assert_eq!(s.id(), "en_0001_3");
        assert_eq!(s.document(), Some("en_0001"));
        assert_eq!(s.token(1).unwrap().form(), "The");
        assert_eq!(s.token(4).unwrap().form(), "\"");

        let pas = &annotated.predicates()[0];
        assert_eq!(pas.predicate(), 3);
        assert_eq!(pas.frame(), "SLEEP.01");
        assert_eq!(pas.inventory(), Some("VerbAtlas"));
        assert_eq!(pas.arguments().len(), 1);
        assert_eq!(pas.arguments()[0].role(), "AGENT");
        assert_eq!(pas.arguments()[0].span().end(), 2);
    }

    #[test]
    fn test_dependency_based_roles() {
        let steps = decode(&UnitedDecoder::new(), DEPENDENCIES);
        let annotated = sentence(&steps[0]);
        assert_eq!(annotated.sentence().id(), "7");
        let preds = annotated.predicates();
        assert_eq!(preds.len(), 2);
        let roles: Vec<_> = preds[0].arguments().iter().map(|a| (a.role(), a.span().start())).collect();
        assert_eq!(roles, vec![("Agent", 1), ("Patient", 3)]);
        assert_eq!(preds[1].arguments()[0].span().start(), 3);
        assert!(preds[1].inventory().is_none());
    }

    #[test]
    fn test_id_gap_is_malformed() {
        let text = "1\ta\ta\t_\n3\tb\tb\t_\n";
        let steps = decode(&UnitedDecoder::new(), text);
        assert!(matches!(steps[0], Step::Skipped(_)));
    }

    #[test]
    fn test_role_column_count_mismatch() {
        let text = "1\tgo\tgo\tGO\n";
        match &decode(&UnitedDecoder::new(), text)[0] {
            Step::Skipped(issue) => assert!(issue.message.contains("role columns")),
            other => panic!("expected skip, got {:?}", other),
        }
    }
}
