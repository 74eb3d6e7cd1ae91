//! CoNLL-2009 shared task format.
//!
//! ```text
//! ID FORM LEMMA PLEMMA POS PPOS FEAT PFEAT HEAD PHEAD DEPREL PDEPREL FILLPRED PRED APRED1 … APREDn
//! ```
//!
//! One row per token, one blank-line separated block per sentence. Rows with
//! `FILLPRED = Y` are predicates (frame in `PRED`); the i-th `APRED` column
//! labels the arguments of the i-th predicate, one token each. Gold columns
//! (LEMMA, POS, FEAT, HEAD, DEPREL) are read; predicted ones are ignored.

use super::{columns, open_text, source_name, Block, Blocks, Decoder, Input, Step, StopAfterError, Steps};
use corpora_core::{
    AnnotatedSentence, Argument, Dependency, Issue, Position, PredicateArgumentStructure, Result,
    RolePolicy, Sentence, Token, TokenSpan,
};
use std::collections::BTreeMap;
use std::io::BufRead;

const ID: usize = 0;
const FORM: usize = 1;
const LEMMA: usize = 2;
const POS: usize = 4;
const FEAT: usize = 6;
const HEAD: usize = 8;
const DEPREL: usize = 10;
const FILLPRED: usize = 12;
const PRED: usize = 13;
const FIXED_COLUMNS: usize = 14;

/// Decoder for CoNLL-2009 files.
#[derive(Debug, Clone, Default)]
pub struct Conll2009Decoder {
    roles: RolePolicy,
}

impl Conll2009Decoder {
    /// Decoder permitting repeated roles (modifiers repeat in dependency SRL).
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
        let roles = self.roles;
        let steps = Blocks::new(reader, source.clone()).filter_map(move |block| match block {
            Err(e) => Some(Err(e)),
            Ok(block) if block.rows.is_empty() => None,
            Ok(block) => Some(Ok(decode_block(&block, &source, roles))),
        });
        Box::new(StopAfterError::new(steps))
    }
}

impl Decoder for Conll2009Decoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        let reader = open_text(&input.data)?;
        Ok(self.decode_reader(reader, source_name(&input.data)))
    }
}

fn decode_block(block: &Block, source: &str, roles: RolePolicy) -> Step {
    if let Some(issue) = block.encoding_issue(source) {
        return Step::Skipped(issue);
    }
    let position = Position::new(source, block.line, block.ordinal);
    match parse_sentence(block, roles) {
        Ok(sentence) => Step::decoded(sentence, position),
        Err(message) => {
            log::warn!("skipping CoNLL-2009 block at {}: {}", position, message);
            Step::Skipped(Issue::malformed(position, message))
        }
    }
}

fn parse_sentence(block: &Block, roles: RolePolicy) -> std::result::Result<AnnotatedSentence, String> {
    let rows: Vec<Vec<&str>> = block.rows.iter().map(|r| columns(r)).collect();

    let width = rows[0].len();
    if width < FIXED_COLUMNS {
        return Err(format!(
            "expected at least {} columns, found {}",
            FIXED_COLUMNS, width
        ));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(format!(
            "row {} has {} columns, first row has {}",
            i + 1,
            row.len(),
            width
        ));
    }

    let predicate_rows: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r[FILLPRED] == "Y")
        .map(|(i, _)| i)
        .collect();
    if width - FIXED_COLUMNS != predicate_rows.len() {
        return Err(format!(
            "{} predicates but {} argument columns",
            predicate_rows.len(),
            width - FIXED_COLUMNS
        ));
    }

    let mut tokens = Vec::with_capacity(rows.len());
    let mut dependencies = BTreeMap::new();
    for row in &rows {
        let index: usize = row[ID]
            .parse()
            .map_err(|_| format!("token id {:?} is not a number", row[ID]))?;
        let mut token = Token::new(index, row[FORM]).with_features(Token::parse_features(row[FEAT]));
        if row[LEMMA] != "_" {
            token = token.with_lemma(row[LEMMA]);
        }
        if row[POS] != "_" {
            token = token.with_pos(row[POS]);
        }
        tokens.push(token);

        if row[HEAD] != "_" {
            let head: usize = row[HEAD]
                .parse()
                .map_err(|_| format!("head {:?} of token {} is not a number", row[HEAD], index))?;
            let relation = Some(row[DEPREL]).filter(|r| *r != "_").map(str::to_string);
            dependencies.insert(index, Dependency::new(head, relation));
        }
    }

    let sentence = Sentence::new(block.ordinal.to_string(), tokens, dependencies)
        .map_err(|e| e.to_string())?;

    let mut predicates = Vec::with_capacity(predicate_rows.len());
    for (column, &row_idx) in predicate_rows.iter().enumerate() {
        let token = row_idx + 1;
        let arguments = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[FIXED_COLUMNS + column] != "_")
            .map(|(i, r)| {
                TokenSpan::single(i + 1).map(|span| Argument::new(r[FIXED_COLUMNS + column], span))
            })
            .collect::<corpora_core::Result<Vec<_>>>()
            .map_err(|e| e.to_string())?;
        let span = TokenSpan::single(token).map_err(|e| e.to_string())?;
        let pas = PredicateArgumentStructure::new(token, span, rows[row_idx][PRED], arguments, roles)
            .map_err(|e| e.to_string())?;
        predicates.push(pas);
    }

    AnnotatedSentence::new(sentence, predicates, Vec::new()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::{Error, Instance, IssueKind};
    use std::io::Cursor;

    const TWO_SENTENCES: &str = "\
1\tThe\tthe\tthe\tDT\tDT\t_\t_\t2\t2\tNMOD\tNMOD\t_\t_\t_
2\tcat\tcat\tcat\tNN\tNN\t_\t_\t3\t3\tSBJ\tSBJ\t_\t_\tA0
3\tsleeps\tsleep\tsleep\tVBZ\tVBZ\t_\t_\t0\t0\tROOT\tROOT\tY\tsleep.01\t_

1\tDogs\tdog\tdog\tNNS\tNNS\t_\t_\t2\t2\tSBJ\tSBJ\t_\t_\tA0
2\tbark\tbark\tbark\tVBP\tVBP\t_\t_\t0\t0\tROOT\tROOT\tY\tbark.01\t_
";

    fn decode(text: &str) -> Vec<Step> {
        Conll2009Decoder::new()
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
    fn test_two_sentences_one_predicate_each() {
        let steps = decode(TWO_SENTENCES);
        assert_eq!(steps.len(), 2);

        let first = sentence(&steps[0]);
        assert_eq!(first.sentence().len(), 3);
        assert_eq!(first.predicates().len(), 1);
        let pas = &first.predicates()[0];
        assert_eq!(pas.predicate(), 3);
        assert_eq!(pas.frame(), "sleep.01");
        assert_eq!(pas.arguments().len(), 1);
        assert_eq!(pas.arguments()[0].role(), "A0");
        assert_eq!(pas.arguments()[0].span().start(), 2);

        let second = sentence(&steps[1]);
        assert_eq!(second.sentence().id(), "2");
        assert_eq!(second.predicates().len(), 1);
    }

    #[test]
    fn test_gold_columns() {
        let steps = decode(TWO_SENTENCES);
        let s = sentence(&steps[0]).sentence();
        let cat = s.token(2).unwrap();
        assert_eq!(cat.lemma(), Some("cat"));
        assert_eq!(cat.pos(), Some("NN"));
        let dep = s.dependency(2).unwrap();
        assert_eq!(dep.head, 3);
        assert_eq!(dep.relation.as_deref(), Some("SBJ"));
        assert!(s.dependency(3).unwrap().is_root());
    }

    #[test]
    fn test_bad_column_count_skips_only_that_block() {
        let text = format!(
            "1\tbroken\trow\n2\tonly\tthree\n\n{}",
            TWO_SENTENCES
        );
        let steps = decode(&text);
        assert_eq!(steps.len(), 3);
        match &steps[0] {
            Step::Skipped(issue) => {
                assert_eq!(issue.kind, IssueKind::MalformedRecord);
                assert_eq!(issue.position.line, 1);
                assert_eq!(issue.position.record, 1);
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(sentence(&steps[1]).sentence().id(), "2");
    }

    #[test]
    fn test_bad_byte_skips_only_its_block() {
        let (first, last) = TWO_SENTENCES.split_once("\n\n").unwrap();
        let mut bytes = format!("{}\n\n", first).into_bytes();
        bytes.extend_from_slice(b"1\tCaf\xe9\tcafe\tcafe\tNN\tNN\t_\t_\t0\t0\tROOT\tROOT\t_\t_\n\n");
        bytes.extend_from_slice(last.as_bytes());

        let steps: Vec<Step> = Conll2009Decoder::new()
            .decode_reader(Cursor::new(bytes), "mem")
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[0], Step::Decoded { .. }));
        match &steps[1] {
            Step::Skipped(issue) => {
                assert_eq!(issue.kind, IssueKind::MalformedRecord);
                assert_eq!(issue.position.line, 5);
                assert!(issue.message.contains("UTF-8"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(sentence(&steps[2]).sentence().id(), "3");
    }

    #[test]
    fn test_comment_only_input_is_unreadable() {
        let items: Vec<_> = Conll2009Decoder::new()
            .decode_reader(Cursor::new("# just a comment\n".to_string()), "mem")
            .collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::UnreadableInput { .. })));
    }

    #[test]
    fn test_head_out_of_range_is_malformed() {
        let text = "1\tHi\thi\thi\tUH\tUH\t_\t_\t5\t5\tROOT\tROOT\t_\t_\n";
        let steps = decode(text);
        assert!(matches!(steps[0], Step::Skipped(_)));
    }

    #[test]
    fn test_predicate_argument_column_mismatch() {
        let text = "1\tGo\tgo\tgo\tVB\tVB\t_\t_\t0\t0\tROOT\tROOT\tY\tgo.01\n";
        let steps = decode(text);
        match &steps[0] {
            Step::Skipped(issue) => assert!(issue.message.contains("argument columns")),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_roles_follow_policy() {
        let text = "\
1\tThen\tthen\tthen\tRB\tRB\t_\t_\t3\t3\tTMP\tTMP\t_\t_\tAM-TMP
2\tnow\tnow\tnow\tRB\tRB\t_\t_\t3\t3\tTMP\tTMP\t_\t_\tAM-TMP
3\tgo\tgo\tgo\tVB\tVB\t_\t_\t0\t0\tROOT\tROOT\tY\tgo.01\t_
";
        assert!(matches!(decode(text)[0], Step::Decoded { .. }));
        let rejecting = Conll2009Decoder::new().with_role_policy(RolePolicy::Reject);
        let steps: Vec<Step> = rejecting
            .decode_reader(Cursor::new(text.to_string()), "mem")
            .map(|s| s.unwrap())
            .collect();
        assert!(matches!(steps[0], Step::Skipped(_)));
    }
}
