//! Word-in-Context tables.
//!
//! Two tab-separated layouts, one pair per row:
//!
//! ```text
//! Tokens   lemma  pos  i1-i2  sentence1  sentence2  [label]
//! Offsets  lemma  pos  start1  end1  start2  end2  sentence1  sentence2  [label]
//! ```
//!
//! `Tokens` is WiC and the English XL-WiC data: 0-based token indices,
//! labels either inline or in a companion file with one label per line.
//! `Offsets` is the character-offset layout of XL-WiC and tabular MCL-WiC;
//! the target is the whitespace token containing the offset range.
//!
//! Sentences are pre-tokenized: tokens are the whitespace-separated words.

use super::{lossy, open_text, source_name, Decoder, Input, RawLines, Step, StopAfterError, Steps};
use corpora_core::{
    Error, Issue, Position, Result, Sentence, Token, WicInstance, WicLabel, WicTarget,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

/// Column layout of a WiC table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WicLayout {
    /// `lemma pos i1-i2 s1 s2 [label]`.
    #[default]
    Tokens,
    /// `lemma pos start1 end1 start2 end2 s1 s2 [label]`.
    Offsets,
}

impl WicLayout {
    fn min_columns(self) -> usize {
        match self {
            Self::Tokens => 5,
            Self::Offsets => 8,
        }
    }
}

/// How strictly a target word must match the row's lemma.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LemmaCheck {
    /// Case-insensitive equality.
    Exact,
    /// Equality, a shared prefix of all but the last two lemma characters,
    /// or a listed English irregular form (`take`/`took`, `mouse`/`mice`).
    #[default]
    Stem,
    /// No check.
    Off,
}

impl LemmaCheck {
    /// Whether `surface` is an acceptable form of `lemma`.
    #[must_use]
    pub fn accepts(self, lemma: &str, surface: &str) -> bool {
        let lemma = lemma.to_lowercase();
        let surface = surface.to_lowercase();
        match self {
            Self::Off => true,
            Self::Exact => lemma == surface,
            Self::Stem => {
                if lemma == surface {
                    return true;
                }
                if IRREGULAR
                    .get(lemma.as_str())
                    .map_or(false, |forms| forms.contains(&surface.as_str()))
                {
                    return true;
                }
                let len = lemma.chars().count();
                let needed = len.saturating_sub(2).max(1).min(len);
                let shared = lemma
                    .chars()
                    .zip(surface.chars())
                    .take_while(|(a, b)| a == b)
                    .count();
                len > 0 && shared >= needed
            }
        }
    }
}

/// English forms that share too little with their lemma for the prefix rule.
const IRREGULAR_FORMS: &[(&str, &[&str])] = &[
    ("be", &["am", "is", "are", "was", "were", "been", "being"]),
    ("bear", &["bore", "borne", "born"]),
    ("beat", &["beaten"]),
    ("become", &["became"]),
    ("begin", &["began", "begun"]),
    ("bend", &["bent"]),
    ("bind", &["bound"]),
    ("bite", &["bit", "bitten"]),
    ("bleed", &["bled"]),
    ("blow", &["blew", "blown"]),
    ("break", &["broke", "broken"]),
    ("breed", &["bred"]),
    ("bring", &["brought"]),
    ("build", &["built"]),
    ("buy", &["bought"]),
    ("catch", &["caught"]),
    ("child", &["children"]),
    ("choose", &["chose", "chosen"]),
    ("come", &["came"]),
    ("creep", &["crept"]),
    ("deal", &["dealt"]),
    ("dig", &["dug"]),
    ("do", &["did", "done", "does"]),
    ("draw", &["drew", "drawn"]),
    ("drink", &["drank", "drunk"]),
    ("drive", &["drove", "driven"]),
    ("eat", &["ate", "eaten"]),
    ("fall", &["fell", "fallen"]),
    ("feed", &["fed"]),
    ("feel", &["felt"]),
    ("fight", &["fought"]),
    ("find", &["found"]),
    ("flee", &["fled"]),
    ("fly", &["flew", "flown", "flies"]),
    ("foot", &["feet"]),
    ("forget", &["forgot", "forgotten"]),
    ("freeze", &["froze", "frozen"]),
    ("get", &["got", "gotten"]),
    ("give", &["gave", "given"]),
    ("go", &["went", "gone", "goes"]),
    ("goose", &["geese"]),
    ("grind", &["ground"]),
    ("grow", &["grew", "grown"]),
    ("hang", &["hung"]),
    ("have", &["has", "had"]),
    ("hear", &["heard"]),
    ("hide", &["hid", "hidden"]),
    ("hold", &["held"]),
    ("keep", &["kept"]),
    ("kneel", &["knelt"]),
    ("know", &["knew", "known"]),
    ("lay", &["laid"]),
    ("lead", &["led"]),
    ("leave", &["left"]),
    ("lend", &["lent"]),
    ("lie", &["lay", "lain"]),
    ("lose", &["lost"]),
    ("louse", &["lice"]),
    ("make", &["made"]),
    ("man", &["men"]),
    ("mean", &["meant"]),
    ("meet", &["met"]),
    ("mouse", &["mice"]),
    ("ox", &["oxen"]),
    ("pay", &["paid"]),
    ("person", &["people"]),
    ("ride", &["rode", "ridden"]),
    ("ring", &["rang", "rung"]),
    ("rise", &["rose", "risen"]),
    ("run", &["ran"]),
    ("say", &["said"]),
    ("see", &["saw", "seen"]),
    ("seek", &["sought"]),
    ("sell", &["sold"]),
    ("send", &["sent"]),
    ("shake", &["shook", "shaken"]),
    ("shine", &["shone"]),
    ("shoot", &["shot"]),
    ("sing", &["sang", "sung"]),
    ("sink", &["sank", "sunk"]),
    ("sit", &["sat"]),
    ("sleep", &["slept"]),
    ("slide", &["slid"]),
    ("speak", &["spoke", "spoken"]),
    ("spend", &["spent"]),
    ("spin", &["spun"]),
    ("stand", &["stood"]),
    ("steal", &["stole", "stolen"]),
    ("stick", &["stuck"]),
    ("sting", &["stung"]),
    ("strike", &["struck"]),
    ("swear", &["swore", "sworn"]),
    ("sweep", &["swept"]),
    ("swim", &["swam", "swum"]),
    ("swing", &["swung"]),
    ("take", &["took", "taken"]),
    ("teach", &["taught"]),
    ("tear", &["tore", "torn"]),
    ("tell", &["told"]),
    ("think", &["thought"]),
    ("throw", &["threw", "thrown"]),
    ("tooth", &["teeth"]),
    ("wake", &["woke", "woken"]),
    ("wear", &["wore", "worn"]),
    ("weave", &["wove", "woven"]),
    ("weep", &["wept"]),
    ("win", &["won"]),
    ("wind", &["wound"]),
    ("woman", &["women"]),
    ("write", &["wrote", "written"]),
];

static IRREGULAR: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| IRREGULAR_FORMS.iter().copied().collect());

/// Decoder for WiC tables.
#[derive(Debug, Clone, Default)]
pub struct WicDecoder {
    layout: WicLayout,
    lemma_check: LemmaCheck,
    has_header: bool,
}

impl WicDecoder {
    /// Decoder for `layout` with the default lemma check.
    #[must_use]
    pub fn new(layout: WicLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Set the lemma check.
    #[must_use]
    pub fn with_lemma_check(mut self, check: LemmaCheck) -> Self {
        self.lemma_check = check;
        self
    }

    /// Skip the first non-empty row.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Decode rows from any buffered reader, labels inline or absent.
    pub fn decode_reader<R>(&self, reader: R, source: impl Into<String>) -> Steps
    where
        R: BufRead + Send + 'static,
    {
        self.steps(reader, source.into(), None)
    }

    /// Decode rows with labels from a companion reader, aligned by position.
    pub fn decode_with_labels<R, L>(
        &self,
        reader: R,
        source: impl Into<String>,
        labels: L,
        labels_source: impl Into<String>,
    ) -> Steps
    where
        R: BufRead + Send + 'static,
        L: BufRead + Send + 'static,
    {
        let labels = Labels {
            lines: RawLines::new(Box::new(labels) as Box<dyn BufRead + Send>),
            source: labels_source.into(),
            line_no: 0,
        };
        self.steps(reader, source.into(), Some(labels))
    }

    fn steps<R>(&self, reader: R, source: String, labels: Option<Labels>) -> Steps
    where
        R: BufRead + Send + 'static,
    {
        let stem = source.split('.').next().unwrap_or_default().to_string();
        Box::new(StopAfterError::new(WicRows {
            lines: RawLines::new(reader),
            labels,
            decoder: self.clone(),
            source,
            stem,
            line_no: 0,
            record: 0,
            header_pending: self.has_header,
            done: false,
        }))
    }
}

impl Decoder for WicDecoder {
    fn decode(&self, input: &Input) -> Result<Steps> {
        let reader = open_text(&input.data)?;
        let source = source_name(&input.data);
        match &input.companion {
            Some(path) => {
                let labels = open_text(path)?;
                Ok(self.decode_with_labels(reader, source, labels, source_name(path)))
            }
            None => Ok(self.decode_reader(reader, source)),
        }
    }
}

struct Labels {
    lines: RawLines<Box<dyn BufRead + Send>>,
    source: String,
    line_no: usize,
}

impl Labels {
    /// Next non-empty label line. Undecodable bytes are kept lossily and
    /// fail later as an unparsable label.
    fn next_label(&mut self) -> Option<Result<String>> {
        loop {
            match self.lines.next()? {
                Err(e) => return Some(Err(Error::Io(e))),
                Ok(line) => {
                    self.line_no += 1;
                    let line = line.unwrap_or_else(|e| lossy(&e));
                    let label = line.trim();
                    if !label.is_empty() {
                        return Some(Ok(label.to_string()));
                    }
                }
            }
        }
    }
}

struct WicRows<R> {
    lines: RawLines<R>,
    labels: Option<Labels>,
    decoder: WicDecoder,
    source: String,
    stem: String,
    line_no: usize,
    record: usize,
    header_pending: bool,
    done: bool,
}

impl<R: BufRead> WicRows<R> {
    /// Error if the label file still has lines once the rows ran out.
    fn check_labels_exhausted(&mut self) -> Option<Result<Step>> {
        let labels = self.labels.as_mut()?;
        match labels.next_label()? {
            Err(e) => Some(Err(e)),
            Ok(_) => Some(Err(Error::desync(format!(
                "{}:{} has more labels than {} has rows ({})",
                labels.source, labels.line_no, self.source, self.record
            )))),
        }
    }

    fn decode_row(&self, line: &str, label: Option<String>, position: Position) -> Step {
        let id = format!("{}.{}", self.stem, self.record);
        match parse_row(&self.decoder, line, label, &id) {
            Ok(instance) => Step::decoded(instance, position),
            Err(message) => {
                log::warn!("skipping WiC row at {}: {}", position, message);
                Step::Skipped(Issue::malformed(position, message))
            }
        }
    }
}

impl<R: BufRead> Iterator for WicRows<R> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let decoded = match self.lines.next() {
                Some(Ok(decoded)) => decoded,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::Io(e)));
                }
                None => {
                    self.done = true;
                    if self.record == 0 {
                        return Some(Err(Error::unreadable(&self.source, "no records")));
                    }
                    return self.check_labels_exhausted();
                }
            };
            self.line_no += 1;
            let (line, valid) = match decoded {
                Ok(line) => (line, true),
                Err(e) => (lossy(&e), false),
            };
            if line.trim().is_empty() {
                continue;
            }
            if self.header_pending {
                self.header_pending = false;
                continue;
            }
            self.record += 1;
            let position = Position::new(self.source.as_str(), self.line_no, self.record);

            let label = match self.labels.as_mut().map(Labels::next_label) {
                None => None,
                Some(Some(Ok(label))) => Some(label),
                Some(Some(Err(e))) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(None) => {
                    self.done = true;
                    return Some(Err(Error::desync(format!(
                        "labels ran out at row {} of {}",
                        self.record, self.source
                    ))));
                }
            };
            if !valid {
                log::warn!("skipping WiC row at {}: not valid UTF-8", position);
                return Some(Ok(Step::Skipped(Issue::malformed(position, "row is not valid UTF-8"))));
            }
            return Some(Ok(self.decode_row(&line, label, position)));
        }
    }
}

fn whitespace_sentence(id: String, text: &str) -> std::result::Result<Sentence, String> {
    let tokens = text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| Token::new(i + 1, word))
        .collect();
    Sentence::from_tokens(id, tokens).map_err(|e| e.to_string())
}

fn parse_index(cell: &str, what: &str) -> std::result::Result<usize, String> {
    cell.trim()
        .parse()
        .map_err(|_| format!("{} {:?} is not a number", what, cell))
}

fn one_based(index: usize) -> std::result::Result<usize, String> {
    index
        .checked_add(1)
        .ok_or_else(|| format!("index {} is out of range", index))
}

/// 1-based token containing the character range `start..end`, and the text
/// of the range.
fn token_at_offsets(text: &str, start: usize, end: usize) -> std::result::Result<(usize, String), String> {
    let chars: Vec<char> = text.chars().collect();
    if start >= end || end > chars.len() {
        return Err(format!(
            "offsets {}..{} outside a sentence of {} characters",
            start,
            end,
            chars.len()
        ));
    }
    let surface: String = chars[start..end].iter().collect();
    let mut index = 0;
    let mut in_token = false;
    let mut token_start = 0;
    for (pos, c) in chars.iter().enumerate().chain(std::iter::once((chars.len(), &' '))) {
        if c.is_whitespace() {
            if in_token && token_start <= start && end <= pos {
                return Ok((index, surface));
            }
            in_token = false;
        } else if !in_token {
            in_token = true;
            token_start = pos;
            index += 1;
        }
    }
    Err(format!("offsets {}..{} ({:?}) span more than one token", start, end, surface))
}

fn target(
    id: String,
    text: &str,
    index: usize,
    surface: Option<String>,
) -> std::result::Result<WicTarget, String> {
    let sentence = whitespace_sentence(id, text)?;
    if index == 0 || index > sentence.len() {
        return Err(format!(
            "target index {} outside a sentence of {} tokens",
            index,
            sentence.len()
        ));
    }
    let target = match surface {
        Some(surface) => WicTarget::new(sentence, index, surface),
        None => WicTarget::at(sentence, index),
    };
    target.map_err(|e| e.to_string())
}

fn parse_row(
    decoder: &WicDecoder,
    line: &str,
    label: Option<String>,
    id: &str,
) -> std::result::Result<WicInstance, String> {
    let cells: Vec<&str> = line.split('\t').collect();
    let min = decoder.layout.min_columns();
    if cells.len() < min {
        return Err(format!("expected at least {} columns, found {}", min, cells.len()));
    }
    let lemma = cells[0].trim();
    let pos = Some(cells[1].trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let (first, second, inline) = match decoder.layout {
        WicLayout::Tokens => {
            let (i1, i2) = cells[2]
                .split_once('-')
                .ok_or_else(|| format!("index pair {:?} is not i1-i2", cells[2]))?;
            let i1 = one_based(parse_index(i1, "index")?)?;
            let i2 = one_based(parse_index(i2, "index")?)?;
            let first = target(format!("{}.1", id), cells[3], i1, None)?;
            let second = target(format!("{}.2", id), cells[4], i2, None)?;
            (first, second, cells.get(5))
        }
        WicLayout::Offsets => {
            let start1 = parse_index(cells[2], "start offset")?;
            let end1 = parse_index(cells[3], "end offset")?;
            let start2 = parse_index(cells[4], "start offset")?;
            let end2 = parse_index(cells[5], "end offset")?;
            let (i1, surface1) = token_at_offsets(cells[6], start1, end1)?;
            let (i2, surface2) = token_at_offsets(cells[7], start2, end2)?;
            let first = target(format!("{}.1", id), cells[6], i1, Some(surface1))?;
            let second = target(format!("{}.2", id), cells[7], i2, Some(surface2))?;
            (first, second, cells.get(8))
        }
    };

    for t in [&first, &second] {
        if !decoder.lemma_check.accepts(lemma, t.surface()) {
            return Err(format!(
                "target {:?} in sentence {} does not match lemma {:?}",
                t.surface(),
                t.sentence().id(),
                lemma
            ));
        }
    }

    let label = label
        .as_deref()
        .or_else(|| inline.map(|c| c.trim()).filter(|c| !c.is_empty()))
        .map(|raw| raw.parse::<WicLabel>().map_err(|e| e.to_string()))
        .transpose()?;

    Ok(WicInstance::new(id, lemma, pos, first, second, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::{Instance, IssueKind};
    use std::io::Cursor;

    const TOKENS: &str = "\
bed\tN\t1-2\tThere's a lot of trash on the bed of the river .\tI keep a glass of water next to my bed when I sleep .\tF
beat\tV\t0-0\tBeat the eggs .\tBeat the competition .\tT
";

    fn collect(steps: Steps) -> Vec<Result<Step>> {
        steps.collect()
    }

    fn wic(step: &Step) -> &WicInstance {
        match step {
            Step::Decoded {
                instance: Instance::Wic(w),
                ..
            } => w,
            other => panic!("expected WiC pair, got {:?}", other),
        }
    }

    #[test]
    fn test_lemma_check() {
        assert!(LemmaCheck::Exact.accepts("Bed", "bed"));
        assert!(!LemmaCheck::Exact.accepts("bed", "beds"));
        assert!(LemmaCheck::Stem.accepts("carry", "carried"));
        assert!(LemmaCheck::Stem.accepts("go", "goes"));
        assert!(!LemmaCheck::Stem.accepts("bed", "the"));
        assert!(!LemmaCheck::Exact.accepts("go", "went"));
        assert!(LemmaCheck::Off.accepts("bed", "the"));
    }

    #[test]
    fn test_stem_accepts_irregular_forms() {
        for (lemma, form) in [("take", "took"), ("give", "gave"), ("mouse", "mice"), ("go", "Went")] {
            assert!(LemmaCheck::Stem.accepts(lemma, form), "{} / {}", lemma, form);
        }
        assert!(!LemmaCheck::Stem.accepts("take", "gave"));
    }

    #[test]
    fn test_irregular_rows_decode_with_default_check() {
        let text = "\
take\tV\t1-0\tI took the bus .\tTaken together , they agree .\tF
mouse\tN\t1-1\tThe mice ran .\tThree mice hid .\tT
";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(text.to_string()), "mem"));
        assert_eq!(steps.len(), 2);
        assert_eq!(wic(steps[0].as_ref().unwrap()).first().surface(), "took");
        assert_eq!(wic(steps[1].as_ref().unwrap()).second().surface(), "mice");
    }

    #[test]
    fn test_huge_index_is_malformed() {
        let text = "\
beat\tV\t18446744073709551615-0\tBeat the eggs .\tBeat the competition .\tT
beat\tV\t0-0\tBeat the eggs .\tBeat the competition .\tT
";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(text.to_string()), "mem"));
        assert_eq!(steps.len(), 2);
        match steps[0].as_ref().unwrap() {
            Step::Skipped(issue) => {
                assert_eq!(issue.kind, IssueKind::MalformedRecord);
                assert!(issue.message.contains("out of range"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(wic(steps[1].as_ref().unwrap()).lemma(), "beat");
    }

    #[test]
    fn test_bad_byte_skips_only_its_row() {
        let mut bytes = b"beat\tV\t0-0\tBeat the eggs .\tBeat the competition .\tT\n".to_vec();
        bytes.extend_from_slice(b"caf\xe9\tN\t0-0\tcaf\xe9 au lait\tcaf\xe9 noir\tT\n");
        bytes.extend_from_slice(b"go\tV\t0-0\tGo away .\tGo for it .\tF\n");
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(bytes), "mem"));
        assert_eq!(steps.len(), 3);
        match steps[1].as_ref().unwrap() {
            Step::Skipped(issue) => {
                assert_eq!(issue.position.line, 2);
                assert!(issue.message.contains("UTF-8"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(wic(steps[2].as_ref().unwrap()).lemma(), "go");
    }

    #[test]
    fn test_token_layout() {
        let text = "bed\tN\t7-9\tThere's a lot of trash on the bed of the river .\tI keep a glass of water next to my bed when I sleep .\tF\n";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(text.to_string()), "train.txt"));
        assert_eq!(steps.len(), 1);
        let step = steps[0].as_ref().unwrap();
        let pair = wic(step);
        assert_eq!(pair.id(), "train.1");
        assert_eq!(pair.first().index(), 8);
        assert_eq!(pair.first().surface(), "bed");
        assert_eq!(pair.second().index(), 10);
        assert_eq!(pair.label(), Some(WicLabel::Binary(false)));
    }

    #[test]
    fn test_lemma_mismatch_rejected_with_position() {
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(TOKENS.to_string()), "mem"));
        assert_eq!(steps.len(), 2);
        match steps[0].as_ref().unwrap() {
            Step::Skipped(issue) => {
                assert_eq!(issue.kind, IssueKind::MalformedRecord);
                assert_eq!(issue.position.line, 1);
                assert!(issue.message.contains("does not match lemma"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(wic(steps[1].as_ref().unwrap()).lemma(), "beat");
    }

    #[test]
    fn test_index_past_end_is_malformed() {
        let text = "beat\tV\t0-9\tBeat the eggs .\tBeat the competition .\tT\n";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new(text.to_string()), "mem"));
        match steps[0].as_ref().unwrap() {
            Step::Skipped(issue) => assert!(issue.message.contains("outside")),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_companion_labels() {
        let rows = "beat\tV\t0-0\tBeat the eggs .\tBeat the competition .\n";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_with_labels(
            Cursor::new(rows.to_string()),
            "dev.data.txt",
            Cursor::new("F\n".to_string()),
            "dev.gold.txt",
        ));
        assert_eq!(steps.len(), 1);
        assert_eq!(wic(steps[0].as_ref().unwrap()).label(), Some(WicLabel::Binary(false)));
    }

    #[test]
    fn test_label_count_mismatch_is_desync() {
        let rows = "beat\tV\t0-0\tBeat the eggs .\tBeat the competition .\n";
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_with_labels(
            Cursor::new(rows.to_string()),
            "dev.data.txt",
            Cursor::new("F\nT\n".to_string()),
            "dev.gold.txt",
        ));
        assert_eq!(steps.len(), 2);
        assert!(matches!(steps[1], Err(Error::StructuralDesync(_))));
    }

    #[test]
    fn test_offset_layout_and_header() {
        let text = "\
lemma\tpos\tstart1\tend1\tstart2\tend2\tsentence1\tsentence2\tlabel
gatto\tNOUN\t3\t8\t4\t9\tIl gatto dorme.\tDue gatti, non uno.\t1
";
        let steps = collect(
            WicDecoder::new(WicLayout::Offsets)
                .with_header(true)
                .decode_reader(Cursor::new(text.to_string()), "it.tsv"),
        );
        assert_eq!(steps.len(), 1);
        let pair = wic(steps[0].as_ref().unwrap());
        assert_eq!(pair.first().index(), 2);
        assert_eq!(pair.second().index(), 2);
        assert_eq!(pair.second().surface(), "gatti");
        assert_eq!(pair.label(), Some(WicLabel::Binary(true)));
    }

    #[test]
    fn test_offsets_across_tokens_are_malformed() {
        assert!(token_at_offsets("a big cat", 2, 7).is_err());
        assert_eq!(token_at_offsets("a big cat", 2, 5).unwrap(), (2, "big".to_string()));
    }

    #[test]
    fn test_empty_table_is_unreadable() {
        let steps = collect(WicDecoder::new(WicLayout::Tokens).decode_reader(Cursor::new("\n".to_string()), "mem"));
        assert!(matches!(steps[0], Err(Error::UnreadableInput { .. })));
    }
}
