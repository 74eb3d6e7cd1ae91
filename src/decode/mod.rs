//! Format decoders.
//!
//! Every decoder turns one input into a lazy sequence of [`Step`]s:
//!
//! ```text
//! input ──► Decoder::decode ──► Step::Decoded { instance, position, notes }
//!                           ├─► Step::Skipped(issue)      (record dropped)
//!                           └─► Err(fatal)                (always last)
//! ```
//!
//! A decoder never fails on an isolated bad record. It fails only when the
//! input cannot be read, is empty, or cannot be aligned with its companion
//! file. Dropping the sequence closes the underlying file.
//!
//! | Module | Corpus family |
//! |--------|---------------|
//! | [`conll2009`] | CoNLL-2009 dependency SRL |
//! | [`conll2012`] | CoNLL-2012 (OntoNotes) span SRL |
//! | [`united`] | UniteD-SRL |
//! | [`wsd`] | WSD Evaluation Framework (XML + gold key) |
//! | [`xlwsd`] | XL-WSD (per-language framework pairs) |
//! | [`wic`] | WiC, XL-WiC and tabular MCL-WiC |

pub mod bio;
pub mod conll2009;
pub mod conll2012;
pub mod united;
pub mod wic;
pub mod wsd;
pub mod xlwsd;

use corpora_core::{Error, Instance, Issue, Position, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::string::FromUtf8Error;
use std::path::{Path, PathBuf};

/// One item of a decoded sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A canonical instance, with recoverable conditions found while building it.
    Decoded {
        /// The instance.
        instance: Instance,
        /// Where its record starts.
        position: Position,
        /// Conditions that did not prevent decoding (e.g. missing gold keys).
        notes: Vec<Issue>,
    },
    /// A record that could not be decoded and was skipped.
    Skipped(Issue),
}

impl Step {
    /// A decoded instance without notes.
    pub fn decoded(instance: impl Into<Instance>, position: Position) -> Self {
        Self::Decoded {
            instance: instance.into(),
            position,
            notes: Vec::new(),
        }
    }
}

/// Lazy decoder output.
pub type Steps = Box<dyn Iterator<Item = Result<Step>> + Send>;

/// Files making up one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Corpus file (or directory, for CoNLL-2012).
    pub data: PathBuf,
    /// Gold key or label file paired with `data`.
    pub companion: Option<PathBuf>,
}

impl Input {
    /// An input without companion file.
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            companion: None,
        }
    }

    /// Attach the paired key or label file.
    #[must_use]
    pub fn with_companion(mut self, companion: impl Into<PathBuf>) -> Self {
        self.companion = Some(companion.into());
        self
    }
}

/// Capability shared by all format decoders.
pub trait Decoder {
    /// Open `input` and return its lazy sequence of steps.
    ///
    /// # Errors
    ///
    /// [`Error::UnreadableInput`] when a file cannot be opened or is empty,
    /// [`Error::StructuralDesync`] when paired files cannot be aligned up front.
    fn decode(&self, input: &Input) -> Result<Steps>;
}

// =============================================================================
// Shared helpers
// =============================================================================

/// File name used in positions and messages.
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open a text file, refusing empty ones.
pub(crate) fn open_text(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::unreadable(path.display(), e.to_string()))?;
    let len = file
        .metadata()
        .map_err(|e| Error::unreadable(path.display(), e.to_string()))?
        .len();
    if len == 0 {
        return Err(Error::unreadable(path.display(), "file is empty"));
    }
    log::debug!("opened {} ({} bytes)", path.display(), len);
    Ok(BufReader::new(file))
}

/// Split a CoNLL row on tabs, or on whitespace when it has no tabs.
pub(crate) fn columns(row: &str) -> Vec<&str> {
    let row = row.trim();
    if row.contains('\t') {
        row.split('\t').map(str::trim).collect()
    } else {
        row.split_whitespace().collect()
    }
}

/// Reads lines as bytes and decodes each one separately, so a stray byte
/// only spoils the line that holds it. Line terminators are removed.
pub(crate) struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> RawLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    /// Outer error: the stream failed. Inner error: the line is not UTF-8.
    type Item = io::Result<std::result::Result<String, FromUtf8Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8(std::mem::take(&mut self.buf))))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Lossy text of a line that failed to decode, for messages.
pub(crate) fn lossy(err: &FromUtf8Error) -> String {
    String::from_utf8_lossy(err.as_bytes()).into_owned()
}

/// Ends a sequence right after its first error.
pub(crate) struct StopAfterError<I> {
    inner: I,
    stopped: bool,
}

impl<I> StopAfterError<I> {
    pub(crate) fn new(inner: I) -> Self {
        Self {
            inner,
            stopped: false,
        }
    }
}

impl<I: Iterator<Item = Result<Step>>> Iterator for StopAfterError<I> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }
        let item = self.inner.next()?;
        if item.is_err() {
            self.stopped = true;
        }
        Some(item)
    }
}

// =============================================================================
// Blank-line separated blocks
// =============================================================================

/// One blank-line separated block of a column file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// 1-based line of the first row (or first comment of a row-less block).
    pub line: usize,
    /// 1-based ordinal among blocks that have rows; 0 for comment-only blocks.
    pub ordinal: usize,
    /// `#` lines in front of (or closing) the block, without the `#`.
    pub comments: Vec<String>,
    /// Data rows, line terminators removed.
    pub rows: Vec<String>,
    /// 1-based line of the first row that was not valid UTF-8, kept lossily
    /// in `rows`.
    pub undecodable: Option<usize>,
}

impl Block {
    /// Malformed-record issue for a block holding undecodable bytes.
    pub fn encoding_issue(&self, source: &str) -> Option<Issue> {
        self.undecodable.map(|line| {
            Issue::malformed(
                Position::new(source, self.line, self.ordinal),
                format!("line {} is not valid UTF-8", line),
            )
        })
    }
}

/// Splits a column file into blocks, tracking line numbers.
///
/// A `#` line seen after rows closes the current block and opens the next
/// one, so document markers are never lost between blocks. An input with no
/// rows at all ends with [`Error::UnreadableInput`].
pub struct Blocks<R> {
    lines: RawLines<R>,
    source: String,
    line_no: usize,
    ordinal: usize,
    pending: Option<(usize, String)>,
    produced: bool,
    done: bool,
}

impl<R: BufRead> Blocks<R> {
    /// Wrap a reader; `source` labels positions and errors.
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: RawLines::new(reader),
            source: source.into(),
            line_no: 0,
            ordinal: 0,
            pending: None,
            produced: false,
            done: false,
        }
    }

    /// Label of the input.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn finish(&mut self, mut block: Block) -> Block {
        if !block.rows.is_empty() {
            self.ordinal += 1;
            self.produced = true;
            block.ordinal = self.ordinal;
        }
        block
    }
}

impl<R: BufRead> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut block = Block::default();
        if let Some((line, comment)) = self.pending.take() {
            block.line = line;
            block.comments.push(comment);
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
                    // A trailing comment-only block still carries markers,
                    // but never stands in for records.
                    if !block.rows.is_empty() || (self.produced && !block.comments.is_empty()) {
                        return Some(Ok(self.finish(block)));
                    }
                    if !self.produced {
                        return Some(Err(Error::unreadable(&self.source, "no records")));
                    }
                    return None;
                }
            };
            self.line_no += 1;
            let (line, valid) = match decoded {
                Ok(line) => (line, true),
                Err(e) => {
                    log::warn!("{}:{} is not valid UTF-8", self.source, self.line_no);
                    (lossy(&e), false)
                }
            };

            if line.trim().is_empty() {
                if block.rows.is_empty() {
                    continue;
                }
                return Some(Ok(self.finish(block)));
            }

            if let Some(comment) = line.trim_start().strip_prefix('#') {
                if !block.rows.is_empty() {
                    self.pending = Some((self.line_no, comment.trim().to_string()));
                    return Some(Ok(self.finish(block)));
                }
                if block.comments.is_empty() {
                    block.line = self.line_no;
                }
                block.comments.push(comment.trim().to_string());
                continue;
            }

            if block.rows.is_empty() {
                block.line = self.line_no;
            }
            if !valid && block.undecodable.is_none() {
                block.undecodable = Some(self.line_no);
            }
            block.rows.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::IssueKind;
    use std::io::Cursor;

    fn blocks(text: &str) -> Vec<Result<Block>> {
        Blocks::new(Cursor::new(text.to_string()), "mem").collect()
    }

    #[test]
    fn test_blocks_track_lines_and_ordinals() {
        let out = blocks("a\nb\n\n\nc\n");
        let out: Vec<Block> = out.into_iter().map(|b| b.unwrap()).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rows, vec!["a", "b"]);
        assert_eq!(out[0].line, 1);
        assert_eq!(out[1].line, 5);
        assert_eq!(out[1].ordinal, 2);
    }

    #[test]
    fn test_blocks_keep_comments() {
        let out = blocks("#begin document (x); part 000\nr1\nr2\n#end document\n");
        let out: Vec<Block> = out.into_iter().map(|b| b.unwrap()).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].comments, vec!["begin document (x); part 000"]);
        assert_eq!(out[0].rows.len(), 2);
        assert_eq!(out[1].comments, vec!["end document"]);
        assert!(out[1].rows.is_empty());
        assert_eq!(out[1].ordinal, 0);
    }

    #[test]
    fn test_empty_input_is_unreadable() {
        let out = blocks("\n\n");
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Err(Error::UnreadableInput { .. })));
    }

    #[test]
    fn test_comment_only_input_is_unreadable() {
        let out = blocks("# just a comment\n# another\n");
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Err(Error::UnreadableInput { .. })));
    }

    #[test]
    fn test_bad_byte_marks_only_its_block() {
        let bytes = b"a\n\nCaf\xe9\nb\n\nc\n".to_vec();
        let out: Vec<Block> = Blocks::new(Cursor::new(bytes), "mem")
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].undecodable, None);
        assert_eq!(out[1].undecodable, Some(3));
        assert_eq!(out[1].rows.len(), 2);
        assert_eq!(out[2].rows, vec!["c"]);

        let issue = out[1].encoding_issue("mem").unwrap();
        assert_eq!(issue.kind, IssueKind::MalformedRecord);
        assert_eq!(issue.position.line, 3);
        assert!(out[2].encoding_issue("mem").is_none());
    }

    #[test]
    fn test_raw_lines_strip_terminators() {
        let lines: Vec<_> = RawLines::new(Cursor::new(b"x\r\ny\xff\nz".to_vec()))
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].as_deref(), Ok("x"));
        assert_eq!(lossy(lines[1].as_ref().unwrap_err()), "y\u{fffd}");
        assert_eq!(lines[2].as_deref(), Ok("z"));
    }

    #[test]
    fn test_columns_split() {
        assert_eq!(columns("1\tThe\tthe"), vec!["1", "The", "the"]);
        assert_eq!(columns("1  The the "), vec!["1", "The", "the"]);
    }

    #[test]
    fn test_stop_after_error() {
        let items: Vec<Result<Step>> = vec![
            Err(Error::desync("x")),
            Ok(Step::Skipped(Issue::malformed(Position::default(), "y"))),
        ];
        let out: Vec<_> = StopAfterError::new(items.into_iter()).collect();
        assert_eq!(out.len(), 1);
    }
}
