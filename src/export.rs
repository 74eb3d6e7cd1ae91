//! JSON Lines export of record sequences.

use crate::reader::Record;
use corpora_core::Result;
use std::io::{self, Write};

/// Write one JSON object per successful record; errors are not written.
///
/// Returns the number of records written.
pub fn write_jsonl<W, I>(mut writer: W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Record>>,
{
    let mut written = 0;
    for record in records.into_iter().flatten() {
        serde_json::to_writer(&mut writer, &record).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    log::debug!("wrote {} records as JSON lines", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_core::{AnnotatedSentence, Error, Position, Sentence, Token};

    fn record(id: &str) -> Record {
        let sentence = Sentence::from_tokens(id, vec![Token::new(1, "Hi")]).unwrap();
        Record {
            position: Position::new("mem", 1, 1),
            instance: AnnotatedSentence::bare(sentence).into(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_errors_are_not_written() {
        let items = vec![
            Ok(record("1")),
            Err(Error::desync("boom")),
            Ok(record("2")),
        ];
        let mut out = Vec::new();
        assert_eq!(write_jsonl(&mut out, items).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["instance"]["type"], "sentence");
        assert_eq!(value["position"]["source"], "mem");
        assert!(value.get("warnings").is_none());
    }
}
