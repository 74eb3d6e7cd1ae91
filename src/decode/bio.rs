//! BIO tag sequences to labeled spans.

/// A labeled span over 1-based, inclusive token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSpan {
    /// Label without its `B-`/`I-` prefix.
    pub label: String,
    /// First token (1-based).
    pub start: usize,
    /// Last token (1-based, inclusive).
    pub end: usize,
}

/// Label carried by a BIO tag (`B-ARG0` -> `ARG0`).
///
/// A tag without a `X-` prefix is its own label.
fn label_of(tag: &str) -> &str {
    match tag.split_once('-') {
        Some((prefix, label)) if prefix.len() == 1 => label,
        _ => tag,
    }
}

fn is_outside(tag: &str) -> bool {
    matches!(tag, "O" | "_")
}

/// Convert BIO tags into spans.
///
/// `O` and `_` are outside any span. A span starts on a `B-` tag, on the
/// first tagged token, or when the label changes; it ends at the last token,
/// before a `B-` tag, or before a label change.
///
/// Position `i` of `tags` is token `i + 1`.
#[must_use]
pub fn bio_to_spans<S: AsRef<str>>(tags: &[S]) -> Vec<LabeledSpan> {
    let mut spans: Vec<LabeledSpan> = Vec::new();
    let mut open = false;

    for (i, tag) in tags.iter().enumerate() {
        let tag = tag.as_ref();
        if is_outside(tag) {
            open = false;
            continue;
        }
        let label = label_of(tag);
        let starts = tag.starts_with("B-")
            || !open
            || spans.last().map_or(true, |s| s.label != label);
        if starts {
            spans.push(LabeledSpan {
                label: label.to_string(),
                start: i + 1,
                end: i + 1,
            });
            open = true;
        } else if let Some(last) = spans.last_mut() {
            last.end = i + 1;
        }

        let closes = match tags.get(i + 1).map(AsRef::as_ref) {
            None => true,
            Some(next) => is_outside(next) || next.starts_with("B-") || label_of(next) != label,
        };
        if closes {
            open = false;
        }
    }
    spans
}
