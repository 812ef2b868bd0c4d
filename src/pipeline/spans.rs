//! Inline emphasis tokenizer.
//!
//! Model output uses `**…**` for emphasis but sheds stray `*` characters all
//! over the place. Cleanup protects the doubled markers behind a private-use
//! placeholder before stripping strays, so one side of a legitimate pair is
//! never eaten, then tokenization splits the cleaned text into plain and
//! emphasized runs.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One run of leaf text, plain or emphasized. Concatenating the `text` of a
/// tokenized sequence reproduces the marker-stripped input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    Plain { text: String },
    Emphasis { text: String },
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Emphasis { text } => text,
        }
    }
}

/// Placeholder protecting `**` while strays are stripped. Private-use
/// codepoint, never present in model output.
const PAIR_PLACEHOLDER: char = '\u{E000}';

/// Remove stray single `*` markers while preserving `**` pairs.
///
/// A marker is stray when it sits at a text boundary or has whitespace on
/// both sides; a `*` glued between word characters is left alone.
pub fn strip_stray_markers(text: &str) -> String {
    let protected = text.replace("**", &PAIR_PLACEHOLDER.to_string());

    let chars: Vec<char> = protected.chars().collect();
    let mut kept = String::with_capacity(protected.len());
    for (i, c) in chars.iter().enumerate() {
        if *c == '*' {
            let before_open = i == 0 || chars[i - 1].is_whitespace();
            let after_open = i + 1 == chars.len() || chars[i + 1].is_whitespace();
            if before_open && after_open {
                continue;
            }
        }
        kept.push(*c);
    }

    kept.replace(PAIR_PLACEHOLDER, "**")
}

/// Split a line of leaf text into plain/emphasized spans.
///
/// Stray markers are cleaned first, then non-overlapping `**…**` matches are
/// scanned left to right; everything between matches is plain. Text with no
/// matches is a single plain span. Empty input yields no spans.
pub fn tokenize(text: &str) -> Vec<Span> {
    let cleaned = strip_stray_markers(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let pair = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    let mut spans = Vec::new();
    let mut cursor = 0usize;

    for caps in pair.captures_iter(&cleaned) {
        let whole = caps.get(0).unwrap();
        let inner = caps.get(1).unwrap();
        if whole.start() > cursor {
            spans.push(Span::Plain {
                text: cleaned[cursor..whole.start()].to_string(),
            });
        }
        spans.push(Span::Emphasis {
            text: inner.as_str().to_string(),
        });
        cursor = whole.end();
    }

    if cursor < cleaned.len() {
        spans.push(Span::Plain {
            text: cleaned[cursor..].to_string(),
        });
    }

    spans
}

/// The marker-stripped form of a text: stray markers removed and emphasis
/// delimiters dropped. Defined as the concatenation of its tokenized spans,
/// which is also the tokenizer's round-trip invariant.
pub fn strip_emphasis_markers(text: &str) -> String {
    tokenize(text).iter().map(Span::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_span() {
        let spans = tokenize("No emphasis here.");
        assert_eq!(
            spans,
            vec![Span::Plain {
                text: "No emphasis here.".into()
            }]
        );
    }

    #[test]
    fn emphasis_pair_becomes_emphasis_span() {
        let spans = tokenize("The mass is **probably benign** overall.");
        assert_eq!(
            spans,
            vec![
                Span::Plain {
                    text: "The mass is ".into()
                },
                Span::Emphasis {
                    text: "probably benign".into()
                },
                Span::Plain {
                    text: " overall.".into()
                },
            ]
        );
    }

    #[test]
    fn multiple_pairs_scan_left_to_right() {
        let spans = tokenize("**a** and **b**");
        assert_eq!(
            spans,
            vec![
                Span::Emphasis { text: "a".into() },
                Span::Plain {
                    text: " and ".into()
                },
                Span::Emphasis { text: "b".into() },
            ]
        );
    }

    #[test]
    fn stray_markers_are_stripped() {
        assert_eq!(strip_stray_markers("* leading star"), " leading star");
        assert_eq!(strip_stray_markers("trailing star *"), "trailing star ");
        assert_eq!(strip_stray_markers("a * b"), "a  b");
    }

    #[test]
    fn stray_cleanup_never_eats_a_pair_side() {
        assert_eq!(strip_stray_markers("**kept** * stray"), "**kept**  stray");
        let spans = tokenize("**kept** * stray");
        assert_eq!(spans[0], Span::Emphasis { text: "kept".into() });
    }

    #[test]
    fn glued_marker_is_not_stray() {
        assert_eq!(strip_stray_markers("5*3 grid"), "5*3 grid");
    }

    #[test]
    fn unmatched_pair_stays_literal() {
        let spans = tokenize("broken **emphasis here");
        assert_eq!(
            spans,
            vec![Span::Plain {
                text: "broken **emphasis here".into()
            }]
        );
    }

    #[test]
    fn empty_input_yields_no_spans() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn round_trip_reproduces_marker_stripped_text() {
        let cases = [
            ("Plain sentence.", "Plain sentence."),
            ("With **bold** middle.", "With bold middle."),
            (
                "* stray and **pair** and * more",
                " stray and pair and  more",
            ),
            ("النتيجة **سليمة** تماما", "النتيجة سليمة تماما"),
            ("ends with **bold**", "ends with bold"),
        ];
        for (input, stripped) in cases {
            let concat: String = tokenize(input).iter().map(Span::text).collect();
            assert_eq!(concat, stripped, "input: {input}");
        }
    }

    #[test]
    fn marker_stripped_form_drops_all_markers() {
        assert_eq!(
            strip_emphasis_markers("* a **bold** tail *"),
            " a bold tail "
        );
    }
}
