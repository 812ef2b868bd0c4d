//! Freeform text cleanup — duplicate suppression before segmentation.
//!
//! Models restate their conclusion, and sometimes whole sections, when the
//! answer is not structured. Two independent passes run in order: duplicate
//! section headings (keep the first occurrence in document order — later
//! repeats are usually truncated echoes), then duplicate sentences, with an
//! abort ceiling so legitimately repetitive clinical phrasing is left alone.

use std::collections::HashSet;

use super::heuristics::Heuristics;
use super::vocabulary::SectionVocabulary;

/// Clean freeform model output. Used only when the structured parse failed.
pub fn clean(text: &str, heur: &Heuristics, vocab: &SectionVocabulary) -> String {
    let deduped = dedup_section_headings(text, vocab);
    dedup_sentences(&deduped, heur)
}

/// Suppress repeated section headings.
///
/// A repeated conclusion heading ("Final Result"/"Summary") drags its body
/// lines along, up to the next known heading; any other repeated heading
/// loses only the heading line itself.
fn dedup_section_headings(text: &str, vocab: &SectionVocabulary) -> String {
    let mut seen = HashSet::new();
    let mut kept: Vec<&str> = Vec::new();
    let mut skip_body = false;

    for line in text.lines() {
        match vocab.classify_line(line) {
            Some(key) => {
                if seen.contains(&key) {
                    skip_body = key.is_conclusion();
                    continue;
                }
                seen.insert(key);
                skip_body = false;
                kept.push(line);
            }
            None => {
                if skip_body {
                    continue;
                }
                kept.push(line);
            }
        }
    }

    kept.join("\n")
}

/// Drop sentences whose normalized form already appeared, keeping the text
/// byte-identical otherwise. When the pass would drop `sentence_drop_ceiling`
/// or more of all sentences, the heuristic is judged too aggressive and the
/// input is returned unmodified.
fn dedup_sentences(text: &str, heur: &Heuristics) -> String {
    let spans = sentence_spans(text);
    let mut seen = HashSet::new();
    let mut dropped_spans = vec![false; spans.len()];
    let mut total = 0usize;
    let mut dropped = 0usize;

    for (i, (start, end)) in spans.iter().enumerate() {
        let key = normalize_sentence_key(&text[*start..*end]);
        if key.is_empty() {
            continue;
        }
        total += 1;
        if !seen.insert(key) {
            dropped_spans[i] = true;
            dropped += 1;
        }
    }

    if dropped == 0 {
        return text.to_string();
    }
    if dropped as f32 / total as f32 >= heur.sentence_drop_ceiling {
        return text.to_string();
    }

    spans
        .iter()
        .zip(&dropped_spans)
        .filter(|(_, dropped)| !**dropped)
        .map(|((start, end), _)| &text[*start..*end])
        .collect()
}

/// Tile a text into contiguous byte spans, one per sentence. Each span ends
/// just past its run of terminal punctuation and carries the whitespace that
/// preceded it, so concatenating any kept subset reproduces those sentences
/// verbatim.
pub(crate) fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    const TERMINALS: [char; 4] = ['.', '!', '?', '؟'];

    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if TERMINALS.contains(&c) {
            let next_is_terminal = iter
                .peek()
                .map(|(_, n)| TERMINALS.contains(n))
                .unwrap_or(false);
            if !next_is_terminal {
                let end = idx + c.len_utf8();
                spans.push((start, end));
                start = end;
            }
        }
    }

    if start < text.len() {
        spans.push((start, text.len()));
    }

    spans
}

/// Sentence dedup key: case fold plus whitespace collapse.
fn normalize_sentence_key(sentence: &str) -> String {
    sentence
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
