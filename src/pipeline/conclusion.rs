//! Final-verdict extraction from freeform output.
//!
//! Clinical narrative states findings first and the conclusion last, so the
//! search runs backwards from the end — a forward scan would latch onto an
//! early keyword mention (often a disclaimer) instead of the true verdict.
//! Four descending priority tiers over the trailing sentences, then a
//! locate-by-content remainder split with a drop-by-count fallback that
//! tolerates the summary's wording having been adjusted during matching.

use serde::{Deserialize, Serialize};

use super::cleaner::sentence_spans;
use super::heuristics::Heuristics;
use super::spans::strip_emphasis_markers;
use super::vocabulary::ConclusionVocabulary;

/// The extracted verdict and everything that preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConclusionSplit {
    pub summary: String,
    pub remainder: String,
}

/// A usable sentence: trimmed text plus its byte offset in the source.
struct Sentence {
    start: usize,
    text: String,
}

/// Locate the final diagnostic statement near the end of freeform text.
///
/// Total over any input; an empty text yields an empty split, and text with
/// no usable sentences falls back to its verbatim tail.
pub fn extract(text: &str, heur: &Heuristics, vocab: &ConclusionVocabulary) -> ConclusionSplit {
    let sentences = usable_sentences(text, heur);

    if sentences.is_empty() {
        return tail_fallback(text, heur);
    }

    let window_start = sentences.len().saturating_sub(heur.conclusion_tail_window);
    let tail = window_start..sentences.len();

    let (matched, summary) = find_summary(&sentences, tail, heur, vocab);
    let remainder = split_remainder(text, &sentences, matched, heur);

    ConclusionSplit { summary, remainder }
}

fn usable_sentences(text: &str, heur: &Heuristics) -> Vec<Sentence> {
    sentence_spans(text)
        .into_iter()
        .filter_map(|(start, end)| {
            let trimmed = text[start..end].trim();
            if trimmed.chars().count() >= heur.min_sentence_chars {
                Some(Sentence {
                    start,
                    text: trimmed.to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// No usable sentences at all: the final ~N characters verbatim.
fn tail_fallback(text: &str, heur: &Heuristics) -> ConclusionSplit {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ConclusionSplit {
            summary: String::new(),
            remainder: String::new(),
        };
    }

    let total = text.chars().count();
    if total <= heur.raw_tail_fallback_chars {
        return ConclusionSplit {
            summary: trimmed.to_string(),
            remainder: String::new(),
        };
    }

    let skip = total - heur.raw_tail_fallback_chars;
    let cut = text
        .char_indices()
        .nth(skip)
        .map(|(byte, _)| byte)
        .unwrap_or(0);
    ConclusionSplit {
        summary: text[cut..].trim().to_string(),
        remainder: text[..cut].trim().to_string(),
    }
}

/// The four priority tiers, each scanning the tail window backwards.
/// Returns the matched sentence index and the assembled summary.
fn find_summary(
    sentences: &[Sentence],
    tail: std::ops::Range<usize>,
    heur: &Heuristics,
    vocab: &ConclusionVocabulary,
) -> (usize, String) {
    // Tier 1: explicit diagnosis/result marker.
    for i in tail.clone().rev() {
        if vocab.has_diagnosis_marker(&sentences[i].text) {
            let summary = truncate_chars(
                &join_following(sentences, i, 2),
                heur.summary_max_chars,
            );
            return (i, summary);
        }
    }

    // Tier 2: health status together with a stage/grade marker.
    for i in tail.clone().rev() {
        let s = &sentences[i].text;
        if vocab.has_status_marker(s) && vocab.has_stage_marker(s) {
            return (i, join_following(sentences, i, 1));
        }
    }

    // Tier 3: health status reinforced by a stage marker or a second
    // distinct status marker.
    for i in tail.clone().rev() {
        let s = &sentences[i].text;
        if vocab.has_status_marker(s)
            && (vocab.has_stage_marker(s) || vocab.distinct_status_markers(s) >= 2)
        {
            return (i, join_following(sentences, i, 2));
        }
    }

    // Tier 4: the last two sentences, joined.
    let i = sentences.len().saturating_sub(2);
    (i, join_following(sentences, i, 1))
}

fn join_following(sentences: &[Sentence], from: usize, extra: usize) -> String {
    let end = (from + 1 + extra).min(sentences.len());
    sentences[from..end]
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}

/// The text that precedes the summary.
///
/// Stage one locates the matched sentence (emphasis-stripped) via last-index
/// search in the normalized whole text; a hit landing in the first 30% of
/// the text means the extraction is unreliable, so stage two instead drops
/// the last two sentences from the full text.
fn split_remainder(
    text: &str,
    sentences: &[Sentence],
    matched: usize,
    heur: &Heuristics,
) -> String {
    let normalized = strip_emphasis_markers(text);
    let needle = strip_emphasis_markers(&sentences[matched].text);

    if !needle.is_empty() {
        if let Some(pos) = normalized.rfind(&needle) {
            let total = normalized.chars().count();
            let preceding = normalized[..pos].chars().count();
            if total > 0 && preceding as f32 / total as f32 > heur.match_position_floor {
                return normalized[..pos].trim().to_string();
            }
        }
    }

    // Drop-by-count: everything before the last two sentences.
    if sentences.len() <= 2 {
        return String::new();
    }
    let cut = sentences[sentences.len() - 2].start;
    text[..cut].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::vocabulary::Vocabulary;

    fn run(text: &str) -> ConclusionSplit {
        let vocab = Vocabulary::default();
        extract(text, &Heuristics::default(), &vocab.conclusion)
    }

    #[test]
    fn extraction_targets_the_tail() {
        let text = "Finding A. Finding B. Finding C. Diagnosis: condition X, stage 2.";
        let split = run(text);
        assert!(split.summary.contains("Diagnosis: condition X, stage 2."));
        assert!(!split.summary.contains("Finding A."));
        assert_eq!(split.remainder, "Finding A. Finding B. Finding C.");
    }

    #[test]
    fn tier_one_appends_following_sentences() {
        let text = "Scattered density noted today. Diagnosis: benign cyst found. Follow-up advised shortly. Nothing else remarkable.";
        let split = run(text);
        assert!(split.summary.starts_with("Diagnosis: benign cyst found."));
        assert!(split.summary.contains("Follow-up advised shortly."));
        assert!(split.summary.contains("Nothing else remarkable."));
    }

    #[test]
    fn early_disclaimer_keyword_is_ignored() {
        // "result" appears early, outside the 5-sentence tail window.
        let text = "This result is preliminary only. Sentence two continues here. Sentence three follows now. \
                    Sentence four follows that. Sentence five goes onward. Sentence six keeps going. \
                    Sentence seven nearly done. The tissue appears benign and healthy.";
        let split = run(text);
        assert!(!split.summary.contains("preliminary"));
        assert!(split.summary.contains("benign"));
    }

    #[test]
    fn tier_two_requires_status_and_stage() {
        let text = "The scan was reviewed carefully. Everything looked fine throughout. \
                    The tissue is abnormal, consistent with grade 2 changes.";
        let split = run(text);
        assert!(split.summary.contains("grade 2"));
    }

    #[test]
    fn tier_four_falls_back_to_last_two_sentences() {
        let text = "The first remark goes here. The second remark goes here. The third remark goes here.";
        let split = run(text);
        assert_eq!(
            split.summary,
            "The second remark goes here. The third remark goes here."
        );
        assert_eq!(split.remainder, "The first remark goes here.");
    }

    #[test]
    fn tier_one_summary_is_capped_with_ellipsis() {
        let long_tail = "x".repeat(500);
        let text = format!("A short opening sentence. Diagnosis: {long_tail}.");
        let split = run(&text);
        assert!(split.summary.chars().count() <= 401);
        assert!(split.summary.ends_with('…'));
    }

    #[test]
    fn no_usable_sentences_falls_back_to_raw_tail() {
        let text = "shortish";
        let split = run(text);
        assert_eq!(split.summary, "shortish");
        assert_eq!(split.remainder, "");
    }

    #[test]
    fn fragment_only_text_keeps_final_300_chars() {
        // Every sentence is a sub-10-char fragment, so none is usable and
        // the verbatim-tail fallback applies.
        let text = "ab. ".repeat(100);
        let split = run(&text);
        assert!(split.summary.chars().count() <= 300);
        assert!(split.summary.ends_with("ab."));
        assert!(!split.remainder.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_split() {
        let split = run("");
        assert_eq!(split.summary, "");
        assert_eq!(split.remainder, "");
    }

    #[test]
    fn remainder_falls_back_when_match_sits_too_early() {
        // The only diagnosis sentence sits at the very start, so the located
        // match fails the 30% floor and drop-by-count applies.
        let text = "Diagnosis: benign tissue. Extra a. Extra b.";
        let split = run(text);
        assert!(split.summary.contains("Diagnosis: benign tissue."));
        assert_eq!(split.remainder, "");
    }

    #[test]
    fn emphasis_markers_do_not_break_the_locate_step() {
        let text = "Finding A noted today. Finding B noted today. Finding C noted today. \
                    **Diagnosis:** condition X confirmed.";
        let split = run(text);
        assert!(split.summary.contains("condition X confirmed"));
        assert!(split.remainder.contains("Finding C noted today."));
        assert!(!split.remainder.contains("condition X"));
    }

    #[test]
    fn arabic_conclusion_is_found() {
        let text = "ملاحظة أولى عن الصورة. ملاحظة ثانية عن الصورة. التشخيص: الثدي الأيسر سليم.";
        let split = run(text);
        assert!(split.summary.contains("التشخيص"));
        assert!(split.summary.contains("سليم"));
    }
}
