//! Tuned thresholds for the freeform heuristics.
//!
//! The values were calibrated against one model's output style; a different
//! model may need tighter or looser bounds, so they live in a config struct
//! with the calibrated values as defaults rather than as hard invariants.

use serde::{Deserialize, Serialize};

/// Thresholds shared by the cleaner, segmenter and conclusion extractor.
///
/// All character counts are in `char`s, not bytes — the input mixes Latin
/// and Arabic script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heuristics {
    /// A colon this far into a line still marks a heading candidate.
    pub heading_colon_window: usize,
    /// Max length of the left part for heading-with-body and labeled splits.
    pub label_max_chars: usize,
    /// Lines longer than this are scanned for repeating `label: content`
    /// chunks instead of being treated as colon headings.
    pub label_scan_min_chars: usize,
    /// Min line length for the single `label: body` split.
    pub single_label_min_chars: usize,
    /// Abort sentence dedup when it would drop this fraction or more of all
    /// sentences — legitimately repetitive clinical phrasing, not echoes.
    pub sentence_drop_ceiling: f32,
    /// A located summary must sit past this fraction of the text, else the
    /// remainder falls back to drop-by-count.
    pub match_position_floor: f32,
    /// How many trailing sentences the conclusion search inspects.
    pub conclusion_tail_window: usize,
    /// Tier-1 summaries are truncated to this many chars.
    pub summary_max_chars: usize,
    /// Verbatim tail returned when the text has no usable sentences.
    pub raw_tail_fallback_chars: usize,
    /// Sentence fragments shorter than this are not usable for extraction.
    pub min_sentence_chars: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            heading_colon_window: 60,
            label_max_chars: 40,
            label_scan_min_chars: 80,
            single_label_min_chars: 50,
            sentence_drop_ceiling: 0.2,
            match_position_floor: 0.3,
            conclusion_tail_window: 5,
            summary_max_chars: 400,
            raw_tail_fallback_chars: 300,
            min_sentence_chars: 10,
        }
    }
}
