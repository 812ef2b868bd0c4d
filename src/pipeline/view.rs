//! Rendering boundary: derive-on-read view over a raw analysis text.
//!
//! The structured and segmented views are never stored — they are recomputed
//! from `raw_text` on every render, so a record reloaded from the store and
//! a freshly produced one always present identically. Derivation is a pure
//! function of the text alone.

use serde::Serialize;

use super::cleaner::clean;
use super::conclusion::{extract, ConclusionSplit};
use super::heuristics::Heuristics;
use super::segment::{segment, Block};
use super::structured::{parse_structured, StructuredAnalysis};
use super::vocabulary::Vocabulary;

/// The normalized presentation of one raw model output.
///
/// Exactly one path is populated: the structured record when the parse
/// succeeded, otherwise the cleaned freeform breakdown. Callers check
/// `is_structured()` first and pick one downstream path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisView {
    Structured(StructuredAnalysis),
    Freeform {
        blocks: Vec<Block>,
        conclusion: ConclusionSplit,
    },
}

impl AnalysisView {
    /// Derive the view with the default heuristics and vocabulary.
    pub fn derive(raw: &str) -> Self {
        Self::derive_with(raw, &Heuristics::default(), &Vocabulary::default())
    }

    /// Derive the view with caller-supplied heuristics and vocabulary.
    pub fn derive_with(raw: &str, heur: &Heuristics, vocab: &Vocabulary) -> Self {
        if let Some(record) = parse_structured(raw) {
            tracing::debug!(len = raw.len(), "analysis parsed as structured record");
            return Self::Structured(record);
        }

        let cleaned = clean(raw, heur, &vocab.sections);
        let blocks = segment(&cleaned, heur, &vocab.sections);
        let conclusion = extract(&cleaned, heur, &vocab.conclusion);
        tracing::debug!(
            len = raw.len(),
            blocks = blocks.len(),
            "analysis fell back to freeform breakdown"
        );
        Self::Freeform { blocks, conclusion }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// The structured record; `None` on the freeform path.
    pub fn as_structured(&self) -> Option<&StructuredAnalysis> {
        match self {
            Self::Structured(record) => Some(record),
            Self::Freeform { .. } => None,
        }
    }

    /// The segmented blocks; `None` on the structured path.
    pub fn as_blocks(&self) -> Option<&[Block]> {
        match self {
            Self::Structured(_) => None,
            Self::Freeform { blocks, .. } => Some(blocks),
        }
    }

    /// The conclusion split; `None` on the structured path.
    pub fn as_conclusion_split(&self) -> Option<&ConclusionSplit> {
        match self {
            Self::Structured(_) => None,
            Self::Freeform { conclusion, .. } => Some(conclusion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED_RAW: &str = r#"{"finalResult":"Probably benign","biRadsOrNA":"2","findings":{"breastDensity":"fatty","masses":"none","calcifications":"none","asymmetry":"none"},"detailedAnalysis":"Scattered tissue without suspicious features.","recommendations":["Routine follow-up"]}"#;

    #[test]
    fn structured_output_takes_the_structured_path() {
        let view = AnalysisView::derive(STRUCTURED_RAW);
        assert!(view.is_structured());
        assert_eq!(view.as_structured().unwrap().bi_rads_or_na, "2");
        assert!(view.as_blocks().is_none());
        assert!(view.as_conclusion_split().is_none());
    }

    #[test]
    fn freeform_output_takes_the_freeform_path() {
        let raw = "Findings: mild density.\nFindings: mild density.\nFinal Result: likely normal.";
        let view = AnalysisView::derive(raw);
        assert!(!view.is_structured());
        assert!(view.as_structured().is_none());

        let blocks = view.as_blocks().unwrap();
        let findings_blocks = blocks
            .iter()
            .filter(|b| matches!(b, Block::HeadingWithBody { heading, .. } if heading == "Findings"))
            .count();
        assert_eq!(findings_blocks, 1, "duplicated Findings line collapsed");

        let split = view.as_conclusion_split().unwrap();
        assert!(split.summary.contains("likely normal."));
    }

    #[test]
    fn derivation_is_stable_across_repeated_reads() {
        let raw = "Analysis:\nDense tissue seen. Diagnosis: benign changes, category 2.";
        let first = AnalysisView::derive(raw);
        let second = AnalysisView::derive(raw);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_structured_record_degrades_to_freeform() {
        // Missing the findings sub-keys: never surfaced partially.
        let raw = r#"{"finalResult":"x","biRadsOrNA":"2","findings":{},"detailedAnalysis":"y","recommendations":["z"]}"#;
        let view = AnalysisView::derive(raw);
        assert!(!view.is_structured());
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        let view = AnalysisView::derive("");
        assert!(!view.is_structured());
        assert!(view.as_blocks().unwrap().is_empty());
        let split = view.as_conclusion_split().unwrap();
        assert_eq!(split.summary, "");
        assert_eq!(split.remainder, "");
    }
}
