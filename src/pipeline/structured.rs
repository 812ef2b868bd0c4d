//! Structured-result recovery.
//!
//! The vision model is asked for a single JSON object matching the analysis
//! schema, but real answers range from clean JSON through JSON wrapped in
//! prose or code fences to none at all. Parsing is one strict attempt: strip
//! fences, slice the outermost `{…}` span, decode, validate. Anything short
//! of a complete record is "not structured" — a partial record is never
//! surfaced, so the freeform path renders instead of a half-trusted mix.

use serde::{Deserialize, Serialize};

/// The fixed analysis schema a model may answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    #[serde(rename = "finalResult")]
    pub final_result: String,
    /// BI-RADS category code, or the "N/A" sentinel for non-mammograms.
    #[serde(rename = "biRadsOrNA")]
    pub bi_rads_or_na: String,
    pub findings: AnalysisFindings,
    #[serde(rename = "detailedAnalysis")]
    pub detailed_analysis: String,
    pub recommendations: Vec<String>,
}

/// The four fixed finding fields. Exactly these keys must be present —
/// any of them may hold an empty or "N/A" string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisFindings {
    pub breast_density: String,
    pub masses: String,
    pub calcifications: String,
    pub asymmetry: String,
}

/// Try to recover a complete structured record from raw model output.
///
/// Returns `None` for anything that is not a fully valid record: no JSON,
/// undecodable JSON, missing or mistyped fields, an empty detailed analysis
/// or an empty recommendation list. No retry, no partial salvage.
pub fn parse_structured(raw: &str) -> Option<StructuredAnalysis> {
    let stripped = strip_code_fences(raw);
    let candidate = outer_json_span(&stripped).unwrap_or(stripped.as_str());

    let parsed: StructuredAnalysis = serde_json::from_str(candidate).ok()?;

    if parsed.detailed_analysis.trim().is_empty() || parsed.recommendations.is_empty() {
        return None;
    }

    Some(parsed)
}

/// Drop fenced-code-block delimiter lines. Models sometimes wrap the JSON in
/// ``` fences even when asked not to; only the delimiter lines go, the
/// content stays.
fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Slice the greedy outer `{…}` span: first `{` through last `}`.
///
/// The model is expected to emit exactly one JSON object, so the outermost
/// span is the candidate; nested braces inside string values are the JSON
/// decoder's problem, not ours.
fn outer_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
