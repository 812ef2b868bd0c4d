//! Keyword vocabulary for the freeform heuristics.
//!
//! The cleaner, segmenter and conclusion extractor never hardcode section
//! titles or status words: they consult these tables, so the logic stays
//! declarative and the vocabulary can be swapped without touching it.
//! Defaults carry English and Arabic synonyms side by side — the dashboard
//! serves Arabic-speaking clinicians, and models answer in either language.

/// Canonical identity of a known report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Findings,
    Analysis,
    Recommendations,
    FinalResult,
    Summary,
    ImageDescription,
    ClinicalNotes,
    AbnormalFindings,
    ImageShows,
}

impl SectionKey {
    /// Sections that state the report's verdict. A repeat of one of these
    /// drags its whole body along when deduplicated.
    pub fn is_conclusion(&self) -> bool {
        matches!(self, Self::FinalResult | Self::Summary)
    }
}

/// Fold a heading candidate to its dedup key: drop emphasis and heading
/// glyphs, drop a trailing colon, lowercase, collapse whitespace.
pub fn normalize_heading_key(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| *c != '*' && *c != '#')
        .collect();
    let stripped = stripped.trim().trim_end_matches(':').trim();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Section-title synonym table: normalized title → canonical key.
pub struct SectionVocabulary {
    entries: Vec<(String, SectionKey)>,
}

impl SectionVocabulary {
    pub fn new(entries: Vec<(String, SectionKey)>) -> Self {
        Self { entries }
    }

    /// Exact lookup of an already-normalized key.
    pub fn lookup(&self, normalized: &str) -> Option<SectionKey> {
        self.entries
            .iter()
            .find(|(title, _)| title.as_str() == normalized)
            .map(|(_, key)| *key)
    }

    /// Classify a raw line as a heading line.
    ///
    /// A line is a heading line when the whole line, or the part left of its
    /// first colon, normalizes to a known section title. The colon may carry
    /// inline content ("Findings: mild density.") — the line still keys as
    /// that section.
    pub fn classify_line(&self, line: &str) -> Option<SectionKey> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(key) = self.lookup(&normalize_heading_key(trimmed)) {
            return Some(key);
        }

        match trimmed.find(':') {
            Some(0) | None => None,
            Some(pos) => self.lookup(&normalize_heading_key(&trimmed[..pos])),
        }
    }
}

impl Default for SectionVocabulary {
    fn default() -> Self {
        let table: &[(&str, SectionKey)] = &[
            // English
            ("findings", SectionKey::Findings),
            ("analysis", SectionKey::Analysis),
            ("detailed analysis", SectionKey::Analysis),
            ("recommendations", SectionKey::Recommendations),
            ("final result", SectionKey::FinalResult),
            ("final diagnosis", SectionKey::FinalResult),
            ("summary", SectionKey::Summary),
            ("conclusion", SectionKey::Summary),
            ("image description", SectionKey::ImageDescription),
            ("clinical notes", SectionKey::ClinicalNotes),
            ("abnormal findings", SectionKey::AbnormalFindings),
            ("what the image shows", SectionKey::ImageShows),
            // Arabic
            ("النتائج", SectionKey::Findings),
            ("التحليل", SectionKey::Analysis),
            ("التحليل التفصيلي", SectionKey::Analysis),
            ("التوصيات", SectionKey::Recommendations),
            ("النتيجة النهائية", SectionKey::FinalResult),
            ("التشخيص النهائي", SectionKey::FinalResult),
            ("الملخص", SectionKey::Summary),
            ("الخلاصة", SectionKey::Summary),
            ("وصف الصورة", SectionKey::ImageDescription),
            ("ملاحظات سريرية", SectionKey::ClinicalNotes),
            ("الملاحظات السريرية", SectionKey::ClinicalNotes),
            ("نتائج غير طبيعية", SectionKey::AbnormalFindings),
            ("النتائج غير الطبيعية", SectionKey::AbnormalFindings),
            ("ماذا تظهر الصورة", SectionKey::ImageShows),
            ("ما تظهره الصورة", SectionKey::ImageShows),
        ];
        Self::new(
            table
                .iter()
                .map(|(title, key)| (title.to_string(), *key))
                .collect(),
        )
    }
}

/// Keyword lists driving the conclusion extractor's priority tiers.
pub struct ConclusionVocabulary {
    /// Explicit diagnosis/result markers (tier 1). Substring match, so the
    /// colon and possessive variants ("diagnosis:", "diagnosis is") are
    /// covered without separate entries.
    pub diagnosis_keywords: Vec<String>,
    /// Health-status markers (tiers 2–3).
    pub status_keywords: Vec<String>,
    /// Stage/grade markers (tiers 2–3).
    pub stage_keywords: Vec<String>,
}

impl ConclusionVocabulary {
    pub fn has_diagnosis_marker(&self, sentence: &str) -> bool {
        contains_any(sentence, &self.diagnosis_keywords)
    }

    pub fn has_status_marker(&self, sentence: &str) -> bool {
        contains_any(sentence, &self.status_keywords)
    }

    pub fn has_stage_marker(&self, sentence: &str) -> bool {
        contains_any(sentence, &self.stage_keywords)
    }

    /// Count distinct status keywords in a sentence, longest-first and
    /// non-overlapping, so "abnormal" does not also count as "normal".
    pub fn distinct_status_markers(&self, sentence: &str) -> usize {
        let lower = sentence.to_lowercase();
        let mut keywords: Vec<&str> = self.status_keywords.iter().map(String::as_str).collect();
        keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let mut claimed = vec![false; lower.len()];
        let mut count = 0usize;

        for keyword in keywords {
            if keyword.is_empty() {
                continue;
            }
            let mut matched = false;
            let mut from = 0usize;
            while let Some(offset) = lower[from..].find(keyword) {
                let start = from + offset;
                let end = start + keyword.len();
                if !claimed[start..end].iter().any(|c| *c) {
                    claimed[start..end].iter_mut().for_each(|c| *c = true);
                    matched = true;
                }
                from = end;
                if from >= lower.len() {
                    break;
                }
            }
            if matched {
                count += 1;
            }
        }

        count
    }
}

fn contains_any(sentence: &str, keywords: &[String]) -> bool {
    let lower = sentence.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

impl Default for ConclusionVocabulary {
    fn default() -> Self {
        let to_owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            diagnosis_keywords: to_owned(&[
                // English
                "diagnosis",
                "result",
                "condition",
                "conclusion",
                // Arabic
                "التشخيص",
                "النتيجة",
                "الحالة",
                "الاستنتاج",
                "الخلاصة",
            ]),
            status_keywords: to_owned(&[
                // English
                "affected",
                "unaffected",
                "abnormal",
                "normal",
                "positive",
                "negative",
                "benign",
                "malignant",
                "suspicious",
                "healthy",
                // Arabic
                "مصاب",
                "مصابة",
                "سليم",
                "سليمة",
                "غير طبيعي",
                "طبيعي",
                "طبيعية",
                "إيجابي",
                "سلبي",
                "حميد",
                "خبيث",
            ]),
            stage_keywords: to_owned(&[
                // English
                "stage",
                "grade",
                "bi-rads",
                "birads",
                "category",
                "severity",
                // Arabic
                "مرحلة",
                "المرحلة",
                "درجة",
                "الدرجة",
                "تصنيف",
                "التصنيف",
                "فئة",
            ]),
        }
    }
}

/// The full vocabulary handed to the freeform pipeline.
#[derive(Default)]
pub struct Vocabulary {
    pub sections: SectionVocabulary,
    pub conclusion: ConclusionVocabulary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_markers_and_colon() {
        assert_eq!(normalize_heading_key("**Final Result:**"), "final result");
        assert_eq!(normalize_heading_key("## Findings"), "findings");
        assert_eq!(normalize_heading_key("  Summary :"), "summary");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_heading_key("Final   Result"), "final result");
    }

    #[test]
    fn classify_plain_title_line() {
        let vocab = SectionVocabulary::default();
        assert_eq!(vocab.classify_line("Findings"), Some(SectionKey::Findings));
        assert_eq!(
            vocab.classify_line("**Recommendations:**"),
            Some(SectionKey::Recommendations)
        );
    }

    #[test]
    fn classify_title_with_inline_content() {
        let vocab = SectionVocabulary::default();
        assert_eq!(
            vocab.classify_line("Findings: mild density."),
            Some(SectionKey::Findings)
        );
        assert_eq!(
            vocab.classify_line("Final Result: likely normal."),
            Some(SectionKey::FinalResult)
        );
    }

    #[test]
    fn classify_arabic_titles() {
        let vocab = SectionVocabulary::default();
        assert_eq!(
            vocab.classify_line("النتيجة النهائية: سليم"),
            Some(SectionKey::FinalResult)
        );
        assert_eq!(vocab.classify_line("التوصيات"), Some(SectionKey::Recommendations));
    }

    #[test]
    fn classify_rejects_ordinary_lines() {
        let vocab = SectionVocabulary::default();
        assert_eq!(vocab.classify_line("The patient reports mild pain."), None);
        assert_eq!(vocab.classify_line(": leading colon"), None);
        assert_eq!(vocab.classify_line(""), None);
    }

    #[test]
    fn conclusion_keys_mark_whole_section() {
        assert!(SectionKey::FinalResult.is_conclusion());
        assert!(SectionKey::Summary.is_conclusion());
        assert!(!SectionKey::Findings.is_conclusion());
    }

    #[test]
    fn diagnosis_marker_covers_colon_variant() {
        let vocab = ConclusionVocabulary::default();
        assert!(vocab.has_diagnosis_marker("Diagnosis: condition X, stage 2."));
        assert!(vocab.has_diagnosis_marker("The final result is benign."));
        assert!(!vocab.has_diagnosis_marker("The breast tissue is dense."));
    }

    #[test]
    fn abnormal_does_not_double_count_as_normal() {
        let vocab = ConclusionVocabulary::default();
        assert_eq!(vocab.distinct_status_markers("The finding is abnormal."), 1);
        assert_eq!(
            vocab.distinct_status_markers("Left side normal, right side abnormal."),
            2
        );
    }

    #[test]
    fn arabic_status_markers_match() {
        let vocab = ConclusionVocabulary::default();
        assert!(vocab.has_status_marker("الثدي الأيسر سليم"));
        assert!(vocab.has_stage_marker("المرحلة الثانية"));
    }
}
