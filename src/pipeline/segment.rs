//! Line classifier for freeform model output.
//!
//! Medical model output mixes ad hoc markdown-like conventions
//! inconsistently; a strict markdown parser would reject most real answers
//! or silently drop content. The segmenter is a best-effort classifier with
//! a graceful fallback: every non-trivial line maps to some block, at the
//! cost of occasional misclassification. This is presentation, not data
//! extraction.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::heuristics::Heuristics;
use super::spans::strip_stray_markers;
use super::vocabulary::{normalize_heading_key, SectionKey, SectionVocabulary};

/// One classified unit of freeform text, in document order. Order is the
/// only relationship between blocks — there is no nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { text: String },
    HeadingWithBody { heading: String, body: String },
    NumberedItem { index: u32, text: String },
    BulletItem { text: String },
    LabeledParagraph { label: String, body: String },
    Paragraph { text: String },
    Blank,
}

/// Classify cleaned freeform text into an ordered block list.
///
/// Total over any input: empty text yields an empty list, pure punctuation
/// fragments are discarded, everything else lands in some block.
pub fn segment(text: &str, heur: &Heuristics, vocab: &SectionVocabulary) -> Vec<Block> {
    let numbered = Regex::new(r"^(\d+)\.\s+(\S.*)$").unwrap();
    let bullet = Regex::new(r"^[-•]\s+(\S.*)$").unwrap();

    let mut seen_conclusions: HashSet<SectionKey> = HashSet::new();
    let mut blocks = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blocks.push(Block::Blank);
            continue;
        }
        if is_noise_line(trimmed) {
            continue;
        }

        // 1. numbered item
        if let Some(caps) = numbered.captures(trimmed) {
            if let Ok(index) = caps[1].parse::<u32>() {
                blocks.push(Block::NumberedItem {
                    index,
                    text: caps[2].trim().to_string(),
                });
                continue;
            }
        }

        // 2. bullet via a leading stray emphasis marker (a doubled marker
        // would denote real emphasis instead)
        if trimmed.starts_with('*') && !trimmed.starts_with("**") {
            let rest = strip_stray_markers(trimmed[1..].trim());
            let rest = rest.trim();
            if !rest.is_empty() {
                blocks.push(Block::BulletItem {
                    text: rest.to_string(),
                });
            }
            continue;
        }

        // 3. bullet via dash/dot glyph
        if let Some(caps) = bullet.captures(trimmed) {
            blocks.push(Block::BulletItem {
                text: caps[1].trim().to_string(),
            });
            continue;
        }

        // 4. heading
        match classify_heading(trimmed, heur, vocab, &mut seen_conclusions) {
            HeadingOutcome::Block(block) => {
                blocks.push(block);
                continue;
            }
            HeadingOutcome::Suppressed => continue,
            HeadingOutcome::NotAHeading => {}
        }

        let char_len = trimmed.chars().count();
        let colon_count = trimmed.chars().filter(|c| *c == ':').count();

        // 5. mid-line label pattern, repeating chunks
        if char_len > heur.label_scan_min_chars && colon_count > 1 {
            if let Some(mut chunks) = scan_labeled_chunks(trimmed, heur) {
                blocks.append(&mut chunks);
                continue;
            }
        }

        // 6. mid-line label pattern, single split
        if char_len > heur.single_label_min_chars && colon_count == 1 {
            if let Some(block) = single_label_split(trimmed, heur) {
                blocks.push(block);
                continue;
            }
        }

        // 7. fallback
        blocks.push(Block::Paragraph {
            text: strip_stray_markers(trimmed).trim().to_string(),
        });
    }

    blocks
}

/// Model artifacts, not content: no alphanumeric character at all, or a
/// quasi-empty fragment of one or two characters.
fn is_noise_line(trimmed: &str) -> bool {
    !trimmed.chars().any(char::is_alphanumeric) || trimmed.chars().count() <= 2
}

enum HeadingOutcome {
    Block(Block),
    /// Repeated conclusion heading, dropped entirely.
    Suppressed,
    NotAHeading,
}

/// Heading candidacy: a leading `#` glyph, or a colon within the first
/// `heading_colon_window` chars of a line no longer than
/// `label_scan_min_chars` (longer lines fall through to the label scan).
fn classify_heading(
    trimmed: &str,
    heur: &Heuristics,
    vocab: &SectionVocabulary,
    seen_conclusions: &mut HashSet<SectionKey>,
) -> HeadingOutcome {
    let starts_with_glyph = trimmed.starts_with('#');
    let char_len = trimmed.chars().count();

    let colon = trimmed
        .char_indices()
        .enumerate()
        .find(|(_, (_, c))| *c == ':')
        .map(|(char_pos, (byte_pos, _))| (char_pos, byte_pos));

    let colon_candidate = matches!(
        colon,
        Some((char_pos, _))
            if char_pos > 0
                && char_pos < heur.heading_colon_window
                && char_len <= heur.label_scan_min_chars
    );

    if !starts_with_glyph && !colon_candidate {
        return HeadingOutcome::NotAHeading;
    }

    let (left, right) = match colon {
        Some((_, byte_pos)) => (&trimmed[..byte_pos], trimmed[byte_pos + 1..].trim()),
        None => (trimmed, ""),
    };

    // Belt and suspenders with the cleaner: a restated conclusion heading
    // that reached this stage unfiltered is still dropped.
    if let Some(key) = vocab.lookup(&normalize_heading_key(left)) {
        if key.is_conclusion() && !seen_conclusions.insert(key) {
            return HeadingOutcome::Suppressed;
        }
    }

    let left_chars = left.trim().chars().count();
    if !right.is_empty() && right.chars().count() >= 2 && left_chars < heur.label_max_chars {
        HeadingOutcome::Block(Block::HeadingWithBody {
            heading: heading_text(left),
            body: right.to_string(),
        })
    } else {
        HeadingOutcome::Block(Block::Heading {
            text: heading_text(left),
        })
    }
}

/// Display form of a heading: decorations off, case and inner spacing kept.
fn heading_text(raw: &str) -> String {
    let no_marks: String = raw.chars().filter(|c| *c != '*').collect();
    no_marks
        .trim_start_matches(|c| c == '#' || c == ' ')
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Scan a long line for repeating `label: content` chunks.
///
/// A label is the short run between the previous sentence boundary and a
/// colon; content runs until the next label's start. At least two labeled
/// chunks must be recovered, otherwise the line is left to the later rules.
fn scan_labeled_chunks(line: &str, heur: &Heuristics) -> Option<Vec<Block>> {
    let colons: Vec<usize> = line
        .char_indices()
        .filter(|(_, c)| *c == ':')
        .map(|(i, _)| i)
        .collect();

    let mut labels: Vec<(usize, usize)> = Vec::new();
    let mut min_start = 0usize;

    for &colon in &colons {
        if colon <= min_start {
            continue;
        }
        let segment = &line[min_start..colon];
        let label_start = match segment.rfind(['.', '!', '?', '؟', ';']) {
            Some(pos) => {
                let boundary = segment[pos..].chars().next().unwrap_or('.');
                min_start + pos + boundary.len_utf8()
            }
            None => min_start,
        };
        let label = line[label_start..colon].trim();
        let label_chars = label.chars().count();
        if label_chars >= 1 && label_chars < heur.label_max_chars {
            labels.push((label_start, colon));
            min_start = colon + 1;
        }
    }

    if labels.len() < 2 {
        return None;
    }

    let mut blocks = Vec::new();

    // Content before the first label has no recovered label of its own.
    let lead = line[..labels[0].0].trim();
    if lead.chars().any(char::is_alphanumeric) {
        blocks.push(Block::Paragraph {
            text: strip_stray_markers(lead).trim().to_string(),
        });
    }

    for (i, (label_start, colon)) in labels.iter().enumerate() {
        let content_end = labels
            .get(i + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(line.len());
        let label = strip_stray_markers(line[*label_start..*colon].trim())
            .trim()
            .to_string();
        let body = strip_stray_markers(line[*colon + 1..content_end].trim())
            .trim()
            .to_string();
        if body.is_empty() {
            if !label.is_empty() {
                blocks.push(Block::Paragraph { text: label });
            }
        } else {
            blocks.push(Block::LabeledParagraph { label, body });
        }
    }

    Some(blocks)
}

/// Single `label: body` split for a long line with exactly one interior
/// colon and a short left side.
fn single_label_split(line: &str, heur: &Heuristics) -> Option<Block> {
    let colon = line.find(':')?;
    if colon == 0 || colon + 1 >= line.len() {
        return None;
    }
    let left = line[..colon].trim();
    let right = line[colon + 1..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    if left.chars().count() >= heur.label_max_chars {
        return None;
    }
    Some(Block::LabeledParagraph {
        label: strip_stray_markers(left).trim().to_string(),
        body: strip_stray_markers(right).trim().to_string(),
    })
}
