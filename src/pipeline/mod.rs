//! Analysis-result normalization pipeline.
//!
//! Takes a vision model's raw textual output — which may or may not be
//! well-formed structured data — and turns it into a clean, deduplicated,
//! section-aware representation for display and stable downstream use.
//!
//! Control flow: the structured parse runs first; on success the record is
//! used directly and the freeform stages are skipped. Otherwise cleaner,
//! segmenter and conclusion extractor run in sequence. Both paths funnel
//! leaf text through the span tokenizer at render time.
//!
//! Every function here is a pure, total transformation over an in-memory
//! string: no I/O, no shared state, fresh allocations per call.

pub mod cleaner;
pub mod conclusion;
pub mod heuristics;
pub mod segment;
pub mod spans;
pub mod structured;
pub mod view;
pub mod vocabulary;

pub use cleaner::clean;
pub use conclusion::{extract, ConclusionSplit};
pub use heuristics::Heuristics;
pub use segment::{segment, Block};
pub use spans::{strip_emphasis_markers, strip_stray_markers, tokenize, Span};
pub use structured::{parse_structured, AnalysisFindings, StructuredAnalysis};
pub use view::AnalysisView;
pub use vocabulary::{SectionKey, Vocabulary};
