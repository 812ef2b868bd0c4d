//! Vision-model invocation boundary.
//!
//! The pipeline treats the model call as a black box: image bytes and a
//! category go in, one opaque string comes out, regardless of which model or
//! version answered. The trait seam allows mocking in tests; the production
//! implementation talks to a local Ollama instance.

pub mod ollama;
pub mod prompt;

pub use ollama::*;
pub use prompt::*;

use thiserror::Error;

use crate::models::ImageCategory;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("model backend returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("no compatible vision model available")]
    NoModelAvailable,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("response parsing error: {0}")]
    ResponseParsing(String),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// `analyze(image, category) -> raw text`. The result is untyped on purpose:
/// normalization happens downstream and never trusts the model's formatting.
pub trait VisionAnalyzer {
    fn analyze(&self, image_bytes: &[u8], category: ImageCategory) -> Result<String, VisionError>;
}
