//! Ollama HTTP client for vision analysis.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::prompt::{user_prompt, SYSTEM_PROMPT};
use super::{VisionAnalyzer, VisionError};
use crate::models::ImageCategory;

/// Preferred vision models in order of preference.
const VISION_MODELS: &[&str] = &[
    "medgemma",
    "medgemma:27b",
    "medgemma:4b",
    "llava:13b",
    "llava",
    "qwen2.5vl",
];

/// Ollama HTTP client for local vision inference.
pub struct OllamaVisionClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaVisionClient {
    /// Create a new client pointing at a local Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Self {
        Self::new("http://localhost:11434", 300)
    }

    /// Preferred models that are actually installed, preference order kept.
    pub fn candidate_models(&self) -> Result<Vec<String>, VisionError> {
        let available = self.list_models()?;
        Ok(VISION_MODELS
            .iter()
            .filter(|preferred| available.iter().any(|m| m.starts_with(*preferred)))
            .map(|preferred| preferred.to_string())
            .collect())
    }

    pub fn list_models(&self) -> Result<Vec<String>, VisionError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                VisionError::Connection(self.base_url.clone())
            } else {
                VisionError::HttpClient(e.to_string())
            }
        })?;

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| VisionError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// One /api/chat round with an attached image.
    fn chat_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_b64: &str,
    ) -> Result<String, VisionError> {
        let url = format!("{}/api/chat", self.base_url);
        let images = vec![image_b64.to_string()];
        let body = OllamaChatRequest {
            model,
            messages: vec![
                OllamaChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                    images: None,
                },
                OllamaChatMessage {
                    role: "user",
                    content: prompt,
                    images: Some(&images),
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    VisionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    VisionError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    VisionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(VisionError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| VisionError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

impl VisionAnalyzer for OllamaVisionClient {
    /// Analyze an image, retrying across the preferred model names: a model
    /// that errors at the backend is skipped in favor of the next candidate,
    /// while a dead connection aborts immediately.
    fn analyze(&self, image_bytes: &[u8], category: ImageCategory) -> Result<String, VisionError> {
        let _span = tracing::info_span!(
            "vision_analyze",
            category = %category,
            image_size = image_bytes.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let candidates = self.candidate_models()?;
        if candidates.is_empty() {
            return Err(VisionError::NoModelAvailable);
        }

        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let prompt = user_prompt(category);

        let mut last_err = VisionError::NoModelAvailable;
        for model in candidates {
            match self.chat_with_image(&model, &prompt, &image_b64) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(
                        model = %model,
                        elapsed_ms = %start.elapsed().as_millis(),
                        text_len = text.len(),
                        "vision analysis complete"
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::warn!(model = %model, "vision model returned empty response, trying next");
                    last_err = VisionError::EmptyResponse;
                }
                Err(err @ VisionError::Backend { .. }) => {
                    tracing::warn!(model = %model, error = %err, "vision model failed, trying next");
                    last_err = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err)
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatResponseMessage,
}

#[derive(Deserialize)]
struct OllamaChatResponseMessage {
    content: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = OllamaVisionClient::new("http://localhost:11434/", 30);
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn chat_request_serializes_images_on_user_message_only() {
        let images = vec!["aGVsbG8=".to_string()];
        let request = OllamaChatRequest {
            model: "medgemma",
            messages: vec![
                OllamaChatMessage {
                    role: "system",
                    content: "system prompt",
                    images: None,
                },
                OllamaChatMessage {
                    role: "user",
                    content: "user prompt",
                    images: Some(&images),
                },
            ],
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json.matches("\"images\"").count(), 1);
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn preference_order_is_medical_first() {
        assert_eq!(VISION_MODELS[0], "medgemma");
    }
}
