use std::time::Duration;

use docmentor_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Embedder;
use crate::ollama::{request_error, OllamaClient};

/// Upper bound on bytes sent per request; chunking keeps inputs far below this.
const MAX_INPUT_BYTES: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

fn truncate_to_boundary(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }
    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let prompt = truncate_to_boundary(input, MAX_INPUT_BYTES);

        let url = format!("{}/api/embeddings", self.client.base_url());
        let req = EmbeddingsRequest { model, prompt };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("EMBEDDING_FAILED", "Failed to encode embeddings request")
                .with_details(e.to_string())
        })?;
        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| request_error(e, "EMBEDDING_FAILED", "embeddings"))?;

        let v: EmbeddingsResponse = resp.into_json().map_err(|e| {
            AppError::new("EMBEDDING_FAILED", "Failed to decode embeddings response")
                .with_details(e.to_string())
        })?;
        if v.embedding.is_empty() {
            return Err(AppError::new(
                "EMBEDDING_FAILED",
                "Embeddings response was empty",
            )
            .with_details(format!("model={model}")));
        }
        Ok(v.embedding)
    }
}
