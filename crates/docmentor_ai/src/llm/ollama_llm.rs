use std::time::Duration;

use docmentor_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::{request_error, OllamaClient};

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("SYNTHESIS_FAILED", "Failed to encode generate request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| request_error(e, "SYNTHESIS_FAILED", "generate"))?;

        let v: GenerateResponse = resp.into_json().map_err(|e| {
            AppError::new("SYNTHESIS_FAILED", "Failed to decode generate response")
                .with_details(e.to_string())
        })?;
        // Blank output is passed through; the synthesizer decides what it means.
        Ok(v.response)
    }
}
