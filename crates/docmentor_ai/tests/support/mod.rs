#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use docmentor_ai::embeddings::Embedder;
use docmentor_ai::llm::Llm;
use docmentor_core::error::AppError;

pub const VOCAB: [&str; 5] = ["paris", "capital", "france", "eiffel", "tower"];

/// Bag-of-keywords embedder over [`VOCAB`], L2-normalized. Text with no keywords embeds to
/// the zero vector.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: Cell<usize>,
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        self.calls.set(self.calls.get() + 1);
        let mut v = vec![0.0f32; VOCAB.len()];
        for word in input
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if let Some(i) = VOCAB.iter().position(|k| *k == word) {
                v[i] += 1.0;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        Ok(v)
    }
}

pub struct FailingEmbedder {
    pub code: &'static str,
}

impl Embedder for FailingEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        Err(AppError::new(self.code, "embedding service unavailable").with_retryable(true))
    }
}

/// Returns a fixed reply and records every `(model, prompt)` it receives.
pub struct ScriptedLlm {
    reply: Result<String, AppError>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(code: &str) -> Self {
        Self {
            reply: Err(AppError::new(code, "generation failed")),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Llm for ScriptedLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        self.calls
            .borrow_mut()
            .push((model.to_string(), prompt.to_string()));
        self.reply.clone()
    }
}
