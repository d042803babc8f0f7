use docmentor_core::error::AppError;

/// Text -> fixed-length vector. Every call against one index must use the same model.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;
