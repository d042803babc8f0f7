pub mod embeddings;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod ollama;
pub mod pipeline;
pub mod store;
pub mod suggest;
pub mod synth;

#[cfg(test)]
mod tests {
    use super::models::AnswerModel;
    use super::ollama::OllamaClient;

    #[test]
    fn enforces_localhost_only_base_url() {
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1").is_ok());

        assert!(OllamaClient::new("http://localhost:11434").is_err());
        assert!(OllamaClient::new("http://0.0.0.0:11434").is_err());
        assert!(OllamaClient::new("http://[::1]:11434").is_err());
        assert!(OllamaClient::new("https://example.com").is_err());

        assert!(OllamaClient::new("http://127.0.0.1.evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1@evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:0").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:99999").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434/").is_ok()); // trailing slash is trimmed
        assert!(OllamaClient::new("http://127.0.0.1:11434/api").is_err());

        let err = OllamaClient::new("http://10.0.0.5:11434").unwrap_err();
        assert_eq!(err.code, "AI_REMOTE_NOT_ALLOWED");
    }

    #[test]
    fn answer_models_resolve_by_name_tag_or_alias() {
        assert_eq!(
            AnswerModel::resolve("MiniLM (fast retrieval)"),
            AnswerModel::FastRetrieval
        );
        assert_eq!(AnswerModel::resolve("phi3"), AnswerModel::SmartSynthesis);
        assert_eq!(AnswerModel::resolve("reasoning"), AnswerModel::AdvancedReasoning);
        assert_eq!(AnswerModel::resolve("GPT-9000"), AnswerModel::AdvancedReasoning);
        assert_eq!(AnswerModel::resolve("Gemma-2B (advanced reasoning)").tag(), "gemma:2b");
        assert_eq!(AnswerModel::default(), AnswerModel::SmartSynthesis);
        assert!(AnswerModel::FastRetrieval.skips_generation());
    }
}
