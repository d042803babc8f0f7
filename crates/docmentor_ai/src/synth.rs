use crate::llm::Llm;

/// Answer placeholder when generation fails.
pub const SYNTHESIS_ERROR: &str = "Error";
/// Answer placeholder when generation succeeds with blank output.
pub const NO_ANSWER: &str = "No answer generated.";

/// Soft-failing wrapper around an [`Llm`]: it always produces an answer string.
pub struct AnswerSynthesizer<'a> {
    llm: &'a dyn Llm,
}

impl<'a> AnswerSynthesizer<'a> {
    pub fn new(llm: &'a dyn Llm) -> Self {
        Self { llm }
    }

    pub fn synthesize(&self, prompt: &str, context: &str, model_tag: &str) -> String {
        let framed = frame_request(prompt, context);
        match self.llm.generate(model_tag, &framed) {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!(model = model_tag, "synthesis returned no text");
                NO_ANSWER.to_string()
            }
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(model = model_tag, code = %e.code, err = %e, "synthesis failed");
                SYNTHESIS_ERROR.to_string()
            }
        }
    }
}

pub fn frame_request(prompt: &str, context: &str) -> String {
    format!("Q: {prompt}\nContext: {context}\nA:")
}

/// True for the two placeholder answers.
pub fn is_placeholder(answer: &str) -> bool {
    answer == SYNTHESIS_ERROR || answer == NO_ANSWER
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmentor_core::error::AppError;
    use std::cell::RefCell;

    struct Scripted {
        reply: Result<String, AppError>,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl Llm for Scripted {
        fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
            self.seen.borrow_mut().push((model.to_string(), prompt.to_string()));
            self.reply.clone()
        }
    }

    fn scripted(reply: Result<String, AppError>) -> Scripted {
        Scripted {
            reply,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn frames_prompt_and_trims_output() {
        let llm = scripted(Ok("  Paris.\n".to_string()));
        let out = AnswerSynthesizer::new(&llm).synthesize("Capital?", "Paris is...", "phi3");
        assert_eq!(out, "Paris.");
        let seen = llm.seen.borrow();
        assert_eq!(seen[0].0, "phi3");
        assert_eq!(seen[0].1, "Q: Capital?\nContext: Paris is...\nA:");
    }

    #[test]
    fn failures_become_placeholders() {
        let failing = scripted(Err(AppError::new("TIMEOUT", "deadline")));
        assert_eq!(AnswerSynthesizer::new(&failing).synthesize("q", "c", "phi3"), "Error");

        let blank = scripted(Ok("   ".to_string()));
        assert_eq!(
            AnswerSynthesizer::new(&blank).synthesize("q", "c", "phi3"),
            "No answer generated."
        );
        assert!(is_placeholder("Error"));
        assert!(!is_placeholder("Paris."));
    }
}
