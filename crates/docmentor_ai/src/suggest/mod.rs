//! Study-question generation from a sample of the indexed material.

use docmentor_core::error::AppError;
use docmentor_core::glossary::GlossaryStore;
use serde::{Deserialize, Serialize};

use crate::llm::Llm;
use crate::models::AnswerModel;
use crate::pipeline::distinct_sources;
use crate::pipeline::prompts::sources_overview;
use crate::store::EmbeddingStore;
use crate::synth::{is_placeholder, AnswerSynthesizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionStyle {
    #[default]
    Insightful,
    Factual,
    MultipleChoice,
    OpenEnded,
}

impl QuestionStyle {
    /// Accepts the display labels ("Multiple Choice") and kebab-case names. Unknown
    /// labels fall back to [`QuestionStyle::Insightful`].
    pub fn from_label(label: &str) -> Self {
        let key: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "factual" => Self::Factual,
            "multiplechoice" => Self::MultipleChoice,
            "openended" => Self::OpenEnded,
            _ => Self::Insightful,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::Insightful => "Suggest 3 insightful questions a student might ask.",
            Self::Factual => "Suggest 3 factual questions based on the content.",
            Self::MultipleChoice => "Create 3 multiple-choice questions with answers.",
            Self::OpenEnded => "Generate 3 open-ended discussion questions.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub questions: Vec<String>,
    pub source_summary: String,
}

pub fn build_suggest_prompt(context: &str, glossary_terms: &[String], style: QuestionStyle) -> String {
    let hint = if glossary_terms.is_empty() {
        String::new()
    } else {
        format!("\n\nGlossary terms in context: {}", glossary_terms.join(", "))
    };
    format!(
        "Based on the following document excerpts:{hint}\n\n{context}\n\n{}\n",
        style.instruction()
    )
}

/// Sample recent chunks and ask the reasoning model for questions about them.
///
/// An empty store yields no questions without calling the model; so does a failed or
/// blank generation.
pub fn suggest_questions(
    store: &EmbeddingStore,
    glossary: &GlossaryStore,
    llm: &dyn Llm,
    style: QuestionStyle,
    sample: usize,
) -> Result<Suggestions, AppError> {
    let chunks = store.sample_recent(sample.max(1))?;
    if chunks.is_empty() {
        tracing::info!("no indexed chunks; skipping question suggestions");
        return Ok(Suggestions::default());
    }

    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let sources = distinct_sources(chunks.iter().map(|c| c.metadata.source.as_str()));
    let terms = glossary.terms_in_text(&context);
    let prompt = build_suggest_prompt(&context, &terms, style);

    let tag = AnswerModel::AdvancedReasoning.tag();
    let raw = AnswerSynthesizer::new(llm).synthesize(&prompt, &context, tag);
    let questions = if is_placeholder(&raw) {
        Vec::new()
    } else {
        parse_suggestions(&raw)
    };
    tracing::info!(style = ?style, questions = questions.len(), "questions suggested");

    Ok(Suggestions {
        questions,
        source_summary: sources_overview(&sources),
    })
}

/// One question per non-blank line, list markers stripped, exact duplicates dropped
/// (first occurrence wins).
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in raw.lines() {
        let cleaned = line
            .trim()
            .trim_start_matches(|c: char| matches!(c, '-' | '•' | '.' | ')' | ' ') || c.is_ascii_digit())
            .trim();
        if !cleaned.is_empty() && !out.iter().any(|q| q == cleaned) {
            out.push(cleaned.to_string());
        }
    }
    out
}
