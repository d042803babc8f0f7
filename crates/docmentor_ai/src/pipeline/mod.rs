//! Question answering over the embedding store.
//!
//! One call to [`QueryPipeline::ask`] embeds the question, retrieves the nearest chunks,
//! and either answers from them or, when even the best match is too far away, falls back
//! to the glossary. Every outcome, fallbacks included, is appended to the query history
//! before the call returns.

use docmentor_core::domain::QueryRecord;
use docmentor_core::error::AppError;
use docmentor_core::glossary::{normalize_term, GlossaryStore};
use docmentor_core::history::HistoryStore;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::ingest::embed_error;
use crate::llm::Llm;
use crate::models::AnswerModel;
use crate::store::{EmbeddingStore, StoreHit};
use crate::synth::AnswerSynthesizer;

pub mod prompts;

/// Best distance assumed when retrieval returns nothing.
const NO_HIT_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub embed_model: String,
    pub top_k: usize,
    pub relevance_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub model: AnswerModel,
    pub show_chunks: bool,
    pub show_explanation: bool,
    /// Add the glossary definition of the question, if any, to the prompt.
    pub glossary_note: bool,
}

impl AskRequest {
    pub fn new(question: impl Into<String>, model: AnswerModel) -> Self {
        Self {
            question: question.into(),
            model,
            show_chunks: true,
            show_explanation: false,
            glossary_note: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerRoute {
    Synthesized,
    FastRetrieval,
    Glossary,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub overview: String,
    pub full_context: String,
    pub history_text: String,
    pub route: AnswerRoute,
    /// Distinct sources of the retrieved chunks, in retrieval order.
    pub sources: Vec<String>,
    /// Retrieved context (chunk texts joined by blank lines); empty on fallback routes.
    pub context: String,
}

pub struct QueryPipeline<'a> {
    pub store: &'a EmbeddingStore,
    pub glossary: &'a GlossaryStore,
    pub history: &'a mut HistoryStore,
    pub embedder: &'a dyn Embedder,
    pub llm: &'a dyn Llm,
    pub settings: PipelineSettings,
}

impl QueryPipeline<'_> {
    pub fn ask(&mut self, req: &AskRequest) -> Result<AskResponse, AppError> {
        let question = req.question.trim();
        if question.is_empty() {
            return Err(AppError::new("QUERY_INVALID", "Question must not be empty"));
        }

        let qv = self
            .embedder
            .embed(&self.settings.embed_model, question)
            .map_err(|e| embed_error(e, "query"))?;
        let hits = self.store.query(&qv, self.settings.top_k)?;
        for hit in &hits {
            tracing::debug!(id = %hit.id, distance = hit.distance, preview = %preview(&hit.text), "retrieved chunk");
        }

        let best = hits.first().map(|h| h.distance).unwrap_or(NO_HIT_DISTANCE);
        if hits.is_empty() || best > self.settings.relevance_threshold {
            tracing::info!(best, threshold = self.settings.relevance_threshold, "no good match; trying glossary");
            return self.fallback(question);
        }

        self.synthesize(question, req, &hits)
    }

    fn fallback(&mut self, question: &str) -> Result<AskResponse, AppError> {
        let (answer, overview, recorded, route) = match self.glossary.lookup(question) {
            Some(definition) => (
                definition.to_string(),
                prompts::GLOSSARY_OVERVIEW.to_string(),
                prompts::glossary_record_answer(definition),
                AnswerRoute::Glossary,
            ),
            None => (
                prompts::NO_MATCH_ANSWER.to_string(),
                String::new(),
                prompts::NO_MATCH_RECORD.to_string(),
                AnswerRoute::NoMatch,
            ),
        };
        self.history.append(&QueryRecord::new(question, recorded))?;

        Ok(AskResponse {
            answer,
            overview,
            full_context: String::new(),
            history_text: self.history.text(),
            route,
            sources: Vec::new(),
            context: String::new(),
        })
    }

    fn synthesize(
        &mut self,
        question: &str,
        req: &AskRequest,
        hits: &[StoreHit],
    ) -> Result<AskResponse, AppError> {
        let context = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources = distinct_sources(hits.iter().map(|h| h.metadata.source.as_str()));

        let (answer, route) = if req.model.skips_generation() {
            (hits[0].text.clone(), AnswerRoute::FastRetrieval)
        } else {
            let term = normalize_term(question);
            let note = if req.glossary_note {
                self.glossary.lookup(&term).map(|def| (term.as_str(), def))
            } else {
                None
            };
            let prompt = prompts::build_answer_prompt(question, note);
            let framed_context = prompts::synthesis_context(&context, req.show_explanation);
            tracing::debug!(model = req.model.tag(), prompt = %prompt, "synthesizing answer");
            let answer = AnswerSynthesizer::new(self.llm).synthesize(
                &prompt,
                &framed_context,
                req.model.tag(),
            );
            (answer, AnswerRoute::Synthesized)
        };

        let (overview, full_context) = if req.show_chunks {
            let overview = prompts::sources_overview(&sources);
            let full = format!("{overview}\n\n---\n{context}");
            (overview, full)
        } else {
            (String::new(), String::new())
        };

        self.history.append(&QueryRecord::new(question, answer.clone()))?;
        tracing::info!(route = ?route, sources = sources.len(), "question answered");

        Ok(AskResponse {
            answer,
            overview,
            full_context,
            history_text: self.history.text(),
            route,
            sources,
            context,
        })
    }
}

pub(crate) fn distinct_sources<'h>(sources: impl IntoIterator<Item = &'h str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in sources {
        if !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
