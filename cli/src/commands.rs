use std::path::{Path, PathBuf};
use std::time::Duration;

use docmentor_ai::embeddings::ollama_embed::OllamaEmbedder;
use docmentor_ai::ingest::{ingest_files, IngestSettings};
use docmentor_ai::llm::ollama_llm::OllamaLlm;
use docmentor_ai::models::AnswerModel;
use docmentor_ai::ollama::OllamaClient;
use docmentor_ai::pipeline::{AskRequest, AskResponse, PipelineSettings, QueryPipeline};
use docmentor_ai::store::EmbeddingStore;
use docmentor_ai::suggest::{suggest_questions, QuestionStyle};
use docmentor_core::config::{load_config, DocMentorConfig};
use docmentor_core::error::AppError;
use docmentor_core::export::{export, ExportFormat, ExportRequest};
use docmentor_core::glossary::GlossaryStore;
use docmentor_core::history::HistoryStore;
use docmentor_core::stats::{render_chunk_counts, FileStats};
use serde::Serialize;
use time::OffsetDateTime;

pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<(), AppError> {
        if self.json {
            let s = serde_json::to_string_pretty(value).map_err(|e| {
                AppError::new("OUTPUT_FAILED", "Failed to encode output").with_details(e.to_string())
            })?;
            println!("{s}");
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

pub fn render_error(e: &AppError) -> String {
    match &e.details {
        Some(d) => format!("{e} ({d})"),
        None => e.to_string(),
    }
}

pub fn load(path: Option<&Path>) -> Result<DocMentorConfig, AppError> {
    match path {
        Some(p) => load_config(p),
        None => {
            let cfg = DocMentorConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

fn open_store(cfg: &DocMentorConfig) -> Result<EmbeddingStore, AppError> {
    EmbeddingStore::open(&cfg.store_path(), cfg.retrieval.metric)
}

fn ollama(cfg: &DocMentorConfig) -> Result<OllamaClient, AppError> {
    OllamaClient::new(&cfg.ollama.base_url)
}

fn embedder(cfg: &DocMentorConfig, client: &OllamaClient) -> OllamaEmbedder {
    OllamaEmbedder::new(client.clone())
        .with_timeout(Duration::from_secs(cfg.ollama.embed_timeout_secs))
}

fn llm(cfg: &DocMentorConfig, client: &OllamaClient) -> OllamaLlm {
    OllamaLlm::new(client.clone())
        .with_timeout(Duration::from_secs(cfg.ollama.generate_timeout_secs))
}

pub fn ingest(cfg: &DocMentorConfig, out: &Output, files: &[PathBuf]) -> Result<(), AppError> {
    let client = ollama(cfg)?;
    let embedder = embedder(cfg, &client);
    let mut store = open_store(cfg)?;
    let mut stats = FileStats::new();
    let settings = IngestSettings {
        embed_model: cfg.ollama.embed_model.clone(),
        max_length: cfg.chunking.max_length,
        overlap: cfg.chunking.overlap,
    };

    let report = ingest_files(&mut store, &embedder, &mut stats, files, &settings);
    out.emit(&report, || {
        let mut s = report.status_line();
        if !stats.is_empty() {
            s.push_str("\n\n");
            s.push_str(&stats.render_markdown());
        }
        for skipped in &report.skipped {
            s.push_str(&format!(
                "\nskipped {}: [{}] {}",
                skipped.path, skipped.code, skipped.reason
            ));
        }
        s
    })
}

pub struct AskArgs {
    pub question: String,
    pub model: Option<String>,
    pub show_chunks: bool,
    pub explain: bool,
    pub glossary_note: bool,
    pub full_context: bool,
    pub export: Option<ExportFormat>,
    pub citations: bool,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    model: &'a str,
    #[serde(flatten)]
    response: &'a AskResponse,
    export_path: Option<String>,
}

fn run_pipeline(cfg: &DocMentorConfig, req: &AskRequest) -> Result<AskResponse, AppError> {
    let client = ollama(cfg)?;
    let embedder = embedder(cfg, &client);
    let llm = llm(cfg, &client);
    let store = open_store(cfg)?;
    let glossary = GlossaryStore::load(cfg.glossary_path())?;
    let mut history = HistoryStore::load(cfg.history_path())?;

    let mut pipeline = QueryPipeline {
        store: &store,
        glossary: &glossary,
        history: &mut history,
        embedder: &embedder,
        llm: &llm,
        settings: PipelineSettings {
            embed_model: cfg.ollama.embed_model.clone(),
            top_k: cfg.retrieval.top_k,
            relevance_threshold: cfg.retrieval.relevance_threshold,
        },
    };
    pipeline.ask(req)
}

pub fn ask(cfg: &DocMentorConfig, out: &Output, args: AskArgs) -> Result<(), AppError> {
    let model = args
        .model
        .as_deref()
        .map(AnswerModel::resolve)
        .unwrap_or_default();
    let req = AskRequest {
        question: args.question.clone(),
        model,
        show_chunks: args.show_chunks,
        show_explanation: args.explain,
        glossary_note: args.glossary_note,
    };
    let resp = run_pipeline(cfg, &req)?;

    let export_path = match args.export {
        Some(format) => {
            let sources = if resp.sources.is_empty() {
                None
            } else {
                Some(resp.sources.join(", "))
            };
            let request = ExportRequest {
                question: req.question.clone(),
                answer: resp.answer.clone(),
                context: resp.context.clone(),
                sources,
                model_name: model.display_name().to_string(),
                include_citations: args.citations,
            };
            let path = export(&cfg.exports_dir(), &request, format, OffsetDateTime::now_utc())?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let output = AskOutput {
        model: model.display_name(),
        response: &resp,
        export_path: export_path.clone(),
    };
    out.emit(&output, || {
        let mut s = resp.answer.clone();
        let extra = if args.full_context {
            &resp.full_context
        } else {
            &resp.overview
        };
        if !extra.is_empty() {
            s.push_str("\n\n");
            s.push_str(extra);
        }
        if let Some(p) = &export_path {
            s.push_str(&format!("\n\nExported to {p}"));
        }
        s
    })
}

pub fn suggest(
    cfg: &DocMentorConfig,
    out: &Output,
    style: &str,
    answer: Option<usize>,
) -> Result<(), AppError> {
    let client = ollama(cfg)?;
    let llm = llm(cfg, &client);
    let store = open_store(cfg)?;
    let glossary = GlossaryStore::load(cfg.glossary_path())?;
    let style = QuestionStyle::from_label(style);

    let suggestions = suggest_questions(&store, &glossary, &llm, style, cfg.retrieval.suggest_sample)?;

    out.emit(&suggestions, || {
        if suggestions.questions.is_empty() {
            return "No questions suggested.".to_string();
        }
        let mut s: String = suggestions
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        s.push_str("\n\n");
        s.push_str(&suggestions.source_summary);
        s
    })?;

    let Some(n) = answer else {
        return Ok(());
    };
    let question = n
        .checked_sub(1)
        .and_then(|i| suggestions.questions.get(i))
        .ok_or_else(|| {
            AppError::new("QUERY_INVALID", "No suggested question with that number")
                .with_details(format!("answer={n}; suggested={}", suggestions.questions.len()))
        })?;
    let req = AskRequest::new(question.clone(), AnswerModel::default());
    let resp = run_pipeline(cfg, &req)?;
    out.emit(&resp, || format!("Q: {question}\n\n{}", resp.answer))
}

#[derive(Serialize)]
struct StatusOutput {
    ok: bool,
    message: String,
}

pub fn glossary_set(
    cfg: &DocMentorConfig,
    out: &Output,
    term: &str,
    definition: &str,
) -> Result<(), AppError> {
    let mut glossary = GlossaryStore::load(cfg.glossary_path())?;
    let message = glossary.upsert(term, definition)?;
    out.emit(
        &StatusOutput {
            ok: true,
            message: message.clone(),
        },
        || message.clone(),
    )
}

pub fn glossary_show(cfg: &DocMentorConfig) -> Result<(), AppError> {
    let glossary = GlossaryStore::load(cfg.glossary_path())?;
    // Already JSON, regardless of --json.
    println!("{}", glossary.to_pretty_json()?);
    Ok(())
}

pub fn glossary_suggest(cfg: &DocMentorConfig, out: &Output, query: &str) -> Result<(), AppError> {
    let glossary = GlossaryStore::load(cfg.glossary_path())?;
    let terms = glossary.suggest_terms(query);
    out.emit(&terms, || {
        if terms.is_empty() {
            "No matching glossary terms.".to_string()
        } else {
            terms.join("\n")
        }
    })
}

pub fn history(cfg: &DocMentorConfig, out: &Output) -> Result<(), AppError> {
    let history = HistoryStore::load(cfg.history_path())?;
    out.emit(&history.records(), || {
        if history.is_empty() {
            "No questions asked yet.".to_string()
        } else {
            history.text()
        }
    })
}

#[derive(Serialize)]
struct StatsOutput {
    chunks: usize,
    dims: Option<usize>,
    sources: std::collections::BTreeMap<String, usize>,
}

pub fn stats(cfg: &DocMentorConfig, out: &Output) -> Result<(), AppError> {
    let store = open_store(cfg)?;
    let stats = StatsOutput {
        chunks: store.count()?,
        dims: store.dims()?,
        sources: store.source_counts()?,
    };
    out.emit(&stats, || {
        format!(
            "{}\n\nTotal: {} chunks",
            render_chunk_counts(&stats.sources),
            stats.chunks
        )
    })
}

pub fn health(cfg: &DocMentorConfig, out: &Output) -> Result<(), AppError> {
    let client = ollama(cfg)?;
    client.health_check()?;
    let status = StatusOutput {
        ok: true,
        message: format!("Ollama reachable at {}", client.base_url()),
    };
    out.emit(&status, || status.message.clone())
}
