use std::path::{Path, PathBuf};

use docmentor_core::domain::Document;
use docmentor_core::error::AppError;
use docmentor_core::loader;
use docmentor_core::stats::FileStats;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::store::{content_fingerprint, ChunkMetadata, EmbeddingStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    pub embed_model: String,
    pub max_length: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub files_total: usize,
    pub files_embedded: usize,
    pub chunks_total: usize,
    /// Chunks whose stored vector was still valid and was not re-embedded.
    pub chunks_reused: usize,
    pub skipped: Vec<SkippedFile>,
}

impl IngestReport {
    pub fn status_line(&self) -> String {
        format!(
            "Embedded {} chunks from {} of {} file(s).",
            self.chunks_total, self.files_embedded, self.files_total
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub chunks: usize,
    pub reused: usize,
}

/// Load, chunk, embed and store each file. Failures are per file: the file is recorded as
/// skipped and the batch moves on.
pub fn ingest_files(
    store: &mut EmbeddingStore,
    embedder: &dyn Embedder,
    stats: &mut FileStats,
    paths: &[PathBuf],
    settings: &IngestSettings,
) -> IngestReport {
    let mut report = IngestReport {
        files_total: paths.len(),
        ..IngestReport::default()
    };

    for path in paths {
        match ingest_path(store, embedder, path, settings) {
            Ok((source, outcome)) => {
                stats.record(&source, outcome.chunks);
                report.files_embedded += 1;
                report.chunks_total += outcome.chunks;
                report.chunks_reused += outcome.reused;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), code = %e.code, err = %e, "skipping file");
                report.skipped.push(SkippedFile {
                    path: path.display().to_string(),
                    code: e.code.clone(),
                    reason: match &e.details {
                        Some(d) => format!("{}: {}", e.message, d),
                        None => e.message.clone(),
                    },
                });
            }
        }
    }

    tracing::info!(
        files = report.files_total,
        embedded = report.files_embedded,
        chunks = report.chunks_total,
        reused = report.chunks_reused,
        "ingestion finished"
    );
    report
}

fn ingest_path(
    store: &mut EmbeddingStore,
    embedder: &dyn Embedder,
    path: &Path,
    settings: &IngestSettings,
) -> Result<(String, DocumentOutcome), AppError> {
    let doc = loader::load(path)?;
    if loader::is_unusable_text(&doc.text) {
        let reason = if doc.text.trim().is_empty() {
            "document has no extractable text".to_string()
        } else {
            doc.text.clone()
        };
        return Err(AppError::new("LOAD_FAILED", reason));
    }
    let source = doc.source.clone();
    let outcome = ingest_document(store, embedder, doc, settings)?;
    Ok((source, outcome))
}

/// Chunk and store one document, re-embedding only chunks whose content changed.
///
/// Every embedding is computed before anything is written, so a failure leaves the
/// source's previously stored chunks untouched.
pub fn ingest_document(
    store: &mut EmbeddingStore,
    embedder: &dyn Embedder,
    doc: Document,
    settings: &IngestSettings,
) -> Result<DocumentOutcome, AppError> {
    let source = doc.source.clone();
    let chunks = doc.into_chunks(settings.max_length, settings.overlap);
    if chunks.is_empty() {
        return Err(AppError::new("LOAD_FAILED", "document has no extractable text")
            .with_details(format!("source={source}")));
    }

    let mut pending = Vec::new();
    let mut reused = 0usize;
    for chunk in &chunks {
        let fingerprint = content_fingerprint(&settings.embed_model, &chunk.text);
        if store.content_hash(&chunk.id)?.as_deref() == Some(fingerprint.as_str()) {
            reused += 1;
            continue;
        }
        let v = embedder
            .embed(&settings.embed_model, &chunk.text)
            .map_err(|e| embed_error(e, &format!("chunk_id={}", chunk.id)))?;
        pending.push((chunk, v, fingerprint));
    }

    let metadata = ChunkMetadata {
        source: source.clone(),
    };
    for (chunk, v, fingerprint) in &pending {
        store.add_with_fingerprint(&chunk.id, &chunk.text, v, &metadata, fingerprint)?;
    }
    let keep: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
    store.prune_source(&source, &keep)?;

    tracing::info!(source = %source, chunks = chunks.len(), reused, "document embedded");
    Ok(DocumentOutcome {
        chunks: chunks.len(),
        reused,
    })
}

/// Keep `TIMEOUT` as is; anything else is an embedding failure for this chunk.
pub(crate) fn embed_error(e: AppError, what: &str) -> AppError {
    if e.is_timeout() {
        return e;
    }
    let retryable = e.retryable;
    AppError::new("EMBEDDING_FAILED", "Failed to compute embeddings")
        .with_details(format!("{what}; err={e}"))
        .with_retryable(retryable)
}
