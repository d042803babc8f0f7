mod support;

use std::fs;
use std::path::PathBuf;

use docmentor_ai::ingest::{ingest_files, IngestSettings};
use docmentor_ai::store::EmbeddingStore;
use docmentor_core::config::DistanceMetric;
use docmentor_core::stats::FileStats;
use pretty_assertions::assert_eq;
use support::{FailingEmbedder, KeywordEmbedder};
use tempfile::tempdir;

fn settings(max_length: usize) -> IngestSettings {
    IngestSettings {
        embed_model: "all-minilm".to_string(),
        max_length,
        overlap: 0,
    }
}

#[test]
fn batch_continues_past_bad_files() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("france.txt");
    fs::write(&good, "Paris is the capital of France. It is known for the Eiffel Tower.").unwrap();
    let unsupported = dir.path().join("slides.pptx");
    fs::write(&unsupported, b"binary").unwrap();
    let bad_pdf = dir.path().join("broken.pdf");
    fs::write(&bad_pdf, b"not a valid pdf").unwrap();
    let blank = dir.path().join("blank.txt");
    fs::write(&blank, "   \n").unwrap();
    let missing = dir.path().join("missing.txt");

    let mut store = EmbeddingStore::open_in_memory(DistanceMetric::L2).unwrap();
    let mut stats = FileStats::new();
    let paths: Vec<PathBuf> = vec![good, unsupported, bad_pdf, blank, missing];
    let report = ingest_files(
        &mut store,
        &KeywordEmbedder::default(),
        &mut stats,
        &paths,
        &settings(2000),
    );

    assert_eq!(report.files_total, 5);
    assert_eq!(report.files_embedded, 1);
    assert_eq!(report.chunks_total, 1);
    assert_eq!(report.status_line(), "Embedded 1 chunks from 1 of 5 file(s).");

    let codes: Vec<&str> = report.skipped.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["UNSUPPORTED_FORMAT", "LOAD_FAILED", "LOAD_FAILED", "LOAD_FAILED"]);
    assert!(report.skipped[1].reason.starts_with("Error loading PDF:"));

    assert_eq!(stats.get("france.txt"), Some(1));
    assert_eq!(
        stats.render_markdown(),
        "**Chunk Stats:**\n- `france.txt` → 1 chunks"
    );
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn reingest_reuses_unchanged_chunks_and_prunes_stale_ones() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "Paris is big. France is old. Eiffel is tall.").unwrap();
    let paths = vec![path.clone()];

    let mut store = EmbeddingStore::open_in_memory(DistanceMetric::L2).unwrap();
    let mut stats = FileStats::new();
    let embedder = KeywordEmbedder::default();

    // max_length 15 puts each sentence in its own chunk.
    let first = ingest_files(&mut store, &embedder, &mut stats, &paths, &settings(15));
    assert_eq!(first.chunks_total, 3);
    assert_eq!(first.chunks_reused, 0);
    assert_eq!(embedder.calls.get(), 3);

    let second = ingest_files(&mut store, &embedder, &mut stats, &paths, &settings(15));
    assert_eq!(second.chunks_reused, 3);
    assert_eq!(embedder.calls.get(), 3);

    fs::write(&path, "Paris is big. Tower is new.").unwrap();
    let third = ingest_files(&mut store, &embedder, &mut stats, &paths, &settings(15));
    assert_eq!(third.chunks_total, 2);
    assert_eq!(third.chunks_reused, 1);
    assert_eq!(embedder.calls.get(), 4);

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(stats.get("notes.txt"), Some(2));
    assert_eq!(store.source_counts().unwrap().get("notes.txt"), Some(&2));
}

#[test]
fn embedding_outage_skips_files_without_partial_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("france.txt");
    fs::write(&path, "Paris is the capital of France.").unwrap();

    let mut store = EmbeddingStore::open_in_memory(DistanceMetric::L2).unwrap();
    let mut stats = FileStats::new();
    let report = ingest_files(
        &mut store,
        &FailingEmbedder { code: "TIMEOUT" },
        &mut stats,
        &[path],
        &settings(2000),
    );

    assert_eq!(report.files_embedded, 0);
    assert_eq!(report.skipped[0].code, "TIMEOUT");
    assert_eq!(report.status_line(), "Embedded 0 chunks from 0 of 1 file(s).");
    assert_eq!(store.count().unwrap(), 0);
    assert!(stats.is_empty());
}
