use std::fs;

use docmentor_core::domain::QueryRecord;
use docmentor_core::glossary::GlossaryStore;
use docmentor_core::history::HistoryStore;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn glossary_survives_a_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("glossary.json");

    let mut g = GlossaryStore::load(&path).unwrap();
    assert!(g.is_empty());
    g.upsert("  Mitochondria ", "Powerhouse of the cell").unwrap();
    g.upsert("ATP", "Energy currency").unwrap();
    g.upsert("atp", "Adenosine triphosphate").unwrap();

    let reloaded = GlossaryStore::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.lookup("MITOCHONDRIA"), Some("Powerhouse of the cell"));
    assert_eq!(reloaded.lookup(" atp "), Some("Adenosine triphosphate"));
    assert_eq!(reloaded.lookup("ribosome"), None);
}

#[test]
fn glossary_keys_are_normalized_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("glossary.json");
    fs::write(&path, r#"{"  Osmosis ": "Water crossing a membrane"}"#).unwrap();

    let g = GlossaryStore::load(&path).unwrap();
    assert_eq!(g.lookup("osmosis"), Some("Water crossing a membrane"));
    assert_eq!(g.terms_in_text("Explain OSMOSIS in roots"), vec!["osmosis".to_string()]);
}

#[test]
fn corrupt_glossary_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("glossary.json");
    fs::write(&path, "{not json").unwrap();

    let err = GlossaryStore::load(&path).unwrap_err();
    assert_eq!(err.code, "GLOSSARY_LOAD_FAILED");
}

#[test]
fn glossary_preview_is_pretty_json() {
    let dir = tempdir().unwrap();
    let mut g = GlossaryStore::load(dir.path().join("glossary.json")).unwrap();
    g.upsert("enzyme", "Biological catalyst").unwrap();
    assert_eq!(g.to_pretty_json().unwrap(), "{\n  \"enzyme\": \"Biological catalyst\"\n}");
}

#[test]
fn history_appends_are_flushed_immediately() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("query_history.json");

    let mut h = HistoryStore::load(&path).unwrap();
    h.append(&QueryRecord::new("What is ATP?", "Energy currency")).unwrap();
    h.append(&QueryRecord::new("Where?", "No relevant info found.")).unwrap();

    let on_disk: Vec<String> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        vec![
            "Q: What is ATP?\nA: Energy currency\n---".to_string(),
            "Q: Where?\nA: No relevant info found.\n---".to_string(),
        ]
    );

    let reloaded = HistoryStore::load(&path).unwrap();
    assert_eq!(reloaded.records(), h.records());
    assert_eq!(
        reloaded.text(),
        "Q: What is ATP?\nA: Energy currency\n---\nQ: Where?\nA: No relevant info found.\n---"
    );
}

#[test]
fn corrupt_history_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("query_history.json");
    fs::write(&path, "[1, 2").unwrap();
    assert_eq!(HistoryStore::load(&path).unwrap_err().code, "HISTORY_LOAD_FAILED");
}
