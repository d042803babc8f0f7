use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let entries = match fs::read_dir(&p) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

#[test]
fn only_ollama_modules_touch_the_network() {
    // Guardrail: HTTP stays behind the Embedder/Llm traits.
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    let files = collect_rs_files(&src_root);
    assert!(!files.is_empty());

    let allowed = ["ollama.rs", "ollama_embed.rs", "ollama_llm.rs"];
    for f in files {
        let name = f.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        if allowed.contains(&name) {
            continue;
        }
        let text = fs::read_to_string(&f).unwrap_or_default();
        assert!(
            !text.contains("ureq::"),
            "network call outside the ollama modules in {}",
            f.display()
        );
    }
}

#[test]
fn pipeline_does_not_write_the_glossary() {
    // The query path reads the glossary; edits go through the glossary commands only.
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/pipeline/mod.rs");
    let text = fs::read_to_string(path).unwrap();
    assert!(!text.contains(".upsert("));
    assert!(text.contains("glossary: &'a GlossaryStore"));
}
