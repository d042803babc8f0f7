use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::persist::{read_json_optional, write_json_atomic};

/// Lowercase + trim; the only form in which terms are stored or looked up.
pub fn normalize_term(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Curated term -> definition mapping backed by a JSON object file.
///
/// Every successful edit rewrites the whole file; there are no partial updates.
#[derive(Debug, Clone)]
pub struct GlossaryStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl GlossaryStore {
    /// Load from `path`. A missing file is an empty glossary.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let raw: Option<BTreeMap<String, String>> =
            read_json_optional(&path, "GLOSSARY_LOAD_FAILED", "glossary")?;
        let entries = match raw {
            Some(map) => map
                .into_iter()
                .map(|(k, v)| (normalize_term(&k), v))
                .collect(),
            None => {
                tracing::info!(path = %path.display(), "glossary file not found; starting empty");
                BTreeMap::new()
            }
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Exact lookup of the normalized form of `term`.
    pub fn lookup(&self, term: &str) -> Option<&str> {
        self.entries.get(&normalize_term(term)).map(|s| s.as_str())
    }

    /// Insert or replace a definition and flush the whole glossary.
    ///
    /// Returns a status line naming the normalized term.
    pub fn upsert(&mut self, term: &str, definition: &str) -> Result<String, AppError> {
        let key = normalize_term(term);
        if key.is_empty() {
            return Err(AppError::new(
                "GLOSSARY_INVALID",
                "Glossary term must not be empty",
            ));
        }

        let previous = self.entries.insert(key.clone(), definition.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key, old),
                None => self.entries.remove(&key),
            };
            return Err(e);
        }

        tracing::info!(term = %key, "glossary updated");
        let safe: String = key.chars().filter(|c| (*c as u32) < 256).collect();
        Ok(format!("Glossary updated: '{safe}'"))
    }

    fn flush(&self) -> Result<(), AppError> {
        write_json_atomic(&self.path, &self.entries, "GLOSSARY_WRITE_FAILED", "glossary")
    }

    /// Terms related to a partially typed query: the query is contained in the term, or the
    /// term in the query.
    pub fn suggest_terms(&self, query: &str) -> Vec<String> {
        let q = normalize_term(query);
        if q.is_empty() {
            return Vec::new();
        }
        self.entries
            .keys()
            .filter(|term| term.contains(q.as_str()) || q.contains(term.as_str()))
            .cloned()
            .collect()
    }

    /// Terms that occur verbatim in `text` (case-insensitive).
    pub fn terms_in_text(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.entries
            .keys()
            .filter(|term| lower.contains(term.as_str()))
            .cloned()
            .collect()
    }

    pub fn to_pretty_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| {
            AppError::new("GLOSSARY_INVALID", "Failed to encode glossary").with_details(e.to_string())
        })
    }
}
