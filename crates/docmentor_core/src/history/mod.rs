use std::path::{Path, PathBuf};

use crate::domain::QueryRecord;
use crate::error::AppError;
use crate::persist::{read_json_optional, write_json_atomic};

/// Append-only query log persisted as a JSON array of formatted records.
///
/// Loaded once at startup; every append flushes the full log before returning, so a crash
/// after `append` returns never loses that record. Records are never mutated or removed.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<String>,
}

impl HistoryStore {
    /// Load from `path`. A missing file is an empty log.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let records: Vec<String> =
            read_json_optional(&path, "HISTORY_LOAD_FAILED", "query history")?.unwrap_or_default();
        tracing::debug!(path = %path.display(), records = records.len(), "query history loaded");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: &QueryRecord) -> Result<(), AppError> {
        self.records.push(record.format());
        if let Err(e) = write_json_atomic(
            &self.path,
            &self.records,
            "HISTORY_WRITE_FAILED",
            "query history",
        ) {
            // Keep memory and disk in agreement.
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// All records joined by newlines, as shown to the user.
    pub fn text(&self) -> String {
        self.records.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let h = HistoryStore::load(dir.path().join("query_history.json")).unwrap();
        assert!(h.is_empty());
        assert_eq!(h.text(), "");
    }

    #[test]
    fn failed_flush_does_not_keep_the_record() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("history_dir");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let mut h = HistoryStore {
            path: path.clone(),
            records: Vec::new(),
        };
        let err = h.append(&QueryRecord::new("q", "a")).expect_err("flush should fail");
        assert_eq!(err.code, "HISTORY_WRITE_FAILED");
        assert!(h.is_empty());
    }
}
