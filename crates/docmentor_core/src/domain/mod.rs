use serde::{Deserialize, Serialize};

/// A document as extracted by the loader. Transient: it only lives until it has been chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Split into chunks with deterministic ids (`{source}_{index}`).
    pub fn into_chunks(self, max_length: usize, overlap: usize) -> Vec<Chunk> {
        crate::chunker::chunk_text(&self.text, max_length, overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(&self.source, i, text))
            .collect()
    }
}

/// One retrieval unit cut from a document. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub text: String,
}

impl Chunk {
    pub fn new(source: &str, index: usize, text: String) -> Self {
        Self {
            id: chunk_id(source, index),
            source: source.to_string(),
            text,
        }
    }
}

pub fn chunk_id(source: &str, index: usize) -> String {
    format!("{source}_{index}")
}

/// One question/answer pair in the query log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRecord {
    pub question: String,
    pub answer: String,
}

impl QueryRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Persisted form of a record: `Q: ...\nA: ...\n---`.
    pub fn format(&self) -> String {
        format!("Q: {}\nA: {}\n---", self.question, self.answer)
    }
}
