//! Persistent vector index over SQLite.
//!
//! One row per chunk, keyed by chunk id. Adding an id that already exists replaces its
//! text, vector and metadata, and makes it the most recently written row. All vectors in
//! one store share a dimension, recorded in `store_meta` on first insert.
//! Queries are an exhaustive scan; ties on distance are broken by id ascending.

use std::collections::BTreeMap;
use std::path::Path;

use docmentor_core::config::DistanceMetric;
use docmentor_core::db;
use docmentor_core::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod similarity;

const DIMS_KEY: &str = "dims";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreHit {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Fingerprint of a chunk's content as embedded by `model`.
pub fn content_fingerprint(model: &str, text: &str) -> String {
    hex::encode(Sha256::digest(format!("{model}|{text}").as_bytes()))
}

fn store_err(message: &str, e: impl std::fmt::Display) -> AppError {
    AppError::new("STORE_FAILED", message).with_details(e.to_string())
}

fn encode_vector(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

fn decode_vector(id: &str, bytes: &[u8]) -> Result<Vec<f32>, AppError> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::new("STORE_FAILED", "Stored embedding is corrupt")
            .with_details(format!("id={id}; bytes={}", bytes.len())));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

pub struct EmbeddingStore {
    conn: Connection,
    metric: DistanceMetric,
}

impl EmbeddingStore {
    pub fn open(path: &Path, metric: DistanceMetric) -> Result<Self, AppError> {
        let mut conn = db::open(path)?;
        db::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), ?metric, "embedding store opened");
        Ok(Self { conn, metric })
    }

    pub fn open_in_memory(metric: DistanceMetric) -> Result<Self, AppError> {
        let mut conn = db::open_in_memory()?;
        db::migrate(&mut conn)?;
        Ok(Self { conn, metric })
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The dimension every stored vector has, once anything has been stored.
    pub fn dims(&self) -> Result<Option<usize>, AppError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1",
                [DIMS_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_err("Failed to read index dimension", e))?;
        raw.map(|s| {
            s.parse::<usize>()
                .map_err(|e| store_err("Stored index dimension is corrupt", e))
        })
        .transpose()
    }

    pub fn count(&self) -> Result<usize, AppError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| store_err("Failed to count chunks", e))?;
        Ok(n as usize)
    }

    /// Append-or-replace by id.
    pub fn add(
        &mut self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &ChunkMetadata,
    ) -> Result<(), AppError> {
        let fingerprint = hex::encode(Sha256::digest(text.as_bytes()));
        self.add_with_fingerprint(id, text, embedding, metadata, &fingerprint)
    }

    /// [`EmbeddingStore::add`] recording a caller-chosen content fingerprint, later
    /// returned by [`EmbeddingStore::content_hash`].
    pub fn add_with_fingerprint(
        &mut self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &ChunkMetadata,
        fingerprint: &str,
    ) -> Result<(), AppError> {
        if embedding.is_empty() {
            return Err(AppError::new("STORE_FAILED", "Embedding must not be empty")
                .with_details(format!("id={id}")));
        }
        let dims = embedding.len();
        let existing = self.dims()?;
        // An emptied store may be re-dimensioned (e.g. after switching embedding models).
        if let Some(d) = existing {
            if d != dims && self.count()? > 0 {
                return Err(AppError::new(
                    "STORE_FAILED",
                    "Embedding dimension does not match the index",
                )
                .with_details(format!("id={id}; expected={d}; got={dims}")));
            }
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| store_err("Failed to start store transaction", e))?;
        if existing != Some(dims) {
            tx.execute(
                "INSERT OR REPLACE INTO store_meta(key, value) VALUES (?1, ?2)",
                params![DIMS_KEY, dims.to_string()],
            )
            .map_err(|e| store_err("Failed to record index dimension", e))?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO chunks(id, source, text, content_sha256, dims, embedding, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
            params![
                id,
                metadata.source,
                text,
                fingerprint,
                dims as i64,
                encode_vector(embedding)
            ],
        )
        .map_err(|e| store_err("Failed to write chunk", e))?;
        tx.commit()
            .map_err(|e| store_err("Failed to commit store transaction", e))?;
        Ok(())
    }

    /// The `k` nearest chunks, ascending by distance. `k` is clamped to at least 1.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<StoreHit>, AppError> {
        let k = k.max(1);
        let Some(dims) = self.dims()? else {
            return Ok(Vec::new());
        };
        if embedding.len() != dims {
            return Err(AppError::new(
                "STORE_FAILED",
                "Query embedding dimension does not match the index",
            )
            .with_details(format!("index_dims={dims}; query_dims={}", embedding.len())));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, source, text, embedding FROM chunks")
            .map_err(|e| store_err("Failed to prepare chunk scan", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })
            .map_err(|e| store_err("Failed to scan chunks", e))?;

        let query_norm = similarity::l2_norm(embedding);
        let mut hits = Vec::new();
        for r in rows {
            let (id, source, text, blob) = r.map_err(|e| store_err("Failed to read chunk row", e))?;
            let v = decode_vector(&id, &blob)?;
            if v.len() != dims {
                return Err(AppError::new("STORE_FAILED", "Stored vector dimension mismatch")
                    .with_details(format!("id={id}; expected={dims}; got={}", v.len())));
            }
            let distance = similarity::distance(self.metric, embedding, query_norm, &v);
            hits.push(StoreHit {
                id,
                text,
                metadata: ChunkMetadata { source },
                distance,
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(k);
        Ok(hits)
    }

    /// The `k` most recently written chunks, newest first.
    pub fn sample_recent(&self, k: usize) -> Result<Vec<StoredChunk>, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, source, text FROM chunks ORDER BY rowid DESC LIMIT ?1")
            .map_err(|e| store_err("Failed to prepare chunk sample", e))?;
        let rows = stmt
            .query_map([k as i64], |row| {
                Ok(StoredChunk {
                    id: row.get(0)?,
                    metadata: ChunkMetadata { source: row.get(1)? },
                    text: row.get(2)?,
                })
            })
            .map_err(|e| store_err("Failed to sample chunks", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| store_err("Failed to read sampled chunk", e))
    }

    pub fn content_hash(&self, id: &str) -> Result<Option<String>, AppError> {
        self.conn
            .query_row(
                "SELECT content_sha256 FROM chunks WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_err("Failed to read chunk fingerprint", e))
    }

    /// Delete every chunk of `source`. Returns the number removed.
    pub fn remove_source(&mut self, source: &str) -> Result<usize, AppError> {
        self.conn
            .execute("DELETE FROM chunks WHERE source = ?1", [source])
            .map_err(|e| store_err("Failed to remove source", e))
    }

    /// Delete chunks of `source` whose id is not in `keep_ids`. Returns the number removed.
    pub fn prune_source(&mut self, source: &str, keep_ids: &[String]) -> Result<usize, AppError> {
        let stale: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM chunks WHERE source = ?1")
                .map_err(|e| store_err("Failed to list source chunks", e))?;
            let ids = stmt
                .query_map([source], |row| row.get::<_, String>(0))
                .map_err(|e| store_err("Failed to list source chunks", e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| store_err("Failed to read source chunk id", e))?;
            ids.into_iter().filter(|id| !keep_ids.contains(id)).collect()
        };
        if stale.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| store_err("Failed to start store transaction", e))?;
        for id in &stale {
            tx.execute("DELETE FROM chunks WHERE id = ?1", [id])
                .map_err(|e| store_err("Failed to prune chunk", e))?;
        }
        tx.commit()
            .map_err(|e| store_err("Failed to commit store transaction", e))?;
        tracing::debug!(source, removed = stale.len(), "pruned stale chunks");
        Ok(stale.len())
    }

    /// Chunk count per source, sorted by source name.
    pub fn source_counts(&self) -> Result<BTreeMap<String, usize>, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, COUNT(*) FROM chunks GROUP BY source")
            .map_err(|e| store_err("Failed to prepare source counts", e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| store_err("Failed to count sources", e))?;
        let mut out = BTreeMap::new();
        for r in rows {
            let (source, n) = r.map_err(|e| store_err("Failed to read source count", e))?;
            out.insert(source, n as usize);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_round_trip_through_blobs() {
        let v = vec![0.5f32, -1.25, 3.0];
        assert_eq!(decode_vector("x", &encode_vector(&v)).unwrap(), v);
        assert_eq!(decode_vector("x", &[0, 1, 2]).unwrap_err().code, "STORE_FAILED");
    }

    #[test]
    fn fingerprint_depends_on_model() {
        assert_ne!(
            content_fingerprint("all-minilm", "text"),
            content_fingerprint("nomic-embed-text", "text")
        );
        assert_eq!(content_fingerprint("m", "t").len(), 64);
    }
}
