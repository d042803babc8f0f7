//! Sentence-ish chunking of extracted document text.
//!
//! Text is whitespace-normalized, then cut into units on `". "`. This is a heuristic, not
//! sentence detection: abbreviations ("e.g. ") and decimals followed by a space mis-split.
//! Units are accumulated greedily into chunks shorter than `max_length` characters.
//!
//! Overlap is measured in characters: after a chunk closes, the next chunk restarts at the
//! trailing units of the previous one whose combined length (joined by single spaces) does
//! not exceed `overlap`. The restart point never moves back past `start + 1`, so every
//! iteration makes progress even when one unit alone is longer than `max_length`. Overlap
//! is dropped when keeping it would leave no room for the first new unit, so every chunk
//! after the first ends past the previous one.

pub const DEFAULT_MAX_LENGTH: usize = 2000;
pub const DEFAULT_OVERLAP: usize = 200;

const UNIT_DELIMITER: &str = ". ";

/// Collapse whitespace runs to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into units, restoring the period the delimiter consumed.
///
/// Joining the units with single spaces reproduces the normalized text exactly.
fn split_units(normalized: &str) -> Vec<String> {
    let pieces: Vec<&str> = normalized.split(UNIT_DELIMITER).collect();
    let last = pieces.len().saturating_sub(1);
    pieces
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i < last {
                format!("{p}.")
            } else {
                p.to_string()
            }
        })
        .collect()
}

pub fn chunk_text(text: &str, max_length: usize, overlap: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let units = split_units(&normalized);
    let lens: Vec<usize> = units.iter().map(|u| u.chars().count()).collect();
    let n = units.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < n {
        // The first unit is always taken; an oversized unit becomes a chunk of its own.
        let mut end = start + 1;
        let mut len = lens[start];
        while end < n && len + 1 + lens[end] < max_length {
            len += 1 + lens[end];
            end += 1;
        }

        chunks.push(units[start..end].join(" ").trim_end().to_string());
        if end == n {
            break;
        }

        let mut next = end;
        let mut carried = 0usize;
        while next > start + 1 {
            let sep = if carried > 0 { 1 } else { 0 };
            let add = lens[next - 1] + sep;
            if carried + add > overlap {
                break;
            }
            carried += add;
            next -= 1;
        }
        // The carried units must leave room for unit `end`, or the next chunk would
        // repeat only what this one already holds.
        if next < end && carried + 1 + lens[end] >= max_length {
            next = end;
        }
        start = next;
    }

    chunks
}
