use std::collections::BTreeMap;

/// Per-source chunk counts for the current process. Rebuilt from ingestion; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    counts: BTreeMap<String, usize>,
}

impl FileStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source: &str, chunk_count: usize) {
        self.counts.insert(source.to_string(), chunk_count);
    }

    pub fn get(&self, source: &str) -> Option<usize> {
        self.counts.get(source).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn render_markdown(&self) -> String {
        render_chunk_counts(&self.counts)
    }
}

pub fn render_chunk_counts(counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::from("**Chunk Stats:**");
    for (name, count) in counts {
        out.push_str(&format!("\n- `{name}` → {count} chunks"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sorted_markdown_list() {
        let mut stats = FileStats::new();
        stats.record("b.pdf", 3);
        stats.record("a.txt", 1);
        stats.record("b.pdf", 4);
        assert_eq!(
            stats.render_markdown(),
            "**Chunk Stats:**\n- `a.txt` → 1 chunks\n- `b.pdf` → 4 chunks"
        );
        assert_eq!(stats.get("b.pdf"), Some(4));
    }
}
