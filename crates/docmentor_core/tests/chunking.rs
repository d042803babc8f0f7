use docmentor_core::chunker::{chunk_text, normalize_whitespace, DEFAULT_MAX_LENGTH, DEFAULT_OVERLAP};
use docmentor_core::domain::Document;
use pretty_assertions::assert_eq;

const LECTURE: &str = "Photosynthesis converts light into chemical energy. \
    It takes place in the chloroplasts of plant cells.\n\n\
    The light-dependent reactions   produce ATP and NADPH. \
    The Calvin cycle uses them to fix carbon dioxide. \
    Glucose is the main product. Oxygen is released as a by-product.";

#[test]
fn short_document_is_a_single_chunk() {
    let text = "Paris is the capital of France. It is known for the Eiffel Tower.";
    let chunks = chunk_text(text, DEFAULT_MAX_LENGTH, DEFAULT_OVERLAP);
    assert_eq!(chunks, vec![text.to_string()]);
}

#[test]
fn zero_overlap_chunks_reconstruct_the_normalized_text() {
    for max_length in [20, 60, 120, 400] {
        let chunks = chunk_text(LECTURE, max_length, 0);
        assert!(!chunks.is_empty());
        assert_eq!(chunks.join(" "), normalize_whitespace(LECTURE), "max_length={max_length}");
    }
}

/// Byte span of every chunk inside the normalized text, located left to right.
fn chunk_spans(normalized: &str, chunks: &[String]) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for chunk in chunks {
        let from = spans.last().map(|(s, _)| s + 1).unwrap_or(0);
        let offset = normalized[from..]
            .find(chunk.as_str())
            .unwrap_or_else(|| panic!("chunk not found in order: {chunk:?}"));
        spans.push((from + offset, from + offset + chunk.len()));
    }
    spans
}

#[test]
fn overlapping_chunks_cover_the_normalized_text_in_order() {
    let normalized = normalize_whitespace(LECTURE);
    for (max_length, overlap) in [(60, 20), (80, 40), (120, 60), (110, 30)] {
        let chunks = chunk_text(LECTURE, max_length, overlap);
        let spans = chunk_spans(&normalized, &chunks);

        assert_eq!(spans[0].0, 0, "max_length={max_length} overlap={overlap}");
        let mut rebuilt = normalized[..spans[0].1].to_string();
        for pair in spans.windows(2) {
            let ((_, prev_end), (start, end)) = (pair[0], pair[1]);
            assert!(start <= prev_end + 1, "gap before {start}");
            assert!(end > prev_end, "chunk ending at {end} adds nothing");
            rebuilt.push_str(&normalized[prev_end..end]);
        }
        assert_eq!(rebuilt, normalized, "max_length={max_length} overlap={overlap}");
    }
}

#[test]
fn overlap_is_dropped_when_the_next_unit_would_not_fit() {
    let long = format!("{}.", "C".repeat(100));
    let text = format!("Aaaaaaaaa. Bbbbbbbbb. {long}");
    assert_eq!(
        chunk_text(&text, 50, 15),
        vec!["Aaaaaaaaa. Bbbbbbbbb.".to_string(), long]
    );
}

#[test]
fn multi_unit_chunks_stay_under_max_length() {
    let max_length = 110;
    for chunk in chunk_text(LECTURE, max_length, 30) {
        let single_unit = !chunk.trim_end_matches('.').contains(". ");
        assert!(
            chunk.chars().count() < max_length || single_unit,
            "chunk too long: {chunk:?}"
        );
    }
}

#[test]
fn chunking_is_deterministic() {
    assert_eq!(chunk_text(LECTURE, 80, 40), chunk_text(LECTURE, 80, 40));
}

#[test]
fn overlap_is_counted_in_characters() {
    let text = "Aaaa. Bbbb. Cccc. Dddd.";

    // A five-character unit fits into a five-character overlap window...
    assert_eq!(
        chunk_text(text, 12, 5),
        vec!["Aaaa. Bbbb.", "Bbbb. Cccc.", "Cccc. Dddd."]
    );
    // ...but not into a four-character one.
    assert_eq!(chunk_text(text, 12, 4), vec!["Aaaa. Bbbb.", "Cccc. Dddd."]);
}

#[test]
fn overlap_never_stalls_on_oversized_units() {
    let big = "word ".repeat(40);
    let text = format!("{big}. {big}. {big}.");
    let chunks = chunk_text(&text, 50, 10_000);
    assert_eq!(chunks.len(), 3);
}

#[test]
fn document_chunks_are_numbered_per_source() {
    let chunks = Document::new("bio.txt", LECTURE).into_chunks(60, 0);
    let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
    let expected: Vec<String> = (0..chunks.len()).map(|i| format!("bio.txt_{i}")).collect();
    assert_eq!(ids, expected);
    assert!(chunks.iter().all(|c| c.source == "bio.txt"));
}
