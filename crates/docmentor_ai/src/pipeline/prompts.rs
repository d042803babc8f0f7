pub const GLOSSARY_OVERVIEW: &str = "**Answer from glossary.**";
pub const NO_MATCH_ANSWER: &str = "No relevant info found in documents or glossary.";
pub const NO_MATCH_RECORD: &str = "No relevant info found.";

const EXPLAIN_NOTE: &str = "\n\nExplain why this answer is correct.";

/// The question plus an optional glossary note. Retrieved context is added separately by
/// the synthesizer's request framing.
pub fn build_answer_prompt(question: &str, glossary: Option<(&str, &str)>) -> String {
    match glossary {
        Some((term, definition)) => {
            format!("{question}

Glossary definition:
{term}: {definition}")
        }
        None => question.to_string(),
    }
}

/// Context handed to the synthesizer; the explanation request follows the excerpts.
pub fn synthesis_context(context: &str, explain: bool) -> String {
    if explain {
        format!("{context}{EXPLAIN_NOTE}")
    } else {
        context.to_string()
    }
}

pub fn glossary_record_answer(definition: &str) -> String {
    format!("{definition} (from glossary)")
}

pub fn sources_overview(sources: &[String]) -> String {
    format!("**Sources:** {}", sources.join(", "))
}
