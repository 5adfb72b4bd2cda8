//! Prompt text sent to the generation collaborators

/// Prompt asking for sub-entities of `label`, one `Name (Type)` per line
pub fn sub_entity_prompt(label: &str) -> String {
    format!(
        "You are a knowledge graph expert in biomedical research. \
Generate 3-4 related entities, concepts, or research areas related to: \"{label}\".

Format each as a single line with the entity name and type in parentheses. Examples:
- Entity Name (Drug)
- Concept Name (Disease)
- Research Area (Trial)

Types can be: Drug, Company, Disease, Patent, Trial, Technology, Protein, Gene, Pathway, or Topic.

Return ONLY the list of entities, one per line, no numbering or additional text."
    )
}

/// Prompt asking for a whole knowledge graph over `document`, truncated to
/// at most `char_limit` characters
pub fn extraction_prompt(document: &str, char_limit: usize) -> String {
    let snippet = truncate_chars(document, char_limit);
    let marker = if snippet.len() < document.len() {
        "... (truncated)"
    } else {
        ""
    };
    format!(
        "Analyze the following pharmaceutical intelligence report and extract a Knowledge Graph representing key entities.

Text snippet:
{snippet}{marker}

Extract:
- Drugs / Molecules / Products
- Companies / Sponsors / Competitors
- Diseases / Indications
- Patents / Regulations / Trials

Return a JSON object with 'nodes' (id, label, group) and 'links' (source, target, relation).
Groups:
1 = Drug/Product
2 = Company/Sponsor
3 = Disease/Indication
4 = Patent/Regulation/Trial

Source and Target in links must match Node IDs."
    )
}

/// Longest prefix of `text` holding at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_entity_prompt_names_the_seed() {
        let prompt = sub_entity_prompt("Metformin");
        assert!(prompt.contains("\"Metformin\""));
        assert!(prompt.contains("Pathway"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("αβγδ", 2), "αβ");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn extraction_prompt_truncates_long_documents() {
        let document = "x".repeat(9000);
        let prompt = extraction_prompt(&document, 8000);
        assert!(prompt.contains(&"x".repeat(8000)));
        assert!(!prompt.contains(&"x".repeat(8001)));
        assert!(prompt.contains("(truncated)"));

        let short = extraction_prompt("short report", 8000);
        assert!(!short.contains("(truncated)"));
    }
}
