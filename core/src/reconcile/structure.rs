use crate::model::{DocumentSection, DocumentStructure};
use regex::Regex;
use std::sync::OnceLock;

/// Canonical section types, in document order, with their map risk level.
pub const KNOWN_SECTIONS: &[(&str, &[&str], &str)] = &[
    ("Introduction", &["introduction", "recitals", "background", "whereas"], "medium"),
    ("Definitions", &["definitions", "interpretation"], "medium"),
    ("Terms and Conditions", &["terms and conditions", "scope"], "medium"),
    ("Obligations", &["obligations", "responsibilities", "duties"], "high"),
    ("Payment Terms", &["payment", "fees", "pricing", "compensation"], "high"),
    ("Termination", &["termination", "term and termination"], "high"),
    ("Miscellaneous", &["miscellaneous", "general provisions", "general"], "medium"),
];

fn heading_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    // "7. PAYMENT TERMS", "ARTICLE 4 - Termination", "Section 2: Definitions"
    R.get_or_init(|| {
        Regex::new(r"(?mi)^\s*(?:(?:article|section)\s+)?(\d+(?:\.\d+)*)\.?\s*[:\-–]?\s*([A-Za-z][^\n]{2,80})$")
            .expect("heading regex")
    })
}

fn clause_number_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?m)^\s*(\d+\.\d+(?:\.\d+)*)\b").expect("clause number regex"))
}

/// Page of a character offset: form feeds when present, otherwise proportional position.
pub fn page_of(text: &str, char_offset: usize, total_pages: u32) -> u32 {
    let total_pages = total_pages.max(1);
    let byte = text
        .char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let breaks = text.matches('\x0c').count();
    let page = if breaks > 0 {
        text[..byte].matches('\x0c').count() as u32 + 1
    } else {
        let len = text.chars().count().max(1);
        (char_offset as u64 * total_pages as u64 / len as u64) as u32 + 1
    };
    page.clamp(1, total_pages)
}

/// Section type for a heading, if it is one of the recognized kinds.
pub fn classify_heading(heading: &str) -> Option<(&'static str, &'static str)> {
    let lower = heading.to_lowercase();
    KNOWN_SECTIONS
        .iter()
        .find(|(_, keys, _)| keys.iter().any(|k| lower.contains(k)))
        .map(|(name, _, level)| (*name, *level))
}

struct Heading {
    title: String,
    char_start: usize,
    byte_start: usize,
}

fn top_level_headings(text: &str) -> Vec<Heading> {
    heading_regex()
        .captures_iter(text)
        .filter(|c| !c[1].contains('.'))
        .filter_map(|c| {
            let whole = c.get(0)?;
            let title = c[2].trim().trim_end_matches('.').to_string();
            // headings are short; full sentences are clause bodies
            if title.split_whitespace().count() > 8 {
                return None;
            }
            Some(Heading {
                title,
                char_start: text[..whole.start()].chars().count(),
                byte_start: whole.start(),
            })
        })
        .collect()
}

/// Sections from numbered top-level headings, each with its page span and sub-clause numbers.
pub fn detect_structure(text: &str, total_pages: u32) -> DocumentStructure {
    let headings = top_level_headings(text);
    let mut sections = Vec::with_capacity(headings.len());
    for (i, h) in headings.iter().enumerate() {
        let (end_byte, end_char) = match headings.get(i + 1) {
            Some(next) => (next.byte_start, next.char_start.saturating_sub(1)),
            None => (text.len(), text.chars().count().saturating_sub(1)),
        };
        let body = &text[h.byte_start..end_byte];
        let clauses = clause_number_regex()
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect();
        let risk_level = classify_heading(&h.title)
            .map(|(_, level)| level)
            .unwrap_or("low");
        sections.push(DocumentSection {
            title: h.title.clone(),
            start_page: page_of(text, h.char_start, total_pages),
            end_page: page_of(text, end_char.max(h.char_start), total_pages),
            clauses,
            risk_level: risk_level.to_string(),
        });
    }
    DocumentStructure {
        sections,
        total_pages,
    }
}
