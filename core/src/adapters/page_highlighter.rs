use crate::adapters::interface::{HighlightTarget, Highlighter};
use crate::adapters::text_source::split_pages;
use crate::error::{CoreError, CoreResult};
use crate::mapping::highlight::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub page: u32,
    pub target: HighlightTarget,
    pub color: Rgb,
    pub opacity: f32,
    pub note: String,
}

/// Plans annotations against extracted page text instead of drawing into a PDF.
/// Text spans are matched case-insensitively on word edges; one annotation per occurrence.
#[derive(Debug, Clone, Default)]
pub struct PageTextHighlighter {
    pages: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl PageTextHighlighter {
    pub fn new(document_text: &str) -> Self {
        Self {
            pages: split_pages(document_text)
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
            annotations: Vec::new(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Occurrences of `needle` whose alphanumeric edges are not glued to a neighbouring
/// letter or digit, so "ip" does not land inside "shipping".
fn count_word_matches(haystack: &str, needle: &str) -> usize {
    let starts_word = needle.chars().next().is_some_and(char::is_alphanumeric);
    let ends_word = needle.chars().next_back().is_some_and(char::is_alphanumeric);
    haystack
        .match_indices(needle)
        .filter(|(at, m)| {
            let before_ok = !starts_word
                || !haystack[..*at].chars().next_back().is_some_and(char::is_alphanumeric);
            let after_ok = !ends_word
                || !haystack[at + m.len()..].chars().next().is_some_and(char::is_alphanumeric);
            before_ok && after_ok
        })
        .count()
}

impl Highlighter for PageTextHighlighter {
    fn add_highlight(
        &mut self,
        page: u32,
        target: &HighlightTarget,
        color: Rgb,
        opacity: f32,
        note: &str,
    ) -> CoreResult<usize> {
        let idx = page
            .checked_sub(1)
            .filter(|i| (*i as usize) < self.pages.len())
            .ok_or_else(|| CoreError::InvalidInput(format!("page {} out of range", page)))?;
        let hits = match target {
            HighlightTarget::TextSpan(span) if span.trim().is_empty() => 0,
            HighlightTarget::TextSpan(span) => {
                count_word_matches(&self.pages[idx as usize], &span.to_lowercase())
            }
            HighlightTarget::Region(_) => 1,
        };
        for _ in 0..hits {
            self.annotations.push(Annotation {
                page,
                target: target.clone(),
                color,
                opacity,
                note: note.to_string(),
            });
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Region;

    #[test]
    fn spans_count_occurrences_per_page() {
        let mut h = PageTextHighlighter::new("Termination for cause.\x0cNo TERMINATION here. termination");
        let red = Rgb(0.937, 0.267, 0.267);
        let span = HighlightTarget::TextSpan("termination".to_string());
        assert_eq!(h.add_highlight(1, &span, red, 0.4, "note").unwrap(), 1);
        assert_eq!(h.add_highlight(2, &span, red, 0.4, "note").unwrap(), 2);
        assert_eq!(h.annotations.len(), 3);
    }

    #[test]
    fn spans_do_not_match_inside_words() {
        let mut h = PageTextHighlighter::new(
            "The relationship covers shipping to each recipient. All IP stays with Licensor (IP, patents).",
        );
        let span = HighlightTarget::TextSpan("IP".to_string());
        assert_eq!(h.add_highlight(1, &span, Rgb(0.0, 0.0, 0.0), 0.4, "").unwrap(), 2);
        let clause = HighlightTarget::TextSpan("Licensor (".to_string());
        assert_eq!(h.add_highlight(1, &clause, Rgb(0.0, 0.0, 0.0), 0.4, "").unwrap(), 1);
    }

    #[test]
    fn regions_always_land_and_pages_are_checked() {
        let mut h = PageTextHighlighter::new("only page");
        let region = HighlightTarget::Region(Region { top: 10.0, left: 5.0, width: 90.0, height: 8.0 });
        assert_eq!(h.add_highlight(1, &region, Rgb(0.0, 0.5, 1.0), 0.3, "").unwrap(), 1);
        assert!(h.add_highlight(2, &region, Rgb(0.0, 0.5, 1.0), 0.3, "").is_err());
        assert!(h.add_highlight(0, &region, Rgb(0.0, 0.5, 1.0), 0.3, "").is_err());
    }
}
