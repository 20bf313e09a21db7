//! Citation marker detection for academic manuscripts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static AUTHOR_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([A-Z][a-z]+(?:\s(?:&|and)\s[A-Z][a-z]+)*,\s\d{4}[a-z]?\)").unwrap()
});
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+(?:[,\-]\s*\d+)*\]").unwrap());
static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\d+|\[\^?\d+\]").unwrap());

/// Rough citation counts by style.
///
/// A bare `[3]` reads as both a numbered citation and a footnote marker and
/// is counted under each, so the total is an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationStats {
    pub estimated_citation_count: usize,
    pub apa_style_count: usize,
    pub numbered_style_count: usize,
    pub footnote_count: usize,
}

pub fn detect_citations(text: &str) -> CitationStats {
    let apa = AUTHOR_YEAR.find_iter(text).count();
    let numbered = NUMBERED.find_iter(text).count();
    let footnotes = FOOTNOTE.find_iter(text).count();
    CitationStats {
        estimated_citation_count: apa + numbered + footnotes,
        apa_style_count: apa,
        numbered_style_count: numbered,
        footnote_count: footnotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_author_year_citations() {
        let stats = detect_citations(
            "Prior work (Smith, 2019) and (Jones & Lee, 2020a) disagree with (Brown and Green, 2021).",
        );
        assert_eq!(stats.apa_style_count, 3);
        assert_eq!(stats.numbered_style_count, 0);
    }

    #[test]
    fn numbered_and_footnote_markers_overlap() {
        let stats = detect_citations("See [1], [2, 3] and [4-6]. Also^7 and [^8].");
        assert_eq!(stats.numbered_style_count, 3);
        // [1], ^7 and [^8]; "[2, 3]" and "[4-6]" are not footnote shaped
        assert_eq!(stats.footnote_count, 3);
        assert_eq!(stats.estimated_citation_count, 6);
    }
}
