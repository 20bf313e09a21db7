//! Chapter detection
//!
//! A priority cascade of heading heuristics. The first strategy that finds
//! at least two headings wins; a single match is treated as noise and the
//! cascade moves on. When nothing qualifies, the whole text becomes one
//! chapter titled "Full Manuscript".
//!
//! Chapters always partition the input: each heading starts a chapter that
//! runs to the next heading, and any preamble before the first heading is
//! folded into the first chapter. Concatenating every chapter's `text` in
//! order gives back the input unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*chapter[ \t]+(?:\d+|[ivxlc]+)\b[^\n]*").unwrap()
});

static CAPS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([A-Z][A-Z \t]{2,40})\r?$").unwrap());

/// A capitalized line after at least three blank lines, i.e. four or more
/// consecutive newlines. Two blank lines (a scene break in many drafts)
/// are not a chapter boundary.
static BLANK_RUN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\r?\n){3,}([A-Z][^\n]*)").unwrap());

/// Title given to the single chapter produced by the fallback.
pub const FULL_MANUSCRIPT_TITLE: &str = "Full Manuscript";

/// One detected chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Zero-based position; users see `index + 1`.
    pub index: usize,
    pub title: String,
    /// Raw chapter text, heading line included.
    pub text: String,
    pub word_count: usize,
    /// Byte offset of the chapter in the source text.
    pub start_offset: usize,
}

impl Chapter {
    /// One-based chapter number.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Which heuristic produced the chapter boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStrategy {
    /// `Chapter 12: ...` / `CHAPTER IV` lines
    Numbered,
    /// Short ALL-CAPS lines
    AllCaps,
    /// A capitalized line after three or more blank lines
    BlankLines,
    /// No headings found; one chapter for everything
    Fallback,
}

/// Detect chapters in normalized manuscript text.
pub fn detect_chapters(text: &str) -> Vec<Chapter> {
    detect_chapters_with_strategy(text).1
}

/// Detect chapters and report which strategy won.
pub fn detect_chapters_with_strategy(text: &str) -> (HeadingStrategy, Vec<Chapter>) {
    let numbered: Vec<(usize, String)> = NUMBERED_HEADING
        .find_iter(text)
        .map(|m| (m.start(), m.as_str().trim().to_string()))
        .collect();
    if numbered.len() >= 2 {
        return (HeadingStrategy::Numbered, partition(text, &numbered));
    }

    let caps: Vec<(usize, String)> = CAPS_HEADING
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter(|m| m.as_str().trim().len() > 3)
        .map(|m| (m.start(), m.as_str().trim().to_string()))
        .collect();
    if caps.len() >= 2 {
        return (HeadingStrategy::AllCaps, partition(text, &caps));
    }

    let blank_runs: Vec<(usize, String)> = BLANK_RUN_HEADING
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| (m.start(), m.as_str().trim().to_string()))
        .collect();
    if blank_runs.len() >= 2 {
        return (HeadingStrategy::BlankLines, partition(text, &blank_runs));
    }

    let fallback = Chapter {
        index: 0,
        title: FULL_MANUSCRIPT_TITLE.to_string(),
        text: text.to_string(),
        word_count: text.split_whitespace().count(),
        start_offset: 0,
    };
    (HeadingStrategy::Fallback, vec![fallback])
}

/// Cut `text` at each heading start. The first chapter absorbs any preamble.
fn partition(text: &str, headings: &[(usize, String)]) -> Vec<Chapter> {
    headings
        .iter()
        .enumerate()
        .map(|(i, (start, title))| {
            let start = if i == 0 { 0 } else { *start };
            let end = headings.get(i + 1).map(|(s, _)| *s).unwrap_or(text.len());
            let body = &text[start..end];
            Chapter {
                index: i,
                title: title.clone(),
                text: body.to_string(),
                word_count: body.split_whitespace().count(),
                start_offset: start,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(chapters: &[Chapter]) -> String {
        chapters.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn two_numbered_headings_yield_two_chapters() {
        let text = "Chapter 1: A\nShe walked in.\nChapter 2: B\nShe walked out.\n";
        let (strategy, chapters) = detect_chapters_with_strategy(text);

        assert_eq!(strategy, HeadingStrategy::Numbered);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Chapter 1: A");
        assert_eq!(chapters[1].title, "Chapter 2: B");
        assert_eq!(chapters[1].start_offset, text.find("Chapter 2").unwrap());
    }

    #[test]
    fn numbered_headings_accept_roman_numerals_any_case() {
        let text = "chapter i\nOne.\nCHAPTER II. The Return\nTwo.\nChapter III\nThree.";
        let chapters = detect_chapters(text);
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[1].title, "CHAPTER II. The Return");
        assert_eq!(chapters[2].title, "Chapter III");
    }

    #[test]
    fn chapter_word_is_not_a_heading_without_numeral() {
        let text = "Chapter and verse were quoted.\nChapter 1\nBody.\n";
        let (strategy, chapters) = detect_chapters_with_strategy(text);
        // One numbered match only, so the cascade falls through to the end.
        assert_eq!(strategy, HeadingStrategy::Fallback);
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn single_numbered_heading_falls_through_to_caps() {
        let text = "Chapter 1: Only\nintro text\nTHE RIVER\nwater\nTHE MOUNTAIN\nrock\n";
        let (strategy, chapters) = detect_chapters_with_strategy(text);
        assert_eq!(strategy, HeadingStrategy::AllCaps);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "THE RIVER");
        assert_eq!(chapters[1].title, "THE MOUNTAIN");
    }

    #[test]
    fn caps_headings_must_be_longer_than_three_chars() {
        let text = "ABC\nsome text\nXYZ\nmore text\n";
        let (strategy, _) = detect_chapters_with_strategy(text);
        assert_eq!(strategy, HeadingStrategy::Fallback);
    }

    #[test]
    fn blank_line_runs_mark_boundaries() {
        let text = "opening line\n\n\n\nThe Storm\nrain fell\n\n\n\nAfter Rain\nsun came\n";
        let (strategy, chapters) = detect_chapters_with_strategy(text);
        assert_eq!(strategy, HeadingStrategy::BlankLines);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "The Storm");
        assert_eq!(chapters[1].title, "After Rain");
        assert!(chapters[1].text.starts_with("After Rain"));
    }

    #[test]
    fn two_blank_lines_are_not_enough() {
        let text = "a\n\n\nThe Storm\nb\n\n\nAfter Rain\nc\n";
        let (strategy, _) = detect_chapters_with_strategy(text);
        assert_eq!(strategy, HeadingStrategy::Fallback);
    }

    #[test]
    fn no_headings_yields_full_manuscript() {
        let text = "just some prose without any structure at all.";
        let chapters = detect_chapters(text);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, FULL_MANUSCRIPT_TITLE);
        assert_eq!(chapters[0].text, text);
        assert_eq!(chapters[0].word_count, 8);
        assert_eq!(chapters[0].start_offset, 0);
    }

    #[test]
    fn empty_text_still_has_one_chapter() {
        let chapters = detect_chapters("");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].word_count, 0);
    }

    #[test]
    fn chapters_partition_the_input() {
        let text = "Title Page\nby Someone\n\nChapter 1: Dawn\nLight.\n\nChapter 2: Dusk\nDark.\n\nChapter 3: Night\nStars.";
        let chapters = detect_chapters(text);

        assert_eq!(chapters.len(), 3);
        assert_eq!(rebuild(&chapters), text);
        assert_eq!(chapters[0].start_offset, 0);
        assert!(chapters[0].text.starts_with("Title Page"));
        for pair in chapters.windows(2) {
            assert!(pair[0].start_offset < pair[1].start_offset);
            assert_eq!(pair[0].start_offset + pair[0].text.len(), pair[1].start_offset);
        }
    }

    #[test]
    fn word_count_includes_heading_line() {
        let text = "Chapter 1: A\none two three\nChapter 2: B\nfour\n";
        let chapters = detect_chapters(text);
        assert_eq!(chapters[0].word_count, 6);
        assert_eq!(chapters[1].word_count, 4);
        assert_eq!(chapters[1].number(), 2);
    }

    #[test]
    fn crlf_titles_are_trimmed() {
        let text = "Chapter 1: A\r\nx\r\nChapter 2: B\r\ny\r\n";
        let chapters = detect_chapters(text);
        assert_eq!(chapters[0].title, "Chapter 1: A");
        assert_eq!(rebuild(&chapters), text);
    }
}
