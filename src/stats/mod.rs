//! Local statistics
//!
//! Fast regex and counter passes over manuscript text. None of these touch
//! the network or the store: they are pure functions of their input, so the
//! same text always yields the same numbers. The results are embedded in
//! prompts as hints and attached to module reports.
//!
//! # Sentence splitting
//!
//! Two splitters exist because different passes need different things:
//! [`count_sentences`] splits on runs of `.`, `!`, `?` and counts non-blank
//! pieces; [`split_sentences`] cuts after terminal punctuation that is
//! followed by whitespace and keeps the sentences themselves. Neither knows
//! about abbreviations, so "Dr. Smith" counts as two sentences.

pub mod citations;
pub mod dialogue;
pub mod passive;
pub mod prose;

pub use citations::{detect_citations, CitationStats};
pub use dialogue::{
    character_names, dialogue_passages, dialogue_stats, ChapterDialogue, DialogueStats, NameCount,
};
pub use passive::{passive_voice_stats, ChapterPassive, PassiveVoiceStats};
pub use prose::{prose_stats, ChapterFilterStats, FilterVocabulary, ProseStats, FILTER_WORDS};

use crate::text::Chapter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static TERMINAL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());
static DIALOGUE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]{10,}""#).unwrap());

const WORD_TRIM: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '-'];

/// A word (or phrase) with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterWordCount {
    pub chapter: usize,
    pub title: String,
    pub word_count: usize,
}

/// Whole-manuscript numbers used by the structural scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub avg_sentence_length: f64,
    pub dialogue_lines: usize,
    pub chapter_count: usize,
    pub chapter_word_counts: Vec<ChapterWordCount>,
    pub most_common_words: Vec<WordCount>,
}

/// Count sentences by splitting on runs of terminal punctuation.
pub fn count_sentences(text: &str) -> usize {
    TERMINAL_RUN
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Split after `.`, `!` or `?` when followed by whitespace.
///
/// The whitespace run is dropped; pieces may be blank at the edges.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BOUNDARY.find_iter(text) {
        // Terminal punctuation is a single ASCII byte.
        let cut = m.start() + 1;
        pieces.push(&text[start..cut]);
        start = m.end();
    }
    pieces.push(&text[start..]);
    pieces
}

/// Lowercase a token and strip surrounding punctuation.
pub(crate) fn clean_word(word: &str) -> String {
    word.to_lowercase().trim_matches(WORD_TRIM).to_string()
}

/// Count items, most frequent first; ties keep first-seen order.
pub(crate) fn tally<I>(items: I) -> Vec<WordCount>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<WordCount> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push(WordCount {
                    word: item,
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the structural scan statistics.
pub fn manuscript_stats(text: &str, chapters: &[Chapter]) -> ManuscriptStats {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let sentence_count = count_sentences(text);

    let mut most_common_words = tally(
        words
            .iter()
            .filter(|w| w.chars().count() > 2)
            .map(|w| clean_word(w))
            .filter(|w| !w.is_empty()),
    );
    most_common_words.truncate(100);

    ManuscriptStats {
        word_count,
        sentence_count,
        paragraph_count: text.split("\n\n").filter(|p| !p.trim().is_empty()).count(),
        avg_sentence_length: round1(word_count as f64 / sentence_count.max(1) as f64),
        dialogue_lines: DIALOGUE_LINE.find_iter(text).count(),
        chapter_count: chapters.len(),
        chapter_word_counts: chapters
            .iter()
            .map(|ch| ChapterWordCount {
                chapter: ch.number(),
                title: ch.title.clone(),
                word_count: ch.text.split_whitespace().count(),
            })
            .collect(),
        most_common_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::detect_chapters;

    #[test]
    fn count_sentences_ignores_blank_pieces() {
        assert_eq!(count_sentences("One. Two! Three?"), 3);
        assert_eq!(count_sentences("Wait...what?!"), 2);
        assert_eq!(count_sentences("   "), 0);
    }

    #[test]
    fn abbreviations_are_split_naively() {
        // Known heuristic limitation: no abbreviation handling.
        assert_eq!(count_sentences("Dr. Smith arrived."), 2);
        assert_eq!(split_sentences("Dr. Smith arrived."), vec!["Dr.", "Smith arrived."]);
    }

    #[test]
    fn split_sentences_keeps_punctuation() {
        let pieces = split_sentences("Go now! Are you sure?  Yes.");
        assert_eq!(pieces, vec!["Go now!", "Are you sure?", "Yes."]);
    }

    #[test]
    fn split_sentences_needs_whitespace_after_punctuation() {
        assert_eq!(split_sentences("a.b c"), vec!["a.b c"]);
    }

    #[test]
    fn tally_orders_by_count_then_first_seen() {
        let counts = tally(["b", "a", "a", "c", "b", "d"].iter().map(|s| s.to_string()));
        let words: Vec<&str> = counts.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn manuscript_stats_counts() {
        let text = "Chapter 1: Rain\nThe rain fell. \"Where is the umbrella?\" she asked.\n\nChapter 2: Sun\nThe sun rose.";
        let chapters = detect_chapters(text);
        let stats = manuscript_stats(text, &chapters);

        assert_eq!(stats.word_count, 18);
        assert_eq!(stats.paragraph_count, 2);
        assert_eq!(stats.dialogue_lines, 1);
        assert_eq!(stats.chapter_count, 2);
        assert_eq!(stats.chapter_word_counts[1].chapter, 2);
        assert_eq!(stats.chapter_word_counts[1].word_count, 6);
        assert_eq!(stats.most_common_words[0].word, "the");
    }

    #[test]
    fn manuscript_stats_are_deterministic() {
        let text = "Anna met Bruno. Bruno smiled. \"Hello there, Anna,\" he said.";
        let chapters = detect_chapters(text);
        assert_eq!(manuscript_stats(text, &chapters), manuscript_stats(text, &chapters));
    }
}
