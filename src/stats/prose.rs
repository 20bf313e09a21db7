//! Filter words, recurring vocabulary and sentence rhythm.

use super::{clean_word, round1, round2, split_sentences, tally, WordCount};
use crate::text::Chapter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hedging and filtering words/phrases counted by the prose pass.
pub const FILTER_WORDS: [&str; 31] = [
    "seemed", "appeared", "felt", "noticed", "realized", "wondered",
    "thought", "knew", "saw", "heard", "watched", "looked",
    "began to", "started to", "tried to", "managed to",
    "somewhat", "slightly", "a bit", "a little", "rather",
    "very", "really", "quite", "just", "actually", "basically",
    "practically", "virtually", "literally", "simply",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "of", "with", "by", "is", "was", "are", "were", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "will", "would", "could",
    "should", "may", "might", "shall", "can", "that", "this", "it", "its",
    "not", "no", "from", "as", "he", "she", "they", "them", "his", "her",
    "their", "my", "your", "our", "we", "you", "me", "him", "who", "what",
    "which", "when", "where", "how", "all", "each", "every", "both",
    "few", "more", "most", "other", "some", "such", "than", "too",
    "into", "over", "after", "before", "between", "out", "up", "down",
    "then", "so", "if", "about", "there", "here", "said", "like",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

static STANDARD_VOCABULARY: Lazy<FilterVocabulary> =
    Lazy::new(|| FilterVocabulary::new(FILTER_WORDS).unwrap());

/// A set of words/phrases matched whole-word and case-insensitively.
#[derive(Debug, Clone)]
pub struct FilterVocabulary {
    patterns: Vec<(String, Regex)>,
}

impl FilterVocabulary {
    pub fn new<I, S>(words: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = words
            .into_iter()
            .map(|w| {
                let word = w.as_ref().to_lowercase();
                let re = Regex::new(&format!(r"\b{}\b", regex::escape(&word)))?;
                Ok((word, re))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    /// The built-in hedging vocabulary.
    pub fn standard() -> &'static FilterVocabulary {
        &STANDARD_VOCABULARY
    }

    /// Non-zero counts, most frequent first.
    pub fn count(&self, text: &str) -> Vec<WordCount> {
        let lower = text.to_lowercase();
        let mut counts: Vec<WordCount> = self
            .patterns
            .iter()
            .map(|(word, re)| WordCount {
                word: word.clone(),
                count: re.find_iter(&lower).count(),
            })
            .filter(|c| c.count > 0)
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Total matches across the vocabulary.
    pub fn total(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        self.patterns
            .iter()
            .map(|(_, re)| re.find_iter(&lower).count())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterFilterStats {
    pub chapter: usize,
    pub title: String,
    pub filter_word_count: usize,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProseStats {
    pub word_count: usize,
    pub filter_word_counts: Vec<WordCount>,
    pub total_filter_words: usize,
    pub filter_density_per_1000: f64,
    pub avg_sentence_length: f64,
    pub sentence_length_variance: f64,
    pub sentence_count: usize,
    pub top_recurring: Vec<WordCount>,
    pub chapter_filter_stats: Vec<ChapterFilterStats>,
}

/// Compute the prose pass over the whole text and each chapter.
pub fn prose_stats(text: &str, chapters: &[Chapter]) -> ProseStats {
    let vocabulary = FilterVocabulary::standard();
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();

    let filter_word_counts = vocabulary.count(text);
    let total_filter_words: usize = filter_word_counts.iter().map(|c| c.count).sum();

    let lengths: Vec<usize> = split_sentences(text)
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split_whitespace().count())
        .collect();
    let mean = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;
    let variance = if lengths.is_empty() {
        0.0
    } else {
        lengths
            .iter()
            .map(|&l| (l as f64 - mean).powi(2))
            .sum::<f64>()
            / lengths.len() as f64
    };

    let mut top_recurring = tally(
        words
            .iter()
            .filter(|w| w.chars().count() > 2)
            .map(|w| clean_word(w))
            .filter(|w| !w.is_empty() && !STOP_SET.contains(w.as_str())),
    );
    top_recurring.truncate(50);

    let density = if word_count == 0 {
        0.0
    } else {
        total_filter_words as f64 / word_count as f64 * 1000.0
    };

    ProseStats {
        word_count,
        filter_word_counts,
        total_filter_words,
        filter_density_per_1000: round2(density),
        avg_sentence_length: round1(mean),
        sentence_length_variance: round1(variance),
        sentence_count: lengths.len(),
        top_recurring,
        chapter_filter_stats: chapters
            .iter()
            .map(|ch| ChapterFilterStats {
                chapter: ch.number(),
                title: ch.title.clone(),
                filter_word_count: vocabulary.total(&ch.text),
                word_count: ch.word_count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::detect_chapters;

    #[test]
    fn counts_repeated_filter_word() {
        let vocab = FilterVocabulary::new(["just"]).unwrap();
        let counts = vocab.count("She just wanted to just leave.");
        assert_eq!(counts, vec![WordCount { word: "just".into(), count: 2 }]);
    }

    #[test]
    fn matches_are_whole_word_and_case_insensitive() {
        let vocab = FilterVocabulary::standard();
        // "justice" and "seemedly" are not filter words
        assert_eq!(vocab.total("Justice seemedly prevailed."), 0);
        assert_eq!(vocab.total("JUST as she Began To speak"), 2);
    }

    #[test]
    fn standard_vocabulary_has_thirty_one_entries() {
        assert_eq!(FILTER_WORDS.len(), 31);
        assert_eq!(FilterVocabulary::standard().patterns.len(), 31);
    }

    #[test]
    fn prose_stats_density_and_ordering() {
        let text = "She felt tired. She really felt it. It was very late.";
        let chapters = detect_chapters(text);
        let stats = prose_stats(text, &chapters);

        assert_eq!(stats.word_count, 11);
        assert_eq!(stats.total_filter_words, 4);
        assert_eq!(stats.filter_word_counts[0], WordCount { word: "felt".into(), count: 2 });
        assert_eq!(stats.filter_density_per_1000, 363.64);
        assert_eq!(stats.sentence_count, 3);
        assert_eq!(stats.chapter_filter_stats[0].filter_word_count, 4);
    }

    #[test]
    fn recurring_words_exclude_stop_words() {
        let text = "The lantern swung. The lantern dimmed. The river ran.";
        let stats = prose_stats(text, &detect_chapters(text));
        assert_eq!(stats.top_recurring[0], WordCount { word: "lantern".into(), count: 2 });
        assert!(stats.top_recurring.iter().all(|w| w.word != "the"));
    }

    #[test]
    fn variance_of_uniform_sentences_is_zero() {
        let text = "One two. Three four. Five six.";
        let stats = prose_stats(text, &detect_chapters(text));
        assert_eq!(stats.avg_sentence_length, 2.0);
        assert_eq!(stats.sentence_length_variance, 0.0);
    }

    #[test]
    fn empty_text_has_zero_density() {
        let stats = prose_stats("", &detect_chapters(""));
        assert_eq!(stats.filter_density_per_1000, 0.0);
        assert_eq!(stats.sentence_count, 0);
    }
}
