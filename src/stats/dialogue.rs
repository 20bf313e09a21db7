//! Dialogue extraction and the character-name heuristic.

use super::round2;
use crate::text::{head, Chapter};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]{5,})""#).unwrap());

static DIALOGUE_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^.!?]*"[^"]{5,}"[^.!?]*[.!?]"#).unwrap());

static CAPITALIZED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s[A-Z][a-z]+)+)\b").unwrap());

/// Leading words that make a capitalized run a phrase rather than a name.
const NAME_STOP_WORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "When", "Where", "What", "Which",
    "There", "Their", "About", "After", "Before", "Between", "Under", "Over", "Into",
];

/// Only the opening of the manuscript is scanned for names.
const NAME_SCAN_CHARS: usize = 50_000;
const MAX_NAMES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDialogue {
    pub chapter: usize,
    pub title: String,
    pub dialogue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueStats {
    pub total_dialogue_lines: usize,
    /// Mean words per quoted span.
    pub avg_dialogue_length: f64,
    pub chapter_dialogue_counts: Vec<ChapterDialogue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Quoted spans of at least five characters, without the quotes.
pub fn quoted_spans(text: &str) -> Vec<&str> {
    QUOTED
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn dialogue_stats(text: &str, chapters: &[Chapter]) -> DialogueStats {
    let spans = quoted_spans(text);
    let total_words: usize = spans.iter().map(|s| s.split_whitespace().count()).sum();

    DialogueStats {
        total_dialogue_lines: spans.len(),
        avg_dialogue_length: round2(total_words as f64 / spans.len().max(1) as f64),
        chapter_dialogue_counts: chapters
            .iter()
            .map(|ch| ChapterDialogue {
                chapter: ch.number(),
                title: ch.title.clone(),
                dialogue_count: QUOTED.find_iter(&ch.text).count(),
            })
            .collect(),
    }
}

/// Sentences containing dialogue, capped at `limit`.
pub fn dialogue_passages(text: &str, limit: usize) -> Vec<&str> {
    DIALOGUE_SENTENCE
        .find_iter(text)
        .take(limit)
        .map(|m| m.as_str())
        .collect()
}

/// Likely character names: capitalized multi-word runs seen at least twice.
///
/// Ranked by frequency, ties in order of first appearance, top ten.
pub fn character_names(text: &str) -> Vec<NameCount> {
    let sample = head(text, NAME_SCAN_CHARS);
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<NameCount> = Vec::new();

    for cap in CAPITALIZED_RUN.captures_iter(sample) {
        let Some(m) = cap.get(1) else { continue };
        let name = m.as_str();
        let first = name.split_whitespace().next().unwrap_or_default();
        if NAME_STOP_WORDS.contains(&first) || name.chars().count() <= 3 {
            continue;
        }
        match index.get(name) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(name, counts.len());
                counts.push(NameCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.retain(|c| c.count >= 2);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(MAX_NAMES);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::detect_chapters;

    #[test]
    fn quoted_spans_need_five_characters() {
        assert!(quoted_spans(r#""Hi," she said."#).is_empty());
        let spans = quoted_spans(r#"He answered, "Come inside now.""#);
        assert_eq!(spans, vec!["Come inside now."]);
    }

    #[test]
    fn dialogue_stats_per_chapter() {
        let text = "Chapter 1: Porch\n\"Good evening, friend.\" \"Is it late already?\"\n\
                    Chapter 2: Road\nThey walked in silence.\n";
        let stats = dialogue_stats(text, &detect_chapters(text));

        assert_eq!(stats.total_dialogue_lines, 2);
        assert_eq!(stats.avg_dialogue_length, 3.5);
        assert_eq!(stats.chapter_dialogue_counts[0].dialogue_count, 2);
        assert_eq!(stats.chapter_dialogue_counts[1].dialogue_count, 0);
    }

    #[test]
    fn dialogue_passages_are_capped() {
        let text = r#"He said "one two three". She said "four five six". They said "seven eight"."#;
        assert_eq!(dialogue_passages(text, 2).len(), 2);
    }

    #[test]
    fn character_names_need_two_sightings() {
        let text = "Mara Quill opened the door. Tobias Reed waited. \
                    Mara Quill smiled at Tobias Reed. Mara Quill left. Elena Voss arrived once.";
        let names = character_names(text);
        assert_eq!(
            names,
            vec![
                NameCount { name: "Mara Quill".into(), count: 3 },
                NameCount { name: "Tobias Reed".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn character_names_skip_stop_word_leads() {
        let text = "The Hollow Hills rose. The Hollow Hills fell. After Dark came. After Dark went.";
        assert!(character_names(text).is_empty());
    }
}
