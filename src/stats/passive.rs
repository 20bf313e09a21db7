//! Passive voice detection.

use super::{round1, split_sentences};
use crate::text::Chapter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PASSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(is|are|was|were|be|been|being)\s+(being\s+)?(\w+ed|written|done|made|seen|known|found|given|taken|shown)\b",
    )
    .unwrap()
});

/// Chapters above this passive-sentence percentage are flagged.
pub const PASSIVE_FLAG_PERCENT: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterPassive {
    pub chapter: usize,
    pub title: String,
    pub total_sentences: usize,
    pub passive_count: usize,
    pub passive_pct: f64,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveVoiceStats {
    pub total_sentences: usize,
    pub total_passive: usize,
    pub total_passive_pct: f64,
    pub chapter_stats: Vec<ChapterPassive>,
}

/// Whether a sentence contains a passive construction.
pub fn is_passive(sentence: &str) -> bool {
    PASSIVE.is_match(sentence)
}

/// (sentences, passive sentences) for a block of text.
fn passive_counts(text: &str) -> (usize, usize) {
    let sentences = split_sentences(text);
    let total = sentences.iter().filter(|s| !s.trim().is_empty()).count();
    let passive = sentences.iter().filter(|s| is_passive(s)).count();
    (total, passive)
}

pub fn passive_voice_stats(text: &str, chapters: &[Chapter]) -> PassiveVoiceStats {
    let (total_sentences, total_passive) = passive_counts(text);

    let chapter_stats = chapters
        .iter()
        .map(|ch| {
            let (total, passive) = passive_counts(&ch.text);
            let pct = passive as f64 / total.max(1) as f64 * 100.0;
            ChapterPassive {
                chapter: ch.number(),
                title: ch.title.clone(),
                total_sentences: total,
                passive_count: passive,
                passive_pct: round1(pct),
                flagged: pct > PASSIVE_FLAG_PERCENT,
            }
        })
        .collect();

    PassiveVoiceStats {
        total_sentences,
        total_passive,
        total_passive_pct: round1(total_passive as f64 / total_sentences.max(1) as f64 * 100.0),
        chapter_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::detect_chapters;

    #[test]
    fn detects_common_passive_forms() {
        assert!(is_passive("The letter was written by hand."));
        assert!(is_passive("Mistakes were made."));
        assert!(is_passive("The house is being painted."));
        assert!(is_passive("IT WAS DONE."));
        assert!(!is_passive("She wrote the letter."));
        assert!(!is_passive("He was happy."));
    }

    #[test]
    fn chapter_flagged_above_forty_percent() {
        let text = "Chapter 1: Lab\nThe sample was tested. The data were analyzed. We wrote notes.\n\
                    Chapter 2: Field\nWe walked. We looked. The map was found. We slept. We ate.\n";
        let stats = passive_voice_stats(text, &detect_chapters(text));

        let first = &stats.chapter_stats[0];
        assert_eq!(first.passive_count, 2);
        assert_eq!(first.passive_pct, 66.7);
        assert!(first.flagged);

        let second = &stats.chapter_stats[1];
        assert_eq!(second.passive_count, 1);
        assert!(!second.flagged);

        assert_eq!(stats.total_passive, 3);
    }

    #[test]
    fn exactly_forty_percent_is_not_flagged() {
        let text = "It was seen. It was found. We ran. We hid. We won.";
        let stats = passive_voice_stats(text, &detect_chapters(text));
        assert_eq!(stats.chapter_stats[0].passive_pct, 40.0);
        assert!(!stats.chapter_stats[0].flagged);
    }
}
