//! Excerpt strategies for manuscripts too long to send whole.
//!
//! All lengths are in characters, never bytes.

use crate::stats::dialogue_passages;
use crate::text::{char_len, head, slice_chars, tail, Chapter};

/// How a module trims an over-long manuscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcerptStrategy {
    /// Chapter opening and ending, 600 characters each.
    Structure,
    /// Head, middle and tail of each chapter, 500 characters each.
    Pacing,
    /// Chapter head (500) plus 300 characters from the middle.
    Prose,
    /// Up to ten dialogue-bearing sentences per chapter.
    Dialogue,
    /// Chapter opening and ending, 750 characters each.
    Argument,
    /// First 100,000 and last 50,000 characters of the whole text.
    HeadTail,
}

const DIALOGUE_PASSAGES_PER_CHAPTER: usize = 10;
const HEAD_TAIL_HEAD: usize = 100_000;
const HEAD_TAIL_TAIL: usize = 50_000;

/// Pick the text a prompt will carry.
///
/// Texts over `threshold` characters are excerpted with `strategy`; the
/// result is then capped at `cap` characters.
pub fn select_text(
    raw_text: &str,
    chapters: &[Chapter],
    strategy: ExcerptStrategy,
    threshold: usize,
    cap: usize,
) -> String {
    let selected = if char_len(raw_text) > threshold {
        build_excerpt(raw_text, chapters, strategy)
    } else {
        raw_text.to_string()
    };
    head(&selected, cap).to_string()
}

pub fn build_excerpt(raw_text: &str, chapters: &[Chapter], strategy: ExcerptStrategy) -> String {
    match strategy {
        ExcerptStrategy::HeadTail => format!(
            "{}\n[...truncated...]\n{}",
            head(raw_text, HEAD_TAIL_HEAD),
            tail(raw_text, HEAD_TAIL_TAIL)
        ),
        ExcerptStrategy::Dialogue => chapters
            .iter()
            .filter_map(|ch| {
                let passages = dialogue_passages(&ch.text, DIALOGUE_PASSAGES_PER_CHAPTER);
                (!passages.is_empty()).then(|| with_header(ch, &passages.join("\n")))
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => chapters
            .iter()
            .map(|ch| with_header(ch, &chapter_excerpt(&ch.text, strategy)))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn with_header(chapter: &Chapter, body: &str) -> String {
    format!("=== Chapter {}: {} ===\n{}", chapter.number(), chapter.title, body)
}

fn chapter_excerpt(text: &str, strategy: ExcerptStrategy) -> String {
    let len = char_len(text);
    match strategy {
        ExcerptStrategy::Structure if len > 1200 => {
            format!("{}\n[...]\n{}", head(text, 600), tail(text, 600))
        }
        ExcerptStrategy::Argument if len > 1500 => {
            format!("{}\n[...]\n{}", head(text, 750), tail(text, 750))
        }
        ExcerptStrategy::Pacing if len > 1500 => format!(
            "{}\n[...middle...]\n{}\n[...end...]\n{}",
            head(text, 500),
            slice_chars(text, len / 2, 500),
            tail(text, 500)
        ),
        ExcerptStrategy::Prose if len > 1000 => {
            format!("{}\n[...]\n{}", head(text, 500), slice_chars(text, len / 2, 300))
        }
        _ => text.to_string(),
    }
}
