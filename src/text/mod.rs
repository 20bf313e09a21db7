//! Text preparation: punctuation normalization, source extraction and
//! chapter detection.
//!
//! Everything downstream (statistics, prompts, the revision queue) works on
//! text that has been through [`normalize_text`], so the regex passes only
//! ever see straight quotes and ASCII dashes.

pub mod chapters;
pub mod extract;

pub use chapters::{detect_chapters, detect_chapters_with_strategy, Chapter, HeadingStrategy};
pub use extract::{
    check_limits, extract_text, read_source, ExtractError, ExtractedText, SourceFormat,
    SourceMetadata,
};

/// Convert typographic punctuation to its ASCII form.
///
/// Smart single and double quotes become straight quotes, the en dash
/// becomes `-`, the em dash `--` and the horizontal ellipsis `...`.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' => out.push('-'),
            '\u{2014}' => out.push_str("--"),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    out
}

/// Number of characters (not bytes) in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first `n` characters of `text`.
pub fn head(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The last `n` characters of `text`.
pub fn tail(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if n >= len {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// `n` characters of `text` starting at character `start`.
pub fn slice_chars(text: &str, start: usize, n: usize) -> &str {
    let from = match text.char_indices().nth(start) {
        Some((idx, _)) => idx,
        None => return "",
    };
    head(&text[from..], n)
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_smart_punctuation() {
        let input = "\u{201C}Wait\u{2014}what\u{2026}\u{201D} she said, \u{2018}it\u{2019}s 3\u{2013}4.\u{2019}";
        assert_eq!(
            normalize_text(input),
            "\"Wait--what...\" she said, 'it's 3-4.'"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_text("\u{201C}Hi\u{201D}\u{2026}");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn char_helpers_respect_multibyte_boundaries() {
        let text = "héllo wörld";
        assert_eq!(head(text, 2), "hé");
        assert_eq!(tail(text, 3), "rld");
        assert_eq!(tail(text, 100), text);
        assert_eq!(slice_chars(text, 6, 2), "wö");
        assert_eq!(slice_chars(text, 50, 2), "");
    }
}
