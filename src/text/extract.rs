//! Source extraction
//!
//! Turns uploaded bytes into plain manuscript text. Plain text passes
//! through untouched; Markdown has its YAML frontmatter lifted into
//! [`SourceMetadata`] and its body flattened so headings land on their own
//! lines, where the chapter detector can see them.

use pulldown_cmark::{Event, Options, Parser, TagEnd};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Extensions accepted by [`SourceFormat::from_extension`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: .{0}. Supported: .txt, .text, .md, .markdown")]
    UnsupportedType(String),

    #[error("File too large ({size_mb:.1}MB). Maximum: {limit_mb}MB")]
    TooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Manuscript exceeds word limit ({words} words, limit: {limit})")]
    TooManyWords { words: usize, limit: usize },

    #[error("Manuscript contains no text")]
    Empty,

    #[error("Frontmatter parse error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Markdown,
}

impl SourceFormat {
    /// Resolve a file extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Ok(Self::PlainText),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(ExtractError::UnsupportedType(ext)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Markdown => "md",
        }
    }
}

/// Descriptive fields a source may carry (Markdown frontmatter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// `fiction` or `academic`
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub format: SourceFormat,
    pub text: String,
    pub metadata: SourceMetadata,
}

/// Extract manuscript text from raw bytes of the given file type.
pub fn extract_text(bytes: &[u8], file_type: &str) -> Result<ExtractedText, ExtractError> {
    let format = SourceFormat::from_extension(file_type)?;
    let decoded = String::from_utf8_lossy(bytes);

    let (text, metadata) = match format {
        SourceFormat::PlainText => (decoded.into_owned(), SourceMetadata::default()),
        SourceFormat::Markdown => {
            let (metadata, body) = match split_frontmatter(&decoded) {
                Some((yaml, body)) => (serde_yaml::from_str::<SourceMetadata>(yaml)?, body),
                None => (SourceMetadata::default(), decoded.as_ref()),
            };
            (flatten_markdown(body), metadata)
        }
    };

    Ok(ExtractedText {
        format,
        text,
        metadata,
    })
}

/// Read and extract a file, taking the format from its extension.
pub fn read_source(path: &Path) -> Result<ExtractedText, ExtractError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    // Reject before touching the disk.
    SourceFormat::from_extension(&ext)?;
    let bytes = std::fs::read(path)?;
    extract_text(&bytes, &ext)
}

/// Validate upload size and word count against configured limits.
pub fn check_limits(
    byte_len: usize,
    words: usize,
    max_upload_mb: u64,
    max_words: usize,
) -> Result<(), ExtractError> {
    let size_mb = byte_len as f64 / (1024.0 * 1024.0);
    if size_mb > max_upload_mb as f64 {
        return Err(ExtractError::TooLarge {
            size_mb,
            limit_mb: max_upload_mb,
        });
    }
    if words == 0 {
        return Err(ExtractError::Empty);
    }
    if words > max_words {
        return Err(ExtractError::TooManyWords {
            words,
            limit: max_words,
        });
    }
    Ok(())
}

/// Split `---` delimited frontmatter from the body.
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start();
    let after_first = trimmed.strip_prefix("---")?;
    let end_pos = after_first.find("\n---")?;
    let yaml = &after_first[..end_pos];
    let rest = &after_first[end_pos + 4..];
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    Some((yaml, body))
}

/// Flatten Markdown to plain text, one block per paragraph.
fn flatten_markdown(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for event in Parser::new_ext(body, Options::empty()) {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::BlockQuote) => out.push_str("\n\n"),
            Event::End(TagEnd::Item) => out.push('\n'),
            Event::Rule => out.push_str("\n\n"),
            _ => {}
        }
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let extracted = extract_text(b"Chapter 1\nHello.", "TXT").unwrap();
        assert_eq!(extracted.format, SourceFormat::PlainText);
        assert_eq!(extracted.text, "Chapter 1\nHello.");
        assert_eq!(extracted.metadata, SourceMetadata::default());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = extract_text(b"%PDF", ".pdf").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(ref e) if e == "pdf"));
        assert!(err.to_string().contains("Unsupported file type: .pdf"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let extracted = extract_text(&[b'h', 0xff, b'i'], "txt").unwrap();
        assert_eq!(extracted.text, "h\u{FFFD}i");
    }

    #[test]
    fn markdown_frontmatter_becomes_metadata() {
        let md = "---\ntitle: The Long Road\nauthor: A. Writer\nkind: fiction\n---\n# Chapter 1: Start\n\nShe *ran*\nfast.\n\n# Chapter 2: End\n\nDone.\n";
        let extracted = extract_text(md.as_bytes(), "md").unwrap();

        assert_eq!(extracted.metadata.title.as_deref(), Some("The Long Road"));
        assert_eq!(extracted.metadata.author.as_deref(), Some("A. Writer"));
        assert_eq!(extracted.metadata.kind.as_deref(), Some("fiction"));
        assert_eq!(
            extracted.text,
            "Chapter 1: Start\n\nShe ran fast.\n\nChapter 2: End\n\nDone.\n"
        );
    }

    #[test]
    fn markdown_without_frontmatter() {
        let extracted = extract_text(b"Just a paragraph.", "markdown").unwrap();
        assert_eq!(extracted.text, "Just a paragraph.\n");
        assert!(extracted.metadata.title.is_none());
    }

    #[test]
    fn limits_reject_oversized_and_wordy_sources() {
        assert!(check_limits(10, 5, 50, 100).is_ok());
        assert!(matches!(
            check_limits(51 * 1024 * 1024, 5, 50, 100),
            Err(ExtractError::TooLarge { .. })
        ));
        assert!(matches!(
            check_limits(10, 101, 50, 100),
            Err(ExtractError::TooManyWords { words: 101, limit: 100 })
        ));
        assert!(matches!(check_limits(0, 0, 50, 100), Err(ExtractError::Empty)));
    }

    #[test]
    fn read_source_rejects_unknown_extension_before_reading() {
        let err = read_source(Path::new("/nonexistent/book.docx")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(_)));
    }
}
