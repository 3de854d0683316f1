//! Line-oriented Markdown classification for the PDF exporter.
//!
//! Deliberately minimal: each line is classified on its own (no nested
//! structure, no tables, no images, no multi-line constructs). Unrecognised
//! formatting falls through to a plain paragraph so arbitrary text always
//! renders.

use once_cell::sync::Lazy;
use regex::Regex;

/// A classified line of correction Markdown.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `#`–`######` heading with its level.
    Heading { level: u8, spans: Vec<Span> },
    /// `- ` bullet item.
    Bullet { spans: Vec<Span> },
    /// Any other non-empty line.
    Paragraph { spans: Vec<Span> },
    /// A `---` horizontal rule.
    Rule,
    /// An empty line (vertical space).
    Blank,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Regular,
    Bold,
    Italic,
}

/// `**bold**` first so it wins over two adjacent `*italic*` markers.
static RE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*").unwrap());

/// Classify every line of the Markdown text.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    markdown.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Block {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Block::Blank;
    }

    if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
        return Block::Rule;
    }

    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(rest) = trimmed[hashes..].strip_prefix(' ') {
            if !rest.trim().is_empty() {
                return Block::Heading {
                    level: hashes as u8,
                    spans: parse_spans(rest.trim()),
                };
            }
        }
    }

    if let Some(rest) = trimmed.strip_prefix("- ") {
        return Block::Bullet {
            spans: parse_spans(rest.trim()),
        };
    }

    Block::Paragraph {
        spans: parse_spans(trimmed),
    }
}

/// Split a line into styled spans on `**bold**` and `*italic*` markers.
///
/// Unbalanced or empty markers are left in the text as-is.
pub fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in RE_EMPHASIS.captures_iter(line) {
        let whole = caps.get(0).unwrap();
        if whole.start() > last {
            spans.push(Span {
                text: line[last..whole.start()].to_string(),
                style: SpanStyle::Regular,
            });
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Span {
                text: bold.as_str().to_string(),
                style: SpanStyle::Bold,
            });
        } else if let Some(italic) = caps.get(2) {
            spans.push(Span {
                text: italic.as_str().to_string(),
                style: SpanStyle::Italic,
            });
        }
        last = whole.end();
    }

    if last < line.len() {
        spans.push(Span {
            text: line[last..].to_string(),
            style: SpanStyle::Regular,
        });
    }

    spans
}
