//! crates/summary_core/src/format.rs
//!
//! Turns the semi-structured text produced by the summarization pipeline into
//! display segments. Every function here is pure and never fails: degenerate
//! input produces an empty result.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::LazyLock;

/// Trailing importance marker on a key point, e.g. `(High)`.
static IMPORTANCE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((high|medium|low)\)$").expect("importance marker pattern is valid")
});

/// Role of a paragraph inside a rendered overview or chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphTag {
    Introduction,
    Conclusion,
    Overview,
    Significance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub tags: Vec<ParagraphTag>,
}

impl Paragraph {
    pub fn has_tag(&self, tag: ParagraphTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_ascii_lowercase().as_str() {
            "high" => Some(Importance::High),
            "medium" => Some(Importance::Medium),
            "low" => Some(Importance::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPoint {
    pub text: String,
    /// Serialized as `""` when the line carried no marker.
    #[serde(serialize_with = "serialize_importance")]
    pub importance: Option<Importance>,
}

fn serialize_importance<S: Serializer>(
    importance: &Option<Importance>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(importance.map(|i| i.as_str()).unwrap_or(""))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSection {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

/// Splits an overview into paragraphs; first is the introduction, last the conclusion.
pub fn format_overview(content: &str) -> Vec<Paragraph> {
    tag_paragraphs(
        content,
        ParagraphTag::Introduction,
        ParagraphTag::Conclusion,
    )
}

/// Splits a chapter summary into paragraphs under the chapter title.
pub fn format_chapter(title: &str, content: &str) -> ChapterSection {
    ChapterSection {
        title: title.to_string(),
        paragraphs: tag_paragraphs(content, ParagraphTag::Overview, ParagraphTag::Significance),
    }
}

/// One key point per non-blank line, with its importance marker lifted out.
pub fn format_key_points(content: &str) -> Vec<KeyPoint> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_key_point)
        .collect()
}

fn parse_key_point(line: &str) -> KeyPoint {
    let (text, importance) = match IMPORTANCE_MARKER.captures(line) {
        Some(caps) => {
            let whole = caps.get(0).map_or(line.len(), |m| m.start());
            let importance = caps.get(1).and_then(|m| Importance::from_marker(m.as_str()));
            (&line[..whole], importance)
        }
        None => (line, None),
    };
    let text = text.strip_prefix("- ").unwrap_or(text);
    KeyPoint {
        text: text.to_string(),
        importance,
    }
}

fn split_paragraphs(content: &str) -> Vec<&str> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn tag_paragraphs(content: &str, first: ParagraphTag, last: ParagraphTag) -> Vec<Paragraph> {
    let pieces = split_paragraphs(content);
    let last_index = pieces.len().saturating_sub(1);
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let mut tags = Vec::with_capacity(2);
            if index == 0 {
                tags.push(first);
            }
            if index == last_index {
                tags.push(last);
            }
            Paragraph {
                text: text.to_string(),
                tags,
            }
        })
        .collect()
}
