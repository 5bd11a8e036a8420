//! crates/summary_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

/// The authenticated requester of a single operation, as vouched for by the
/// identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// Opaque subject identifier issued by the identity provider.
    pub subject: String,
}

impl CallerContext {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Internal user record, linked to exactly one identity-provider subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub external_id: String,
}

/// Metadata of an uploaded PDF. The file bytes live with the storage provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub file_name: String,
    pub file_url: String,
    pub file_key: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to persist a document after the uploader finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub user_id: i32,
    pub title: String,
    pub file_name: String,
    pub file_url: String,
    pub file_key: String,
    pub file_size: i64,
}

/// The three kinds of text the summarization pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    Overview,
    KeyPoints,
    Chapter,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Overview => "overview",
            SummaryKind::KeyPoints => "key_points",
            SummaryKind::Chapter => "chapter",
        }
    }

    /// Parses the stored column value. Unknown kinds yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overview" => Some(SummaryKind::Overview),
            "key_points" => Some(SummaryKind::KeyPoints),
            "chapter" => Some(SummaryKind::Chapter),
            _ => None,
        }
    }
}

/// A block of generated summary text belonging to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub document_id: i32,
    pub kind: SummaryKind,
    pub content: String,
    /// Chapters only.
    pub title: Option<String>,
    /// Chapters only, used for display ordering.
    pub order: Option<i32>,
}

/// User-supplied focus for a regeneration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationOptions {
    pub focus_chapters: Vec<String>,
    pub focus_topics: Vec<String>,
    pub custom_instructions: String,
}
