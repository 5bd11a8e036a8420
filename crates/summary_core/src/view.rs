//! crates/summary_core/src/view.rs
//!
//! Page-level data flows: what the summary viewer and the document listing
//! show for a given set of stored records.

use crate::domain::{Document, Summary, SummaryKind};
use crate::format::{format_chapter, format_key_points, format_overview, ChapterSection, KeyPoint, Paragraph};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Duration;

pub const NO_SUMMARIES_PROMPT: &str = "No summaries available. Click \"Regenerate\" to create them.";
pub const NO_OVERVIEW: &str = "No overview available.";
pub const NO_KEY_POINTS: &str = "No key points available.";
pub const NO_CHAPTERS: &str = "No chapter summaries available.";
pub const NO_DOCUMENTS: &str = "You haven't uploaded any documents yet.";
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Final `.ext` of a file name.
static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("extension pattern is valid"));

//=========================================================================================
// Summary viewer
//=========================================================================================

/// Either rendered content or the placeholder shown in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Section<T> {
    Content(T),
    Placeholder(String),
}

impl<T> Section<T> {
    pub fn content(&self) -> Option<&T> {
        match self {
            Section::Content(value) => Some(value),
            Section::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTab {
    pub overview: Section<Vec<Paragraph>>,
    pub key_points: Section<Vec<KeyPoint>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTabs {
    pub overview: OverviewTab,
    pub chapters: Section<Vec<ChapterSection>>,
}

/// What the summaries panel of the viewer shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryPanel {
    /// Summaries have not been fetched yet.
    Loading,
    /// Nothing stored yet, but the pipeline has an unfinished request.
    Generating,
    Empty { message: String },
    Ready(SummaryTabs),
}

/// Builds the viewer panel. `None` means the summary list is not loaded yet.
pub fn build_panel(summaries: Option<&[Summary]>, generation_pending: bool) -> SummaryPanel {
    let Some(summaries) = summaries else {
        return SummaryPanel::Loading;
    };
    if summaries.is_empty() {
        return if generation_pending {
            SummaryPanel::Generating
        } else {
            SummaryPanel::Empty {
                message: NO_SUMMARIES_PROMPT.to_string(),
            }
        };
    }
    SummaryPanel::Ready(SummaryTabs {
        overview: overview_tab(summaries),
        chapters: chapters_tab(summaries),
    })
}

fn first_of_kind(summaries: &[Summary], kind: SummaryKind) -> Option<&Summary> {
    summaries.iter().find(|s| s.kind == kind)
}

fn overview_tab(summaries: &[Summary]) -> OverviewTab {
    let overview = first_of_kind(summaries, SummaryKind::Overview)
        .map(|s| format_overview(&s.content));
    let key_points = first_of_kind(summaries, SummaryKind::KeyPoints)
        .map(|s| format_key_points(&s.content));
    OverviewTab {
        overview: non_empty_or(overview, NO_OVERVIEW),
        key_points: non_empty_or(key_points, NO_KEY_POINTS),
    }
}

/// Blank stored content renders like a missing row.
fn non_empty_or<T>(items: Option<Vec<T>>, placeholder: &str) -> Section<Vec<T>> {
    match items {
        Some(items) if !items.is_empty() => Section::Content(items),
        _ => Section::Placeholder(placeholder.to_string()),
    }
}

fn chapters_tab(summaries: &[Summary]) -> Section<Vec<ChapterSection>> {
    let chapters = ordered_chapters(summaries);
    if chapters.is_empty() {
        return Section::Placeholder(NO_CHAPTERS.to_string());
    }
    Section::Content(
        chapters
            .into_iter()
            .map(|c| format_chapter(c.title.as_deref().unwrap_or_default(), &c.content))
            .collect(),
    )
}

/// Chapter summaries ascending by `order`. The sort is stable, so equal
/// orders keep storage order; chapters without an order go last.
pub fn ordered_chapters(summaries: &[Summary]) -> Vec<&Summary> {
    let mut chapters: Vec<&Summary> = summaries
        .iter()
        .filter(|s| s.kind == SummaryKind::Chapter)
        .collect();
    chapters.sort_by_key(|c| (c.order.is_none(), c.order));
    chapters
}

/// How long the client waits before reloading after a regeneration request.
/// Completion is never signalled, so this is a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    pub delay: Duration,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
        }
    }
}

impl ReloadPolicy {
    /// Value for a `Retry-After` header, at least one second.
    pub fn retry_after_secs(&self) -> u64 {
        self.delay.as_secs().max(1)
    }
}

//=========================================================================================
// Listing and upload
//=========================================================================================

/// One entry of the "your documents" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCard {
    pub id: i32,
    pub title: String,
    pub file_name: String,
    /// e.g. `Jan 5, 2025`.
    pub uploaded_on: String,
    pub size_kb: i64,
    /// Where the "view summaries" action leads.
    pub href: String,
}

impl From<&Document> for DocumentCard {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            file_name: doc.file_name.clone(),
            uploaded_on: doc.created_at.format("%b %-d, %Y").to_string(),
            size_kb: (doc.file_size as f64 / 1024.0).round() as i64,
            href: viewer_path(doc.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub documents: Vec<DocumentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

pub fn build_listing(documents: &[Document]) -> Listing {
    Listing {
        documents: documents.iter().map(DocumentCard::from).collect(),
        empty_message: documents.is_empty().then(|| NO_DOCUMENTS.to_string()),
    }
}

/// Viewer location for a document.
pub fn viewer_path(document_id: i32) -> String {
    format!("/summaries/{}", document_id)
}

/// Title stored for an upload: the caller's title if given, else the file
/// name minus its final extension, else a fixed fallback.
pub fn derive_title(requested: Option<&str>, file_name: &str) -> String {
    if let Some(title) = requested.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    let stem = FILE_EXTENSION.replace(file_name, "");
    if stem.is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        stem.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary(kind: SummaryKind, content: &str, title: Option<&str>, order: Option<i32>) -> Summary {
        Summary {
            document_id: 1,
            kind,
            content: content.to_string(),
            title: title.map(str::to_string),
            order,
        }
    }

    fn chapter(title: &str, order: Option<i32>) -> Summary {
        summary(SummaryKind::Chapter, "Body.", Some(title), order)
    }

    #[test]
    fn panel_is_loading_until_fetched() {
        assert_eq!(build_panel(None, false), SummaryPanel::Loading);
    }

    #[test]
    fn empty_panel_prompts_for_regeneration() {
        assert_eq!(
            build_panel(Some(&[]), false),
            SummaryPanel::Empty {
                message: NO_SUMMARIES_PROMPT.to_string()
            }
        );
        assert_eq!(build_panel(Some(&[]), true), SummaryPanel::Generating);
    }

    #[test]
    fn chapters_render_in_ascending_order() {
        let summaries = vec![chapter("Second", Some(2)), chapter("First", Some(1))];
        let SummaryPanel::Ready(tabs) = build_panel(Some(&summaries), false) else {
            panic!("expected ready panel");
        };
        let titles: Vec<_> = tabs
            .chapters
            .content()
            .unwrap()
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["First", "Second"]);
    }

    #[test]
    fn equal_orders_keep_storage_order_and_unordered_go_last() {
        let summaries = vec![
            chapter("Loose", None),
            chapter("B", Some(1)),
            chapter("A", Some(1)),
            chapter("Zero", Some(0)),
        ];
        let titles: Vec<_> = ordered_chapters(&summaries)
            .iter()
            .map(|c| c.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["Zero", "B", "A", "Loose"]);
    }

    #[test]
    fn missing_sections_render_placeholders() {
        let summaries = vec![summary(SummaryKind::KeyPoints, "- One (low)", None, None)];
        let SummaryPanel::Ready(tabs) = build_panel(Some(&summaries), false) else {
            panic!("expected ready panel");
        };
        assert_eq!(tabs.overview.overview, Section::Placeholder(NO_OVERVIEW.to_string()));
        assert_eq!(tabs.chapters, Section::Placeholder(NO_CHAPTERS.to_string()));
        assert_eq!(tabs.overview.key_points.content().unwrap()[0].text, "One");
    }

    #[test]
    fn blank_overview_and_key_points_render_placeholders() {
        let summaries = vec![
            summary(SummaryKind::Overview, "  \n\n ", None, None),
            summary(SummaryKind::KeyPoints, "", None, None),
        ];
        let SummaryPanel::Ready(tabs) = build_panel(Some(&summaries), false) else {
            panic!("expected ready panel");
        };
        assert_eq!(tabs.overview.overview, Section::Placeholder(NO_OVERVIEW.to_string()));
        assert_eq!(
            tabs.overview.key_points,
            Section::Placeholder(NO_KEY_POINTS.to_string())
        );
    }

    #[test]
    fn first_overview_wins() {
        let summaries = vec![
            summary(SummaryKind::Overview, "First.", None, None),
            summary(SummaryKind::Overview, "Second.", None, None),
        ];
        let SummaryPanel::Ready(tabs) = build_panel(Some(&summaries), false) else {
            panic!("expected ready panel");
        };
        assert_eq!(tabs.overview.overview.content().unwrap()[0].text, "First.");
        assert_eq!(
            tabs.overview.key_points,
            Section::Placeholder(NO_KEY_POINTS.to_string())
        );
    }

    #[test]
    fn title_strips_only_final_extension() {
        assert_eq!(derive_title(Some(""), "report.v2.pdf"), "report.v2");
        assert_eq!(derive_title(None, "report.v2.pdf"), "report.v2");
        assert_eq!(derive_title(Some("   "), "notes"), "notes");
    }

    #[test]
    fn explicit_title_is_trimmed_and_kept() {
        assert_eq!(derive_title(Some("  Intro to AI "), "x.pdf"), "Intro to AI");
    }

    #[test]
    fn title_falls_back_when_nothing_remains() {
        assert_eq!(derive_title(None, ".pdf"), UNTITLED_DOCUMENT);
        assert_eq!(derive_title(None, ""), UNTITLED_DOCUMENT);
    }

    #[test]
    fn listing_cards_format_date_and_size() {
        let doc = Document {
            id: 4,
            user_id: 1,
            title: "Thesis".to_string(),
            file_name: "thesis.pdf".to_string(),
            file_url: "https://files.example/thesis.pdf".to_string(),
            file_key: "thesis".to_string(),
            file_size: 1536,
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap(),
        };
        let listing = build_listing(&[doc]);
        assert_eq!(listing.empty_message, None);
        let card = &listing.documents[0];
        assert_eq!(card.uploaded_on, "Jan 5, 2025");
        assert_eq!(card.size_kb, 2);
        assert_eq!(card.href, "/summaries/4");
    }

    #[test]
    fn empty_listing_has_message() {
        assert_eq!(build_listing(&[]).empty_message.as_deref(), Some(NO_DOCUMENTS));
    }

    #[test]
    fn reload_delay_defaults_to_three_seconds() {
        assert_eq!(ReloadPolicy::default().retry_after_secs(), 3);
        let instant = ReloadPolicy {
            delay: Duration::from_millis(0),
        };
        assert_eq!(instant.retry_after_secs(), 1);
    }
}
