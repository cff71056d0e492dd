//! Source trait and the host data model shared by catalog sources.
//!
//! This module defines the interface every site adapter implements,
//! along with the manga, chapter, and page records they produce.

mod json;
mod mimimoe;

pub use mimimoe::{MimiMoe, SortOrder};

use crate::config::SourceConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Publication status of a manga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MangaStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
}

impl std::fmt::Display for MangaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MangaStatus::Unknown => "unknown",
            MangaStatus::Ongoing => "ongoing",
            MangaStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// A manga entry.
///
/// Browse lists fill only `url`, `title` and `thumbnail_url`; the detail
/// call fills the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    /// Source-relative identifier, e.g. `/manga/28519`.
    pub url: String,

    pub title: String,

    pub thumbnail_url: Option<String>,

    pub description: Option<String>,

    /// Comma-separated author names.
    pub author: Option<String>,

    /// Comma-separated genre names.
    pub genre: Option<String>,

    pub status: MangaStatus,
}

impl Manga {
    /// Creates a stub entry holding only an identifier.
    pub fn from_path(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// One page of a browse listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MangasPage {
    pub mangas: Vec<Manga>,

    /// Whether the caller should request the next page.
    pub has_next_page: bool,
}

/// A chapter of a manga.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Source-relative identifier, e.g. `/chapter/1234`.
    pub url: String,

    /// Display name.
    pub name: String,

    /// Upload time in epoch milliseconds, 0 when unknown.
    pub date_upload: i64,

    /// Chapter number recognised from the name, -1 when none was found.
    pub chapter_number: f32,
}

impl Chapter {
    /// Creates a stub chapter holding only an identifier.
    pub fn from_path(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            chapter_number: -1.0,
            ..Default::default()
        }
    }
}

/// A single image of a chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Position in the chapter (0-based).
    pub index: usize,

    /// Page URL to resolve through [`Source::image_url_parse`]; empty when
    /// `image_url` is already known.
    pub url: String,

    pub image_url: Option<String>,
}

/// Trait for catalog sources.
///
/// Each source handles one site and maps its responses into the shared
/// manga, chapter, and page records. Operations are stateless and may run
/// concurrently.
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the human-readable name of this source.
    fn name(&self) -> &'static str;

    /// Returns the identifier used in lookups (lowercase, no spaces).
    fn id(&self) -> &'static str;

    /// Returns the content language tag.
    fn lang(&self) -> &'static str;

    /// Returns the public website URL.
    fn base_url(&self) -> &str;

    /// Whether [`Source::latest_updates`] is available.
    fn supports_latest(&self) -> bool;

    /// Checks if this source can handle the given web URL.
    fn can_handle(&self, url: &str) -> bool;

    /// Resolves a web URL, identifier path, or bare id to a manga stub.
    fn manga_from_input(&self, input: &str) -> Result<Manga, SourceError>;

    /// Resolves a web URL, identifier path, or bare id to a chapter stub.
    fn chapter_from_input(&self, input: &str) -> Result<Chapter, SourceError>;

    /// Fetches a page (1-based) of the popular listing.
    async fn popular_manga(&self, page: u32) -> Result<MangasPage, SourceError>;

    /// Fetches a page (1-based) of recently updated manga.
    async fn latest_updates(&self, page: u32) -> Result<MangasPage, SourceError>;

    /// Fetches the full details of a manga.
    async fn manga_details(&self, manga: &Manga) -> Result<Manga, SourceError>;

    /// Fetches the chapters of a manga, newest first.
    async fn chapter_list(&self, manga: &Manga) -> Result<Vec<Chapter>, SourceError>;

    /// Fetches the pages of a chapter.
    async fn page_list(&self, chapter: &Chapter) -> Result<Vec<Page>, SourceError>;

    /// Extracts an image URL from a page response body.
    fn image_url_parse(&self, body: &[u8]) -> Result<String, SourceError>;

    /// Returns the web URL of a manga.
    fn manga_url(&self, manga: &Manga) -> String {
        format!("{}{}", self.base_url().trim_end_matches('/'), manga.url)
    }

    /// Returns the web URL of a chapter.
    fn chapter_url(&self, chapter: &Chapter) -> String {
        format!("{}{}", self.base_url().trim_end_matches('/'), chapter.url)
    }
}

/// Registry of available sources.
pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl SourceRegistry {
    /// Creates a new registry with all available sources.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let sources: Vec<Box<dyn Source>> = vec![Box::new(MimiMoe::new(config.clone())?)];

        Ok(Self { sources })
    }

    /// Finds a source that can handle the given URL.
    pub fn find_for_url(&self, url: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| s.as_ref())
    }

    /// Finds a source by its identifier.
    pub fn find_by_id(&self, id: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    /// Finds the source for a web URL, falling back to `default_id` for
    /// bare ids and identifier paths.
    pub fn find_for_input(&self, input: &str, default_id: &str) -> Option<&dyn Source> {
        self.find_for_url(input)
            .or_else(|| self.find_by_id(default_id))
    }

    /// Returns all registered sources.
    pub fn all(&self) -> &[Box<dyn Source>] {
        &self.sources
    }
}

/// Builds the HTTP client shared by a source's requests.
pub fn create_http_client(config: &SourceConfig) -> Result<reqwest::Client, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let referer = format!("{}/", config.base_url.trim_end_matches('/'));
    let referer = HeaderValue::from_str(&referer)
        .map_err(|_| SourceError::InvalidUrl(config.base_url.clone()))?;
    headers.insert(REFERER, referer);

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_records() {
        let manga = Manga::from_path("/manga/28519");
        assert_eq!(manga.url, "/manga/28519");
        assert!(manga.title.is_empty());
        assert_eq!(manga.status, MangaStatus::Unknown);

        let chapter = Chapter::from_path("/chapter/7");
        assert_eq!(chapter.chapter_number, -1.0);
        assert_eq!(chapter.date_upload, 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MangaStatus::Ongoing.to_string(), "ongoing");
        assert_eq!(MangaStatus::default().to_string(), "unknown");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SourceRegistry::new(&SourceConfig::default()).unwrap();
        assert_eq!(registry.all().len(), 1);

        let source = registry.find_by_id("mimimoe").unwrap();
        assert_eq!(source.name(), "MimiMoe");
        assert!(registry.find_by_id("other").is_none());

        assert!(
            registry
                .find_for_url("https://mimimoe.moe/manga/28519")
                .is_some()
        );
        assert!(registry.find_for_url("https://example.com/manga/1").is_none());
    }

    #[test]
    fn test_registry_input_lookup() {
        let registry = SourceRegistry::new(&SourceConfig::default()).unwrap();

        let source = registry
            .find_for_input("https://mimimoe.moe/manga/28519", "missing")
            .unwrap();
        assert_eq!(source.id(), "mimimoe");

        let source = registry.find_for_input("28519", "mimimoe").unwrap();
        assert_eq!(
            source.manga_from_input("28519").unwrap().url,
            "/manga/28519"
        );
        assert!(registry.find_for_input("28519", "missing").is_none());
    }

    #[test]
    fn test_web_urls() {
        let registry = SourceRegistry::new(&SourceConfig::default()).unwrap();
        let source = registry.find_by_id("mimimoe").unwrap();

        assert_eq!(
            source.manga_url(&Manga::from_path("/manga/28519")),
            "https://mimimoe.moe/manga/28519"
        );
        assert_eq!(
            source.chapter_url(&Chapter::from_path("/chapter/99")),
            "https://mimimoe.moe/chapter/99"
        );
    }
}
