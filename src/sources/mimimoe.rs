//! MimiMoe (mimimoe.moe) source implementation.
//!
//! Talks to the site's JSON API under `/api/v2/manga`. Listing pages are
//! 0-based on the API side and 1-based for callers.

use super::json::{
    Object, as_object, join_names, optional_str, parse_body, required_array, required_str,
};
use super::{
    Chapter, Manga, MangaStatus, MangasPage, Page, Source, create_http_client,
};
use crate::chapter_recognition::{parse_chapter_number, sort_descending};
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::utils::{chapter_path, id_from_path, manga_path, parse_upload_date};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

/// Web paths this source understands, relative to the base URL.
static WEB_PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(manga|chapter)/(\d+)/?$").unwrap());

/// Characters of a failed response body echoed to the debug log.
const BODY_PREVIEW_LEN: usize = 500;

/// Sort keys accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Most viewed first.
    Views,
    /// Most recently updated first.
    UpdatedAt,
}

impl SortOrder {
    /// Returns the API's value for the `sort` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Views => "views",
            SortOrder::UpdatedAt => "updated_at",
        }
    }
}

/// Chapter container returned by the gallery endpoint.
///
/// The API serves either a plain array or an object keyed by chapter id.
/// Keyed values are read in response order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GalleryPayload {
    List(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl GalleryPayload {
    fn into_records(self) -> Vec<Value> {
        match self {
            GalleryPayload::List(items) => items,
            GalleryPayload::Keyed(items) => items.into_values().collect(),
        }
    }
}

/// MimiMoe source for mimimoe.moe.
pub struct MimiMoe {
    client: reqwest::Client,
    config: SourceConfig,
}

impl MimiMoe {
    /// Creates a new MimiMoe source with its own HTTP client.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = create_http_client(&config)?;
        Self::with_client(config, client)
    }

    /// Creates a new MimiMoe source that sends requests through `client`.
    pub fn with_client(config: SourceConfig, client: reqwest::Client) -> Result<Self, SourceError> {
        Url::parse(&config.api_url).map_err(|e| {
            SourceError::InvalidUrl(format!("{}: {}", config.api_url, e))
        })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn parse_endpoint(url: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
        let mut parsed =
            Url::parse(url).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !params.is_empty() {
            parsed.query_pairs_mut().extend_pairs(params);
        }
        Ok(parsed)
    }

    /// Extracts the remote id from a stored identifier.
    fn remote_id(path: &str) -> Result<&str, SourceError> {
        let id = id_from_path(path);
        if id.is_empty() {
            return Err(SourceError::InvalidUrl(format!(
                "No id in identifier '{}'",
                path
            )));
        }
        Ok(id)
    }

    /// Builds the listing request for a 1-based page.
    pub fn browse_request(&self, page: u32, sort: SortOrder) -> Result<Url, SourceError> {
        let api_page = page.saturating_sub(1).to_string();
        Self::parse_endpoint(
            &self.endpoint("tatcatruyen"),
            &[("page", &api_page), ("sort", sort.as_str()), ("type", "all")],
        )
    }

    /// Builds the detail request for a manga.
    pub fn manga_details_request(&self, manga: &Manga) -> Result<Url, SourceError> {
        let id = Self::remote_id(&manga.url)?;
        Self::parse_endpoint(&self.endpoint(&format!("info/{}", id)), &[])
    }

    /// Builds the chapter list request for a manga.
    pub fn chapter_list_request(&self, manga: &Manga) -> Result<Url, SourceError> {
        let id = Self::remote_id(&manga.url)?;
        Self::parse_endpoint(&self.endpoint(&format!("gallery/{}", id)), &[])
    }

    /// Builds the page list request for a chapter.
    pub fn page_list_request(&self, chapter: &Chapter) -> Result<Url, SourceError> {
        let id = Self::remote_id(&chapter.url)?;
        Self::parse_endpoint(&self.endpoint("chapter"), &[("id", id)])
    }

    /// Splits a web URL into its kind (`manga` or `chapter`) and remote id.
    fn parse_web_url<'a>(&self, url: &'a str) -> Option<(&'a str, &'a str)> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = url.strip_prefix(base)?;
        let caps = WEB_PATH_PATTERN.captures(path)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    fn resolve_input<'a>(&self, input: &'a str, kind: &str) -> Result<&'a str, SourceError> {
        let input = input.trim();
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(input);
        }

        let found = match self.parse_web_url(input) {
            Some(found) => Some(found),
            None => WEB_PATH_PATTERN
                .captures(input)
                .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))),
        };

        match found {
            Some((found_kind, id)) if found_kind == kind => Ok(id),
            _ => Err(SourceError::UnsupportedUrl(input.to_string())),
        }
    }

    /// Sends a GET request and parses the body with `parse`.
    async fn fetch<T>(
        &self,
        url: Url,
        parse: fn(&[u8]) -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        debug!(%url, "GET");

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.bytes().await?;

        parse(&body[..]).inspect_err(|e| {
            if self.config.debug {
                log_decode_failure(&url, &body, e);
            }
        })
    }
}

fn log_decode_failure(url: &Url, body: &[u8], error: &SourceError) {
    let preview: String = String::from_utf8_lossy(body)
        .chars()
        .take(BODY_PREVIEW_LEN)
        .collect();
    warn!(
        %url,
        %error,
        body_len = body.len(),
        preview = %preview,
        "failed to decode API response"
    );
}

/// Parses a listing response (`{"data": [...]}`).
///
/// The API gives no total count, so a non-empty page always reports a
/// next page.
pub fn parse_manga_list(body: &[u8]) -> Result<MangasPage, SourceError> {
    let root = parse_body(body)?;
    let root = as_object(&root, "response")?;

    let mangas = required_array(root, "data")?
        .iter()
        .map(|item| parse_list_entry(as_object(item, "data")?))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = mangas.len(), "parsed manga list");

    let has_next_page = !mangas.is_empty();
    Ok(MangasPage {
        mangas,
        has_next_page,
    })
}

fn parse_list_entry(obj: &Object) -> Result<Manga, SourceError> {
    Ok(Manga {
        url: manga_path(&required_str(obj, "id")?),
        title: required_str(obj, "title")?,
        thumbnail_url: Some(required_str(obj, "coverUrl")?),
        ..Default::default()
    })
}

/// Parses a detail response.
///
/// Status is always [`MangaStatus::Ongoing`]; the API's own status
/// values are not mapped.
pub fn parse_manga_details(body: &[u8]) -> Result<Manga, SourceError> {
    let root = parse_body(body)?;
    let obj = as_object(&root, "response")?;

    Ok(Manga {
        url: String::new(),
        title: required_str(obj, "title")?,
        thumbnail_url: optional_str(obj, "coverUrl")?,
        description: optional_str(obj, "description")?,
        author: join_names(obj, "authors")?,
        genre: join_names(obj, "genres")?,
        status: MangaStatus::Ongoing,
    })
}

/// Parses a gallery response into chapters, newest first.
pub fn parse_chapter_list(body: &[u8]) -> Result<Vec<Chapter>, SourceError> {
    let payload: GalleryPayload = serde_json::from_slice(body)?;

    let mut chapters = payload
        .into_records()
        .iter()
        .map(|item| parse_chapter(as_object(item, "chapter")?))
        .collect::<Result<Vec<_>, _>>()?;

    sort_descending(&mut chapters, |c| c.chapter_number);
    debug!(count = chapters.len(), "parsed chapter list");

    Ok(chapters)
}

fn parse_chapter(obj: &Object) -> Result<Chapter, SourceError> {
    let id = required_str(obj, "id")?;
    let name = required_str(obj, "title")?;
    // createdAt of an unexpected type is treated like a missing one
    let created_at = optional_str(obj, "createdAt").ok().flatten();

    Ok(Chapter {
        url: chapter_path(&id),
        chapter_number: parse_chapter_number(&name),
        name,
        date_upload: parse_upload_date(created_at.as_deref()),
    })
}

/// Parses a chapter response (`{"pages": [{"imageUrl": ...}]}`).
pub fn parse_page_list(body: &[u8]) -> Result<Vec<Page>, SourceError> {
    let root = parse_body(body)?;
    let root = as_object(&root, "response")?;

    let pages = required_array(root, "pages")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let image_url = required_str(as_object(item, "pages")?, "imageUrl")?;
            Ok(Page {
                index,
                url: String::new(),
                image_url: Some(image_url),
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    debug!(count = pages.len(), "parsed page list");
    Ok(pages)
}

#[async_trait]
impl Source for MimiMoe {
    fn name(&self) -> &'static str {
        "MimiMoe"
    }

    fn id(&self) -> &'static str {
        "mimimoe"
    }

    fn lang(&self) -> &'static str {
        "vi"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn supports_latest(&self) -> bool {
        true
    }

    fn can_handle(&self, url: &str) -> bool {
        self.parse_web_url(url).is_some()
    }

    fn manga_from_input(&self, input: &str) -> Result<Manga, SourceError> {
        self.resolve_input(input, "manga")
            .map(|id| Manga::from_path(manga_path(id)))
    }

    fn chapter_from_input(&self, input: &str) -> Result<Chapter, SourceError> {
        self.resolve_input(input, "chapter")
            .map(|id| Chapter::from_path(chapter_path(id)))
    }

    async fn popular_manga(&self, page: u32) -> Result<MangasPage, SourceError> {
        let url = self.browse_request(page, SortOrder::Views)?;
        self.fetch(url, parse_manga_list).await
    }

    async fn latest_updates(&self, page: u32) -> Result<MangasPage, SourceError> {
        let url = self.browse_request(page, SortOrder::UpdatedAt)?;
        self.fetch(url, parse_manga_list).await
    }

    async fn manga_details(&self, manga: &Manga) -> Result<Manga, SourceError> {
        let url = self.manga_details_request(manga)?;
        let details = self.fetch(url, parse_manga_details).await?;

        Ok(Manga {
            url: manga.url.clone(),
            ..details
        })
    }

    async fn chapter_list(&self, manga: &Manga) -> Result<Vec<Chapter>, SourceError> {
        let url = self.chapter_list_request(manga)?;
        self.fetch(url, parse_chapter_list).await
    }

    async fn page_list(&self, chapter: &Chapter) -> Result<Vec<Page>, SourceError> {
        let url = self.page_list_request(chapter)?;
        self.fetch(url, parse_page_list).await
    }

    fn image_url_parse(&self, _body: &[u8]) -> Result<String, SourceError> {
        Err(SourceError::Unsupported(
            "MimiMoe pages carry their image URL".to_string(),
        ))
    }
}
