//! Media Catalog Client: image and sound search against the two providers.
//!
//! Both providers are normalised into [`MediaItem`].  Every query is capped at
//! [`MAX_RESULTS`]; image searches only keep photos of at least 1920×1080.

use std::collections::BTreeMap;

use futures_util::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::config::ProvidersConfig;
use crate::error::CatalogError;
use crate::model::MediaItem;

pub const MAX_RESULTS: usize = 12;
pub const MIN_WIDTH: u32 = 1920;
pub const MIN_HEIGHT: u32 = 1080;

/// Suffix appended to every image query so results stay on-theme.
const IMAGE_QUERY_SUFFIX: &str = "ambient wallpaper";

// ── provider response shapes ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct Photo {
    pub id: u64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub src: BTreeMap<String, String>,
}

impl Photo {
    pub fn meets_min_resolution(&self) -> bool {
        self.width >= MIN_WIDTH && self.height >= MIN_HEIGHT
    }
}

impl From<Photo> for MediaItem {
    fn from(photo: Photo) -> Self {
        let original_url = photo.src.get("original").cloned().unwrap_or_default();
        MediaItem {
            id: photo.id.to_string(),
            alt_text: photo.alt.unwrap_or_default(),
            preview_urls: photo.src,
            original_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SoundSearchResponse {
    #[serde(default)]
    pub results: Vec<SoundSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SoundSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SoundDetail {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub previews: BTreeMap<String, String>,
}

impl From<SoundDetail> for MediaItem {
    fn from(sound: SoundDetail) -> Self {
        let original_url = sound
            .url
            .or_else(|| sound.previews.get(crate::model::SOUND_PREVIEW_LABEL).cloned())
            .unwrap_or_default();
        MediaItem {
            id: sound.id.to_string(),
            alt_text: sound.name,
            preview_urls: sound.previews,
            original_url,
        }
    }
}

// ── pure mapping ──────────────────────────────────────────────────────────────

/// Normalise a photo search.  `wallpapers_only` applies the minimum
/// resolution filter.  An empty outcome is `NoResults`.
pub fn photos_to_items(
    response: PhotoSearchResponse,
    wallpapers_only: bool,
) -> Result<Vec<MediaItem>, CatalogError> {
    let items: Vec<MediaItem> = response
        .photos
        .into_iter()
        .filter(|p| !wallpapers_only || p.meets_min_resolution())
        .take(MAX_RESULTS)
        .map(MediaItem::from)
        .collect();
    non_empty(items)
}

pub fn sounds_to_items(details: Vec<SoundDetail>) -> Result<Vec<MediaItem>, CatalogError> {
    non_empty(
        details
            .into_iter()
            .take(MAX_RESULTS)
            .map(MediaItem::from)
            .collect(),
    )
}

fn non_empty(items: Vec<MediaItem>) -> Result<Vec<MediaItem>, CatalogError> {
    if items.is_empty() {
        Err(CatalogError::NoResults)
    } else {
        Ok(items)
    }
}

pub fn image_query(query: &str) -> String {
    format!("{} {}", query.trim(), IMAGE_QUERY_SUFFIX)
}

fn page_size(requested: usize) -> usize {
    requested.clamp(1, MAX_RESULTS)
}

// ── client ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    providers: ProvidersConfig,
}

impl CatalogClient {
    pub fn new(providers: ProvidersConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("safe-space/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                error!("catalog: falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { http, providers }
    }

    /// Wallpaper search: `query` plus the theme suffix, high resolution only.
    pub async fn search_images(
        &self,
        query: &str,
        requested: usize,
    ) -> Result<Vec<MediaItem>, CatalogError> {
        let response = self.fetch_photos(&image_query(query), requested).await?;
        let items = photos_to_items(response, true)?;
        info!("catalog: {} images for {:?}", items.len(), query);
        Ok(items)
    }

    /// Images similar to `item`, looked up by its description.
    pub async fn similar_images(
        &self,
        item: &MediaItem,
        requested: usize,
    ) -> Result<Vec<MediaItem>, CatalogError> {
        let response = self
            .fetch_photos(&image_query(&item.alt_text), requested)
            .await?;
        photos_to_items(response, false)
    }

    /// Sound search followed by one detail lookup per result for its
    /// preview URLs.  A failed lookup fails the whole search.
    pub async fn search_sounds(
        &self,
        query: &str,
        requested: usize,
    ) -> Result<Vec<MediaItem>, CatalogError> {
        let token = self
            .providers
            .freesound_token()
            .ok_or(CatalogError::MissingCredential("freesound"))?;
        let page_size = page_size(requested).to_string();

        let search: SoundSearchResponse = self
            .http
            .get(&self.providers.sound_search_url)
            .query(&[
                ("query", query),
                ("token", token.as_str()),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if search.results.is_empty() {
            return Err(CatalogError::NoResults);
        }
        debug!(
            "catalog: {} sounds for {:?}, fetching details",
            search.results.len(),
            query
        );

        let lookups = search
            .results
            .iter()
            .take(MAX_RESULTS)
            .map(|s| self.fetch_sound_detail(s.id, &token));
        let details = try_join_all(lookups).await?;
        let items = sounds_to_items(details)?;
        info!("catalog: {} sounds ready for {:?}", items.len(), query);
        Ok(items)
    }

    async fn fetch_photos(
        &self,
        query: &str,
        requested: usize,
    ) -> Result<PhotoSearchResponse, CatalogError> {
        let key = self
            .providers
            .pexels_api_key()
            .ok_or(CatalogError::MissingCredential("pexels"))?;
        let per_page = page_size(requested).to_string();
        let response = self
            .http
            .get(&self.providers.image_search_url)
            .header(reqwest::header::AUTHORIZATION, key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    async fn fetch_sound_detail(&self, id: u64, token: &str) -> Result<SoundDetail, CatalogError> {
        let url = format!(
            "{}/{}/",
            self.providers.sound_detail_url.trim_end_matches('/'),
            id
        );
        let detail = self
            .http
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(detail)
    }
}
