//! Data model shared by every page: media items, the favorite set, routes and
//! the typed payload carried by a forward navigation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality label of the looping preview used as a background sound.
pub const SOUND_PREVIEW_LABEL: &str = "preview-hq-mp3";

/// A media record from one of the providers.  Identity is `id`; items are not
/// mutated after they are fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "StoredMediaItem")]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "alt")]
    pub alt_text: String,
    /// Quality label -> URL (`large`, `medium`, `preview-hq-mp3`, ...).
    #[serde(rename = "src")]
    pub preview_urls: BTreeMap<String, String>,
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}

impl MediaItem {
    pub fn preview(&self, label: &str) -> Option<&str> {
        self.preview_urls.get(label).map(String::as_str)
    }

    /// URL applied when the item is chosen as the background image.
    pub fn background_url(&self) -> &str {
        self.preview("large2x")
            .or_else(|| self.preview("large"))
            .unwrap_or(&self.original_url)
    }

    /// URL played when the item is chosen as the background sound.
    pub fn sound_url(&self) -> Option<&str> {
        self.preview(SOUND_PREVIEW_LABEL)
    }

    /// Copy shown on the details page: the large preview is the original.
    pub fn with_original_as_large(&self) -> Self {
        let mut item = self.clone();
        if !item.original_url.is_empty() {
            item.preview_urls
                .insert("large".to_string(), item.original_url.clone());
        }
        item
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

/// Lenient on-disk shape.  Favorites written by the web flow hold raw photo
/// records with numeric ids and `src.original`; both shapes are accepted.
#[derive(Deserialize)]
struct StoredMediaItem {
    id: RawId,
    #[serde(default, alias = "altText")]
    alt: Option<String>,
    #[serde(default, alias = "previews")]
    src: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "originalUrl", alias = "original_url")]
    original_url: Option<String>,
}

impl From<StoredMediaItem> for MediaItem {
    fn from(raw: StoredMediaItem) -> Self {
        let id = match raw.id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        let preview_urls: BTreeMap<String, String> = raw
            .src
            .into_iter()
            .filter_map(|(label, v)| v.as_str().map(|url| (label, url.to_string())))
            .collect();
        let original_url = raw
            .original_url
            .filter(|u| !u.is_empty())
            .or_else(|| preview_urls.get("original").cloned())
            .unwrap_or_default();
        Self {
            id,
            alt_text: raw.alt.unwrap_or_default(),
            preview_urls,
            original_url,
        }
    }
}

/// Favorite state of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    NotFavorited,
    Favorited,
}

/// Favorited images keyed by id.  Order is kept only so the serialized list is
/// stable; membership is what matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    items: Vec<MediaItem>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = MediaItem>) -> Self {
        let mut set = Self::new();
        for item in items {
            if !set.contains(&item.id) {
                set.items.push(item);
            }
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|fav| fav.id == id)
    }

    pub fn state_of(&self, id: &str) -> FavoriteState {
        if self.contains(id) {
            FavoriteState::Favorited
        } else {
            FavoriteState::NotFavorited
        }
    }

    /// Flip membership of `item`.  Applying it twice restores the set.
    pub fn toggle(&mut self, item: &MediaItem) -> FavoriteState {
        if self.contains(&item.id) {
            self.items.retain(|fav| fav.id != item.id);
            FavoriteState::NotFavorited
        } else {
            self.items.push(item.clone());
            FavoriteState::Favorited
        }
    }

    pub fn get(&self, id: &str) -> Option<&MediaItem> {
        self.items.iter().find(|fav| fav.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Independently routed pages of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Breath,
    Sound,
    Favorites,
    Details,
    FinalPage,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Breath,
        Route::Sound,
        Route::Favorites,
        Route::Details,
        Route::FinalPage,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Breath => "/breath",
            Route::Sound => "/sound",
            Route::Favorites => "/favs",
            Route::Details => "/details",
            Route::FinalPage => "/final-page",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Pages that paint the background image themselves and restore the
    /// default color when left.
    pub fn owns_backdrop(self) -> bool {
        matches!(self, Route::Breath | Route::Favorites | Route::FinalPage)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Data attached to exactly one forward navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationPayload {
    /// A background image was just chosen (Breath -> Sound, Details -> Breath).
    BackgroundChosen { updated_background: Option<String> },
    /// Everything the terminal page needs (Sound -> FinalPage).
    SessionReady {
        background: Option<String>,
        audio: Option<String>,
    },
    /// An image opened for details, with its similar images.
    ImageDetails {
        image: MediaItem,
        similar_images: Vec<MediaItem>,
        favorites: FavoriteSet,
    },
}
