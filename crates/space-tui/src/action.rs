//! Action enum: user intents produced by pages and the results fed back to them.

use space_core::{CatalogError, MediaItem, NavigationPayload, Route};

use crate::widgets::toast::Severity;

/// All actions that flow through the app.
/// Pages produce Actions; the App applies them and forwards them to the page.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    Navigate(Route, Option<NavigationPayload>),
    Back,
    Home,
    Reload,

    // ── Background image ─────────────────────────────────────────────────────
    SelectBackground(String),
    ResetBackground,
    ToggleFavorite(MediaItem),
    /// The favorite set was written; pages showing hearts refresh.
    FavoritesChanged,

    // ── Catalog ──────────────────────────────────────────────────────────────
    SearchImages(String),
    SearchSounds(String),
    /// Fetch similar images, then open the details page.
    OpenDetails(MediaItem),
    ImagesLoaded(Result<Vec<MediaItem>, CatalogError>),
    SoundsLoaded(Result<Vec<MediaItem>, CatalogError>),

    // ── Sound ────────────────────────────────────────────────────────────────
    ToggleSound(String),
    StopSound,

    // ── UI ───────────────────────────────────────────────────────────────────
    Notify(Severity, String),
    ToggleHelp,
    Quit,
}
