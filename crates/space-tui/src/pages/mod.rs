//! Routed pages and the helpers they share.

pub mod breath;
pub mod details;
pub mod favorites;
pub mod final_page;
pub mod home;
pub mod sound;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use space_core::config::SearchConfig;
use space_core::model::FavoriteSet;
use space_core::{AmbientSession, CatalogError, MediaItem, NavigationPayload, Route};

use crate::page::Page;
use crate::theme::{C_ACCENT, C_FAVORITE, C_MUTED, C_NUMBER_HINT, C_PRIMARY, C_SECONDARY};

/// Build the page for a freshly mounted route.
pub fn build(
    route: Route,
    payload: Option<NavigationPayload>,
    session: &AmbientSession,
    search: &SearchConfig,
) -> Box<dyn Page> {
    match route {
        Route::Home => Box::new(home::HomePage::new()),
        Route::Breath => Box::new(breath::BreathPage::new(search)),
        Route::Sound => Box::new(sound::SoundPage::new(search)),
        Route::Favorites => Box::new(favorites::FavoritesPage::new(session)),
        Route::Details => Box::new(details::DetailsPage::new(payload, session)),
        Route::FinalPage => Box::new(final_page::FinalPage::new()),
    }
}

/// Preset search shortcut: a label and the query it runs.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub label: &'static str,
    pub query: &'static str,
}

/// Which kind of media a failed search was for; picks the inline wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Images,
    Sounds,
}

/// Inline message for a failed catalog request.
pub fn catalog_message(kind: MediaKind, err: &CatalogError) -> String {
    match (kind, err) {
        (MediaKind::Images, CatalogError::NoResults) => {
            "No images found for your search term.".to_string()
        }
        (MediaKind::Sounds, CatalogError::NoResults) => {
            "No sounds found for your search term.".to_string()
        }
        (MediaKind::Images, CatalogError::FetchFailed(_)) => {
            "Failed to fetch images. Please try again.".to_string()
        }
        (MediaKind::Sounds, CatalogError::FetchFailed(_)) => {
            "Failed to fetch sounds. Please try again.".to_string()
        }
        (_, CatalogError::MissingCredential(provider)) => format!(
            "No {} credential configured. Add it to the config file or the environment.",
            provider
        ),
    }
}

/// Ignore key releases (Windows reports both edges).
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

/// Index of a `1`..`9` key within `len` presets.
pub fn digit_index(key: &KeyEvent, len: usize) -> Option<usize> {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            (idx < len).then_some(idx)
        }
        _ => None,
    }
}

/// One row of numbered category chips; the active one is highlighted.
pub fn draw_categories(
    frame: &mut Frame,
    area: Rect,
    categories: &[Category],
    active: Option<usize>,
) {
    let mut spans = Vec::with_capacity(categories.len() * 2);
    for (idx, category) in categories.iter().enumerate() {
        spans.push(Span::styled(
            format!(" {} ", idx + 1),
            Style::default().fg(C_NUMBER_HINT),
        ));
        let style = if active == Some(idx) {
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        spans.push(Span::styled(category.label, style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Spans for an image row: heart, description and id.
pub fn image_row(item: &MediaItem, favorites: &FavoriteSet, width: usize) -> Vec<Span<'static>> {
    let heart = if favorites.contains(&item.id) {
        Span::styled("♥ ", Style::default().fg(C_FAVORITE))
    } else {
        Span::styled("♡ ", Style::default().fg(C_MUTED))
    };
    let alt = if item.alt_text.is_empty() {
        "(untitled)"
    } else {
        item.alt_text.as_str()
    };
    vec![
        heart,
        Span::styled(
            crate::widgets::media_list::truncate(alt, width.saturating_sub(16)),
            Style::default().fg(C_PRIMARY),
        ),
        Span::styled(format!("  #{}", item.id), Style::default().fg(C_MUTED)),
    ]
}
