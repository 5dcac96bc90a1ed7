//! Details: one image and the images similar to it.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use space_core::model::FavoriteSet;
use space_core::{AmbientSession, MediaItem, NavigationPayload, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::{image_row, is_press};
use crate::theme::{style_muted, style_secondary, C_ACCENT, C_FAVORITE, C_PRIMARY};
use crate::widgets::media_list::{truncate, MediaList};
use crate::widgets::pane_chrome::pane_chrome;

pub struct DetailsPage {
    image: Option<MediaItem>,
    /// The chosen image first, then the similar ones.
    list: MediaList,
    favorites: FavoriteSet,
}

impl DetailsPage {
    pub fn new(payload: Option<NavigationPayload>, session: &AmbientSession) -> Self {
        let mut list = MediaList::new();
        match payload {
            Some(NavigationPayload::ImageDetails {
                image,
                similar_images,
                favorites,
            }) => {
                let mut items = Vec::with_capacity(similar_images.len() + 1);
                items.push(image.clone());
                items.extend(similar_images.into_iter().filter(|s| s.id != image.id));
                list.set_items(items);
                Self {
                    image: Some(image),
                    list,
                    favorites,
                }
            }
            _ => Self {
                image: None,
                list,
                favorites: session.favorites(),
            },
        }
    }
}

/// Background URL for an item shown here: the large preview, which for the
/// chosen image is its original.
fn details_background(item: &MediaItem) -> String {
    item.preview("large")
        .unwrap_or_else(|| item.background_url())
        .to_string()
}

impl Page for DetailsPage {
    fn route(&self) -> Route {
        Route::Details
    }

    fn handle_key(&mut self, key: KeyEvent, _session: &AmbientSession) -> Vec<Action> {
        if !is_press(&key) {
            return vec![];
        }
        let selected = self.list.selected_item().cloned();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_up(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_down(1);
                vec![]
            }
            KeyCode::Char('f') => selected
                .map(|item| vec![Action::ToggleFavorite(item)])
                .unwrap_or_default(),
            KeyCode::Enter | KeyCode::Char('u') => selected
                .map(|item| {
                    vec![Action::Navigate(
                        Route::Breath,
                        Some(NavigationPayload::BackgroundChosen {
                            updated_background: Some(details_background(&item)),
                        }),
                    )]
                })
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, session: &AmbientSession) -> Vec<Action> {
        if let Action::FavoritesChanged = action {
            self.favorites = session.favorites();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _session: &AmbientSession) {
        let Some(ref image) = self.image else {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    " Nothing to show. Go back and open an image.",
                    style_muted(),
                ))),
                area,
            );
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let heart = if self.favorites.contains(&image.id) {
            Span::styled(" ♥", Style::default().fg(C_FAVORITE))
        } else {
            Span::raw("")
        };
        let header = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {}", truncate(&image.alt_text, (rows[0].width as usize).saturating_sub(4))),
                    Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
                ),
                heart,
            ]),
            Line::from(Span::styled(
                format!(" {}", details_background(image)),
                style_secondary(),
            )),
            Line::from(Span::styled(
                format!(" {} similar images", self.list.len().saturating_sub(1)),
                Style::default().fg(C_PRIMARY),
            )),
        ];
        frame.render_widget(
            Paragraph::new(header).wrap(Wrap { trim: false }),
            rows[0],
        );

        let block = pane_chrome("Similar", None, true, None);
        let favorites = &self.favorites;
        let chosen_id = image.id.clone();
        let width = rows[1].width as usize;
        self.list.draw(frame, rows[1], block, true, |item| {
            let mut spans = image_row(item, favorites, width);
            if item.id == chosen_id {
                spans.push(Span::styled("  (this image)", style_muted()));
            }
            spans
        });
    }

    fn keys(&self) -> &'static str {
        " ↑↓ choose  Enter use as background  f fav"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{code, image, key, session};

    fn payload() -> NavigationPayload {
        NavigationPayload::ImageDetails {
            image: image("1").with_original_as_large(),
            similar_images: vec![image("1"), image("2"), image("3")],
            favorites: FavoriteSet::from_items([image("2")]),
        }
    }

    #[test]
    fn chosen_image_leads_and_is_not_repeated() {
        let s = session();
        let page = DetailsPage::new(Some(payload()), &s);
        let ids: Vec<_> = page.list.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(page.favorites.contains("2"));
    }

    #[test]
    fn use_as_background_hands_original_to_breath() {
        let s = session();
        let mut page = DetailsPage::new(Some(payload()), &s);
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        match actions.as_slice() {
            [Action::Navigate(
                Route::Breath,
                Some(NavigationPayload::BackgroundChosen { updated_background }),
            )] => assert_eq!(
                updated_background.as_deref(),
                Some("https://img.example/1/original.jpg")
            ),
            other => panic!("unexpected actions: {:?}", other),
        }
    }

    #[test]
    fn reload_without_payload_is_empty() {
        let s = session();
        let mut page = DetailsPage::new(None, &s);
        assert!(page.image.is_none());
        assert!(page.handle_key(key('f'), &s).is_empty());
    }

    #[test]
    fn favorites_follow_the_session_after_a_toggle() {
        let mut s = session();
        let mut page = DetailsPage::new(Some(payload()), &s);
        s.toggle_favorite(&image("3"));
        page.on_action(&Action::FavoritesChanged, &s);
        assert!(page.favorites.contains("3"));
        assert!(!page.favorites.contains("2"));
    }
}
