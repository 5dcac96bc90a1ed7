//! Favorites: the saved images, with the stored background applied.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use space_core::{AmbientSession, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::{image_row, is_press};
use crate::theme::{style_muted, style_playing, C_ACCENT, C_FAVORITE};
use crate::widgets::media_list::MediaList;
use crate::widgets::pane_chrome::{pane_chrome, Badge};

pub struct FavoritesPage {
    list: MediaList,
}

impl FavoritesPage {
    pub fn new(session: &AmbientSession) -> Self {
        let mut list = MediaList::new();
        list.set_items(session.favorites().items().to_vec());
        Self { list }
    }

    /// Reload from the store.  The cursor follows the selected item, or stays
    /// at its row when that item was removed.
    fn refresh(&mut self, session: &AmbientSession) {
        let keep = self.list.selected_item().map(|item| item.id.clone());
        let row = self.list.selected_index();
        self.list.set_items(session.favorites().items().to_vec());
        let target = keep
            .and_then(|id| self.list.items().iter().position(|item| item.id == id))
            .unwrap_or(row);
        self.list.select_down(target);
        self.list.clamp_selection();
    }
}

impl Page for FavoritesPage {
    fn route(&self) -> Route {
        Route::Favorites
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
            KeyCode::Enter => selected
                .map(|item| vec![Action::SelectBackground(item.background_url().to_string())])
                .unwrap_or_default(),
            KeyCode::Char('f') | KeyCode::Char('x') | KeyCode::Delete => selected
                .map(|item| vec![Action::ToggleFavorite(item)])
                .unwrap_or_default(),
            KeyCode::Char('d') => selected
                .map(|item| vec![Action::OpenDetails(item)])
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, session: &AmbientSession) -> Vec<Action> {
        if let Action::FavoritesChanged = action {
            self.refresh(session);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, session: &AmbientSession) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(3)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " Your Favorite Spaces",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ))),
            rows[0],
        );

        let count = format!("{} ♥", self.list.len());
        let block = pane_chrome(
            "Favorites",
            None,
            true,
            Some(Badge {
                text: &count,
                color: C_FAVORITE,
            }),
        );

        if self.list.is_empty() {
            let inner = block.inner(rows[1]);
            frame.render_widget(block, rows[1]);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(" No favorites yet!", style_muted()))),
                inner,
            );
            return;
        }

        let favorites = session.favorites();
        let current = session.backdrop().image_url().map(str::to_string);
        let width = rows[1].width as usize;
        self.list.draw(frame, rows[1], block, true, |item| {
            let mut spans = image_row(item, &favorites, width);
            if current.as_deref() == Some(item.background_url()) {
                spans.push(Span::styled("  ▣ in use", style_playing()));
            }
            spans
        });
    }

    fn keys(&self) -> &'static str {
        " Enter set background  f remove  d details"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{code, image, key, session};

    #[test]
    fn lists_stored_favorites() {
        let mut s = session();
        s.toggle_favorite(&image("1"));
        s.toggle_favorite(&image("2"));
        let page = FavoritesPage::new(&s);
        assert_eq!(page.list.len(), 2);
    }

    #[test]
    fn removing_refreshes_the_list() {
        let mut s = session();
        s.toggle_favorite(&image("1"));
        s.toggle_favorite(&image("2"));
        let mut page = FavoritesPage::new(&s);
        page.handle_key(key('j'), &s);

        let actions = page.handle_key(key('f'), &s);
        let item = match actions.as_slice() {
            [Action::ToggleFavorite(item)] => item.clone(),
            other => panic!("unexpected actions: {:?}", other),
        };
        assert_eq!(item.id, "2");

        s.toggle_favorite(&item);
        page.on_action(&Action::FavoritesChanged, &s);
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.list.selected_item().map(|i| i.id.as_str()), Some("1"));
    }

    #[test]
    fn enter_sets_background() {
        let mut s = session();
        s.toggle_favorite(&image("4"));
        let mut page = FavoritesPage::new(&s);
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::SelectBackground(url)] if url == "https://img.example/4/large.jpg"
        ));
    }

    #[test]
    fn empty_page_produces_no_actions() {
        let s = session();
        let mut page = FavoritesPage::new(&s);
        assert!(page.list.is_empty());
        assert!(page.handle_key(code(KeyCode::Enter), &s).is_empty());
        assert!(page.handle_key(key('d'), &s).is_empty());
    }
}
