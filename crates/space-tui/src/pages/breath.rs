//! Breath: choose a background image from preset categories or a search.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use space_core::config::SearchConfig;
use space_core::{AmbientSession, MediaItem, NavigationPayload, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::{
    catalog_message, digit_index, draw_categories, image_row, is_press, Category, MediaKind,
};
use crate::theme::{style_error, style_muted, style_playing, style_secondary, C_PLAYING};
use crate::widgets::media_list::{truncate, MediaList};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::search_input::{SearchAction, SearchInput};

pub const CATEGORIES: [Category; 5] = [
    Category {
        label: "Forest",
        query: "calm forest, ambient nature",
    },
    Category {
        label: "Ocean",
        query: "calm ocean, peaceful beach",
    },
    Category {
        label: "Starry Night",
        query: "starry sky, ambient night",
    },
    Category {
        label: "Sky",
        query: "calm sky, ambient clouds",
    },
    Category {
        label: "Mountain",
        query: "calm mountains, ambient nature",
    },
];

pub struct BreathPage {
    search: SearchInput,
    default_query: String,
    query: String,
    active_category: Option<usize>,
    list: MediaList,
    message: Option<String>,
    loading: bool,
}

impl BreathPage {
    pub fn new(search: &SearchConfig) -> Self {
        Self {
            search: SearchInput::new("search wallpapers"),
            default_query: search.default_image_query.clone(),
            query: String::new(),
            active_category: None,
            list: MediaList::new(),
            message: None,
            loading: false,
        }
    }

    fn run_search(&mut self, query: String) -> Vec<Action> {
        self.query = query.clone();
        self.loading = true;
        self.message = None;
        vec![Action::SearchImages(query)]
    }

    fn selected(&self) -> Option<MediaItem> {
        self.list.selected_item().cloned()
    }

    fn reset(&mut self) -> Vec<Action> {
        self.search.clear();
        self.query.clear();
        self.active_category = None;
        self.message = None;
        vec![Action::ResetBackground]
    }
}

impl Page for BreathPage {
    fn route(&self) -> Route {
        Route::Breath
    }

    fn on_enter(&mut self, _session: &AmbientSession) -> Vec<Action> {
        let query = self.default_query.clone();
        self.run_search(query)
    }

    fn handle_key(&mut self, key: KeyEvent, session: &AmbientSession) -> Vec<Action> {
        if !is_press(&key) {
            return vec![];
        }
        if self.search.is_active() {
            return match self.search.handle_key(key) {
                SearchAction::Submitted(query) => {
                    self.active_category = None;
                    let query = if query.is_empty() {
                        self.default_query.clone()
                    } else {
                        query
                    };
                    self.run_search(query)
                }
                SearchAction::Cancelled | SearchAction::Editing => vec![],
            };
        }
        if let Some(idx) = digit_index(&key, CATEGORIES.len()) {
            self.active_category = Some(idx);
            self.search.clear();
            return self.run_search(CATEGORIES[idx].query.to_string());
        }

        match key.code {
            KeyCode::Char('/') => {
                self.search.activate();
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_up(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_down(1);
                vec![]
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.list.select_first();
                vec![]
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.list.select_last();
                vec![]
            }
            KeyCode::Enter => self
                .selected()
                .map(|item| vec![Action::SelectBackground(item.background_url().to_string())])
                .unwrap_or_default(),
            KeyCode::Char('f') => self
                .selected()
                .map(|item| vec![Action::ToggleFavorite(item)])
                .unwrap_or_default(),
            KeyCode::Char('d') => self
                .selected()
                .map(|item| vec![Action::OpenDetails(item)])
                .unwrap_or_default(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('v') => vec![Action::Navigate(Route::Favorites, None)],
            KeyCode::Char('c') => vec![Action::Navigate(
                Route::Sound,
                Some(NavigationPayload::BackgroundChosen {
                    updated_background: session.backdrop().image_url().map(str::to_string),
                }),
            )],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _session: &AmbientSession) -> Vec<Action> {
        if let Action::ImagesLoaded(result) = action {
            self.loading = false;
            match result {
                Ok(items) => {
                    self.list.set_items(items.clone());
                    self.message = None;
                }
                Err(e) => {
                    self.list.set_items(Vec::new());
                    self.message = Some(catalog_message(MediaKind::Images, e));
                }
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, session: &AmbientSession) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);

        draw_categories(frame, rows[0], &CATEGORIES, self.active_category);
        self.search.draw(frame, rows[1]);

        let status = if self.loading {
            Line::from(Span::styled(" Searching...", style_muted()))
        } else if let Some(ref msg) = self.message {
            Line::from(Span::styled(format!(" {}", msg), style_error()))
        } else if self.query.is_empty() {
            Line::from(Span::styled(" Pick a category or search.", style_muted()))
        } else {
            Line::from(Span::styled(
                format!(" Results for \"{}\"", truncate(&self.query, 48)),
                style_secondary(),
            ))
        };
        frame.render_widget(Paragraph::new(status), rows[2]);

        let favorites = session.favorites();
        let current = session.backdrop().image_url().map(str::to_string);
        let count = format!("{}", self.list.len());
        let block = pane_chrome(
            "Backgrounds",
            Some("/"),
            !self.search.is_active(),
            Some(Badge {
                text: &count,
                color: C_PLAYING,
            }),
        );
        let width = rows[3].width as usize;
        self.list.draw(frame, rows[3], block, true, |item| {
            let mut spans = image_row(item, &favorites, width);
            if current.as_deref() == Some(item.background_url()) {
                spans.push(Span::styled("  ▣ in use", style_playing()));
            }
            spans
        });
    }

    fn keys(&self) -> &'static str {
        " 1-5 category  / search  Enter set  f fav  d details  r reset  v favorites  c continue"
    }

    fn is_editing(&self) -> bool {
        self.search.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{code, image, key, session};
    use space_core::CatalogError;

    fn loaded(page: &mut BreathPage, s: &AmbientSession, ids: &[&str]) {
        let items = ids.iter().map(|id| image(id)).collect();
        page.on_action(&Action::ImagesLoaded(Ok(items)), s);
    }

    #[test]
    fn entering_runs_default_query() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        let actions = page.on_enter(&s);
        assert!(matches!(
            actions.as_slice(),
            [Action::SearchImages(q)] if q == "calm nature"
        ));
        assert!(page.loading);
    }

    #[test]
    fn category_key_runs_its_query() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        let actions = page.handle_key(key('3'), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::SearchImages(q)] if q == "starry sky, ambient night"
        ));
        assert_eq!(page.active_category, Some(2));
    }

    #[test]
    fn enter_selects_the_highlighted_background() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        loaded(&mut page, &s, &["1", "2"]);
        page.handle_key(key('j'), &s);
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::SelectBackground(url)] if url == "https://img.example/2/large.jpg"
        ));
    }

    #[test]
    fn continue_carries_the_current_backdrop() {
        let mut s = session();
        s.select_background("https://img.example/9/large.jpg");
        let mut page = BreathPage::new(&SearchConfig::default());
        let actions = page.handle_key(key('c'), &s);
        match actions.as_slice() {
            [Action::Navigate(
                Route::Sound,
                Some(NavigationPayload::BackgroundChosen { updated_background }),
            )] => assert_eq!(
                updated_background.as_deref(),
                Some("https://img.example/9/large.jpg")
            ),
            other => panic!("unexpected actions: {:?}", other),
        }
    }

    #[test]
    fn reset_clears_query_and_category() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        page.handle_key(key('1'), &s);
        let actions = page.handle_key(key('r'), &s);
        assert!(matches!(actions.as_slice(), [Action::ResetBackground]));
        assert_eq!(page.active_category, None);
        assert!(page.query.is_empty());
    }

    #[test]
    fn empty_search_falls_back_to_default_query() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        page.handle_key(key('/'), &s);
        assert!(page.is_editing());
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::SearchImages(q)] if q == "calm nature"
        ));
    }

    #[test]
    fn failed_search_shows_message_and_clears_results() {
        let s = session();
        let mut page = BreathPage::new(&SearchConfig::default());
        loaded(&mut page, &s, &["1"]);
        page.on_action(
            &Action::ImagesLoaded(Err(CatalogError::FetchFailed("timeout".into()))),
            &s,
        );
        assert!(page.list.is_empty());
        assert_eq!(
            page.message.as_deref(),
            Some("Failed to fetch images. Please try again.")
        );
    }
}
