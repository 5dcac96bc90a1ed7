//! Sound: search sounds, loop one as the background, then continue.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use space_core::config::SearchConfig;
use space_core::{AmbientSession, NavigationPayload, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::{catalog_message, digit_index, draw_categories, is_press, Category, MediaKind};
use crate::theme::{style_error, style_muted, style_secondary, C_ACCENT, C_MUTED, C_PLAYING, C_PRIMARY};
use crate::widgets::media_list::{truncate, MediaList};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::search_input::{SearchAction, SearchInput};

pub const CATEGORIES: [Category; 4] = [
    Category {
        label: "Forest",
        query: "forest rain, ambient nature sounds",
    },
    Category {
        label: "Ocean",
        query: "calming ocean, beach sounds",
    },
    Category {
        label: "Rain",
        query: "soothing rain, peaceful rain sounds",
    },
    Category {
        label: "Piano",
        query: "soft piano, peaceful piano sounds",
    },
];

const EMPTY_QUERY: &str = "Please enter a search term.";
const NO_PREVIEW: &str = "Preview not available";

pub struct SoundPage {
    search: SearchInput,
    default_query: String,
    query: String,
    active_category: Option<usize>,
    list: MediaList,
    message: Option<String>,
    loading: bool,
}

impl SoundPage {
    pub fn new(search: &SearchConfig) -> Self {
        Self {
            search: SearchInput::new("search sounds"),
            default_query: search.default_sound_query.clone(),
            query: String::new(),
            active_category: None,
            list: MediaList::new(),
            message: None,
            loading: false,
        }
    }

    fn run_search(&mut self, query: String) -> Vec<Action> {
        if query.trim().is_empty() {
            self.message = Some(EMPTY_QUERY.to_string());
            return vec![];
        }
        self.query = query.clone();
        self.loading = true;
        self.message = None;
        vec![Action::SearchSounds(query)]
    }

    fn toggle_selected(&mut self) -> Vec<Action> {
        let Some(item) = self.list.selected_item() else {
            return vec![];
        };
        match item.sound_url() {
            Some(url) => vec![Action::ToggleSound(url.to_string())],
            None => {
                self.message = Some(NO_PREVIEW.to_string());
                vec![]
            }
        }
    }
}

impl Page for SoundPage {
    fn route(&self) -> Route {
        Route::Sound
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
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('s') => vec![Action::StopSound],
            KeyCode::Char('c') => vec![Action::Navigate(
                Route::FinalPage,
                Some(NavigationPayload::SessionReady {
                    background: session.stored_background(),
                    audio: session.playback().current_url().map(str::to_string),
                }),
            )],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _session: &AmbientSession) -> Vec<Action> {
        if let Action::SoundsLoaded(result) = action {
            self.loading = false;
            match result {
                Ok(items) => {
                    self.list.set_items(items.clone());
                    self.message = None;
                }
                Err(e) => {
                    self.list.set_items(Vec::new());
                    self.message = Some(catalog_message(MediaKind::Sounds, e));
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
        } else {
            Line::from(Span::styled(
                format!(" Results for \"{}\"", truncate(&self.query, 48)),
                style_secondary(),
            ))
        };
        frame.render_widget(Paragraph::new(status), rows[2]);

        let playing = session.playback().current_url().map(str::to_string);
        let badge_text = if playing.is_some() { "♪ ON" } else { "♪ OFF" };
        let block = pane_chrome(
            "Background Sounds",
            Some("/"),
            !self.search.is_active(),
            Some(Badge {
                text: badge_text,
                color: if playing.is_some() { C_PLAYING } else { C_MUTED },
            }),
        );
        let width = rows[3].width as usize;
        self.list.draw(frame, rows[3], block, true, |item| {
            let name = Span::styled(
                truncate(&item.alt_text, width.saturating_sub(24)),
                Style::default().fg(C_PRIMARY),
            );
            let button = match item.sound_url() {
                Some(url) if playing.as_deref() == Some(url) => {
                    Span::styled("  [Stop Background]", Style::default().fg(C_PLAYING))
                }
                Some(_) => Span::styled("  [Set as Background]", Style::default().fg(C_ACCENT)),
                None => Span::styled(format!("  {}", NO_PREVIEW), Style::default().fg(C_MUTED)),
            };
            vec![name, button]
        });
    }

    fn keys(&self) -> &'static str {
        " 1-4 category  / search  Enter play/stop  s stop  c continue"
    }

    fn is_editing(&self) -> bool {
        self.search.is_active()
    }
}
