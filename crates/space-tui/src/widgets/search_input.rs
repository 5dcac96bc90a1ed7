//! SearchInput: wraps tui-input as the query bar on the Breath and Sound pages.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, PartialEq)]
pub enum SearchAction {
    /// Enter pressed; carries the trimmed query (possibly empty).
    Submitted(String),
    Cancelled,
    Editing,
}

pub struct SearchInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle a key while active.
    ///
    /// Esc with text clears the text; Esc on an empty bar closes it.
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.clear();
                    SearchAction::Editing
                } else {
                    self.active = false;
                    SearchAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.active = false;
                SearchAction::Submitted(self.input.value().trim().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                SearchAction::Editing
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(4) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let display = if value.is_empty() && !self.active {
            Span::styled(
                format!("/ {}", self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), Style::default().fg(C_FILTER_FG))
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_FILTER_BG));
        frame.render_widget(paragraph, area);

        if self.active && area.width > 0 {
            let cursor_x = area.x + 2 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_then_enter_submits_trimmed_query() {
        let mut input = SearchInput::new("search");
        input.activate();
        for c in " river ".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            SearchAction::Submitted("river".into())
        );
        assert!(!input.is_active());
    }

    #[test]
    fn escape_clears_then_closes() {
        let mut input = SearchInput::new("search");
        input.activate();
        input.handle_key(key(KeyCode::Char('x')));
        assert_eq!(input.handle_key(key(KeyCode::Esc)), SearchAction::Editing);
        assert_eq!(input.input.value(), "");
        assert_eq!(input.handle_key(key(KeyCode::Esc)), SearchAction::Cancelled);
        assert!(!input.is_active());
    }
}
