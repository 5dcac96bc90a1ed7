//! Page trait: the interface every routed screen implements.
//!
//! - Pages own their view state (query, list selection, messages).
//! - Pages read the ambient session (backdrop, favorites, sound) but never
//!   mutate it; they return `Vec<Action>` and the App applies them.
//! - The App builds a fresh page on every entry, so nothing carries over a
//!   reload or a back-navigation except what the session keeps.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use space_core::{AmbientSession, Route};

use crate::action::Action;

pub trait Page {
    fn route(&self) -> Route;

    /// Work to start once the page is shown (initial searches).
    fn on_enter(&mut self, _session: &AmbientSession) -> Vec<Action> {
        Vec::new()
    }

    /// Handle a key event. Global keys reach the page first only while it is
    /// editing text.
    fn handle_key(&mut self, key: KeyEvent, session: &AmbientSession) -> Vec<Action>;

    /// Receive an action after the App applied it.
    fn on_action(&mut self, _action: &Action, _session: &AmbientSession) -> Vec<Action> {
        Vec::new()
    }

    /// Called each tick (~100ms).
    fn tick(&mut self) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, session: &AmbientSession);

    /// Key hints for the status bar.
    fn keys(&self) -> &'static str;

    /// True while a text input owns the keyboard.
    fn is_editing(&self) -> bool {
        false
    }
}
