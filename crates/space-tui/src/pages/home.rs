//! Home: welcome text and the list of exercises.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use space_core::{AmbientSession, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::is_press;
use crate::theme::{style_secondary, style_selected, C_ACCENT, C_MUTED, C_PRIMARY};
use crate::widgets::pane_chrome::pane_chrome;
use crate::widgets::toast::Severity;

struct Exercise {
    title: &'static str,
    blurb: &'static str,
    route: Option<Route>,
}

const EXERCISES: [Exercise; 3] = [
    Exercise {
        title: "A Breath of Fresh Air",
        blurb: "Pick a calming backdrop and a background sound, then breathe along.",
        route: Some(Route::Breath),
    },
    Exercise {
        title: "The Mood Cupid",
        blurb: "Match your mood with something that lifts it.",
        route: None,
    },
    Exercise {
        title: "Did You Mean...?",
        blurb: "Reframe an anxious thought into a kinder one.",
        route: None,
    },
];

const INTRO: &str = "A quiet corner for a few minutes of calm. Choose an exercise \
to begin; your background and favorites are remembered between visits.";

pub struct HomePage {
    selected: usize,
}

impl HomePage {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    fn open(&self) -> Action {
        let exercise = &EXERCISES[self.selected];
        match exercise.route {
            Some(route) => Action::Navigate(route, None),
            None => Action::Notify(
                Severity::Info,
                format!("\"{}\" is not available here yet.", exercise.title),
            ),
        }
    }
}

impl Page for HomePage {
    fn route(&self) -> Route {
        Route::Home
    }

    fn handle_key(&mut self, key: KeyEvent, _session: &AmbientSession) -> Vec<Action> {
        if !is_press(&key) {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(EXERCISES.len() - 1);
                vec![]
            }
            KeyCode::Enter => vec![self.open()],
            KeyCode::Char('v') => vec![Action::Navigate(Route::Favorites, None)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _session: &AmbientSession) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " Welcome to Safe Space",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ))),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(format!(" {}", INTRO))
                .style(style_secondary())
                .wrap(Wrap { trim: true }),
            rows[1],
        );

        let block = pane_chrome("Exercises", None, true, None);
        let inner = block.inner(rows[2]);
        frame.render_widget(block, rows[2]);

        let mut lines = Vec::new();
        for (idx, exercise) in EXERCISES.iter().enumerate() {
            let title = Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    exercise.title,
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ),
            ]);
            lines.push(if idx == self.selected {
                title.style(style_selected())
            } else {
                title
            });
            lines.push(Line::from(Span::styled(
                format!("   {}", exercise.blurb),
                Style::default().fg(C_MUTED),
            )));
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn keys(&self) -> &'static str {
        " ↑↓ choose  Enter start  v favorites"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{code, key, session};

    #[test]
    fn first_exercise_opens_breath() {
        let s = session();
        let mut page = HomePage::new();
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::Navigate(Route::Breath, None)]
        ));
    }

    #[test]
    fn other_exercises_only_notify() {
        let s = session();
        let mut page = HomePage::new();
        page.handle_key(key('j'), &s);
        let actions = page.handle_key(code(KeyCode::Enter), &s);
        match actions.as_slice() {
            [Action::Notify(Severity::Info, msg)] => assert!(msg.contains("The Mood Cupid")),
            other => panic!("unexpected actions: {:?}", other),
        }

        page.handle_key(key('j'), &s);
        page.handle_key(key('j'), &s);
        assert_eq!(page.selected, EXERCISES.len() - 1);
    }
}
