//! FinalPage: the breathing animation over the chosen background and sound.
//!
//! Ten circles sit on a ring, 36° apart.  The ring rotates slowly while the
//! circles grow on the in-breath and shrink on the out-breath.

use std::f64::consts::TAU;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Paragraph,
    },
    Frame,
};
use space_core::{AmbientSession, Route};

use crate::action::Action;
use crate::page::Page;
use crate::pages::is_press;
use crate::theme::{C_ACCENT, C_CIRCLE, C_NUMBER_HINT, C_SECONDARY};

pub const CIRCLES: usize = 10;
/// Ticks for one in-and-out breath at ~100ms per tick.
const BREATH_TICKS: u32 = 80;
/// Ticks for one full turn of the ring.
const TURN_TICKS: u32 = 600;

pub struct FinalPage {
    ticks: u32,
    paused: bool,
}

impl FinalPage {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            paused: false,
        }
    }

    /// 0.0 fully out, 1.0 fully in.
    fn breath(&self) -> f64 {
        let phase = (self.ticks % BREATH_TICKS) as f64 / BREATH_TICKS as f64;
        0.5 - 0.5 * (phase * TAU).cos()
    }

    fn inhaling(&self) -> bool {
        (self.ticks % BREATH_TICKS) < BREATH_TICKS / 2
    }

    /// Centre and radius of each circle for the current frame.
    pub fn circles(&self) -> Vec<(f64, f64, f64)> {
        let scale = 0.55 + 0.45 * self.breath();
        let rotation = (self.ticks % TURN_TICKS) as f64 / TURN_TICKS as f64 * TAU;
        (0..CIRCLES)
            .map(|i| {
                let angle = rotation + (i as f64 * 36.0).to_radians();
                let orbit = 0.45 * scale;
                (orbit * angle.cos(), orbit * angle.sin(), 0.35 * scale)
            })
            .collect()
    }
}

impl Page for FinalPage {
    fn route(&self) -> Route {
        Route::FinalPage
    }

    fn handle_key(&mut self, key: KeyEvent, _session: &AmbientSession) -> Vec<Action> {
        if !is_press(&key) {
            return vec![];
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                self.paused = !self.paused;
                vec![]
            }
            KeyCode::Char('s') => vec![Action::StopSound],
            KeyCode::Char('c') => vec![Action::StopSound, Action::Navigate(Route::Sound, None)],
            KeyCode::Char('i') => vec![Action::Navigate(Route::Breath, None)],
            _ => vec![],
        }
    }

    fn tick(&mut self) {
        if !self.paused {
            self.ticks = self.ticks.wrapping_add(1);
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, session: &AmbientSession) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(2),
            ])
            .split(area);

        let cue = if self.paused {
            "Paused"
        } else if self.inhaling() {
            "Breathe in..."
        } else {
            "Breathe out..."
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", cue),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )))
            .centered(),
            rows[0],
        );

        // Terminal cells are about twice as tall as wide.
        let aspect = (rows[1].width as f64 / (rows[1].height.max(1) as f64 * 2.0)).max(1.0);
        let circles = self.circles();
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-aspect, aspect])
            .y_bounds([-1.0, 1.0])
            .paint(move |ctx| {
                for &(x, y, radius) in &circles {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius,
                        color: C_CIRCLE,
                    });
                }
            });
        frame.render_widget(canvas, rows[1]);

        let animation = if self.paused {
            "Resume Animation"
        } else {
            "Stop Animation"
        };
        let sound_label = if session.playback().is_active() {
            "Stop Background Sound"
        } else {
            "Background sound off"
        };
        let button = |key: &'static str, label: &'static str| {
            vec![
                Span::styled(format!(" [{}] ", key), Style::default().fg(C_NUMBER_HINT)),
                Span::styled(label, Style::default().fg(C_SECONDARY)),
                Span::raw("  "),
            ]
        };
        let mut spans = button("space", animation);
        spans.extend(button("s", sound_label));
        spans.extend(button("c", "Change Background Sound"));
        spans.extend(button("i", "Change Background Image"));
        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            rows[2],
        );
    }

    fn keys(&self) -> &'static str {
        " space pause  s stop sound  c change sound  i change image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::{key, session};

    #[test]
    fn ten_circles_evenly_spaced() {
        let page = FinalPage::new();
        let circles = page.circles();
        assert_eq!(circles.len(), CIRCLES);
        let angle = |(x, y, _): (f64, f64, f64)| y.atan2(x);
        let step = (angle(circles[1]) - angle(circles[0])).rem_euclid(TAU);
        assert!((step - 36f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_the_animation() {
        let s = session();
        let mut page = FinalPage::new();
        page.tick();
        page.handle_key(key(' '), &s);
        let frozen = page.circles();
        for _ in 0..10 {
            page.tick();
        }
        assert_eq!(page.circles(), frozen);

        page.handle_key(key(' '), &s);
        page.tick();
        assert_ne!(page.circles(), frozen);
    }

    #[test]
    fn circles_breathe() {
        let mut page = FinalPage::new();
        let out_radius = page.circles()[0].2;
        for _ in 0..BREATH_TICKS / 2 {
            page.tick();
        }
        assert!(page.circles()[0].2 > out_radius);
    }

    #[test]
    fn change_sound_stops_before_leaving() {
        let s = session();
        let mut page = FinalPage::new();
        let actions = page.handle_key(key('c'), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::StopSound, Action::Navigate(Route::Sound, None)]
        ));
    }
}
