//! Status bar: route, backdrop and sound state, plus the page's keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use space_core::{Backdrop, Route};

use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_SECONDARY};
use crate::widgets::media_list::truncate;

/// Top line: where we are and what the ambient session currently holds.
pub fn draw_session_bar(
    frame: &mut Frame,
    area: Rect,
    route: Route,
    backdrop: &Backdrop,
    sound: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(
            " SAFE SPACE ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(route.path(), Style::default().fg(C_SECONDARY)),
        Span::raw("  "),
    ];

    let budget = (area.width as usize / 3).max(12);
    match backdrop.image_url() {
        Some(url) => {
            spans.push(Span::styled("▣ ", Style::default().fg(C_PLAYING)));
            spans.push(Span::styled(
                truncate(url, budget),
                Style::default().fg(C_SECONDARY),
            ));
        }
        None => spans.push(Span::styled("▢ default background", Style::default().fg(C_MUTED))),
    }

    spans.push(Span::raw("  "));
    match sound {
        Some(url) => {
            spans.push(Span::styled("♪ ", Style::default().fg(C_PLAYING)));
            spans.push(Span::styled(
                truncate(url, budget),
                Style::default().fg(C_SECONDARY),
            ));
        }
        None => spans.push(Span::styled("♪ silent", Style::default().fg(C_MUTED))),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Bottom line: key hints for the current page.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, page_keys: &str, searching: bool) {
    let keys = if searching {
        " type a query  Enter search  Esc clear/close"
    } else {
        page_keys
    };
    let line = Line::from(vec![
        Span::styled(keys, Style::default().fg(C_MUTED)),
        Span::styled("  h home  b back  q quit", Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
