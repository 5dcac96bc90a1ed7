//! Scrollable list of media items with a single selection.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use space_core::MediaItem;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::{style_default, style_muted, style_selected};

#[derive(Default)]
pub struct MediaList {
    items: Vec<MediaItem>,
    selected: usize,
    scroll_offset: usize,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&mut self, items: Vec<MediaItem>) {
        self.items = items;
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.items.len() - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Keep the selection in range after items were removed.
    pub fn clamp_selection(&mut self) {
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        self.items.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Render inside `block`.  `row` builds the spans for one item; the
    /// list adds the card number and the selection highlight.
    pub fn draw<F>(&mut self, frame: &mut Frame, area: Rect, block: Block, focused: bool, row: F)
    where
        F: Fn(&MediaItem) -> Vec<Span<'static>>,
    {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        self.ensure_visible(height);

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(height)
            .map(|(idx, item)| {
                let mut spans = vec![Span::styled(format!("{:>2}. ", idx + 1), style_muted())];
                spans.extend(row(item));
                let line = Line::from(spans);
                if focused && idx == self.selected {
                    line.style(style_selected())
                } else {
                    line.style(style_default())
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Cut `text` to at most `max_width` terminal cells, adding an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}
