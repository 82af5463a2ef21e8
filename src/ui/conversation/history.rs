//! Conversation history display component

use crate::conversation::{Conversation, Turn};
use crate::events::Role;
use crate::ui::theme::{Palette, ThemeMode};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use std::cell::Cell;

/// Scroll and theme state of the history pane
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    /// Lines scrolled up from the bottom
    scroll_offset: usize,
    /// Largest useful offset seen at the last render
    max_scroll: Cell<usize>,
    theme: ThemeMode,
}

impl ConversationHistory {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Borrow a conversation for drawing
    pub fn view<'a>(&'a self, conversation: &'a Conversation) -> HistoryView<'a> {
        HistoryView {
            history: self,
            conversation,
        }
    }
}

/// Widget drawing a conversation with the history's scroll state
pub struct HistoryView<'a> {
    history: &'a ConversationHistory,
    conversation: &'a Conversation,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.history.theme.palette();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" 💬 Conversation ")
            .border_style(palette.muted())
            .style(palette.base());

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.is_empty() {
            return;
        }

        let width = inner_area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for turn in self.conversation.turns() {
            all_lines.extend(render_turn(turn, width, &palette));
            // spacing between messages
            all_lines.push(Line::default());
        }
        all_lines.pop();

        // Determine the range of lines to display from the bottom
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_scroll = total.saturating_sub(height);
        self.history.max_scroll.set(max_scroll);

        let offset = self.history.scroll_offset.min(max_scroll);
        let end = total - offset;
        let start = end.saturating_sub(height);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if max_scroll > 0 {
            let mut state = ScrollbarState::new(max_scroll).position(max_scroll - offset);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut state);
        }
    }
}

/// Render a single message into lines
fn render_turn(turn: &Turn, width: usize, palette: &Palette) -> Vec<Line<'static>> {
    let message = &turn.message;
    let timestamp = turn.at.format("%H:%M").to_string();
    let content_width = width.saturating_sub(4).max(1);

    let (header, content_style) = match message.role {
        Role::User => (
            format!("{} · {} 👤", timestamp, message.role.display_name()),
            Style::default().fg(palette.user),
        ),
        Role::Assistant => (
            format!("🤖 {} · {}", message.role.display_name(), timestamp),
            Style::default().fg(palette.assistant),
        ),
    };

    let mut lines = vec![align(
        message.role,
        Span::styled(header, palette.muted().add_modifier(Modifier::BOLD)),
        width,
    )];

    for content_line in wrap_text(&message.content, content_width) {
        lines.push(align(message.role, Span::styled(content_line, content_style), width));
    }

    lines
}

/// User messages hug the right edge, assistant messages the left
fn align(role: Role, span: Span<'static>, width: usize) -> Line<'static> {
    match role {
        Role::Assistant => Line::from(vec![Span::raw("  "), span]),
        Role::User => {
            let used = span.width() + 2;
            let pad = width.saturating_sub(used);
            Line::from(vec![Span::raw(" ".repeat(pad)), span])
        }
    }
}

/// Wrap text to fit within the given width. Explicit newlines are kept and
/// words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current_line.extend(word);
        }

        lines.push(current_line);
    }

    lines
}
