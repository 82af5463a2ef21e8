use crate::ui::conversation::commands::{parse_slash_command, ParsedCommand};
use crate::ui::theme::ThemeMode;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const MAX_VISIBLE_LINES: u16 = 5;

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer. `cursor_position` counts chars.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_index(&self, char_position: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_position)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.content.insert(at, c);
        self.cursor_position += 1;
    }

    fn insert_str(&mut self, text: &str) {
        let at = self.byte_index(self.cursor_position);
        self.content.insert_str(at, text);
        self.cursor_position += text.chars().count();
    }

    /// Delete character before cursor
    fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) {
        if self.cursor_position < self.char_len() {
            let at = self.byte_index(self.cursor_position);
            self.content.remove(at);
        }
    }

    fn take(&mut self) -> String {
        self.cursor_position = 0;
        std::mem::take(&mut self.content)
    }
}

/// Conversation composer for user input
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    busy: bool,
    theme: ThemeMode,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            busy: false,
            theme: ThemeMode::default(),
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    self.state.insert_char('\n');
                } else if let Some(command) = parse_slash_command(&self.state.content) {
                    // Commands stay available while a reply is pending
                    self.state.take();
                    return ConversationResult::Command(command);
                } else if !self.busy && !self.state.content.trim().is_empty() {
                    return ConversationResult::Submitted(self.state.take());
                }
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.state.insert_char(c);
                }
            }
            KeyCode::Tab => self.state.insert_str("    "),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Delete => self.state.delete(),
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor_position < self.state.char_len() {
                    self.state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.char_len();
            }
            _ => {}
        }

        ConversationResult::None
    }

    /// Insert pasted text at the cursor; newlines are kept
    pub fn paste(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.state.insert_str(&normalized);
    }

    /// While busy, Enter does not submit; typing still works
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn cursor_position(&self) -> usize {
        self.state.cursor_position
    }

    /// Rows needed to show the content, borders included
    pub fn desired_height(&self) -> u16 {
        let lines = self.state.content.split('\n').count() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + 2
    }

    fn title(&self) -> &'static str {
        if self.busy {
            " Waiting for reply… "
        } else {
            " Message (Enter to send, Shift+Enter for new line) "
        }
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.theme.palette();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(palette.border(!self.busy))
            .style(palette.base());

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.is_empty() {
            return;
        }

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(&self.placeholder, palette.muted())]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
            return;
        }

        // Render content with cursor indicator
        let mut content = self.state.content.clone();
        content.insert(self.state.byte_index(self.state.cursor_position), '▌');

        let lines: Vec<&str> = content.split('\n').collect();
        let cursor_line = self.state.content[..self.state.byte_index(self.state.cursor_position)]
            .matches('\n')
            .count();
        let height = inner_area.height as usize;
        let first = (cursor_line + 1).saturating_sub(height);

        for (i, line_text) in lines.iter().skip(first).take(height).enumerate() {
            let line = Line::from(vec![Span::raw(*line_text)]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}
