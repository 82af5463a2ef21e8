use crate::clipboard;
use crate::error::CompletionError;
use crate::events::Message;
use crate::session::{ChatSession, SendState, Submission};
use crate::ui::conversation::composer::ConversationResult;
use crate::ui::conversation::{
    get_help_text, ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand,
    ThinkingIndicator,
};
use crate::ui::theme::ThemeMode;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const PLACEHOLDER: &str = "Type something brilliant...";
const SCROLL_STEP: usize = 5;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    None,
    /// A send cycle started; these messages must go to the completion endpoint
    Send(Vec<Message>),
    Exit,
}

/// Transient one-line feedback on the status bar
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Manages the conversation flow and UI components
pub struct ConversationManager {
    session: ChatSession,
    history: ConversationHistory,
    composer: ConversationComposer,
    thinking: ThinkingIndicator,
    theme: ThemeMode,
    model: String,
    notice: Option<Notice>,
    show_help: bool,
}

impl ConversationManager {
    pub fn new(session: ChatSession, model: impl Into<String>, theme: ThemeMode) -> Self {
        let mut manager = Self {
            session,
            history: ConversationHistory::new(theme),
            composer: ConversationComposer::new(PLACEHOLDER),
            thinking: ThinkingIndicator::default(),
            theme,
            model: model.into(),
            notice: None,
            show_help: false,
        };
        manager.set_theme(theme);
        manager
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        if self.show_help {
            self.show_help = false;
            if key.code == KeyCode::Esc {
                return ConversationAction::None;
            }
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => return ConversationAction::Exit,
                KeyCode::Char('t') => {
                    self.toggle_theme();
                    return ConversationAction::None;
                }
                KeyCode::Char('y') => {
                    self.copy_reply(1);
                    return ConversationAction::None;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::PageUp => {
                self.history.scroll_up(SCROLL_STEP);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(SCROLL_STEP);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ConversationResult::Submitted(input) => self.handle_input(input),
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    /// Hand the text to the session and start a send cycle
    pub fn handle_input(&mut self, input: String) -> ConversationAction {
        match self.session.submit_text(input.clone()) {
            Submission::Started(messages) => {
                self.notice = None;
                self.composer.set_busy(true);
                self.thinking.reset();
                self.history.scroll_to_bottom();
                ConversationAction::Send(messages)
            }
            Submission::Rejected => {
                // Put the text back so nothing typed is lost
                self.composer.paste(&input);
                self.notice = Some(Notice::Info("Still waiting for the previous reply".to_string()));
                ConversationAction::None
            }
            Submission::Ignored => ConversationAction::None,
        }
    }

    /// Apply the result of the in-flight request
    pub fn on_completion(&mut self, outcome: Result<Message, CompletionError>) {
        self.session.resolve(outcome);
        self.composer.set_busy(self.session.is_request_in_flight());
        self.history.scroll_to_bottom();
    }

    pub fn paste(&mut self, text: &str) {
        self.composer.paste(text);
    }

    /// Advance animations
    pub fn tick(&mut self) {
        if self.session.is_request_in_flight() {
            self.thinking.tick();
        }
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme.toggled());
        info!("theme switched to {}", self.theme.as_ref());
    }

    fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.history.set_theme(theme);
        self.composer.set_theme(theme);
        self.thinking.set_theme(theme);
    }

    /// Copy the n-th latest assistant message
    fn copy_reply(&mut self, n: usize) {
        let Some(message) = self.session.conversation().nth_latest_assistant(n) else {
            self.notice = Some(Notice::Error(format!("No reply #{} to copy", n)));
            return;
        };

        self.notice = match clipboard::copy(&message.content) {
            Ok(()) => Some(Notice::Info("Copied reply to clipboard".to_string())),
            Err(e) => {
                warn!("clipboard copy failed: {:#}", e);
                Some(Notice::Error(format!("Copy failed: {}", e)))
            }
        };
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        match command.command {
            SlashCommand::Help => {
                self.show_help = true;
                ConversationAction::None
            }
            SlashCommand::Theme => {
                self.toggle_theme();
                ConversationAction::None
            }
            SlashCommand::Copy => {
                match command.copy_target() {
                    Some(n) => self.copy_reply(n),
                    None => {
                        self.notice = Some(Notice::Error("Usage: /copy [n]".to_string()));
                    }
                }
                ConversationAction::None
            }
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }

    fn status_line(&self) -> Line<'static> {
        let palette = self.theme.palette();
        match (&self.notice, self.session.state()) {
            (Some(Notice::Error(text)), _) => Line::from(Span::styled(format!(" {}", text), palette.error())),
            (Some(Notice::Info(text)), _) => Line::from(Span::styled(format!(" {}", text), palette.muted())),
            (None, SendState::Failed(reason)) => Line::from(Span::styled(
                format!(" ✗ Request failed: {}", reason),
                palette.error(),
            )),
            (None, _) => Line::from(Span::styled(
                " Ctrl+Y copy · Ctrl+T theme · PgUp/PgDn scroll · /help · Ctrl+C/D quit",
                palette.muted(),
            )),
        }
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.theme.palette();
        buf.set_style(area, palette.base());

        let thinking_height = if self.session.is_request_in_flight() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                               // Header
                Constraint::Min(3),                                  // History
                Constraint::Length(thinking_height),                 // Thinking
                Constraint::Length(self.composer.desired_height()),  // Composer
                Constraint::Length(1),                               // Status
            ])
            .split(area);

        // Header
        if !chunks[0].is_empty() {
            buf.set_style(chunks[0], palette.header());
            let title = Line::from(Span::styled(" ✨ NovaChat AI", palette.header()));
            buf.set_line(chunks[0].x, chunks[0].y, &title, chunks[0].width);
            let right = format!("{}  {} ", self.model, self.theme.icon());
            let right_width = right.chars().count() as u16;
            if right_width + 16 < chunks[0].width {
                let x = chunks[0].x + chunks[0].width - right_width;
                buf.set_string(x, chunks[0].y, right, palette.header());
            }
        }

        self.history.view(self.session.conversation()).render(chunks[1], buf);

        if self.session.is_request_in_flight() {
            (&self.thinking).render(chunks[2], buf);
        }

        (&self.composer).render(chunks[3], buf);

        if !chunks[4].is_empty() {
            buf.set_line(chunks[4].x, chunks[4].y, &self.status_line(), chunks[4].width);
        }

        if self.show_help && !area.is_empty() {
            let help = get_help_text();
            let height = (help.lines().count() as u16 + 2).min(area.height);
            let width = 64.min(area.width);
            let popup = Rect {
                x: area.x + (area.width - width) / 2,
                y: area.y + (area.height - height) / 2,
                width,
                height,
            };
            Clear.render(popup, buf);
            Paragraph::new(help)
                .wrap(Wrap { trim: false })
                .style(palette.base())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Help (any key to close) ")
                        .border_style(palette.border(true)),
                )
                .render(popup, buf);
        }
    }
}
