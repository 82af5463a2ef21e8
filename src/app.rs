use crate::config::Config;
use crate::events::{AppEvent, Message, TuiEvent};
use crate::llm::Completer;
use crate::session::ChatSession;
use crate::tui::{self, EventHandler, Tui};
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use log::{debug, info};
use tokio::sync::mpsc;

/// The interactive chat application: one session, one event loop
pub struct App<C: Completer> {
    manager: ConversationManager,
    completer: C,
    should_quit: bool,
}

impl<C: Completer> App<C> {
    pub fn new(config: &Config, completer: C) -> Self {
        let session = ChatSession::new(config.greeting.clone());
        Self {
            manager: ConversationManager::new(session, config.model.clone(), config.ui.theme),
            completer,
            should_quit: false,
        }
    }

    /// Take over the terminal and run until the user quits
    pub async fn run(mut self) -> Result<()> {
        tui::install_panic_hook();
        let mut terminal = tui::init().context("Failed to initialize terminal")?;

        let result = self.event_loop(&mut terminal).await;

        tui::restore().context("Failed to restore terminal")?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut events = EventHandler::new();
        let sender = events.sender();

        while !self.should_quit {
            terminal.draw(|frame| frame.render_widget(&self.manager, frame.size()))?;

            let Some(event) = events.next().await else {
                break;
            };
            self.handle_event(event, &sender);
        }

        info!("leaving chat");
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent, sender: &mpsc::UnboundedSender<AppEvent>) {
        match event {
            AppEvent::Tui(TuiEvent::Key(key)) => match self.manager.handle_key(key) {
                ConversationAction::Send(messages) => self.spawn_completion(messages, sender.clone()),
                ConversationAction::Exit => self.should_quit = true,
                ConversationAction::None => {}
            },
            AppEvent::Tui(TuiEvent::Paste(text)) => self.manager.paste(&text),
            AppEvent::Tui(TuiEvent::Resize(w, h)) => debug!("terminal resized to {}x{}", w, h),
            AppEvent::Tui(TuiEvent::Tick) => self.manager.tick(),
            AppEvent::CompletionFinished(outcome) => self.manager.on_completion(outcome),
        }
    }

    /// Run the request off the loop so the UI stays responsive
    fn spawn_completion(&self, messages: Vec<Message>, sender: mpsc::UnboundedSender<AppEvent>) {
        let completer = self.completer.clone();
        tokio::spawn(async move {
            let outcome = completer.complete(messages).await;
            // The loop may already be gone if the user quit mid-request
            let _ = sender.send(AppEvent::CompletionFinished(outcome));
        });
    }
}
