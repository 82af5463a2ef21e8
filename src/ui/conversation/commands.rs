use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Show help
    Help,
    /// Toggle between dark and light theme
    Theme,
    /// Copy an assistant message to the clipboard
    Copy,
    /// Exit the application
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Which assistant message `/copy` targets, counted back from the latest.
    /// `None` when the argument is present but not a positive number.
    pub fn copy_target(&self) -> Option<usize> {
        match self.argument() {
            None => Some(1),
            Some(arg) => arg.trim().parse::<usize>().ok().filter(|n| *n > 0),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Help => "show available commands and keys",
            SlashCommand::Theme => "toggle dark / light theme",
            SlashCommand::Copy => "copy the latest reply (or /copy <n> for the n-th latest)",
            SlashCommand::Quit => "exit NovaChat",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input. Unknown commands are not commands:
/// the text is sent as an ordinary message. The same goes for known commands
/// followed by text they do not take, so "/help me write a poem" is a message.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].split_whitespace();
    let head = parts.next()?.to_lowercase();
    let rest: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "h" | "?" => Some(SlashCommand::Help),
        "y" | "yank" => Some(SlashCommand::Copy),
        _ => None,
    })?;

    let argument = match (command, rest.as_slice()) {
        (_, []) => None,
        (SlashCommand::Copy, [n]) if n.chars().all(|c| c.is_ascii_digit()) => Some(n.to_string()),
        _ => return None,
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("  /{:<6} {}\n", command.command(), command.description()));
    }

    help.push_str("\nKeys:\n");
    help.push_str("  Enter            send message\n");
    help.push_str("  Shift/Alt+Enter  new line\n");
    help.push_str("  Ctrl+Y           copy latest reply\n");
    help.push_str("  Ctrl+T           toggle theme\n");
    help.push_str("  PgUp/PgDn        scroll conversation\n");
    help.push_str("  Ctrl+C/Ctrl+D    quit\n");
    help.push_str("\nAliases: /q /exit /bye for /quit, /h for /help, /y for /copy");

    help
}
