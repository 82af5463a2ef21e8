use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use novachat::app::App;
use novachat::ui::theme::ThemeMode;
use novachat::{ChatSession, Config, LlmClient, SendState, Submission};
use std::fs::{self, OpenOptions};

#[derive(Parser)]
#[command(name = "novachat")]
#[command(version)]
#[command(about = "Chat with a hosted LLM from your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model identifier sent with every request
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key (defaults to $OPENROUTER_API_KEY or the config file)
    #[arg(long, global = true, hide = true)]
    api_key: Option<String>,

    /// Color theme: dark or light
    #[arg(long)]
    theme: Option<ThemeMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// The message to send
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Show the resolved configuration
    Config,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(theme) = self.theme {
            config.ui.theme = theme;
        }
    }
}

/// Interactive mode logs to a file so the terminal stays clean
fn init_file_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.home).context("Failed to create .novachat directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .with_context(|| format!("Failed to open {}", config.log_path().display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

async fn ask(config: &Config, prompt: String) -> Result<()> {
    let client = LlmClient::new(config);
    let mut session = ChatSession::new(config.greeting.clone());

    if session.send(&client, prompt).await == Submission::Ignored {
        bail!("Nothing to send: the message is empty");
    }

    match session.state() {
        SendState::Failed(reason) => bail!("Request failed: {}", reason),
        _ => {
            let reply = session
                .conversation()
                .nth_latest_assistant(1)
                .context("No reply received")?;
            println!("{}", reply.content);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    cli.apply(&mut config);

    match cli.command {
        None => {
            init_file_logging(&config)?;
            info!("starting NovaChat with model {}", config.model);
            if !config.has_api_key() {
                warn!("no API key configured; requests will fail until OPENROUTER_API_KEY is set");
            }

            let client = LlmClient::new(&config);
            App::new(&config, client).run().await
        }
        Some(Commands::Ask { prompt }) => {
            init_stderr_logging();
            ask(&config, prompt.join(" ")).await
        }
        Some(Commands::Config) => {
            init_stderr_logging();
            println!("{}", config.redacted());
            Ok(())
        }
    }
}
