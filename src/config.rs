use crate::conversation::DEFAULT_GREETING;
use crate::ui::theme::ThemeMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the bearer credential
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3-8b-instruct";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the completion endpoint
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// First assistant message of every session
    pub greeting: String,

    /// UI preferences
    pub ui: UiConfig,

    /// NovaChat home directory
    #[serde(skip)]
    pub home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: ThemeMode,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".novachat");

        Config {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            ui: UiConfig::default(),
            home,
        }
    }
}

impl Config {
    /// Load configuration from `~/.novachat/config.toml`, then the environment
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let mut config = Self::load_from(&home.join(".novachat"))?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific home directory, ignoring the environment
    pub fn load_from(home: &Path) -> Result<Self> {
        let config_path = home.join("config.toml");

        let mut config: Config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.home = home.to_path_buf();
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.home.join("novachat.log")
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Full URL of the chat completions route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Human-readable dump with the credential masked
    pub fn redacted(&self) -> String {
        let key = match self.api_key() {
            Some(key) if key.chars().count() > 8 => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}…{}", head, tail)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        };
        format!(
            "config:   {}\nendpoint: {}\nmodel:    {}\napi key:  {}\ntheme:    {}",
            self.config_path().display(),
            self.completions_url(),
            self.model,
            key,
            self.ui.theme.as_ref(),
        )
    }
}
