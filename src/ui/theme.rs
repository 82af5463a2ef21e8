use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Which palette the UI is drawn with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ThemeMode::Dark => "☀",
            ThemeMode::Light => "☾",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Dark => Palette {
                background: Color::Rgb(20, 30, 48),
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Rgb(65, 105, 225),
                user: Color::Rgb(34, 211, 238),
                assistant: Color::Rgb(229, 231, 235),
                error: Color::LightRed,
            },
            ThemeMode::Light => Palette {
                background: Color::Rgb(230, 236, 255),
                text: Color::Rgb(17, 24, 39),
                muted: Color::DarkGray,
                accent: Color::Rgb(65, 105, 225),
                user: Color::Rgb(37, 99, 235),
                assistant: Color::Rgb(31, 41, 55),
                error: Color::Red,
            },
        }
    }
}

/// Concrete colors for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub error: Color,
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }
}
