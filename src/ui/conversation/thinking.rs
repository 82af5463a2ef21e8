use crate::ui::theme::ThemeMode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Animated "Thinking..." line shown while a reply is pending
#[derive(Debug, Clone, Default)]
pub struct ThinkingIndicator {
    frame: usize,
    theme: ThemeMode,
}

impl ThinkingIndicator {
    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    /// Advance the animation by one tick
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % 4;
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    fn dots(&self) -> [&'static str; 3] {
        // A single bright dot walks across three dim ones
        let mut dots = ["·", "·", "·"];
        if self.frame < 3 {
            dots[self.frame] = "●";
        }
        dots
    }
}

impl Widget for &ThinkingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let palette = self.theme.palette();
        let dot_style = Style::default().fg(palette.accent);

        let mut spans = vec![Span::raw("  ")];
        for dot in self.dots() {
            spans.push(Span::styled(dot, dot_style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            "Thinking...",
            Style::default().fg(palette.accent).add_modifier(Modifier::ITALIC),
        ));

        buf.set_style(area, palette.base());
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
