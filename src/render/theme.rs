use ratatui::style::{Color, Modifier, Style};

/// Colours and glyphs used by the [`Renderer`](super::Renderer)
///
/// Built once and handed to the renderer; nothing here is global.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub grid: Color,
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub text: Color,
    pub text_dim: Color,
    pub accent: Color,
    pub stop: Color,
    pub head_glyph: &'static str,
    pub body_glyph: &'static str,
    pub food_glyph: &'static str,
    pub empty_glyph: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(18, 18, 24),
            grid: Color::Rgb(40, 40, 50),
            snake_head: Color::Rgb(0, 255, 150),
            snake_body: Color::Rgb(0, 180, 100),
            food: Color::Rgb(255, 80, 80),
            text: Color::Rgb(240, 240, 240),
            text_dim: Color::Rgb(150, 150, 160),
            accent: Color::Rgb(255, 215, 0),
            stop: Color::Rgb(180, 60, 60),
            head_glyph: "■ ",
            body_glyph: "□ ",
            food_glyph: "● ",
            empty_glyph: "· ",
        }
    }
}

impl Theme {
    /// Plain 16-colour palette for terminals without true colour
    pub fn basic() -> Self {
        Self {
            background: Color::Reset,
            grid: Color::DarkGray,
            snake_head: Color::Cyan,
            snake_body: Color::Green,
            food: Color::Red,
            text: Color::White,
            text_dim: Color::Gray,
            accent: Color::Yellow,
            stop: Color::Red,
            head_glyph: "■ ",
            body_glyph: "□ ",
            food_glyph: "O ",
            empty_glyph: ". ",
        }
    }

    pub fn head_style(&self) -> Style {
        Style::default()
            .fg(self.snake_head)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn value_style(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }
}
