//! Terminal styling
//!
//! One [`StyleRole`] per kind of thing we colour. Callers pass an `enabled`
//! flag instead of consulting global state, so `--no-color` is honoured
//! everywhere the same way.

use clap::builder::styling::{AnsiColor, Color as ClapColor, Style, Styles};
use colored::{Color, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Header,
    Literal,
    Placeholder,
    Loaded,
    Broken,
    Disabled,
    Hint,
    Error,
}

impl StyleRole {
    pub fn color(self) -> Color {
        match self {
            StyleRole::Header => Color::Yellow,
            StyleRole::Literal => Color::Cyan,
            StyleRole::Placeholder => Color::Green,
            StyleRole::Loaded => Color::Green,
            StyleRole::Broken => Color::Red,
            StyleRole::Disabled => Color::BrightBlack,
            StyleRole::Hint => Color::Blue,
            StyleRole::Error => Color::BrightRed,
        }
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        if enabled {
            text.color(self.color()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Foreground spec for `prettytable::Cell::style_spec`
    pub fn table_spec(self) -> &'static str {
        match self.color() {
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Blue => "Fb",
            Color::Cyan => "Fc",
            Color::BrightRed => "FR",
            Color::BrightBlack => "FK",
            _ => "",
        }
    }

    fn ansi(self) -> Option<AnsiColor> {
        match self.color() {
            Color::Red => Some(AnsiColor::Red),
            Color::Green => Some(AnsiColor::Green),
            Color::Yellow => Some(AnsiColor::Yellow),
            Color::Blue => Some(AnsiColor::Blue),
            Color::Cyan => Some(AnsiColor::Cyan),
            Color::BrightRed => Some(AnsiColor::BrightRed),
            Color::BrightBlack => Some(AnsiColor::BrightBlack),
            _ => None,
        }
    }
}

/// clap help styles built from the same roles
pub fn help_styles(enabled: bool) -> Styles {
    if !enabled {
        return Styles::plain();
    }

    let style = |role: StyleRole| Style::new().fg_color(role.ansi().map(ClapColor::Ansi));

    Styles::styled()
        .header(style(StyleRole::Header).bold())
        .usage(style(StyleRole::Header).bold())
        .literal(style(StyleRole::Literal))
        .placeholder(style(StyleRole::Placeholder))
        .valid(style(StyleRole::Loaded))
        .invalid(style(StyleRole::Broken))
        .error(style(StyleRole::Error).bold())
}
