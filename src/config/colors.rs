// Color Scheme Configuration - colors for the lines the session itself writes
//
// Shell output carries its own SGR colors. These only apply to echoed
// input, stderr lines without an explicit color, the status bar and the
// prompt label.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Color scheme for TUI elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Echoed commands and `^C`
    #[serde(default = "default_cyan")]
    pub stdin_echo: ColorSpec,

    /// Default foreground of stderr lines
    #[serde(default = "default_red")]
    pub stderr: ColorSpec,

    /// Status bar text
    #[serde(default = "default_dark_gray")]
    pub status: ColorSpec,

    /// Prompt prefix in front of the edit line
    #[serde(default = "default_yellow")]
    pub prompt_label: ColorSpec,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            stdin_echo: default_cyan(),
            stderr: default_red(),
            status: default_dark_gray(),
            prompt_label: default_yellow(),
        }
    }
}

/// Color specification - supports named colors and RGB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (e.g., "red", "green", "cyan")
    Named(String),
    /// RGB color (e.g., [255, 0, 0])
    Rgb(u8, u8, u8),
}

impl ColorSpec {
    /// Convert to ratatui Color
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Named(name) => parse_named_color(name),
            ColorSpec::Rgb(r, g, b) => Color::Rgb(*r, *g, *b),
        }
    }
}

fn parse_named_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => Color::Reset,
    }
}

fn default_cyan() -> ColorSpec {
    ColorSpec::Named("cyan".to_string())
}

fn default_red() -> ColorSpec {
    ColorSpec::Named("red".to_string())
}

fn default_dark_gray() -> ColorSpec {
    ColorSpec::Named("darkgray".to_string())
}

fn default_yellow() -> ColorSpec {
    ColorSpec::Named("yellow".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_color_parsing() {
        assert_eq!(parse_named_color("Cyan"), Color::Cyan);
        assert_eq!(parse_named_color("darkgrey"), Color::DarkGray);
        assert_eq!(parse_named_color("chartreuse"), Color::Reset);
    }

    #[test]
    fn test_rgb_color() {
        assert_eq!(ColorSpec::Rgb(255, 0, 0).to_color(), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_partial_scheme_from_toml() {
        let scheme: ColorScheme = toml::from_str("stderr = [200, 10, 10]").unwrap();
        assert_eq!(scheme.stderr, ColorSpec::Rgb(200, 10, 10));
        assert_eq!(scheme.stdin_echo, default_cyan());
    }
}
