// Terminal view - draws the session with ratatui
//
// Layout, top to bottom: output log, prompt line, status bar. The log is
// drawn without wrapping so the scroll offset maps one-to-one onto lines.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::config::ColorScheme;
use crate::render::{strip_escapes, LineClass, OutputLine, Rgb, StyleState};
use crate::session::Session;

/// Width a tab expands to on screen
const TAB_WIDTH: usize = 4;

/// Static presentation settings for the view
#[derive(Debug, Clone)]
pub struct ViewStyle {
    pub colors: ColorScheme,
    pub caret: String,
}

pub fn draw(frame: &mut Frame, session: &Session, style: &ViewStyle) {
    let [log_area, prompt_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_log(frame, session, style, log_area);
    draw_prompt(frame, session, style, prompt_area);
    draw_status(frame, session, style, status_area);
}

fn draw_log(frame: &mut Frame, session: &Session, style: &ViewStyle, area: Rect) {
    let log = session.log();
    let (start, end) = visible_window(log.len(), log.scroll_offset(), area.height as usize);
    let lines: Vec<Line> = log
        .lines()
        .skip(start)
        .take(end - start)
        .map(|line| to_line(line, &style.colors))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_prompt(frame: &mut Frame, session: &Session, style: &ViewStyle, area: Rect) {
    let label = Style::default().fg(style.colors.prompt_label.to_color());
    let line = if session.has_exited() {
        Line::from(Span::styled(session.prompt_prefix().to_string(), label.add_modifier(Modifier::DIM)))
    } else {
        let prompt = session.prompt();
        let used = session.prompt_prefix().width() + style.caret.width();
        let budget = (area.width as usize).saturating_sub(used);
        Line::from(vec![
            Span::styled(session.prompt_prefix().to_string(), label),
            Span::raw(keep_tail(&sanitize(&prompt.before), budget)),
            Span::styled(style.caret.clone(), label.add_modifier(Modifier::BOLD)),
            Span::raw(sanitize(&prompt.after)),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_status(frame: &mut Frame, session: &Session, style: &ViewStyle, area: Rect) {
    frame.render_widget(
        Paragraph::new(status_text(session))
            .style(Style::default().fg(style.colors.status.to_color())),
        area,
    );
}

/// One-line summary under the prompt
pub fn status_text(session: &Session) -> String {
    let mut parts = Vec::new();
    if let Some(cwd) = session.cwd() {
        parts.push(cwd.to_string());
    }
    if session.log().scroll_offset() > 0 {
        parts.push(format!("scrolled {} up", session.log().scroll_offset()));
    }
    if session.has_exited() {
        parts.push("shell exited, Ctrl+D to quit".to_string());
    } else if session.pending_completion().is_some() {
        parts.push("completing...".to_string());
    }
    parts.join(" | ")
}

/// Longest suffix of `text` at most `width` columns wide, so the caret stays on screen
pub fn keep_tail(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut start = 0;
    for (idx, _) in text.char_indices() {
        if text[idx..].width() <= width {
            start = idx;
            break;
        }
        start = text.len();
    }
    text[start..].to_string()
}

/// Half-open index range of log lines that fit in `height` rows
pub fn visible_window(len: usize, scroll_offset: usize, height: usize) -> (usize, usize) {
    let end = len.saturating_sub(scroll_offset);
    (end.saturating_sub(height), end)
}

/// Convert a rendered line into ratatui spans
pub fn to_line(line: &OutputLine, colors: &ColorScheme) -> Line<'static> {
    let class_fg = match line.class() {
        LineClass::StdinEcho => Some(colors.stdin_echo.to_color()),
        LineClass::Stderr => Some(colors.stderr.to_color()),
        LineClass::None | LineClass::Stdout => None,
    };
    let spans: Vec<Span> = line
        .fragments()
        .iter()
        .map(|fragment| {
            let mut style = to_style(fragment.style);
            if fragment.style.fg.is_none() {
                if let Some(fg) = class_fg {
                    style = style.fg(fg);
                }
            }
            Span::styled(sanitize(&fragment.text), style)
        })
        .collect();
    Line::from(spans)
}

pub fn to_style(state: StyleState) -> Style {
    let mut style = Style::default();
    if let Some(fg) = state.fg {
        style = style.fg(to_color(fg));
    }
    if let Some(bg) = state.bg {
        style = style.bg(to_color(bg));
    }
    if state.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if state.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if state.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    style
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Make text safe to hand to the terminal backend
///
/// Leftover escape sequences are removed, tabs expanded and any other
/// control character dropped.
pub fn sanitize(text: &str) -> String {
    let stripped = strip_escapes(text);
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_line, PassthroughShaper};

    #[test]
    fn test_visible_window() {
        assert_eq!(visible_window(100, 0, 10), (90, 100));
        assert_eq!(visible_window(100, 5, 10), (85, 95));
        assert_eq!(visible_window(3, 0, 10), (0, 3));
        assert_eq!(visible_window(3, 3, 10), (0, 0));
    }

    #[test]
    fn test_keep_tail() {
        assert_eq!(keep_tail("hello", 10), "hello");
        assert_eq!(keep_tail("hello", 3), "llo");
        assert_eq!(keep_tail("漢字テキスト", 4), "スト");
        assert_eq!(keep_tail("abc", 0), "");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a\tb\n"), "a    b");
        assert_eq!(sanitize("\x1b[2Jclean\x07"), "clean");
    }

    #[test]
    fn test_to_style_maps_attributes() {
        let state = StyleState::default().apply_codes(&[1, 4, 38, 2, 1, 2, 3]);
        let style = to_style(state);
        assert_eq!(style.fg, Some(Color::Rgb(1, 2, 3)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_stderr_class_color_only_without_explicit_fg() {
        let colors = ColorScheme::default();
        let (line, _) = render_line(
            "plain\x1b[32mgreen\n",
            LineClass::Stderr,
            StyleState::default(),
            &PassthroughShaper,
        );
        let converted = to_line(&line, &colors);
        assert_eq!(converted.spans[0].style.fg, Some(colors.stderr.to_color()));
        assert_ne!(converted.spans[1].style.fg, Some(colors.stderr.to_color()));
        assert_eq!(converted.spans[1].content, "green");
    }
}
