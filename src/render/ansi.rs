// ANSI style engine - SGR escape parsing with state carried across chunks
//
// Only `ESC [ <params> m` sequences are interpreted. Every other escape is
// left in the text untouched. The style state is an explicit value: callers
// pass the state left over from the previous chunk and get the new one back,
// so a colour opened in one chunk stays active in the next.

use once_cell::sync::Lazy;
use regex::Regex;

use super::palette::{self, Rgb};

static SGR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[([0-9;]*)m").expect("static SGR regex"));

static CLEAR_SCREEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9]*J").expect("static clear-screen regex"));

static CSI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static CSI regex"));

/// Text attributes active at a point in the output stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleState {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl StyleState {
    /// True when no attribute is set
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Apply a parameter list left to right, returning the resulting state
    ///
    /// An empty list is a reset. Unknown codes are skipped. Extended colour
    /// codes (38/48) consume the extra slots they use.
    pub fn apply_codes(self, codes: &[u32]) -> Self {
        if codes.is_empty() {
            return Self::default();
        }

        let mut next = self;
        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            match code {
                0 => next = Self::default(),
                1 => next.bold = true,
                3 => next.italic = true,
                4 => next.underline = true,
                7 | 27 => std::mem::swap(&mut next.fg, &mut next.bg),
                22 => next.bold = false,
                23 => next.italic = false,
                24 => next.underline = false,
                30..=37 => next.fg = palette::named((code - 30) as usize),
                90..=97 => next.fg = palette::named((code - 90 + 8) as usize),
                40..=47 => next.bg = palette::named((code - 40) as usize),
                100..=107 => next.bg = palette::named((code - 100 + 8) as usize),
                39 => next.fg = None,
                49 => next.bg = None,
                38 | 48 => {
                    let (color, consumed) = parse_extended_color(&codes[i + 1..]);
                    if let Some(color) = color {
                        if code == 38 {
                            next.fg = Some(color);
                        } else {
                            next.bg = Some(color);
                        }
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
        next
    }
}

/// Parse the slots after a 38/48 code: `5;N` or `2;R;G;B`
///
/// Returns the colour (if complete and valid) and how many slots were used.
fn parse_extended_color(rest: &[u32]) -> (Option<Rgb>, usize) {
    match rest.first() {
        Some(5) => match rest.get(1) {
            Some(&n) if n <= 255 => (Some(palette::indexed(n as u8)), 2),
            Some(_) => (None, 2),
            None => (None, 1),
        },
        Some(2) => {
            if rest.len() >= 4 {
                (Some(Rgb::clamped(rest[1], rest[2], rest[3])), 4)
            } else {
                (None, rest.len())
            }
        }
        _ => (None, 0),
    }
}

/// Parse the parameter text of an SGR sequence
///
/// Empty slots count as 0 and values that overflow become `u32::MAX`, which
/// no code matches (and which clamps to 255 inside a direct colour).
pub fn parse_params(params: &str) -> Vec<u32> {
    if params.is_empty() {
        return vec![0];
    }
    params
        .split(';')
        .map(|slot| {
            if slot.is_empty() {
                0
            } else {
                slot.parse::<u32>().unwrap_or(u32::MAX)
            }
        })
        .collect()
}

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub style: StyleState,
}

/// Split `text` into styled fragments starting from `incoming`
///
/// The escape sequences themselves never appear in the fragments. The
/// returned state is the one active after the last escape in `text`.
pub fn render(text: &str, incoming: StyleState) -> (Vec<Fragment>, StyleState) {
    let mut fragments = Vec::new();
    let mut state = incoming;
    let mut last = 0;

    for caps in SGR_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            fragments.push(Fragment {
                text: text[last..whole.start()].to_string(),
                style: state,
            });
        }
        let params = caps.get(1).map_or("", |m| m.as_str());
        state = state.apply_codes(&parse_params(params));
        last = whole.end();
    }

    if last < text.len() {
        fragments.push(Fragment {
            text: text[last..].to_string(),
            style: state,
        });
    }

    (fragments, state)
}

/// Whether a chunk carries an erase-display sequence (`ESC [ n J`)
pub fn contains_clear_screen(chunk: &str) -> bool {
    CLEAR_SCREEN_PATTERN.is_match(chunk)
}

/// Drop every remaining CSI sequence (cursor moves, erases and the like)
///
/// Used for display only; fragments keep the raw text.
pub fn strip_escapes(text: &str) -> std::borrow::Cow<'_, str> {
    CSI_PATTERN.replace_all(text, "")
}
