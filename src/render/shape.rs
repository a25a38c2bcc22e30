// Bidirectional shaping for display
//
// Output and the prompt are passed through a `Shaper` before they reach the
// screen. Shaping must never lose text: if a shaper fails, callers fall back
// to the original string via `shape_or_original`.

use ar_reshaper::ArabicReshaper;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_bidi::BidiInfo;

/// Failure reported by a `Shaper`
///
/// The built-in shapers always succeed; the variant exists for shapers that
/// wrap an external engine.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("shaper rejected input: {0}")]
    Rejected(String),
}

/// Transform logical-order text into display order
pub trait Shaper: Send + Sync {
    fn name(&self) -> &str;

    fn shape(&self, text: &str) -> Result<String, ShapeError>;
}

/// Shape `text`, falling back to the unshaped input on failure
pub fn shape_or_original(shaper: &dyn Shaper, text: &str) -> String {
    match shaper.shape(text) {
        Ok(shaped) => shaped,
        Err(e) => {
            tracing::warn!("{} shaper failed, using raw text: {}", shaper.name(), e);
            text.to_string()
        }
    }
}

/// Leaves text exactly as received
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughShaper;

impl Shaper for PassthroughShaper {
    fn name(&self) -> &str {
        "none"
    }

    fn shape(&self, text: &str) -> Result<String, ShapeError> {
        Ok(text.to_string())
    }
}

/// Reorders each paragraph with the Unicode Bidirectional Algorithm
///
/// With a reshaper attached, Arabic letters are first replaced by their
/// contextual presentation forms so they display joined.
pub struct BidiShaper {
    reshaper: Option<ArabicReshaper>,
}

impl BidiShaper {
    /// Reshape joined scripts, then reorder
    pub fn new() -> Self {
        Self {
            reshaper: Some(ArabicReshaper::default()),
        }
    }

    /// Reorder only; letters keep their nominal forms
    pub fn reorder_only() -> Self {
        Self { reshaper: None }
    }

    fn reorder(text: &str) -> String {
        let info = BidiInfo::new(text, None);
        if !info.has_rtl() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        for para in &info.paragraphs {
            let range = para.range.clone();
            // The separator stays at the end of its paragraph
            let body = text[range.clone()].trim_end_matches(is_paragraph_break);
            let body_end = range.start + body.len();
            if !body.is_empty() {
                out.push_str(&info.reorder_line(para, range.start..body_end));
            }
            out.push_str(&text[body_end..range.end]);
        }
        out
    }
}

impl Default for BidiShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for BidiShaper {
    fn name(&self) -> &str {
        match self.reshaper {
            Some(_) => "bidi",
            None => "reorder",
        }
    }

    fn shape(&self, text: &str) -> Result<String, ShapeError> {
        match &self.reshaper {
            Some(reshaper) => Ok(Self::reorder(&reshaper.reshape(text))),
            None => Ok(Self::reorder(text)),
        }
    }
}

fn is_paragraph_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{1C}'..='\u{1E}' | '\u{85}' | '\u{2029}')
}

/// Which shaper the session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapingMode {
    /// Arabic reshaping followed by bidi reordering
    #[default]
    Bidi,
    /// Bidi reordering without reshaping
    Reorder,
    None,
}

impl ShapingMode {
    pub fn build(self) -> Box<dyn Shaper> {
        match self {
            ShapingMode::Bidi => Box::new(BidiShaper::new()),
            ShapingMode::Reorder => Box::new(BidiShaper::reorder_only()),
            ShapingMode::None => Box::new(PassthroughShaper),
        }
    }
}
