// Rendered output lines
//
// An OutputLine is built once from raw text and never changes afterwards.

use super::ansi::{self, Fragment, StyleState};
use super::shape::{shape_or_original, Shaper};

/// Semantic class of a line in the output log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineClass {
    #[default]
    None,
    StdinEcho,
    Stdout,
    Stderr,
}

impl LineClass {
    /// Short name used by logs and the replay renderer
    pub fn as_str(&self) -> &'static str {
        match self {
            LineClass::None => "none",
            LineClass::StdinEcho => "stdin-echo",
            LineClass::Stdout => "stdout",
            LineClass::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    fragments: Vec<Fragment>,
    class: LineClass,
}

impl OutputLine {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn class(&self) -> LineClass {
        self.class
    }

    /// Concatenated display text without styling
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Parse `text` starting from `incoming`, shape every fragment, and build a line
///
/// Returns the line together with the style state left at its end.
pub fn render_line(
    text: &str,
    class: LineClass,
    incoming: StyleState,
    shaper: &dyn Shaper,
) -> (OutputLine, StyleState) {
    let (fragments, state) = ansi::render(text, incoming);
    let fragments = fragments
        .into_iter()
        .filter(|f| !f.text.is_empty())
        .map(|f| Fragment {
            text: shape_or_original(shaper, &f.text),
            style: f.style,
        })
        .collect();
    (OutputLine { fragments, class }, state)
}
