// Rendering: SGR parsing, colour palettes, shaping and line construction

pub mod ansi;
pub mod line;
pub mod palette;
pub mod shape;

pub use ansi::{contains_clear_screen, strip_escapes, Fragment, StyleState};
pub use line::{render_line, LineClass, OutputLine};
pub use palette::Rgb;
pub use shape::{BidiShaper, PassthroughShaper, ShapeError, Shaper, ShapingMode};
