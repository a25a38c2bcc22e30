// Colour palettes for SGR colour codes
//
// The 16 named colours follow a common dark terminal theme.
// Indexed (256-colour) lookups follow the xterm layout: 16 named entries,
// a 6x6x6 colour cube, then a 24-step grayscale ramp.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from arbitrary SGR parameters, clamping each component
    pub fn clamped(r: u32, g: u32, b: u32) -> Self {
        Self::new(clamp_component(r), clamp_component(g), clamp_component(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn clamp_component(value: u32) -> u8 {
    value.min(255) as u8
}

/// Named palette: 0-7 normal, 8-15 bright
pub const NAMED_COLORS: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00), // black
    Rgb::new(0xcd, 0x31, 0x31), // red
    Rgb::new(0x0d, 0xbc, 0x79), // green
    Rgb::new(0xe5, 0xe5, 0x10), // yellow
    Rgb::new(0x24, 0x72, 0xc8), // blue
    Rgb::new(0xbc, 0x3f, 0xbc), // magenta
    Rgb::new(0x11, 0xa8, 0xcd), // cyan
    Rgb::new(0xe5, 0xe5, 0xe5), // white
    Rgb::new(0x66, 0x66, 0x66), // bright black
    Rgb::new(0xf1, 0x4c, 0x4c), // bright red
    Rgb::new(0x23, 0xd1, 0x8b), // bright green
    Rgb::new(0xf5, 0xf5, 0x43), // bright yellow
    Rgb::new(0x3b, 0x8e, 0xea), // bright blue
    Rgb::new(0xd6, 0x70, 0xd6), // bright magenta
    Rgb::new(0x29, 0xb8, 0xdb), // bright cyan
    Rgb::new(0xe5, 0xe5, 0xe5), // bright white
];

/// Look up a named colour by its palette slot (0-15)
pub fn named(slot: usize) -> Option<Rgb> {
    NAMED_COLORS.get(slot).copied()
}

/// Resolve a 256-colour index
pub fn indexed(index: u8) -> Rgb {
    match index {
        0..=15 => NAMED_COLORS[index as usize],
        16..=231 => {
            let cube = index - 16;
            Rgb::new(
                cube_component(cube / 36),
                cube_component((cube / 6) % 6),
                cube_component(cube % 6),
            )
        }
        _ => {
            let level = 8 + (index - 232) * 10;
            Rgb::new(level, level, level)
        }
    }
}

fn cube_component(step: u8) -> u8 {
    if step == 0 {
        0
    } else {
        step * 40 + 55
    }
}
