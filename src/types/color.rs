//! Color representation for decoded entities and layers
//!
//! DWG colors are either AutoCAD Color Index values (1-255, with 0 meaning
//! ByBlock and 256 meaning ByLayer) or, from R2004 on, packed true-color
//! RGB values.

use std::fmt;

/// A decoded color reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Inherit the color of the owning layer (index 256)
    #[default]
    ByLayer,
    /// Inherit the color of the containing block (index 0)
    ByBlock,
    /// AutoCAD Color Index (1-255)
    Index(u8),
    /// True color, packed `0x00RRGGBB`
    TrueColor(u32),
}

impl Color {
    /// Interpret an ACI value as written in the file.
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Color::ByBlock,
            256 => Color::ByLayer,
            1..=255 => Color::Index(index as u8),
            // Negative index means the layer is off; the color is the magnitude.
            _ if index < 0 => Color::Index((-index).min(255) as u8),
            _ => Color::Index(7),
        }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color::TrueColor(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// The ACI index, when this is an indexed color.
    pub fn index(&self) -> Option<u8> {
        match self {
            Color::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// The packed `0x00RRGGBB` value, when this is a true color.
    pub fn true_color(&self) -> Option<u32> {
        match self {
            Color::TrueColor(rgb) => Some(*rgb),
            _ => None,
        }
    }

    pub fn is_by_layer(&self) -> bool {
        matches!(self, Color::ByLayer)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::ByLayer => write!(f, "ByLayer"),
            Color::ByBlock => write!(f, "ByBlock"),
            Color::Index(i) => write!(f, "Index({})", i),
            Color::TrueColor(rgb) => write!(f, "TrueColor({:#08X})", rgb),
        }
    }
}
