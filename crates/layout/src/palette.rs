use serde::{Deserialize, Serialize};

/// 0xRRGGBB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Red channel in `0..=255`.
    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green channel in `0..=255`.
    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue channel in `0..=255`.
    pub fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

/// Column colours. Columns past the table get `fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
    fallback: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Rgb(0xff6b6b),
                Rgb(0x845ef7),
                Rgb(0x339af0),
                Rgb(0x51cf66),
            ],
            fallback: Rgb(0xadb5bd),
        }
    }
}

impl Palette {
    /// Colour for a column.
    pub fn color_for_column(&self, column: usize) -> Rgb {
        self.colors.get(column).copied().unwrap_or(self.fallback)
    }
}
