//! Declarative styling for a bar slot.

use crate::color::HexColor;
use crate::status::Status;
use thiserror::Error;

/// Errors raised while building a [`ThemeSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("palette must have 0, 1 or 3 colors, got {0}")]
    PaletteLength(usize),
    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),
}

/// Palette and prefix glyph for one slot.
///
/// A one-color palette is applied flat; a three-color palette maps to
/// `normal`, `warn` and `error` in that order. An empty palette leaves the
/// host default color alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeSpec {
    palette: Vec<HexColor>,
    glyph: Option<String>,
}

impl ThemeSpec {
    pub fn new(palette: Vec<HexColor>, glyph: Option<String>) -> Result<Self, ThemeError> {
        match palette.len() {
            0 | 1 | 3 => {}
            n => return Err(ThemeError::PaletteLength(n)),
        }
        Ok(Self {
            palette,
            glyph: glyph.filter(|g| !g.is_empty()),
        })
    }

    /// Build from raw color strings as they appear in the config file
    pub fn parse<S: AsRef<str>>(colors: &[S], glyph: Option<String>) -> Result<Self, ThemeError> {
        let palette = colors
            .iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<Vec<HexColor>, _>>()?;
        Self::new(palette, glyph)
    }

    pub fn palette(&self) -> &[HexColor] {
        &self.palette
    }

    pub fn glyph(&self) -> Option<&str> {
        self.glyph.as_deref()
    }

    /// Color for a given status, `None` when the palette is empty
    pub fn color_for(&self, status: Status) -> Option<&HexColor> {
        match self.palette.as_slice() {
            [flat] => Some(flat),
            [normal, warn, error] => Some(match status {
                Status::Normal => normal,
                Status::Warn => warn,
                Status::Error => error,
            }),
            _ => None,
        }
    }
}
