//! Bundled DejaVu Sans faces and their glyph metrics.
//!
//! The same font files are embedded into every PDF and measured for line
//! breaking, so the widths used by [`crate::layout`] are the widths the
//! viewer draws.

use std::collections::BTreeSet;

use notes_core::{Error, Result};
use ttf_parser::Face as TtfFace;

use crate::layout::Face;

const REGULAR_TTF: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");
const BOLD_TTF: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");
const BOLD_OBLIQUE_TTF: &[u8] = include_bytes!("../fonts/DejaVuSans-BoldOblique.ttf");

/// Font file for a face.
pub fn font_file(face: Face) -> &'static [u8] {
    match face {
        Face::Regular => REGULAR_TTF,
        Face::Bold => BOLD_TTF,
        Face::BoldOblique => BOLD_OBLIQUE_TTF,
    }
}

/// Advance widths read from the bundled font files.
pub struct FontMetrics {
    regular: TtfFace<'static>,
    bold: TtfFace<'static>,
    bold_oblique: TtfFace<'static>,
}

impl FontMetrics {
    pub fn bundled() -> Result<Self> {
        let parse = |face: Face| {
            TtfFace::parse(font_file(face), 0)
                .map_err(|e| Error::PdfError(format!("Failed to parse {:?} font: {}", face, e)))
        };
        Ok(Self {
            regular: parse(Face::Regular)?,
            bold: parse(Face::Bold)?,
            bold_oblique: parse(Face::BoldOblique)?,
        })
    }

    fn face(&self, face: Face) -> &TtfFace<'static> {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::BoldOblique => &self.bold_oblique,
        }
    }

    /// Whether the face has a glyph for `c`.
    pub fn supports(&self, face: Face, c: char) -> bool {
        self.face(face).glyph_index(c).is_some()
    }

    /// Advance width of `c` in points. Characters without a glyph are not
    /// drawn, so they measure zero.
    pub fn char_width(&self, c: char, font_size: f32, face: Face) -> f32 {
        let ttf = self.face(face);
        ttf.glyph_index(c)
            .and_then(|id| ttf.glyph_hor_advance(id))
            .map(|advance| advance as f32 / ttf.units_per_em() as f32 * font_size)
            .unwrap_or(0.0)
    }

    /// Width of `text` in points.
    pub fn text_width(&self, text: &str, font_size: f32, face: Face) -> f32 {
        text.chars().map(|c| self.char_width(c, font_size, face)).sum()
    }

    /// Visible characters of `text` the face cannot draw.
    pub fn missing_glyphs(&self, text: &str, face: Face) -> BTreeSet<char> {
        text.chars()
            .filter(|c| !c.is_whitespace() && !self.supports(face, *c))
            .collect()
    }
}
