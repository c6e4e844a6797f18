//! Mask packer
//!
//! Walks the canvas row-major (top to bottom, left to right) and reduces
//! every pixel to one coverage byte. The scan order is what makes `stride`
//! meaningful: byte `y * stride + x` is pixel `(x, y)`.

use crate::error::{FontGenError, Result};
use crate::raster::Canvas;
use crate::request::{GlyphLabel, GlyphRequest};

/// Byte for a covered pixel
pub const COVERED: u8 = 0xff;

/// Byte for an uncovered pixel
pub const UNCOVERED: u8 = 0x00;

/// Extent of the packed mask, anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub width: usize,
    pub height: usize,
}

/// Start of one glyph's rows in the packed bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBlock {
    pub label: GlyphLabel,
    /// Byte offset of the glyph's first row
    pub offset: usize,
}

/// Packed coverage mask plus the metadata needed to address it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedMask {
    pub stride: usize,
    pub rect: Rect,
    pub pixels: Vec<u8>,
    pub blocks: Vec<GlyphBlock>,
    /// Rows per glyph
    pub glyph_height: usize,
}

impl PackedMask {
    pub fn glyph_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes in one glyph block
    pub fn glyph_len(&self) -> usize {
        self.stride * self.glyph_height
    }

    /// Packed bytes of glyph `index`
    pub fn glyph(&self, index: usize) -> &[u8] {
        let start = index * self.glyph_len();
        &self.pixels[start..start + self.glyph_len()]
    }

    /// Rows of glyph `index`, each `stride` bytes long
    pub fn glyph_rows(&self, index: usize) -> impl Iterator<Item = &[u8]> {
        self.glyph(index).chunks(self.stride)
    }

    /// Check `pixels.len() == stride * rect.height` and `rect.width == stride`
    pub fn verify(&self) -> Result<()> {
        let expected = self.stride * self.rect.height;
        if self.pixels.len() != expected || self.rect.width != self.stride {
            return Err(FontGenError::Postcondition {
                expected,
                actual: self.pixels.len(),
                stride: self.stride,
                height: self.rect.height,
            });
        }
        Ok(())
    }
}

/// Pack `canvas` into a coverage mask, one block per glyph of `request`
pub fn encode(canvas: &Canvas, request: &GlyphRequest) -> Result<PackedMask> {
    let cell = canvas.cell();
    let stride = canvas.width() as usize;
    let glyph_height = cell.height as usize;
    let rect = Rect {
        width: stride,
        height: request.len() * glyph_height,
    };

    let mut pixels = Vec::with_capacity(stride * rect.height);
    for row in canvas.image().rows() {
        pixels.extend(row.map(|p| if p.0[0] > 0 { COVERED } else { UNCOVERED }));
    }

    let glyph_len = stride * glyph_height;
    let blocks = (0..request.len())
        .map(|index| GlyphBlock {
            label: request.label(index),
            offset: index * glyph_len,
        })
        .collect();

    let mask = PackedMask {
        stride,
        rect,
        pixels,
        blocks,
        glyph_height,
    };
    mask.verify()?;

    tracing::debug!(
        "Packed {} glyphs into {} bytes (stride {})",
        mask.glyph_count(),
        mask.pixels.len(),
        mask.stride
    );

    Ok(mask)
}
