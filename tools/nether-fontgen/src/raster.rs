//! Glyph rasterizer
//!
//! Every requested glyph is drawn into one shared canvas, one cell-high band
//! per glyph. The pen for glyph `i` sits at `(0, height * i + ascent)`, so a
//! consumer can find glyph `i` from `i` and the cell height alone, whatever
//! the glyph's natural metrics.

use image::{GrayImage, Luma};
use std::ops::Range;

use crate::config::CellGeometry;
use crate::error::{FontGenError, Result};
use crate::request::GlyphRequest;
use crate::source::{Glyph, GlyphSource};

/// Coverage surface holding every glyph band
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: GrayImage,
    cell: CellGeometry,
    glyph_count: usize,
}

impl Canvas {
    /// Empty canvas for `glyph_count` bands of `cell`
    pub fn new(cell: CellGeometry, glyph_count: usize) -> Result<Self> {
        let height = cell.canvas_height(glyph_count)?;
        Ok(Self {
            image: GrayImage::new(cell.width, height),
            cell,
            glyph_count,
        })
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn cell(&self) -> CellGeometry {
        self.cell
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Rows owned by glyph `index`
    ///
    /// Bands past the last glyph are empty.
    pub fn band(&self, index: usize) -> Range<u32> {
        if index >= self.glyph_count {
            return self.height()..self.height();
        }
        let top = self.cell.height * index as u32;
        top..top + self.cell.height
    }

    /// Pen position (baseline) for glyph `index`
    fn origin(&self, index: usize) -> (i64, i64) {
        let band = self.band(index);
        (0, i64::from(band.start) + i64::from(self.cell.ascent))
    }

    /// Coverage decision: anything above the minimum channel value counts
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] > 0
    }

    /// Composite `glyph` into band `index`
    ///
    /// Coverage only ever rises. Pixels falling outside the band or past the
    /// cell width are dropped.
    pub fn draw(&mut self, index: usize, glyph: &Glyph) {
        let band = self.band(index);
        if band.is_empty() {
            return;
        }
        let (pen_x, pen_y) = self.origin(index);
        let left = pen_x + i64::from(glyph.left);
        let top = pen_y - i64::from(glyph.top);
        let rows = i64::from(band.start)..i64::from(band.end);

        for (gx, gy, src) in glyph.bitmap.enumerate_pixels() {
            let x = left + i64::from(gx);
            let y = top + i64::from(gy);
            if x < 0 || x >= i64::from(self.cell.width) || !rows.contains(&y) {
                continue;
            }
            let (x, y) = (x as u32, y as u32);

            let dst = self.image.get_pixel_mut(x, y);
            if src.0[0] > dst.0[0] {
                *dst = Luma([src.0[0]]);
            }
        }
    }
}

/// Draw every glyph of `request` into a fresh canvas
///
/// Fails on the first code point the source cannot resolve.
pub fn rasterize<S: GlyphSource>(
    source: &S,
    request: &GlyphRequest,
    cell: CellGeometry,
) -> Result<Canvas> {
    cell.validate()?;

    let mut canvas = Canvas::new(cell, request.len())?;
    for (index, &codepoint) in request.codepoints().iter().enumerate() {
        let glyph = source
            .glyph(codepoint)
            .ok_or(FontGenError::GlyphNotFound { codepoint, index })?;
        canvas.draw(index, &glyph);
    }

    tracing::debug!(
        "Rasterized {} glyphs into {}x{} canvas",
        request.len(),
        canvas.width(),
        canvas.height()
    );

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlyphRange, FALLBACK};
    use crate::source::MemorySource;

    fn small_cell() -> CellGeometry {
        CellGeometry::new(3, 4, 3)
    }

    fn abc_source() -> MemorySource {
        MemorySource::new()
            .with_glyph('a', Glyph::from_rows(&["#"], 0, 1))
            .with_glyph('b', Glyph::from_rows(&["##", "##"], 1, 2))
            .with_glyph('c', Glyph::from_rows(&["###"], 0, 0))
            .with_glyph(FALLBACK, Glyph::from_rows(&["###", "#.#", "###"], 0, 3))
    }

    #[test]
    fn test_canvas_dimensions() {
        let request = GlyphRequest::new(&GlyphRange::new('a', 'c')).unwrap();
        let canvas = rasterize(&abc_source(), &request, small_cell()).unwrap();
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 4 * 4);
        assert_eq!(canvas.glyph_count(), 4);
    }

    #[test]
    fn test_bands_tile_canvas() {
        let canvas = Canvas::new(small_cell(), 5).unwrap();
        let mut next = 0;
        for i in 0..5 {
            let band = canvas.band(i);
            assert_eq!(band.start, next);
            assert_eq!(band.end - band.start, 4);
            next = band.end;
        }
        assert_eq!(next, canvas.height());
    }

    #[test]
    fn test_glyphs_land_on_shared_baseline() {
        let request = GlyphRequest::new(&GlyphRange::new('a', 'c')).unwrap();
        let canvas = rasterize(&abc_source(), &request, small_cell()).unwrap();

        // 'a': one pixel just above baseline row 3.
        assert!(canvas.is_covered(0, 2));
        assert!(!canvas.is_covered(0, 3));

        // 'b': 2x2 block shifted right by one, band starts at row 4.
        assert!(canvas.is_covered(1, 4 + 1));
        assert!(canvas.is_covered(2, 4 + 2));
        assert!(!canvas.is_covered(0, 4 + 1));

        // 'c': top 0 puts its single row on the baseline itself.
        assert!(canvas.is_covered(0, 8 + 3));
        assert!(canvas.is_covered(2, 8 + 3));

        // Fallback ring in the last band.
        assert!(canvas.is_covered(0, 12));
        assert!(!canvas.is_covered(1, 13));
        assert!(canvas.is_covered(2, 14));
    }

    #[test]
    fn test_draw_clips_to_band_and_width() {
        let mut canvas = Canvas::new(small_cell(), 3).unwrap();
        // Tall and wide: would spill into both neighbours and past the cell.
        let big = Glyph::from_rows(&["#####"; 8], 0, 6);
        canvas.draw(1, &big);

        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                assert_eq!(canvas.is_covered(x, y), canvas.band(1).contains(&y));
            }
        }
    }

    #[test]
    fn test_draw_extreme_offsets_are_clipped() {
        let mut canvas = Canvas::new(small_cell(), 1).unwrap();
        canvas.draw(0, &Glyph::from_rows(&["#"], i32::MAX, i32::MIN));
        canvas.draw(0, &Glyph::from_rows(&["#"], i32::MIN, i32::MAX));
        assert!(canvas.image().pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_draw_only_raises_coverage() {
        let mut canvas = Canvas::new(small_cell(), 1).unwrap();
        canvas.draw(0, &Glyph::from_rows(&["###"], 0, 1));
        canvas.draw(0, &Glyph::from_rows(&["..."], 0, 1));
        assert!(canvas.is_covered(0, 2));
        assert!(canvas.is_covered(2, 2));
    }

    #[test]
    fn test_partial_coverage_counts_as_covered() {
        let mut canvas = Canvas::new(small_cell(), 1).unwrap();
        let faint = GrayImage::from_pixel(1, 1, Luma([1]));
        canvas.draw(0, &Glyph::new(faint, 0, 1));
        assert!(canvas.is_covered(0, 2));
        assert!(!canvas.is_covered(1, 2));
    }

    #[test]
    fn test_missing_glyph_is_fatal() {
        let source = abc_source();
        let request = GlyphRequest::new(&GlyphRange::new('a', 'd')).unwrap();
        let err = rasterize(&source, &request, small_cell()).unwrap_err();
        assert!(matches!(
            err,
            FontGenError::GlyphNotFound {
                codepoint: 'd',
                index: 3
            }
        ));
    }

    #[test]
    fn test_oversized_canvas_is_rejected() {
        let request = GlyphRequest::new(&GlyphRange::new('a', 'c')).unwrap();
        let cell = CellGeometry::new(3, 1_500_000_000, 3);
        let err = rasterize(&abc_source(), &request, cell).unwrap_err();
        assert!(matches!(err, FontGenError::InvalidConfig(_)));
    }

    #[test]
    fn test_draw_past_last_band_is_ignored() {
        let mut canvas = Canvas::new(small_cell(), 2).unwrap();
        canvas.draw(2, &Glyph::from_rows(&["###"; 4], 0, 3));
        canvas.draw(usize::MAX, &Glyph::from_rows(&["###"; 4], 0, 3));
        assert!(canvas.band(2).is_empty());
        assert!(canvas.image().pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_missing_fallback_is_fatal() {
        let source = MemorySource::new().with_glyph('a', Glyph::from_rows(&["#"], 0, 1));
        let request = GlyphRequest::new(&GlyphRange::new('a', 'a')).unwrap();
        let err = rasterize(&source, &request, small_cell()).unwrap_err();
        assert!(matches!(
            err,
            FontGenError::GlyphNotFound {
                codepoint: FALLBACK,
                index: 1
            }
        ));
    }
}
