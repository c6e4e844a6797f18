//! Glyph sources
//!
//! The rasterizer only needs one capability from a font: resolve a code point
//! to a coverage bitmap and its placement relative to the pen position. BDF
//! files are read through the `bdf` crate; `MemorySource` holds glyphs built
//! in code.

use image::{GrayImage, Luma};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{FontGenError, Result};

/// Coverage bitmap of one glyph plus its placement
///
/// `left` is the offset of the first column from the pen x position. `top`
/// is the number of rows the bitmap extends above the baseline, so the first
/// row lands at `baseline - top`.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub bitmap: GrayImage,
    pub left: i32,
    pub top: i32,
}

impl Glyph {
    pub fn new(bitmap: GrayImage, left: i32, top: i32) -> Self {
        Self { bitmap, left, top }
    }

    /// Build a glyph from text rows, `#` marking full coverage
    ///
    /// Rows shorter than the longest one are padded with empty pixels.
    pub fn from_rows(rows: &[&str], left: i32, top: i32) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let height = rows.len() as u32;
        let bitmap = GrayImage::from_fn(width, height, |x, y| {
            let on = rows[y as usize].chars().nth(x as usize) == Some('#');
            Luma([if on { 255 } else { 0 }])
        });
        Self::new(bitmap, left, top)
    }

    fn from_bdf(glyph: &bdf::Glyph) -> Self {
        let bounds = glyph.bounds();
        let bitmap = GrayImage::from_fn(glyph.width(), glyph.height(), |x, y| {
            Luma([if glyph.get(x, y) { 255 } else { 0 }])
        });
        // BDF offsets locate the bottom-left corner relative to the origin.
        let height = i32::try_from(glyph.height()).unwrap_or(i32::MAX);
        Self::new(bitmap, bounds.x, bounds.y.saturating_add(height))
    }
}

/// Resolves code points to glyphs
pub trait GlyphSource {
    /// Glyph for `ch`, or `None` if the font has none
    fn glyph(&self, ch: char) -> Option<Glyph>;
}

/// Glyphs read from a BDF font file
pub struct BdfSource {
    font: bdf::Font,
    path: PathBuf,
}

impl BdfSource {
    /// Read and parse a BDF file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| FontGenError::ReadFont {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse BDF data from `reader`; `path` is only used in messages
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let font = bdf::read(reader).map_err(|e| FontGenError::ParseFont {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!("Parsed {:?}: {} glyphs", path, font.glyphs().len());

        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of glyphs defined by the font
    pub fn glyph_count(&self) -> usize {
        self.font.glyphs().len()
    }
}

impl GlyphSource for BdfSource {
    fn glyph(&self, ch: char) -> Option<Glyph> {
        self.font.glyphs().get(&ch).map(Glyph::from_bdf)
    }
}

/// Glyphs held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    glyphs: HashMap<char, Glyph>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.insert(ch, glyph);
    }

    pub fn with_glyph(mut self, ch: char, glyph: Glyph) -> Self {
        self.insert(ch, glyph);
        self
    }
}

impl GlyphSource for MemorySource {
    fn glyph(&self, ch: char) -> Option<Glyph> {
        self.glyphs.get(&ch).cloned()
    }
}
