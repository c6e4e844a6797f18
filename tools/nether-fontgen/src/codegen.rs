//! Rust source emitter
//!
//! Renders a packed mask as a self-contained Rust module: the addressing
//! types, one `Alpha` static holding the pixel bytes in annotated per-glyph
//! blocks, and one `Face` static describing how code points map to blocks.
//! Generated files need no runtime dependency on this crate.

use std::fmt::{self, Write};

use crate::config::{CellGeometry, GlyphRange, FALLBACK};
use crate::pack::PackedMask;

/// Code points `low..high` map to glyphs starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepointRange {
    pub low: u32,
    pub high: u32,
    pub offset: usize,
}

/// Face-level metrics emitted next to the mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMetrics {
    pub advance: u32,
    pub width: u32,
    pub height: u32,
    pub ascent: u32,
    pub descent: u32,
    pub ranges: Vec<CodepointRange>,
    /// Index of the replacement glyph
    pub fallback: usize,
}

impl FaceMetrics {
    /// Metrics for `range` followed by the fallback glyph
    pub fn new(cell: &CellGeometry, range: &GlyphRange) -> Self {
        let fallback = range.len();
        Self {
            advance: cell.advance(),
            width: cell.width,
            height: cell.height,
            ascent: cell.ascent,
            descent: cell.descent(),
            ranges: vec![
                CodepointRange {
                    low: range.first,
                    high: range.last + 1,
                    offset: 0,
                },
                CodepointRange {
                    low: FALLBACK as u32,
                    high: FALLBACK as u32 + 1,
                    offset: fallback,
                },
            ],
            fallback,
        }
    }
}

/// Names and provenance for one generated module
#[derive(Debug, Clone)]
pub struct ModuleInfo<'a> {
    /// Suffix of the statics, e.g. `6X13`
    pub ident_suffix: &'a str,
    /// Font file the glyphs came from, for the header comment
    pub source_name: &'a str,
}

const HEADER: &str = "\
// Generated by nether-fontgen; DO NOT EDIT.
// Regenerate with `nether-fontgen generate`.
";

const TYPES: &str = r#"/// Byte for a covered pixel.
pub const COVERED: u8 = 0xff;

/// Byte for an uncovered pixel.
pub const UNCOVERED: u8 = 0x00;

/// Extent of a packed mask, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub width: usize,
    pub height: usize,
}

/// Coverage mask, one byte per pixel, row-major: pixel `(x, y)` is
/// `pixels[y * stride + x]`.
#[derive(Debug, Clone, Copy)]
pub struct Alpha {
    pub stride: usize,
    pub rect: Rect,
    pub pixels: &'static [u8],
}

/// Code points `low..high` map to consecutive glyphs starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub low: u32,
    pub high: u32,
    pub offset: usize,
}

/// Fixed-width face over a packed mask. Glyph `i` owns rows
/// `height * i..height * (i + 1)` of the mask.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub advance: usize,
    pub width: usize,
    pub height: usize,
    pub ascent: usize,
    pub descent: usize,
    pub mask: &'static Alpha,
    pub ranges: &'static [Range],
    pub fallback: usize,
}

impl Face {
    /// Glyph index for `ch`, or the replacement glyph if no range covers it.
    pub fn glyph_index(&self, ch: char) -> usize {
        let cp = ch as u32;
        for range in self.ranges {
            if cp >= range.low && cp < range.high {
                return range.offset + (cp - range.low) as usize;
            }
        }
        self.fallback
    }

    /// Coverage bytes for `ch`: `height` rows of `mask.stride` bytes.
    pub fn glyph(&self, ch: char) -> &'static [u8] {
        let pixels = self.mask.pixels;
        let len = self.mask.stride * self.height;
        let start = self.glyph_index(ch) * len;
        &pixels[start..start + len]
    }
}
"#;

/// Render `mask` and `face` as Rust source
pub fn render_rust(
    mask: &PackedMask,
    face: &FaceMetrics,
    info: &ModuleInfo<'_>,
) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(mask.pixels.len() * 6 + TYPES.len() + 1024);
    write_module(&mut out, mask, face, info)?;
    Ok(out)
}

fn write_module(
    out: &mut String,
    mask: &PackedMask,
    face: &FaceMetrics,
    info: &ModuleInfo<'_>,
) -> fmt::Result {
    let suffix = info.ident_suffix;
    let glyph_count = mask.glyph_count();

    out.push_str(HEADER);
    writeln!(out, "// Source: {}", info.source_name)?;
    writeln!(
        out,
        "// {} glyphs, {}×{} each, {} pixel bytes.",
        glyph_count,
        mask.stride,
        mask.glyph_height,
        mask.pixels.len()
    )?;
    writeln!(out)?;
    out.push_str(TYPES);
    writeln!(out)?;

    writeln!(
        out,
        "/// MASK_{suffix} contains {} {}×{} glyphs in {} pixel bytes.",
        glyph_count,
        mask.stride,
        mask.glyph_height,
        mask.pixels.len()
    )?;
    writeln!(out, "#[rustfmt::skip]")?;
    writeln!(out, "pub static MASK_{suffix}: Alpha = Alpha {{")?;
    writeln!(out, "    stride: {},", mask.stride)?;
    writeln!(
        out,
        "    rect: Rect {{ width: {}, height: {} * {} }},",
        mask.rect.width, glyph_count, mask.glyph_height
    )?;
    writeln!(out, "    pixels: &[")?;
    write_pixels(out, mask)?;
    writeln!(out, "    ],")?;
    writeln!(out, "}};")?;
    writeln!(out)?;

    writeln!(out, "/// Face over [`MASK_{suffix}`].")?;
    writeln!(out, "pub static FACE_{suffix}: Face = Face {{")?;
    writeln!(out, "    advance: {},", face.advance)?;
    writeln!(out, "    width: {},", face.width)?;
    writeln!(out, "    height: {},", face.height)?;
    writeln!(out, "    ascent: {},", face.ascent)?;
    writeln!(out, "    descent: {},", face.descent)?;
    writeln!(out, "    mask: &MASK_{suffix},")?;
    writeln!(out, "    ranges: &[")?;
    for range in &face.ranges {
        writeln!(
            out,
            "        Range {{ low: {:#x}, high: {:#x}, offset: {} }},",
            range.low, range.high, range.offset
        )?;
    }
    writeln!(out, "    ],")?;
    writeln!(out, "    fallback: {},", face.fallback)?;
    writeln!(out, "}};")?;

    Ok(())
}

/// One line per mask row, a labelled block per glyph
fn write_pixels(out: &mut String, mask: &PackedMask) -> fmt::Result {
    for (index, block) in mask.blocks.iter().enumerate() {
        if index != 0 {
            writeln!(out)?;
        }
        writeln!(out, "        // {}", block.label)?;
        for row in mask.glyph_rows(index) {
            out.push_str("       ");
            for byte in row {
                write!(out, " {byte:#04x},")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
