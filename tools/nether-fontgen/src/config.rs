//! fontgen.toml manifest parsing
//!
//! The manifest pins the design-time parameters of one generation run: which
//! font to read, the cell geometry every glyph is forced into, and the
//! contiguous code point range baked ahead of the fallback glyph. Every field
//! has a default, so an empty (or missing) manifest describes the reference
//! 6×13 console font.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{FontGenError, Result};

/// Code point of the fallback glyph, always baked at the last index
pub const FALLBACK: char = '\u{FFFD}';

/// fontgen.toml manifest structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontManifest {
    #[serde(default)]
    pub font: FontSection,
    #[serde(default)]
    pub cell: CellGeometry,
    #[serde(default)]
    pub glyphs: GlyphRange,

    /// Directory that relative paths in the manifest resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Font source and output naming
#[derive(Debug, Clone, Deserialize)]
pub struct FontSection {
    /// BDF file to read glyphs from
    pub source: Option<PathBuf>,

    /// Name used for the generated statics (e.g. "6x13" -> `MASK_6X13`)
    #[serde(default = "default_name")]
    pub name: String,

    /// Generated Rust file
    pub output: Option<PathBuf>,
}

impl Default for FontSection {
    fn default() -> Self {
        Self {
            source: None,
            name: default_name(),
            output: None,
        }
    }
}

fn default_name() -> String {
    "6x13".to_string()
}

/// Fixed cell every glyph is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CellGeometry {
    /// Stored columns per glyph. Font columns past this are trimmed.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Rows per glyph band
    #[serde(default = "default_height")]
    pub height: u32,

    /// Baseline offset from the top of the band
    #[serde(default = "default_ascent")]
    pub ascent: u32,

    /// Natural advance of the font. Defaults to `width + 1`.
    #[serde(default)]
    pub advance: Option<u32>,
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            ascent: default_ascent(),
            advance: None,
        }
    }
}

// The reference font leaves its right-most column empty, so 7 columns of
// advance are stored as 6.
fn default_width() -> u32 {
    6
}

fn default_height() -> u32 {
    13
}

fn default_ascent() -> u32 {
    11
}

impl CellGeometry {
    pub fn new(width: u32, height: u32, ascent: u32) -> Self {
        Self {
            width,
            height,
            ascent,
            advance: None,
        }
    }

    pub fn advance(&self) -> u32 {
        self.advance.unwrap_or(self.width + 1)
    }

    pub fn descent(&self) -> u32 {
        self.height - self.ascent
    }

    /// Bytes in one packed glyph
    pub fn glyph_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FontGenError::InvalidConfig(format!(
                "cell must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.ascent > self.height {
            return Err(FontGenError::InvalidConfig(format!(
                "ascent {} exceeds cell height {}",
                self.ascent, self.height
            )));
        }
        Ok(())
    }

    /// Height of a canvas holding `glyph_count` bands
    ///
    /// Fails if the canvas height does not fit pixel coordinates or the
    /// packed byte count does not fit `usize`.
    pub fn canvas_height(&self, glyph_count: usize) -> Result<u32> {
        let too_large = || {
            FontGenError::InvalidConfig(format!(
                "{} glyphs of {}x{} do not fit in one canvas",
                glyph_count, self.width, self.height
            ))
        };

        let height = u32::try_from(glyph_count)
            .ok()
            .and_then(|count| self.height.checked_mul(count))
            .filter(|&h| i32::try_from(h).is_ok())
            .ok_or_else(too_large)?;
        (self.width as usize)
            .checked_mul(height as usize)
            .ok_or_else(too_large)?;

        Ok(height)
    }
}

/// Contiguous code point range baked before the fallback glyph (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GlyphRange {
    #[serde(default = "default_first")]
    pub first: u32,
    #[serde(default = "default_last")]
    pub last: u32,
}

impl Default for GlyphRange {
    fn default() -> Self {
        Self {
            first: default_first(),
            last: default_last(),
        }
    }
}

fn default_first() -> u32 {
    0x20
}

fn default_last() -> u32 {
    0x7e
}

impl GlyphRange {
    pub fn new(first: char, last: char) -> Self {
        Self {
            first: first as u32,
            last: last as u32,
        }
    }

    /// Number of code points in the range
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    /// Code points in ascending order
    ///
    /// Fails if any value in the range is not a Unicode scalar value.
    pub fn chars(&self) -> Result<Vec<char>> {
        self.validate()?;
        (self.first..=self.last)
            .map(|cp| {
                char::from_u32(cp).ok_or_else(|| {
                    FontGenError::InvalidConfig(format!("{cp:#x} is not a valid code point"))
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(FontGenError::InvalidConfig(format!(
                "glyph range {:#x}..={:#x} is empty",
                self.first, self.last
            )));
        }
        let fallback = FALLBACK as u32;
        if (self.first..=self.last).contains(&fallback) {
            return Err(FontGenError::InvalidConfig(format!(
                "glyph range {:#x}..={:#x} contains the fallback U+{:04X}",
                self.first, self.last, fallback
            )));
        }
        Ok(())
    }
}

impl FontManifest {
    /// Validate cell geometry, glyph range and output naming
    pub fn validate(&self) -> Result<()> {
        self.cell.validate()?;
        self.glyphs.validate()?;
        // Range plus the fallback glyph.
        self.cell.canvas_height(self.glyphs.len() + 1)?;
        if !self.font.name.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(FontGenError::InvalidConfig(format!(
                "font name {:?} has no usable characters",
                self.font.name
            )));
        }
        Ok(())
    }

    /// Font source path, resolved against the manifest directory
    pub fn source_path(&self) -> Result<PathBuf> {
        let source = self.font.source.as_ref().ok_or_else(|| {
            FontGenError::InvalidConfig("no font source given (set [font].source or --font)".into())
        })?;
        Ok(self.base_dir.join(source))
    }

    /// Output path, resolved against the manifest directory
    pub fn output_path(&self) -> Result<PathBuf> {
        let output = self.font.output.as_ref().ok_or_else(|| {
            FontGenError::InvalidConfig("no output given (set [font].output or --output)".into())
        })?;
        Ok(self.base_dir.join(output))
    }

    /// Suffix shared by the generated statics, e.g. `6X13`
    pub fn ident_suffix(&self) -> String {
        self.font
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Parse a manifest from TOML text
pub fn parse_manifest(text: &str, path: &Path) -> Result<FontManifest> {
    let mut manifest: FontManifest =
        toml::from_str(text).map_err(|e| FontGenError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    manifest.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(manifest)
}

/// Load fontgen.toml manifest
pub fn load_manifest(path: &Path) -> Result<FontManifest> {
    let text = std::fs::read_to_string(path).map_err(|e| FontGenError::Manifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_manifest(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_font() {
        let manifest = parse_manifest("", Path::new("fontgen.toml")).unwrap();
        assert_eq!(manifest.cell, CellGeometry::new(6, 13, 11));
        assert_eq!(manifest.cell.advance(), 7);
        assert_eq!(manifest.cell.descent(), 2);
        assert_eq!(manifest.glyphs.first, 0x20);
        assert_eq!(manifest.glyphs.last, 0x7e);
        assert_eq!(manifest.glyphs.len(), 95);
        assert_eq!(manifest.ident_suffix(), "6X13");
    }

    #[test]
    fn test_parse_full_manifest() {
        let text = r#"
            [font]
            source = "fonts/8x16.bdf"
            name = "8x16-bold"
            output = "src/data.rs"

            [cell]
            width = 8
            height = 16
            ascent = 12
            advance = 8

            [glyphs]
            first = 0x41
            last = 0x5a
        "#;
        let manifest = parse_manifest(text, Path::new("assets/fontgen.toml")).unwrap();
        assert_eq!(manifest.cell.advance(), 8);
        assert_eq!(manifest.glyphs.len(), 26);
        assert_eq!(manifest.ident_suffix(), "8X16_BOLD");
        assert_eq!(
            manifest.source_path().unwrap(),
            Path::new("assets/fonts/8x16.bdf")
        );
        assert_eq!(manifest.output_path().unwrap(), Path::new("assets/src/data.rs"));
        manifest.validate().unwrap();
    }

    #[test]
    fn test_missing_source_is_reported() {
        let manifest = FontManifest::default();
        assert!(matches!(
            manifest.source_path(),
            Err(FontGenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(CellGeometry::new(0, 13, 11).validate().is_err());
        assert!(CellGeometry::new(6, 13, 14).validate().is_err());
        assert!(CellGeometry::new(6, 13, 13).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(GlyphRange { first: 0x7e, last: 0x20 }.validate().is_err());
        assert!(GlyphRange {
            first: 0xff00,
            last: 0xffff
        }
        .validate()
        .is_err());
        assert!(GlyphRange {
            first: 0xd7ff,
            last: 0xe000
        }
        .chars()
        .is_err());
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        let tall = CellGeometry::new(6, 1_500_000_000, 11);
        tall.validate().unwrap();
        assert!(matches!(
            tall.canvas_height(4),
            Err(FontGenError::InvalidConfig(_))
        ));
        assert!(CellGeometry::new(6, u32::MAX, 11).canvas_height(2).is_err());
        assert_eq!(CellGeometry::default().canvas_height(96).unwrap(), 96 * 13);

        let text = "[cell]\nheight = 1500000000\n\n[glyphs]\nfirst = 0x41\nlast = 0x43";
        let manifest = parse_manifest(text, Path::new("fontgen.toml")).unwrap();
        assert!(matches!(
            manifest.validate(),
            Err(FontGenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_range_chars_are_ascending() {
        let chars = GlyphRange::new('a', 'e').chars().unwrap();
        assert_eq!(chars, vec!['a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn test_malformed_manifest() {
        let err = parse_manifest("[cell]\nwidth = \"wide\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, FontGenError::Manifest { .. }));
    }
}
