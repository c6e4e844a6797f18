//! Ordered glyph request
//!
//! A request is the contiguous range followed by exactly one fallback glyph.
//! Position in the request is position in the canvas, so the order here is
//! the index-to-offset mapping of the generated table.

use std::fmt;

use crate::config::{GlyphRange, FALLBACK};
use crate::error::Result;

/// Code points to bake, in canvas order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRequest {
    codepoints: Vec<char>,
}

impl GlyphRequest {
    /// Build the request for `range` with the fallback appended last
    pub fn new(range: &GlyphRange) -> Result<Self> {
        let mut codepoints = range.chars()?;
        codepoints.push(FALLBACK);
        Ok(Self { codepoints })
    }

    /// Number of glyphs, fallback included
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    /// Never true: the fallback is always present
    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    pub fn codepoints(&self) -> &[char] {
        &self.codepoints
    }

    /// Index of the fallback glyph
    pub fn fallback_index(&self) -> usize {
        self.codepoints.len() - 1
    }

    /// Boundary label for glyph `index`
    pub fn label(&self, index: usize) -> GlyphLabel {
        if index == self.fallback_index() {
            GlyphLabel::Fallback
        } else {
            GlyphLabel::Char(self.codepoints[index])
        }
    }
}

/// Annotation emitted ahead of each glyph block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphLabel {
    /// Glyph from the contiguous range
    Char(char),
    /// The replacement glyph at the last index
    Fallback,
}

impl fmt::Display for GlyphLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphLabel::Char(c) => write!(f, "{:#04x} {:?}", *c as u32, c),
            GlyphLabel::Fallback => write!(f, "U+{:04X} REPLACEMENT CHARACTER", FALLBACK as u32),
        }
    }
}
