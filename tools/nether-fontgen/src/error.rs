//! Error taxonomy for font generation
//!
//! Every failure is fatal to the run. Variants are grouped by the step that
//! failed: resolving glyphs from the font source, checking the packed mask,
//! or handing the artifact to the output sink.

use std::path::PathBuf;

/// Errors produced while generating a packed font mask
#[derive(Debug, thiserror::Error)]
pub enum FontGenError {
    /// The font file could not be read
    #[error("failed to read font {path:?}: {source}")]
    ReadFont {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The font file was read but could not be parsed
    #[error("failed to parse font {path:?}: {message}")]
    ParseFont { path: PathBuf, message: String },

    /// The font has no glyph for a requested code point
    #[error("glyph draw failed: no glyph for {codepoint:?} (request index {index})")]
    GlyphNotFound { codepoint: char, index: usize },

    /// Cell geometry or glyph range is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The manifest file could not be read or parsed
    #[error("failed to load manifest {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Packed byte count disagrees with the layout metadata
    #[error("packed mask has {actual} bytes, expected {expected} (stride {stride} x height {height})")]
    Postcondition {
        expected: usize,
        actual: usize,
        stride: usize,
        height: usize,
    },

    /// The Rust module could not be formatted
    #[error("failed to render module: {0}")]
    Render(#[from] std::fmt::Error),

    /// The generated artifact could not be written
    #[error("failed to write {path:?}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preview image could not be encoded
    #[error("failed to write preview {path:?}: {source}")]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result alias for font generation
pub type Result<T> = std::result::Result<T, FontGenError>;
