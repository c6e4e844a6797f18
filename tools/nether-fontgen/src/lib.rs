//! nether-fontgen library
//!
//! Bakes a fixed-width bitmap font into a packed coverage mask that can be
//! embedded as static data. The pipeline is strictly linear:
//!
//! ```text
//! GlyphRequest -> rasterize (Canvas) -> encode (PackedMask) -> render_rust -> write_atomic
//! ```
//!
//! Glyph `i` of the request owns rows `height * i..height * (i + 1)` of the
//! mask; the last glyph is always U+FFFD.

pub mod codegen;
pub mod config;
pub mod error;
pub mod output;
pub mod pack;
pub mod raster;
pub mod request;
pub mod source;

use std::path::Path;

pub use codegen::{render_rust, FaceMetrics, ModuleInfo};
pub use config::{load_manifest, CellGeometry, FontManifest, GlyphRange, FALLBACK};
pub use error::{FontGenError, Result};
pub use output::{check_in_sync, write_atomic, write_preview};
pub use pack::{encode, PackedMask, Rect, COVERED, UNCOVERED};
pub use raster::{rasterize, Canvas};
pub use request::{GlyphLabel, GlyphRequest};
pub use source::{BdfSource, Glyph, GlyphSource, MemorySource};

/// Rasterized canvas, packed mask and face metrics of one run
#[derive(Debug, Clone)]
pub struct BakedFont {
    pub canvas: Canvas,
    pub mask: PackedMask,
    pub face: FaceMetrics,
}

/// Rasterize and pack `range` plus the fallback glyph from `source`
pub fn bake<S: GlyphSource>(
    source: &S,
    cell: CellGeometry,
    range: &GlyphRange,
) -> Result<BakedFont> {
    let request = GlyphRequest::new(range)?;
    let canvas = rasterize(source, &request, cell)?;
    let mask = encode(&canvas, &request)?;
    let face = FaceMetrics::new(&cell, range);

    Ok(BakedFont { canvas, mask, face })
}

/// Baked font plus its generated Rust source
#[derive(Debug, Clone)]
pub struct GeneratedFont {
    pub baked: BakedFont,
    pub text: String,
}

/// Run the whole pipeline for `manifest`, without writing anything
pub fn generate(manifest: &FontManifest) -> Result<GeneratedFont> {
    manifest.validate()?;

    let source_path = manifest.source_path()?;
    let source = BdfSource::open(&source_path)?;
    tracing::info!(
        "Loaded {:?} ({} glyphs defined)",
        source_path,
        source.glyph_count()
    );

    let baked = bake(&source, manifest.cell, &manifest.glyphs)?;

    let suffix = manifest.ident_suffix();
    let source_name = source_name(&source_path);
    let info = ModuleInfo {
        ident_suffix: &suffix,
        source_name: &source_name,
    };
    let text = render_rust(&baked.mask, &baked.face, &info)?;

    tracing::info!(
        "Baked {} glyphs ({}x{}) into {} bytes",
        baked.mask.glyph_count(),
        manifest.cell.width,
        manifest.cell.height,
        baked.mask.pixels.len()
    );

    Ok(GeneratedFont { baked, text })
}

/// File name only, so output does not depend on where the font lives
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
