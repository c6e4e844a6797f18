//! Output sink
//!
//! Generated files are written through a temporary file in the destination
//! directory and renamed into place, so a failed run never leaves a truncated
//! table behind.

use image::imageops::{self, FilterType};
use std::fs::Permissions;
use std::io::Write;
use std::path::Path;

use crate::error::{FontGenError, Result};
use crate::raster::Canvas;

/// Write `contents` to `path` atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let sink_err = |source| FontGenError::Sink {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(sink_err)?;
    file.write_all(contents).map_err(sink_err)?;
    if let Some(permissions) = target_permissions(path) {
        file.as_file()
            .set_permissions(permissions)
            .map_err(sink_err)?;
    }
    file.as_file().sync_all().map_err(sink_err)?;
    file.persist(path).map_err(|e| sink_err(e.error))?;

    tracing::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Permissions for the replacement file
///
/// An existing target keeps its mode; new files get 0644 like a plain write.
fn target_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Compare freshly generated text with the file on disk
///
/// A missing file counts as out of sync.
pub fn check_in_sync(path: &Path, fresh: &str) -> Result<bool> {
    match std::fs::read_to_string(path) {
        Ok(existing) => Ok(existing == fresh),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(FontGenError::Sink {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Save the canvas as a PNG, every pixel scaled up `scale` times
///
/// Covered pixels are white, everything else black.
pub fn write_preview(canvas: &Canvas, path: &Path, scale: u32) -> Result<()> {
    let mut image = canvas.image().clone();
    for pixel in image.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > 0 { 255 } else { 0 };
    }

    let scale = scale.max(1);
    let image = if scale == 1 {
        image
    } else {
        imageops::resize(
            &image,
            image.width() * scale,
            image.height() * scale,
            FilterType::Nearest,
        )
    };

    image.save(path).map_err(|source| FontGenError::Preview {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote {}x{} preview to {:?}", image.width(), image.height(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellGeometry;
    use crate::source::Glyph;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("data.rs");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        // No temporary files left next to the output.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("Failed to create temp dir");
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;

        let fresh = dir.path().join("fresh.rs");
        write_atomic(&fresh, b"data").unwrap();
        assert_eq!(mode(&fresh), 0o644);

        let existing = dir.path().join("existing.rs");
        std::fs::write(&existing, "old").unwrap();
        std::fs::set_permissions(&existing, Permissions::from_mode(0o640)).unwrap();
        write_atomic(&existing, b"new").unwrap();
        assert_eq!(mode(&existing), 0o640);
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing").join("data.rs");
        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, FontGenError::Sink { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_check_in_sync() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("data.rs");

        assert!(!check_in_sync(&path, "table").unwrap());
        std::fs::write(&path, "table").unwrap();
        assert!(check_in_sync(&path, "table").unwrap());
        assert!(!check_in_sync(&path, "table2").unwrap());
    }

    #[test]
    fn test_preview_png() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("preview.png");

        let mut canvas = Canvas::new(CellGeometry::new(3, 4, 3), 2).unwrap();
        let mut faint = image::GrayImage::new(1, 1);
        faint.put_pixel(0, 0, image::Luma([7]));
        canvas.draw(0, &Glyph::new(faint, 0, 1));
        write_preview(&canvas, &path, 2).unwrap();

        let decoded = image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (6, 16));
        // Pixel (0, 2) is covered and doubled.
        assert_eq!(decoded.get_pixel(0, 4).0[0], 255);
        assert_eq!(decoded.get_pixel(1, 5).0[0], 255);
        assert_eq!(decoded.get_pixel(2, 4).0[0], 0);
    }
}
