//! Drawing surfaces and fonts.
//!
//! Every chart gets its own bitmap canvas through [`with_canvas`]: the canvas
//! is created, handed to the drawing closure, and presented (written to disk)
//! before the function returns. Nothing is shared between charts, so
//! pipelines can render concurrently.
//!
//! Text is rendered with `ab_glyph`, which needs a TrueType font registered at
//! runtime. [`init_fonts`] does that once per process; when no font can be
//! found, [`text_enabled`] reports `false` and renderers leave text out.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

use crate::error::AppError;

/// Bitmap drawing area used by every renderer.
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Result type of drawing closures; plotters errors are boxed and mapped to
/// `AppError` at the canvas boundary.
pub type DrawResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Font family every renderer asks for.
pub const FONT_FAMILY: &str = "sans-serif";

static FONTS: OnceLock<Option<PathBuf>> = OnceLock::new();

const FONT_CANDIDATES: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register the chart font. Later calls return the first call's outcome.
///
/// `configured` is tried first, then a list of well-known system locations.
/// Returns the font in use, or `None` when text will be disabled.
pub fn init_fonts(configured: Option<&Path>) -> Option<PathBuf> {
    FONTS
        .get_or_init(|| {
            let mut candidates: Vec<PathBuf> = configured.map(Path::to_path_buf).into_iter().collect();
            candidates.extend(FONT_CANDIDATES.iter().map(PathBuf::from));

            for path in candidates {
                match register_family(&path) {
                    Ok(()) => {
                        log::debug!("Chart font: {}", path.display());
                        return Some(path);
                    }
                    Err(err) if configured.is_some_and(|c| c == path) => {
                        log::warn!("Configured font unusable: {err}");
                    }
                    Err(_) => {}
                }
            }

            log::warn!("No TrueType font found; charts are drawn without text and table images are skipped.");
            None
        })
        .clone()
}

/// Whether a font has been registered.
pub fn text_enabled() -> bool {
    FONTS.get().is_some_and(Option::is_some)
}

fn register_family(path: &Path) -> Result<(), AppError> {
    let regular = read_font(path)?;
    let bold = bold_sibling(path)
        .and_then(|p| read_font(&p).ok())
        .unwrap_or(regular);

    register_font(FONT_FAMILY, FontStyle::Normal, regular)
        .map_err(|_| AppError::new(2, format!("Invalid font file '{}'", path.display())))?;
    register_font(FONT_FAMILY, FontStyle::Bold, bold)
        .map_err(|_| AppError::new(2, format!("Invalid font file '{}'", path.display())))?;
    Ok(())
}

fn read_font(path: &Path) -> Result<&'static [u8], AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to read font '{}': {e}", path.display())))?;
    // The registry keeps fonts for the life of the process.
    Ok(Box::leak(bytes.into_boxed_slice()))
}

/// `DejaVuSans.ttf` -> `DejaVuSans-Bold.ttf`, when such a file exists.
fn bold_sibling(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    let base = stem.strip_suffix("-Regular").unwrap_or(stem);
    let candidate = path.with_file_name(format!("{base}-Bold.{ext}"));
    candidate.exists().then_some(candidate)
}

/// Create a `size` bitmap at `path`, fill it white, run `draw` on it and
/// write the file.
pub fn with_canvas<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), AppError>
where
    F: FnOnce(&Canvas<'_>) -> DrawResult<()>,
{
    let render_err = |e: &dyn std::fmt::Display| AppError::new(4, format!("Failed to render '{}': {e}", path.display()));

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(&e))?;
    draw(&root).map_err(|e| render_err(&e))?;
    root.present().map_err(|e| render_err(&e))?;

    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Regular text style at `size` px.
pub fn font(size: u32) -> TextStyle<'static> {
    TextStyle::from((FONT_FAMILY, size).into_font())
}

/// Bold text style at `size` px.
pub fn bold(size: u32) -> TextStyle<'static> {
    TextStyle::from((FONT_FAMILY, size).into_font().style(FontStyle::Bold))
}

pub fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        with_canvas(&path, (64, 48), |root| {
            root.draw(&Rectangle::new([(4, 4), (20, 20)], BLUE.filled()))?;
            Ok(())
        })
        .unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn canvas_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");
        let err = with_canvas(&path, (32, 32), |_| Ok(())).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn bold_sibling_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let regular = dir.path().join("Sans-Regular.ttf");
        assert_eq!(bold_sibling(&regular), None);
        fs::write(dir.path().join("Sans-Bold.ttf"), b"x").unwrap();
        assert_eq!(bold_sibling(&regular), Some(dir.path().join("Sans-Bold.ttf")));
    }
}
