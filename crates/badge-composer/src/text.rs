//! Badge text rendering
//!
//! Text is drawn with a scalable font when one is configured and loads
//! cleanly. Otherwise a built-in 8×8 bitmap face is scaled up to roughly the
//! requested pixel size, so a missing font never fails a composition.

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

const BITMAP_CELL: f32 = 8.0;

/// Draws text onto a badge canvas
pub struct TextRenderer {
    font: Option<FontVec>,
}

impl TextRenderer {
    /// Load the font at `path`, falling back to the bitmap face
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            debug!("No badge font configured, using bitmap face");
            return Self::bitmap();
        };

        let font = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(|e| e.to_string()));

        match font {
            Ok(font) => {
                debug!("Loaded badge font from {}", path.display());
                Self { font: Some(font) }
            }
            Err(e) => {
                warn!(
                    "Failed to load badge font {}, using bitmap face: {}",
                    path.display(),
                    e
                );
                Self::bitmap()
            }
        }
    }

    /// Renderer that always uses the built-in bitmap face
    pub fn bitmap() -> Self {
        Self { font: None }
    }

    pub fn is_scalable(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `text` with its top-left corner at (`x`, `y`)
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Rgba<u8>,
    ) {
        match &self.font {
            Some(font) => draw_scalable(font, canvas, text, x, y, size, color),
            None => draw_bitmap(canvas, text, x, y, size, color),
        }
    }
}

fn draw_scalable(
    font: &FontVec,
    canvas: &mut RgbaImage,
    text: &str,
    x: i32,
    y: i32,
    size: f32,
    color: Rgba<u8>,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let mut caret = point(x as f32, y as f32 + scaled.ascent());
    let mut previous = None;

    for ch in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            caret.x += scaled.kern(previous, id);
        }
        let glyph = id.with_scale_and_position(scale, caret);
        caret.x += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend(
                    canvas,
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    color,
                    coverage,
                );
            });
        }
    }
}

fn draw_bitmap(canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
    let cell = (size / BITMAP_CELL).round().max(1.0) as i32;
    let mut left = x;

    for ch in text.chars().filter(|c| !c.is_control()) {
        if let Some(rows) = bitmap_glyph(ch) {
            for (row, bits) in rows.iter().copied().enumerate() {
                for col in 0..8i32 {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    let px = left + col * cell;
                    let py = y + row as i32 * cell;
                    for dy in 0..cell {
                        for dx in 0..cell {
                            blend(canvas, px + dx, py + dy, color, 1.0);
                        }
                    }
                }
            }
        }
        left += 8 * cell;
    }
}

/// 8×8 rows for `ch`, covering ASCII and Latin-1, else `?`
fn bitmap_glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }

    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let under = f32::from(pixel.0[channel]);
        let over = f32::from(color.0[channel]);
        pixel.0[channel] = (under + (over - under) * coverage).round() as u8;
    }
    pixel.0[3] = pixel.0[3].max((coverage * 255.0).round() as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0x0E, 0x2A, 0x30, 0xFF]);
    const PAPER: Rgba<u8> = Rgba([0xF9, 0xF9, 0xF9, 0xFF]);

    fn blank() -> RgbaImage {
        RgbaImage::from_pixel(200, 80, PAPER)
    }

    fn fixture_font() -> TextRenderer {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf");
        TextRenderer::load(Some(&path))
    }

    /// Bounding box (min x, min y, max x, max y) of pixels differing from `PAPER`
    fn ink_bounds(canvas: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != PAPER)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
            })
    }

    #[test]
    fn test_missing_font_falls_back() {
        let renderer = TextRenderer::load(Some(Path::new("/nonexistent/font.ttf")));
        assert!(!renderer.is_scalable());
        assert!(!TextRenderer::load(None).is_scalable());
    }

    #[test]
    fn test_scalable_font_draws_name() {
        let renderer = fixture_font();
        assert!(renderer.is_scalable());

        let mut canvas = RgbaImage::from_pixel(860, 540, PAPER);
        renderer.draw(&mut canvas, "Ada Lovelace", 370, 120, 42.0, INK);

        let (x0, y0, x1, y1) = ink_bounds(&canvas).unwrap();
        assert!((370..380).contains(&x0), "x0 = {}", x0);
        assert!((120..135).contains(&y0), "y0 = {}", y0);
        assert!(x1 > 370 + 200 && x1 < 860, "x1 = {}", x1);
        assert!(y1 < 120 + 60, "y1 = {}", y1);
        assert!(canvas.pixels().any(|p| *p == INK));
    }

    #[test]
    fn test_scalable_font_scales_with_size() {
        let renderer = fixture_font();

        let mut small = RgbaImage::from_pixel(400, 100, PAPER);
        let mut large = RgbaImage::from_pixel(400, 100, PAPER);
        renderer.draw(&mut small, "#1001", 0, 0, 24.0, INK);
        renderer.draw(&mut large, "#1001", 0, 0, 42.0, INK);

        let (_, _, small_x, small_y) = ink_bounds(&small).unwrap();
        let (_, _, large_x, large_y) = ink_bounds(&large).unwrap();
        assert!(large_x > small_x);
        assert!(large_y > small_y);
    }

    #[test]
    fn test_garbage_font_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        assert!(!TextRenderer::load(Some(&path)).is_scalable());
    }

    #[test]
    fn test_bitmap_text_is_drawn() {
        let mut canvas = blank();
        TextRenderer::bitmap().draw(&mut canvas, "Ada", 10, 10, 24.0, INK);

        let inked = canvas.pixels().filter(|p| **p == INK).count();
        assert!(inked > 0);

        // 24px → 3px cells, three glyphs of 8 cells each
        for (x, y, p) in canvas.enumerate_pixels() {
            if *p == INK {
                assert!((10..10 + 3 * 24).contains(&x), "x = {}", x);
                assert!((10..10 + 24).contains(&y), "y = {}", y);
            }
        }
    }

    #[test]
    fn test_bitmap_latin1_glyphs() {
        assert_eq!(bitmap_glyph('é'), LATIN_FONTS.get('é'));
        assert_ne!(bitmap_glyph('é'), bitmap_glyph('?'));
        assert_eq!(bitmap_glyph('漢'), BASIC_FONTS.get('?'));

        let mut accented = blank();
        let mut unknown = blank();
        TextRenderer::bitmap().draw(&mut accented, "José", 10, 10, 24.0, INK);
        TextRenderer::bitmap().draw(&mut unknown, "Jos?", 10, 10, 24.0, INK);
        assert_ne!(accented, unknown);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut canvas = blank();
        TextRenderer::bitmap().draw(&mut canvas, "", 10, 10, 42.0, INK);
        assert!(canvas.pixels().all(|p| *p == PAPER));
    }

    #[test]
    fn test_clipped_text_does_not_panic() {
        let mut canvas = blank();
        TextRenderer::bitmap().draw(&mut canvas, "#1001", 190, 70, 42.0, INK);
        TextRenderer::bitmap().draw(&mut canvas, "#1001", -50, -50, 42.0, INK);
    }
}
