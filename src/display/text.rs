use std::fs;
use std::path::Path;

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, Rect, ScaleFont};
use image::{Rgb, RgbImage};

use crate::error::{BoothError, Result};

pub struct TextRenderer {
    font: FontVec,
}

impl TextRenderer {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|_| BoothError::Font(path.to_path_buf()))?;
        let font = FontVec::try_from_vec(data).map_err(|_| BoothError::Font(path.to_path_buf()))?;
        Ok(Self { font })
    }

    fn layout(&self, text: &str, size: f32) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut caret = point(0.0, scaled.ascent());
        let mut last = None;
        let mut glyphs = Vec::new();

        for c in text.chars() {
            let mut glyph = scaled.scaled_glyph(c);
            if let Some(prev) = last {
                caret.x += scaled.kern(prev, glyph.id);
            }
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            last = Some(glyph.id);
            glyphs.push(glyph);
        }
        glyphs
    }

    /// Draws `text` centered on a blank `width` x `height` frame
    pub fn render(&self, text: &str, size: f32, width: u32, height: u32, ink: Rgb<u8>, paper: Rgb<u8>) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, paper);

        let outlined: Vec<_> = self
            .layout(text, size)
            .into_iter()
            .filter_map(|g| self.font.outline_glyph(g))
            .collect();

        let Some(bounds) = outlined
            .iter()
            .map(|g| g.px_bounds())
            .reduce(|a, b| Rect {
                min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
                max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
            })
        else {
            return img;
        };

        let dx = ((width as f32 - bounds.width()) / 2.0 - bounds.min.x).round();
        let dy = ((height as f32 - bounds.height()) / 2.0 - bounds.min.y).round();

        for glyph in &outlined {
            let gb = glyph.px_bounds();
            glyph.draw(|x, y, coverage| {
                let px = gb.min.x + dx + x as f32;
                let py = gb.min.y + dy + y as f32;
                if px < 0.0 || py < 0.0 || px >= width as f32 || py >= height as f32 {
                    return;
                }
                let pixel = img.get_pixel_mut(px as u32, py as u32);
                for i in 0..3 {
                    let from = pixel[i] as f32;
                    pixel[i] = (from + (ink[i] as f32 - from) * coverage.min(1.0)).round() as u8;
                }
            });
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::Config;

    fn renderer() -> Option<TextRenderer> {
        let path = Config::default().font_path;
        if !path.exists() {
            eprintln!("{} not installed, skipping", path.display());
            return None;
        }
        Some(TextRenderer::load(&path).unwrap())
    }

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_missing_font() {
        let path = PathBuf::from("/nonexistent/font.ttf");
        match TextRenderer::load(&path) {
            Err(BoothError::Font(p)) => assert_eq!(p, path),
            _ => panic!("expected a font error"),
        }
    }

    #[test]
    fn test_not_a_font() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"definitely not truetype").unwrap();
        assert!(matches!(
            TextRenderer::load(file.path()),
            Err(BoothError::Font(_))
        ));
    }

    #[test]
    fn test_countdown_digit_is_centered() {
        let Some(text) = renderer() else { return };
        let img = text.render("3", 96.0, 178, 128, BLACK, WHITE);

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());

        let min_x = inked.iter().map(|p| p.0).min().unwrap() as i32;
        let max_x = inked.iter().map(|p| p.0).max().unwrap() as i32;
        let min_y = inked.iter().map(|p| p.1).min().unwrap() as i32;
        let max_y = inked.iter().map(|p| p.1).max().unwrap() as i32;
        assert!((min_x - (177 - max_x)).abs() <= 2);
        assert!((min_y - (127 - max_y)).abs() <= 2);
    }

    #[test]
    fn test_blank_text() {
        let Some(text) = renderer() else { return };
        let img = text.render(" ", 36.0, 10, 10, WHITE, BLACK);
        assert!(img.pixels().all(|p| *p == BLACK));
    }
}
