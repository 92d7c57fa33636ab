pub mod encode;
pub mod framebuffer;
pub mod terminal;
pub mod text;

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use log::debug;

use crate::capture::CaptureRequest;
use crate::error::Result;
use encode::{encode, PixelFormat};
use framebuffer::Framebuffer;
use text::TextRenderer;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// The booth's view of the screen
pub trait Display {
    /// Picture size and color mode that fit this screen
    fn capture_request(&self) -> CaptureRequest;
    fn show_text(&mut self, text: &str, size: f32) -> Result<()>;
    fn show_image(&mut self, path: &Path) -> Result<()>;
}

impl<D: Display + ?Sized> Display for &mut D {
    fn capture_request(&self) -> CaptureRequest {
        (**self).capture_request()
    }

    fn show_text(&mut self, text: &str, size: f32) -> Result<()> {
        (**self).show_text(text, size)
    }

    fn show_image(&mut self, path: &Path) -> Result<()> {
        (**self).show_image(path)
    }
}

/// Scales `img` to fit inside `width` x `height`, keeping its aspect ratio,
/// and centers it on a `background` frame
pub fn fit_image(img: &RgbImage, width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    let mut frame = RgbImage::from_pixel(width, height, background);
    if img.width() == 0 || img.height() == 0 || width == 0 || height == 0 {
        return frame;
    }

    let scaled;
    let img = if img.width() == width && img.height() == height {
        img
    } else {
        let ratio = f64::min(
            width as f64 / img.width() as f64,
            height as f64 / img.height() as f64,
        );
        let w = ((img.width() as f64 * ratio).round() as u32).clamp(1, width);
        let h = ((img.height() as f64 * ratio).round() as u32).clamp(1, height);
        scaled = imageops::resize(img, w, h, FilterType::Triangle);
        &scaled
    };

    let x = (width - img.width()) / 2;
    let y = (height - img.height()) / 2;
    imageops::overlay(&mut frame, img, x as i64, y as i64);
    frame
}

/// The framebuffer plus what's needed to draw on it
pub struct Screen {
    fb: Framebuffer,
    format: PixelFormat,
    text: TextRenderer,
}

impl Screen {
    pub fn new(fb: Framebuffer, text: TextRenderer) -> Self {
        let format = fb.format();
        Self { fb, format, text }
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Ink and paper colors. The EV3 LCD reads best as black on white.
    fn palette(&self) -> (Rgb<u8>, Rgb<u8>) {
        if self.format.is_monochrome() {
            (BLACK, WHITE)
        } else {
            (WHITE, BLACK)
        }
    }

    fn present(&mut self, frame: &RgbImage) -> Result<()> {
        let bytes = encode(frame, &self.format)?;
        self.fb.write_raw(&bytes)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.fb.clear()
    }
}

impl Display for Screen {
    fn capture_request(&self) -> CaptureRequest {
        CaptureRequest {
            width: self.format.width,
            height: self.format.height,
            greyscale: self.format.is_greyscale(),
        }
    }

    fn show_text(&mut self, text: &str, size: f32) -> Result<()> {
        debug!("Showing text {:?}", text);
        let (ink, paper) = self.palette();
        let frame = self
            .text
            .render(text, size, self.format.width, self.format.height, ink, paper);
        self.present(&frame)
    }

    fn show_image(&mut self, path: &Path) -> Result<()> {
        debug!("Showing image {}", path.display());
        let img = image::open(path)?.to_rgb8();
        let (_, paper) = self.palette();
        let frame = fit_image(&img, self.format.width, self.format.height, paper);
        self.present(&frame)
    }
}
