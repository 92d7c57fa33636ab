use image::imageops::{self, BiLevel};
use image::RgbImage;

use crate::error::{BoothError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channel {
    pub offset: u32,
    pub length: u32,
}

/// Layout of the framebuffer memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per row, including padding
    pub line_length: u32,
    pub grayscale: bool,
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

impl PixelFormat {
    /// The EV3 LCD
    pub fn mono(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: 1,
            line_length: (width + 31) / 32 * 4,
            grayscale: false,
            red: Channel::default(),
            green: Channel::default(),
            blue: Channel::default(),
        }
    }

    pub fn rgb565(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: 16,
            line_length: width * 2,
            grayscale: false,
            red: Channel { offset: 11, length: 5 },
            green: Channel { offset: 5, length: 6 },
            blue: Channel { offset: 0, length: 5 },
        }
    }

    pub fn is_monochrome(&self) -> bool {
        self.bits_per_pixel == 1
    }

    pub fn is_greyscale(&self) -> bool {
        self.grayscale || self.is_monochrome()
    }

    pub fn frame_len(&self) -> usize {
        (self.line_length * self.height) as usize
    }

    /// Drivers that leave the bitfields zeroed get the usual layout for their depth
    fn channels(&self) -> [Channel; 3] {
        if self.red.length + self.green.length + self.blue.length > 0 {
            return [self.red, self.green, self.blue];
        }
        match self.bits_per_pixel {
            16 => [
                Channel { offset: 11, length: 5 },
                Channel { offset: 5, length: 6 },
                Channel { offset: 0, length: 5 },
            ],
            _ => [
                Channel { offset: 16, length: 8 },
                Channel { offset: 8, length: 8 },
                Channel { offset: 0, length: 8 },
            ],
        }
    }
}

pub fn color565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Converts a frame into the bytes the framebuffer expects.
///
/// Pixels outside the image are left at zero. The image is cropped if it is
/// larger than the screen.
pub fn encode(img: &RgbImage, format: &PixelFormat) -> Result<Vec<u8>> {
    match format.bits_per_pixel {
        1 => Ok(encode_mono(img, format)),
        16 | 24 | 32 => Ok(encode_truecolor(img, format)),
        bpp => Err(BoothError::UnsupportedFormat(bpp)),
    }
}

// 1 = black, least significant bit is the leftmost pixel
fn encode_mono(img: &RgbImage, format: &PixelFormat) -> Vec<u8> {
    let mut gray = imageops::grayscale(img);
    imageops::dither(&mut gray, &BiLevel);

    let mut out = vec![0u8; format.frame_len()];
    let width = img.width().min(format.width);
    let height = img.height().min(format.height);
    for y in 0..height {
        let row = (y * format.line_length) as usize;
        for x in 0..width {
            if gray.get_pixel(x, y)[0] < 128 {
                out[row + (x / 8) as usize] |= 1 << (x % 8);
            }
        }
    }
    out
}

fn encode_truecolor(img: &RgbImage, format: &PixelFormat) -> Vec<u8> {
    let bytes_per_pixel = (format.bits_per_pixel / 8) as usize;
    let [red, green, blue] = format.channels();
    let pack = |value: u8, ch: Channel| -> u32 {
        if ch.length == 0 {
            return 0;
        }
        ((value as u32) >> (8 - ch.length.min(8))) << ch.offset
    };

    let mut out = vec![0u8; format.frame_len()];
    let width = img.width().min(format.width);
    let height = img.height().min(format.height);
    for y in 0..height {
        let row = (y * format.line_length) as usize;
        for x in 0..width {
            let [r, g, b] = img.get_pixel(x, y).0;
            let value = pack(r, red) | pack(g, green) | pack(b, blue);
            let start = row + x as usize * bytes_per_pixel;
            let bytes = value.to_le_bytes();
            out[start..start + bytes_per_pixel].copy_from_slice(&bytes[..bytes_per_pixel]);
        }
    }
    out
}
