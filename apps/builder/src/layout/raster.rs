//! RGB pixel buffer the layout paints into.

use anyhow::{Context, Result};

use crate::render::tree::Color;

/// 8-bit RGB image, rows top to bottom, no padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            rgb.extend_from_slice(&[background.0, background.1, background.2]);
        }
        Self { width, height, rgb }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Color(self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]))
    }

    /// Mixes `color` into one pixel with the given coverage (0.0..=1.0).
    /// Out-of-bounds coordinates are ignored.
    pub fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let a = coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        for (offset, channel) in [color.0, color.1, color.2].into_iter().enumerate() {
            let dst = self.rgb[i + offset] as f32;
            self.rgb[i + offset] = (dst + (channel as f32 - dst) * a).round() as u8;
        }
    }

    /// Fills the rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let x0 = x.round().max(0.0) as i32;
        let y0 = y.round().max(0.0) as i32;
        let x1 = ((x + w).round() as i32).min(self.width as i32);
        let y1 = ((y + h).round() as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Encodes the image as an 8-bit RGB PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .context("Failed to write PNG header")?;
            writer
                .write_image_data(&self.rgb)
                .context("Failed to write PNG image data")?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_background() {
        let img = RasterImage::new(3, 2, Color::WHITE);
        assert_eq!(img.rgb().len(), 18);
        assert!(img.rgb().iter().all(|b| *b == 255));
    }

    #[test]
    fn test_blend_partial_coverage() {
        let mut img = RasterImage::new(1, 1, Color::WHITE);
        img.blend(0, 0, Color(0, 0, 0), 0.5);
        let p = img.pixel(0, 0).unwrap();
        assert!(p.0 >= 127 && p.0 <= 128);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut img = RasterImage::new(4, 4, Color::WHITE);
        img.fill_rect(2.0, 2.0, 10.0, 10.0, Color::GRAY_900);
        assert_eq!(img.pixel(3, 3), Some(Color::GRAY_900));
        assert_eq!(img.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(img.pixel(4, 4), None);
    }

    #[test]
    fn test_png_signature() {
        let img = RasterImage::new(2, 2, Color::GRAY_100);
        let png = img.to_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
