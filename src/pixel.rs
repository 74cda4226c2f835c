use std::fmt;

use anyhow::{bail, Result};

use crate::color::Color;

/// Alpha byte written by the 32 bpp encoder unless overridden
pub const DEFAULT_ALPHA: u8 = 0;

/// On-device pixel layout, one variant per supported depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8 bpp, red/green/blue reduced to 3/3/2 levels
    Indexed8,
    /// 16 bpp little-endian RGB565
    Rgb565,
    /// 32 bpp, bytes in blue, green, red, alpha order
    Bgra8888 { alpha: u8 },
}

impl PixelFormat {
    /// Format for a reported depth; `None` for depths this tool does not draw
    pub fn from_bpp(bits_per_pixel: u32, alpha: u8) -> Option<Self> {
        match bits_per_pixel {
            8 => Some(PixelFormat::Indexed8),
            16 => Some(PixelFormat::Rgb565),
            32 => Some(PixelFormat::Bgra8888 { alpha }),
            _ => None,
        }
    }

    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Indexed8 => 8,
            PixelFormat::Rgb565 => 16,
            PixelFormat::Bgra8888 { .. } => 32,
        }
    }
}

/// Pick the layout for a reported depth.
///
/// Unknown depths yield `None` (nothing is drawn) unless `require_32bpp` is
/// set, in which case anything but 32 bpp is an error.
pub fn select_format(
    bits_per_pixel: u32,
    alpha: u8,
    require_32bpp: bool,
) -> Result<Option<PixelFormat>> {
    let format = PixelFormat::from_bpp(bits_per_pixel, alpha);
    if require_32bpp && format.map(|f| f.bits_per_pixel()) != Some(32) {
        bail!("unsupported bits per pixel: {}", bits_per_pixel);
    }
    Ok(format)
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Indexed8 => write!(f, "8 bpp indexed"),
            PixelFormat::Rgb565 => write!(f, "16 bpp RGB565"),
            PixelFormat::Bgra8888 { alpha } => write!(f, "32 bpp BGRA (alpha {})", alpha),
        }
    }
}

/// Writes logical colors into device memory for one pixel layout.
///
/// The scan driver is generic over this trait, so the layout is picked once
/// at startup and every pixel write is a direct call.
pub trait PixelEncoder {
    /// Reduce a raw color to the value range this layout can hold
    fn reduce(&self, color: Color) -> Color;

    /// Store an already reduced color at byte offset `location`
    fn write(&self, pixels: &mut [u8], location: usize, color: Color);

    /// Inverse of `write`
    fn read(&self, pixels: &[u8], location: usize) -> Color;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Indexed8;

impl PixelEncoder for Indexed8 {
    fn reduce(&self, color: Color) -> Color {
        Color::new(color.red % 3, color.green % 3, color.blue % 2)
    }

    #[inline]
    fn write(&self, pixels: &mut [u8], location: usize, color: Color) {
        pixels[location] = (color.red << 5) | (color.green << 2) | color.blue;
    }

    fn read(&self, pixels: &[u8], location: usize) -> Color {
        let byte = pixels[location];
        Color::new(byte >> 5, (byte >> 2) & 0b111, byte & 0b11)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb565;

impl PixelEncoder for Rgb565 {
    fn reduce(&self, color: Color) -> Color {
        Color::new(color.red % 32, color.green % 64, color.blue % 32)
    }

    #[inline]
    fn write(&self, pixels: &mut [u8], location: usize, color: Color) {
        let word =
            (u16::from(color.red) << 11) | (u16::from(color.green) << 5) | u16::from(color.blue);
        pixels[location..location + 2].copy_from_slice(&word.to_le_bytes());
    }

    fn read(&self, pixels: &[u8], location: usize) -> Color {
        let word = u16::from_le_bytes([pixels[location], pixels[location + 1]]);
        Color::new(
            (word >> 11) as u8,
            ((word >> 5) & 0x3f) as u8,
            (word & 0x1f) as u8,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bgra8888 {
    pub alpha: u8,
}

impl Default for Bgra8888 {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl PixelEncoder for Bgra8888 {
    fn reduce(&self, color: Color) -> Color {
        color
    }

    #[inline]
    fn write(&self, pixels: &mut [u8], location: usize, color: Color) {
        pixels[location..location + 4].copy_from_slice(&[
            color.blue,
            color.green,
            color.red,
            self.alpha,
        ]);
    }

    fn read(&self, pixels: &[u8], location: usize) -> Color {
        Color::new(pixels[location + 2], pixels[location + 1], pixels[location])
    }
}

/// Encoder for depths without a known layout: nothing is written
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl PixelEncoder for Discard {
    fn reduce(&self, _color: Color) -> Color {
        Color::BLACK
    }

    #[inline]
    fn write(&self, _pixels: &mut [u8], _location: usize, _color: Color) {}

    fn read(&self, _pixels: &[u8], _location: usize) -> Color {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bpp() {
        assert_eq!(PixelFormat::from_bpp(8, 0), Some(PixelFormat::Indexed8));
        assert_eq!(PixelFormat::from_bpp(16, 0), Some(PixelFormat::Rgb565));
        assert_eq!(
            PixelFormat::from_bpp(32, 255),
            Some(PixelFormat::Bgra8888 { alpha: 255 })
        );
        assert_eq!(PixelFormat::from_bpp(24, 0), None);
        assert_eq!(PixelFormat::from_bpp(0, 0), None);
    }

    #[test]
    fn test_bits_per_pixel_matches_from_bpp() {
        for bpp in [8, 16, 32] {
            let format = PixelFormat::from_bpp(bpp, 0).unwrap();
            assert_eq!(format.bits_per_pixel(), bpp);
        }
    }

    #[test]
    fn test_select_format_require_32bpp_rejects_16() {
        let err = select_format(16, 0, true).unwrap_err();
        assert!(err.to_string().contains("unsupported bits per pixel: 16"));
    }

    #[test]
    fn test_select_format_require_32bpp_accepts_32() {
        assert_eq!(
            select_format(32, 255, true).unwrap(),
            Some(PixelFormat::Bgra8888 { alpha: 255 })
        );
    }

    #[test]
    fn test_select_format_unknown_depth_is_discarded() {
        assert_eq!(select_format(24, 0, false).unwrap(), None);
        assert!(select_format(24, 0, true).is_err());
        assert_eq!(select_format(8, 0, false).unwrap(), Some(PixelFormat::Indexed8));
    }

    #[test]
    fn test_indexed8_packing() {
        let mut pixels = [0u8; 1];
        let color = Indexed8.reduce(Color::new(5, 7, 3));
        assert_eq!(color, Color::new(2, 1, 1));

        Indexed8.write(&mut pixels, 0, color);
        assert_eq!(pixels[0], (2 << 5) | (1 << 2) | 1);
    }

    #[test]
    fn test_rgb565_is_little_endian() {
        let mut pixels = [0u8; 4];
        Rgb565.write(&mut pixels, 2, Color::new(31, 63, 31));
        assert_eq!(pixels, [0, 0, 0xff, 0xff]);

        Rgb565.write(&mut pixels, 0, Color::new(1, 0, 0));
        // 1 << 11 = 0x0800
        assert_eq!(&pixels[0..2], &[0x00, 0x08]);
    }

    #[test]
    fn test_bgra_byte_order() {
        let mut pixels = [0u8; 8];
        let encoder = Bgra8888 { alpha: 255 };
        encoder.write(&mut pixels, 4, Color::new(10, 20, 30));
        assert_eq!(pixels, [0, 0, 0, 0, 30, 20, 10, 255]);
    }

    #[test]
    fn test_default_alpha() {
        let mut pixels = [0xaau8; 4];
        Bgra8888::default().write(&mut pixels, 0, Color::new(1, 2, 3));
        assert_eq!(pixels[3], DEFAULT_ALPHA);
    }

    #[test]
    fn test_discard_leaves_memory_untouched() {
        let mut pixels = [7u8; 4];
        Discard.write(&mut pixels, 0, Color::new(1, 2, 3));
        assert_eq!(pixels, [7u8; 4]);
    }
}
