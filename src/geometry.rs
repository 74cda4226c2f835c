/// Screen geometry - snapshot of the device's fixed and variable screen info
///
/// Queried once at startup; all pixel addressing derives from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Visible width in pixels
    pub width: u32,
    /// Visible height in pixels
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Viewport offset into the virtual screen
    pub x_offset: u32,
    pub y_offset: u32,
    /// Stride of one scanline in bytes
    pub line_length: u32,
}

impl ScreenGeometry {
    /// Geometry of a packed buffer with no viewport offset and no row padding
    pub fn packed(width: u32, height: u32, bits_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
            x_offset: 0,
            y_offset: 0,
            line_length: width * (bits_per_pixel / 8),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// Byte offset of visible pixel (x, y) in device memory
    pub fn location(&self, x: u32, y: u32) -> usize {
        (x + self.x_offset) as usize * self.bytes_per_pixel()
            + (y + self.y_offset) as usize * self.line_length as usize
    }

    /// Size of the visible pixel region, width * height * bytes per pixel
    pub fn screen_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel()
    }

    /// Bytes that must be mapped so every visible pixel is addressable
    pub fn required_len(&self) -> usize {
        if self.width == 0 || self.height == 0 {
            return self.screen_size();
        }
        let last = self.location(self.width - 1, self.height - 1) + self.bytes_per_pixel();
        last.max(self.screen_size())
    }
}
