use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::color::{Color, ColorPlane};
use crate::geometry::ScreenGeometry;
use crate::pixel::PixelEncoder;

/// Longest single sleep while pacing; `stop` is polled between slices
pub const PACE_SLICE: Duration = Duration::from_millis(10);

/// Top-left corner of the next block to paint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderCursor {
    pub x: u32,
    pub y: u32,
}

impl RenderCursor {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Back to the origin once the cursor has left the bottom edge
    pub fn wrap(&mut self, height: u32) -> bool {
        if self.y >= height {
            *self = RenderCursor::default();
            true
        } else {
            false
        }
    }

    /// Step one block right, moving down a block-row past the right edge
    pub fn advance(&mut self, pixel_size: u32, width: u32) {
        self.x += pixel_size;
        if self.x >= width {
            self.x = 0;
            self.y += pixel_size;
        }
    }
}

/// Paints `pixel_size` square blocks in raster order, wrapping at the bottom
pub struct ScanDriver<E: PixelEncoder> {
    geometry: ScreenGeometry,
    encoder: E,
    plane: ColorPlane,
    pixel_size: u32,
    interval: Duration,
    cursor: RenderCursor,
    color: Color,
}

impl<E: PixelEncoder> ScanDriver<E> {
    pub fn new(
        geometry: ScreenGeometry,
        encoder: E,
        plane: ColorPlane,
        pixel_size: NonZeroU32,
        interval: Duration,
    ) -> Self {
        Self {
            geometry,
            encoder,
            plane,
            pixel_size: pixel_size.get(),
            interval,
            cursor: RenderCursor::default(),
            color: Color::BLACK,
        }
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    /// Color currently being painted, already reduced for the encoder
    pub fn color(&self) -> Color {
        self.color
    }

    /// Paint the block under the cursor, then advance it.
    ///
    /// `stop` is checked after every row and while pacing; returns false if
    /// painting was cut short, leaving the cursor on the unfinished block.
    pub fn paint_block(&mut self, pixels: &mut [u8], stop: &AtomicBool) -> bool {
        let ScreenGeometry { width, height, .. } = self.geometry;
        self.cursor.wrap(height);

        let RenderCursor { x: xstart, y: ystart } = self.cursor;
        let yend = ystart.saturating_add(self.pixel_size).min(height);
        let xend = xstart.saturating_add(self.pixel_size).min(width);

        for y in ystart..yend {
            if y % self.pixel_size == 0 {
                self.color = self.encoder.reduce(self.plane.roll());
            }

            for x in xstart..xend {
                let location = self.geometry.location(x, y);
                self.encoder.write(pixels, location, self.color);
            }

            if !pace(self.interval, stop) {
                return false;
            }
        }

        self.cursor.advance(self.pixel_size, width);
        true
    }

    /// Paint blocks until `stop` is raised; returns the number of whole blocks painted
    pub fn run(&mut self, pixels: &mut [u8], stop: &AtomicBool) -> u64 {
        let mut blocks = 0;
        while !stop.load(Ordering::Relaxed) {
            if !self.paint_block(pixels, stop) {
                break;
            }
            blocks += 1;
        }
        blocks
    }

    /// Blocks in one full traversal of the screen
    pub fn blocks_per_screen(&self) -> u64 {
        let across = self.geometry.width.div_ceil(self.pixel_size) as u64;
        let down = self.geometry.height.div_ceil(self.pixel_size) as u64;
        across * down
    }
}

/// Sleep for `interval` in slices of at most `PACE_SLICE`; false once `stop` is raised
fn pace(interval: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return true;
        }
        thread::sleep(left.min(PACE_SLICE));
    }
}
