use std::sync::atomic::AtomicBool;

use anyhow::Result;

use crate::cli::Config;
use crate::color::ColorPlane;
use crate::device::Framebuffer;
use crate::pixel::{self, Bgra8888, Discard, Indexed8, PixelEncoder, PixelFormat, Rgb565};
use crate::scan::ScanDriver;
use crate::signals;
use crate::terminal::GraphicsMode;

/// Paint random blocks on the framebuffer until a termination signal arrives.
///
/// Text mode is restored and the device unmapped on every return path.
pub fn run(config: &Config) -> Result<()> {
    signals::install()?;

    let mut framebuffer = Framebuffer::open(&config.fbdev)?;
    let geometry = framebuffer.geometry();
    let format =
        pixel::select_format(geometry.bits_per_pixel, config.alpha, config.require_32bpp)?;
    match format {
        Some(format) => log::info!("{}: {}", framebuffer.path().display(), format),
        None => log::warn!(
            "{} bpp is not supported, nothing will be drawn",
            geometry.bits_per_pixel
        ),
    }

    let _graphics = GraphicsMode::enter(&config.tty)?;

    let stop = signals::stop_flag();
    let blocks = match format {
        Some(PixelFormat::Indexed8) => drive(Indexed8, &mut framebuffer, config, stop),
        Some(PixelFormat::Rgb565) => drive(Rgb565, &mut framebuffer, config, stop),
        Some(PixelFormat::Bgra8888 { alpha }) => {
            drive(Bgra8888 { alpha }, &mut framebuffer, config, stop)
        }
        None => drive(Discard, &mut framebuffer, config, stop),
    };

    log::info!("interrupted after {} blocks, restoring text mode", blocks);
    Ok(())
}

fn drive<E: PixelEncoder>(
    encoder: E,
    framebuffer: &mut Framebuffer,
    config: &Config,
    stop: &AtomicBool,
) -> u64 {
    let plane = ColorPlane::new(config.channels, config.seed);
    log::debug!("channels {:?}, seed {:?}", plane.channels(), config.seed);
    let mut driver = ScanDriver::new(
        framebuffer.geometry(),
        encoder,
        plane,
        config.pixel_size,
        config.interval,
    );
    log::debug!(
        "{} blocks per screen, {:?} per row",
        driver.blocks_per_screen(),
        config.interval
    );

    driver.run(framebuffer.pixels_mut(), stop)
}
