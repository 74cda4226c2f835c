pub mod app;
pub mod cli;
pub mod color;
pub mod device;
pub mod geometry;
pub mod pixel;
pub mod scan;
pub mod signals;
pub mod terminal;

pub use cli::{Cli, Config};
pub use color::{Channels, Color, ColorPlane};
pub use geometry::ScreenGeometry;
pub use pixel::{select_format, Bgra8888, Discard, Indexed8, PixelEncoder, PixelFormat, Rgb565};
pub use scan::{RenderCursor, ScanDriver};
