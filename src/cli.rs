// cli.rs - Command-line interface configuration
use std::ffi::OsString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;

use crate::color::Channels;
use crate::device::DEFAULT_FBDEV;
use crate::pixel::DEFAULT_ALPHA;
use crate::terminal::DEFAULT_TTY;

#[derive(Parser, Debug, Clone)]
#[command(name = "fbtest", version)]
#[command(about = "Framebuffer test.", long_about = None)]
pub struct Cli {
    /// Set fbdev path other than /dev/fb0
    #[arg(short = 'f', long = "fbdev", default_value = DEFAULT_FBDEV)]
    pub fbdev: PathBuf,

    /// Size of a pixel block, in device pixels
    #[arg(short = 's', long = "size", default_value = "10")]
    pub pixel_size: NonZeroU32,

    /// Sleep after every painted row, in nanoseconds (a signal ends it within 10 ms)
    #[arg(short = 't', long = "interval", value_name = "NSECS", default_value_t = 10)]
    pub interval_ns: u64,

    /// Turn on red color
    #[arg(short = 'r', long = "red")]
    pub red: bool,

    /// Turn on green color
    #[arg(short = 'g', long = "green")]
    pub green: bool,

    /// Turn on blue color
    #[arg(short = 'b', long = "blue")]
    pub blue: bool,

    /// Alpha byte written with every 32 bpp pixel
    #[arg(short = 'a', long = "alpha", default_value_t = DEFAULT_ALPHA)]
    pub alpha: u8,

    /// Seed for a repeatable pattern
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Refuse to run on anything but a 32 bpp framebuffer
    #[arg(long = "require-32bpp")]
    pub require_32bpp: bool,
}

impl Cli {
    /// Parse like `try_parse_from`, but unknown flags only produce a warning
    /// on stderr and are dropped.
    pub fn parse_lenient<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        loop {
            let err = match Cli::try_parse_from(args.clone()) {
                Ok(cli) => return Ok(cli),
                Err(err) => err,
            };
            if err.kind() != ErrorKind::UnknownArgument {
                return Err(err);
            }
            let unknown = match err.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(arg)) => arg.clone(),
                _ => return Err(err),
            };
            if !drop_argument(&mut args, &unknown) {
                return Err(err);
            }
            eprintln!("Unknown option {}", unknown);
        }
    }
}

/// Remove `unknown` from `args`, including from a bundle such as `-rx`
fn drop_argument(args: &mut Vec<OsString>, unknown: &str) -> bool {
    let with_value = format!("{}=", unknown);
    let exact = args.iter().skip(1).position(|arg| {
        arg.to_str()
            .map_or(false, |arg| arg == unknown || arg.starts_with(&with_value))
    });
    if let Some(pos) = exact {
        args.remove(pos + 1);
        return true;
    }

    let flag = match unknown.strip_prefix('-') {
        Some(flag) if flag.chars().count() == 1 && !flag.starts_with('-') => flag,
        _ => return false,
    };
    for i in 1..args.len() {
        let bundle = match args[i].to_str() {
            Some(arg) if arg.starts_with('-') && !arg.starts_with("--") => arg,
            _ => continue,
        };
        if bundle[1..].contains(flag) {
            let rest = bundle[1..].replacen(flag, "", 1);
            if rest.is_empty() {
                args.remove(i);
            } else {
                args[i] = format!("-{}", rest).into();
            }
            return true;
        }
    }
    false
}

/// Resolved run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub fbdev: PathBuf,
    pub tty: PathBuf,
    pub pixel_size: NonZeroU32,
    pub interval: Duration,
    pub channels: Channels,
    pub alpha: u8,
    pub seed: Option<u64>,
    pub require_32bpp: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            fbdev: cli.fbdev,
            tty: PathBuf::from(DEFAULT_TTY),
            pixel_size: cli.pixel_size,
            interval: Duration::from_nanos(cli.interval_ns),
            channels: Channels::from_flags(cli.red, cli.green, cli.blue),
            alpha: cli.alpha,
            seed: cli.seed,
            require_32bpp: cli.require_32bpp,
        }
    }
}
