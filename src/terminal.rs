use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::Path;

use anyhow::{Context, Result};
use nix::libc::c_int;

pub const DEFAULT_TTY: &str = "/dev/tty";

const KDSETMODE: u32 = 0x4B3A;

nix::ioctl_write_int_bad!(kd_set_mode, KDSETMODE);

/// Console display mode as set through KDSETMODE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DisplayMode {
    Text = 0,
    Graphics = 1,
}

impl DisplayMode {
    fn raw(self) -> c_int {
        self as c_int
    }
}

fn set_mode(tty: &File, mode: DisplayMode) -> nix::Result<()> {
    // SAFETY: KDSETMODE takes its argument by value
    unsafe { kd_set_mode(tty.as_raw_fd(), mode.raw()) }.map(|_| ())
}

/// Holds the console in graphics mode; text mode comes back on drop
pub struct GraphicsMode {
    tty: File,
}

impl GraphicsMode {
    pub fn enter(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("cannot open tty device {}", path.display()))?;

        set_mode(&tty, DisplayMode::Graphics).context("cannot set tty to graphics mode")?;
        log::debug!("{} switched to graphics mode", path.display());

        Ok(Self { tty })
    }
}

impl Drop for GraphicsMode {
    fn drop(&mut self) {
        match set_mode(&self.tty, DisplayMode::Text) {
            Ok(()) => log::debug!("tty restored to text mode"),
            Err(err) => log::warn!("cannot restore tty to text mode: {}", err),
        }
    }
}
