//! Linux framebuffer device: screen info queries and the pixel memory mapping

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use memmap2::{MmapMut, MmapOptions};
use nix::libc::{c_char, c_ulong};

use crate::geometry::ScreenGeometry;

pub const DEFAULT_FBDEV: &str = "/dev/fb0";

const FBIOGET_VSCREENINFO: u32 = 0x4600;
const FBIOGET_FSCREENINFO: u32 = 0x4602;

/// `struct fb_bitfield` from linux/fb.h
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbBitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

/// `struct fb_fix_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbFixScreeninfo {
    pub id: [c_char; 16],
    pub smem_start: c_ulong,
    pub smem_len: u32,
    pub type_: u32,
    pub type_aux: u32,
    pub visual: u32,
    pub xpanstep: u16,
    pub ypanstep: u16,
    pub ywrapstep: u16,
    pub line_length: u32,
    pub mmio_start: c_ulong,
    pub mmio_len: u32,
    pub accel: u32,
    pub capabilities: u16,
    pub reserved: [u16; 2],
}

impl FbFixScreeninfo {
    /// Driver identification string
    pub fn id(&self) -> String {
        let bytes: Vec<u8> = self
            .id
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// `struct fb_var_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FbVarScreeninfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub grayscale: u32,
    pub red: FbBitfield,
    pub green: FbBitfield,
    pub blue: FbBitfield,
    pub transp: FbBitfield,
    pub nonstd: u32,
    pub activate: u32,
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    pub rotate: u32,
    pub colorspace: u32,
    pub reserved: [u32; 4],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreeninfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, FBIOGET_FSCREENINFO, FbFixScreeninfo);

impl ScreenGeometry {
    pub fn from_screeninfo(var: &FbVarScreeninfo, fix: &FbFixScreeninfo) -> Self {
        Self {
            width: var.xres,
            height: var.yres,
            bits_per_pixel: var.bits_per_pixel,
            x_offset: var.xoffset,
            y_offset: var.yoffset,
            line_length: fix.line_length,
        }
    }
}

/// Mapping length for a geometry, checked against the device's memory size
pub fn mapping_len(geometry: &ScreenGeometry, smem_len: u32) -> Result<usize> {
    let len = geometry.required_len();
    if len == 0 {
        bail!(
            "framebuffer reports an empty screen ({}x{}, {} bpp)",
            geometry.width,
            geometry.height,
            geometry.bits_per_pixel
        );
    }
    if smem_len != 0 && len > smem_len as usize {
        bail!(
            "visible screen needs {} bytes but the device only has {}",
            len,
            smem_len
        );
    }
    Ok(len)
}

/// An open framebuffer device with its pixel memory mapped read/write.
///
/// Dropping it unmaps the memory and closes the device.
pub struct Framebuffer {
    path: PathBuf,
    geometry: ScreenGeometry,
    map: MmapMut,
    _file: File,
}

impl Framebuffer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("cannot open framebuffer device {}", path.display()))?;

        let fix = read_fixed_info(&file)?;
        let var = read_variable_info(&file)?;
        log::debug!(
            "{}: id {:?}, smem_len {}, virtual {}x{}",
            path.display(),
            fix.id(),
            fix.smem_len,
            var.xres_virtual,
            var.yres_virtual
        );

        let geometry = ScreenGeometry::from_screeninfo(&var, &fix);
        log::info!(
            "{} {} {}",
            geometry.width,
            geometry.height,
            geometry.bits_per_pixel
        );

        let len = mapping_len(&geometry, fix.smem_len)?;
        // SAFETY: the mapping is only accessed through `&mut self`; the kernel
        // owns the backing memory for as long as the file stays open.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file) }
            .context("failed to map framebuffer device to memory")?;
        log::debug!("mapped {} bytes of {}", len, path.display());

        Ok(Self {
            path: path.to_path_buf(),
            geometry,
            map,
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// Mapped pixel memory; every location of `geometry()` is in range
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.map[..]
    }
}

fn read_fixed_info(file: &File) -> Result<FbFixScreeninfo> {
    let mut fix = FbFixScreeninfo::default();
    // SAFETY: `fix` is a properly sized fb_fix_screeninfo
    unsafe { fbioget_fscreeninfo(file.as_raw_fd(), &mut fix) }
        .context("error reading fixed information")?;
    Ok(fix)
}

fn read_variable_info(file: &File) -> Result<FbVarScreeninfo> {
    let mut var = FbVarScreeninfo::default();
    // SAFETY: `var` is a properly sized fb_var_screeninfo
    unsafe { fbioget_vscreeninfo(file.as_raw_fd(), &mut var) }
        .context("error reading variable information")?;
    Ok(var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes_match_kernel_abi() {
        assert_eq!(std::mem::size_of::<FbVarScreeninfo>(), 160);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 80);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 68);
    }

    #[test]
    fn test_geometry_from_screeninfo() {
        let var = FbVarScreeninfo {
            xres: 1024,
            yres: 768,
            xoffset: 0,
            yoffset: 768,
            bits_per_pixel: 16,
            ..Default::default()
        };
        let fix = FbFixScreeninfo {
            line_length: 2048,
            ..Default::default()
        };

        let geometry = ScreenGeometry::from_screeninfo(&var, &fix);
        assert_eq!(geometry.width, 1024);
        assert_eq!(geometry.height, 768);
        assert_eq!(geometry.bits_per_pixel, 16);
        assert_eq!(geometry.y_offset, 768);
        assert_eq!(geometry.line_length, 2048);
    }

    #[test]
    fn test_fixed_info_id() {
        let mut fix = FbFixScreeninfo::default();
        for (dst, src) in fix.id.iter_mut().zip(b"simplefb") {
            *dst = *src as c_char;
        }
        assert_eq!(fix.id(), "simplefb");
    }

    #[test]
    fn test_mapping_len_rejects_undersized_device() {
        let geometry = ScreenGeometry::packed(640, 480, 32);
        assert_eq!(mapping_len(&geometry, 0).unwrap(), 640 * 480 * 4);
        assert_eq!(mapping_len(&geometry, 640 * 480 * 4).unwrap(), 640 * 480 * 4);
        assert!(mapping_len(&geometry, 1024).is_err());
    }

    #[test]
    fn test_mapping_len_rejects_empty_screen() {
        let geometry = ScreenGeometry::packed(0, 480, 32);
        assert!(mapping_len(&geometry, 0).is_err());
    }

    #[test]
    fn test_open_missing_device_fails() {
        let err = Framebuffer::open("/nonexistent/fb9").err().unwrap();
        assert!(format!("{:#}", err).contains("cannot open framebuffer device"));
    }
}
