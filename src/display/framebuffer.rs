use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;

use log::{debug, trace};

use super::encode::{Channel, PixelFormat};
use crate::error::{BoothError, Result};

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;
const FBIOGET_CON2FBMAP: libc::c_ulong = 0x460F;

/// struct fb_fix_screeninfo
#[repr(C)]
#[allow(dead_code)]
struct FixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// struct fb_bitfield
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct Bitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

impl From<Bitfield> for Channel {
    fn from(b: Bitfield) -> Self {
        Channel {
            offset: b.offset,
            length: b.length,
        }
    }
}

/// struct fb_var_screeninfo
#[repr(C)]
#[allow(dead_code)]
struct VarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: Bitfield,
    green: Bitfield,
    blue: Bitfield,
    transp: Bitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// struct fb_con2fbmap
#[repr(C)]
struct Con2FbMap {
    console: u32,
    framebuffer: u32,
}

pub struct Framebuffer {
    path: String,
    file: File,
    fix: FixScreenInfo,
    var: VarScreenInfo,
}

impl Framebuffer {
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let fd = file.as_raw_fd();

        let mut fix: FixScreenInfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(fd, FBIOGET_FSCREENINFO as _, &mut fix as *mut FixScreenInfo) } < 0 {
            return Err(BoothError::ioctl("FBIOGET_FSCREENINFO", path));
        }

        let mut var: VarScreenInfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(fd, FBIOGET_VSCREENINFO as _, &mut var as *mut VarScreenInfo) } < 0 {
            return Err(BoothError::ioctl("FBIOGET_VSCREENINFO", path));
        }

        let fb = Self {
            path: path.to_string(),
            file,
            fix,
            var,
        };
        debug!(
            "Opened {} ({}): {}x{} {}bpp",
            fb.path,
            fb.id(),
            fb.var.xres,
            fb.var.yres,
            fb.var.bits_per_pixel
        );
        Ok(fb)
    }

    /// Opens the framebuffer that backs the given console
    pub fn for_console(console: u32) -> Result<Self> {
        let fb0 = OpenOptions::new().read(true).write(true).open("/dev/fb0")?;
        let mut map = Con2FbMap {
            console,
            framebuffer: 0,
        };
        if unsafe { libc::ioctl(fb0.as_raw_fd(), FBIOGET_CON2FBMAP as _, &mut map as *mut Con2FbMap) } < 0 {
            return Err(BoothError::ioctl("FBIOGET_CON2FBMAP", "/dev/fb0"));
        }
        trace!("Console {} is on fb{}", console, map.framebuffer);
        Self::open(&format!("/dev/fb{}", map.framebuffer))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Driver identification, e.g. "st7586"
    pub fn id(&self) -> String {
        let len = self.fix.id.iter().position(|&c| c == 0).unwrap_or(16);
        String::from_utf8_lossy(&self.fix.id[..len]).to_string()
    }

    /// Physical size of the screen in millimeters, zero when unknown
    pub fn size_mm(&self) -> (u32, u32) {
        (self.var.width, self.var.height)
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat {
            width: self.var.xres,
            height: self.var.yres,
            bits_per_pixel: self.var.bits_per_pixel,
            line_length: self.fix.line_length,
            grayscale: self.var.grayscale == 1,
            red: self.var.red.into(),
            green: self.var.green.into(),
            blue: self.var.blue.into(),
        }
    }

    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let data = &data[..data.len().min(self.fix.smem_len as usize)];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(data)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        let zeros = vec![0u8; self.fix.smem_len as usize];
        self.write_raw(&zeros)
    }
}
