use std::fs::File;
use std::os::unix::io::AsRawFd;

use log::{debug, error};

use crate::error::{BoothError, Result};

const VT_GETSTATE: libc::c_ulong = 0x5603;
const KDSETMODE: libc::c_ulong = 0x4B3A;

const KD_TEXT: libc::c_ulong = 0x00;
const KD_GRAPHICS: libc::c_ulong = 0x01;

/// struct vt_stat
#[repr(C)]
#[allow(dead_code)]
struct VtState {
    v_active: u16,
    v_signal: u16,
    v_state: u16,
}

pub struct VirtualTerminal {
    tty: File,
}

impl VirtualTerminal {
    /// Fails with ENOTTY when not running on a virtual terminal, e.g. over ssh
    pub fn open() -> Result<Self> {
        Ok(Self {
            tty: File::open("/dev/tty")?,
        })
    }

    pub fn active(&self) -> Result<u32> {
        let mut state = VtState {
            v_active: 0,
            v_signal: 0,
            v_state: 0,
        };
        if unsafe { libc::ioctl(self.tty.as_raw_fd(), VT_GETSTATE as _, &mut state as *mut VtState) } < 0 {
            return Err(BoothError::ioctl("VT_GETSTATE", "/dev/tty"));
        }
        Ok(state.v_active as u32)
    }

    fn set_mode(&self, mode: libc::c_ulong) -> Result<()> {
        if unsafe { libc::ioctl(self.tty.as_raw_fd(), KDSETMODE as _, mode) } < 0 {
            return Err(BoothError::ioctl("KDSETMODE", "/dev/tty"));
        }
        Ok(())
    }

    /// Stops the console from drawing over the framebuffer until dropped
    pub fn graphics_mode(self) -> Result<GraphicsMode> {
        self.set_mode(KD_GRAPHICS)?;
        debug!("Console switched to graphics mode");
        Ok(GraphicsMode { vt: self })
    }
}

pub struct GraphicsMode {
    vt: VirtualTerminal,
}

impl GraphicsMode {
    pub fn active(&self) -> Result<u32> {
        self.vt.active()
    }
}

impl Drop for GraphicsMode {
    fn drop(&mut self) {
        match self.vt.set_mode(KD_TEXT) {
            Ok(()) => debug!("Console back in text mode"),
            Err(e) => error!("Could not restore text mode: {}", e),
        }
    }
}
