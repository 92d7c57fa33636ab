use std::fs::{self, File};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use log::{info, trace, warn};

use super::{KeySet, KeySource, KEY_BYTES};
use crate::error::{BoothError, Result};

const EV_KEY: usize = 0x01;
const EV_BYTES: usize = 4;

const IOC_READ: libc::c_ulong = 2;

/// `_IOC(_IOC_READ, 'E', nr, len)`
const fn evdev_read(nr: libc::c_ulong, len: usize) -> libc::c_ulong {
    (IOC_READ << 30) | ((len as libc::c_ulong) << 16) | ((b'E' as libc::c_ulong) << 8) | nr
}

const EVIOCGKEY: libc::c_ulong = evdev_read(0x18, KEY_BYTES);
/// EVIOCGBIT(0, len): which event types the device emits
const EVIOCGBIT_TYPES: libc::c_ulong = evdev_read(0x20, EV_BYTES);

struct KeyDevice {
    path: String,
    file: File,
}

impl KeyDevice {
    fn open(path: &Path) -> Result<Option<Self>> {
        let file = File::open(path)?;
        let path = path.display().to_string();

        let mut types = [0u8; EV_BYTES];
        let res = unsafe { libc::ioctl(file.as_raw_fd(), EVIOCGBIT_TYPES as _, types.as_mut_ptr()) };
        if res < 0 {
            return Err(BoothError::ioctl("EVIOCGBIT", &path));
        }

        if types[EV_KEY / 8] & (1 << (EV_KEY % 8)) == 0 {
            trace!("{} has no keys, skipping", path);
            return Ok(None);
        }
        Ok(Some(KeyDevice { path, file }))
    }

    fn pressed(&self) -> Result<KeySet> {
        let mut bits = [0u8; KEY_BYTES];
        let res = unsafe { libc::ioctl(self.file.as_raw_fd(), EVIOCGKEY as _, bits.as_mut_ptr()) };
        if res < 0 {
            return Err(BoothError::ioctl("EVIOCGKEY", &self.path));
        }
        Ok(KeySet::from_bytes(bits))
    }
}

/// All key-capable evdev nodes, read as one keyboard
pub struct EvdevKeys {
    devices: Vec<KeyDevice>,
}

impl EvdevKeys {
    pub fn open(input_dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.starts_with("event"))
            })
            .collect();
        paths.sort();

        let mut devices = Vec::new();
        for path in paths {
            match KeyDevice::open(&path) {
                Ok(Some(dev)) => {
                    info!("Using key device {}", dev.path);
                    devices.push(dev);
                }
                Ok(None) => (),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        if devices.is_empty() {
            return Err(BoothError::NoInputDevices(input_dir.to_path_buf()));
        }
        Ok(Self { devices })
    }
}

impl KeySource for EvdevKeys {
    fn pressed(&mut self) -> Result<KeySet> {
        let mut all = KeySet::empty();
        for dev in &self.devices {
            all.merge(&dev.pressed()?);
        }
        Ok(all)
    }
}
