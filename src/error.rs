use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoothError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An ioctl on a device node failed
    #[error("{request} on {device} failed: {source}")]
    Ioctl {
        request: &'static str,
        device: String,
        source: io::Error,
    },
    #[error("No key input devices found in {0}")]
    NoInputDevices(PathBuf),
    #[error("Unsupported framebuffer format: {0} bits per pixel")]
    UnsupportedFormat(u32),
    #[error("Could not load font {0}")]
    Font(PathBuf),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Capture failed: {0}")]
    Capture(String),
    #[error("Bad config: {0}")]
    Config(#[from] serde_json::Error),
}

impl BoothError {
    /// Wraps the last OS error for a failed ioctl
    pub fn ioctl(request: &'static str, device: &str) -> Self {
        BoothError::Ioctl {
            request,
            device: device.to_string(),
            source: io::Error::last_os_error(),
        }
    }

    /// True when the error came from a device that isn't a terminal
    pub fn is_not_a_tty(&self) -> bool {
        let source = match self {
            BoothError::Io(e) => e,
            BoothError::Ioctl { source, .. } => source,
            _ => return false,
        };
        source.raw_os_error() == Some(libc::ENOTTY)
    }
}

pub type Result<T> = std::result::Result<T, BoothError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_tty() {
        let err = BoothError::Io(io::Error::from_raw_os_error(libc::ENOTTY));
        assert!(err.is_not_a_tty());

        let err = BoothError::Ioctl {
            request: "KDSETMODE",
            device: "/dev/tty".to_string(),
            source: io::Error::from_raw_os_error(libc::EPERM),
        };
        assert!(!err.is_not_a_tty());
        assert_eq!(
            err.to_string(),
            format!("KDSETMODE on /dev/tty failed: {}", io::Error::from_raw_os_error(libc::EPERM))
        );

        assert!(!BoothError::Capture("nope".into()).is_not_a_tty());
    }
}
