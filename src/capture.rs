use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, TimeZone};
use log::{info, trace};

use crate::config::Config;
use crate::error::{BoothError, Result};

/// What the screen needs from the picture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
    pub greyscale: bool,
}

pub trait Camera {
    /// Takes one picture and stores it at `dest`
    fn capture(&mut self, dest: &Path, request: CaptureRequest) -> Result<()>;
}

/// `raw-YYYYMMDD-HHMMSS.png` inside `dir`
pub fn next_capture_path<Tz: TimeZone>(dir: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!("raw-{}.png", now.format("%Y%m%d-%H%M%S")))
}

/// Shells out to fswebcam
pub struct Fswebcam {
    program: String,
    device: Option<String>,
}

impl Fswebcam {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.capture_program.clone(),
            device: config.camera_device.clone(),
        }
    }

    fn args(&self, dest: &Path, request: CaptureRequest) -> Vec<String> {
        let mut args = vec!["--quiet".to_string(), "--no-banner".to_string()];
        if let Some(device) = &self.device {
            args.push("--device".to_string());
            args.push(device.clone());
        }
        args.push("--scale".to_string());
        args.push(format!("{}x{}", request.width, request.height));
        if request.greyscale {
            args.push("--greyscale".to_string());
        }
        args.push("--png".to_string());
        args.push("--save".to_string());
        args.push(dest.display().to_string());
        args
    }
}

impl Camera for Fswebcam {
    fn capture(&mut self, dest: &Path, request: CaptureRequest) -> Result<()> {
        let args = self.args(dest, request);
        trace!("Image capture command = `{} {:?}`", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| BoothError::Capture(format!("could not run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(BoothError::Capture(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        // fswebcam exits 0 even when no frame could be grabbed
        if !dest.exists() {
            return Err(BoothError::Capture(format!(
                "{} did not write {}",
                self.program,
                dest.display()
            )));
        }

        info!("Captured {}", dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const REQUEST: CaptureRequest = CaptureRequest {
        width: 178,
        height: 128,
        greyscale: true,
    };

    fn camera(program: &str, device: Option<&str>) -> Fswebcam {
        Fswebcam::new(&Config {
            capture_program: program.to_string(),
            camera_device: device.map(String::from),
            ..Config::default()
        })
    }

    #[test]
    fn test_capture_path() {
        let now = Utc.with_ymd_and_hms(2016, 7, 4, 9, 5, 30).unwrap();
        assert_eq!(
            next_capture_path(Path::new("/home/robot"), &now),
            PathBuf::from("/home/robot/raw-20160704-090530.png")
        );
    }

    #[test]
    fn test_args() {
        let args = camera("fswebcam", None).args(Path::new("out.png"), REQUEST);
        assert_eq!(
            args,
            vec![
                "--quiet", "--no-banner", "--scale", "178x128", "--greyscale", "--png", "--save",
                "out.png"
            ]
        );

        let color = CaptureRequest {
            greyscale: false,
            ..REQUEST
        };
        let args = camera("fswebcam", Some("/dev/video1")).args(Path::new("out.png"), color);
        assert_eq!(
            args,
            vec![
                "--quiet",
                "--no-banner",
                "--device",
                "/dev/video1",
                "--scale",
                "178x128",
                "--png",
                "--save",
                "out.png"
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let res = camera("no-such-capture-program", None).capture(&dir.path().join("x.png"), REQUEST);
        assert!(matches!(res, Err(BoothError::Capture(_))));
    }

    #[test]
    fn test_failing_program() {
        let dir = tempfile::tempdir().unwrap();
        let res = camera("false", None).capture(&dir.path().join("x.png"), REQUEST);
        assert!(matches!(res, Err(BoothError::Capture(_))));
    }

    #[test]
    fn test_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = camera("true", None).capture(&dir.path().join("x.png"), REQUEST);
        match res {
            Err(BoothError::Capture(msg)) => assert!(msg.contains("did not write")),
            _ => panic!("expected a capture error"),
        }
    }
}
