use std::env::var_os;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_ENV: &str = "PHOTO_BOOTH_CONFIG";

const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub capture_program: String,
    /// Passed as `--device`, fswebcam picks /dev/video0 when unset
    pub camera_device: Option<String>,
    pub output_dir: PathBuf,
    pub font_path: PathBuf,
    pub countdown_from: u32,
    pub countdown_step_ms: u64,
    pub poll_interval_ms: u64,
    pub input_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_program: "fswebcam".to_string(),
            camera_device: None,
            output_dir: PathBuf::from("."),
            font_path: PathBuf::from(DEFAULT_FONT),
            countdown_from: 3,
            countdown_step_ms: 1250,
            poll_interval_ms: 50,
            input_dir: PathBuf::from("/dev/input"),
        }
    }
}

impl Config {
    /// Reads the file named by `PHOTO_BOOTH_CONFIG`, or falls back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(var_os(CONFIG_ENV))
    }

    /// Paths are taken as-is, they don't need to be valid UTF-8
    fn load_from(path: Option<OsString>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let path = Path::new(&path);
                info!("Loading config from {}", path.display());
                Self::from_json(&fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        if let Ok(json) = serde_json::to_string(&config) {
            debug!("Effective config: {}", json);
        }
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
