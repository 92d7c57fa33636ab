use std::path::{Path, PathBuf};
use std::thread::sleep;

use chrono::Local;
use log::{error, info};

use crate::capture::{next_capture_path, Camera};
use crate::config::Config;
use crate::display::Display;
use crate::error::{BoothError, Result};
use crate::input::{Buttons, Press};

const STATUS_SIZE: f32 = 36.0;
const WAIT_SIZE: f32 = 24.0;
const COUNTDOWN_SIZE: f32 = 96.0;

pub struct PhotoBooth<B, C, D> {
    buttons: B,
    camera: C,
    display: D,
    config: Config,
    last_picture: Option<PathBuf>,
}

impl<B: Buttons, C: Camera, D: Display> PhotoBooth<B, C, D> {
    pub fn new(buttons: B, camera: C, display: D, config: Config) -> Self {
        Self {
            buttons,
            camera,
            display,
            config,
            last_picture: None,
        }
    }

    /// Path of the most recent successful capture
    pub fn last_picture(&self) -> Option<&Path> {
        self.last_picture.as_deref()
    }

    /// Runs until the exit button is pressed
    pub fn run(&mut self) -> Result<()> {
        info!("Photo booth ready");
        self.display.show_text("Ready!", STATUS_SIZE)?;

        loop {
            match self.buttons.wait_for_press(self.config.poll_interval())? {
                Press::Exit => {
                    info!("Exit button pressed");
                    return Ok(());
                }
                Press::Trigger => self.take_picture()?,
            }
        }
    }

    fn countdown(&mut self) -> Result<()> {
        for i in (1..=self.config.countdown_from).rev() {
            self.display.show_text(&i.to_string(), COUNTDOWN_SIZE)?;
            sleep(self.config.countdown_step());
        }
        Ok(())
    }

    /// Count down, capture and show the result. A failed capture or an
    /// undecodable picture is reported on screen, display errors escape.
    pub fn take_picture(&mut self) -> Result<()> {
        self.countdown()?;
        self.display.show_text("Cheese!", STATUS_SIZE)?;

        let path = next_capture_path(&self.config.output_dir, &Local::now());
        let request = self.display.capture_request();
        if let Err(e) = self.camera.capture(&path, request) {
            error!("{}", e);
            return self.display.show_text("No picture :(", WAIT_SIZE);
        }

        self.display.show_text("Please wait...", WAIT_SIZE)?;
        match self.display.show_image(&path) {
            Ok(()) => {
                self.last_picture = Some(path);
                Ok(())
            }
            Err(e @ BoothError::Image(_)) => {
                error!("Could not show {}: {}", path.display(), e);
                self.display.show_text("Bad picture :(", WAIT_SIZE)
            }
            Err(e) => Err(e),
        }
    }
}
