use std::env;
use std::process::exit;
use std::thread;
use std::time::Duration;

use log::{error, LevelFilter};

use ev3_photo_booth::config::Config;
use ev3_photo_booth::display::framebuffer::Framebuffer;
use ev3_photo_booth::display::text::TextRenderer;
use ev3_photo_booth::display::{Display, Screen};
use ev3_photo_booth::Result;

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    let device = env::args().nth(1).unwrap_or_else(|| "/dev/fb0".to_string());
    if let Err(e) = run(&device) {
        error!("{}", e);
        exit(1);
    }
}

fn run(device: &str) -> Result<()> {
    let config = Config::load()?;
    let fb = Framebuffer::open(device)?;

    println!("Device:\t{} ({})", fb.path(), fb.id());
    let format = fb.format();
    println!("Format:\t{:?}", format);
    let (w, h) = fb.size_mm();
    println!("Size:\t{}mm x {}mm", w, h);

    let mut screen = Screen::new(fb, TextRenderer::load(&config.font_path)?);
    screen.show_text("Hello!", 36.0)?;
    thread::sleep(Duration::from_secs(3));
    screen.clear()
}
