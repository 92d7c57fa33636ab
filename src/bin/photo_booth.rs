use std::process::exit;

use colored::Colorize;
use log::{error, LevelFilter};

use ev3_photo_booth::booth::PhotoBooth;
use ev3_photo_booth::capture::Fswebcam;
use ev3_photo_booth::config::Config;
use ev3_photo_booth::display::framebuffer::Framebuffer;
use ev3_photo_booth::display::terminal::VirtualTerminal;
use ev3_photo_booth::display::text::TextRenderer;
use ev3_photo_booth::display::Screen;
use ev3_photo_booth::input::evdev::EvdevKeys;
use ev3_photo_booth::input::ButtonPoller;
use ev3_photo_booth::Result;

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        if e.is_not_a_tty() {
            eprintln!("{}", "Must run this program on a virtual terminal.".red());
            eprintln!("Hint: use `chvt` and `conspy` to remotely control virtual terminals.");
        } else {
            error!("{}", e);
        }
        exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load()?;

    // Load everything that can fail before taking over the console
    let text = TextRenderer::load(&config.font_path)?;
    let buttons = ButtonPoller::new(EvdevKeys::open(&config.input_dir)?);
    let camera = Fswebcam::new(&config);

    let graphics = VirtualTerminal::open()?.graphics_mode()?;
    let fb = Framebuffer::for_console(graphics.active()?)?;
    let mut screen = Screen::new(fb, text);
    let res = PhotoBooth::new(buttons, camera, &mut screen, config).run();

    // Don't leave the last picture behind on the console
    if let Err(e) = screen.clear() {
        error!("Could not clear the screen: {}", e);
    }
    drop(graphics);
    res
}
