#![warn(clippy::unwrap_used)]

pub mod booth;
pub mod capture;
pub mod config;
pub mod display;
pub mod error;
pub mod input;

pub use error::{BoothError, Result};
