//! Renders animated loading-spinner GIFs for installer splash screens.
//!
//! A splash animation consists of a logo near the top of the canvas, a caption, and a rotating
//! arc below it. See [`render::run`] for the whole pipeline, or [`render::Renderer`] to produce the
//! frames without writing a file.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filter installed by [`init_logger!`], using the usual
//!   `env_logger` syntax.
//! * `WINDIR`, `XDG_DATA_DIRS`, `HOME`: used to locate the system font directories the caption
//!   font is searched in.

use log::LevelFilter;

pub mod anim;
pub mod cli;
mod error;
pub mod font;
pub mod image;
pub mod render;
pub mod resolution;
pub mod timer;

pub use error::{Error, Result};

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this library will log at *debug*
/// level. Otherwise, they will log at *info* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
