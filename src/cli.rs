//! Command-line interface.

use std::{ffi::OsString, path::PathBuf, time::Duration};

use clap::{CommandFactory, Parser};

use crate::{
    anim::DEFAULT_GIF_SPEED,
    font::DEFAULT_FONTS,
    image::Color,
    render::{RenderConfig, DEFAULT_CAPTION, DEFAULT_FONT_SIZE, DEFAULT_FRAME_COUNT},
    resolution::Resolution,
};

/// Single-dash flags with multi-letter names, and the long flags they stand for.
///
/// `clap` only supports single-character short flags, so these are rewritten before parsing.
const MULTI_LETTER_SHORT_FLAGS: &[(&str, &str)] = &[
    ("-bg", "--bg-color"),
    ("-tc", "--text-color"),
    ("-sc", "--spinner-color"),
];

/// Generate a splash screen GIF.
#[derive(Parser, Debug, Clone)]
#[command(name = "splash-spinner", version, long_about = None)]
pub struct Args {
    /// Path to input logo PNG
    #[arg(short, long, default_value = "logo.png")]
    pub input: PathBuf,

    /// Path to output GIF
    #[arg(short, long, default_value = "splash_installer.gif")]
    pub output: PathBuf,

    /// Background color hex (e.g. #000000) [alias: -bg]
    #[arg(long, value_name = "HEX", default_value = "#000000")]
    pub bg_color: Color,

    /// Text color hex (e.g. #ffffff) [alias: -tc]
    #[arg(long, value_name = "HEX", default_value = "#ffffff")]
    pub text_color: Color,

    /// Spinner color hex (e.g. #ffffff) [alias: -sc]
    #[arg(long, value_name = "HEX", default_value = "#ffffff")]
    pub spinner_color: Color,

    /// Caption font file, tried before the default fonts
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Caption font size in pixels
    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    pub font_size: f32,

    /// Caption text
    #[arg(long, default_value = DEFAULT_CAPTION, allow_hyphen_values = true)]
    pub caption: String,

    /// Number of frames in one revolution of the spinner
    #[arg(
        long,
        default_value_t = DEFAULT_FRAME_COUNT,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub frames: u32,

    /// Display time of each frame, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 35)]
    pub delay: u64,

    /// Canvas size
    #[arg(long, value_name = "WxH", default_value = "500x650")]
    pub canvas: Resolution,

    /// Size the logo is resized to
    #[arg(long, value_name = "WxH", default_value = "400x400")]
    pub logo_size: Resolution,

    /// GIF quantizer speed, 1 (best quality) to 30 (fastest)
    #[arg(
        long,
        default_value_t = DEFAULT_GIF_SPEED,
        value_parser = clap::value_parser!(i32).range(1..=30),
    )]
    pub speed: i32,
}

impl Args {
    /// Parses the process arguments, accepting the multi-letter single-dash flags.
    ///
    /// Exits the process with a usage message if the arguments are invalid.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Converts the parsed arguments into a [`RenderConfig`].
    pub fn into_config(self) -> RenderConfig {
        let fonts = self
            .font
            .into_iter()
            .chain(DEFAULT_FONTS.iter().map(PathBuf::from))
            .collect();

        RenderConfig {
            input: self.input,
            output: self.output,
            canvas: self.canvas,
            logo_size: self.logo_size,
            background: self.bg_color,
            text_color: self.text_color,
            spinner_color: self.spinner_color,
            caption: self.caption,
            frame_count: self.frames,
            frame_delay: Duration::from_millis(self.delay),
            font_size: self.font_size,
            fonts,
            gif_speed: self.speed,
        }
    }
}

/// Rewrites `-bg`, `-tc` and `-sc` (also in `-bg=VALUE` form) to their long flags.
///
/// Values of options (`--caption -tc`) and arguments after a `--` terminator are passed through
/// unchanged.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Args::command();
    let mut normalized = Vec::new();
    let mut args = args.into_iter().map(Into::into);
    while let Some(arg) = args.next() {
        let Some(s) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };
        if s == "--" {
            normalized.push(arg);
            normalized.extend(args.by_ref());
            break;
        }

        let arg = rewrite_flag(s).unwrap_or(arg);
        let value = arg.to_str().map_or(false, |flag| takes_value(&command, flag));
        normalized.push(arg);
        if value {
            normalized.extend(args.next());
        }
    }
    normalized
}

fn rewrite_flag(arg: &str) -> Option<OsString> {
    MULTI_LETTER_SHORT_FLAGS.iter().find_map(|(short, long)| {
        if arg == *short {
            return Some(OsString::from(*long));
        }
        let value = arg.strip_prefix(*short)?.strip_prefix('=')?;
        Some(OsString::from(format!("{long}={value}")))
    })
}

/// Returns whether `flag` is exactly an option (without attached value) that takes a value.
fn takes_value(command: &clap::Command, flag: &str) -> bool {
    command.get_arguments().any(|arg| {
        if !arg.get_action().takes_values() {
            return false;
        }
        match flag.strip_prefix("--") {
            Some(long) => arg.get_long() == Some(long),
            None => {
                let mut chars = flag.chars();
                chars.next() == Some('-')
                    && chars.next().map_or(false, |c| arg.get_short() == Some(c))
                    && chars.next().is_none()
            }
        }
    })
}
