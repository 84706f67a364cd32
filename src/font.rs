//! Caption font selection.
//!
//! Fonts are looked up from a preference list of file names or paths. Each candidate is used
//! directly if it names an existing file, and otherwise searched for in the platform's font
//! directories. The first candidate that loads wins; if none does, a built-in monospace bitmap
//! font is used instead.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use embedded_graphics::mono_font::{ascii, MonoFont};
use rusttype::{point, Scale};

use crate::{Error, Result};

/// The font files tried by default, in order of preference.
///
/// Arial is usually present on Windows, DejaVu on Linux.
pub const DEFAULT_FONTS: &[&str] = &["arial.ttf", "DejaVuSans-Bold.ttf"];

/// A font that can be used to draw captions.
pub enum Font {
    /// A TrueType/OpenType font rendered with anti-aliasing.
    TrueType {
        font: rusttype::Font<'static>,
        scale: Scale,
        path: PathBuf,
    },
    /// A fixed-size monospace bitmap font compiled into the binary.
    Builtin(&'static MonoFont<'static>),
}

impl Font {
    /// Returns the built-in fallback font.
    pub fn builtin() -> Self {
        Self::Builtin(&ascii::FONT_10X20)
    }

    /// Loads a TrueType font from `path`, sized so that its em square is `size_px` pixels tall.
    pub fn load<P: AsRef<Path>>(path: P, size_px: f32) -> Result<Self> {
        Self::load_impl(path.as_ref(), size_px)
    }

    fn load_impl(path: &Path, size_px: f32) -> Result<Self> {
        let data = fs::read(path)?;
        let font = rusttype::Font::try_from_vec(data).ok_or_else(|| Error::InvalidFont {
            path: path.to_path_buf(),
        })?;

        // `rusttype` scales so that ascent-to-descent spans the given height, while font sizes
        // are conventionally specified as the em size.
        let metrics = font.v_metrics_unscaled();
        let units_per_em = f32::from(font.units_per_em().max(1));
        let scale = Scale::uniform(size_px * (metrics.ascent - metrics.descent) / units_per_em);

        Ok(Self::TrueType {
            font,
            scale,
            path: path.to_path_buf(),
        })
    }

    /// Selects the first loadable font from `candidates`, falling back to [`Font::builtin`].
    ///
    /// Candidates that are not existing files are searched for (recursively) in `search_dirs`.
    pub fn select<I, P>(candidates: I, size_px: f32, search_dirs: &[PathBuf]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for candidate in candidates {
            let candidate = candidate.as_ref();
            let path = if candidate.is_file() {
                candidate.to_path_buf()
            } else {
                match find_font_file(candidate, search_dirs) {
                    Some(path) => path,
                    None => {
                        log::debug!("font '{}' not found", candidate.display());
                        continue;
                    }
                }
            };

            match Self::load(&path, size_px) {
                Ok(font) => {
                    log::debug!("using font '{}'", path.display());
                    return font;
                }
                Err(e) => log::warn!("skipping font '{}': {}", path.display(), e),
            }
        }

        log::warn!("custom font not found, using the built-in default");
        Self::builtin()
    }

    /// Returns whether this is the built-in fallback font.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// Computes the bounding box of the ink of `text` when drawn with its top-left line box
    /// corner at the origin.
    pub fn text_bounds(&self, text: &str) -> TextBounds {
        match self {
            Self::TrueType { font, scale, .. } => {
                let ascent = font.v_metrics(*scale).ascent;
                font.layout(text, *scale, point(0.0, ascent))
                    .filter_map(|glyph| glyph.pixel_bounding_box())
                    .map(|bb| TextBounds {
                        left: bb.min.x,
                        top: bb.min.y,
                        right: bb.max.x,
                        bottom: bb.max.y,
                    })
                    .reduce(TextBounds::union)
                    .unwrap_or_default()
            }
            Self::Builtin(mono) => {
                let n = text.chars().count() as u32;
                if n == 0 {
                    return TextBounds::default();
                }
                let width = n * mono.character_size.width + (n - 1) * mono.character_spacing;
                TextBounds {
                    left: 0,
                    top: 0,
                    right: width as i32,
                    bottom: mono.character_size.height as i32,
                }
            }
        }
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrueType { path, scale, .. } => {
                write!(f, "TrueType({}, {}px)", path.display(), scale.y)
            }
            Self::Builtin(mono) => write!(
                f,
                "Builtin({}x{})",
                mono.character_size.width, mono.character_size.height
            ),
        }
    }
}

/// Pixel bounding box of rendered text, relative to the drawing origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    fn union(self, other: Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Returns the directories fonts are usually installed to on the current platform.
///
/// Directories that do not exist are included; searching them simply finds nothing.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = env::var_os("HOME").map(PathBuf::from);

    if cfg!(windows) {
        let windir = env::var_os("WINDIR")
            .map_or_else(|| PathBuf::from("C:\\Windows"), PathBuf::from);
        dirs.push(windir.join("Fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        if let Some(home) = &home {
            dirs.push(home.join("Library/Fonts"));
        }
    } else {
        match env::var_os("XDG_DATA_DIRS") {
            Some(data_dirs) => dirs.extend(env::split_paths(&data_dirs).map(|d| d.join("fonts"))),
            None => dirs.push(PathBuf::from("/usr/share/fonts")),
        }
        if let Some(home) = &home {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }
    }

    dirs
}

/// Searches `dirs` recursively for a file with the same name as `candidate`.
///
/// The name comparison ignores ASCII case, since font file names are inconsistently capitalized
/// across platforms (`arial.ttf` vs. `Arial.ttf`).
pub fn find_font_file(candidate: &Path, dirs: &[PathBuf]) -> Option<PathBuf> {
    let name = candidate.file_name()?.to_str()?;
    dirs.iter().find_map(|dir| find_in_dir(dir, name))
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.filter_map(|entry| entry.ok()) {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if entry
            .file_name()
            .to_str()
            .map_or(false, |file_name| file_name.eq_ignore_ascii_case(name))
        {
            return Some(entry.path());
        }
    }

    subdirs.iter().find_map(|subdir| find_in_dir(subdir, name))
}

#[cfg(test)]
mod tests {
    use crate::{
        image::{draw, Color, Image},
        resolution::Resolution,
    };

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("splash-spinner-{name}-{}", fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builtin_bounds() {
        let font = Font::builtin();
        assert!(font.is_builtin());
        let bounds = font.text_bounds("INSTALLING");
        assert_eq!(bounds.width(), 100);
        assert_eq!(bounds.height(), 20);
        assert_eq!(font.text_bounds(""), TextBounds::default());
    }

    #[test]
    fn finds_nested_files() {
        let dir = scratch_dir("find");
        let nested = dir.join("truetype").join("dejavu");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("DejaVuSans-Bold.ttf"), b"").unwrap();

        let found = find_font_file(Path::new("dejavusans-bold.ttf"), &[dir.clone()]);
        assert_eq!(found, Some(nested.join("DejaVuSans-Bold.ttf")));
        assert_eq!(find_font_file(Path::new("arial.ttf"), &[dir.clone()]), None);
        assert_eq!(
            find_font_file(Path::new("arial.ttf"), &[dir.join("does-not-exist")]),
            None
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn falls_back_to_builtin() {
        let dir = scratch_dir("fallback");
        // Present but not a valid font: must be skipped, not abort selection.
        fs::write(dir.join("arial.ttf"), b"definitely not a font").unwrap();

        let font = Font::select(DEFAULT_FONTS, 30.0, &[dir.clone()]);
        assert!(font.is_builtin());

        let font = Font::select([dir.join("missing.ttf")], 30.0, &[]);
        assert!(font.is_builtin());

        let err = Font::load(dir.join("arial.ttf"), 30.0).unwrap_err();
        assert!(matches!(err, Error::InvalidFont { .. }), "{err:?}");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn truetype_caption() {
        let dirs = system_font_dirs();
        let Some(path) = DEFAULT_FONTS
            .iter()
            .find_map(|name| find_font_file(Path::new(name), &dirs))
        else {
            eprintln!("no default font installed, skipping");
            return;
        };

        let font = Font::load(&path, 30.0).unwrap();
        let Font::TrueType { scale, .. } = &font else {
            panic!("expected a TrueType font, got {font:?}");
        };
        // The line box (ascent to descent) is a bit taller than the em square.
        let line_height = scale.y;
        assert!(line_height > 30.0 && line_height < 40.0, "{line_height}");
        assert!(!Font::select(DEFAULT_FONTS, 30.0, &dirs).is_builtin());

        let bounds = font.text_bounds("INSTALLING");
        assert!(bounds.left >= 0 && bounds.top >= 0, "{bounds:?}");
        assert!(bounds.bottom as f32 <= line_height.ceil(), "{bounds:?}");
        assert!(bounds.width() > 100, "{bounds:?}");
        // All caps, so the ink is about as tall as the cap height (~0.72 em).
        assert!((18..=25).contains(&bounds.height()), "{bounds:?}");
        assert_eq!(font.text_bounds(""), TextBounds::default());

        let mut image = Image::filled(Resolution::new(400, 60), Color::BLACK);
        let (x0, y0) = (10, 10);
        draw::text(&mut image, &font, x0, y0, "INSTALLING").color(Color::GREEN);

        let mut full = 0;
        let mut partial = 0;
        for y in 0..image.height() {
            for x in 0..image.width() {
                let px = image.get(x, y);
                if px == Color::BLACK {
                    continue;
                }
                // Coverage blends from the background towards the text color only.
                assert_eq!((px.r(), px.b(), px.a()), (0, 0, 255), "{px:?}");
                let (x, y) = (x as i32 - x0, y as i32 - y0);
                assert!(x >= bounds.left - 1 && x <= bounds.right, "{x} outside {bounds:?}");
                assert!(y >= bounds.top - 1 && y <= bounds.bottom, "{y} outside {bounds:?}");
                match px.g() {
                    255 => full += 1,
                    _ => partial += 1,
                }
            }
        }
        assert!(full > 0 && partial > 0, "{full} full, {partial} partial");
    }
}
