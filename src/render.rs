//! Splash frame composition.
//!
//! Every frame is made of the same static parts (background, logo, caption) plus a rotating arc.
//! The static parts are composed once; per frame, only the spinner is rendered and blended on top.
//!
//! The spinner is drawn at [`SUPERSAMPLING`] times the canvas resolution and downsampled with a
//! Lanczos filter, which anti-aliases its edges.

use std::{path::PathBuf, time::Duration};

use crate::{
    anim::{Animation, DEFAULT_GIF_SPEED},
    font::{self, Font, TextBounds, DEFAULT_FONTS},
    image::{draw, Color, Image},
    resolution::Resolution,
    timer::Timer,
    Error, Result,
};

pub const DEFAULT_FRAME_COUNT: u32 = 30;
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(35);
pub const DEFAULT_CAPTION: &str = "INSTALLING";
pub const DEFAULT_FONT_SIZE: f32 = 30.0;
pub const DEFAULT_CANVAS: Resolution = Resolution::new(500, 650);
pub const DEFAULT_LOGO_SIZE: Resolution = Resolution::new(400, 400);

/// Angle covered by the spinner arc in every frame.
pub const ARC_SWEEP_DEGREES: f32 = 270.0;

/// Linear supersampling factor used when rendering the spinner.
pub const SUPERSAMPLING: u32 = 4;

const LOGO_TOP: i32 = 20;
const SPINNER_RADIUS: u32 = 25;
const SPINNER_THICKNESS: u32 = 6;
/// Distance of the spinner's center from the bottom of the canvas.
const SPINNER_BOTTOM_OFFSET: i32 = 50;
/// Vertical gap between the caption's ink and the top of the spinner.
const CAPTION_GAP: i32 = 25;
/// Transparent border around the supersampled spinner tile, in canvas pixels.
///
/// Must be at least the Lanczos3 support so that the tile downsamples exactly like the full canvas
/// would.
const TILE_MARGIN: u32 = 4;

/// Everything needed to render one splash animation.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub canvas: Resolution,
    pub logo_size: Resolution,
    pub background: Color,
    pub text_color: Color,
    pub spinner_color: Color,
    pub caption: String,
    pub frame_count: u32,
    pub frame_delay: Duration,
    pub font_size: f32,
    /// Font files to try for the caption, most preferred first.
    pub fonts: Vec<PathBuf>,
    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("logo.png"),
            output: PathBuf::from("splash_installer.gif"),
            canvas: DEFAULT_CANVAS,
            logo_size: DEFAULT_LOGO_SIZE,
            background: Color::BLACK,
            text_color: Color::WHITE,
            spinner_color: Color::WHITE,
            caption: DEFAULT_CAPTION.to_string(),
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay: DEFAULT_FRAME_DELAY,
            font_size: DEFAULT_FONT_SIZE,
            fonts: DEFAULT_FONTS.iter().map(PathBuf::from).collect(),
            gif_speed: DEFAULT_GIF_SPEED,
        }
    }
}

impl RenderConfig {
    /// Checks that the configuration describes a renderable animation.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));
        if self.frame_count == 0 {
            return invalid("frame count must be at least 1".into());
        }
        if self.canvas.is_empty() {
            return invalid(format!("canvas size {} contains no pixels", self.canvas));
        }
        if self.logo_size.is_empty() {
            return invalid(format!("logo size {} contains no pixels", self.logo_size));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return invalid(format!("font size {} must be positive", self.font_size));
        }
        Ok(())
    }
}

/// Returns the spinner's start angle for frame `index`, in degrees.
///
/// The spinner completes exactly one revolution over `frame_count` frames, so the animation loops
/// seamlessly.
pub fn start_angle(index: u32, frame_count: u32) -> f32 {
    index as f32 * (360.0 / frame_count as f32)
}

/// Position and size of the spinner on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spinner {
    pub center_x: i32,
    pub center_y: i32,
    /// Outer radius of the arc.
    pub radius: u32,
    /// Stroke width, measured inwards from the outer radius.
    pub thickness: u32,
}

impl Spinner {
    /// Places the spinner horizontally centered near the bottom of `canvas`.
    pub fn for_canvas(canvas: Resolution) -> Self {
        Self {
            center_x: (canvas.width() / 2) as i32,
            center_y: canvas.height() as i32 - SPINNER_BOTTOM_OFFSET,
            radius: SPINNER_RADIUS,
            thickness: SPINNER_THICKNESS,
        }
    }

    /// Renders the arc starting at `start_degrees` into a transparent, anti-aliased tile.
    ///
    /// Returns the tile and the canvas position of its top-left corner.
    pub fn render_tile(&self, start_degrees: f32, color: Color) -> (Image, i32, i32) {
        let reach = self.radius + TILE_MARGIN;
        let size = Resolution::new(2 * reach + 1, 2 * reach + 1);

        let mut tile = Image::filled(size.scale(SUPERSAMPLING), Color::NONE);
        let ss = SUPERSAMPLING as f32;
        // Center of the canvas pixel the spinner is centered on.
        let center = (reach as f32 + 0.5) * ss;
        draw::arc(&mut tile, center, center, self.radius as f32 * ss)
            .start(start_degrees)
            .sweep(ARC_SWEEP_DEGREES)
            .stroke_width(self.thickness as f32 * ss)
            .color(color);

        let tile = tile.resize(size);
        let reach = reach as i32;
        (tile, self.center_x - reach, self.center_y - reach)
    }
}

/// Positions of all frame elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Top-left corner of the logo.
    pub logo: (i32, i32),
    /// Drawing origin of the caption.
    pub caption: (i32, i32),
    pub spinner: Spinner,
}

impl Layout {
    /// Computes the layout for a `canvas`, a logo of `logo_size` and a caption with
    /// `caption_bounds`.
    ///
    /// The logo is centered horizontally near the top, the spinner near the bottom, and the
    /// caption is centered above the spinner.
    pub fn new(canvas: Resolution, logo_size: Resolution, caption_bounds: TextBounds) -> Self {
        let canvas_w = canvas.width() as i32;
        let spinner = Spinner::for_canvas(canvas);

        let logo_x = (canvas_w - logo_size.width() as i32).div_euclid(2);
        let caption_x = (canvas_w - caption_bounds.width()).div_euclid(2);
        let caption_y =
            spinner.center_y - spinner.radius as i32 - caption_bounds.height() - CAPTION_GAP;

        Self {
            logo: (logo_x, LOGO_TOP),
            caption: (caption_x, caption_y),
            spinner,
        }
    }
}

/// Renders the frames of a splash animation.
pub struct Renderer {
    config: RenderConfig,
    layout: Layout,
    /// Background, logo and caption; shared by all frames.
    base: Image,
}

impl Renderer {
    /// Loads the logo and caption font named by `config` and prepares the static frame contents.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let logo = Image::load(&config.input)?;
        let font = Font::select(&config.fonts, config.font_size, &font::system_font_dirs());
        log::debug!("caption font: {:?}", font);
        Self::with_parts(config, &logo, &font)
    }

    /// Prepares a renderer from an already loaded logo and font.
    ///
    /// The logo is resized to the configured logo size.
    pub fn with_parts(config: RenderConfig, logo: &Image, font: &Font) -> Result<Self> {
        config.validate()?;
        let logo = logo.resize(config.logo_size);
        let caption_bounds = font.text_bounds(&config.caption);
        let layout = Layout::new(config.canvas, config.logo_size, caption_bounds);
        log::trace!("layout: {:?}", layout);

        let mut base = Image::filled(config.canvas, config.background);
        let (logo_x, logo_y) = layout.logo;
        base.blend_from(&logo).at(logo_x, logo_y);
        let (caption_x, caption_y) = layout.caption;
        draw::text(&mut base, font, caption_x, caption_y, &config.caption).color(config.text_color);

        Ok(Self {
            config,
            layout,
            base,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Renders frame `index` of the animation.
    pub fn render_frame(&self, index: u32) -> Image {
        let start = start_angle(index, self.config.frame_count);
        log::trace!("frame {index}: spinner starts at {start}°");

        let (spinner, x, y) = self
            .layout
            .spinner
            .render_tile(start, self.config.spinner_color);
        let mut frame = self.base.clone();
        frame.blend_from(&spinner).at(x, y);
        frame.make_opaque();
        frame
    }

    /// Renders all frames, in order.
    pub fn render(&self) -> Animation {
        let timer = Timer::new("frame");
        let mut animation = Animation::new();
        for index in 0..self.config.frame_count {
            let frame = timer.time(|| self.render_frame(index));
            animation.push(frame, self.config.frame_delay);
        }
        log::debug!("{}", timer);
        animation
    }
}

/// Renders the animation described by `config` and writes it to `config.output` as a GIF.
///
/// If the logo cannot be loaded, no output file is created.
pub fn run(config: &RenderConfig) -> Result<()> {
    log::info!("Input: {}", config.input.display());
    log::info!("Output: {}", config.output.display());
    log::info!("Canvas: {}, Logo: {}", config.canvas, config.logo_size);
    log::info!(
        "Colors - Bg: {}, Text: {}, Spinner: {}",
        config.background,
        config.text_color,
        config.spinner_color
    );

    let renderer = Renderer::new(config.clone())?;
    let animation = renderer.render();

    log::info!("Generating GIF...");
    animation.save_gif(&config.output, config.gif_speed)?;
    log::info!("Done! Saved to {}", config.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use approx::assert_relative_eq;

    use super::*;

    fn polar(spinner: &Spinner, radius: f32, degrees: f32) -> (u32, u32) {
        let rad = degrees.to_radians();
        let cx = spinner.center_x as f32 + 0.5;
        let cy = spinner.center_y as f32 + 0.5;
        (
            (cx + radius * rad.cos()).floor() as u32,
            (cy + radius * rad.sin()).floor() as u32,
        )
    }

    fn logo() -> Image {
        let mut logo = Image::filled(Resolution::new(16, 16), Color::RED);
        // Left half is transparent.
        for y in 0..16 {
            for x in 0..8 {
                logo.set(x, y, Color::NONE);
            }
        }
        logo
    }

    fn renderer(config: RenderConfig) -> Renderer {
        Renderer::with_parts(config, &logo(), &Font::builtin()).unwrap()
    }

    #[test]
    fn start_angles() {
        assert_eq!(start_angle(0, 30), 0.0);
        for k in 0..30 {
            assert_relative_eq!(start_angle(k, 30), k as f32 * 12.0, max_relative = 1e-5);
        }
        assert_relative_eq!(start_angle(1, 8), 45.0);
        assert_eq!(ARC_SWEEP_DEGREES, 270.0);
    }

    #[test]
    fn default_layout() {
        let layout = Layout::new(
            DEFAULT_CANVAS,
            DEFAULT_LOGO_SIZE,
            Font::builtin().text_bounds(DEFAULT_CAPTION),
        );
        assert_eq!(layout.logo, (50, 20));
        assert_eq!(
            layout.spinner,
            Spinner {
                center_x: 250,
                center_y: 600,
                radius: 25,
                thickness: 6,
            }
        );
        // 100x20 caption, 25px above the spinner.
        assert_eq!(layout.caption, (200, 530));
    }

    #[test]
    fn layout_allows_oversized_elements() {
        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: 31,
            bottom: 10,
        };
        let layout = Layout::new(Resolution::new(20, 40), Resolution::new(25, 25), bounds);
        assert_eq!(layout.logo, (-3, 20));
        assert_eq!(layout.caption.0, -6);
        assert_eq!(layout.spinner.center_y, -10);
    }

    #[test]
    fn spinner_rotates() {
        let config = RenderConfig::default();
        let renderer = renderer(config.clone());
        let spinner = renderer.layout().spinner;
        let mid = (spinner.radius - spinner.thickness / 2) as f32;

        let frame = renderer.render_frame(0);
        assert_eq!(frame.resolution(), config.canvas);
        // 0° to 270° clockwise: everything but the top-right quadrant.
        let (x, y) = polar(&spinner, mid, 135.0);
        assert!(frame.get(x, y).rgb().iter().all(|&c| c > 200), "{:?}", frame.get(x, y));
        let (x, y) = polar(&spinner, mid, 315.0);
        assert_eq!(frame.get(x, y), Color::BLACK);

        // Half a revolution later, the gap is in the bottom-left quadrant.
        let frame = renderer.render_frame(15);
        let (x, y) = polar(&spinner, mid, 135.0);
        assert_eq!(frame.get(x, y), Color::BLACK);
        let (x, y) = polar(&spinner, mid, 315.0);
        assert!(frame.get(x, y).rgb().iter().all(|&c| c > 200), "{:?}", frame.get(x, y));

        // The spinner's middle stays empty.
        assert_eq!(
            frame.get(spinner.center_x as u32, spinner.center_y as u32),
            Color::BLACK
        );
    }

    #[test]
    fn spinner_edges_are_antialiased() {
        let spinner = Spinner::for_canvas(DEFAULT_CANVAS);
        let (tile, x, y) = spinner.render_tile(0.0, Color::WHITE);
        assert_eq!(x, spinner.center_x - 29);
        assert_eq!(y, spinner.center_y - 29);
        assert_eq!(tile.resolution(), Resolution::new(59, 59));

        let alphas = tile.data().chunks(4).map(|px| px[3]).collect::<Vec<_>>();
        assert!(alphas.iter().any(|&a| a >= 250));
        assert!(alphas.iter().any(|&a| a > 0 && a < 255));
        // The margin is untouched.
        assert!(alphas[..59 * 2].iter().all(|&a| a == 0));
    }

    #[test]
    fn static_parts() {
        let config = RenderConfig {
            background: Color::BLUE,
            text_color: Color::GREEN,
            ..Default::default()
        };
        let renderer = renderer(config);
        let frame = renderer.render_frame(3);

        assert_eq!(frame.get(0, 0), Color::BLUE);
        let (logo_x, logo_y) = renderer.layout().logo;
        // Opaque part of the logo.
        assert_eq!(frame.get(logo_x as u32 + 300, logo_y as u32 + 200), Color::RED);
        // Transparent part shows the background.
        assert_eq!(frame.get(logo_x as u32 + 10, logo_y as u32 + 200), Color::BLUE);

        let (caption_x, caption_y) = renderer.layout().caption;
        let caption_pixels = (caption_y..caption_y + 20)
            .flat_map(|y| (caption_x..caption_x + 100).map(move |x| (x as u32, y as u32)))
            .filter(|&(x, y)| frame.get(x, y) == Color::GREEN)
            .count();
        assert!(caption_pixels > 0);
        assert!(frame.data().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn render_produces_all_frames() {
        let config = RenderConfig {
            canvas: Resolution::new(120, 160),
            logo_size: Resolution::new(60, 60),
            frame_count: 6,
            ..Default::default()
        };
        let animation = renderer(config).render();
        assert_eq!(animation.len(), 6);
        for frame in animation.frames() {
            assert_eq!(frame.image().resolution(), Resolution::new(120, 160));
            assert_eq!(frame.duration(), DEFAULT_FRAME_DELAY);
        }
    }

    #[test]
    fn invalid_config() {
        for config in [
            RenderConfig {
                frame_count: 0,
                ..Default::default()
            },
            RenderConfig {
                canvas: Resolution::new(0, 10),
                ..Default::default()
            },
            RenderConfig {
                font_size: f32::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                Renderer::with_parts(config, &logo(), &Font::builtin()),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn run_writes_gif() {
        let dir = env::temp_dir().join(format!("splash-spinner-run-{}", fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("logo.png");
        logo().buf.save(&input).unwrap();

        let config = RenderConfig {
            input,
            output: dir.join("splash.gif"),
            canvas: Resolution::new(120, 160),
            logo_size: Resolution::new(60, 60),
            fonts: Vec::new(),
            gif_speed: 30,
            ..Default::default()
        };
        run(&config).unwrap();

        let animation = Animation::from_path(&config.output).unwrap();
        assert_eq!(animation.len(), DEFAULT_FRAME_COUNT as usize);
        for frame in animation.frames() {
            assert_eq!(frame.image().resolution(), config.canvas);
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = env::temp_dir().join(format!("splash-spinner-missing-{}", fastrand::u64(..)));
        let config = RenderConfig {
            input: dir.join("nope.png"),
            output: dir.join("splash.gif"),
            ..Default::default()
        };

        let err = run(&config).unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }), "{err:?}");
        assert!(err.to_string().contains("nope.png"), "{err}");
        assert!(!config.output.exists());
    }
}
