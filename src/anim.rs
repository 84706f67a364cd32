//! Animated images.

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
    slice,
    time::Duration,
};

use image::{
    codecs::gif::{GifDecoder, GifEncoder, Repeat},
    AnimationDecoder, Delay, Frame,
};

use crate::{image::Image, Result};

/// Default GIF quantizer speed.
///
/// Ranges from 1 (best quality, slowest) to 30 (fastest).
pub const DEFAULT_GIF_SPEED: i32 = 10;

/// A timed sequence of images.
#[derive(Default)]
pub struct Animation {
    frames: Vec<(Image, Duration)>,
}

impl Animation {
    /// Creates an empty animation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a GIF animation from the filesystem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Loads a GIF animation from an in-memory byte slice.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }

    /// Loads a GIF animation from a [`BufRead`] implementor.
    ///
    /// Every decoded frame is composited onto the full logical screen, so all frames have the
    /// size of the animation.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let frames = GifDecoder::new(reader)?
            .into_frames()
            .map(|res| {
                let frame = res?;
                let dur = Duration::from(frame.delay());
                Ok((Image::from_buf(frame.into_buffer()), dur))
            })
            .collect::<Result<_>>()?;

        Ok(Self { frames })
    }

    /// Creates an animation from a sequence of frames, each displayed for `duration`.
    pub fn from_frames<I>(frames: I, duration: Duration) -> Self
    where
        I: IntoIterator<Item = Image>,
    {
        Self {
            frames: frames.into_iter().map(|image| (image, duration)).collect(),
        }
    }

    /// Appends a frame to the end of the animation.
    pub fn push(&mut self, image: Image, duration: Duration) {
        self.frames.push((image, duration));
    }

    /// Returns the number of frames in this animation.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns an iterator over the frames of this animation.
    ///
    /// Note that every frame is only yielded *once* (ie. the iterator does not loop, even if the
    /// animation does). Call [`Iterator::cycle`] to loop the animation.
    pub fn frames(&self) -> FrameIter<'_> {
        FrameIter {
            frames: self.frames.iter(),
        }
    }

    /// Encodes this animation as an infinitely looping GIF.
    ///
    /// `speed` is passed to the color quantizer (1 to 30, lower is slower but more accurate).
    /// GIF stores frame delays in hundredths of a second, so delays are truncated to 10 ms.
    pub fn encode_gif<W: Write>(self, writer: W, speed: i32) -> Result<()> {
        let mut encoder = GifEncoder::new_with_speed(writer, speed.clamp(1, 30));
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(self.frames.into_iter().map(|(image, duration)| {
            Frame::from_parts(
                image.into_buf(),
                0,
                0,
                Delay::from_saturating_duration(duration),
            )
        }))?;
        Ok(())
    }

    /// Encodes this animation as a GIF and writes it to `path`.
    ///
    /// The file is only created once encoding has succeeded.
    pub fn save_gif<P: AsRef<Path>>(self, path: P, speed: i32) -> Result<()> {
        let mut data = Vec::new();
        self.encode_gif(&mut data, speed)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// An iterator over the [`AnimationFrame`]s that make up an [`Animation`].
#[derive(Clone)]
pub struct FrameIter<'a> {
    frames: slice::Iter<'a, (Image, Duration)>,
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = AnimationFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames
            .next()
            .map(|&(ref image, duration)| AnimationFrame { image, duration })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl<'a> ExactSizeIterator for FrameIter<'a> {}

/// A frame of an animation, consisting of image data and a duration.
pub struct AnimationFrame<'a> {
    image: &'a Image,
    duration: Duration,
}

impl<'a> AnimationFrame<'a> {
    /// Returns the image data for this frame.
    pub fn image(&self) -> &'a Image {
        self.image
    }

    /// Returns the [`Duration`] for which this frame should be displayed before proceeding to the
    /// next one.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}
