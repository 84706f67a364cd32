//! Types for representing image resolutions.

use std::{fmt, num::ParseIntError, str::FromStr};

/// Resolution (`width x height`) of an image, canvas, or logo.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// Creates a new [`Resolution`] of `width x height`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns whether this resolution contains no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiplies both dimensions by `factor`.
    pub fn scale(&self, factor: u32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Error returned when parsing a [`Resolution`] from a `WIDTHxHEIGHT` string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseResolutionError {
    #[error("resolution '{0}' must have the form WIDTHxHEIGHT")]
    MissingSeparator(String),
    #[error("invalid dimension in resolution '{input}': {source}")]
    InvalidDimension {
        input: String,
        source: ParseIntError,
    },
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(&['x', 'X'][..])
            .ok_or_else(|| ParseResolutionError::MissingSeparator(s.to_string()))?;
        let dim = |d: &str| {
            d.trim()
                .parse::<u32>()
                .map_err(|source| ParseResolutionError::InvalidDimension {
                    input: s.to_string(),
                    source,
                })
        };
        Ok(Self::new(dim(w)?, dim(h)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("500x650".parse(), Ok(Resolution::new(500, 650)));
        assert_eq!("400X400".parse(), Ok(Resolution::new(400, 400)));
        assert!(matches!(
            "500".parse::<Resolution>(),
            Err(ParseResolutionError::MissingSeparator(_))
        ));
        assert!(matches!(
            "500x-1".parse::<Resolution>(),
            Err(ParseResolutionError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_display() {
        let res = Resolution::new(500, 650);
        assert_eq!(res.to_string(), "500x650");
        assert_eq!(res.to_string().parse(), Ok(res));
        assert_eq!(res.scale(4), Resolution::new(2000, 2600));
        assert_eq!(res.num_pixels(), 325_000);
        assert!(Resolution::new(0, 7).is_empty());
    }
}
