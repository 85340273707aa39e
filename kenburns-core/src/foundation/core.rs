use crate::foundation::error::{KenBurnsError, KenBurnsResult};

pub use kurbo::{Point, Vec2};

/// Output stage dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Stage width.
    pub width: u32,
    /// Stage height.
    pub height: u32,
}

impl Canvas {
    /// 1280×720, the default export stage.
    pub const HD: Self = Self {
        width: 1280,
        height: 720,
    };

    /// Construct a canvas, rejecting zero-sized stages.
    pub fn new(width: u32, height: u32) -> KenBurnsResult<Self> {
        if width == 0 || height == 0 {
            return Err(KenBurnsError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width as `f64`.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::HD
    }
}

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Construct a frame rate, rejecting zero terms.
    pub fn new(num: u32, den: u32) -> KenBurnsResult<Self> {
        if den == 0 {
            return Err(KenBurnsError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(KenBurnsError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as `f64`.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Form accepted by ffmpeg's `-framerate` / `-r` flags.
    pub fn to_ffmpeg_arg(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
