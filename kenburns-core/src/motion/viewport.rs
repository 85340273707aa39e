//! Contain-fit of a source image inside the stage.

use crate::foundation::{
    core::Canvas,
    error::{KenBurnsError, KenBurnsResult},
};

/// How a source image of a given size sits inside the fixed output stage.
///
/// The image is aspect-fit (never cropped, possibly letterboxed) and centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    /// Stage width in pixels.
    pub stage_width: f64,
    /// Stage height in pixels.
    pub stage_height: f64,
    /// Width of the fitted image on the stage.
    pub display_width: f64,
    /// Height of the fitted image on the stage.
    pub display_height: f64,
    /// Left edge of the fitted image on the stage.
    pub offset_x: f64,
    /// Top edge of the fitted image on the stage.
    pub offset_y: f64,
    /// Source width in pixels (after oversampling, if any).
    pub natural_width: f64,
    /// Source height in pixels (after oversampling, if any).
    pub natural_height: f64,
    /// `display_width / natural_width`.
    pub base_scale: f64,
}

impl ViewportMetrics {
    /// Fit a `natural_width × natural_height` source into `stage`.
    pub fn fit(natural_width: f64, natural_height: f64, stage: Canvas) -> KenBurnsResult<Self> {
        if !(natural_width.is_finite() && natural_height.is_finite())
            || natural_width <= 0.0
            || natural_height <= 0.0
        {
            return Err(KenBurnsError::validation(format!(
                "image dimensions must be positive, got {natural_width}x{natural_height}"
            )));
        }
        if stage.width == 0 || stage.height == 0 {
            return Err(KenBurnsError::validation(
                "stage width/height must be non-zero",
            ));
        }

        let stage_width = stage.width_f64();
        let stage_height = stage.height_f64();
        let base_scale = (stage_width / natural_width).min(stage_height / natural_height);
        let display_width = natural_width * base_scale;
        let display_height = natural_height * base_scale;

        Ok(Self {
            stage_width,
            stage_height,
            display_width,
            display_height,
            offset_x: (stage_width - display_width) / 2.0,
            offset_y: (stage_height - display_height) / 2.0,
            natural_width,
            natural_height,
            base_scale,
        })
    }

    /// Fit integer pixel dimensions, as reported by a decoder.
    pub fn fit_pixels(width: u32, height: u32, stage: Canvas) -> KenBurnsResult<Self> {
        Self::fit(f64::from(width), f64::from(height), stage)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/viewport.rs"]
mod tests;
