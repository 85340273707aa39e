//! Source-space crop rectangles projected from stage transforms.

use crate::{
    foundation::core::Point,
    motion::{transform::MotionTransform, viewport::ViewportMetrics},
};

// Float noise tolerated before a rounded edge moves to the next pixel. Interpolated and
// divided edges carry rounding error around 1e-12, so an edge meant to sit exactly on a
// pixel boundary must not be floored or ceiled one pixel outward.
const SNAP_EPSILON: f64 = 1e-6;

/// Sub-pixel crop rectangle in source (natural) pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width, > 0.
    pub width: f64,
    /// Height, > 0.
    pub height: f64,
}

impl CropRect {
    /// The whole source image.
    pub fn full(metrics: &ViewportMetrics) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: metrics.natural_width,
            height: metrics.natural_height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Interpolate each field independently; `t` is not clamped.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            left: lerp(self.left, other.left, t),
            top: lerp(self.top, other.top, t),
            width: lerp(self.width, other.width, t),
            height: lerp(self.height, other.height, t),
        }
    }

    /// Whether the rectangle lies inside a `width × height` raster (with float tolerance).
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.left >= -SNAP_EPSILON
            && self.top >= -SNAP_EPSILON
            && self.width > 0.0
            && self.height > 0.0
            && self.right() <= width + SNAP_EPSILON
            && self.bottom() <= height + SNAP_EPSILON
    }

    /// Grow to whole pixels (floor left/top, ceil right/bottom) and clamp into the raster.
    ///
    /// The result is always at least 1×1 and fully inside `width × height`.
    pub fn snap_to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let (x, w) = snap_axis(self.left, self.right(), width);
        let (y, h) = snap_axis(self.top, self.bottom(), height);
        PixelRect {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// Integer crop rectangle, ready to hand to a raster cropper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width, ≥ 1.
    pub width: u32,
    /// Height, ≥ 1.
    pub height: u32,
}

// Within SNAP_EPSILON of an integer counts as on it, on both edges.
fn snap_axis(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let limit = limit.max(1);
    let max = f64::from(limit);
    let lo = (start + SNAP_EPSILON).floor().clamp(0.0, max - 1.0);
    let hi = (end - SNAP_EPSILON).ceil().clamp(lo + 1.0, max);
    (lo as u32, (hi - lo) as u32)
}

// Exact at both ends: t = 0 yields `a`, t = 1 yields `b`.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Project the visible stage area back onto the source image.
///
/// Inverts `transform` for the stage's top-left corner, removes the display offset and
/// divides by the base scale. The size is the stage divided by `scale × base_scale`, capped at
/// the source size, and the position is clamped so the rectangle never leaves the source.
pub fn project_crop(transform: &MotionTransform, metrics: &ViewportMetrics) -> CropRect {
    let scale = transform.scale;
    let corner = transform.invert(Point::ORIGIN);

    let width = (metrics.stage_width / (scale * metrics.base_scale)).min(metrics.natural_width);
    let height =
        (metrics.stage_height / (scale * metrics.base_scale)).min(metrics.natural_height);

    let left = (corner.x - metrics.offset_x) / metrics.base_scale;
    let top = (corner.y - metrics.offset_y) / metrics.base_scale;

    CropRect {
        left: left.clamp(0.0, (metrics.natural_width - width).max(0.0)),
        top: top.clamp(0.0, (metrics.natural_height - height).max(0.0)),
        width,
        height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/crop.rs"]
mod tests;
