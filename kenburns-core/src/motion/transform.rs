//! Stage-space visual transform for a zoom anchored on a focus point.

use crate::{
    foundation::core::{Point, Vec2},
    motion::viewport::ViewportMetrics,
};

/// Percentage coordinates (`0..=100`) relative to the displayed image, not the stage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocusPoint {
    /// Horizontal position, 0 = left edge.
    pub x: f64,
    /// Vertical position, 0 = top edge.
    pub y: f64,
}

impl FocusPoint {
    /// Image centre.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Construct a focus point (not clamped; see [`FocusPoint::clamped`]).
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes to `[0, 100]`; non-finite axes fall back to the centre.
    pub fn clamped(self) -> Self {
        fn axis(v: f64) -> f64 {
            if v.is_finite() { v.clamp(0.0, 100.0) } else { 50.0 }
        }
        Self {
            x: axis(self.x),
            y: axis(self.y),
        }
    }

    /// Resolve an optional focus point, defaulting to the centre.
    pub fn or_center(focus: Option<Self>) -> Self {
        focus.map_or(Self::CENTER, Self::clamped)
    }
}

impl Default for FocusPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

/// A scale about `origin` followed by a translation, in stage pixels.
///
/// A stage point `p` maps to `origin + translation + scale * (p - origin)`, which is what a
/// browser does for `transform: translate(dx, dy) scale(s)` with `transform-origin` set to
/// `origin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTransform {
    /// Scale pivot in stage space.
    pub origin: Point,
    /// Post-scale translation in stage space.
    pub translation: Vec2,
    /// Uniform scale, 1 = no zoom.
    pub scale: f64,
}

impl MotionTransform {
    /// Identity anchored at `origin`.
    pub fn identity_at(origin: Point) -> Self {
        Self {
            origin,
            translation: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Map a pre-transform stage point to where it is drawn.
    pub fn apply(&self, p: Point) -> Point {
        self.origin + self.translation + (p - self.origin) * self.scale
    }

    /// Map a drawn stage point back to its pre-transform position.
    pub fn invert(&self, p: Point) -> Point {
        self.origin + (p - self.origin - self.translation) / self.scale
    }

    /// CSS `(transform-origin, transform)` pair for preview surfaces.
    pub fn css(&self) -> (String, String) {
        (
            format!("{:.3}px {:.3}px", self.origin.x, self.origin.y),
            format!(
                "translate({:.3}px, {:.3}px) scale({:.6})",
                self.translation.x, self.translation.y, self.scale
            ),
        )
    }
}

/// Resolve the transform that zooms by `scale` towards `focus`.
///
/// The translation first centres the focus point on the stage, then is clamped per axis so the
/// zoom never uncovers stage area the fitted image did not already leave empty: an image wider
/// than the stage keeps both edges at or past the stage edges, a narrower one stays inside.
pub fn resolve_transform(
    focus: Option<FocusPoint>,
    metrics: &ViewportMetrics,
    scale: f64,
) -> MotionTransform {
    let focus = FocusPoint::or_center(focus);
    let origin = Point::new(
        metrics.offset_x + metrics.display_width * focus.x / 100.0,
        metrics.offset_y + metrics.display_height * focus.y / 100.0,
    );

    if scale == 1.0 {
        return MotionTransform::identity_at(origin);
    }

    let dx = clamp_axis(
        metrics.stage_width / 2.0 - origin.x,
        origin.x,
        metrics.offset_x,
        metrics.display_width,
        metrics.stage_width,
        scale,
    );
    let dy = clamp_axis(
        metrics.stage_height / 2.0 - origin.y,
        origin.y,
        metrics.offset_y,
        metrics.display_height,
        metrics.stage_height,
        scale,
    );

    MotionTransform {
        origin,
        translation: Vec2::new(dx, dy),
        scale,
    }
}

// Clamp a translation so the scaled image's leading edge lands in the allowed band.
fn clamp_axis(
    wanted: f64,
    origin: f64,
    offset: f64,
    display: f64,
    stage: f64,
    scale: f64,
) -> f64 {
    let scaled = display * scale;
    let lo = (stage - scaled).min(0.0);
    let hi = (stage - scaled).max(0.0);
    // Leading edge of the image before translation.
    let edge = origin + (offset - origin) * scale;
    (edge + wanted).clamp(lo, hi) - edge
}

#[cfg(test)]
#[path = "../../tests/unit/motion/transform.rs"]
mod tests;
