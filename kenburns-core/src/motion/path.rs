//! Per-image motion path: start/end states and their eased interpolation over time.

use crate::{
    foundation::core::Fps,
    motion::{
        crop::{CropRect, lerp, project_crop},
        ease::CubicBezier,
        transform::{FocusPoint, MotionTransform, resolve_transform},
        viewport::ViewportMetrics,
    },
};

/// Duration used when a slide asks for a non-positive or non-finite duration.
pub const DEFAULT_DURATION_SECS: f64 = 5.0;
/// Zoom used when a slide asks for a non-positive or non-finite zoom.
pub const DEFAULT_ZOOM: f64 = 1.3;
/// Minimum number of frames in any rendered sequence.
pub const MIN_FRAMES: u64 = 2;

/// Direction of the zoom over a clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionStyle {
    /// Start at the fitted view, end zoomed in.
    #[default]
    ZoomIn,
    /// Start zoomed in, end at the fitted view.
    ZoomOut,
    /// Zoom in over the first half, back out over the second.
    PingPong,
}

/// Resolved motion parameters for one slide.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionConfig {
    /// Clip length in seconds.
    pub duration: f64,
    /// Peak zoom factor; 1 means no zoom.
    pub zoom: f64,
    /// Zoom direction.
    pub motion_style: MotionStyle,
    /// Cross-fade into the next slide, in seconds.
    pub fade_duration: f64,
    /// Hold `zoom` for the whole clip instead of animating towards it.
    pub lock_zoom: bool,
    /// Zoom anchor; `None` means the image centre.
    pub focus_point: Option<FocusPoint>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_SECS,
            zoom: DEFAULT_ZOOM,
            motion_style: MotionStyle::ZoomIn,
            fade_duration: 0.0,
            lock_zoom: false,
            focus_point: None,
        }
    }
}

impl MotionConfig {
    /// Replace degenerate values with safe defaults so batch renders keep going.
    pub fn sanitized(mut self) -> Self {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            tracing::warn!(
                duration = self.duration,
                fallback = DEFAULT_DURATION_SECS,
                "degenerate slide duration, using default"
            );
            self.duration = DEFAULT_DURATION_SECS;
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            tracing::warn!(
                zoom = self.zoom,
                fallback = DEFAULT_ZOOM,
                "degenerate zoom, using default"
            );
            self.zoom = DEFAULT_ZOOM;
        }
        if !self.fade_duration.is_finite() || self.fade_duration < 0.0 {
            tracing::warn!(
                fade_duration = self.fade_duration,
                "negative fade duration, disabling fade"
            );
            self.fade_duration = 0.0;
        }
        self.focus_point = self.focus_point.map(FocusPoint::clamped);
        self
    }

    /// `(start_zoom, end_zoom)` of the clip's first segment.
    ///
    /// Ping-pong reuses the zoom-in pair and plays it back in reverse for its second half.
    pub fn zoom_range(&self) -> (f64, f64) {
        if self.lock_zoom {
            return (self.zoom, self.zoom);
        }
        match self.motion_style {
            MotionStyle::ZoomIn | MotionStyle::PingPong => (1.0, self.zoom),
            MotionStyle::ZoomOut => (self.zoom, 1.0),
        }
    }
}

/// Zoom and crop at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    /// Zoom factor.
    pub zoom: f64,
    /// Crop over the (oversampled) source.
    pub crop: CropRect,
}

/// Precomputed motion for one slide over one source raster.
#[derive(Clone, Debug)]
pub struct MotionPath {
    style: MotionStyle,
    easing: CubicBezier,
    focus: FocusPoint,
    metrics: ViewportMetrics,
    start: MotionState,
    end: MotionState,
}

impl MotionPath {
    /// Resolve start and end states for `config` on a source described by `metrics`.
    pub fn new(config: &MotionConfig, metrics: &ViewportMetrics, easing: CubicBezier) -> Self {
        let focus = FocusPoint::or_center(config.focus_point);
        let (start_zoom, end_zoom) = config.zoom_range();
        Self {
            style: config.motion_style,
            easing,
            focus,
            metrics: *metrics,
            start: state_at_zoom(focus, metrics, start_zoom),
            end: state_at_zoom(focus, metrics, end_zoom),
        }
    }

    /// State at the first frame.
    pub fn start(&self) -> MotionState {
        self.start
    }

    /// State at the end of the forward segment.
    pub fn end(&self) -> MotionState {
        self.end
    }

    /// Viewport the path was resolved against.
    pub fn metrics(&self) -> &ViewportMetrics {
        &self.metrics
    }

    /// Sample the path at normalized time `t` (clamped to `[0, 1]`).
    ///
    /// Zoom and crop move in lock-step on one eased scalar. Ping-pong maps both halves onto
    /// the same start→end segment (`2t` forward, `2(1 - t)` backward), so the midpoint is
    /// continuous and the last frame equals the first.
    pub fn sample(&self, t: f64) -> MotionState {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let local = match self.style {
            MotionStyle::PingPong if t <= 0.5 => t * 2.0,
            MotionStyle::PingPong => (1.0 - t) * 2.0,
            MotionStyle::ZoomIn | MotionStyle::ZoomOut => t,
        };
        let eased = self.easing.ease(local);
        MotionState {
            zoom: lerp(self.start.zoom, self.end.zoom, eased),
            crop: self.start.crop.lerp(&self.end.crop, eased),
        }
    }

    /// Stage transform at `t`, for preview surfaces that animate the fitted image directly.
    pub fn transform_at(&self, t: f64) -> MotionTransform {
        resolve_transform(Some(self.focus), &self.metrics, self.sample(t).zoom)
    }
}

fn state_at_zoom(focus: FocusPoint, metrics: &ViewportMetrics, zoom: f64) -> MotionState {
    let transform = resolve_transform(Some(focus), metrics, zoom);
    MotionState {
        zoom,
        crop: project_crop(&transform, metrics),
    }
}

/// Number of frames for a clip: `max(2, ceil(duration × fps))`.
pub fn frame_count(duration_secs: f64, fps: Fps) -> u64 {
    let exact = duration_secs.max(0.0) * fps.as_f64();
    // Absorb float noise such as 0.1 * 30 = 3.0000000000000004.
    let frames = (exact - 1e-9).ceil().max(0.0) as u64;
    frames.max(MIN_FRAMES)
}

/// Normalized time of `frame` within a `total`-frame sequence; 0 for single-frame sequences.
pub fn normalized_time(frame: u64, total: u64) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    (frame.min(total - 1) as f64) / ((total - 1) as f64)
}

#[cfg(test)]
#[path = "../../tests/unit/motion/path.rs"]
mod tests;
