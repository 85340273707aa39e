use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode::ffmpeg::EncoderSettings,
    foundation::{
        core::{Canvas, Fps},
        error::{KenBurnsError, KenBurnsResult},
    },
    motion::{
        ease::CubicBezier,
        path::{DEFAULT_DURATION_SECS, DEFAULT_ZOOM, MotionConfig, MotionStyle},
        transform::FocusPoint,
    },
    render::frames::RenderThreading,
};

/// Cross-fade applied when neither the slide nor the settings name one.
pub const DEFAULT_FADE_SECS: f64 = 0.5;
/// Source oversampling applied before any cropping.
pub const DEFAULT_OVERSAMPLE: u32 = 2;
/// Largest accepted oversampling factor.
pub const MAX_OVERSAMPLE: u32 = 8;

/// Motion values used for slide fields the manifest leaves out.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideDefaults {
    /// Clip length in seconds.
    pub duration: f64,
    /// Peak zoom factor.
    pub zoom: f64,
    /// Fade into the next slide, in seconds.
    pub fade_duration: f64,
    /// Hold the zoom for the whole clip.
    pub lock_zoom: bool,
}

impl Default for SlideDefaults {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_SECS,
            zoom: DEFAULT_ZOOM,
            fade_duration: DEFAULT_FADE_SECS,
            lock_zoom: false,
        }
    }
}

/// Render-wide settings shared by every slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output stage.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Source oversampling factor.
    pub oversample: u32,
    /// Easing curve shared by zoom and pan.
    pub easing: CubicBezier,
    /// Fallbacks for fields a slide omits.
    pub slide_defaults: SlideDefaults,
    /// ffmpeg codec selection.
    pub encoder: EncoderSettings,
    /// Frame-level parallelism.
    pub threading: RenderThreading,
    /// Keep frames and clips after the export finishes.
    pub keep_intermediates: bool,
    /// Parent of the transient frame store; the system temp dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            oversample: DEFAULT_OVERSAMPLE,
            easing: CubicBezier::default(),
            slide_defaults: SlideDefaults::default(),
            encoder: EncoderSettings::default(),
            threading: RenderThreading::default(),
            keep_intermediates: false,
            work_dir: None,
        }
    }
}

impl RenderSettings {
    /// Validate settings that would otherwise fail deep inside a render or encode.
    pub fn validate(&self) -> KenBurnsResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(KenBurnsError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(KenBurnsError::validation("canvas width/height must be > 0"));
        }
        if self.canvas.width % 2 != 0 || self.canvas.height % 2 != 0 {
            return Err(KenBurnsError::validation(
                "canvas width/height must be even (yuv420p output)",
            ));
        }
        if !(1..=MAX_OVERSAMPLE).contains(&self.oversample) {
            return Err(KenBurnsError::validation(format!(
                "oversample must be in 1..={MAX_OVERSAMPLE}"
            )));
        }
        self.easing.validate()?;
        if self.encoder.software_codec.trim().is_empty() {
            return Err(KenBurnsError::validation("encoder software_codec must be non-empty"));
        }
        if self.encoder.crf > 51 {
            return Err(KenBurnsError::validation("encoder crf must be <= 51"));
        }
        if let Some(hw) = &self.encoder.hardware_codec
            && hw.trim().is_empty()
        {
            return Err(KenBurnsError::validation(
                "encoder hardware_codec must be non-empty when set",
            ));
        }
        if self.threading.threads == Some(0) {
            return Err(KenBurnsError::validation("threading threads must be > 0 when set"));
        }
        Ok(())
    }
}

/// Alternates zoom-in and zoom-out for slides that name neither a style nor a focus point.
///
/// Callers own the cycle and pass it into resolution, so consecutive exports can continue the
/// alternation or start fresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AutoStyleCycle {
    next: MotionStyle,
}

impl AutoStyleCycle {
    /// Start the cycle at `style`; ping-pong is not part of the alternation and starts at zoom-in.
    pub fn starting_with(style: MotionStyle) -> Self {
        let next = match style {
            MotionStyle::ZoomOut => MotionStyle::ZoomOut,
            MotionStyle::ZoomIn | MotionStyle::PingPong => MotionStyle::ZoomIn,
        };
        Self { next }
    }

    /// Style the next auto slide will take.
    pub fn peek(&self) -> MotionStyle {
        self.next
    }

    /// Take the next style and move the cycle on.
    pub fn advance(&mut self) -> MotionStyle {
        let current = self.next;
        self.next = match current {
            MotionStyle::ZoomIn => MotionStyle::ZoomOut,
            MotionStyle::ZoomOut | MotionStyle::PingPong => MotionStyle::ZoomIn,
        };
        current
    }
}

/// One image and its motion parameters as written in the manifest.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    /// Source image; relative paths resolve against the manifest directory.
    pub path: PathBuf,
    /// Clip length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Peak zoom factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    /// Zoom direction; omitted means the auto cycle or zoom-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_style: Option<MotionStyle>,
    /// Fade into the next slide, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_duration: Option<f64>,
    /// Hold the zoom for the whole clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_zoom: Option<bool>,
    /// Zoom anchor in percent of the displayed image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_point: Option<FocusPoint>,
}

impl Slide {
    /// Slide with every motion field left to the defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            duration: None,
            zoom: None,
            motion_style: None,
            fade_duration: None,
            lock_zoom: None,
            focus_point: None,
        }
    }

    /// Resolve the effective motion config, advancing `cycle` when the slide is auto-styled.
    pub fn resolve(&self, defaults: &SlideDefaults, cycle: &mut AutoStyleCycle) -> MotionConfig {
        let motion_style = match (self.motion_style, self.focus_point) {
            (Some(style), _) => style,
            (None, Some(_)) => MotionStyle::ZoomIn,
            (None, None) => cycle.advance(),
        };
        MotionConfig {
            duration: self.duration.unwrap_or(defaults.duration),
            zoom: self.zoom.unwrap_or(defaults.zoom),
            motion_style,
            fade_duration: self.fade_duration.unwrap_or(defaults.fade_duration),
            lock_zoom: self.lock_zoom.unwrap_or(defaults.lock_zoom),
            focus_point: self.focus_point,
        }
        .sanitized()
    }
}

/// A manifest: settings plus slides in presentation order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slideshow {
    /// Render-wide settings.
    #[serde(default)]
    pub settings: RenderSettings,
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Slideshow {
    /// Parse a manifest from JSON; slide paths are kept as written.
    pub fn from_json_str(json: &str) -> KenBurnsResult<Self> {
        let show: Self = serde_json::from_str(json)
            .map_err(|e| KenBurnsError::validation(format!("invalid manifest: {e}")))?;
        show.validate()?;
        Ok(show)
    }

    /// Read a manifest file, resolving relative slide paths against its directory.
    pub fn from_path(path: &Path) -> KenBurnsResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        let mut show = Self::from_json_str(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        show.resolve_paths(base);
        Ok(show)
    }

    /// Join relative slide paths onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for slide in &mut self.slides {
            if slide.path.is_relative() {
                slide.path = base.join(&slide.path);
            }
        }
    }

    /// Validate settings and slide entries.
    pub fn validate(&self) -> KenBurnsResult<()> {
        self.settings.validate()?;
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.path.as_os_str().is_empty() {
                return Err(KenBurnsError::validation(format!(
                    "slide {i}: path must be non-empty"
                )));
            }
        }
        Ok(())
    }

    /// Resolve every slide's motion config in order.
    pub fn resolve_motion(&self, cycle: &mut AutoStyleCycle) -> Vec<MotionConfig> {
        self.slides
            .iter()
            .map(|slide| slide.resolve(&self.settings.slide_defaults, cycle))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/manifest.rs"]
mod tests;
