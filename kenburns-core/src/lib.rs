//! Ken Burns slideshow rendering: deterministic pan/zoom motion over still images, encoded and
//! cross-faded into one video.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `Slideshow` manifest → per-slide [`MotionConfig`] (defaults, sanitizing and the
//!    explicit [`AutoStyleCycle`])
//! 2. **Move**: `MotionConfig + ViewportMetrics` → [`MotionPath`] of eased zoom and crop states
//! 3. **Rasterize**: crop the oversampled source and resample to the stage, one PNG per frame
//! 4. **Encode**: frames → one clip per slide through the system `ffmpeg` binary, hardware codec
//!    first with a software fallback
//! 5. **Compose**: clips → [`TimelinePlan`] of `xfade` cross-fades → final video
//!
//! Steps 1, 2 and 5 are pure. The geometry in [`motion`] is public so previews can share it.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod composition;
mod encode;
mod foundation;
mod render;

/// Pure motion geometry: easing, viewport fit, focus-anchored transforms, crop projection and
/// per-slide motion paths.
pub mod motion;

pub use assets::raster::{
    MAX_OVERSAMPLED_EDGE, RESAMPLE_FILTER, SourceRaster, crop_and_fit, decode_image, load_source,
    oversample_image,
};
pub use compose::timeline::{
    ClipDescriptor, CrossfadeStep, FADE_EPSILON_SECS, FilterGraph, TimelinePlan, Transition,
    effective_fade, plan_timeline,
};
pub use composition::manifest::{
    AutoStyleCycle, DEFAULT_FADE_SECS, DEFAULT_OVERSAMPLE, MAX_OVERSAMPLE, RenderSettings, Slide,
    SlideDefaults, Slideshow,
};
pub use encode::ffmpeg::{
    EncoderSettings, FfmpegEncoder, default_hardware_codec, ensure_parent_dir,
    is_encoder_unavailable_message, is_ffmpeg_available,
};
pub use foundation::core::{Canvas, Fps, Point, Vec2};
pub use foundation::error::{KenBurnsError, KenBurnsResult};
pub use motion::{
    crop::{CropRect, PixelRect, project_crop},
    ease::CubicBezier,
    path::{
        DEFAULT_DURATION_SECS, DEFAULT_ZOOM, MIN_FRAMES, MotionConfig, MotionPath, MotionState,
        MotionStyle, frame_count, normalized_time,
    },
    transform::{FocusPoint, MotionTransform, resolve_transform},
    viewport::ViewportMetrics,
};
pub use render::frames::{FrameBatch, FrameSequenceGenerator, RenderThreading};
pub use render::pipeline::{
    ExportReport, SlideReport, SlideshowPlan, export_slideshow, plan_slideshow, render_preview,
};
pub use render::store::FrameStore;
