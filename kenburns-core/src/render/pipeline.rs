//! End-to-end export: slides → frames → clips → cross-faded video.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::raster::load_source,
    compose::timeline::{ClipDescriptor, TimelinePlan, plan_timeline},
    composition::manifest::{AutoStyleCycle, RenderSettings, Slideshow},
    encode::ffmpeg::{FfmpegEncoder, ensure_parent_dir},
    foundation::error::{KenBurnsError, KenBurnsResult},
    motion::path::{MotionConfig, frame_count},
    render::{frames::FrameSequenceGenerator, store::FrameStore},
};

/// What was rendered for one slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SlideReport {
    /// Slide position.
    pub index: usize,
    /// Source image.
    pub source: PathBuf,
    /// Motion config after defaults and sanitizing.
    pub motion: MotionConfig,
    /// Frames rasterized.
    pub frames: u64,
    /// Encoded clip (removed after export unless intermediates are kept).
    pub clip: PathBuf,
    /// Codec that produced the clip.
    pub codec: String,
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExportReport {
    /// Final video.
    pub output: PathBuf,
    /// Per-slide results in presentation order.
    pub slides: Vec<SlideReport>,
    /// Length of the final video in seconds.
    pub total_duration: f64,
    /// Frame store left on disk, when intermediates are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

/// Everything an export would do, computed without touching images or ffmpeg.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SlideshowPlan {
    /// Resolved motion per slide.
    pub motions: Vec<MotionConfig>,
    /// Frame count per slide.
    pub frames: Vec<u64>,
    /// Merge plan over clips named `clip_<NNN>.mp4`.
    pub timeline: TimelinePlan,
}

/// Resolve motion configs and the clip timeline for `show`.
pub fn plan_slideshow(
    show: &Slideshow,
    cycle: &mut AutoStyleCycle,
) -> KenBurnsResult<SlideshowPlan> {
    show.validate()?;
    let motions = show.resolve_motion(cycle);
    let frames = motions
        .iter()
        .map(|m| frame_count(m.duration, show.settings.fps))
        .collect();
    let clips: Vec<ClipDescriptor> = motions
        .iter()
        .enumerate()
        .map(|(index, m)| clip_descriptor(index, m, PathBuf::from(format!("clip_{index:03}.mp4"))))
        .collect();
    Ok(SlideshowPlan {
        timeline: plan_timeline(&clips)?,
        motions,
        frames,
    })
}

/// Render every slide of `show` and merge the clips into `out`.
///
/// Slides are processed one at a time (frames, then clip); compositing starts once all clips
/// exist. Any failure aborts the export and names the slide or stage that failed.
#[tracing::instrument(skip_all, fields(out = %out.display(), slides = show.slides.len()))]
pub fn export_slideshow(
    show: &Slideshow,
    out: &Path,
    cycle: &mut AutoStyleCycle,
) -> KenBurnsResult<ExportReport> {
    show.validate()?;
    if show.slides.is_empty() {
        return Err(KenBurnsError::composition("slideshow has no slides"));
    }
    let settings = &show.settings;
    let motions = show.resolve_motion(cycle);

    let mut encoder = FfmpegEncoder::new(settings.encoder.clone())?;
    let mut store = match &settings.work_dir {
        Some(root) => FrameStore::create(root)?,
        None => FrameStore::create_in_temp()?,
    };
    if settings.keep_intermediates {
        store.keep();
    }

    let mut slides = Vec::with_capacity(show.slides.len());
    for (index, (slide, motion)) in show.slides.iter().zip(motions).enumerate() {
        let report = render_slide(settings, &store, &mut encoder, index, &slide.path, motion)
            .map_err(|e| e.in_stage(format!("slide {index}")))?;
        slides.push(report);
    }

    let clips: Vec<ClipDescriptor> = slides
        .iter()
        .map(|s| clip_descriptor(s.index, &s.motion, s.clip.clone()))
        .collect();
    let plan = plan_timeline(&clips)?;

    ensure_parent_dir(out)?;
    match &plan {
        TimelinePlan::Single { source, .. } => {
            std::fs::copy(source, out).with_context(|| {
                format!("copy '{}' to '{}'", source.display(), out.display())
            })?;
        }
        TimelinePlan::Crossfade { inputs, graph, .. } => {
            encoder
                .merge_clips(inputs, graph, out)
                .map_err(|e| e.in_stage("merge"))?;
        }
    }

    tracing::info!(
        total_duration = plan.total_duration(),
        codec = encoder.current_codec(),
        "slideshow exported"
    );

    Ok(ExportReport {
        output: out.to_path_buf(),
        slides,
        total_duration: plan.total_duration(),
        work_dir: settings
            .keep_intermediates
            .then(|| store.dir().to_path_buf()),
    })
}

/// Render one preview frame of slide `index` at normalized time `t` into `out` (PNG).
///
/// Styles are resolved for the whole slideshow so auto-styled slides match the export.
pub fn render_preview(
    show: &Slideshow,
    index: usize,
    t: f64,
    out: &Path,
    cycle: &mut AutoStyleCycle,
) -> KenBurnsResult<()> {
    show.validate()?;
    if !t.is_finite() {
        return Err(KenBurnsError::validation("preview time must be finite"));
    }
    let motions = show.resolve_motion(cycle);
    let (slide, motion) = show
        .slides
        .get(index)
        .zip(motions.get(index))
        .ok_or_else(|| {
            KenBurnsError::validation(format!(
                "slide index {index} out of range (slideshow has {} slides)",
                show.slides.len()
            ))
        })?;

    let settings = &show.settings;
    let source = load_source(&slide.path, settings.oversample)?;
    let generator = FrameSequenceGenerator::new(&source, motion, settings.canvas, settings.easing)?;
    ensure_parent_dir(out)?;
    generator.render_instant(t.clamp(0.0, 1.0), out)
}

fn render_slide(
    settings: &RenderSettings,
    store: &FrameStore,
    encoder: &mut FfmpegEncoder,
    index: usize,
    path: &Path,
    motion: MotionConfig,
) -> KenBurnsResult<SlideReport> {
    let source = load_source(path, settings.oversample)?;
    let generator = FrameSequenceGenerator::new(&source, &motion, settings.canvas, settings.easing)?;
    let batch = generator.render_sequence(
        store,
        index,
        motion.duration,
        settings.fps,
        &settings.threading,
    )?;

    let clip = store.clip_path(index);
    let codec = encoder.encode_clip(&batch.pattern, settings.fps, motion.duration, &clip)?;
    if !settings.keep_intermediates {
        store.release_batch(index)?;
    }

    tracing::info!(
        index,
        frames = batch.frame_count,
        style = ?motion.motion_style,
        codec = %codec,
        "slide encoded"
    );

    Ok(SlideReport {
        index,
        source: path.to_path_buf(),
        motion,
        frames: batch.frame_count,
        clip,
        codec,
    })
}

fn clip_descriptor(index: usize, motion: &MotionConfig, source: PathBuf) -> ClipDescriptor {
    ClipDescriptor {
        index,
        duration: motion.duration,
        fade_duration: motion.fade_duration,
        source,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
