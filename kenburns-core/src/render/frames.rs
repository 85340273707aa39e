use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    assets::raster::{SourceRaster, crop_and_fit},
    foundation::{
        core::{Canvas, Fps},
        error::{KenBurnsError, KenBurnsResult},
    },
    motion::{
        ease::CubicBezier,
        path::{MotionConfig, MotionPath, MotionState, frame_count, normalized_time},
        viewport::ViewportMetrics,
    },
    render::store::FrameStore,
};

/// Frame-level parallelism for one slide.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Rasterize a slide's frames on a rayon pool.
    pub parallel: bool,
    /// Worker count override (parallel mode only).
    pub threads: Option<usize>,
}

/// Frames written for one slide.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBatch {
    /// Slide index the frames belong to.
    pub image_index: usize,
    /// Number of frames written.
    pub frame_count: u64,
    /// Directory holding the frames.
    pub dir: PathBuf,
    /// ffmpeg image2 input pattern for the frames.
    pub pattern: PathBuf,
}

/// Rasterizes one slide's motion path over its oversampled source.
///
/// Every frame is an independent pure function of the shared source buffer and its normalized
/// time, so frames can be produced in any order.
#[derive(Debug)]
pub struct FrameSequenceGenerator<'a> {
    source: &'a SourceRaster,
    path: MotionPath,
    stage: Canvas,
}

impl<'a> FrameSequenceGenerator<'a> {
    /// Resolve the motion path of `config` against `source` on a `stage`-sized output.
    pub fn new(
        source: &'a SourceRaster,
        config: &MotionConfig,
        stage: Canvas,
        easing: CubicBezier,
    ) -> KenBurnsResult<Self> {
        let metrics = ViewportMetrics::fit_pixels(source.width(), source.height(), stage)
            .map_err(|e| KenBurnsError::image_read(&source.path, e.to_string()))?;
        Ok(Self {
            source,
            path: MotionPath::new(config, &metrics, easing),
            stage,
        })
    }

    /// The resolved motion path.
    pub fn path(&self) -> &MotionPath {
        &self.path
    }

    /// Motion state at normalized time `t`.
    pub fn state_at(&self, t: f64) -> MotionState {
        self.path.sample(t)
    }

    /// Render the frame at normalized time `t` (preview / thumbnail mode).
    pub fn render_at(&self, t: f64) -> RgbaImage {
        let state = self.path.sample(t);
        crop_and_fit(&self.source.pixels, &state.crop, self.stage)
    }

    /// Render the frame at `t` and write it as a PNG.
    pub fn render_instant(&self, t: f64, out: &Path) -> KenBurnsResult<()> {
        write_png(&self.render_at(t), out)
    }

    /// Render the full sequence for a `duration`-second clip into `store`.
    ///
    /// The slide's frame directory is cleared first, so leftovers from an aborted attempt never
    /// leak into the clip.
    #[tracing::instrument(skip_all, fields(image_index = image_index))]
    pub fn render_sequence(
        &self,
        store: &FrameStore,
        image_index: usize,
        duration: f64,
        fps: Fps,
        threading: &RenderThreading,
    ) -> KenBurnsResult<FrameBatch> {
        let total = frame_count(duration, fps);
        let dir = store.prepare_batch(image_index)?;

        let render_one = |frame: u64| -> KenBurnsResult<()> {
            let t = normalized_time(frame, total);
            write_png(&self.render_at(t), &store.frame_path(image_index, frame))
        };

        if threading.parallel {
            let pool = build_thread_pool(threading.threads)?;
            pool.install(|| (0..total).into_par_iter().try_for_each(render_one))?;
        } else {
            (0..total).try_for_each(render_one)?;
        }

        tracing::debug!(frames = total, dir = %dir.display(), "frame batch written");
        Ok(FrameBatch {
            image_index,
            frame_count: total,
            dir,
            pattern: store.frame_pattern(image_index),
        })
    }
}

fn write_png(frame: &RgbaImage, out: &Path) -> KenBurnsResult<()> {
    frame
        .save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write frame '{}'", out.display()))?;
    Ok(())
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> KenBurnsResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(KenBurnsError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        KenBurnsError::validation(format!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/frames.rs"]
mod tests;
