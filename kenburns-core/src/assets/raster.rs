use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{RgbaImage, imageops::FilterType};

use crate::{
    foundation::{
        core::Canvas,
        error::{KenBurnsError, KenBurnsResult},
    },
    motion::crop::CropRect,
};

/// Kernel used for oversampling and for the final crop resample.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Largest edge an oversampled raster may reach; larger factors are reduced.
pub const MAX_OVERSAMPLED_EDGE: u32 = 16_384;

// Float noise tolerated when comparing crop extents against whole pixels.
const FIT_EPSILON: f64 = 1e-6;

/// Stage fill behind letterboxed frames.
const LETTERBOX_RGBA: [u8; 4] = [0, 0, 0, 255];

/// A decoded, oversampled source image.
#[derive(Clone, Debug)]
pub struct SourceRaster {
    /// File the pixels were decoded from.
    pub path: PathBuf,
    /// Decoded width before oversampling.
    pub original_width: u32,
    /// Decoded height before oversampling.
    pub original_height: u32,
    /// Oversampling factor actually applied.
    pub oversample: u32,
    /// Straight-alpha RGBA8 pixels at `original × oversample`.
    pub pixels: Arc<RgbaImage>,
}

impl SourceRaster {
    /// Oversampled width.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Oversampled height.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Read and decode `path`, then oversample it once by `oversample` (≥ 1).
#[tracing::instrument(skip_all, fields(path = %path.display(), oversample = oversample))]
pub fn load_source(path: &Path, oversample: u32) -> KenBurnsResult<SourceRaster> {
    let bytes =
        std::fs::read(path).map_err(|e| KenBurnsError::image_read(path, e.to_string()))?;
    let decoded = decode_image(&bytes).map_err(|msg| KenBurnsError::image_read(path, msg))?;
    let (original_width, original_height) = decoded.dimensions();

    let factor = effective_oversample(original_width, original_height, oversample);
    if factor != oversample.max(1) {
        tracing::warn!(
            requested = oversample,
            applied = factor,
            "oversampling reduced to stay within raster limits"
        );
    }
    let pixels = oversample_image(&decoded, factor);
    tracing::debug!(
        width = pixels.width(),
        height = pixels.height(),
        "source prepared"
    );

    Ok(SourceRaster {
        path: path.to_path_buf(),
        original_width,
        original_height,
        oversample: factor,
        pixels: Arc::new(pixels),
    })
}

/// Decode encoded image bytes to straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, String> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err("image has no readable dimensions".to_string());
    }
    Ok(rgba)
}

fn effective_oversample(width: u32, height: u32, requested: u32) -> u32 {
    let edge = width.max(height).max(1);
    requested.clamp(1, (MAX_OVERSAMPLED_EDGE / edge).max(1))
}

/// Upscale by an integer factor with [`RESAMPLE_FILTER`]; factor 1 copies.
pub fn oversample_image(img: &RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return img.clone();
    }
    image::imageops::resize(
        img,
        img.width() * factor,
        img.height() * factor,
        RESAMPLE_FILTER,
    )
}

/// Cut `crop` out of `src` and resample it onto a `stage`-sized frame.
///
/// The crop is grown to whole pixels first. On an axis where the crop is narrower than the
/// source, the region is stretched to the full stage extent, absorbing the sub-pixel aspect
/// drift the snapping introduces. Only an axis where the crop spans the whole source (the
/// source is too narrow for the stage's aspect there) is fitted and centred on black.
pub fn crop_and_fit(src: &RgbaImage, crop: &CropRect, stage: Canvas) -> RgbaImage {
    let rect = crop.snap_to_pixels(src.width(), src.height());
    let region = image::imageops::crop_imm(src, rect.x, rect.y, rect.width, rect.height).to_image();

    let scale = (stage.width_f64() / crop.width).min(stage.height_f64() / crop.height);
    let out_w = if spans_source(crop.width, src.width()) {
        fit_dimension(crop.width * scale, stage.width)
    } else {
        stage.width
    };
    let out_h = if spans_source(crop.height, src.height()) {
        fit_dimension(crop.height * scale, stage.height)
    } else {
        stage.height
    };
    let resized = image::imageops::resize(&region, out_w, out_h, RESAMPLE_FILTER);

    if out_w == stage.width && out_h == stage.height {
        return resized;
    }

    let mut frame = RgbaImage::from_pixel(stage.width, stage.height, image::Rgba(LETTERBOX_RGBA));
    let x = i64::from((stage.width - out_w) / 2);
    let y = i64::from((stage.height - out_h) / 2);
    image::imageops::overlay(&mut frame, &resized, x, y);
    frame
}

// The crop was capped at the source size on this axis.
fn spans_source(extent: f64, natural: u32) -> bool {
    extent >= f64::from(natural) - FIT_EPSILON
}

// Snap near-integers so a stage-shaped crop never loses a column to float noise.
fn fit_dimension(v: f64, limit: u32) -> u32 {
    let rounded = (v - FIT_EPSILON).ceil().max(1.0) as u32;
    rounded.min(limit)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
