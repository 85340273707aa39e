use std::path::PathBuf;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kenburns_raster_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 128, 255])
    })
}

#[test]
fn missing_file_is_an_image_read_error() {
    let path = scratch_dir("missing").join("nope.png");
    let err = load_source(&path, 2).unwrap_err();
    match err {
        KenBurnsError::ImageRead { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn undecodable_file_is_an_image_read_error() {
    let path = scratch_dir("garbage").join("garbage.jpg");
    std::fs::write(&path, b"definitely not a jpeg").unwrap();
    let err = load_source(&path, 1).unwrap_err();
    assert!(matches!(err, KenBurnsError::ImageRead { .. }));
    assert!(err.to_string().contains("garbage.jpg"));
}

#[test]
fn load_applies_oversampling_once() {
    let path = scratch_dir("oversample").join("src.png");
    gradient(8, 6).save(&path).unwrap();

    let src = load_source(&path, 2).unwrap();
    assert_eq!((src.original_width, src.original_height), (8, 6));
    assert_eq!((src.width(), src.height()), (16, 12));
    assert_eq!(src.oversample, 2);

    let plain = load_source(&path, 0).unwrap();
    assert_eq!(plain.oversample, 1);
    assert_eq!((plain.width(), plain.height()), (8, 6));
}

#[test]
fn oversampling_is_capped_for_huge_sources() {
    assert_eq!(effective_oversample(4000, 3000, 2), 2);
    assert_eq!(effective_oversample(10_000, 3000, 2), 1);
    assert_eq!(effective_oversample(2000, 1000, 16), 8);
    assert_eq!(effective_oversample(100, 100, 0), 1);
}

fn crop(left: f64, top: f64, width: f64, height: f64) -> CropRect {
    CropRect {
        left,
        top,
        width,
        height,
    }
}

#[test]
fn stage_shaped_crop_fills_the_frame() {
    let src = gradient(320, 180);
    let stage = Canvas::new(64, 36).unwrap();
    let frame = crop_and_fit(&src, &crop(80.0, 45.0, 160.0, 90.0), stage);
    assert_eq!(frame.dimensions(), (64, 36));
    // No letterbox: corners carry image content, not the opaque black fill.
    assert_ne!(frame.get_pixel(0, 0).0, LETTERBOX_RGBA);
}

#[test]
fn fractional_upscale_crop_fills_the_frame() {
    let src = RgbaImage::from_pixel(64, 36, image::Rgba([90, 140, 200, 255]));
    let stage = Canvas::new(128, 72).unwrap();
    // Snaps to 31x18, a wider aspect than the 16:9 stage.
    let frame = crop_and_fit(&src, &crop(10.4, 7.7, 29.9, 16.82), stage);
    assert_eq!(frame.dimensions(), (128, 72));
    for (x, y) in [(0, 0), (127, 0), (0, 71), (127, 71), (64, 0), (0, 36)] {
        assert_ne!(frame.get_pixel(x, y).0, LETTERBOX_RGBA, "({x}, {y})");
    }
}

#[test]
fn off_aspect_crop_is_letterboxed_and_centred() {
    let src = RgbaImage::from_pixel(100, 100, image::Rgba([200, 10, 10, 255]));
    let stage = Canvas::new(64, 32).unwrap();
    let frame = crop_and_fit(&src, &crop(0.0, 0.0, 100.0, 100.0), stage);
    assert_eq!(frame.dimensions(), (64, 32));
    assert_eq!(frame.get_pixel(0, 16).0, LETTERBOX_RGBA);
    assert_eq!(frame.get_pixel(63, 16).0, LETTERBOX_RGBA);
    let centre = frame.get_pixel(32, 16).0;
    assert!(centre[0] > 150 && centre[1] < 60);
}

#[test]
fn only_the_axis_spanning_the_source_is_letterboxed() {
    let src = RgbaImage::from_pixel(100, 100, image::Rgba([200, 10, 10, 255]));
    let stage = Canvas::new(64, 32).unwrap();

    // Width capped at the source, height cropped: 100x80 fits as 40x32.
    let frame = crop_and_fit(&src, &crop(0.0, 10.0, 100.0, 80.0), stage);
    assert_eq!(frame.get_pixel(5, 16).0, LETTERBOX_RGBA);
    assert_ne!(frame.get_pixel(32, 0).0, LETTERBOX_RGBA);
    assert_ne!(frame.get_pixel(32, 31).0, LETTERBOX_RGBA);

    // Width capped and the crop already stage-shaped: no bars at all.
    let frame = crop_and_fit(&src, &crop(0.0, 25.0, 100.0, 50.0), stage);
    assert_ne!(frame.get_pixel(0, 16).0, LETTERBOX_RGBA);
    assert_ne!(frame.get_pixel(63, 16).0, LETTERBOX_RGBA);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"\x89PNG nope").is_err());
}
