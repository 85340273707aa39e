use super::*;
use crate::{
    composition::manifest::Slide,
    encode::ffmpeg::is_ffmpeg_available,
    foundation::core::{Canvas, Fps},
    motion::path::MotionStyle,
};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "kenburns_pipeline_{name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_image(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 128, 255])
    })
    .save(path)
    .unwrap();
}

fn small_show(dir: &Path, slides: usize) -> Slideshow {
    let mut show = Slideshow::default();
    show.settings.canvas = Canvas::new(64, 36).unwrap();
    show.settings.fps = Fps::new(10, 1).unwrap();
    show.settings.oversample = 1;
    show.settings.encoder.hardware_codec = None;
    show.settings.work_dir = Some(dir.join("work"));
    for i in 0..slides {
        let path = dir.join(format!("slide_{i}.png"));
        write_image(&path, 96 + 16 * i as u32, 64);
        show.slides.push(Slide {
            duration: Some(0.5),
            fade_duration: Some(0.2),
            ..Slide::new(path)
        });
    }
    show
}

#[test]
fn plan_resolves_motion_frames_and_timeline() {
    let mut show = Slideshow::default();
    for _ in 0..3 {
        show.slides.push(Slide {
            duration: Some(6.0),
            fade_duration: Some(0.5),
            ..Slide::new("img.png")
        });
    }
    let plan = plan_slideshow(&show, &mut AutoStyleCycle::default()).unwrap();
    assert_eq!(plan.frames, [180, 180, 180]);
    let styles: Vec<MotionStyle> = plan.motions.iter().map(|m| m.motion_style).collect();
    assert_eq!(
        styles,
        [MotionStyle::ZoomIn, MotionStyle::ZoomOut, MotionStyle::ZoomIn]
    );
    assert!((plan.timeline.total_duration() - 17.0).abs() < 1e-9);
    match &plan.timeline {
        TimelinePlan::Crossfade { inputs, .. } => {
            assert_eq!(inputs[2], PathBuf::from("clip_002.mp4"));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn empty_slideshow_cannot_be_planned_or_exported() {
    let show = Slideshow::default();
    assert!(matches!(
        plan_slideshow(&show, &mut AutoStyleCycle::default()),
        Err(KenBurnsError::Composition(_))
    ));
    assert!(matches!(
        export_slideshow(&show, Path::new("out.mp4"), &mut AutoStyleCycle::default()),
        Err(KenBurnsError::Composition(_))
    ));
}

#[test]
fn preview_writes_a_stage_sized_png() {
    let dir = scratch("preview");
    let show = small_show(&dir, 2);
    let out = dir.join("nested").join("preview.png");
    render_preview(&show, 1, 0.5, &out, &mut AutoStyleCycle::default()).unwrap();
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (64, 36));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn preview_rejects_out_of_range_slides() {
    let dir = scratch("preview_range");
    let show = small_show(&dir, 1);
    let err = render_preview(&show, 3, 0.0, &dir.join("p.png"), &mut AutoStyleCycle::default())
        .unwrap_err();
    assert!(matches!(err, KenBurnsError::Validation(_)), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn preview_of_missing_image_is_an_image_read_error() {
    let mut show = Slideshow::default();
    show.slides.push(Slide::new("/definitely/missing.png"));
    let err = render_preview(
        &show,
        0,
        0.0,
        &std::env::temp_dir().join("kenburns_never_written.png"),
        &mut AutoStyleCycle::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KenBurnsError::ImageRead { .. }), "{err}");
}

#[test]
fn export_merges_clips_with_ffmpeg() {
    if !is_ffmpeg_available(Path::new("ffmpeg")) {
        return;
    }
    let dir = scratch("export");
    let show = small_show(&dir, 2);
    let out = dir.join("out").join("show.mp4");
    let report = match export_slideshow(&show, &out, &mut AutoStyleCycle::default()) {
        Ok(r) => r,
        // ffmpeg without libx264.
        Err(e) if e.is_encoder_unavailable() => return,
        Err(e) => panic!("export failed: {e}"),
    };
    assert!(out.exists());
    assert_eq!(report.slides.len(), 2);
    assert_eq!(report.slides[0].frames, 5);
    assert_eq!(report.slides[1].codec, "libx264");
    assert!((report.total_duration - 0.8).abs() < 1e-9);
    assert_eq!(report.work_dir, None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_names_the_failing_slide() {
    if !is_ffmpeg_available(Path::new("ffmpeg")) {
        return;
    }
    let dir = scratch("export_missing");
    let mut show = small_show(&dir, 1);
    show.slides.push(Slide::new(dir.join("missing.png")));
    let err = export_slideshow(&show, &dir.join("o.mp4"), &mut AutoStyleCycle::default())
        .unwrap_err();
    if err.is_encoder_unavailable() {
        return;
    }
    assert!(matches!(err, KenBurnsError::ImageRead { .. }), "{err}");
    assert!(err.to_string().contains("slide 1"), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}
