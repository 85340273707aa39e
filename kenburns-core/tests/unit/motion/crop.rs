use super::*;
use crate::{
    foundation::core::Canvas,
    motion::transform::{FocusPoint, resolve_transform},
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn hd(w: f64, h: f64) -> ViewportMetrics {
    ViewportMetrics::fit(w, h, Canvas::HD).unwrap()
}

fn crop_for(m: &ViewportMetrics, focus: FocusPoint, zoom: f64) -> CropRect {
    project_crop(&resolve_transform(Some(focus), m, zoom), m)
}

#[test]
fn unit_zoom_crops_the_full_image() {
    for (w, h) in [
        (1920.0, 1080.0),
        (4000.0, 3000.0),
        (3000.0, 1000.0),
        (500.0, 2000.0),
        (3840.0, 2160.0),
    ] {
        let m = hd(w, h);
        for focus in [
            FocusPoint::CENTER,
            FocusPoint::new(0.0, 0.0),
            FocusPoint::new(30.0, 70.0),
        ] {
            let c = crop_for(&m, focus, 1.0);
            assert!(approx(c.left, 0.0), "{w}x{h} {focus:?}: {c:?}");
            assert!(approx(c.top, 0.0));
            assert!(approx(c.width, w));
            assert!(approx(c.height, h));
        }
    }
}

#[test]
fn centered_zoom_crops_the_middle() {
    let m = hd(1920.0, 1080.0);
    let c = crop_for(&m, FocusPoint::CENTER, 2.0);
    assert!(approx(c.left, 480.0));
    assert!(approx(c.top, 270.0));
    assert!(approx(c.width, 960.0));
    assert!(approx(c.height, 540.0));
}

#[test]
fn extreme_focus_stays_flush_with_source_edges() {
    let m = hd(1920.0, 1080.0);
    let c = crop_for(&m, FocusPoint::new(0.0, 0.0), 2.0);
    assert!(approx(c.left, 0.0) && approx(c.top, 0.0));

    let c = crop_for(&m, FocusPoint::new(100.0, 100.0), 2.0);
    assert!(approx(c.right(), 1920.0));
    assert!(approx(c.bottom(), 1080.0));
}

#[test]
fn letterboxed_axis_keeps_full_extent() {
    let m = hd(4000.0, 3000.0);
    let c = crop_for(&m, FocusPoint::new(0.0, 50.0), 1.2);
    assert!(approx(c.left, 0.0));
    assert!(approx(c.width, 4000.0));
    assert!(approx(c.top, 250.0));
    assert!(approx(c.height, 2500.0));
}

#[test]
fn crops_stay_inside_source_for_any_focus_and_zoom() {
    let sources = [
        (1920.0, 1080.0),
        (4000.0, 3000.0),
        (3000.0, 1000.0),
        (500.0, 2000.0),
        (6000.0, 4000.0),
    ];
    let focuses = [-50.0, 0.0, 1.0, 12.5, 50.0, 87.0, 99.9, 100.0, 250.0];
    for (w, h) in sources {
        let m = hd(w, h);
        for &fx in &focuses {
            for &fy in &focuses {
                for zoom in [1.0001, 1.05, 1.3, 2.0, 4.0, 16.0] {
                    let c = crop_for(&m, FocusPoint::new(fx, fy), zoom);
                    assert!(c.left >= 0.0 && c.top >= 0.0, "{c:?}");
                    assert!(c.right() <= w + 1e-6, "{w}x{h} ({fx},{fy})@{zoom}: {c:?}");
                    assert!(c.bottom() <= h + 1e-6, "{w}x{h} ({fx},{fy})@{zoom}: {c:?}");
                    assert!(c.width > 0.0 && c.height > 0.0);
                }
            }
        }
    }
}

#[test]
fn lerp_interpolates_each_field() {
    let a = CropRect {
        left: 0.0,
        top: 10.0,
        width: 100.0,
        height: 50.0,
    };
    let b = CropRect {
        left: 20.0,
        top: 30.0,
        width: 50.0,
        height: 25.0,
    };
    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
    let mid = a.lerp(&b, 0.5);
    assert_eq!(
        mid,
        CropRect {
            left: 10.0,
            top: 20.0,
            width: 75.0,
            height: 37.5
        }
    );
}

#[test]
fn snapping_grows_to_whole_pixels() {
    let c = CropRect {
        left: 10.4,
        top: 3.9,
        width: 100.2,
        height: 50.0,
    };
    assert_eq!(
        c.snap_to_pixels(1000, 1000),
        PixelRect {
            x: 10,
            y: 3,
            width: 101,
            height: 51
        }
    );
}

#[test]
fn snapping_clamps_to_raster_and_keeps_one_pixel() {
    let c = CropRect {
        left: 95.5,
        top: -3.0,
        width: 20.0,
        height: 0.0001,
    };
    let p = c.snap_to_pixels(100, 80);
    assert_eq!(p.x, 95);
    assert_eq!(p.width, 5);
    assert_eq!(p.y, 0);
    assert_eq!(p.height, 1);

    let past_end = CropRect {
        left: 150.0,
        top: 0.0,
        width: 10.0,
        height: 10.0,
    };
    let p = past_end.snap_to_pixels(100, 80);
    assert_eq!((p.x, p.width), (99, 1));
}

#[test]
fn snapping_ignores_float_noise_on_exact_edges() {
    let c = CropRect {
        left: 1e-12,
        top: 0.0,
        width: 1920.0 + 1e-10,
        height: 1080.0 - 1e-10,
    };
    assert_eq!(
        c.snap_to_pixels(1920, 1080),
        PixelRect {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080
        }
    );
}

#[test]
fn interior_edges_near_integers_do_not_grow_a_pixel() {
    let c = CropRect {
        left: 3.0 - 1e-9,
        top: 7.0 + 1e-9,
        width: 37.0 + 2e-9,
        height: 20.0 - 2e-9,
    };
    assert_eq!(
        c.snap_to_pixels(100, 100),
        PixelRect {
            x: 3,
            y: 7,
            width: 37,
            height: 20
        }
    );
}

#[test]
fn interpolated_edges_snap_to_their_intended_pixels() {
    let a = CropRect {
        left: 0.0,
        top: 0.0,
        width: 90.0,
        height: 90.0,
    };
    let b = CropRect {
        left: 30.0,
        top: 30.0,
        width: 60.0,
        height: 60.0,
    };
    // 30 * 0.1 and friends are not exact in binary floating point.
    let c = a.lerp(&b, 0.1);
    assert_eq!(
        c.snap_to_pixels(100, 100),
        PixelRect {
            x: 3,
            y: 3,
            width: 87,
            height: 87
        }
    );
}
