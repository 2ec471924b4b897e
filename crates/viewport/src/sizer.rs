use serde::{Deserialize, Serialize};
use stagecraft_common::{CanvasSize, MaxCanvasSize};

/// Layout measurements the sizer works from, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    /// Window/body layout size.
    pub window_size: (f64, f64),
    /// Layout box of the canvas's parent container (embedded mode).
    pub container_size: (f64, f64),
    /// Device pixel ratio.
    pub pixel_ratio: f64,
}

impl SurfaceMetrics {
    /// Metrics for a non-embedded surface filling the window.
    pub fn window(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            window_size: (width, height),
            container_size: (width, height),
            pixel_ratio,
        }
    }
}

/// Compute the canvas/backbuffer size for the current layout.
///
/// Embedded scenes take their container's box. Otherwise the window size
/// is used, clamped so that `size * pixel_ratio` stays within `max` while
/// preserving the window aspect ratio. In VR the device dictates the
/// backbuffer, so the window size passes through unclamped.
///
/// The clamp applies the width cap first, recomputes height from the
/// original aspect, then applies the height cap against the updated
/// height. When both axes exceed their caps this under-corrects relative
/// to a simultaneous solve; the two-step order is the observed contract.
pub fn compute_canvas_size(
    metrics: &SurfaceMetrics,
    embedded: bool,
    max: MaxCanvasSize,
    vr_active: bool,
) -> CanvasSize {
    if embedded && !vr_active {
        let (w, h) = metrics.container_size;
        return rounded(w, h);
    }

    let (mut width, mut height) = metrics.window_size;
    if vr_active || max.is_uncapped() {
        return rounded(width, height);
    }

    let ratio = if metrics.pixel_ratio.is_finite() && metrics.pixel_ratio > 0.0 {
        metrics.pixel_ratio
    } else {
        1.0
    };

    if width * ratio < f64::from(max.width) && height * ratio < f64::from(max.height) {
        return rounded(width, height);
    }

    let aspect = width / height;

    if width * ratio > f64::from(max.width) && max.width != -1 {
        width = (f64::from(max.width) / ratio).round();
        height = (f64::from(max.width) / aspect / ratio).round();
    }

    if height * ratio > f64::from(max.height) && max.height != -1 {
        height = (f64::from(max.height) / ratio).round();
        width = (f64::from(max.height) * aspect / ratio).round();
    }

    rounded(width, height)
}

fn rounded(width: f64, height: f64) -> CanvasSize {
    let w = if width.is_finite() { width.round() } else { 1.0 };
    let h = if height.is_finite() { height.round() } else { 1.0 };
    CanvasSize::new(w.max(1.0) as u32, h.max(1.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max(width: i32, height: i32) -> MaxCanvasSize {
        MaxCanvasSize { width, height }
    }

    #[test]
    fn embedded_returns_container_box() {
        let metrics = SurfaceMetrics {
            window_size: (1920.0, 1080.0),
            container_size: (640.0, 360.0),
            pixel_ratio: 2.0,
        };
        let size = compute_canvas_size(&metrics, true, MaxCanvasSize::default(), false);
        assert_eq!(size, CanvasSize::new(640, 360));
    }

    #[test]
    fn embedded_is_overridden_by_vr() {
        let metrics = SurfaceMetrics {
            window_size: (1920.0, 1080.0),
            container_size: (640.0, 360.0),
            pixel_ratio: 1.0,
        };
        let size = compute_canvas_size(&metrics, true, MaxCanvasSize::default(), true);
        assert_eq!(size, CanvasSize::new(1920, 1080));
    }

    #[test]
    fn uncapped_sentinel_ignores_pixel_ratio() {
        for ratio in [1.0, 2.0, 3.5] {
            let metrics = SurfaceMetrics::window(2560.0, 1440.0, ratio);
            let size = compute_canvas_size(&metrics, false, MaxCanvasSize::UNCAPPED, false);
            assert_eq!(size, CanvasSize::new(2560, 1440));
        }
    }

    #[test]
    fn vr_returns_window_size_unclamped() {
        let metrics = SurfaceMetrics::window(3000.0, 2000.0, 2.0);
        let size = compute_canvas_size(&metrics, false, max(1920, 1920), true);
        assert_eq!(size, CanvasSize::new(3000, 2000));
    }

    #[test]
    fn below_cap_passes_through() {
        let metrics = SurfaceMetrics::window(1280.0, 720.0, 1.0);
        let size = compute_canvas_size(&metrics, false, max(1920, 1920), false);
        assert_eq!(size, CanvasSize::new(1280, 720));
    }

    #[test]
    fn width_clamp_rescales_height() {
        let metrics = SurfaceMetrics::window(2000.0, 1000.0, 1.0);
        let size = compute_canvas_size(&metrics, false, max(1920, 1920), false);
        assert_eq!(size, CanvasSize::new(1920, 960));
    }

    #[test]
    fn pixel_ratio_scales_the_cap() {
        let metrics = SurfaceMetrics::window(1000.0, 800.0, 2.0);
        let size = compute_canvas_size(&metrics, false, max(1920, 1920), false);
        // 1000 * 2 exceeds 1920: width 1920/2 = 960, height follows the
        // 1.25 aspect.
        assert_eq!(size, CanvasSize::new(960, 768));
    }

    #[test]
    fn both_axes_clamped_keeps_aspect() {
        let metrics = SurfaceMetrics::window(4000.0, 3000.0, 1.0);
        let size = compute_canvas_size(&metrics, false, max(1920, 1080), false);
        // Width clamp gives 1920x1440; the height check then reads the
        // updated 1440 and clamps to 1080, rescaling width.
        assert_eq!(size, CanvasSize::new(1440, 1080));
    }

    #[test]
    fn single_axis_uncapped_still_clamps_the_other() {
        let metrics = SurfaceMetrics::window(2000.0, 4000.0, 1.0);
        let size = compute_canvas_size(&metrics, false, max(-1, 1920), false);
        assert_eq!(size, CanvasSize::new(960, 1920));
    }

    #[test]
    fn clamp_preserves_aspect_within_rounding() {
        let windows = [
            (2000.0, 1000.0),
            (2560.0, 1440.0),
            (3440.0, 1440.0),
            (1234.0, 777.0),
            (4096.0, 2160.0),
        ];
        for (w, h) in windows {
            for ratio in [1.0, 1.5, 2.0] {
                let metrics = SurfaceMetrics::window(w, h, ratio);
                let size = compute_canvas_size(&metrics, false, max(1920, 1920), false);
                let source_aspect = w / h;
                let out_aspect = f64::from(size.width) / f64::from(size.height);
                assert!(
                    (out_aspect - source_aspect).abs() < source_aspect * 0.01,
                    "aspect drifted: {w}x{h} @{ratio} -> {size}"
                );
                assert!(size.width >= 1 && size.height >= 1);
            }
        }
    }

    #[test]
    fn degenerate_container_floors_at_one() {
        let metrics = SurfaceMetrics {
            window_size: (1920.0, 1080.0),
            container_size: (0.0, 0.0),
            pixel_ratio: 1.0,
        };
        let size = compute_canvas_size(&metrics, true, MaxCanvasSize::default(), false);
        assert_eq!(size, CanvasSize::new(1, 1));
    }
}
