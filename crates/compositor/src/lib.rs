//! Multi-camera viewport compositing over a shared backbuffer.
//!
//! # Invariants
//! - The primary camera always draws first, over the full backbuffer.
//! - Additive cameras draw in registration order into derived
//!   sub-rectangles; no pass clears what earlier passes drew.
//! - Rectangles may overlap or leave gaps; this is an overlay compositor,
//!   not a tiler.

use stagecraft_common::{CanvasSize, Quadrant, ViewportRect};
use stagecraft_render::RenderBackend;
use stagecraft_scene::{CameraDescriptor, Scene};

/// Compute the backbuffer sub-rectangle for an additive camera.
///
/// Width is the backbuffer width over the camera's divisor; height honors
/// the aspect override when present, else divides the backbuffer height
/// the same way. Fullscreen cameras, and cameras with an unusable
/// divisor, take the full backbuffer.
pub fn additive_viewport(backbuffer: CanvasSize, camera: &CameraDescriptor) -> ViewportRect {
    let divisor = camera.viewport_divisor;
    if camera.fullscreen || !divisor.is_finite() || divisor <= 0.0 {
        if !camera.fullscreen {
            tracing::warn!(
                camera = %camera.entity,
                divisor,
                "unusable viewport divisor; falling back to full backbuffer"
            );
        }
        return ViewportRect::full(backbuffer);
    }

    let bb_width = backbuffer.width as f32;
    let bb_height = backbuffer.height as f32;
    let width = bb_width / divisor;
    let height = match camera.aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => width / aspect,
        _ => bb_height / divisor,
    };
    let (x, y) = match camera.quadrant {
        Quadrant::TopLeft => (0.0, 0.0),
        Quadrant::TopRight => (bb_width - width, 0.0),
        Quadrant::BottomRight => (bb_width - width, bb_height - height),
        Quadrant::BottomLeft => (0.0, bb_height - height),
    };
    ViewportRect::new(x, y, width, height)
}

pub fn crate_info() -> &'static str {
    "stagecraft-compositor v0.1.0"
}

/// Issues the per-camera render passes for one frame.
#[derive(Debug, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Draw the frame: one full-backbuffer pass for the primary camera,
    /// then one pass per additive camera in registration order. Returns
    /// the number of passes issued; zero means the draw was skipped
    /// because no primary camera exists.
    pub fn render(&self, scene: &Scene, backend: &mut dyn RenderBackend) -> usize {
        let Some(primary) = scene.cameras().primary() else {
            tracing::trace!("draw skipped: no primary camera");
            return 0;
        };
        let target = scene.render_target();

        backend.set_viewport(ViewportRect::full(backend.size()));
        backend.render(scene, primary, target, false);
        let mut passes = 1;

        for camera in scene.cameras().additive() {
            let rect = additive_viewport(backend.size(), camera);
            backend.set_viewport(rect);
            backend.render(scene, camera, target, false);
            passes += 1;
        }
        passes
    }
}
