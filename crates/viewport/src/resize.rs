use stagecraft_common::CanvasSize;
use stagecraft_render::{RenderBackend, RendererConfig};
use stagecraft_scene::{Scene, SceneNotification};

use crate::sizer::{SurfaceMetrics, compute_canvas_size};

/// VR state relevant to sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VrMode {
    pub active: bool,
    /// A headset session is presenting; its eye parameters own the
    /// backbuffer size.
    pub presenting: bool,
}

impl VrMode {
    pub const NONE: Self = Self {
        active: false,
        presenting: false,
    };
}

/// Apply a resize to the backend and camera state.
///
/// Returns the applied size, or `None` when the resize was ignored:
/// before the primary camera or drawing surface exist, or while a VR
/// session is presenting. The new size is in effect before the next draw
/// call; a `RendererResize` notification is queued for the host.
pub fn apply_resize(
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
    metrics: &SurfaceMetrics,
    config: &RendererConfig,
    vr: VrMode,
) -> Option<CanvasSize> {
    // Resize events can arrive before the camera system or the canvas
    // are up; that is expected, not an error.
    if scene.cameras().primary().is_none() || !scene.surface_ready() {
        tracing::trace!("resize ignored: camera or surface not ready");
        return None;
    }
    if vr.active && vr.presenting {
        tracing::trace!("resize ignored: VR presenting");
        return None;
    }

    let embedded = config.embedded && !vr.active;
    let size = compute_canvas_size(metrics, embedded, config.max_canvas_size(), vr.active);

    scene.cameras_mut().set_window_aspect(size.aspect());
    backend.set_size(size, false);
    scene.notify(SceneNotification::RendererResize { size });
    tracing::debug!(%size, embedded, "resize applied");
    Some(size)
}
