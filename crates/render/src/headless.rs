use stagecraft_common::{CanvasSize, ViewportRect};
use stagecraft_scene::{CameraDescriptor, RenderTargetId, Scene};

use crate::backend::{RenderBackend, RenderPass};

/// Headless render backend: records every pass and can render a
/// human-readable frame summary.
///
/// Stands in for the GPU library in tests, the CLI, and anywhere a real
/// surface is unavailable. The trait is stable; swap in a GPU
/// implementation without changing consumers.
#[derive(Debug)]
pub struct HeadlessBackend {
    size: CanvasSize,
    pixel_ratio: f64,
    viewport: ViewportRect,
    clear_color: [f32; 4],
    passes: Vec<RenderPass>,
}

impl HeadlessBackend {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            pixel_ratio: 1.0,
            viewport: ViewportRect::full(size),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            passes: Vec::new(),
        }
    }

    /// Passes recorded since the last [`take_passes`](Self::take_passes).
    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    /// Drain and return the recorded passes.
    pub fn take_passes(&mut self) -> Vec<RenderPass> {
        std::mem::take(&mut self.passes)
    }

    /// Current viewport, as last set by the compositor.
    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    /// Render a text summary of the recorded passes and scene state.
    pub fn summary(&self, scene: &Scene) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame (backbuffer={}, pixel_ratio={:.2}) ===\n",
            self.size, self.pixel_ratio
        ));
        out.push_str(&format!("Entities: {}\n", scene.entity_count()));
        for (i, pass) in self.passes.iter().enumerate() {
            let v = pass.viewport;
            out.push_str(&format!(
                "  pass {} camera={} viewport=({:.0}, {:.0}, {:.0}, {:.0})\n",
                i, pass.camera, v.x, v.y, v.width, v.height
            ));
        }
        for (id, data) in scene.entities() {
            let p = data.transform.position;
            let name = data.name.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "  [{}] {} pos=({:.2}, {:.2}, {:.2})\n",
                id, name, p.x, p.y, p.z
            ));
        }
        out
    }
}

impl RenderBackend for HeadlessBackend {
    fn set_size(&mut self, size: CanvasSize, _update_style: bool) {
        tracing::debug!(%size, "backend resized");
        self.size = size;
        self.viewport = ViewportRect::full(size);
    }

    fn size(&self) -> CanvasSize {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.viewport = rect;
    }

    fn render(
        &mut self,
        _scene: &Scene,
        camera: &CameraDescriptor,
        target: Option<RenderTargetId>,
        force_clear: bool,
    ) {
        tracing::trace!(camera = %camera.entity, viewport = ?self.viewport, "pass recorded");
        self.passes.push(RenderPass {
            camera: camera.entity,
            viewport: self.viewport,
            target,
            force_clear,
        });
    }

    fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }
}
