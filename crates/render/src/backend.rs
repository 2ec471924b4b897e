use serde::{Deserialize, Serialize};
use stagecraft_common::{CanvasSize, EntityId, ViewportRect};
use stagecraft_scene::{CameraDescriptor, RenderTargetId, Scene};

/// One issued render pass, as the backend saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPass {
    pub camera: EntityId,
    pub viewport: ViewportRect,
    pub target: Option<RenderTargetId>,
    pub force_clear: bool,
}

/// The drawing interface the frame loop talks to.
///
/// The compositor sets a viewport, then issues a pass; passes with
/// `force_clear = false` retain what earlier passes drew. Sizing and
/// pixel ratio are pushed from the resize path and the scheduler.
pub trait RenderBackend {
    /// Resize the backbuffer. `update_style` mirrors the DOM-side flag of
    /// the original interface; headless backends ignore it.
    fn set_size(&mut self, size: CanvasSize, update_style: bool);

    /// Current backbuffer size.
    fn size(&self) -> CanvasSize;

    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    /// Set the viewport for the next pass, in backbuffer pixels.
    fn set_viewport(&mut self, rect: ViewportRect);

    /// Draw the scene through `camera` into `target` (or the default
    /// backbuffer) using the previously set viewport.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &CameraDescriptor,
        target: Option<RenderTargetId>,
        force_clear: bool,
    );

    fn clear_color(&self) -> [f32; 4];

    fn set_clear_color(&mut self, color: [f32; 4]);
}
