use glam::Mat4;
use serde::{Deserialize, Serialize};
use stagecraft_common::{EntityId, Quadrant};

/// Orthographic projection parameters for a camera descriptor.
///
/// The vertical extent is derived from the horizontal half-extent and the
/// effective aspect ratio, so a resize only needs to re-derive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthoProjection {
    /// Horizontal half-extent of the view volume.
    pub frustum: f32,
    pub near: f32,
    pub far: f32,
    pub fov: f32,
}

impl Default for OrthoProjection {
    fn default() -> Self {
        Self {
            frustum: 1.8,
            near: 0.005,
            far: 10000.0,
            fov: 80.0,
        }
    }
}

/// Derived orthographic view-volume bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl OrthoProjection {
    pub fn bounds(&self, aspect: f32) -> ProjectionBounds {
        ProjectionBounds {
            left: -self.frustum,
            right: self.frustum,
            top: self.frustum / aspect,
            bottom: -self.frustum / aspect,
        }
    }

    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let b = self.bounds(aspect);
        Mat4::orthographic_rh(b.left, b.right, b.bottom, b.top, self.near, self.far)
    }
}

/// Everything the compositor needs to know about one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    /// The entity carrying this camera.
    pub entity: EntityId,
    pub projection: OrthoProjection,
    /// Divisor of the backbuffer edge for this camera's sub-rectangle.
    pub viewport_divisor: f32,
    /// Which backbuffer corner the sub-rectangle anchors to.
    pub quadrant: Quadrant,
    /// Aspect override for the sub-rectangle; `None` divides the
    /// backbuffer height by the same divisor as the width.
    pub aspect: Option<f32>,
    /// Render this camera over the full backbuffer instead of a
    /// sub-rectangle.
    pub fullscreen: bool,
    /// Whether this camera participates in additive compositing.
    pub active: bool,
}

impl CameraDescriptor {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            projection: OrthoProjection::default(),
            viewport_divisor: 4.0,
            quadrant: Quadrant::TopLeft,
            aspect: None,
            fullscreen: false,
            active: false,
        }
    }

    /// The aspect ratio this camera projects with: the override when set
    /// and the camera is not fullscreen, else the window aspect.
    pub fn effective_aspect(&self, window_aspect: f32) -> f32 {
        match self.aspect {
            Some(aspect) if !self.fullscreen => aspect,
            _ => window_aspect,
        }
    }
}

/// Tracks the primary camera and the ordered additive camera set.
///
/// The additive set is mutated only through [`add_additive`] /
/// [`remove_additive`] (or the active-flag path [`sync_active`]), keeping
/// compositor iteration order equal to registration order.
///
/// [`add_additive`]: CameraRig::add_additive
/// [`remove_additive`]: CameraRig::remove_additive
/// [`sync_active`]: CameraRig::sync_active
#[derive(Debug)]
pub struct CameraRig {
    primary: Option<CameraDescriptor>,
    additive: Vec<CameraDescriptor>,
    window_aspect: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            primary: None,
            additive: Vec::new(),
            window_aspect: 16.0 / 9.0,
        }
    }
}

impl CameraRig {
    pub fn primary(&self) -> Option<&CameraDescriptor> {
        self.primary.as_ref()
    }

    pub fn primary_mut(&mut self) -> Option<&mut CameraDescriptor> {
        self.primary.as_mut()
    }

    pub fn set_primary(&mut self, descriptor: CameraDescriptor) {
        tracing::debug!(entity = %descriptor.entity, "primary camera set");
        self.primary = Some(descriptor);
    }

    pub fn clear_primary(&mut self) -> Option<CameraDescriptor> {
        self.primary.take()
    }

    /// Register an additive camera. Re-adding an entity already in the set
    /// is a no-op; registration order is preserved.
    pub fn add_additive(&mut self, descriptor: CameraDescriptor) {
        if self
            .additive
            .iter()
            .any(|c| c.entity == descriptor.entity)
        {
            tracing::trace!(entity = %descriptor.entity, "additive camera already registered");
            return;
        }
        tracing::debug!(entity = %descriptor.entity, "additive camera added");
        self.additive.push(descriptor);
    }

    /// Remove an additive camera by entity. Removing an absent entity is a
    /// no-op. Takes effect on the very next render call.
    pub fn remove_additive(&mut self, entity: EntityId) -> Option<CameraDescriptor> {
        let index = self.additive.iter().position(|c| c.entity == entity)?;
        tracing::debug!(entity = %entity, "additive camera removed");
        Some(self.additive.remove(index))
    }

    pub fn additive(&self) -> &[CameraDescriptor] {
        &self.additive
    }

    /// Apply an active-flag change. If the flag did not change this is a
    /// no-op; otherwise the camera is added to or removed from the
    /// additive set.
    pub fn sync_active(&mut self, descriptor: &CameraDescriptor, old_active: Option<bool>) {
        if old_active == Some(descriptor.active) {
            return;
        }
        if descriptor.active {
            self.add_additive(descriptor.clone());
        } else {
            self.remove_additive(descriptor.entity);
        }
    }

    pub fn window_aspect(&self) -> f32 {
        self.window_aspect
    }

    /// Update the window aspect used for cameras without an override.
    /// Called from the resize path before the next draw.
    pub fn set_window_aspect(&mut self, aspect: f32) {
        self.window_aspect = aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> CameraDescriptor {
        CameraDescriptor::new(EntityId::new())
    }

    #[test]
    fn projection_defaults() {
        let p = OrthoProjection::default();
        assert_eq!(p.frustum, 1.8);
        assert_eq!(p.near, 0.005);
        assert_eq!(p.far, 10000.0);
        assert_eq!(p.fov, 80.0);
    }

    #[test]
    fn bounds_derive_from_aspect() {
        let p = OrthoProjection::default();
        let b = p.bounds(2.0);
        assert_eq!(b.left, -1.8);
        assert_eq!(b.right, 1.8);
        assert_eq!(b.top, 0.9);
        assert_eq!(b.bottom, -0.9);
    }

    #[test]
    fn projection_matrix_is_finite() {
        let p = OrthoProjection::default();
        let m = p.matrix(16.0 / 9.0);
        assert!(m.is_finite());
    }

    #[test]
    fn aspect_override_ignored_when_fullscreen() {
        let mut d = descriptor();
        d.aspect = Some(2.0);
        assert_eq!(d.effective_aspect(1.5), 2.0);
        d.fullscreen = true;
        assert_eq!(d.effective_aspect(1.5), 1.5);
    }

    #[test]
    fn add_additive_deduplicates_by_entity() {
        let mut rig = CameraRig::default();
        let d = descriptor();
        rig.add_additive(d.clone());
        rig.add_additive(d);
        assert_eq!(rig.additive().len(), 1);
    }

    #[test]
    fn additive_order_is_registration_order() {
        let mut rig = CameraRig::default();
        let a = descriptor();
        let b = descriptor();
        let c = descriptor();
        rig.add_additive(a.clone());
        rig.add_additive(b.clone());
        rig.add_additive(c.clone());
        let order: Vec<EntityId> = rig.additive().iter().map(|d| d.entity).collect();
        assert_eq!(order, vec![a.entity, b.entity, c.entity]);

        rig.remove_additive(b.entity);
        let order: Vec<EntityId> = rig.additive().iter().map(|d| d.entity).collect();
        assert_eq!(order, vec![a.entity, c.entity]);
    }

    #[test]
    fn remove_absent_additive_is_noop() {
        let mut rig = CameraRig::default();
        assert!(rig.remove_additive(EntityId::new()).is_none());
    }

    #[test]
    fn sync_active_adds_and_removes() {
        let mut rig = CameraRig::default();
        let mut d = descriptor();
        d.active = true;
        rig.sync_active(&d, None);
        assert_eq!(rig.additive().len(), 1);

        // Unchanged flag: no-op even though the camera is registered.
        rig.sync_active(&d, Some(true));
        assert_eq!(rig.additive().len(), 1);

        d.active = false;
        rig.sync_active(&d, Some(true));
        assert!(rig.additive().is_empty());
    }
}
