use serde::{Deserialize, Serialize};
use stagecraft_common::{CanvasSize, EntityId, Transform};
use std::collections::BTreeMap;

use crate::attributes::AttributeRouter;
use crate::camera::CameraRig;

/// Handle to an offscreen render target owned by the backend.
/// `None` on the scene means the backend draws to its default backbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTargetId(pub u64);

/// A notification queued for the host, drained via
/// [`Scene::drain_notifications`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNotification {
    /// The drawing surface exists; the render loop may be started.
    RenderTargetReady,
    /// A resize was applied to the backend.
    RendererResize { size: CanvasSize },
    /// The first frame has drawn.
    RenderStart,
}

/// Per-entity data stored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
    pub transform: Transform,
    /// Whether per-frame behaviors owned by this entity run.
    pub playing: bool,
    pub name: Option<String>,
}

impl Default for EntityState {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            playing: true,
            name: None,
        }
    }
}

/// The scene tree state consumed by the frame loop.
///
/// Entities here carry only what the loop needs: a transform, a play flag
/// gating their behaviors, and an optional name. Mesh/material/asset state
/// belongs to the external rendering library, not this core.
#[derive(Debug, Default)]
pub struct Scene {
    entities: BTreeMap<EntityId, EntityState>,
    cameras: CameraRig,
    attributes: AttributeRouter,
    notifications: Vec<SceneNotification>,
    render_target: Option<RenderTargetId>,
    surface_ready: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity with the given transform. New entities are playing.
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(
            id,
            EntityState {
                transform,
                ..EntityState::default()
            },
        );
        id
    }

    /// Remove an entity. Returns its data if it existed.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityState> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityState> {
        self.entities.get_mut(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a human-readable name to an entity.
    pub fn set_name(&mut self, id: EntityId, name: impl Into<String>) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.name = Some(name.into());
        }
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, EntityState> {
        &self.entities
    }

    /// Whether the entity exists and is currently playing.
    /// Missing entities are not playing; their behaviors are skipped.
    pub fn is_playing(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.playing)
    }

    pub fn play_entity(&mut self, id: EntityId) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.playing = true;
        }
    }

    pub fn pause_entity(&mut self, id: EntityId) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.playing = false;
        }
    }

    pub fn cameras(&self) -> &CameraRig {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraRig {
        &mut self.cameras
    }

    pub fn attributes(&self) -> &AttributeRouter {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeRouter {
        &mut self.attributes
    }

    pub fn render_target(&self) -> Option<RenderTargetId> {
        self.render_target
    }

    pub fn set_render_target(&mut self, target: Option<RenderTargetId>) {
        self.render_target = target;
    }

    /// Mark the drawing surface as available. Queues `RenderTargetReady`
    /// the first time only.
    pub fn mark_surface_ready(&mut self) {
        if self.surface_ready {
            return;
        }
        self.surface_ready = true;
        self.notify(SceneNotification::RenderTargetReady);
    }

    pub fn surface_ready(&self) -> bool {
        self.surface_ready
    }

    /// Queue a notification for the host.
    pub fn notify(&mut self, notification: SceneNotification) {
        self.notifications.push(notification);
    }

    /// Drain and return all queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<SceneNotification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn notifications(&self) -> &[SceneNotification] {
        &self.notifications
    }
}
