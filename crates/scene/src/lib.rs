//! Scene tree state: entity play/pause, camera lifecycle, attribute routing.
//!
//! # Invariants
//! - Entity iteration order is deterministic (BTreeMap).
//! - The additive camera set is mutated only through [`CameraRig`]
//!   add/remove entry points, never by direct collection access.
//! - Host notifications are queued and drained; the scene never calls out.

pub mod attributes;
pub mod camera;
mod scene;

pub use attributes::{AttributeOwner, AttributeRouter};
pub use camera::{CameraDescriptor, CameraRig, OrthoProjection, ProjectionBounds};
pub use scene::{EntityState, RenderTargetId, Scene, SceneNotification};
