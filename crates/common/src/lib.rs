//! Shared types for the stagecraft scene framework.
//!
//! # Invariants
//! - `EntityId` is `Ord` so BTreeMap-keyed stores iterate deterministically.
//! - Geometry types carry no behavior beyond derivation; nothing here owns
//!   frame or renderer state.

pub mod geometry;
pub mod types;

pub use geometry::{CanvasSize, MaxCanvasSize, Quadrant, ViewportRect};
pub use types::{EntityId, Transform};
