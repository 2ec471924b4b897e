//! Canvas sizing math and the renderer resize path.
//!
//! # Invariants
//! - Sizer output is integral and positive on both axes.
//! - Clamping preserves the source aspect ratio within rounding.
//! - Width-cap is applied before height-cap, and the height check reads
//!   the already-clamped height; this two-step order is the contract.
//! - Resizes that arrive before the camera or surface exist are no-ops.

mod resize;
mod sizer;

pub use resize::{VrMode, apply_resize};
pub use sizer::{SurfaceMetrics, compute_canvas_size};

pub fn crate_info() -> &'static str {
    "stagecraft-viewport v0.1.0"
}
