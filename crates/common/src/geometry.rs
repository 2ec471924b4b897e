use serde::{Deserialize, Serialize};

/// Integral canvas/backbuffer size in physical pixels. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Maximum backbuffer size cap. -1 on an axis means that axis is uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxCanvasSize {
    pub width: i32,
    pub height: i32,
}

impl MaxCanvasSize {
    pub const UNCAPPED: Self = Self {
        width: -1,
        height: -1,
    };

    pub fn is_uncapped(&self) -> bool {
        self.width == -1 && self.height == -1
    }
}

impl Default for MaxCanvasSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1920,
        }
    }
}

/// Which corner of the backbuffer an additive camera's rectangle anchors to.
///
/// The numbering matches the wire value of the `viewportPosition` camera
/// attribute: 0 top-left, 1 top-right, 2 bottom-right, 3 bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quadrant {
    #[default]
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Quadrant {
    /// Parse a wire index; out-of-range values fall back to top-left.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::TopRight,
            2 => Self::BottomRight,
            3 => Self::BottomLeft,
            _ => Self::TopLeft,
        }
    }
}

/// A sub-rectangle of the backbuffer, in backbuffer pixels.
///
/// Derived per render pass and per resize; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full-backbuffer viewport for a given canvas size.
    pub fn full(size: CanvasSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
        }
    }
}
