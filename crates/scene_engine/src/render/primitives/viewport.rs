//! Viewport rectangle and the provider abstraction used by the camera
//!
//! Projection helpers take any [`ViewportProvider`]. A [`Viewport`] provides
//! itself; a [`crate::scene::Scene`] provides its current viewport, which
//! stands in for the window system's "current rendering viewport".

use serde::{Deserialize, Serialize};

/// Pixel rectangle `[x, y, width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: f32,
    /// Bottom edge in pixels
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport anchored at the origin
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Width over height, or 1.0 for an empty viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether the rectangle has a usable area
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Pixel center of the rectangle
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_size(1280.0, 720.0)
    }
}

/// Source of the viewport a projection maps into
pub trait ViewportProvider {
    /// Current viewport rectangle
    fn viewport(&self) -> Viewport;
}

impl ViewportProvider for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}
