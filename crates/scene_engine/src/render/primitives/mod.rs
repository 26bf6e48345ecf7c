//! Core primitive types for rendering
//!
//! The camera component and the viewport it projects into.

pub mod camera;
pub mod viewport;

// Re-export commonly used types
pub use camera::{Camera, CameraData, CameraError, ProjectionType, Ray};
pub use viewport::{Viewport, ViewportProvider};
