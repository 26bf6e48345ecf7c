//! # Rendering Primitives
//!
//! The parts of rendering the scene layer owns: cameras with lazily cached
//! view/projection matrices and the viewports they map into. Drawing itself
//! happens in whichever backend consumes these matrices.

// Core primitives
pub mod primitives;

pub use primitives::{Camera, ProjectionType, Viewport};
