//! Built-in components

pub mod transform;
pub mod mesh_renderer;

pub use transform::{TransformComponent, TransformData};
pub use mesh_renderer::MeshRenderer;
