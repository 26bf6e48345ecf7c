//! # Scene Engine
//!
//! Runtime composition of scene nodes from components, and a camera
//! component whose view/projection matrices are cached and rebuilt lazily.
//!
//! ## Features
//!
//! - **Component Containers**: ordered, identity-checked attachment with lifecycle hooks
//! - **Registry-driven Configuration**: nodes rebuilt from `(type name, payload)` pairs
//! - **Lazy Camera Matrices**: a single dirty flag guards view, projection and model
//! - **Config Files**: TOML and RON scene settings
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = Scene::new();
//! let camera = shared(Camera::new());
//!
//! let mut node = Node::new("main camera");
//! node.add_component(camera.clone()).expect("fresh component");
//! scene.add_node(node);
//! Camera::set_active(&camera, &mut scene);
//!
//! let view_projection = camera.borrow_mut().view_projection_matrix();
//! assert!(view_projection.try_inverse().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            shared, Capabilities, Component, ComponentContainer, ComponentData, ComponentError,
            ComponentHost, ComponentRef, ComponentRegistry, ComponentType, ConfigureReport,
            ConfigureWarning,
            components::{MeshRenderer, TransformComponent},
        },
        foundation::math::{Mat4, Quat, Vec3},
        render::primitives::{Camera, CameraData, CameraError, ProjectionType, Ray, Viewport, ViewportProvider},
        scene::{Node, NodeData, NodeId, Scene, SceneData},
    };
}
