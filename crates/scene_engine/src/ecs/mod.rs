//! Node component system
//!
//! Components are heterogeneous behaviors attached to scene nodes at
//! runtime. A node implements [`ComponentContainer`] to own an ordered
//! component list; the [`ComponentRegistry`] rebuilds components from
//! serialized data by type name.

pub mod component;
pub mod components;
pub mod container;
pub mod registry;

#[cfg(test)]
mod tests;

pub use component::{
    shared, Capabilities, Component, ComponentBase, ComponentData, ComponentError, ComponentId,
    ComponentRef, ComponentType, ResourceSet,
};
pub use container::{ComponentContainer, ComponentHost, ConfigureReport, ConfigureWarning};
pub use registry::ComponentRegistry;
