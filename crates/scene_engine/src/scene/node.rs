//! Scene node
//!
//! A node is a named component container. Nodes built with [`Node::new`]
//! carry their own transform at index 0 of the component list.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::ecs::component::{shared, Component, ComponentData, ComponentId, ComponentRef};
use crate::ecs::components::TransformComponent;
use crate::ecs::container::{ComponentContainer, ComponentHost, ConfigureReport};
use crate::ecs::registry::ComponentRegistry;

/// Process-unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh identifier
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw identifier value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Serialized node: its name and ordered `(type_name, payload)` pairs
///
/// Serializes as `{"name": "...", "components": [["Transform", {...}], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node name
    #[serde(default)]
    pub name: Option<String>,
    /// Components in attachment order
    #[serde(default)]
    pub components: Vec<(String, ComponentData)>,
}

/// Named component container
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    transform: Option<Rc<RefCell<TransformComponent>>>,
    camera: Option<ComponentId>,
    components: Vec<ComponentRef>,
}

impl Node {
    /// Create a node with an identity transform at index 0
    pub fn new(name: impl Into<String>) -> Self {
        let mut node = Self::without_transform(name);

        let transform = shared(TransformComponent::identity());
        transform.borrow_mut().base_mut().set_owner(Some(node.id));
        node.components.push(transform.clone());
        node.transform = Some(transform);
        node
    }

    /// Create a node with no components at all
    pub fn without_transform(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: None,
            camera: None,
            components: Vec::new(),
        }
    }

    /// Node identifier
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The component registered in the node's camera slot
    pub fn camera_component(&self) -> Option<ComponentRef> {
        let camera = self.camera?;
        self.components
            .iter()
            .find(|c| c.try_borrow().is_ok_and(|c| c.id() == camera))
            .cloned()
    }

    /// Snapshot the node name and its serializable components
    pub fn serialize(&self) -> NodeData {
        let mut data = NodeData {
            name: Some(self.name.clone()),
            components: Vec::new(),
        };
        self.serialize_components(&mut data);
        data
    }

    /// Apply serialized data: rename if a name is given, then configure components
    pub fn configure(&mut self, data: &NodeData, registry: &ComponentRegistry) -> ConfigureReport {
        if let Some(name) = &data.name {
            self.name = name.clone();
        }
        let report = self.configure_components(data, registry);
        if !report.is_clean() {
            log::warn!("Node {} configured with {} skipped entries", self.name, report.warnings.len());
        }
        report
    }
}

impl ComponentHost for Node {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn node_name(&self) -> &str {
        &self.name
    }

    fn camera(&self) -> Option<ComponentId> {
        self.camera
    }

    fn set_camera(&mut self, camera: Option<ComponentId>) {
        self.camera = camera;
    }

    // A transform detached with remove_component no longer counts
    fn transform(&self) -> Option<Rc<RefCell<TransformComponent>>> {
        self.transform
            .as_ref()
            .filter(|t| t.try_borrow().map_or(true, |t| t.owner_node() == Some(self.id)))
            .cloned()
    }

    fn components(&self) -> &[ComponentRef] {
        &self.components
    }
}

impl ComponentContainer for Node {
    fn components_mut(&mut self) -> &mut Vec<ComponentRef> {
        &mut self.components
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        // Release ownership so the instances can be attached elsewhere
        for component in &self.components {
            if let Ok(mut component) = component.try_borrow_mut() {
                component.base_mut().set_owner(None);
            }
        }
    }
}
