//! Component container
//!
//! [`ComponentContainer`] is the mixin a scene node implements to own an
//! ordered list of attached components. It drives the attach/detach
//! lifecycle, bulk serialization and configuration, and by-name action
//! dispatch. Implementors only provide storage through [`ComponentHost`] and
//! [`ComponentContainer::components_mut`]; every operation is a provided
//! method.
//!
//! Hooks run while the component they belong to is mutably borrowed, so a
//! hook must not reach back into the component list and borrow itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ecs::component::{
    Capabilities, Component, ComponentData, ComponentError, ComponentId, ComponentRef,
    ComponentType, ResourceSet,
};
use crate::ecs::components::TransformComponent;
use crate::ecs::registry::ComponentRegistry;
use crate::scene::{NodeData, NodeId, Scene};

/// Node-side state visible to component hooks
pub trait ComponentHost {
    /// Identifier written into attached components as their owner
    fn node_id(&self) -> NodeId;

    /// Human readable node name
    fn node_name(&self) -> &str;

    /// Camera registered on this node
    fn camera(&self) -> Option<ComponentId>;

    /// Register or clear the node's camera
    fn set_camera(&mut self, camera: Option<ComponentId>);

    /// Node-owned transform, if the node has one
    fn transform(&self) -> Option<Rc<RefCell<TransformComponent>>>;

    /// Attached components in insertion order
    fn components(&self) -> &[ComponentRef];
}

/// Problems found while configuring components from serialized data
///
/// These never abort configuration; the offending entry is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureWarning {
    /// The entry names a type missing from the registry
    UnknownComponentType {
        /// Position of the entry in the serialized list
        index: usize,
        /// Name that failed to resolve
        type_name: String,
    },
    /// The type is known but its payload was rejected
    InvalidComponentData {
        /// Position of the entry in the serialized list
        index: usize,
        /// Component type of the entry
        type_name: String,
        /// Why the payload was rejected
        reason: String,
    },
}

impl fmt::Display for ConfigureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownComponentType { index, type_name } => {
                write!(f, "entry {index}: unknown component type {type_name:?}")
            }
            Self::InvalidComponentData { index, type_name, reason } => {
                write!(f, "entry {index}: invalid {type_name} data: {reason}")
            }
        }
    }
}

/// Outcome of [`ComponentContainer::configure_components`]
#[derive(Debug, Default)]
pub struct ConfigureReport {
    /// Components constructed and attached, in order
    pub attached: Vec<ComponentRef>,
    /// Whether the node transform was configured in place
    pub transform_configured: bool,
    /// Entries that were skipped
    pub warnings: Vec<ConfigureWarning>,
}

impl ConfigureReport {
    /// True when every entry was applied
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Ordered component storage with lifecycle management
pub trait ComponentContainer: ComponentHost + Sized {
    /// Mutable access to the component list
    fn components_mut(&mut self) -> &mut Vec<ComponentRef>;

    /// Attach a component and return it
    ///
    /// Fails with [`ComponentError::DuplicateComponent`] when the instance is
    /// already in this container or owned by any other node; the list is left
    /// untouched in that case. The owner is set before `on_added_to_node`
    /// runs and the component is appended after it.
    fn add_component(&mut self, component: ComponentRef) -> Result<ComponentRef, ComponentError> {
        let node_id = self.node_id();
        {
            let mut inner = component.borrow_mut();
            let attached_here = self.components().iter().any(|c| Rc::ptr_eq(c, &component));
            if attached_here || inner.owner_node().is_some() {
                return Err(ComponentError::DuplicateComponent {
                    id: inner.id(),
                    type_name: inner.type_name(),
                });
            }

            inner.base_mut().set_owner(Some(node_id));
            if inner.capabilities().contains(Capabilities::ADDED_TO_NODE) {
                inner.on_added_to_node(self);
            }
            log::debug!("Attached {} {} to node {}", inner.type_name(), inner.id(), node_id);
        }

        self.components_mut().push(Rc::clone(&component));
        Ok(component)
    }

    /// Detach a component
    ///
    /// Returns `None` and does nothing when the instance is not attached here.
    /// Otherwise `on_removed_from_node` runs while the owner is still set, then
    /// the owner is cleared and the instance leaves the list.
    fn remove_component(&mut self, component: &ComponentRef) -> Option<ComponentRef> {
        if !self.components().iter().any(|c| Rc::ptr_eq(c, component)) {
            return None;
        }

        {
            let mut inner = component.borrow_mut();
            if inner.capabilities().contains(Capabilities::REMOVED_FROM_NODE) {
                inner.on_removed_from_node(self);
            }
            inner.base_mut().set_owner(None);
            log::debug!("Detached {} {} from node {}", inner.type_name(), inner.id(), self.node_id());
        }

        let position = self.components().iter().position(|c| Rc::ptr_eq(c, component))?;
        Some(self.components_mut().remove(position))
    }

    /// Detach every component, front to back
    fn remove_all_components(&mut self) {
        while let Some(first) = self.components().first().cloned() {
            if self.remove_component(&first).is_none() {
                break;
            }
        }
    }

    /// First component whose type is exactly `T`
    fn get_component<T: ComponentType>(&self) -> Option<ComponentRef> {
        self.get_component_by_name(T::TYPE_NAME)
    }

    /// First component with the given registered type name
    fn get_component_by_name(&self, type_name: &str) -> Option<ComponentRef> {
        self.components()
            .iter()
            .find(|c| c.borrow().type_name() == type_name)
            .cloned()
    }

    /// Whether a component of type `T` is attached
    fn has_component<T: ComponentType>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Run `f` on the first component of type `T`
    fn with_component<T: ComponentType, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let component = self.get_component::<T>()?;
        let inner = component.borrow();
        inner.as_any().downcast_ref::<T>().map(f)
    }

    /// Run `f` on the first component of type `T` with mutable access
    fn with_component_mut<T: ComponentType, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let component = self.get_component::<T>()?;
        let mut inner = component.borrow_mut();
        inner.as_any_mut().downcast_mut::<T>().map(f)
    }

    /// Number of attached components
    fn component_count(&self) -> usize {
        self.components().len()
    }

    /// Write `(type_name, payload)` pairs for every serializable component
    ///
    /// Components without the `SERIALIZE` capability are skipped, as are
    /// components whose serialization fails (logged as a warning).
    fn serialize_components(&self, target: &mut NodeData) {
        target.components.clear();
        for component in self.components() {
            let inner = component.borrow();
            if !inner.capabilities().contains(Capabilities::SERIALIZE) {
                continue;
            }
            match inner.serialize() {
                Ok(data) => target.components.push((inner.type_name().to_string(), data)),
                Err(err) => log::warn!("Skipping {} {} during serialization: {}", inner.type_name(), inner.id(), err),
            }
        }
    }

    /// Rebuild components from serialized data
    ///
    /// A `Transform` entry at index 0 configures the node's own transform in
    /// place. Every other entry is constructed through `registry` and
    /// attached. Unknown types and rejected payloads are logged, recorded in
    /// the report and skipped.
    fn configure_components(&mut self, data: &NodeData, registry: &ComponentRegistry) -> ConfigureReport {
        let mut report = ConfigureReport::default();

        for (index, (type_name, payload)) in data.components.iter().enumerate() {
            if index == 0 && type_name == TransformComponent::TYPE_NAME {
                if let Some(transform) = self.transform() {
                    let configured = transform.borrow_mut().configure(payload);
                    match configured {
                        Ok(()) => report.transform_configured = true,
                        Err(err) => {
                            log::warn!("Node {}: could not configure transform: {}", self.node_id(), err);
                            report.warnings.push(ConfigureWarning::InvalidComponentData {
                                index,
                                type_name: type_name.clone(),
                                reason: err.to_string(),
                            });
                        }
                    }
                    continue;
                }
                log::debug!("Node {} has no transform, attaching a new one", self.node_id());
            }

            let component = match registry.create(type_name, payload) {
                Ok(component) => component,
                Err(ComponentError::UnknownComponentType(name)) => {
                    log::warn!("Unknown component found: {}", name);
                    report.warnings.push(ConfigureWarning::UnknownComponentType {
                        index,
                        type_name: name,
                    });
                    continue;
                }
                Err(err) => {
                    log::warn!("Skipping {} entry {}: {}", type_name, index, err);
                    report.warnings.push(ConfigureWarning::InvalidComponentData {
                        index,
                        type_name: type_name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            match self.add_component(component) {
                Ok(component) => report.attached.push(component),
                Err(err) => {
                    log::warn!("Skipping {} entry {}: {}", type_name, index, err);
                    report.warnings.push(ConfigureWarning::InvalidComponentData {
                        index,
                        type_name: type_name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Invoke the action named `action` on every component that exposes it
    ///
    /// Components without the action are skipped. A failing action is logged
    /// and does not stop dispatch. Returns how many components ran it.
    fn process_action_in_components(&self, action: &str, params: &ComponentData) -> usize {
        let mut handled = 0;
        for component in self.components() {
            let mut inner = component.borrow_mut();
            if !inner.capabilities().contains(Capabilities::ACTIONS) || !inner.has_action(action) {
                continue;
            }
            match inner.invoke_action(action, params) {
                Ok(()) => handled += 1,
                Err(err) => log::warn!("Action {:?} failed on {} {}: {}", action, inner.type_name(), inner.id(), err),
            }
        }
        handled
    }

    /// Gather the resources every attached component needs
    fn collect_resources(&self, resources: &mut ResourceSet) {
        for component in self.components() {
            let inner = component.borrow();
            if inner.capabilities().contains(Capabilities::RESOURCES) {
                inner.get_resources(resources);
            }
        }
    }

    /// Fire `on_added_to_scene` on capable components
    fn notify_added_to_scene(&self, scene: &mut Scene) {
        for component in self.components() {
            let mut inner = component.borrow_mut();
            if inner.capabilities().contains(Capabilities::ADDED_TO_SCENE) {
                inner.on_added_to_scene(scene);
            }
        }
    }

    /// Fire `on_removed_from_scene` on capable components
    fn notify_removed_from_scene(&self, scene: &mut Scene) {
        for component in self.components() {
            let mut inner = component.borrow_mut();
            if inner.capabilities().contains(Capabilities::REMOVED_FROM_SCENE) {
                inner.on_removed_from_scene(scene);
            }
        }
    }
}
