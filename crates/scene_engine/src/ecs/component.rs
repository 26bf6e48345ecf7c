//! Component trait and shared component plumbing
//!
//! A component is a unit of behavior attached to a scene node. Every hook a
//! component may implement is optional: the component advertises what it
//! supports through [`Capabilities`] and callers check the flag before
//! invoking the matching method.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use serde::{de::DeserializeOwned, Serialize};

use crate::ecs::container::ComponentHost;
use crate::render::primitives::CameraError;
use crate::scene::{NodeId, Scene};

/// Opaque serialized component payload
pub type ComponentData = serde_json::Value;

/// Shared handle to an attached component
///
/// The creator of a component keeps the allocation; a container only holds
/// a clone of the handle for as long as the component is attached. Instance
/// identity is pointer identity of the handle.
pub type ComponentRef = Rc<RefCell<dyn Component>>;

/// Set of resource names a component needs loaded
pub type ResourceSet = BTreeSet<String>;

/// Process-unique component instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
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

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Optional capabilities a component implements
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// `on_added_to_node` does something
        const ADDED_TO_NODE = 1 << 0;
        /// `on_removed_from_node` does something
        const REMOVED_FROM_NODE = 1 << 1;
        /// `on_added_to_scene` does something
        const ADDED_TO_SCENE = 1 << 2;
        /// `on_removed_from_scene` does something
        const REMOVED_FROM_SCENE = 1 << 3;
        /// `serialize` produces a payload
        const SERIALIZE = 1 << 4;
        /// `configure` accepts a payload
        const CONFIGURE = 1 << 5;
        /// `get_resources` reports resources
        const RESOURCES = 1 << 6;
        /// `invoke_action` handles the names reported by `has_action`
        const ACTIONS = 1 << 7;

        /// Both node lifecycle hooks
        const NODE_HOOKS = Self::ADDED_TO_NODE.bits() | Self::REMOVED_FROM_NODE.bits();
        /// Both serialization directions
        const PERSISTENT = Self::SERIALIZE.bits() | Self::CONFIGURE.bits();
    }
}

/// State every component carries: its identity and owning node
///
/// The owner is a non-owning back-reference written only by the component
/// container. Cloning a base yields a new, detached identity.
#[derive(Debug)]
pub struct ComponentBase {
    id: ComponentId,
    owner: Option<NodeId>,
}

impl ComponentBase {
    /// Create a detached base with a fresh identifier
    pub fn new() -> Self {
        Self {
            id: ComponentId::next(),
            owner: None,
        }
    }

    /// Instance identifier
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Node the component is attached to, if any
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<NodeId>) {
        self.owner = owner;
    }
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ComponentBase {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// A unit of behavior attachable to a scene node
///
/// Only `base`, `base_mut`, `type_name` and the `Any` accessors are required.
/// The remaining methods default to no-ops; a component that overrides one
/// must also report the matching flag from [`Component::capabilities`].
pub trait Component: Any + fmt::Debug {
    /// Shared identity/owner state
    fn base(&self) -> &ComponentBase;

    /// Mutable shared state
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Registered type name, compared by value for type identity
    fn type_name(&self) -> &'static str;

    /// Optional capabilities this component implements
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Instance identifier
    fn id(&self) -> ComponentId {
        self.base().id()
    }

    /// Node this component is attached to
    fn owner_node(&self) -> Option<NodeId> {
        self.base().owner()
    }

    /// Called after the owner is set and before the component joins the list
    fn on_added_to_node(&mut self, _node: &mut dyn ComponentHost) {}

    /// Called while the owner is still set, before the component leaves the list
    fn on_removed_from_node(&mut self, _node: &mut dyn ComponentHost) {}

    /// Called when the owning node enters a scene
    fn on_added_to_scene(&mut self, _scene: &mut Scene) {}

    /// Called when the owning node leaves a scene
    fn on_removed_from_scene(&mut self, _scene: &mut Scene) {}

    /// Produce a serialized payload
    fn serialize(&self) -> Result<ComponentData, ComponentError> {
        Ok(ComponentData::Null)
    }

    /// Apply a serialized payload to this instance
    fn configure(&mut self, _data: &ComponentData) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Add the resources this component needs to `resources`
    fn get_resources(&self, _resources: &mut ResourceSet) {}

    /// Whether this component exposes an action with the given name
    fn has_action(&self, _action: &str) -> bool {
        false
    }

    /// Run a named action
    fn invoke_action(&mut self, action: &str, _params: &ComponentData) -> Result<(), ComponentError> {
        Err(ComponentError::UnknownAction {
            type_name: self.type_name(),
            action: action.to_string(),
        })
    }

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A component type that can be registered and built from serialized data
pub trait ComponentType: Component + Sized {
    /// Name used in serialized data and by the registry
    const TYPE_NAME: &'static str;

    /// Construct a new instance from a payload
    fn from_data(data: &ComponentData) -> Result<Self, ComponentError>;
}

/// Wrap a component into a shared handle
///
/// The returned handle coerces to [`ComponentRef`] wherever one is expected
/// while keeping typed access for the caller.
pub fn shared<C: Component>(component: C) -> Rc<RefCell<C>> {
    Rc::new(RefCell::new(component))
}

/// Overlay a partial payload onto the serialized form of `current`
///
/// Fields present in an object `patch` replace the current values; missing
/// fields keep them. A `null` patch leaves everything unchanged.
pub fn merge_payload<T>(current: &T, patch: &ComponentData) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(current)?;
    match (patch, &mut merged) {
        (ComponentData::Object(fields), ComponentData::Object(base)) => {
            for (key, value) in fields {
                base.insert(key.clone(), value.clone());
            }
        }
        (ComponentData::Null, _) => {}
        (other, _) => return serde_json::from_value(other.clone()),
    }
    serde_json::from_value(merged)
}

/// Component errors
#[derive(thiserror::Error, Debug)]
pub enum ComponentError {
    /// The instance is already attached to a node
    #[error("component {id} ({type_name}) is already attached to a node")]
    DuplicateComponent {
        /// Instance that was attached twice
        id: ComponentId,
        /// Its type name
        type_name: &'static str,
    },

    /// No factory is registered under this name
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    /// A payload could not be decoded
    #[error("invalid data for component {type_name}: {source}")]
    InvalidData {
        /// Component type the payload was meant for
        type_name: &'static str,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },

    /// The component does not expose the requested action
    #[error("component {type_name} has no action named {action:?}")]
    UnknownAction {
        /// Component type the action was sent to
        type_name: &'static str,
        /// Requested action
        action: String,
    },

    /// A component of one type was given where another is required
    #[error("expected a {expected} component, got {found}")]
    TypeMismatch {
        /// Required type name
        expected: &'static str,
        /// Type name of the component that was given
        found: &'static str,
    },

    /// Camera rejected a parameter
    #[error(transparent)]
    Camera(#[from] CameraError),
}

impl ComponentError {
    /// Build an `InvalidData` error for component type `T`
    pub fn invalid_data<T: ComponentType>(source: serde_json::Error) -> Self {
        Self::InvalidData {
            type_name: T::TYPE_NAME,
            source,
        }
    }
}
