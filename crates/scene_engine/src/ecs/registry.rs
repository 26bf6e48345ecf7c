//! Component type registry
//!
//! Maps the type names found in serialized data to factories that build a
//! fresh component from its payload. The registry is an ordinary value owned
//! by the scene and passed to whoever configures components.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ecs::component::{ComponentData, ComponentError, ComponentRef, ComponentType};
use crate::ecs::components::{MeshRenderer, TransformComponent};
use crate::render::primitives::Camera;

type Factory = Box<dyn Fn(&ComponentData) -> Result<ComponentRef, ComponentError>>;

/// Name to constructor mapping for component types
pub struct ComponentRegistry {
    factories: HashMap<String, Factory>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the engine's component types
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.register::<TransformComponent>();
        registry.register::<Camera>();
        registry.register::<MeshRenderer>();
        registry
    }

    /// Register `T` under its type name
    ///
    /// Returns `true` if an existing registration was replaced.
    pub fn register<T: ComponentType>(&mut self) -> bool {
        self.register_factory(T::TYPE_NAME, |data| {
            let component: ComponentRef = Rc::new(RefCell::new(T::from_data(data)?));
            Ok(component)
        })
    }

    /// Register a custom factory under `type_name`
    ///
    /// Returns `true` if an existing registration was replaced.
    pub fn register_factory<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&ComponentData) -> Result<ComponentRef, ComponentError> + 'static,
    {
        let type_name = type_name.into();
        log::trace!("Registering component type {}", type_name);
        self.factories.insert(type_name, Box::new(factory)).is_some()
    }

    /// Remove a registration
    pub fn unregister(&mut self, type_name: &str) -> bool {
        self.factories.remove(type_name).is_some()
    }

    /// Whether `type_name` resolves
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Build a new component of `type_name` from `data`
    pub fn create(&self, type_name: &str, data: &ComponentData) -> Result<ComponentRef, ComponentError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| ComponentError::UnknownComponentType(type_name.to_string()))?;
        factory(data)
    }

    /// Registered names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
