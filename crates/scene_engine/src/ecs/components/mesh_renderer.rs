//! Mesh renderer component
//!
//! Names the mesh and optional material a node is drawn with. The renderer
//! itself lives elsewhere; this component only carries the references and
//! reports them as resources to load.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{
    merge_payload, Capabilities, Component, ComponentBase, ComponentData, ComponentError,
    ComponentType, ResourceSet,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MeshRendererData {
    mesh: String,
    #[serde(default)]
    material: Option<String>,
}

/// Renderable mesh reference
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    base: ComponentBase,

    /// Mesh resource name
    pub mesh: String,

    /// Material resource name
    pub material: Option<String>,
}

impl MeshRenderer {
    /// Reference a mesh with the default material
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: Set material
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    fn to_data(&self) -> MeshRendererData {
        MeshRendererData {
            mesh: self.mesh.clone(),
            material: self.material.clone(),
        }
    }
}

impl Component for MeshRenderer {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::PERSISTENT | Capabilities::RESOURCES
    }

    fn serialize(&self) -> Result<ComponentData, ComponentError> {
        serde_json::to_value(self.to_data()).map_err(ComponentError::invalid_data::<Self>)
    }

    fn configure(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        let merged = merge_payload(&self.to_data(), data).map_err(ComponentError::invalid_data::<Self>)?;
        self.mesh = merged.mesh;
        self.material = merged.material;
        Ok(())
    }

    fn get_resources(&self, resources: &mut ResourceSet) {
        if !self.mesh.is_empty() {
            resources.insert(self.mesh.clone());
        }
        if let Some(material) = self.material.as_ref().filter(|m| !m.is_empty()) {
            resources.insert(material.clone());
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for MeshRenderer {
    const TYPE_NAME: &'static str = "MeshRenderer";

    fn from_data(data: &ComponentData) -> Result<Self, ComponentError> {
        let mut renderer = Self::default();
        renderer.configure(data)?;
        Ok(renderer)
    }
}
