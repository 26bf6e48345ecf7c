//! Scene: node storage, component registry, viewport and active camera

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::ecs::component::{
    shared, Component, ComponentData, ComponentError, ComponentId, ComponentRef, ComponentType,
    ResourceSet,
};
use crate::ecs::container::{ComponentContainer, ComponentHost, ConfigureReport};
use crate::ecs::registry::ComponentRegistry;
use crate::render::primitives::{Camera, CameraData, CameraError, Viewport, ViewportProvider};
use crate::scene::node::{Node, NodeData, NodeId};

/// Serialized scene: every node in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    /// Node payloads
    #[serde(default)]
    pub nodes: Vec<NodeData>,
}

/// Flat collection of nodes plus the context their components need
///
/// The scene owns the component registry used to configure nodes, the
/// viewport cameras project into when no other is given, the parameters new
/// cameras start from, and the slot holding the active camera.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    registry: ComponentRegistry,
    viewport: Viewport,
    default_camera: CameraData,
    active_camera: Option<(ComponentId, ComponentRef)>,
}

impl Scene {
    /// Create an empty scene with the built-in component types registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene using the configured viewport and camera defaults
    ///
    /// Camera entries passed to [`Scene::configure`] start from
    /// `config.default_camera` and are overlaid with their payload.
    pub fn with_config(config: &SceneConfig) -> Self {
        let mut scene = Self {
            viewport: config.viewport,
            default_camera: config.default_camera.clone(),
            ..Self::default()
        };

        let defaults = config.default_camera.clone();
        scene.registry.register_factory(Camera::TYPE_NAME, move |data| {
            let mut camera = Camera::from_config(&defaults)?;
            camera.configure(data)?;
            let camera: ComponentRef = shared(camera);
            Ok(camera)
        });
        scene
    }

    /// Parameters new cameras start from
    pub fn default_camera_data(&self) -> &CameraData {
        &self.default_camera
    }

    /// Build a detached camera from the scene's camera defaults
    pub fn default_camera(&self) -> Result<Camera, CameraError> {
        Camera::from_config(&self.default_camera)
    }

    /// Registry used by [`Scene::configure`]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable registry, for registering custom component types
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Add a node and fire `on_added_to_scene` on its components
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        node.notify_added_to_scene(self);
        log::info!("Node {} ({}) added to scene", node.name(), id);
        self.nodes.push(node);
        id
    }

    /// Remove a node and fire `on_removed_from_scene` on its components
    ///
    /// The active camera is cleared if it is attached to this node.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let position = self.nodes.iter().position(|n| n.id() == id)?;
        let node = self.nodes.remove(position);
        node.notify_removed_from_scene(self);

        let owns_active = self
            .active_camera
            .as_ref()
            .is_some_and(|(_, active)| node.components().iter().any(|c| Rc::ptr_eq(c, active)));
        if owns_active {
            log::info!("Active camera left the scene with node {}", node.name());
            self.active_camera = None;
        }

        log::info!("Node {} ({}) removed from scene", node.name(), id);
        Some(node)
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Mutable node by id
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    /// First node with the given name
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Viewport used when projecting without an explicit one
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the scene viewport
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Camera component currently rendering the scene
    pub fn active_camera(&self) -> Option<ComponentRef> {
        self.active_camera.as_ref().map(|(_, camera)| Rc::clone(camera))
    }

    /// Id of the active camera
    pub fn active_camera_id(&self) -> Option<ComponentId> {
        self.active_camera.as_ref().map(|(id, _)| *id)
    }

    /// Make a camera component the active camera
    ///
    /// Accepts the untyped handles returned by the registry, by
    /// [`ConfigureReport::attached`] and by `Node::camera_component`. Fails
    /// with [`ComponentError::TypeMismatch`] if `camera` is not a [`Camera`].
    pub fn set_active_camera(&mut self, camera: &ComponentRef) -> Result<(), ComponentError> {
        let id = {
            let inner = camera.borrow();
            if !inner.as_any().is::<Camera>() {
                return Err(ComponentError::TypeMismatch {
                    expected: Camera::TYPE_NAME,
                    found: inner.type_name(),
                });
            }
            inner.id()
        };
        self.store_active_camera(id, Rc::clone(camera));
        Ok(())
    }

    pub(crate) fn store_active_camera(&mut self, id: ComponentId, camera: ComponentRef) {
        log::info!("Camera {} is now active", id);
        self.active_camera = Some((id, camera));
    }

    /// Clear the active camera slot
    pub fn clear_active_camera(&mut self) {
        self.active_camera = None;
    }

    /// Run `f` on the active camera
    ///
    /// Returns `None` when no camera is active.
    pub fn with_active_camera<R>(&self, f: impl FnOnce(&mut Camera) -> R) -> Option<R> {
        let (_, camera) = self.active_camera.as_ref()?;
        let mut inner = camera.borrow_mut();
        inner.as_any_mut().downcast_mut::<Camera>().map(f)
    }

    /// Dispatch an action to every component of every node
    ///
    /// Returns how many components handled it.
    pub fn process_action(&self, action: &str, params: &ComponentData) -> usize {
        self.nodes
            .iter()
            .map(|node| node.process_action_in_components(action, params))
            .sum()
    }

    /// Every resource the scene's components need
    pub fn collect_resources(&self) -> ResourceSet {
        let mut resources = ResourceSet::new();
        for node in &self.nodes {
            node.collect_resources(&mut resources);
        }
        resources
    }

    /// Snapshot all nodes
    pub fn serialize(&self) -> SceneData {
        SceneData {
            nodes: self.nodes.iter().map(Node::serialize).collect(),
        }
    }

    /// Build and add one node per entry of `data`
    ///
    /// Returns one report per node, in order.
    pub fn configure(&mut self, data: &SceneData) -> Vec<ConfigureReport> {
        let mut reports = Vec::with_capacity(data.nodes.len());
        for node_data in &data.nodes {
            let mut node = Node::new(node_data.name.clone().unwrap_or_else(|| "node".to_string()));
            reports.push(node.configure(node_data, &self.registry));
            self.add_node(node);
        }
        reports
    }
}

impl ViewportProvider for Scene {
    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::MeshRenderer;
    use crate::foundation::math::Vec3;
    use crate::render::primitives::ProjectionType;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_add_and_remove_node() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new("a"));
        assert_eq!(scene.nodes().len(), 1);
        assert_eq!(scene.find_node("a").map(Node::id), Some(id));

        let removed = scene.remove_node(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(scene.node(id).is_none());
        assert!(scene.remove_node(id).is_none());
    }

    #[test]
    fn test_active_camera_cleared_with_its_node() {
        let mut scene = Scene::new();
        let camera = shared(Camera::new());
        let mut node = Node::new("eye");
        node.add_component(camera.clone()).unwrap();
        let id = scene.add_node(node);

        Camera::set_active(&camera, &mut scene);
        assert!(Camera::is_active(&camera, &scene));

        scene.add_node(Node::new("other"));
        scene.remove_node(id);
        assert!(scene.active_camera().is_none());
        assert!(!Camera::is_active(&camera, &scene));
    }

    #[test]
    fn test_restored_camera_can_become_active() {
        let mut source = Scene::new();
        let mut rig = Node::new("rig");
        let eye = Vec3::new(0.0, 3.0, 8.0);
        rig.add_component(shared(Camera::perspective(eye, 60.0, 1.5, 0.1, 100.0).unwrap()))
            .unwrap();
        source.add_node(rig);

        let mut scene = Scene::new();
        let reports = scene.configure(&source.serialize());
        assert!(reports[0].is_clean());

        let camera = scene.nodes()[0].camera_component().unwrap();
        assert!(Rc::ptr_eq(&camera, &reports[0].attached[0]));
        scene.set_active_camera(&camera).unwrap();

        assert_eq!(scene.active_camera_id(), Some(camera.borrow().id()));
        assert_eq!(scene.with_active_camera(|c| c.eye()), Some(eye));
        let view_projection = scene.with_active_camera(Camera::view_projection_matrix).unwrap();
        assert!(view_projection.try_inverse().is_some());

        scene.clear_active_camera();
        assert!(scene.with_active_camera(|c| c.eye()).is_none());
    }

    #[test]
    fn test_only_cameras_can_become_active() {
        let mut scene = Scene::new();
        let node = Node::new("plain");
        let transform: ComponentRef = node.transform().unwrap();

        let result = scene.set_active_camera(&transform);
        assert!(matches!(
            result,
            Err(ComponentError::TypeMismatch { expected: "Camera", found: "Transform" })
        ));
        assert!(scene.active_camera().is_none());
    }

    #[test]
    fn test_config_camera_defaults_seed_new_cameras() {
        let config = SceneConfig {
            default_camera: CameraData {
                projection: ProjectionType::Orthographic,
                frustum_size: 24.0,
                near: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut scene = Scene::with_config(&config);

        let camera = scene.default_camera().unwrap();
        assert_eq!(camera.projection(), ProjectionType::Orthographic);
        assert_eq!(camera.frustum_size(), 24.0);
        assert_eq!(scene.default_camera_data(), &config.default_camera);

        // A partial payload is laid over the configured defaults
        let data = SceneData {
            nodes: vec![serde_json::from_value(json!({
                "name": "top",
                "components": [["Camera", { "eye": [0.0, 40.0, 1.0] }]]
            }))
            .unwrap()],
        };
        let reports = scene.configure(&data);
        assert!(reports[0].is_clean());

        let node = scene.find_node("top").unwrap();
        let restored = node
            .with_component::<Camera, _>(|c| (c.projection(), c.frustum_size(), c.eye()))
            .unwrap();
        assert_eq!(restored, (ProjectionType::Orthographic, 24.0, Vec3::new(0.0, 40.0, 1.0)));

        // A plain scene still uses the built-in defaults
        let mut plain = Scene::new();
        plain.configure(&data);
        assert_eq!(
            plain.nodes()[0].with_component::<Camera, _>(Camera::projection),
            Some(ProjectionType::Perspective)
        );
    }

    #[test]
    fn test_camera_projects_into_scene_viewport() {
        let mut scene = Scene::new();
        scene.set_viewport(Viewport::from_size(400.0, 200.0));

        let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, 2.0, 0.1, 50.0).unwrap();
        let pixel = camera.project(&Vec3::zeros(), &scene);
        assert_relative_eq!(pixel.x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_serialize_configure_roundtrip() {
        let mut scene = Scene::new();
        let mut node = Node::new("ship");
        node.add_component(shared(MeshRenderer::new("ship.obj"))).unwrap();
        scene.add_node(node);

        let data = scene.serialize();
        let mut restored = Scene::new();
        let reports = restored.configure(&data);

        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_clean());
        assert!(reports[0].transform_configured);
        assert_eq!(restored.serialize(), data);
        assert_eq!(restored.collect_resources().into_iter().collect::<Vec<_>>(), vec!["ship.obj"]);
    }
}
