//! # Camera Component
//!
//! View and projection configuration attached to a scene node, exposing
//! view/projection matrices that are recomputed lazily.
//!
//! ## Cache invariant
//! The four cached matrices (`view`, `projection`, `view_projection`,
//! `model`) are written only by [`Camera::update_matrices`]. While the dirty
//! flag is clear they equal a fresh recomputation from the current
//! parameters; every setter that may change a parameter raises the flag, and
//! every matrix accessor recomputes first when it is raised.
//!
//! ## Coordinate System
//! Right-handed, Y-up, column vectors. The camera looks down view-space -Z
//! and clip-space depth spans [-1, 1] (OpenGL convention).

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{
    merge_payload, Capabilities, Component, ComponentBase, ComponentData, ComponentError,
    ComponentRef, ComponentType,
};
use crate::ecs::components::TransformComponent;
use crate::ecs::container::ComponentHost;
use crate::foundation::math::{constants, utils, Iso3, Mat4, Mat4Ext, Point3, Vec3, Vec4};
use crate::render::primitives::viewport::ViewportProvider;
use crate::scene::Scene;

/// Camera projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionType {
    /// Perspective projection driven by `fov`
    #[default]
    Perspective,
    /// Orthographic projection driven by `frustum_size`
    Orthographic,
}

/// Serializable camera parameters
///
/// Missing fields take the camera defaults, so partial payloads and config
/// files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraData {
    /// Projection model
    #[serde(rename = "type")]
    pub projection: ProjectionType,
    /// Camera position
    pub eye: Vec3,
    /// Point the camera looks at
    pub center: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Width over height
    pub aspect: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Height of the orthographic box
    pub frustum_size: f32,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            projection: ProjectionType::Perspective,
            eye: Vec3::new(0.0, 100.0, 100.0),
            center: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            near: 1.0,
            far: 1000.0,
            aspect: 1.0,
            fov: 45.0,
            frustum_size: 50.0,
        }
    }
}

impl CameraData {
    /// Check that these parameters produce usable matrices
    pub fn validate(&self) -> Result<(), CameraError> {
        let scalars = [
            ("near", self.near),
            ("far", self.far),
            ("aspect", self.aspect),
            ("fov", self.fov),
            ("frustum_size", self.frustum_size),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(CameraError::invalid(name, format!("{value} is not finite")));
            }
        }
        let vectors = [("eye", &self.eye), ("center", &self.center), ("up", &self.up)];
        for (name, value) in vectors {
            if value.iter().any(|c| !c.is_finite()) {
                return Err(CameraError::invalid(name, "has a non-finite component"));
            }
        }
        let front = self.center - self.eye;
        if front.norm() <= constants::EPSILON {
            return Err(CameraError::invalid("center", "coincides with eye"));
        }
        if front.normalize().cross(&self.up).norm() <= constants::EPSILON {
            return Err(CameraError::invalid("up", "is zero or parallel to the view direction"));
        }

        if self.near >= self.far {
            return Err(CameraError::invalid(
                "near",
                format!("near ({}) must be less than far ({})", self.near, self.far),
            ));
        }
        if self.aspect <= 0.0 {
            return Err(CameraError::invalid("aspect", format!("{} must be positive", self.aspect)));
        }
        match self.projection {
            ProjectionType::Perspective => {
                if self.near <= 0.0 {
                    return Err(CameraError::invalid(
                        "near",
                        format!("{} must be positive for a perspective projection", self.near),
                    ));
                }
                if self.fov <= 0.0 || self.fov >= 180.0 {
                    return Err(CameraError::invalid("fov", format!("{} is outside (0, 180)", self.fov)));
                }
            }
            ProjectionType::Orthographic => {
                if self.frustum_size <= 0.0 {
                    return Err(CameraError::invalid(
                        "frustum_size",
                        format!("{} must be positive", self.frustum_size),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Camera errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// A parameter would produce a degenerate projection
    #[error("invalid camera parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter that was rejected
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Rotation axis has zero length
    #[error("rotation axis has zero length")]
    DegenerateAxis,

    /// The view-projection matrix cannot be inverted
    #[error("view-projection matrix is not invertible")]
    NotInvertible,
}

impl CameraError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Half-line from `origin` along a unit `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Point at distance `t` along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Camera component with lazily cached matrices
///
/// Every setter validates its input and leaves the camera untouched on
/// error. Scalar setters raise the dirty flag only when the value changes.
/// Vector setters (`set_eye`, `set_center`, `set_up`, `look_at`) raise it
/// unconditionally.
#[derive(Debug, Clone)]
pub struct Camera {
    base: ComponentBase,

    projection: ProjectionType,
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    near: f32,
    far: f32,
    aspect: f32,
    fov: f32,
    frustum_size: f32,

    view: Mat4,
    projection_matrix: Mat4,
    view_projection: Mat4,
    model: Mat4,
    matrices_dirty: bool,
    matrix_updates: u64,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            base: ComponentBase::new(),
            projection: ProjectionType::Perspective,
            eye: Vec3::zeros(),
            center: Vec3::zeros(),
            up: Vec3::zeros(),
            near: 0.0,
            far: 0.0,
            aspect: 0.0,
            fov: 0.0,
            frustum_size: 0.0,
            view: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            view_projection: Mat4::identity(),
            model: Mat4::identity(),
            matrices_dirty: true,
            matrix_updates: 0,
        };
        camera.apply(CameraData::default());
        camera.update_matrices();
        camera
    }
}

impl Camera {
    /// Create a camera with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera from validated parameters
    pub fn from_config(data: &CameraData) -> Result<Self, CameraError> {
        data.validate()?;
        let mut camera = Self::default();
        camera.apply(data.clone());
        camera.update_matrices();
        Ok(camera)
    }

    /// Create a perspective camera at `eye` looking at the origin
    ///
    /// # Example
    /// ```rust
    /// use scene_engine::foundation::math::Vec3;
    /// use scene_engine::render::primitives::Camera;
    ///
    /// let mut camera = Camera::perspective(Vec3::new(0.0, 2.0, 5.0), 75.0, 16.0 / 9.0, 0.1, 100.0)
    ///     .expect("valid parameters");
    /// let view = camera.view_matrix();
    /// assert!(view.try_inverse().is_some());
    /// ```
    pub fn perspective(eye: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Result<Self, CameraError> {
        Self::from_config(&CameraData {
            projection: ProjectionType::Perspective,
            eye,
            center: Vec3::zeros(),
            fov: fov_degrees,
            aspect,
            near,
            far,
            ..Default::default()
        })
    }

    /// Create an orthographic camera at `eye` looking at the origin
    pub fn orthographic(eye: Vec3, frustum_size: f32, aspect: f32, near: f32, far: f32) -> Result<Self, CameraError> {
        Self::from_config(&CameraData {
            projection: ProjectionType::Orthographic,
            eye,
            center: Vec3::zeros(),
            frustum_size,
            aspect,
            near,
            far,
            ..Default::default()
        })
    }

    /// Snapshot of the serializable parameters
    pub fn to_data(&self) -> CameraData {
        CameraData {
            projection: self.projection,
            eye: self.eye,
            center: self.center,
            up: self.up,
            near: self.near,
            far: self.far,
            aspect: self.aspect,
            fov: self.fov,
            frustum_size: self.frustum_size,
        }
    }

    fn apply(&mut self, data: CameraData) {
        self.projection = data.projection;
        self.eye = data.eye;
        self.center = data.center;
        self.up = data.up;
        self.near = data.near;
        self.far = data.far;
        self.aspect = data.aspect;
        self.fov = data.fov;
        self.frustum_size = data.frustum_size;
    }

    // Validate a scalar change and raise the dirty flag only if something changed
    fn update_scalars(&mut self, update: impl FnOnce(&mut CameraData)) -> Result<(), CameraError> {
        let current = self.to_data();
        let mut candidate = current.clone();
        update(&mut candidate);
        if candidate == current {
            return Ok(());
        }
        candidate.validate()?;
        self.apply(candidate);
        self.matrices_dirty = true;
        Ok(())
    }

    // Validate a change to eye/center/up and always raise the dirty flag
    fn update_view(&mut self, update: impl FnOnce(&mut CameraData)) -> Result<(), CameraError> {
        let mut candidate = self.to_data();
        update(&mut candidate);
        candidate.validate()?;
        self.apply(candidate);
        self.matrices_dirty = true;
        Ok(())
    }

    /// Projection model
    pub fn projection(&self) -> ProjectionType {
        self.projection
    }

    /// Switch the projection model
    pub fn set_projection(&mut self, projection: ProjectionType) -> Result<(), CameraError> {
        log::trace!("Camera projection set to {:?}", projection);
        self.update_scalars(|data| data.projection = projection)
    }

    /// Near clipping plane
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Set the near clipping plane
    pub fn set_near(&mut self, near: f32) -> Result<(), CameraError> {
        log::trace!("Camera near set to {}", near);
        self.update_scalars(|data| data.near = near)
    }

    /// Far clipping plane
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Set the far clipping plane
    pub fn set_far(&mut self, far: f32) -> Result<(), CameraError> {
        log::trace!("Camera far set to {}", far);
        self.update_scalars(|data| data.far = far)
    }

    /// Set both clipping planes at once
    ///
    /// Moving the planes past each other one at a time would be rejected by
    /// `set_near`/`set_far`; this checks only the final pair.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), CameraError> {
        self.update_scalars(|data| {
            data.near = near;
            data.far = far;
        })
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), CameraError> {
        log::trace!("Camera aspect set to {}", aspect);
        self.update_scalars(|data| data.aspect = aspect)
    }

    /// Vertical field of view in degrees
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the vertical field of view in degrees
    pub fn set_fov(&mut self, fov_degrees: f32) -> Result<(), CameraError> {
        log::trace!("Camera fov set to {}", fov_degrees);
        self.update_scalars(|data| data.fov = fov_degrees)
    }

    /// Height of the orthographic box
    pub fn frustum_size(&self) -> f32 {
        self.frustum_size
    }

    /// Set the height of the orthographic box
    pub fn set_frustum_size(&mut self, frustum_size: f32) -> Result<(), CameraError> {
        log::trace!("Camera frustum size set to {}", frustum_size);
        self.update_scalars(|data| data.frustum_size = frustum_size)
    }

    /// Camera position
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Set the camera position
    pub fn set_eye(&mut self, eye: Vec3) -> Result<(), CameraError> {
        self.update_view(|data| data.eye = eye)
    }

    /// Point the camera looks at
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Set the point the camera looks at
    pub fn set_center(&mut self, center: Vec3) -> Result<(), CameraError> {
        self.update_view(|data| data.center = center)
    }

    /// Up direction
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Set the up direction
    pub fn set_up(&mut self, up: Vec3) -> Result<(), CameraError> {
        self.update_view(|data| data.up = up)
    }

    /// Overwrite eye, center and up together
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) -> Result<(), CameraError> {
        log::trace!("Camera looking from {:?} at {:?}", eye, center);
        self.update_view(|data| {
            data.eye = eye;
            data.center = center;
            data.up = up;
        })
    }

    /// Whether the cached matrices are stale
    pub fn is_dirty(&self) -> bool {
        self.matrices_dirty
    }

    /// How many times the matrix cache has been rebuilt
    pub fn matrix_updates(&self) -> u64 {
        self.matrix_updates
    }

    /// Rebuild all cached matrices from the current parameters
    pub fn update_matrices(&mut self) {
        self.projection_matrix = match self.projection {
            ProjectionType::Orthographic => {
                let half_width = self.frustum_size * self.aspect * 0.5;
                let half_height = self.frustum_size * 0.5;
                Mat4::orthographic(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
            ProjectionType::Perspective => {
                Mat4::perspective(utils::deg_to_rad(self.fov), self.aspect, self.near, self.far)
            }
        };

        let view = Iso3::look_at_rh(&Point3::from(self.eye), &Point3::from(self.center), &self.up);
        self.view = view.to_homogeneous();
        self.view_projection = self.projection_matrix * self.view;
        self.model = view.inverse().to_homogeneous();

        self.matrices_dirty = false;
        self.matrix_updates += 1;
        log::debug!("Camera {} matrices rebuilt ({} total)", self.id(), self.matrix_updates);
    }

    fn ensure_matrices(&mut self) {
        if self.matrices_dirty {
            self.update_matrices();
        }
    }

    /// Camera-to-world matrix (inverse of the view matrix)
    pub fn model_matrix(&mut self) -> Mat4 {
        self.ensure_matrices();
        self.model
    }

    /// World-to-camera matrix
    pub fn view_matrix(&mut self) -> Mat4 {
        self.ensure_matrices();
        self.view
    }

    /// Camera-to-clip matrix
    pub fn projection_matrix(&mut self) -> Mat4 {
        self.ensure_matrices();
        self.projection_matrix
    }

    /// `projection * view`
    pub fn view_projection_matrix(&mut self) -> Mat4 {
        self.ensure_matrices();
        self.view_projection
    }

    /// Re-derive eye, center and up from an external camera-to-world matrix
    ///
    /// The eye-center distance is preserved. Matrices are rebuilt immediately.
    /// A matrix that collapses the view (singular or non-finite) is rejected.
    pub fn update_vectors(&mut self, model: &Mat4) -> Result<(), CameraError> {
        let distance = (self.center - self.eye).norm();
        let mut candidate = self.to_data();
        candidate.eye = model.transform_point(&Point3::origin()).coords;
        candidate.center = model.transform_point(&Point3::new(0.0, 0.0, -distance)).coords;
        candidate.up = model.transform_vector(&Vec3::y());
        candidate.validate()?;
        self.apply(candidate);
        self.update_matrices();
        Ok(())
    }

    /// Map a world-space point to viewport pixels
    ///
    /// `x`/`y` are divided by the clip-space `w`, not by the clip-space depth
    /// `z`, and mapped into the viewport rectangle. `z` is returned as the
    /// raw clip-space depth, not divided.
    pub fn project(&mut self, point: &Vec3, viewport: &impl ViewportProvider) -> Vec3 {
        let rect = viewport.viewport();
        let clip = self.view_projection_matrix() * point.push(1.0);

        let (x, y) = if clip.w.abs() > constants::EPSILON {
            (clip.x / clip.w, clip.y / clip.w)
        } else {
            (clip.x, clip.y)
        };

        Vec3::new(
            (x + 1.0) * rect.width * 0.5 + rect.x,
            (y + 1.0) * rect.height * 0.5 + rect.y,
            clip.z,
        )
    }

    /// Map viewport pixels back to world space
    ///
    /// `window.z` is window depth in [0, 1]: 0 lands on the near plane and 1
    /// on the far plane.
    pub fn unproject(&mut self, window: &Vec3, viewport: &impl ViewportProvider) -> Result<Vec3, CameraError> {
        let rect = viewport.viewport();
        if !rect.is_valid() {
            return Err(CameraError::invalid("viewport", format!("{rect:?} has no area")));
        }

        let inverse = self
            .view_projection_matrix()
            .try_inverse()
            .ok_or(CameraError::NotInvertible)?;

        let ndc = Vec4::new(
            2.0 * (window.x - rect.x) / rect.width - 1.0,
            2.0 * (window.y - rect.y) / rect.height - 1.0,
            2.0 * window.z - 1.0,
            1.0,
        );
        let world = inverse * ndc;
        if world.w.abs() <= constants::EPSILON {
            return Err(CameraError::NotInvertible);
        }
        Ok(world.xyz() / world.w)
    }

    /// Ray from the eye through pixel `(x, y)`
    pub fn ray_in_pixel(&mut self, x: f32, y: f32, viewport: &impl ViewportProvider) -> Result<Ray, CameraError> {
        let far_point = self.unproject(&Vec3::new(x, y, 1.0), viewport)?;
        Ok(Ray {
            origin: self.eye,
            direction: utils::normalize_or_zero(&(far_point - self.eye)),
        })
    }

    /// Pan: translate eye and center by `delta`
    pub fn move_by(&mut self, delta: &Vec3) -> Result<(), CameraError> {
        self.update_view(|data| {
            data.eye += delta;
            data.center += delta;
        })
    }

    /// Turn the view direction around `axis` about the eye
    pub fn rotate(&mut self, angle_degrees: f32, axis: &Vec3) -> Result<(), CameraError> {
        let rotation = utils::axis_angle(axis, angle_degrees).ok_or(CameraError::DegenerateAxis)?;
        self.update_view(|data| data.center = data.eye + rotation * (data.center - data.eye))
    }

    /// Swing the eye around `pivot` (default: the current center)
    ///
    /// Positive angles follow the right-hand rule: orbiting 90 degrees
    /// around +Y takes an eye at +X to -Z.
    pub fn orbit(&mut self, angle_degrees: f32, axis: &Vec3, pivot: Option<Vec3>) -> Result<(), CameraError> {
        let rotation = utils::axis_angle(axis, angle_degrees).ok_or(CameraError::DegenerateAxis)?;
        let pivot = pivot.unwrap_or(self.center);
        self.update_view(|data| data.eye = pivot + rotation * (data.eye - pivot))
    }

    /// Scale the eye's distance from `pivot` (default: the current center)
    pub fn orbit_distance_factor(&mut self, factor: f32, pivot: Option<Vec3>) -> Result<(), CameraError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CameraError::invalid("factor", format!("{factor} must be positive")));
        }
        let pivot = pivot.unwrap_or(self.center);
        self.update_view(|data| data.eye = pivot + (data.eye - pivot) * factor)
    }

    /// Unit view direction, in world space when `transform` is given
    pub fn global_front(&self, transform: Option<&TransformComponent>) -> Vec3 {
        let front = utils::normalize_or_zero(&(self.center - self.eye));
        match transform {
            Some(transform) => utils::normalize_or_zero(&transform.transform_vector(&front)),
            None => front,
        }
    }

    /// Unit up direction orthogonal to the view direction
    pub fn global_top(&self, transform: Option<&TransformComponent>) -> Vec3 {
        let front = utils::normalize_or_zero(&(self.center - self.eye));
        let right = front.cross(&self.up);
        let top = utils::normalize_or_zero(&-front.cross(&right));
        match transform {
            Some(transform) => utils::normalize_or_zero(&transform.transform_vector(&top)),
            None => top,
        }
    }

    // Node transform applied after the camera model: `global * model`, never
    // `model * global`
    fn local_to_world(&mut self, transform: Option<&TransformComponent>) -> Mat4 {
        let model = self.model_matrix();
        match transform {
            Some(transform) => transform.global_matrix() * model,
            None => model,
        }
    }

    /// Map a camera-local point to world space
    ///
    /// The camera model matrix is applied first, then the node transform
    /// (`global * model`).
    pub fn local_point(&mut self, point: &Vec3, transform: Option<&TransformComponent>) -> Vec3 {
        self.local_to_world(transform)
            .transform_point(&Point3::from(*point))
            .coords
    }

    /// Map a camera-local direction to world space, composed as in
    /// [`Camera::local_point`]
    pub fn local_vector(&mut self, vector: &Vec3, transform: Option<&TransformComponent>) -> Vec3 {
        self.local_to_world(transform).transform_vector(vector)
    }

    /// Make `this` the scene's active camera
    ///
    /// For an untyped [`ComponentRef`] use [`Scene::set_active_camera`].
    pub fn set_active(this: &Rc<RefCell<Camera>>, scene: &mut Scene) {
        let id = this.borrow().id();
        let handle: ComponentRef = this.clone();
        scene.store_active_camera(id, handle);
    }

    /// Whether `this` is the scene's active camera
    pub fn is_active(this: &Rc<RefCell<Camera>>, scene: &Scene) -> bool {
        scene
            .active_camera()
            .is_some_and(|active| Rc::as_ptr(&active).cast::<()>() == Rc::as_ptr(this).cast::<()>())
    }
}

#[derive(Deserialize)]
struct MoveParams {
    delta: Vec3,
}

#[derive(Deserialize)]
struct RotateParams {
    angle: f32,
    axis: Vec3,
    #[serde(default)]
    center: Option<Vec3>,
}

#[derive(Deserialize)]
struct DistanceParams {
    factor: f32,
    #[serde(default)]
    center: Option<Vec3>,
}

#[derive(Deserialize)]
struct LookAtParams {
    eye: Vec3,
    center: Vec3,
    #[serde(default = "default_up")]
    up: Vec3,
}

fn default_up() -> Vec3 {
    Vec3::y()
}

fn parse_params<T: serde::de::DeserializeOwned>(params: &ComponentData) -> Result<T, ComponentError> {
    serde_json::from_value(params.clone()).map_err(ComponentError::invalid_data::<Camera>)
}

impl Component for Camera {
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
        Capabilities::NODE_HOOKS | Capabilities::PERSISTENT | Capabilities::ACTIONS
    }

    fn on_added_to_node(&mut self, node: &mut dyn ComponentHost) {
        if node.camera().is_none() {
            node.set_camera(Some(self.id()));
            log::debug!("Camera {} registered on node {}", self.id(), node.node_name());
        }
    }

    fn on_removed_from_node(&mut self, node: &mut dyn ComponentHost) {
        if node.camera() == Some(self.id()) {
            node.set_camera(None);
            log::debug!("Camera {} unregistered from node {}", self.id(), node.node_name());
        }
    }

    fn serialize(&self) -> Result<ComponentData, ComponentError> {
        serde_json::to_value(self.to_data()).map_err(ComponentError::invalid_data::<Self>)
    }

    fn configure(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        let merged = merge_payload(&self.to_data(), data).map_err(ComponentError::invalid_data::<Self>)?;
        merged.validate()?;
        self.apply(merged);
        self.update_matrices();
        Ok(())
    }

    fn has_action(&self, action: &str) -> bool {
        matches!(action, "move" | "rotate" | "orbit" | "orbit_distance_factor" | "look_at")
    }

    fn invoke_action(&mut self, action: &str, params: &ComponentData) -> Result<(), ComponentError> {
        match action {
            "move" => {
                let params: MoveParams = parse_params(params)?;
                self.move_by(&params.delta)?;
            }
            "rotate" => {
                let params: RotateParams = parse_params(params)?;
                self.rotate(params.angle, &params.axis)?;
            }
            "orbit" => {
                let params: RotateParams = parse_params(params)?;
                self.orbit(params.angle, &params.axis, params.center)?;
            }
            "orbit_distance_factor" => {
                let params: DistanceParams = parse_params(params)?;
                self.orbit_distance_factor(params.factor, params.center)?;
            }
            "look_at" => {
                let params: LookAtParams = parse_params(params)?;
                self.look_at(params.eye, params.center, params.up)?;
            }
            _ => {
                return Err(ComponentError::UnknownAction {
                    type_name: Self::TYPE_NAME,
                    action: action.to_string(),
                })
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for Camera {
    const TYPE_NAME: &'static str = "Camera";

    fn from_data(data: &ComponentData) -> Result<Self, ComponentError> {
        let mut camera = Self::default();
        camera.configure(data)?;
        Ok(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::Viewport;
    use approx::assert_relative_eq;
    use serde_json::json;

    const EPSILON: f32 = 1e-4;

    fn front_camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 90.0, 1.0, 0.1, 100.0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let camera = Camera::new();
        assert_eq!(camera.projection(), ProjectionType::Perspective);
        assert_eq!(camera.eye(), Vec3::new(0.0, 100.0, 100.0));
        assert_eq!(camera.center(), Vec3::zeros());
        assert_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!((camera.near(), camera.far()), (1.0, 1000.0));
        assert_eq!((camera.aspect(), camera.fov(), camera.frustum_size()), (1.0, 45.0, 50.0));
        assert!(!camera.is_dirty());
    }

    #[test]
    fn test_view_matrix_places_origin_in_front() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        camera.set_fov(90.0).unwrap();
        camera.set_clip_planes(0.1, 100.0).unwrap();
        camera.update_matrices();

        let p = camera.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(p.coords, Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_model_is_inverse_of_view() {
        let mut camera = Camera::new();
        let product = camera.model_matrix() * camera.view_matrix();
        assert_relative_eq!(product, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_scalar_setter_dirty_only_on_change() {
        let mut camera = front_camera();
        assert!(!camera.is_dirty());

        camera.set_near(0.1).unwrap();
        assert!(!camera.is_dirty());

        camera.set_near(0.5).unwrap();
        assert!(camera.is_dirty());
    }

    #[test]
    fn test_vector_setter_always_dirty() {
        let mut camera = front_camera();
        let eye = camera.eye();
        camera.set_eye(eye).unwrap();
        assert!(camera.is_dirty());
    }

    #[test]
    fn test_vector_setters_reject_degenerate_views() {
        let mut camera = front_camera();
        let view = camera.view_matrix();

        let nan_eye = camera.set_eye(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(nan_eye, Err(CameraError::InvalidParameter { name: "eye", .. })));
        let same_point = camera.set_center(Vec3::new(0.0, 0.0, 5.0));
        assert!(matches!(same_point, Err(CameraError::InvalidParameter { name: "center", .. })));
        let collapsed = camera.look_at(Vec3::zeros(), Vec3::zeros(), Vec3::y());
        assert!(matches!(collapsed, Err(CameraError::InvalidParameter { name: "center", .. })));
        assert!(matches!(camera.set_up(Vec3::zeros()), Err(CameraError::InvalidParameter { name: "up", .. })));
        assert!(matches!(
            camera.set_up(Vec3::new(0.0, 0.0, 2.0)),
            Err(CameraError::InvalidParameter { name: "up", .. })
        ));
        assert!(camera.move_by(&Vec3::new(0.0, f32::INFINITY, 0.0)).is_err());
        assert!(camera.update_vectors(&Mat4::zeros()).is_err());

        assert_eq!(camera.eye(), Vec3::new(0.0, 0.0, 5.0));
        assert!(!camera.is_dirty());

        // Scalar setters keep working after a rejected vector
        camera.set_near(0.1).unwrap();
        camera.set_near(0.2).unwrap();
        assert_eq!(camera.view_matrix(), view);
        assert!(camera.view_projection_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_accessors_recompute_once() {
        let mut camera = front_camera();
        camera.set_eye(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let before = camera.matrix_updates();

        let first = camera.view_projection_matrix();
        let second = camera.view_projection_matrix();
        let _ = camera.projection_matrix();
        let _ = camera.model_matrix();

        assert_eq!(first, second);
        assert_eq!(camera.matrix_updates(), before + 1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut camera = front_camera();

        assert!(matches!(camera.set_near(100.0), Err(CameraError::InvalidParameter { name: "near", .. })));
        assert!(matches!(camera.set_aspect(0.0), Err(CameraError::InvalidParameter { name: "aspect", .. })));
        assert!(matches!(camera.set_fov(180.0), Err(CameraError::InvalidParameter { name: "fov", .. })));
        assert!(camera.set_far(f32::NAN).is_err());

        assert_eq!(camera.near(), 0.1);
        assert_eq!(camera.far(), 100.0);
        assert!(!camera.is_dirty());
    }

    #[test]
    fn test_orthographic_allows_zero_near_but_not_perspective() {
        let mut camera = Camera::orthographic(Vec3::new(0.0, 0.0, 10.0), 20.0, 2.0, 1.0, 50.0).unwrap();
        camera.set_near(0.0).unwrap();
        assert!(camera.set_projection(ProjectionType::Perspective).is_err());
        assert!(camera.set_frustum_size(0.0).is_err());
    }

    #[test]
    fn test_orthographic_box() {
        let mut camera = Camera::orthographic(Vec3::new(0.0, 0.0, 10.0), 20.0, 2.0, 1.0, 50.0).unwrap();

        // Half extents are frustum_size * aspect / 2 by frustum_size / 2
        let corner = camera.view_projection_matrix() * Vec4::new(20.0, 10.0, 0.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = EPSILON);
        assert_relative_eq!(corner.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_serialize_configure_roundtrip() {
        let mut original = Camera::orthographic(Vec3::new(3.0, 4.0, 5.0), 12.0, 1.5, 0.5, 80.0).unwrap();
        original.set_up(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        original.set_center(Vec3::new(1.0, 1.0, 0.0)).unwrap();

        let data = original.serialize().unwrap();
        assert_eq!(data["type"], json!("orthographic"));

        let mut restored = Camera::from_data(&data).unwrap();
        assert_eq!(restored.to_data(), original.to_data());
        assert!(!restored.is_dirty());
        assert_eq!(restored.view_projection_matrix(), original.view_projection_matrix());
        assert_eq!(restored.model_matrix(), original.model_matrix());
    }

    #[test]
    fn test_configure_partial_and_invalid() {
        let mut camera = front_camera();
        camera.configure(&json!({ "eye": [0.0, 1.0, 2.0] })).unwrap();
        assert_eq!(camera.eye(), Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(camera.fov(), 90.0);
        assert!(!camera.is_dirty());

        let result = camera.configure(&json!({ "near": 500.0 }));
        assert!(matches!(result, Err(ComponentError::Camera(CameraError::InvalidParameter { .. }))));
        assert_eq!(camera.near(), 0.1);
    }

    #[test]
    fn test_orbit_right_handed() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)).unwrap();

        camera.orbit(90.0, &Vec3::new(0.0, 1.0, 0.0), None).unwrap();
        assert_relative_eq!(camera.eye(), Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
        assert_eq!(camera.center(), Vec3::zeros());
        assert!(camera.is_dirty());
    }

    #[test]
    fn test_rotate_keeps_eye() {
        let mut camera = front_camera();
        camera.rotate(90.0, &Vec3::new(0.0, 1.0, 0.0)).unwrap();

        assert_eq!(camera.eye(), Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(camera.center(), Vec3::new(-5.0, 0.0, 5.0), epsilon = EPSILON);
        assert_eq!(camera.rotate(10.0, &Vec3::zeros()), Err(CameraError::DegenerateAxis));
    }

    #[test]
    fn test_move_and_distance_factor() {
        let mut camera = front_camera();
        camera.move_by(&Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(camera.eye(), Vec3::new(1.0, 0.0, 5.0));
        assert_eq!(camera.center(), Vec3::new(1.0, 0.0, 0.0));

        camera.orbit_distance_factor(2.0, None).unwrap();
        assert_relative_eq!(camera.eye(), Vec3::new(1.0, 0.0, 10.0), epsilon = EPSILON);
        assert!(camera.orbit_distance_factor(0.0, None).is_err());
    }

    #[test]
    fn test_project_center_and_unproject() {
        let mut camera = front_camera();
        let viewport = Viewport::new(10.0, 20.0, 200.0, 100.0);

        let projected = camera.project(&Vec3::zeros(), &viewport);
        assert_relative_eq!(projected.x, 110.0, epsilon = EPSILON);
        assert_relative_eq!(projected.y, 70.0, epsilon = EPSILON);

        let near = camera.unproject(&Vec3::new(110.0, 70.0, 0.0), &viewport).unwrap();
        assert_relative_eq!(near, Vec3::new(0.0, 0.0, 4.9), epsilon = 1e-3);
    }

    #[test]
    fn test_project_divides_off_center_point_by_w() {
        let mut camera = front_camera();
        let viewport = Viewport::new(10.0, 20.0, 200.0, 100.0);
        let point = Vec3::new(1.0, -2.0, 0.0);

        // Five units in front with a 90 degree fov: ndc (0.2, -0.4)
        let projected = camera.project(&point, &viewport);
        assert_relative_eq!(projected.x, 130.0, epsilon = EPSILON);
        assert_relative_eq!(projected.y, 50.0, epsilon = EPSILON);

        let clip = camera.view_projection_matrix() * point.push(1.0);
        assert_relative_eq!(clip.w, 5.0, epsilon = EPSILON);
        assert_relative_eq!(projected.z, clip.z, epsilon = EPSILON);
    }

    #[test]
    fn test_unproject_rejects_empty_viewport() {
        let mut camera = front_camera();
        let result = camera.unproject(&Vec3::zeros(), &Viewport::from_size(0.0, 0.0));
        assert!(matches!(result, Err(CameraError::InvalidParameter { name: "viewport", .. })));
    }

    #[test]
    fn test_ray_through_center_pixel() {
        let mut camera = front_camera();
        let viewport = Viewport::from_size(640.0, 480.0);
        let ray = camera.ray_in_pixel(320.0, 240.0, &viewport).unwrap();

        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(ray.point_at(5.0), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_global_front_and_top() {
        let camera = front_camera();
        assert_relative_eq!(camera.global_front(None), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(camera.global_top(None), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);

        let turned = TransformComponent::identity()
            .with_rotation_axis_angle(Vec3::new(0.0, 1.0, 0.0), 90.0)
            .with_scale(Vec3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(camera.global_front(Some(&turned)), Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(camera.global_top(Some(&turned)), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_local_point_goes_through_node_transform() {
        let mut camera = front_camera();
        let node_transform = TransformComponent::from_position(Vec3::new(10.0, 0.0, 0.0));

        let origin = camera.local_point(&Vec3::zeros(), None);
        assert_relative_eq!(origin, Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);

        let moved = camera.local_point(&Vec3::new(0.0, 0.0, -5.0), Some(&node_transform));
        assert_relative_eq!(moved, Vec3::new(10.0, 0.0, 0.0), epsilon = EPSILON);

        let dir = camera.local_vector(&Vec3::new(0.0, 0.0, -1.0), Some(&node_transform));
        assert_relative_eq!(dir, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);

        // Node rotation acts on the camera-space result: global * model
        let turned = TransformComponent::identity().with_rotation_axis_angle(Vec3::new(0.0, 1.0, 0.0), 90.0);
        let eye = camera.local_point(&Vec3::zeros(), Some(&turned));
        assert_relative_eq!(eye, Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_update_vectors_preserves_distance_and_recomputes() {
        let mut camera = front_camera();
        let before = camera.matrix_updates();
        let model = Mat4::new_translation(&Vec3::new(0.0, 3.0, 0.0));

        camera.update_vectors(&model).unwrap();

        assert_relative_eq!(camera.eye(), Vec3::new(0.0, 3.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(camera.center(), Vec3::new(0.0, 3.0, -5.0), epsilon = EPSILON);
        assert_relative_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert!(!camera.is_dirty());
        assert_eq!(camera.matrix_updates(), before + 1);
    }

    #[test]
    fn test_actions_dispatch_by_name() {
        let mut camera = front_camera();
        assert!(camera.has_action("orbit"));
        assert!(!camera.has_action("zoom"));

        camera
            .invoke_action("move", &json!({ "delta": [0.0, 2.0, 0.0] }))
            .unwrap();
        assert_eq!(camera.eye(), Vec3::new(0.0, 2.0, 5.0));

        camera
            .invoke_action("look_at", &json!({ "eye": [5.0, 0.0, 0.0], "center": [0.0, 0.0, 0.0] }))
            .unwrap();
        camera
            .invoke_action("orbit", &json!({ "angle": 90.0, "axis": [0.0, 1.0, 0.0] }))
            .unwrap();
        assert_relative_eq!(camera.eye(), Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);

        let bad = camera.invoke_action("orbit", &json!({ "angle": 90.0, "axis": [0.0, 0.0, 0.0] }));
        assert!(matches!(bad, Err(ComponentError::Camera(CameraError::DegenerateAxis))));
        assert!(matches!(
            camera.invoke_action("zoom", &json!({})),
            Err(ComponentError::UnknownAction { .. })
        ));
    }
}
