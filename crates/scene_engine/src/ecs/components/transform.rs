//! Transform component
//!
//! Position, rotation and scale of a node. Every node created with
//! [`crate::scene::Node::new`] owns one at index 0 of its component list;
//! serialized data configures that instance in place.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{
    merge_payload, Capabilities, Component, ComponentBase, ComponentData, ComponentError,
    ComponentType,
};
use crate::foundation::math::{constants, utils, Mat4, Point3, Quat, Vec3};

/// Serialized form of a [`TransformComponent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    /// Translation
    pub position: Vec3,
    /// Rotation quaternion, `[x, y, z, w]`
    pub rotation: Quat,
    /// Scale factors
    pub scale: Vec3,
}

/// Node transform component
///
/// The scene graph hierarchy lives outside this crate, so the global matrix
/// of a transform is its local matrix.
#[derive(Debug, Clone)]
pub struct TransformComponent {
    base: ComponentBase,

    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::new(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation from axis-angle (degrees)
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle_degrees: f32) -> Self {
        if let Some(rotation) = utils::axis_angle(&axis, angle_degrees) {
            self.rotation = rotation;
        }
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local TRS matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Matrix taking node-local coordinates to world space
    pub fn global_matrix(&self) -> Mat4 {
        self.local_matrix()
    }

    /// Apply rotation and scale to a direction (no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(vector)
    }

    /// Apply the full transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.global_matrix().transform_point(&Point3::from(*point)).coords
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: &Vec3) {
        self.position += delta;
    }

    /// Snapshot of the serializable fields
    pub fn to_data(&self) -> TransformData {
        TransformData {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    fn apply(&mut self, data: TransformData) {
        self.position = data.position;
        // Payloads may carry non-unit or zero quaternions
        self.rotation = Quat::try_new(data.rotation.into_inner(), constants::EPSILON)
            .unwrap_or_else(Quat::identity);
        self.scale = data.scale;
    }
}

#[derive(Deserialize)]
struct TranslateParams {
    delta: Vec3,
}

#[derive(Deserialize)]
struct RotateParams {
    angle: f32,
    axis: Vec3,
}

impl Component for TransformComponent {
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
        Capabilities::PERSISTENT | Capabilities::ACTIONS
    }

    fn serialize(&self) -> Result<ComponentData, ComponentError> {
        serde_json::to_value(self.to_data()).map_err(ComponentError::invalid_data::<Self>)
    }

    fn configure(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        let merged = merge_payload(&self.to_data(), data).map_err(ComponentError::invalid_data::<Self>)?;
        self.apply(merged);
        Ok(())
    }

    fn has_action(&self, action: &str) -> bool {
        matches!(action, "translate" | "rotate")
    }

    fn invoke_action(&mut self, action: &str, params: &ComponentData) -> Result<(), ComponentError> {
        match action {
            "translate" => {
                let params: TranslateParams = serde_json::from_value(params.clone())
                    .map_err(ComponentError::invalid_data::<Self>)?;
                self.translate(&params.delta);
                Ok(())
            }
            "rotate" => {
                let params: RotateParams = serde_json::from_value(params.clone())
                    .map_err(ComponentError::invalid_data::<Self>)?;
                if let Some(rotation) = utils::axis_angle(&params.axis, params.angle) {
                    self.rotation = rotation * self.rotation;
                }
                Ok(())
            }
            _ => Err(ComponentError::UnknownAction {
                type_name: Self::TYPE_NAME,
                action: action.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for TransformComponent {
    const TYPE_NAME: &'static str = "Transform";

    fn from_data(data: &ComponentData) -> Result<Self, ComponentError> {
        let mut transform = Self::default();
        transform.configure(data)?;
        Ok(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_identity() {
        let transform = TransformComponent::identity();

        assert_eq!(transform.position, Vec3::zeros());
        assert_relative_eq!(transform.local_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_quaternion_rotation_consistency() {
        // 90 degrees around Y takes +X to -Z in right-handed Y-up
        let transform = TransformComponent::identity()
            .with_rotation_axis_angle(Vec3::new(0.0, 1.0, 0.0), 90.0);

        let rotated = transform.transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_point_applies_translation_last() {
        let transform = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));

        let p = transform.transform_point(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(3.0, 2.0, 3.0), epsilon = EPSILON);

        let v = transform.transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_serialize_configure_roundtrip() {
        let original = TransformComponent::from_position(Vec3::new(-0.7, -1.0, 0.3))
            .with_rotation_axis_angle(Vec3::new(1.0, 1.0, 1.0), 30.0)
            .with_scale(Vec3::new(2.0, 1.5, 0.8));

        let data = original.serialize().unwrap();
        let restored = TransformComponent::from_data(&data).unwrap();

        assert_relative_eq!(restored.position, original.position, epsilon = EPSILON);
        assert_relative_eq!(restored.scale, original.scale, epsilon = EPSILON);
        let dot = original.rotation.coords.dot(&restored.rotation.coords);
        assert!(dot.abs() > 0.999, "Quaternion rotation mismatch: dot product = {}", dot);
    }

    #[test]
    fn test_partial_configure_keeps_other_fields() {
        let mut transform = TransformComponent::identity().with_scale(Vec3::new(3.0, 3.0, 3.0));
        transform.configure(&json!({ "position": [1.0, 2.0, 3.0] })).unwrap();

        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_configure_rejects_bad_payload() {
        let mut transform = TransformComponent::identity();
        let result = transform.configure(&json!({ "position": "up" }));
        assert!(matches!(result, Err(ComponentError::InvalidData { type_name: "Transform", .. })));
        assert_eq!(transform.position, Vec3::zeros());
    }

    #[test]
    fn test_translate_action() {
        let mut transform = TransformComponent::identity();
        assert!(transform.has_action("translate"));
        assert!(!transform.has_action("orbit"));

        transform
            .invoke_action("translate", &json!({ "delta": [0.0, 1.0, 0.0] }))
            .unwrap();
        assert_eq!(transform.position, Vec3::new(0.0, 1.0, 0.0));
    }
}
