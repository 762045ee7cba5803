//! Handle to the render-side object drawn for an entity.

use bevy_ecs::prelude::Component;
use nalgebra::{UnitQuaternion, Vector3};

use crate::resources::renderbridge::ModelHandle;

/// Render object plus the pose parts that are not simulated.
///
/// `base_rotation` is the model's authored orientation. For entities with a
/// [`Heading`](crate::components::heading::Heading) the yaw is composed on
/// top of it when syncing.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RenderModel {
    pub handle: ModelHandle,
    pub base_rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl RenderModel {
    pub fn new(handle: ModelHandle) -> Self {
        Self {
            handle,
            base_rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.base_rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }
}
