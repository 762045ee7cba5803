use bevy_ecs::prelude::Component;

/// Yaw around the vertical axis, in radians. Pitch and roll are never
/// touched by locomotion.
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Heading {
    pub radians: f32,
}
