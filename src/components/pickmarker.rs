use bevy_ecs::prelude::Component;

/// Marker dropped on the ground at the last accepted pick point.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PickMarker;
