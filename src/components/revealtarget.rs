use bevy_ecs::prelude::Component;

/// A structure shown and hidden by a trigger zone.
///
/// `visible` mirrors the owning zone's `active` flag.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RevealTarget {
    pub resting_y: f32,
    pub active_y: f32,
    pub visible: bool,
}

impl RevealTarget {
    pub fn new(resting_y: f32, active_y: f32) -> Self {
        Self {
            resting_y,
            active_y,
            visible: false,
        }
    }
}
