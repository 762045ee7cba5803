//! Link between an entity and its body in the [`PhysicsWorld`].
//!
//! [`PhysicsWorld`]: crate::resources::physicsworld::PhysicsWorld

use bevy_ecs::prelude::Component;

use crate::resources::physicsworld::BodyHandle;

/// The entity is simulated by the physics world.
///
/// For the actor, the body is authoritative for horizontal position while
/// the render transform keeps ownership of height.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsBody {
    pub handle: BodyHandle,
}

impl PhysicsBody {
    pub fn new(handle: BodyHandle) -> Self {
        Self { handle }
    }
}

/// Marker for mass-0 bodies whose render transform was copied from the body
/// once at creation and is never synced again.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct StaticBody;
