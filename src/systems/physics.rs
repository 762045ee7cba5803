//! Physics systems.
//!
//! [`physics_step_system`] runs first in the frame and feeds the real frame
//! delta into the [`PhysicsWorld`]'s fixed-step accumulator.
//! [`settle_grounded_system`] follows it and cancels whatever velocity the
//! step gave a grounded actor, so standing still on the floor never slides
//! or sinks. A jumping actor only loses its vertical velocity: its height
//! belongs to the jump arc, so gravity must not build up underneath it.

use bevy_ecs::prelude::*;
use log::trace;

use crate::components::actor::{Actor, MotionState};
use crate::components::physicsbody::PhysicsBody;
use crate::resources::physicsworld::PhysicsWorld;
use crate::resources::worldtime::WorldTime;

pub fn physics_step_system(time: Res<WorldTime>, mut physics: ResMut<PhysicsWorld>) {
    let steps = physics.advance(time.delta);
    trace!("physics: {} step(s)", steps);
}

pub fn settle_grounded_system(
    mut physics: ResMut<PhysicsWorld>,
    actors: Query<(&Actor, &PhysicsBody)>,
) {
    for (actor, body) in actors.iter() {
        if actor.motion == MotionState::Jumping {
            physics.zero_vertical_velocity(body.handle);
        } else {
            physics.zero_velocity(body.handle);
        }
    }
}
