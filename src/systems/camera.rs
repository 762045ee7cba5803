//! Camera follow rig.
//!
//! While no lock is held the camera sits at the actor's ground position plus
//! the rig's planar offset and looks at the actor. Height is left alone: it
//! only changes through zone sequences.

use bevy_ecs::prelude::*;

use crate::components::actor::Actor;
use crate::components::camerarig::CameraRig;
use crate::components::worldposition::WorldPosition;

pub fn camera_follow_system(
    mut rigs: Query<(&mut WorldPosition, &mut CameraRig), Without<Actor>>,
    actors: Query<&WorldPosition, (With<Actor>, Without<CameraRig>)>,
) {
    let Some(actor) = actors.iter().next() else {
        return;
    };
    for (mut position, mut rig) in rigs.iter_mut() {
        if rig.is_locked() {
            continue;
        }
        let mut pos = position.pos;
        pos.x = actor.pos.x + rig.offset_x;
        pos.z = actor.pos.z + rig.offset_z;
        position.set_if_neq(WorldPosition { pos });
        if rig.look_at != actor.pos {
            rig.look_at = actor.pos;
        }
    }
}
