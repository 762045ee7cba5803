//! Clip mixer system.
//!
//! Advances the local time of every [`ClipPlayer`]. Which clip plays is
//! decided by the locomotion systems; switches reach the render backend
//! through [`crate::systems::render`].

use bevy_ecs::prelude::*;

use crate::components::animation::ClipPlayer;
use crate::resources::worldtime::WorldTime;

pub fn clip_mixer_system(time: Res<WorldTime>, mut players: Query<&mut ClipPlayer>) {
    for mut player in players.iter_mut() {
        player.advance(time.delta);
    }
}
