//! Locomotion state machine: walking, jumping and landing.
//!
//! The actor is always in exactly one [`MotionState`]. Transitions happen in
//! four places:
//!
//! - [`ground_pick_observer`]: a ground pick starts a walk, or is parked as
//!   the pending destination while jumping.
//! - [`jump_request_observer`]: starts the jump arc unless one is running.
//! - [`jump_finished_observer`] / [`jump_release_timer_system`]: land the
//!   jump when its arc timeline completes, or when the fallback timer runs
//!   out if the game is configured for timer release.
//! - [`locomotion_system`]: the per-frame integrator that walks the actor
//!   toward its destination and stops it on arrival.
//!
//! With a physics body the body owns the horizontal position and the render
//! transform owns the height. Each frame the integrator reads x/z from the
//! body, moves, writes the result back with the transform's y, and copies it
//! to the transform.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use nalgebra::Vector3;

use crate::components::actor::{Actor, MotionState, PickOutcome};
use crate::components::animation::{ClipKind, ClipPlayer};
use crate::components::camerarig::{CameraLock, CameraRig};
use crate::components::groundpoint::GroundPoint;
use crate::components::heading::Heading;
use crate::components::physicsbody::PhysicsBody;
use crate::components::pickmarker::PickMarker;
use crate::components::worldposition::WorldPosition;
use crate::events::input::{GroundPickEvent, JumpRequestEvent};
use crate::events::timeline::TimelineFinishedEvent;
use crate::resources::gameconfig::{GameConfig, JumpRelease};
use crate::resources::physicsworld::PhysicsWorld;
use crate::resources::sequencer::{Sequencer, Timeline, Tween};
use crate::resources::worldtime::WorldTime;

/// One-decimal equality, used to pick the gait clip.
fn coarse_eq(a: f32, b: f32) -> bool {
    (a * 10.0).round() == (b * 10.0).round()
}

fn within(pos: &Vector3<f32>, dest: GroundPoint, tolerance: f32) -> bool {
    (pos.x - dest.x).abs() < tolerance && (pos.z - dest.z).abs() < tolerance
}

pub fn ground_pick_observer(
    trigger: On<GroundPickEvent>,
    mut actors: Query<(&mut Actor, &WorldPosition, &mut Heading)>,
    mut markers: Query<&mut WorldPosition, (With<PickMarker>, Without<Actor>)>,
) {
    let point = trigger.event().point;
    for mut marker in markers.iter_mut() {
        marker.pos.x = point.x;
        marker.pos.z = point.z;
    }
    for (mut actor, position, mut heading) in actors.iter_mut() {
        match actor.pick(position.ground(), point) {
            PickOutcome::Walking { heading: yaw } => {
                if let Some(yaw) = yaw {
                    heading.radians = yaw;
                }
                info!("walking to ({:.2}, {:.2})", point.x, point.z);
            }
            PickOutcome::Deferred => {
                debug!(
                    "jumping, ({:.2}, {:.2}) kept as pending destination",
                    point.x, point.z
                );
            }
        }
    }
}

pub fn jump_request_observer(
    _trigger: On<JumpRequestEvent>,
    config: Res<GameConfig>,
    mut sequencer: ResMut<Sequencer>,
    mut actors: Query<(Entity, &mut Actor, Option<&mut ClipPlayer>)>,
    mut rigs: Query<&mut CameraRig>,
) {
    let jump = &config.jump;
    for (entity, mut actor, clips) in actors.iter_mut() {
        if actor.is_jumping() {
            debug!("jump request ignored, already jumping");
            continue;
        }
        let arc = Timeline::new("jump")
            .with(
                Tween::position_y(entity, actor.jump_apex_y, jump.rise_duration)
                    .with_easing(jump.easing),
            )
            .with(
                Tween::position_y(entity, actor.rest_y, jump.fall_duration)
                    .with_easing(jump.easing),
            );
        let release_in = match jump.release {
            JumpRelease::Timeline => None,
            JumpRelease::Timer => Some(jump.duration() * jump.timer_factor),
        };
        let id = sequencer.play(arc);
        actor.begin_jump(id, release_in);
        if let Some(mut clips) = clips {
            clips.play(ClipKind::Jump);
        }
        for mut rig in rigs.iter_mut() {
            rig.lock(CameraLock::Jump);
        }
        info!("jump {:?} started", id);
    }
}

/// Leave the jump: unlock the camera, apply any pending destination and
/// pick the clip for the new state.
fn release_jump(
    actor: &mut Actor,
    position: &WorldPosition,
    heading: &mut Heading,
    clips: Option<Mut<ClipPlayer>>,
    rigs: &mut Query<&mut CameraRig>,
) {
    if let Some(yaw) = actor.land(position.ground()) {
        heading.radians = yaw;
    }
    for mut rig in rigs.iter_mut() {
        rig.unlock(CameraLock::Jump);
    }
    if let Some(mut clips) = clips {
        clips.play(match actor.motion {
            MotionState::Walking => ClipKind::Walk,
            _ => ClipKind::Idle,
        });
    }
    info!("jump landed, now {:?}", actor.motion);
}

pub fn jump_finished_observer(
    trigger: On<TimelineFinishedEvent>,
    mut actors: Query<(
        &mut Actor,
        &WorldPosition,
        &mut Heading,
        Option<&mut ClipPlayer>,
    )>,
    mut rigs: Query<&mut CameraRig>,
) {
    let finished = trigger.event();
    for (mut actor, position, mut heading, clips) in actors.iter_mut() {
        let Some(jump) = actor.jump else {
            continue;
        };
        if jump.timeline != finished.timeline || jump.release_in.is_some() {
            continue;
        }
        if finished.cancelled {
            debug!("jump arc {:?} was cut short", finished.timeline);
        }
        release_jump(&mut actor, position, &mut heading, clips, &mut rigs);
    }
}

/// Fallback release: counts down jumps started with a release timer.
pub fn jump_release_timer_system(
    time: Res<WorldTime>,
    mut actors: Query<(
        &mut Actor,
        &WorldPosition,
        &mut Heading,
        Option<&mut ClipPlayer>,
    )>,
    mut rigs: Query<&mut CameraRig>,
) {
    for (mut actor, position, mut heading, clips) in actors.iter_mut() {
        let Some(remaining) = actor.jump.and_then(|j| j.release_in) else {
            continue;
        };
        let remaining = remaining - time.delta;
        if remaining > 0.0 {
            if let Some(jump) = actor.jump.as_mut() {
                jump.release_in = Some(remaining);
            }
            continue;
        }
        release_jump(&mut actor, position, &mut heading, clips, &mut rigs);
    }
}

/// Per-frame walk integrator.
///
/// While walking: the gait clip follows the coarse arrival check taken
/// before moving, the actor turns toward the destination and advances by one
/// step (never past the destination, never into another collider), and the
/// fine tolerance check after the move ends the walk. A step cut short by a
/// collider ends the walk where it stopped.
pub fn locomotion_system(
    time: Res<WorldTime>,
    config: Res<GameConfig>,
    mut physics: ResMut<PhysicsWorld>,
    mut actors: Query<(
        &mut Actor,
        &mut WorldPosition,
        &mut Heading,
        Option<&PhysicsBody>,
        Option<&mut ClipPlayer>,
    )>,
) {
    let settings = &config.locomotion;
    for (mut actor, mut position, mut heading, body, mut clips) in actors.iter_mut() {
        let mut pos = position.pos;
        if let Some(body) = body {
            match physics.body_state(body.handle) {
                Some(state) => {
                    pos.x = state.position.x;
                    pos.z = state.position.z;
                }
                None => warn!("actor body {:?} is gone, moving transform only", body.handle),
            }
        }

        if actor.motion == MotionState::Walking {
            match actor.destination {
                Some(dest) => {
                    let here = GroundPoint::new(pos.x, pos.z);
                    let close = coarse_eq(here.x, dest.x) && coarse_eq(here.z, dest.z);
                    if let Some(clips) = clips.as_mut() {
                        clips.play(if close { ClipKind::Idle } else { ClipKind::Walk });
                    }
                    let mut blocked = false;
                    if let Some(yaw) = here.yaw_to(dest) {
                        heading.set_if_neq(Heading { radians: yaw });
                        let direction = Vector3::new(yaw.cos(), 0.0, yaw.sin());
                        let mut travel = settings
                            .step_for(time.delta)
                            .min(here.distance_to(dest));
                        if let Some(body) = body {
                            let clear = physics.clear_distance(
                                body.handle,
                                pos,
                                direction,
                                travel,
                                config.physics.actor_radius,
                            );
                            blocked = clear < travel;
                            travel = clear;
                        }
                        pos += direction * travel;
                    }
                    if blocked {
                        actor.arrive();
                        if let Some(clips) = clips.as_mut() {
                            clips.play(ClipKind::Idle);
                        }
                        info!("blocked at ({:.2}, {:.2}), stopping", pos.x, pos.z);
                    } else if within(&pos, dest, settings.stop_tolerance) {
                        actor.arrive();
                        if let Some(clips) = clips.as_mut() {
                            clips.play(ClipKind::Idle);
                        }
                        info!("arrived at ({:.2}, {:.2})", pos.x, pos.z);
                    }
                }
                None => {
                    warn!("walking without a destination, stopping");
                    actor.arrive();
                }
            }
        }

        if let Some(body) = body {
            physics.set_body_translation(body.handle, pos);
        }
        position.set_if_neq(WorldPosition { pos });
    }
}
