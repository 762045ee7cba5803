//! Proximity activation: trigger zones reveal and hide their rooms.
//!
//! Every evaluated frame each zone tests the actor's ground position. On an
//! edge the zone flips `active`, cancels the sequence it launched last, and
//! plays exactly one new sequence:
//!
//! - reveal: room shown and bounced up to its active height, actor lifted,
//!   camera lowered, marker tinted with the active colour;
//! - hide: room hidden and sunk to its resting height, actor back on its
//!   ground height, camera returned, marker tinted with the inactive colour.
//!
//! All tracks of a sequence start at the same instant. Zones do not know
//! about each other; several can be active at once.

use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::actor::Actor;
use crate::components::appearance::Appearance;
use crate::components::camerarig::{CameraLock, CameraRig};
use crate::components::revealtarget::RevealTarget;
use crate::components::triggerzone::{TriggerZone, ZoneEdge};
use crate::components::worldposition::WorldPosition;
use crate::events::timeline::TimelineFinishedEvent;
use crate::events::zone::ZoneTransitionEvent;
use crate::resources::gameconfig::GameConfig;
use crate::resources::sequencer::{Placement, Sequencer, Timeline, Tween};

pub fn proximity_system(
    config: Res<GameConfig>,
    mut sequencer: ResMut<Sequencer>,
    mut actors: Query<(Entity, &mut Actor, &WorldPosition)>,
    mut zones: Query<(Entity, &mut TriggerZone, Option<&mut Appearance>)>,
    mut targets: Query<&mut RevealTarget>,
    mut rigs: Query<(Entity, &mut CameraRig)>,
    mut commands: Commands,
) {
    let Some((actor_entity, mut actor, actor_position)) = actors.iter_mut().next() else {
        return;
    };
    if !config.zone_evaluation.evaluates(actor.motion) {
        return;
    }
    let here = actor_position.ground();

    for (zone_entity, mut zone, appearance) in zones.iter_mut() {
        let Some(edge) = zone.crossing(here) else {
            continue;
        };
        let Ok(mut target) = targets.get_mut(zone.target) else {
            warn!("zone {:?} lost its target {:?}", zone_entity, zone.target);
            continue;
        };
        let entered = edge.is_enter();
        zone.active = entered;
        if let Some(previous) = zone.sequence.take() {
            sequencer.cancel_timeline(previous);
        }
        target.visible = entered;

        let cfg = &zone.activation;
        if let Some(mut appearance) = appearance {
            appearance.color = if entered {
                cfg.active_color
            } else {
                cfg.inactive_color
            };
        }

        let (label, target_tween, actor_y, camera_y) = if entered {
            (
                "reveal",
                Tween::position_y(zone.target, target.active_y, cfg.target_reveal_duration)
                    .with_easing(cfg.target_reveal_easing),
                cfg.actor_active_y,
                cfg.camera_active_y,
            )
        } else {
            (
                "hide",
                Tween::position_y(zone.target, target.resting_y, cfg.target_hide_duration)
                    .with_easing(cfg.target_hide_easing),
                actor.ground_y,
                cfg.camera_normal_y,
            )
        };
        let mut sequence = Timeline::new(label).with(target_tween).with(
            Tween::position_y(actor_entity, actor_y, cfg.actor_duration)
                .with_easing(cfg.actor_easing)
                .with_placement(Placement::WithPrevious(0.0)),
        );
        for (camera, _) in rigs.iter() {
            sequence.push(
                Tween::position_y(camera, camera_y, cfg.camera_duration)
                    .with_easing(cfg.camera_easing)
                    .with_placement(Placement::WithPrevious(0.0)),
            );
        }
        let id = sequencer.play(sequence);
        zone.sequence = Some(id);
        actor.rest_y = actor_y;

        if config.camera.lock_during_activation {
            for (_, mut rig) in rigs.iter_mut() {
                rig.lock(CameraLock::Activation(id));
            }
        }

        info!(
            "zone {:?} {}: {} {:?}",
            zone_entity,
            match edge {
                ZoneEdge::Entered => "entered",
                ZoneEdge::Exited => "exited",
            },
            label,
            zone.target
        );
        commands.trigger(ZoneTransitionEvent {
            zone: zone_entity,
            target: zone.target,
            edge,
            sequence: id,
        });
    }
}

/// Release activation locks held by finished zone sequences.
pub fn activation_unlock_observer(
    trigger: On<TimelineFinishedEvent>,
    mut rigs: Query<&mut CameraRig>,
) {
    let finished = trigger.event();
    for mut rig in rigs.iter_mut() {
        rig.unlock(CameraLock::Activation(finished.timeline));
    }
}
