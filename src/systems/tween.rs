//! Tween system.
//!
//! Advances the [`Sequencer`] by the frame delta, writing tweened values
//! straight into [`WorldPosition`] and [`Appearance`] components, and turns
//! its completion reports into [`TimelineFinishedEvent`]s.
//!
//! # Related
//!
//! - [`crate::resources::sequencer`] – timelines, placement and supersession
//! - [`crate::events::timeline::TimelineFinishedEvent`] – completion event

use bevy_ecs::prelude::*;

use crate::components::appearance::Appearance;
use crate::components::worldposition::WorldPosition;
use crate::events::timeline::TimelineFinishedEvent;
use crate::resources::sequencer::{Sequencer, TweenProperty, TweenTarget, TweenValue};
use crate::resources::worldtime::WorldTime;

/// Tween channels backed by ECS queries.
///
/// Each query keeps its own lifetimes; system parameters do not share them.
struct EcsChannels<'a, 'b, 'w1, 's1, 'q1, 'w2, 's2, 'q2> {
    positions: &'a mut Query<'w1, 's1, &'q1 mut WorldPosition>,
    appearances: &'b mut Query<'w2, 's2, &'q2 mut Appearance>,
}

impl TweenTarget for EcsChannels<'_, '_, '_, '_, '_, '_, '_, '_> {
    fn read(&self, target: Entity, property: TweenProperty) -> Option<TweenValue> {
        match property {
            TweenProperty::PositionY => self
                .positions
                .get(target)
                .ok()
                .map(|p| TweenValue::Scalar(p.pos.y)),
            TweenProperty::Opacity => self
                .appearances
                .get(target)
                .ok()
                .map(|a| TweenValue::Scalar(a.opacity)),
            TweenProperty::Color => self
                .appearances
                .get(target)
                .ok()
                .map(|a| TweenValue::Color(a.color)),
        }
    }

    fn write(&mut self, target: Entity, property: TweenProperty, value: TweenValue) -> bool {
        match (property, value) {
            (TweenProperty::PositionY, TweenValue::Scalar(y)) => {
                match self.positions.get_mut(target) {
                    Ok(mut p) => {
                        p.pos.y = y;
                        true
                    }
                    Err(_) => false,
                }
            }
            (TweenProperty::Opacity, TweenValue::Scalar(o)) => {
                match self.appearances.get_mut(target) {
                    Ok(mut a) => {
                        a.opacity = o.clamp(0.0, 1.0);
                        true
                    }
                    Err(_) => false,
                }
            }
            (TweenProperty::Color, TweenValue::Color(c)) => match self.appearances.get_mut(target) {
                Ok(mut a) => {
                    a.color = c;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}

/// Advance all timelines and report the ones that finished.
pub fn tween_sequencer_system(
    world_time: Res<WorldTime>,
    mut sequencer: ResMut<Sequencer>,
    mut positions: Query<&mut WorldPosition>,
    mut appearances: Query<&mut Appearance>,
    mut commands: Commands,
) {
    let mut channels = EcsChannels {
        positions: &mut positions,
        appearances: &mut appearances,
    };
    sequencer.advance(world_time.delta, &mut channels);
    for finished in sequencer.drain_finished() {
        commands.trigger(TimelineFinishedEvent {
            timeline: finished.id,
            label: finished.label,
            cancelled: finished.cancelled,
        });
    }
}
