use bevy_ecs::prelude::*;

use crate::components::triggerzone::ZoneEdge;
use crate::resources::sequencer::TimelineId;

/// A trigger zone flipped and launched its reveal or hide sequence.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ZoneTransitionEvent {
    pub zone: Entity,
    pub target: Entity,
    pub edge: ZoneEdge,
    pub sequence: TimelineId,
}
