//! Proximity trigger zones.
//!
//! A zone is a square on the ground centred at `anchor`. Containment is a
//! per-axis test against `half_extent`, and the zone only reacts to edges:
//! the frame the actor enters and the frame it leaves.

use bevy_ecs::prelude::{Component, Entity};

use crate::components::groundpoint::GroundPoint;
use crate::resources::gameconfig::ActivationConfig;
use crate::resources::sequencer::TimelineId;

/// Direction of a zone edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneEdge {
    Entered,
    Exited,
}

impl ZoneEdge {
    pub fn is_enter(self) -> bool {
        matches!(self, ZoneEdge::Entered)
    }
}

#[derive(Component, Clone, Debug)]
pub struct TriggerZone {
    pub anchor: GroundPoint,
    pub half_extent: f32,
    pub active: bool,
    /// The room revealed and hidden by this zone.
    pub target: Entity,
    /// Reveal or hide sequence currently in flight.
    pub sequence: Option<TimelineId>,
    /// Activation parameters with this zone's overrides already applied.
    pub activation: ActivationConfig,
}

impl TriggerZone {
    pub fn new(anchor: GroundPoint, target: Entity, activation: ActivationConfig) -> Self {
        Self {
            anchor,
            half_extent: activation.half_extent,
            active: false,
            target,
            sequence: None,
            activation,
        }
    }

    pub fn contains(&self, point: GroundPoint) -> bool {
        (self.anchor.x - point.x).abs() < self.half_extent
            && (self.anchor.z - point.z).abs() < self.half_extent
    }

    /// The edge `point` would cause, without changing the zone.
    pub fn crossing(&self, point: GroundPoint) -> Option<ZoneEdge> {
        match (self.active, self.contains(point)) {
            (false, true) => Some(ZoneEdge::Entered),
            (true, false) => Some(ZoneEdge::Exited),
            _ => None,
        }
    }
}
