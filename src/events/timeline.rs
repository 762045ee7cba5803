//! Timeline completion events.
//!
//! The tween system drains the [`Sequencer`]'s completion reports after
//! advancing it and triggers one [`TimelineFinishedEvent`] per timeline.
//! Observers use them to release the jump and camera locks.
//!
//! [`Sequencer`]: crate::resources::sequencer::Sequencer

use bevy_ecs::prelude::*;

use crate::resources::sequencer::TimelineId;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TimelineFinishedEvent {
    pub timeline: TimelineId,
    pub label: String,
    /// The timeline was cancelled or lost all of its tracks to a newer one.
    pub cancelled: bool,
}
