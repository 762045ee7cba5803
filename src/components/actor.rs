//! The controllable actor and its locomotion state.
//!
//! [`Actor`] holds everything the locomotion state machine needs between
//! frames: the current [`MotionState`], the active and pending destinations,
//! the vertical reference heights, and the bookkeeping for a jump in flight.
//! The transition methods here are pure; the systems in
//! [`crate::systems::locomotion`] call them and apply the side effects
//! (clips, camera lock, timelines, physics).

use bevy_ecs::prelude::Component;

use crate::components::groundpoint::GroundPoint;
use crate::resources::sequencer::TimelineId;

/// Mutually exclusive motion states of the actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionState {
    #[default]
    Idle,
    Walking,
    Jumping,
}

/// A jump that has started and not yet been released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpInFlight {
    /// Timeline driving the vertical arc.
    pub timeline: TimelineId,
    /// Seconds left before the fallback timer releases the jump. `None` when
    /// the jump is released by the timeline's completion instead.
    pub release_in: Option<f32>,
}

/// What a ground pick did to the actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickOutcome {
    /// The actor started (or kept) walking toward the new point. Carries the
    /// new heading, or `None` when the point is where the actor stands.
    Walking { heading: Option<f32> },
    /// The actor is mid-jump; the point was stored as the pending destination.
    Deferred,
}

/// The controllable character.
#[derive(Component, Clone, Debug)]
pub struct Actor {
    pub motion: MotionState,
    /// Active navigation target. Only meaningful while walking.
    pub destination: Option<GroundPoint>,
    /// Destination requested during a jump, applied once when it lands.
    pub pending_destination: Option<GroundPoint>,
    /// Height the actor stands at when no zone has raised it. Closing a zone
    /// returns the actor here.
    pub ground_y: f32,
    /// Absolute height at the top of the jump arc.
    pub jump_apex_y: f32,
    /// Height the actor returns to after a jump. Moved between `ground_y`
    /// and the zone's lift height by zone sequences.
    pub rest_y: f32,
    pub jump: Option<JumpInFlight>,
}

impl Actor {
    pub fn new(ground_y: f32, jump_apex_y: f32) -> Self {
        Self {
            motion: MotionState::Idle,
            destination: None,
            pending_destination: None,
            ground_y,
            jump_apex_y,
            rest_y: ground_y,
            jump: None,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.motion == MotionState::Jumping
    }

    /// Apply a ground pick.
    ///
    /// While jumping the point overwrites any earlier pending pick and
    /// nothing else changes. Otherwise the actor starts walking to it.
    pub fn pick(&mut self, current: GroundPoint, point: GroundPoint) -> PickOutcome {
        if self.is_jumping() {
            self.pending_destination = Some(point);
            return PickOutcome::Deferred;
        }
        self.destination = Some(point);
        self.pending_destination = None;
        self.motion = MotionState::Walking;
        PickOutcome::Walking {
            heading: current.yaw_to(point),
        }
    }

    /// Enter the jumping state. Returns `false` (and changes nothing) if a
    /// jump is already in flight.
    pub fn begin_jump(&mut self, timeline: TimelineId, release_in: Option<f32>) -> bool {
        if self.is_jumping() {
            return false;
        }
        self.motion = MotionState::Jumping;
        self.destination = None;
        self.jump = Some(JumpInFlight {
            timeline,
            release_in,
        });
        true
    }

    /// Leave the jumping state.
    ///
    /// A pending destination is consumed here and only here: it becomes the
    /// destination and the actor walks. Without one the actor goes idle.
    /// Returns the heading toward the consumed destination, if any.
    pub fn land(&mut self, current: GroundPoint) -> Option<f32> {
        if !self.is_jumping() {
            return None;
        }
        self.jump = None;
        match self.pending_destination.take() {
            Some(point) => {
                self.destination = Some(point);
                self.motion = MotionState::Walking;
                current.yaw_to(point)
            }
            None => {
                self.destination = None;
                self.motion = MotionState::Idle;
                None
            }
        }
    }

    /// Stop walking after converging on the destination.
    pub fn arrive(&mut self) {
        if self.motion == MotionState::Walking {
            self.motion = MotionState::Idle;
            self.destination = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(0.3, 4.0)
    }

    #[test]
    fn test_new_actor_is_idle_at_ground() {
        let a = actor();
        assert_eq!(a.motion, MotionState::Idle);
        assert!(a.destination.is_none());
        assert!(a.pending_destination.is_none());
        assert_eq!(a.rest_y, 0.3);
    }

    #[test]
    fn test_pick_while_idle_starts_walking() {
        let mut a = actor();
        let out = a.pick(GroundPoint::new(0.0, 0.0), GroundPoint::new(0.0, 2.0));
        assert_eq!(a.motion, MotionState::Walking);
        assert_eq!(a.destination, Some(GroundPoint::new(0.0, 2.0)));
        match out {
            PickOutcome::Walking { heading: Some(h) } => {
                assert!((h - std::f32::consts::FRAC_PI_2).abs() < 1e-6)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_pick_while_jumping_is_deferred_last_write_wins() {
        let mut a = actor();
        assert!(a.begin_jump(TimelineId(1), None));
        let here = GroundPoint::new(0.0, 0.0);
        assert_eq!(a.pick(here, GroundPoint::new(1.0, 1.0)), PickOutcome::Deferred);
        assert_eq!(a.pick(here, GroundPoint::new(-3.0, 2.0)), PickOutcome::Deferred);
        assert_eq!(a.motion, MotionState::Jumping);
        assert!(a.destination.is_none());
        assert_eq!(a.pending_destination, Some(GroundPoint::new(-3.0, 2.0)));
    }

    #[test]
    fn test_begin_jump_is_not_reentrant() {
        let mut a = actor();
        assert!(a.begin_jump(TimelineId(7), Some(1.5)));
        assert!(!a.begin_jump(TimelineId(8), Some(9.0)));
        let jump = a.jump.unwrap();
        assert_eq!(jump.timeline, TimelineId(7));
        assert_eq!(jump.release_in, Some(1.5));
    }

    #[test]
    fn test_land_consumes_pending_destination_once() {
        let mut a = actor();
        a.begin_jump(TimelineId(1), None);
        a.pick(GroundPoint::new(0.0, 0.0), GroundPoint::new(4.0, 0.0));
        let heading = a.land(GroundPoint::new(0.0, 0.0));
        assert_eq!(a.motion, MotionState::Walking);
        assert_eq!(a.destination, Some(GroundPoint::new(4.0, 0.0)));
        assert!(a.pending_destination.is_none());
        assert!(heading.unwrap().abs() < 1e-6);
        assert!(a.jump.is_none());

        // A second landing without a jump is a no-op.
        assert!(a.land(GroundPoint::new(0.0, 0.0)).is_none());
        assert_eq!(a.motion, MotionState::Walking);
    }

    #[test]
    fn test_land_without_pending_goes_idle() {
        let mut a = actor();
        a.pick(GroundPoint::new(0.0, 0.0), GroundPoint::new(4.0, 0.0));
        a.begin_jump(TimelineId(1), None);
        assert!(a.land(GroundPoint::new(1.0, 0.0)).is_none());
        assert_eq!(a.motion, MotionState::Idle);
        assert!(a.destination.is_none());
    }

    #[test]
    fn test_arrive_only_from_walking() {
        let mut a = actor();
        a.begin_jump(TimelineId(1), None);
        a.arrive();
        assert_eq!(a.motion, MotionState::Jumping);
    }
}
