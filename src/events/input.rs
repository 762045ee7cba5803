//! Input events produced by the front end.
//!
//! The core never reads devices. A front end turns clicks into raycast hits
//! and key presses into requests, then triggers these events on the world
//! (see [`crate::game::Scene::on_pick_hits`] and
//! [`crate::game::Scene::on_jump_requested`]).

use bevy_ecs::prelude::*;
use nalgebra::Vector3;

use crate::components::groundpoint::GroundPoint;

/// The actor was asked to walk to `point`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GroundPickEvent {
    pub point: GroundPoint,
}

/// The actor was asked to jump.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct JumpRequestEvent {}

/// What a pick ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    Floor,
    Room,
    Actor,
    Other,
}

/// One intersection of a pick ray with the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub kind: PickKind,
    pub point: Vector3<f32>,
    pub distance: f32,
}

/// Resolve raycast hits into a ground point.
///
/// Only the nearest hit matters: a floor hit becomes a ground pick, anything
/// else in front of the floor swallows the click.
pub fn resolve_pick(hits: &[PickHit]) -> Option<GroundPoint> {
    let nearest = hits
        .iter()
        .filter(|h| h.distance.is_finite())
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;
    match nearest.kind {
        PickKind::Floor => Some(GroundPoint::new(nearest.point.x, nearest.point.z)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(kind: PickKind, x: f32, z: f32, distance: f32) -> PickHit {
        PickHit {
            kind,
            point: Vector3::new(x, 0.0, z),
            distance,
        }
    }

    #[test]
    fn test_nearest_floor_hit_is_accepted() {
        let hits = [
            hit(PickKind::Floor, 3.0, -2.0, 8.0),
            hit(PickKind::Floor, 9.0, 9.0, 20.0),
        ];
        assert_eq!(resolve_pick(&hits), Some(GroundPoint::new(3.0, -2.0)));
    }

    #[test]
    fn test_room_in_front_of_floor_swallows_click() {
        let hits = [
            hit(PickKind::Floor, 3.0, -2.0, 8.0),
            hit(PickKind::Room, 2.0, -1.0, 6.5),
        ];
        assert_eq!(resolve_pick(&hits), None);
    }

    #[test]
    fn test_no_hits() {
        assert_eq!(resolve_pick(&[]), None);
    }
}
