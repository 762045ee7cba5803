//! Camera that trails the actor at a fixed ground offset.

use bevy_ecs::prelude::Component;
use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::resources::sequencer::TimelineId;

/// Why the camera is not following.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraLock {
    /// Held for the whole jump, released when the jump lands.
    Jump,
    /// Held while a zone sequence runs, released when it finishes.
    Activation(TimelineId),
}

#[derive(Component, Clone, Debug)]
pub struct CameraRig {
    pub offset_x: f32,
    pub offset_z: f32,
    pub look_at: Vector3<f32>,
    locks: SmallVec<[CameraLock; 2]>,
}

impl CameraRig {
    pub fn new(offset_x: f32, offset_z: f32) -> Self {
        Self {
            offset_x,
            offset_z,
            look_at: Vector3::zeros(),
            locks: SmallVec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.locks.is_empty()
    }

    pub fn lock(&mut self, reason: CameraLock) {
        if !self.locks.contains(&reason) {
            self.locks.push(reason);
        }
    }

    /// Returns `true` if `reason` was holding the camera.
    pub fn unlock(&mut self, reason: CameraLock) -> bool {
        let before = self.locks.len();
        self.locks.retain(|l| *l != reason);
        self.locks.len() != before
    }

    pub fn locks(&self) -> &[CameraLock] {
        &self.locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locks_are_independent() {
        let mut rig = CameraRig::new(1.0, 5.0);
        assert!(!rig.is_locked());
        rig.lock(CameraLock::Jump);
        rig.lock(CameraLock::Jump);
        rig.lock(CameraLock::Activation(TimelineId(3)));
        assert_eq!(rig.locks().len(), 2);
        assert!(rig.unlock(CameraLock::Jump));
        assert!(rig.is_locked());
        assert!(!rig.unlock(CameraLock::Activation(TimelineId(4))));
        assert!(rig.unlock(CameraLock::Activation(TimelineId(3))));
        assert!(!rig.is_locked());
    }
}
