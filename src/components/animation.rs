//! Skeletal clip playback state for animated models.
//!
//! [`ClipSet`] maps the three gaits the actor needs onto clip indices of the
//! loaded model and is validated against the model's clip count when the
//! scene is built. [`ClipPlayer`] tracks which clip is playing and its local
//! time; the render backend is told about switches by the render sync system.

use bevy_ecs::prelude::Component;

use crate::error::SceneError;

/// Which logical clip is playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipKind {
    Idle,
    Walk,
    Jump,
}

impl ClipKind {
    pub fn name(self) -> &'static str {
        match self {
            ClipKind::Idle => "idle",
            ClipKind::Walk => "walk",
            ClipKind::Jump => "jump",
        }
    }
}

/// Clip indices for each [`ClipKind`], checked against the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipSet {
    idle: usize,
    walk: usize,
    jump: usize,
    walk_time_scale: f32,
}

impl ClipSet {
    /// Build a clip set for a model exposing `clip_count` clips.
    ///
    /// An index past the end of the model's clips is a misconfiguration and
    /// is reported as [`SceneError::MissingClip`].
    pub fn new(
        clip_count: usize,
        idle: usize,
        walk: usize,
        jump: usize,
        walk_time_scale: f32,
    ) -> Result<Self, SceneError> {
        for (kind, index) in [
            (ClipKind::Idle, idle),
            (ClipKind::Walk, walk),
            (ClipKind::Jump, jump),
        ] {
            if index >= clip_count {
                return Err(SceneError::MissingClip {
                    kind: kind.name(),
                    index,
                    count: clip_count,
                });
            }
        }
        Ok(Self {
            idle,
            walk,
            jump,
            walk_time_scale,
        })
    }

    pub fn index(&self, kind: ClipKind) -> usize {
        match kind {
            ClipKind::Idle => self.idle,
            ClipKind::Walk => self.walk,
            ClipKind::Jump => self.jump,
        }
    }

    pub fn time_scale(&self, kind: ClipKind) -> f32 {
        match kind {
            ClipKind::Walk => self.walk_time_scale,
            _ => 1.0,
        }
    }
}

/// Playback state of the clip currently applied to a model.
#[derive(Component, Clone, Debug)]
pub struct ClipPlayer {
    pub clips: ClipSet,
    pub active: ClipKind,
    /// Local time of the active clip in seconds, already time-scaled.
    pub elapsed: f32,
}

impl ClipPlayer {
    pub fn new(clips: ClipSet) -> Self {
        Self {
            clips,
            active: ClipKind::Idle,
            elapsed: 0.0,
        }
    }

    /// Switch to `kind`. Returns `false` when it is already playing, in which
    /// case playback continues uninterrupted.
    pub fn play(&mut self, kind: ClipKind) -> bool {
        if self.active == kind {
            return false;
        }
        self.active = kind;
        self.elapsed = 0.0;
        true
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt * self.time_scale();
    }

    pub fn clip_index(&self) -> usize {
        self.clips.index(self.active)
    }

    pub fn time_scale(&self) -> f32 {
        self.clips.time_scale(self.active)
    }
}
