//! Scene layout document.
//!
//! Describes which room models are placed where and which rooms are guarded
//! by a trigger zone. Loaded from JSON:
//!
//! ```json
//! {
//!   "rooms": [
//!     { "name": "room", "model": "/assets/models/Room_4__.glb",
//!       "position": [-5, -5, 0], "rotation": [1.5708, 0, 0], "scale": [0.01, 0.01, 0.01] }
//!   ],
//!   "zones": [
//!     { "target": "room", "activation": { "half_extent": 2.0 } }
//!   ]
//! }
//! ```
//!
//! A zone's anchor defaults to its room's ground position. Binding problems
//! (unknown room, a room claimed twice, duplicate names) are rejected by
//! [`SceneLayout::validate`] before anything is spawned.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::components::groundpoint::GroundPoint;
use crate::error::SceneError;
use crate::resources::gameconfig::ActivationOverrides;

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub name: String,
    pub model: String,
    pub position: [f32; 3],
    /// Rotations about X, Y and Z in radians, applied in that order.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl RoomLayout {
    pub fn ground(&self) -> GroundPoint {
        GroundPoint::new(self.position[0], self.position[2])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    /// Name of the room this zone reveals.
    pub target: String,
    #[serde(default)]
    pub anchor: Option<GroundPoint>,
    #[serde(default)]
    pub activation: ActivationOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    pub rooms: Vec<RoomLayout>,
    pub zones: Vec<ZoneLayout>,
}

impl SceneLayout {
    /// The two-room scene: a hidden room behind a zone and an open room.
    pub fn default_scene() -> Self {
        Self {
            rooms: vec![
                RoomLayout {
                    name: "room".into(),
                    model: "/assets/models/Room_4__.glb".into(),
                    position: [-5.0, -5.0, 0.0],
                    rotation: [FRAC_PI_2, 0.0, 0.0],
                    scale: [0.01, 0.01, 0.01],
                },
                RoomLayout {
                    name: "roomTwo".into(),
                    model: "/assets/models/Room_7.glb".into(),
                    position: [10.0, 0.0, -5.0],
                    rotation: [FRAC_PI_2, 0.0, FRAC_PI_2],
                    scale: [0.01, 0.01, 0.01],
                },
            ],
            zones: vec![ZoneLayout {
                target: "room".into(),
                anchor: None,
                activation: ActivationOverrides::default(),
            }],
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::LayoutRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn room(&self, name: &str) -> Option<&RoomLayout> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// The zone guarding `room`, if any.
    pub fn zone_for(&self, room: &str) -> Option<&ZoneLayout> {
        self.zones.iter().find(|z| z.target == room)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let mut names = FxHashSet::default();
        for room in &self.rooms {
            if !names.insert(room.name.as_str()) {
                return Err(SceneError::DuplicateRoom(room.name.clone()));
            }
        }
        let mut bound = FxHashSet::default();
        for (index, zone) in self.zones.iter().enumerate() {
            if !names.contains(zone.target.as_str()) {
                return Err(SceneError::UnboundZone {
                    zone: index,
                    target: zone.target.clone(),
                });
            }
            if !bound.insert(zone.target.as_str()) {
                return Err(SceneError::DuplicateZoneTarget(zone.target.clone()));
            }
        }
        Ok(())
    }
}
