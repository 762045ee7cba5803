//! Render sync: push what changed this frame to the render backend.
//!
//! Runs last in the frame. Transforms, visibility, material colours and
//! camera pose use change detection, so an entity that did not move costs
//! nothing. Clip switches are detected against the last clip sent per
//! entity because the mixer touches every [`ClipPlayer`] each frame.
//!
//! Static bodies are excluded: their transform is pushed once when the scene
//! is built.

use bevy_ecs::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};
use rustc_hash::FxHashMap;

use crate::components::animation::ClipPlayer;
use crate::components::appearance::Appearance;
use crate::components::camerarig::CameraRig;
use crate::components::heading::Heading;
use crate::components::physicsbody::StaticBody;
use crate::components::rendermodel::RenderModel;
use crate::components::revealtarget::RevealTarget;
use crate::components::worldposition::WorldPosition;
use crate::resources::renderbridge::RenderBridge;

/// Rotation about +Y that turns the model's +X axis toward `heading`
/// (measured from +X toward +Z on the ground plane).
pub fn yaw_rotation(heading: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -heading)
}

type Moved = Or<(
    Changed<WorldPosition>,
    Changed<Heading>,
    Changed<RenderModel>,
)>;

#[allow(clippy::type_complexity)]
pub fn render_sync_system(
    mut bridge: ResMut<RenderBridge>,
    moved: Query<(&RenderModel, &WorldPosition, Option<&Heading>), (Moved, Without<StaticBody>)>,
    revealed: Query<(&RenderModel, &RevealTarget), Changed<RevealTarget>>,
    tinted: Query<(&RenderModel, &Appearance), Changed<Appearance>>,
    players: Query<(Entity, &RenderModel, &ClipPlayer)>,
    cameras: Query<(&WorldPosition, &CameraRig), Or<(Changed<WorldPosition>, Changed<CameraRig>)>>,
    mut sent_clips: Local<FxHashMap<Entity, (usize, f32)>>,
) {
    let backend = bridge.backend();

    for (model, position, heading) in moved.iter() {
        let rotation = match heading {
            Some(h) => yaw_rotation(h.radians) * model.base_rotation,
            None => model.base_rotation,
        };
        backend.set_transform(model.handle, &position.pos, &rotation, &model.scale);
    }

    for (model, target) in revealed.iter() {
        backend.set_visible(model.handle, target.visible);
    }

    for (model, appearance) in tinted.iter() {
        backend.set_material_color(model.handle, appearance.color, appearance.opacity);
    }

    for (entity, model, player) in players.iter() {
        let clip = (player.clip_index(), player.time_scale());
        if sent_clips.get(&entity) != Some(&clip) {
            backend.play_clip(model.handle, clip.0, clip.1);
            sent_clips.insert(entity, clip);
        }
    }

    for (position, rig) in cameras.iter() {
        backend.set_camera(&position.pos, &rig.look_at);
    }
}
