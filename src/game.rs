//! Scene construction and the per-frame driver.
//!
//! [`Scene::build`] turns a [`GameConfig`] and a [`SceneLayout`] into a
//! populated ECS world: floor and boundary walls, the camera rig, the pick
//! marker, the actor, rooms and the trigger zones guarding them. Models are
//! loaded concurrently up front; the world is only populated once every load
//! has reported back.
//!
//! [`Scene::tick`] runs one frame. The systems are chained in a fixed order:
//!
//! 1. physics step, then grounded settling
//! 2. tween sequencer (fires timeline completion observers)
//! 3. clip mixer and jump release timer
//! 4. locomotion integrator
//! 5. proximity activation
//! 6. camera follow
//! 7. render sync
//!
//! Input arrives between frames through [`Scene::on_pick_hits`],
//! [`Scene::on_ground_pick`] and [`Scene::on_jump_requested`], which trigger
//! observers immediately.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use log::{error, info};
use nalgebra::{UnitQuaternion, Vector3};
use rustc_hash::FxHashMap;

use crate::components::actor::Actor;
use crate::components::animation::{ClipPlayer, ClipSet};
use crate::components::appearance::{Appearance, Rgb};
use crate::components::camerarig::CameraRig;
use crate::components::groundpoint::GroundPoint;
use crate::components::heading::Heading;
use crate::components::physicsbody::{PhysicsBody, StaticBody};
use crate::components::pickmarker::PickMarker;
use crate::components::rendermodel::RenderModel;
use crate::components::revealtarget::RevealTarget;
use crate::components::triggerzone::TriggerZone;
use crate::components::worldposition::WorldPosition;
use crate::error::{AssetError, SceneError};
use crate::events::input::{GroundPickEvent, JumpRequestEvent, PickHit, resolve_pick};
use crate::layout::{RoomLayout, SceneLayout};
use crate::resources::gameconfig::{ActivationConfig, GameConfig, PhysicsSettings};
use crate::resources::physicsworld::{
    BodyDesc, BodyShape, Material, PhysicsWorld, orientation_from_xyz,
};
use crate::resources::renderbridge::{
    AssetSource, LoadedModel, Primitive, RenderBackend, RenderBridge, load_models,
};
use crate::resources::sequencer::Sequencer;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::clip_mixer_system;
use crate::systems::camera::camera_follow_system;
use crate::systems::locomotion::{
    ground_pick_observer, jump_finished_observer, jump_release_timer_system,
    jump_request_observer, locomotion_system,
};
use crate::systems::physics::{physics_step_system, settle_grounded_system};
use crate::systems::proximity::{activation_unlock_observer, proximity_system};
use crate::systems::render::render_sync_system;
use crate::systems::time::update_world_time;
use crate::systems::tween::tween_sequencer_system;

/// Height of the pick marker above the floor, to avoid z-fighting.
const MARKER_LIFT: f32 = 0.01;
const ZONE_LIFT: f32 = 0.005;

/// The per-frame schedule, in execution order.
pub fn build_frame_schedule() -> Schedule {
    let mut frame = Schedule::default();
    frame.add_systems(
        (
            physics_step_system,
            settle_grounded_system,
            tween_sequencer_system,
            clip_mixer_system,
            jump_release_timer_system,
            locomotion_system,
            proximity_system,
            camera_follow_system,
            render_sync_system,
        )
            .chain(),
    );
    frame
}

pub struct Scene {
    world: World,
    frame: Schedule,
    actor: Option<Entity>,
    camera: Entity,
    marker: Entity,
    floor: Entity,
    boundaries: ArrayVec<Entity, 4>,
    rooms: FxHashMap<String, Entity>,
    /// Zone entities keyed by the name of the room they guard.
    zones: FxHashMap<String, Entity>,
}

impl Scene {
    /// Build the scene.
    ///
    /// Fails on an inconsistent layout or when the actor model does not
    /// carry the configured clips. A model that fails to load is logged and
    /// its entity (and any zone guarding it) is left out.
    pub fn build(
        config: GameConfig,
        layout: SceneLayout,
        assets: Arc<dyn AssetSource>,
        backend: Box<dyn RenderBackend>,
    ) -> Result<Self, SceneError> {
        layout.validate()?;

        let mut world = World::new();
        let mut physics = PhysicsWorld::from_settings(&config.physics);
        let mut bridge = RenderBridge::new(backend);

        let mut paths = Vec::with_capacity(layout.rooms.len() + 1);
        paths.push(config.actor.model.clone());
        paths.extend(layout.rooms.iter().map(|r| r.model.clone()));
        let mut loaded = load_models(assets, &paths).into_iter();
        let actor_model = loaded
            .next()
            .unwrap_or_else(|| Err(AssetError::Disconnected(config.actor.model.clone())));

        let floor = spawn_floor(&mut world, &mut physics, &mut bridge, &config.physics);
        let boundaries = spawn_boundaries(&mut world, &mut physics, &mut bridge, &config.physics);

        let camera = world
            .spawn((
                CameraRig::new(config.camera.offset_x, config.camera.offset_z),
                WorldPosition::new(
                    config.camera.offset_x,
                    config.camera.height,
                    config.camera.offset_z,
                ),
            ))
            .id();

        let marker_handle = bridge.backend().spawn_primitive(Primitive::Plane {
            width: 2.0,
            depth: 2.0,
        });
        let marker = world
            .spawn((
                PickMarker,
                RenderModel::new(marker_handle),
                WorldPosition::new(0.0, MARKER_LIFT, 0.0),
                Appearance::new(Rgb::ORANGE, 0.35),
            ))
            .id();

        let actor = match actor_model {
            Ok(model) => Some(spawn_actor(&mut world, &mut physics, &config, model)?),
            Err(e) => {
                error!("actor model failed to load, scene has no actor: {}", e);
                None
            }
        };

        let mut rooms = FxHashMap::default();
        let mut zones = FxHashMap::default();
        for (room, result) in layout.rooms.iter().zip(loaded) {
            let model = match result {
                Ok(model) => model,
                Err(e) => {
                    error!("room '{}' skipped: {}", room.name, e);
                    continue;
                }
            };
            let zone_layout = layout.zone_for(&room.name);
            let activation = zone_layout.map(|z| config.activation.merged(&z.activation));
            let room_entity = spawn_room(&mut world, room, model, activation.as_ref());
            rooms.insert(room.name.clone(), room_entity);

            let (Some(zone_layout), Some(activation)) = (zone_layout, activation) else {
                continue;
            };
            let anchor = zone_layout.anchor.unwrap_or_else(|| room.ground());
            let size = activation.half_extent * 2.0;
            let handle = bridge.backend().spawn_primitive(Primitive::Plane {
                width: size,
                depth: size,
            });
            let inactive = activation.inactive_color;
            let zone = world
                .spawn((
                    TriggerZone::new(anchor, room_entity, activation),
                    RenderModel::new(handle),
                    WorldPosition::new(anchor.x, ZONE_LIFT, anchor.z),
                    Appearance::new(inactive, 1.0),
                ))
                .id();
            zones.insert(room.name.clone(), zone);
        }

        info!(
            "scene built: {} room(s), {} zone(s), {} bod(ies), actor {}",
            rooms.len(),
            zones.len(),
            physics.body_count(),
            if actor.is_some() { "present" } else { "missing" }
        );

        world.insert_resource(config);
        world.insert_resource(WorldTime::default());
        world.insert_resource(Sequencer::new());
        world.insert_resource(physics);
        world.insert_resource(bridge);

        world.add_observer(ground_pick_observer);
        world.add_observer(jump_request_observer);
        world.add_observer(jump_finished_observer);
        world.add_observer(activation_unlock_observer);
        world.flush();

        Ok(Self {
            world,
            frame: build_frame_schedule(),
            actor,
            camera,
            marker,
            floor,
            boundaries,
            rooms,
            zones,
        })
    }

    /// Run one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.frame.run(&mut self.world);
        self.world.clear_trackers();
    }

    pub fn on_ground_pick(&mut self, point: GroundPoint) {
        self.world.trigger(GroundPickEvent { point });
    }

    /// Resolve raycast hits and walk to the floor point if the nearest hit
    /// is the floor. Returns whether a walk was requested.
    pub fn on_pick_hits(&mut self, hits: &[PickHit]) -> bool {
        match resolve_pick(hits) {
            Some(point) => {
                self.on_ground_pick(point);
                true
            }
            None => false,
        }
    }

    pub fn on_jump_requested(&mut self) {
        self.world.trigger(JumpRequestEvent {});
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn actor(&self) -> Option<Entity> {
        self.actor
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn pick_marker(&self) -> Entity {
        self.marker
    }

    pub fn floor(&self) -> Entity {
        self.floor
    }

    pub fn boundaries(&self) -> &[Entity] {
        &self.boundaries
    }

    pub fn room(&self, name: &str) -> Option<Entity> {
        self.rooms.get(name).copied()
    }

    pub fn rooms(&self) -> impl Iterator<Item = (&str, Entity)> + '_ {
        self.rooms.iter().map(|(name, e)| (name.as_str(), *e))
    }

    /// The zone guarding the room called `name`.
    pub fn zone(&self, name: &str) -> Option<Entity> {
        self.zones.get(name).copied()
    }
}

fn spawn_floor(
    world: &mut World,
    physics: &mut PhysicsWorld,
    bridge: &mut RenderBridge,
    settings: &PhysicsSettings,
) -> Entity {
    let half = settings.floor_size * 0.5;
    let body = physics.create_body(BodyDesc::fixed(
        BodyShape::Cuboid {
            half_extents: Vector3::new(half, 0.5, half),
        },
        Vector3::new(0.0, -0.5, 0.0),
    ));
    let handle = bridge.backend().spawn_primitive(Primitive::Plane {
        width: settings.floor_size,
        depth: settings.floor_size,
    });
    let model = RenderModel::new(handle);
    let position = WorldPosition::default();
    bridge
        .backend()
        .set_transform(handle, &position.pos, &model.base_rotation, &model.scale);
    world
        .spawn((model, position, PhysicsBody::new(body), StaticBody))
        .id()
}

/// Four walls enclosing the floor.
fn spawn_boundaries(
    world: &mut World,
    physics: &mut PhysicsWorld,
    bridge: &mut RenderBridge,
    settings: &PhysicsSettings,
) -> ArrayVec<Entity, 4> {
    let edge = settings.floor_size * 0.5;
    let half_extents = Vector3::new(
        edge,
        settings.boundary_height * 0.5,
        settings.boundary_thickness * 0.5,
    );
    let y = settings.boundary_height * 0.5;
    let walls = [
        (Vector3::new(0.0, y, -edge), 0.0),
        (Vector3::new(0.0, y, edge), 0.0),
        (Vector3::new(-edge, y, 0.0), FRAC_PI_2),
        (Vector3::new(edge, y, 0.0), FRAC_PI_2),
    ];

    let mut out = ArrayVec::new();
    for (position, yaw) in walls {
        let orientation = orientation_from_xyz(0.0, yaw, 0.0);
        let body = physics.create_body(
            BodyDesc::fixed(BodyShape::Cuboid { half_extents }, position)
                .with_orientation(orientation),
        );
        let handle = bridge
            .backend()
            .spawn_primitive(Primitive::Box { half_extents });
        let model = RenderModel::new(handle).with_rotation(orientation);
        bridge
            .backend()
            .set_transform(handle, &position, &orientation, &model.scale);
        out.push(
            world
                .spawn((
                    model,
                    WorldPosition { pos: position },
                    PhysicsBody::new(body),
                    StaticBody,
                ))
                .id(),
        );
    }
    out
}

fn spawn_actor(
    world: &mut World,
    physics: &mut PhysicsWorld,
    config: &GameConfig,
    model: LoadedModel,
) -> Result<Entity, SceneError> {
    let settings = &config.actor;
    let clips = ClipSet::new(
        model.clip_count,
        settings.idle_clip,
        settings.walk_clip,
        settings.jump_clip,
        settings.walk_time_scale,
    )?;
    let start = WorldPosition::new(0.0, settings.ground_y, 0.0);
    let mut actor = world.spawn((
        Actor::new(settings.ground_y, config.jump.apex_y),
        start,
        Heading::default(),
        ClipPlayer::new(clips),
        RenderModel::new(model.handle),
    ));
    if config.physics.actor_body {
        let body = physics.create_body(BodyDesc {
            mass: config.physics.actor_mass,
            shape: BodyShape::Ball {
                radius: config.physics.actor_radius,
            },
            material: Material::Actor,
            position: start.pos,
            orientation: UnitQuaternion::identity(),
            lock_rotations: true,
        });
        actor.insert(PhysicsBody::new(body));
    }
    Ok(actor.id())
}

fn spawn_room(
    world: &mut World,
    room: &RoomLayout,
    model: LoadedModel,
    activation: Option<&ActivationConfig>,
) -> Entity {
    let [rx, ry, rz] = room.rotation;
    let [sx, sy, sz] = room.scale;
    let render = RenderModel::new(model.handle)
        .with_rotation(orientation_from_xyz(rx, ry, rz))
        .with_scale(Vector3::new(sx, sy, sz));
    let [x, y, z] = room.position;
    match activation {
        Some(cfg) => {
            let target = RevealTarget::new(cfg.target_hidden_y, cfg.target_active_y);
            world
                .spawn((render, WorldPosition::new(x, target.resting_y, z), target))
                .id()
        }
        None => world.spawn((render, WorldPosition::new(x, y, z))).id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::MotionState;
    use crate::resources::renderbridge::{HeadlessAssets, HeadlessBackend};

    fn scene() -> Scene {
        Scene::build(
            GameConfig::new(),
            SceneLayout::default_scene(),
            Arc::new(HeadlessAssets::new(24)),
            Box::new(HeadlessBackend::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_default_scene_contents() {
        let scene = scene();
        let world = scene.world();
        assert!(scene.actor().is_some());
        assert_eq!(scene.boundaries().len(), 4);
        // floor, four walls, actor
        assert_eq!(world.resource::<PhysicsWorld>().body_count(), 6);

        let room = scene.room("room").unwrap();
        let target = world.get::<RevealTarget>(room).unwrap();
        assert!(!target.visible);
        assert_eq!(world.get::<WorldPosition>(room).unwrap().pos.y, -5.0);

        let open = scene.room("roomTwo").unwrap();
        assert!(world.get::<RevealTarget>(open).is_none());
        assert!(scene.zone("roomTwo").is_none());

        let zone = world.get::<TriggerZone>(scene.zone("room").unwrap()).unwrap();
        assert_eq!(zone.anchor, GroundPoint::new(-5.0, 0.0));
        assert_eq!(zone.target, room);
        assert_eq!(zone.half_extent, 1.5);
    }

    #[test]
    fn test_pick_hits_on_room_are_ignored() {
        use crate::events::input::PickKind;
        let mut scene = scene();
        let walked = scene.on_pick_hits(&[
            PickHit {
                kind: PickKind::Room,
                point: Vector3::new(3.0, 1.0, 3.0),
                distance: 2.0,
            },
            PickHit {
                kind: PickKind::Floor,
                point: Vector3::new(3.0, 0.0, 4.0),
                distance: 5.0,
            },
        ]);
        assert!(!walked);
        let actor = scene.actor().unwrap();
        assert_eq!(
            scene.world().get::<Actor>(actor).unwrap().motion,
            MotionState::Idle
        );
    }

    #[test]
    fn test_without_actor_body() {
        let mut config = GameConfig::new();
        config.physics.actor_body = false;
        let mut scene = Scene::build(
            config,
            SceneLayout::default_scene(),
            Arc::new(HeadlessAssets::new(24)),
            Box::new(HeadlessBackend::new()),
        )
        .unwrap();
        let actor = scene.actor().unwrap();
        assert!(scene.world().get::<PhysicsBody>(actor).is_none());
        scene.on_ground_pick(GroundPoint::new(1.0, 0.0));
        for _ in 0..60 {
            scene.tick(1.0 / 60.0);
        }
        let pos = scene.world().get::<WorldPosition>(actor).unwrap().pos;
        assert!((pos.x - 1.0).abs() < 0.03);
        assert_eq!(pos.y, 0.3);
    }
}
