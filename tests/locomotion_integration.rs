//! Locomotion integration tests: walking, jumping and pending destinations
//! driven through the full frame schedule.

use std::sync::Arc;

use roomreveal::components::actor::{Actor, MotionState};
use roomreveal::components::animation::{ClipKind, ClipPlayer};
use roomreveal::components::camerarig::CameraRig;
use roomreveal::components::groundpoint::GroundPoint;
use roomreveal::components::physicsbody::PhysicsBody;
use roomreveal::components::pickmarker::PickMarker;
use roomreveal::components::worldposition::WorldPosition;
use roomreveal::game::Scene;
use roomreveal::layout::SceneLayout;
use roomreveal::resources::gameconfig::{GameConfig, JumpRelease};
use roomreveal::resources::physicsworld::PhysicsWorld;
use roomreveal::resources::renderbridge::{HeadlessAssets, HeadlessBackend};
use roomreveal::resources::sequencer::{Sequencer, TweenProperty};

const DT: f32 = 1.0 / 60.0;

fn make_scene(config: GameConfig) -> Scene {
    Scene::build(
        config,
        SceneLayout::default(),
        Arc::new(HeadlessAssets::new(24)),
        Box::new(HeadlessBackend::new()),
    )
    .expect("scene builds")
}

fn actor(scene: &Scene) -> Actor {
    let entity = scene.actor().expect("actor spawned");
    scene.world().get::<Actor>(entity).cloned().expect("actor component")
}

fn position(scene: &Scene) -> WorldPosition {
    let entity = scene.actor().expect("actor spawned");
    *scene.world().get::<WorldPosition>(entity).expect("position")
}

/// Tick until `done` holds, returning the number of ticks taken.
fn tick_until(scene: &mut Scene, max: usize, done: impl Fn(&Scene) -> bool) -> Option<usize> {
    for n in 1..=max {
        scene.tick(DT);
        if done(scene) {
            return Some(n);
        }
    }
    None
}

fn assert_consistent(a: &Actor) {
    match a.motion {
        MotionState::Idle => {
            assert!(a.destination.is_none());
            assert!(a.jump.is_none());
        }
        MotionState::Walking => {
            assert!(a.destination.is_some());
            assert!(a.jump.is_none());
        }
        MotionState::Jumping => {
            assert!(a.destination.is_none());
            assert!(a.jump.is_some());
        }
    }
}

#[test]
fn walk_converges_on_destination() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_ground_pick(GroundPoint::new(5.0, 0.0));
    assert_eq!(actor(&scene).motion, MotionState::Walking);

    let ticks = tick_until(&mut scene, 200, |s| actor(s).motion == MotionState::Idle)
        .expect("actor arrives");
    // 5 units at 0.08 per tick
    assert!((62..=64).contains(&ticks), "took {} ticks", ticks);

    let p = position(&scene).pos;
    assert!((p.x - 5.0).abs() < 0.03);
    assert!(p.z.abs() < 0.03);
    assert!((p.y - 0.3).abs() < 1e-5);
    assert!(actor(&scene).destination.is_none());

    let entity = scene.actor().unwrap();
    let clips = scene.world().get::<ClipPlayer>(entity).unwrap();
    assert_eq!(clips.active, ClipKind::Idle);
}

#[test]
fn pick_moves_marker() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_ground_pick(GroundPoint::new(-3.0, 7.0));
    let marker = scene.pick_marker();
    let world = scene.world();
    assert!(world.get::<PickMarker>(marker).is_some());
    let p = world.get::<WorldPosition>(marker).unwrap().pos;
    assert_eq!((p.x, p.z), (-3.0, 7.0));
    assert!(p.y > 0.0);
}

#[test]
fn walk_plays_walk_clip_until_close() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_ground_pick(GroundPoint::new(2.0, 2.0));
    scene.tick(DT);
    let entity = scene.actor().unwrap();
    let clips = scene.world().get::<ClipPlayer>(entity).unwrap();
    assert_eq!(clips.active, ClipKind::Walk);
    assert_eq!(clips.time_scale(), 2.0);
}

#[test]
fn motion_states_stay_consistent_through_a_session() {
    let mut scene = make_scene(GameConfig::new());
    for frame in 0..600u32 {
        match frame {
            5 => scene.on_ground_pick(GroundPoint::new(4.0, -3.0)),
            30 => scene.on_jump_requested(),
            40 => scene.on_ground_pick(GroundPoint::new(-2.0, 2.0)),
            45 => scene.on_jump_requested(),
            200 => scene.on_jump_requested(),
            300 => scene.on_ground_pick(GroundPoint::new(1.0, 1.0)),
            _ => {}
        }
        scene.tick(DT);
        assert_consistent(&actor(&scene));
    }
}

#[test]
fn second_jump_request_is_ignored() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_jump_requested();
    let first = actor(&scene).jump.expect("jump started").timeline;
    for _ in 0..10 {
        scene.tick(DT);
    }
    let elapsed = scene
        .world()
        .resource::<Sequencer>()
        .elapsed(first)
        .expect("arc playing");
    assert!((elapsed - 10.0 * DT).abs() < 1e-4, "elapsed {}", elapsed);

    scene.on_jump_requested();
    let a = actor(&scene);
    assert_eq!(a.motion, MotionState::Jumping);
    assert_eq!(a.jump.unwrap().timeline, first);

    let entity = scene.actor().unwrap();
    {
        let seq = scene.world().resource::<Sequencer>();
        // rise and fall, both still owned by the first arc
        assert_eq!(seq.active_track_count(entity, TweenProperty::PositionY), 2);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.duration(first), Some(1.0));
        assert_eq!(seq.elapsed(first), Some(elapsed));
    }

    scene.tick(DT);
    let seq = scene.world().resource::<Sequencer>();
    let resumed = seq.elapsed(first).expect("arc still playing");
    assert!((resumed - elapsed - DT).abs() < 1e-5, "elapsed {}", resumed);
    assert_eq!(seq.duration(first), Some(1.0));
}

#[test]
fn jump_reaches_apex_and_lands_idle() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_jump_requested();
    let camera = scene.camera();
    assert!(scene.world().get::<CameraRig>(camera).unwrap().is_locked());

    let mut peak = 0.0f32;
    let ticks = tick_until(&mut scene, 120, |s| !actor(s).is_jumping()).expect("jump lands");
    assert!((58..=62).contains(&ticks), "landed after {} ticks", ticks);
    // Replay to observe the peak.
    scene.on_jump_requested();
    for _ in 0..70 {
        scene.tick(DT);
        peak = peak.max(position(&scene).pos.y);
    }
    assert!(peak > 3.8 && peak <= 4.0 + 1e-4, "peak {}", peak);

    assert_eq!(actor(&scene).motion, MotionState::Idle);
    assert!((position(&scene).pos.y - 0.3).abs() < 1e-4);
    assert!(!scene.world().get::<CameraRig>(camera).unwrap().is_locked());
}

#[test]
fn jump_cancels_walk() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_ground_pick(GroundPoint::new(10.0, 0.0));
    for _ in 0..10 {
        scene.tick(DT);
    }
    scene.on_jump_requested();
    let x_at_jump = position(&scene).pos.x;
    for _ in 0..20 {
        scene.tick(DT);
    }
    // Airborne actors keep their ground position.
    assert!((position(&scene).pos.x - x_at_jump).abs() < 1e-3);
    tick_until(&mut scene, 120, |s| !actor(s).is_jumping()).expect("jump lands");
    assert_eq!(actor(&scene).motion, MotionState::Idle);
}

#[test]
fn last_pick_during_jump_wins() {
    // Jump lasts 60 ticks; picks land at 0.1 and 0.4 of it.
    let mut scene = make_scene(GameConfig::new());
    scene.on_jump_requested();
    for _ in 0..6 {
        scene.tick(DT);
    }
    scene.on_ground_pick(GroundPoint::new(3.0, 0.0));
    for _ in 0..18 {
        scene.tick(DT);
    }
    scene.on_ground_pick(GroundPoint::new(-4.0, 1.0));

    let a = actor(&scene);
    assert_eq!(a.motion, MotionState::Jumping);
    assert_eq!(a.pending_destination, Some(GroundPoint::new(-4.0, 1.0)));
    assert!(a.destination.is_none());

    tick_until(&mut scene, 120, |s| !actor(s).is_jumping()).expect("jump lands");
    let a = actor(&scene);
    assert_eq!(a.motion, MotionState::Walking);
    assert_eq!(a.destination, Some(GroundPoint::new(-4.0, 1.0)));
    assert!(a.pending_destination.is_none());

    tick_until(&mut scene, 200, |s| actor(s).motion == MotionState::Idle).expect("arrives");
    let p = position(&scene).pos;
    assert!((p.x + 4.0).abs() < 0.03 && (p.z - 1.0).abs() < 0.03);
}

#[test]
fn timer_release_lands_after_scaled_duration() {
    let mut config = GameConfig::new();
    config.jump.release = JumpRelease::Timer;
    let mut scene = make_scene(config);
    scene.on_jump_requested();
    let ticks = tick_until(&mut scene, 200, |s| !actor(s).is_jumping()).expect("jump lands");
    // 1.5 x 1.0 s
    assert!((89..=91).contains(&ticks), "landed after {} ticks", ticks);
}

#[test]
fn grounded_actor_is_stable() {
    let mut scene = make_scene(GameConfig::new());
    let entity = scene.actor().unwrap();
    let body = *scene.world().get::<PhysicsBody>(entity).unwrap();
    for _ in 0..1000 {
        scene.tick(DT);
        assert!(position(&scene).pos.y >= 0.3 - 1e-5);
    }
    let p = position(&scene).pos;
    assert!(p.x.abs() < 1e-3 && p.z.abs() < 1e-3);
    assert!((p.y - 0.3).abs() < 1e-5);

    let physics = scene.world().resource::<PhysicsWorld>();
    let state = physics.body_state(body.handle).unwrap();
    assert!((state.position.y - 0.3).abs() < 0.05, "body at {}", state.position.y);
    assert!(state.linvel.norm() < 1e-3);
    assert_eq!(actor(&scene).motion, MotionState::Idle);
}

#[test]
fn boundary_wall_stops_the_actor() {
    let mut scene = make_scene(GameConfig::new());
    scene.on_ground_pick(GroundPoint::new(60.0, 0.0));
    tick_until(&mut scene, 1000, |s| actor(s).motion == MotionState::Idle)
        .expect("actor stops at the wall");

    // wall face at 49.5, actor radius 0.3
    let p = position(&scene).pos;
    assert!(p.x <= 49.2 + 1e-3, "actor centre at {}", p.x);
    assert!(p.x > 49.0, "actor centre at {}", p.x);

    let entity = scene.actor().unwrap();
    let body = *scene.world().get::<PhysicsBody>(entity).unwrap();
    let state = scene
        .world()
        .resource::<PhysicsWorld>()
        .body_state(body.handle)
        .unwrap();
    assert!(state.position.x <= 49.2 + 1e-3, "body at {}", state.position.x);

    for _ in 0..60 {
        scene.tick(DT);
        assert!(position(&scene).pos.x <= 49.2 + 1e-3);
    }

    // Walking back out is not blocked.
    scene.on_ground_pick(GroundPoint::new(45.0, 0.0));
    tick_until(&mut scene, 200, |s| actor(s).motion == MotionState::Idle).expect("walks back");
    assert!((position(&scene).pos.x - 45.0).abs() < 0.03);
}

#[test]
fn jump_lands_without_stored_fall_speed() {
    let mut scene = make_scene(GameConfig::new());
    let entity = scene.actor().unwrap();
    let body = *scene.world().get::<PhysicsBody>(entity).unwrap();
    scene.on_jump_requested();
    for _ in 0..30 {
        scene.tick(DT);
        let state = scene
            .world()
            .resource::<PhysicsWorld>()
            .body_state(body.handle)
            .unwrap();
        assert!(state.linvel.y.abs() < 1e-6, "vy {}", state.linvel.y);
    }
    tick_until(&mut scene, 120, |s| !actor(s).is_jumping()).expect("jump lands");
    scene.tick(DT);
    let state = scene
        .world()
        .resource::<PhysicsWorld>()
        .body_state(body.handle)
        .unwrap();
    assert!(state.linvel.norm() < 1e-3, "|v| {}", state.linvel.norm());
}
