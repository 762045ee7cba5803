//! Room reveal headless runner.
//!
//! Builds the scene with headless assets and a logging render backend, then
//! drives it for a fixed number of frames while replaying scripted input:
//! ground picks at given frames, jump requests, and optionally random
//! wandering. Useful for tuning `roomreveal.ini` and layouts without a
//! window.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=info cargo run --release -- --pick -5,0@10 --jump-at 200 --frames 600
//! ```

mod components;
mod error;
mod events;
mod game;
mod layout;
mod resources;
mod systems;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use crate::components::actor::Actor;
use crate::components::groundpoint::GroundPoint;
use crate::components::revealtarget::RevealTarget;
use crate::components::worldposition::WorldPosition;
use crate::game::Scene;
use crate::layout::SceneLayout;
use crate::resources::gameconfig::GameConfig;
use crate::resources::physicsworld::PhysicsWorld;
use crate::resources::renderbridge::{HeadlessAssets, HeadlessBackend};

/// Clips reported by every headless model; covers the default clip indices.
const HEADLESS_CLIPS: usize = 24;

/// A ground pick scheduled for a frame, written `X,Z@FRAME`.
#[derive(Debug, Clone, Copy)]
struct ScriptedPick {
    point: GroundPoint,
    frame: u64,
}

impl FromStr for ScriptedPick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (coords, frame) = s
            .split_once('@')
            .ok_or_else(|| format!("expected X,Z@FRAME, got '{}'", s))?;
        let (x, z) = coords
            .split_once(',')
            .ok_or_else(|| format!("expected X,Z, got '{}'", coords))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|e| format!("'{}': {}", v, e))
        };
        Ok(Self {
            point: GroundPoint::new(parse(x)?, parse(z)?),
            frame: frame
                .trim()
                .parse()
                .map_err(|e| format!("'{}': {}", frame, e))?,
        })
    }
}

/// Room reveal scene, headless
#[derive(Parser)]
#[command(version, about = "Drive the room reveal scene without a window.")]
struct Cli {
    /// INI file with scene tunables.
    #[arg(long, value_name = "PATH", default_value = "./roomreveal.ini")]
    config: PathBuf,

    /// JSON scene layout. The built-in two-room scene is used when omitted.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Ground pick as X,Z@FRAME. May be repeated.
    #[arg(long = "pick", value_name = "X,Z@FRAME", allow_hyphen_values = true)]
    picks: Vec<ScriptedPick>,

    /// Request a jump at FRAME. May be repeated.
    #[arg(long = "jump-at", value_name = "FRAME")]
    jumps: Vec<u64>,

    /// Pick a random floor point every N frames.
    #[arg(long, value_name = "N")]
    wander: Option<u64>,

    /// Seed for --wander.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        warn!("using default configuration: {}", e);
    }

    let layout = match &cli.layout {
        Some(path) => match SceneLayout::load(path) {
            Ok(layout) => layout,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => SceneLayout::default_scene(),
    };

    let wander_extent = config.physics.floor_size * 0.5 - config.physics.boundary_thickness;
    let mut scene = match Scene::build(
        config,
        layout,
        Arc::new(HeadlessAssets::new(HEADLESS_CLIPS)),
        Box::new(HeadlessBackend::new()),
    ) {
        Ok(scene) => scene,
        Err(e) => {
            error!("could not build scene: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    for frame in 0..cli.frames {
        for pick in cli.picks.iter().filter(|p| p.frame == frame) {
            scene.on_ground_pick(pick.point);
        }
        if cli.wander.is_some_and(|every| every > 0 && frame % every == 0) {
            let x = (rng.f32() * 2.0 - 1.0) * wander_extent;
            let z = (rng.f32() * 2.0 - 1.0) * wander_extent;
            scene.on_ground_pick(GroundPoint::new(x, z));
        }
        if cli.jumps.contains(&frame) {
            scene.on_jump_requested();
        }

        scene.tick(cli.dt);

        if frame % 60 == 0 {
            log_actor(&scene, frame);
        }
    }

    print_summary(&scene, cli.frames);
    ExitCode::SUCCESS
}

fn log_actor(scene: &Scene, frame: u64) {
    let Some(actor) = scene.actor() else {
        return;
    };
    let world = scene.world();
    if let (Some(state), Some(position)) = (
        world.get::<Actor>(actor),
        world.get::<WorldPosition>(actor),
    ) {
        info!(
            "frame {}: {:?} at ({:.2}, {:.2}, {:.2})",
            frame, state.motion, position.pos.x, position.pos.y, position.pos.z
        );
    }
}

fn print_summary(scene: &Scene, frames: u64) {
    let world = scene.world();
    println!("frames: {}", frames);
    println!(
        "physics steps: {}",
        world.resource::<PhysicsWorld>().steps_taken()
    );
    match scene.actor() {
        Some(actor) => {
            if let (Some(state), Some(position)) = (
                world.get::<Actor>(actor),
                world.get::<WorldPosition>(actor),
            ) {
                println!(
                    "actor: {:?} at ({:.3}, {:.3}, {:.3})",
                    state.motion, position.pos.x, position.pos.y, position.pos.z
                );
            }
        }
        None => println!("actor: none"),
    }
    let mut rooms: Vec<_> = scene.rooms().collect();
    rooms.sort_by_key(|(name, _)| *name);
    for (name, entity) in rooms {
        let visible = world
            .get::<RevealTarget>(entity)
            .is_none_or(|t| t.visible);
        println!("room '{}': visible={}", name, visible);
    }
}
