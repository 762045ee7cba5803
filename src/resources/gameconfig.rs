//! Game configuration resource.
//!
//! Holds every tunable of the scene with compiled-in defaults, optionally
//! overridden from an INI file. Missing keys keep their defaults; a key that
//! is present but unparsable is an error.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! gravity = -10
//! fixed_timestep = 0.0166667
//! max_substeps = 3
//! actor_body = true
//!
//! [locomotion]
//! step = 0.08
//! stop_tolerance = 0.03
//! step_mode = per_tick
//! speed = 4.8
//!
//! [jump]
//! apex_y = 4
//! rise_duration = 0.5
//! fall_duration = 0.5
//! easing = linear
//! release = timeline
//! timer_factor = 1.5
//!
//! [camera]
//! offset_x = 1
//! offset_z = 5
//! height = 5
//! lock_during_activation = false
//!
//! [actor]
//! model = /assets/models/robot.animated.glb
//! ground_y = 0.3
//! idle_clip = 16
//! walk_clip = 23
//! jump_clip = 23
//! walk_time_scale = 2
//!
//! [activation]
//! evaluate = grounded
//! half_extent = 1.5
//! target_active_y = 0.3
//! target_hidden_y = -5
//! active_color = 2e8b57
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use serde::{Deserialize, Serialize};

use crate::components::actor::MotionState;
use crate::components::appearance::Rgb;
use crate::error::SceneError;
use crate::resources::sequencer::Easing;

const DEFAULT_CONFIG_PATH: &str = "./roomreveal.ini";

/// Rigid-body simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsSettings {
    pub gravity_y: f32,
    pub fixed_timestep: f32,
    pub max_substeps: u32,
    /// Give the actor a dynamic body. Without one the actor's transform is
    /// moved directly.
    pub actor_body: bool,
    pub actor_radius: f32,
    pub actor_mass: f32,
    pub default_friction: f32,
    pub default_restitution: f32,
    /// Contact properties between the actor and default-material bodies.
    pub actor_friction: f32,
    pub actor_restitution: f32,
    pub floor_size: f32,
    pub boundary_height: f32,
    pub boundary_thickness: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity_y: -10.0,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 3,
            actor_body: true,
            actor_radius: 0.3,
            actor_mass: 1.0,
            default_friction: 0.9,
            default_restitution: 0.1,
            actor_friction: 100.0,
            actor_restitution: 0.0,
            floor_size: 100.0,
            boundary_height: 10.0,
            boundary_thickness: 1.0,
        }
    }
}

/// How the walk displacement per frame is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// A fixed distance every frame, independent of frame time.
    #[default]
    PerTick,
    /// `speed * dt`.
    PerSecond,
}

impl FromStr for StepMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_tick" => Ok(StepMode::PerTick),
            "per_second" => Ok(StepMode::PerSecond),
            other => Err(format!("unknown step mode `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionSettings {
    pub step: f32,
    pub stop_tolerance: f32,
    pub step_mode: StepMode,
    pub speed: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            step: 0.08,
            stop_tolerance: 0.03,
            step_mode: StepMode::PerTick,
            speed: 4.8,
        }
    }
}

impl LocomotionSettings {
    /// Distance to walk this frame.
    pub fn step_for(&self, dt: f32) -> f32 {
        match self.step_mode {
            StepMode::PerTick => self.step,
            StepMode::PerSecond => self.speed * dt,
        }
    }
}

/// What ends a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpRelease {
    /// The arc timeline's completion report.
    #[default]
    Timeline,
    /// A countdown of `timer_factor` times the arc duration.
    Timer,
}

impl FromStr for JumpRelease {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "timeline" => Ok(JumpRelease::Timeline),
            "timer" => Ok(JumpRelease::Timer),
            other => Err(format!("unknown jump release `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpSettings {
    pub apex_y: f32,
    pub rise_duration: f32,
    pub fall_duration: f32,
    pub easing: Easing,
    pub release: JumpRelease,
    pub timer_factor: f32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            apex_y: 4.0,
            rise_duration: 0.5,
            fall_duration: 0.5,
            easing: Easing::Linear,
            release: JumpRelease::Timeline,
            timer_factor: 1.5,
        }
    }
}

impl JumpSettings {
    pub fn duration(&self) -> f32 {
        self.rise_duration + self.fall_duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub offset_x: f32,
    pub offset_z: f32,
    pub height: f32,
    /// Hold the camera still while a zone sequence runs.
    pub lock_during_activation: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            offset_x: 1.0,
            offset_z: 5.0,
            height: 5.0,
            lock_during_activation: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorSettings {
    pub model: String,
    pub ground_y: f32,
    pub idle_clip: usize,
    pub walk_clip: usize,
    pub jump_clip: usize,
    pub walk_time_scale: f32,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            model: "/assets/models/robot.animated.glb".to_string(),
            ground_y: 0.3,
            idle_clip: 16,
            walk_clip: 23,
            jump_clip: 23,
            walk_time_scale: 2.0,
        }
    }
}

/// When trigger zones are tested against the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneEvaluation {
    /// Only while the actor walks.
    Walking,
    /// Whenever the actor is on the ground (idle or walking).
    #[default]
    Grounded,
}

impl ZoneEvaluation {
    pub fn evaluates(self, motion: MotionState) -> bool {
        match self {
            ZoneEvaluation::Walking => motion == MotionState::Walking,
            ZoneEvaluation::Grounded => motion != MotionState::Jumping,
        }
    }
}

impl FromStr for ZoneEvaluation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "walking" => Ok(ZoneEvaluation::Walking),
            "grounded" => Ok(ZoneEvaluation::Grounded),
            other => Err(format!("unknown zone evaluation `{}`", other)),
        }
    }
}

/// Parameters of the reveal and hide sequences.
///
/// The defaults describe the stock two-room scene: the room bounces up to 0.3
/// over a second and sinks to -5 in half a second, the actor is lifted to 1,
/// and the camera drops from 5 to 3 while a room is open. Closing a room
/// returns the actor to `[actor] ground_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationConfig {
    pub half_extent: f32,
    pub target_active_y: f32,
    pub target_hidden_y: f32,
    pub target_reveal_duration: f32,
    pub target_hide_duration: f32,
    pub target_reveal_easing: Easing,
    pub target_hide_easing: Easing,
    pub actor_active_y: f32,
    pub actor_duration: f32,
    pub actor_easing: Easing,
    pub camera_active_y: f32,
    pub camera_normal_y: f32,
    pub camera_duration: f32,
    pub camera_easing: Easing,
    pub active_color: Rgb,
    pub inactive_color: Rgb,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            half_extent: 1.5,
            target_active_y: 0.3,
            target_hidden_y: -5.0,
            target_reveal_duration: 1.0,
            target_hide_duration: 0.5,
            target_reveal_easing: Easing::BounceOut,
            target_hide_easing: Easing::Linear,
            actor_active_y: 1.0,
            actor_duration: 1.0,
            actor_easing: Easing::BounceOut,
            camera_active_y: 3.0,
            camera_normal_y: 5.0,
            camera_duration: 1.0,
            camera_easing: Easing::QuadOut,
            active_color: Rgb::SEA_GREEN,
            inactive_color: Rgb::YELLOW,
        }
    }
}

/// Per-zone overrides of [`ActivationConfig`]; unset fields inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivationOverrides {
    pub half_extent: Option<f32>,
    pub target_active_y: Option<f32>,
    pub target_hidden_y: Option<f32>,
    pub target_reveal_duration: Option<f32>,
    pub target_hide_duration: Option<f32>,
    pub target_reveal_easing: Option<Easing>,
    pub target_hide_easing: Option<Easing>,
    pub actor_active_y: Option<f32>,
    pub actor_duration: Option<f32>,
    pub actor_easing: Option<Easing>,
    pub camera_active_y: Option<f32>,
    pub camera_normal_y: Option<f32>,
    pub camera_duration: Option<f32>,
    pub camera_easing: Option<Easing>,
    pub active_color: Option<Rgb>,
    pub inactive_color: Option<Rgb>,
}

impl ActivationConfig {
    pub fn merged(&self, o: &ActivationOverrides) -> Self {
        Self {
            half_extent: o.half_extent.unwrap_or(self.half_extent),
            target_active_y: o.target_active_y.unwrap_or(self.target_active_y),
            target_hidden_y: o.target_hidden_y.unwrap_or(self.target_hidden_y),
            target_reveal_duration: o
                .target_reveal_duration
                .unwrap_or(self.target_reveal_duration),
            target_hide_duration: o.target_hide_duration.unwrap_or(self.target_hide_duration),
            target_reveal_easing: o.target_reveal_easing.unwrap_or(self.target_reveal_easing),
            target_hide_easing: o.target_hide_easing.unwrap_or(self.target_hide_easing),
            actor_active_y: o.actor_active_y.unwrap_or(self.actor_active_y),
            actor_duration: o.actor_duration.unwrap_or(self.actor_duration),
            actor_easing: o.actor_easing.unwrap_or(self.actor_easing),
            camera_active_y: o.camera_active_y.unwrap_or(self.camera_active_y),
            camera_normal_y: o.camera_normal_y.unwrap_or(self.camera_normal_y),
            camera_duration: o.camera_duration.unwrap_or(self.camera_duration),
            camera_easing: o.camera_easing.unwrap_or(self.camera_easing),
            active_color: o.active_color.unwrap_or(self.active_color),
            inactive_color: o.inactive_color.unwrap_or(self.inactive_color),
        }
    }
}

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    pub physics: PhysicsSettings,
    pub locomotion: LocomotionSettings,
    pub jump: JumpSettings,
    pub camera: CameraSettings,
    pub actor: ActorSettings,
    pub activation: ActivationConfig,
    pub zone_evaluation: ZoneEvaluation,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with the default values.
    pub fn new() -> Self {
        Self {
            physics: PhysicsSettings::default(),
            locomotion: LocomotionSettings::default(),
            jump: JumpSettings::default(),
            camera: CameraSettings::default(),
            actor: ActorSettings::default(),
            activation: ActivationConfig::default(),
            zone_evaluation: ZoneEvaluation::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), SceneError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| SceneError::ConfigLoad {
                path: self.config_path.clone(),
                reason,
            })?;
        self.apply_ini(&config)?;
        info!(
            "Loaded config {:?}: gravity={}, step={} ({:?}), jump apex={}, zones evaluated {:?}",
            self.config_path,
            self.physics.gravity_y,
            self.locomotion.step,
            self.locomotion.step_mode,
            self.jump.apex_y,
            self.zone_evaluation
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), SceneError> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|reason| SceneError::ConfigLoad {
                path: PathBuf::from("<memory>"),
                reason,
            })?;
        self.apply_ini(&config)
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), SceneError> {
        // [physics] section
        let p = &mut self.physics;
        read_f32(ini, "physics", "gravity", &mut p.gravity_y)?;
        read_f32(ini, "physics", "fixed_timestep", &mut p.fixed_timestep)?;
        if let Some(n) = ini
            .getuint("physics", "max_substeps")
            .map_err(|e| bad_value("physics", "max_substeps", e))?
        {
            p.max_substeps = n.max(1) as u32;
        }
        if let Some(b) = ini
            .getbool("physics", "actor_body")
            .map_err(|e| bad_value("physics", "actor_body", e))?
        {
            p.actor_body = b;
        }
        read_f32(ini, "physics", "actor_radius", &mut p.actor_radius)?;
        read_f32(ini, "physics", "actor_mass", &mut p.actor_mass)?;
        read_f32(ini, "physics", "default_friction", &mut p.default_friction)?;
        read_f32(ini, "physics", "default_restitution", &mut p.default_restitution)?;
        read_f32(ini, "physics", "actor_friction", &mut p.actor_friction)?;
        read_f32(ini, "physics", "actor_restitution", &mut p.actor_restitution)?;
        read_f32(ini, "physics", "floor_size", &mut p.floor_size)?;
        read_f32(ini, "physics", "boundary_height", &mut p.boundary_height)?;
        read_f32(ini, "physics", "boundary_thickness", &mut p.boundary_thickness)?;

        // [locomotion] section
        let l = &mut self.locomotion;
        read_f32(ini, "locomotion", "step", &mut l.step)?;
        read_f32(ini, "locomotion", "stop_tolerance", &mut l.stop_tolerance)?;
        read_parsed(ini, "locomotion", "step_mode", &mut l.step_mode)?;
        read_f32(ini, "locomotion", "speed", &mut l.speed)?;

        // [jump] section
        let j = &mut self.jump;
        read_f32(ini, "jump", "apex_y", &mut j.apex_y)?;
        read_f32(ini, "jump", "rise_duration", &mut j.rise_duration)?;
        read_f32(ini, "jump", "fall_duration", &mut j.fall_duration)?;
        read_parsed(ini, "jump", "easing", &mut j.easing)?;
        read_parsed(ini, "jump", "release", &mut j.release)?;
        read_f32(ini, "jump", "timer_factor", &mut j.timer_factor)?;

        // [camera] section
        let c = &mut self.camera;
        read_f32(ini, "camera", "offset_x", &mut c.offset_x)?;
        read_f32(ini, "camera", "offset_z", &mut c.offset_z)?;
        read_f32(ini, "camera", "height", &mut c.height)?;
        if let Some(b) = ini
            .getbool("camera", "lock_during_activation")
            .map_err(|e| bad_value("camera", "lock_during_activation", e))?
        {
            c.lock_during_activation = b;
        }

        // [actor] section
        let a = &mut self.actor;
        if let Some(model) = ini.get("actor", "model") {
            a.model = model;
        }
        read_f32(ini, "actor", "ground_y", &mut a.ground_y)?;
        read_usize(ini, "actor", "idle_clip", &mut a.idle_clip)?;
        read_usize(ini, "actor", "walk_clip", &mut a.walk_clip)?;
        read_usize(ini, "actor", "jump_clip", &mut a.jump_clip)?;
        read_f32(ini, "actor", "walk_time_scale", &mut a.walk_time_scale)?;

        // [activation] section
        read_parsed(ini, "activation", "evaluate", &mut self.zone_evaluation)?;
        let v = &mut self.activation;
        read_f32(ini, "activation", "half_extent", &mut v.half_extent)?;
        read_f32(ini, "activation", "target_active_y", &mut v.target_active_y)?;
        read_f32(ini, "activation", "target_hidden_y", &mut v.target_hidden_y)?;
        read_f32(ini, "activation", "target_reveal_duration", &mut v.target_reveal_duration)?;
        read_f32(ini, "activation", "target_hide_duration", &mut v.target_hide_duration)?;
        read_parsed(ini, "activation", "target_reveal_easing", &mut v.target_reveal_easing)?;
        read_parsed(ini, "activation", "target_hide_easing", &mut v.target_hide_easing)?;
        read_f32(ini, "activation", "actor_active_y", &mut v.actor_active_y)?;
        read_f32(ini, "activation", "actor_duration", &mut v.actor_duration)?;
        read_parsed(ini, "activation", "actor_easing", &mut v.actor_easing)?;
        read_f32(ini, "activation", "camera_active_y", &mut v.camera_active_y)?;
        read_f32(ini, "activation", "camera_normal_y", &mut v.camera_normal_y)?;
        read_f32(ini, "activation", "camera_duration", &mut v.camera_duration)?;
        read_parsed(ini, "activation", "camera_easing", &mut v.camera_easing)?;
        read_parsed(ini, "activation", "active_color", &mut v.active_color)?;
        read_parsed(ini, "activation", "inactive_color", &mut v.inactive_color)?;

        Ok(())
    }
}

fn bad_value(section: &'static str, key: &'static str, value: String) -> SceneError {
    SceneError::ConfigValue {
        section,
        key,
        value,
    }
}

fn read_f32(
    ini: &Ini,
    section: &'static str,
    key: &'static str,
    slot: &mut f32,
) -> Result<(), SceneError> {
    if let Some(v) = ini
        .getfloat(section, key)
        .map_err(|e| bad_value(section, key, e))?
    {
        *slot = v as f32;
    }
    Ok(())
}

fn read_usize(
    ini: &Ini,
    section: &'static str,
    key: &'static str,
    slot: &mut usize,
) -> Result<(), SceneError> {
    if let Some(v) = ini
        .getuint(section, key)
        .map_err(|e| bad_value(section, key, e))?
    {
        *slot = v as usize;
    }
    Ok(())
}

fn read_parsed<T: FromStr<Err = String>>(
    ini: &Ini,
    section: &'static str,
    key: &'static str,
    slot: &mut T,
) -> Result<(), SceneError> {
    if let Some(raw) = ini.get(section, key) {
        *slot = raw.parse().map_err(|e| bad_value(section, key, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_scene() {
        let cfg = GameConfig::new();
        assert_eq!(cfg.physics.gravity_y, -10.0);
        assert_eq!(cfg.locomotion.step, 0.08);
        assert_eq!(cfg.jump.apex_y, 4.0);
        assert_eq!(cfg.jump.duration(), 1.0);
        assert_eq!(cfg.actor.idle_clip, 16);
        assert_eq!(cfg.activation.half_extent, 1.5);
        assert_eq!(cfg.activation.active_color, Rgb::SEA_GREEN);
        assert_eq!(cfg.zone_evaluation, ZoneEvaluation::Grounded);
    }

    #[test]
    fn test_load_from_str_overrides_only_present_keys() {
        let mut cfg = GameConfig::new();
        cfg.load_from_str(
            "[locomotion]\nstep = 0.1\nstep_mode = per_second\n\
             [jump]\nrelease = timer\neasing = quad_out\n\
             [activation]\nevaluate = walking\nactive_color = ff0000\n",
        )
        .unwrap();
        assert_eq!(cfg.locomotion.step, 0.1);
        assert_eq!(cfg.locomotion.step_mode, StepMode::PerSecond);
        assert_eq!(cfg.locomotion.stop_tolerance, 0.03);
        assert_eq!(cfg.jump.release, JumpRelease::Timer);
        assert_eq!(cfg.jump.easing, Easing::QuadOut);
        assert_eq!(cfg.zone_evaluation, ZoneEvaluation::Walking);
        assert_eq!(cfg.activation.active_color, Rgb::RED);
        assert_eq!(cfg.activation.inactive_color, Rgb::YELLOW);
    }

    #[test]
    fn test_bad_value_is_reported() {
        let mut cfg = GameConfig::new();
        let err = cfg
            .load_from_str("[jump]\nrelease = whenever\n")
            .unwrap_err();
        match err {
            SceneError::ConfigValue { section, key, .. } => {
                assert_eq!(section, "jump");
                assert_eq!(key, "release");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cfg = GameConfig::with_path("/definitely/not/here.ini");
        assert!(matches!(
            cfg.load_from_file(),
            Err(SceneError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_overrides_merge() {
        let base = ActivationConfig::default();
        let o = ActivationOverrides {
            half_extent: Some(5.0),
            camera_easing: Some(Easing::Linear),
            ..Default::default()
        };
        let merged = base.merged(&o);
        assert_eq!(merged.half_extent, 5.0);
        assert_eq!(merged.camera_easing, Easing::Linear);
        assert_eq!(merged.target_hidden_y, base.target_hidden_y);
    }

    #[test]
    fn test_zone_evaluation_modes() {
        assert!(ZoneEvaluation::Grounded.evaluates(MotionState::Idle));
        assert!(!ZoneEvaluation::Grounded.evaluates(MotionState::Jumping));
        assert!(!ZoneEvaluation::Walking.evaluates(MotionState::Idle));
        assert!(ZoneEvaluation::Walking.evaluates(MotionState::Walking));
    }
}
