//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `gameconfig` – tunables loaded from an INI file
//! - `physicsworld` – rigid body simulation with a fixed-step accumulator
//! - `renderbridge` – render backend and asset loading traits
//! - `sequencer` – tween timelines with per-channel supersession
//! - `worldtime` – simulation time and delta
pub mod gameconfig;
pub mod physicsworld;
pub mod renderbridge;
pub mod sequencer;
pub mod worldtime;
