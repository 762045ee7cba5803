//! Scene systems.
//!
//! This module groups all ECS systems and observers that advance the
//! simulation and mirror it to the render backend. The order they run in is
//! fixed by [`crate::game::build_frame_schedule`].
//!
//! Submodules overview
//! - [`animation`] – advance the active clip of every animated model
//! - [`camera`] – keep the camera trailing the actor unless locked
//! - [`locomotion`] – ground picks, jumps and the walk integrator
//! - [`physics`] – fixed-step physics and grounded settling
//! - [`proximity`] – trigger zone edges and reveal/hide sequences
//! - [`render`] – push changed transforms, colours and clips to the backend
//! - [`time`] – update simulation time and delta
//! - [`tween`] – advance the sequencer and report finished timelines

pub mod animation;
pub mod camera;
pub mod locomotion;
pub mod physics;
pub mod proximity;
pub mod render;
pub mod time;
pub mod tween;
