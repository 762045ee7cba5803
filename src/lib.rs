//! Room reveal scene library.
//!
//! This module exposes the scene's ECS components, resources, systems, and
//! events, plus the [`game::Scene`] driver, for use by front ends and
//! integration tests.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod layout;
pub mod resources;
pub mod systems;
