//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the scene. Components hold data only; the systems in [`crate::systems`]
//! give them behaviour.
//!
//! Submodules overview:
//! - [`actor`] – locomotion state machine data for the controllable actor
//! - [`animation`] – clip indices and the active clip of an animated model
//! - [`appearance`] – material colour and opacity
//! - [`camerarig`] – follow offsets and locks for the scene camera
//! - [`groundpoint`] – a point on the ground plane (x, z)
//! - [`heading`] – facing angle on the ground plane
//! - [`physicsbody`] – link to a rigid body in the physics world
//! - [`pickmarker`] – marker shown at the last ground pick
//! - [`rendermodel`] – render-side handle, base rotation and scale
//! - [`revealtarget`] – a room shown and hidden by a trigger zone
//! - [`triggerzone`] – square ground region that reveals its target
//! - [`worldposition`] – world-space position (pivot) for an entity

pub mod actor;
pub mod animation;
pub mod appearance;
pub mod camerarig;
pub mod groundpoint;
pub mod heading;
pub mod physicsbody;
pub mod pickmarker;
pub mod rendermodel;
pub mod revealtarget;
pub mod triggerzone;
pub mod worldposition;
