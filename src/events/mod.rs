//! Event types used by the scene.
//!
//! Events are triggered on the world and handled by observers registered in
//! [`crate::game::Scene::build`].
//!
//! Submodules:
//! - [`input`] – ground picks and jump requests from the front end
//! - [`timeline`] – a sequencer timeline finished or was cancelled
//! - [`zone`] – a trigger zone was entered or exited
pub mod input;
pub mod timeline;
pub mod zone;
