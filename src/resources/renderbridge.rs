//! Boundary to the rendering and asset layers.
//!
//! The scene never draws anything itself. It talks to a [`RenderBackend`]
//! through the [`RenderBridge`] resource and loads models through an
//! [`AssetSource`]. Both are traits so a windowed front end, a recorder in
//! tests, or the headless logger used by the binary can sit behind them.
//!
//! Model loading is the only asynchronous step of the scene: every model is
//! requested on its own thread and reports back exactly once over a
//! one-shot channel, and [`load_models`] waits for all of them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use bevy_ecs::prelude::Resource;
use crossbeam_channel::bounded;
use log::{debug, trace};
use nalgebra::{UnitQuaternion, Vector3};
use rustc_hash::FxHashSet;

use crate::components::appearance::Rgb;
use crate::error::AssetError;

/// Opaque handle to a render-side object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(pub u64);

/// A model that finished loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedModel {
    pub handle: ModelHandle,
    pub clip_count: usize,
}

pub trait AssetSource: Send + Sync {
    /// Load the model at `path`. Called once per model.
    fn load_model(&self, path: &str) -> Result<LoadedModel, AssetError>;
}

/// Built-in shapes the scene asks the backend to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    /// Flat rectangle on the ground plane.
    Plane { width: f32, depth: f32 },
    Box { half_extents: Vector3<f32> },
}

pub trait RenderBackend: Send + Sync {
    fn spawn_primitive(&mut self, primitive: Primitive) -> ModelHandle;
    fn set_transform(
        &mut self,
        handle: ModelHandle,
        position: &Vector3<f32>,
        rotation: &UnitQuaternion<f32>,
        scale: &Vector3<f32>,
    );
    fn set_visible(&mut self, handle: ModelHandle, visible: bool);
    fn set_material_color(&mut self, handle: ModelHandle, color: Rgb, opacity: f32);
    fn play_clip(&mut self, handle: ModelHandle, clip_index: usize, time_scale: f32);
    fn set_camera(&mut self, position: &Vector3<f32>, look_at: &Vector3<f32>);
}

/// Resource owning the active render backend.
#[derive(Resource)]
pub struct RenderBridge {
    backend: Box<dyn RenderBackend>,
}

impl RenderBridge {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }
}

/// Load every path concurrently and wait for all completions.
///
/// Results come back in the order of `paths`. A loader that panics or drops
/// its sender without reporting yields [`AssetError::Disconnected`] for that
/// path only.
pub fn load_models(
    source: Arc<dyn AssetSource>,
    paths: &[String],
) -> Vec<Result<LoadedModel, AssetError>> {
    let pending: Vec<_> = paths
        .iter()
        .map(|path| {
            let (tx, rx) = bounded(1);
            let source = Arc::clone(&source);
            let owned = path.clone();
            let spawned = thread::Builder::new()
                .name(format!("load {}", path))
                .spawn(move || {
                    let result = source.load_model(&owned);
                    // The receiver outlives every loader; a send error only
                    // means the whole load was abandoned.
                    let _ = tx.send(result);
                });
            if let Err(e) = spawned {
                debug!("could not spawn loader for {}: {}", path, e);
            }
            (path, rx)
        })
        .collect();

    pending
        .into_iter()
        .map(|(path, rx)| {
            rx.recv()
                .unwrap_or_else(|_| Err(AssetError::Disconnected(path.clone())))
        })
        .collect()
}

/// Asset source that fabricates models without touching the filesystem.
///
/// Every model reports `clip_count` clips. Paths registered with
/// [`HeadlessAssets::with_missing`] fail with [`AssetError::NotFound`].
#[derive(Debug)]
pub struct HeadlessAssets {
    clip_count: usize,
    missing: FxHashSet<String>,
    next: AtomicU64,
}

impl HeadlessAssets {
    pub fn new(clip_count: usize) -> Self {
        Self {
            clip_count,
            missing: FxHashSet::default(),
            next: AtomicU64::new(1 << 32),
        }
    }

    pub fn with_missing(mut self, path: impl Into<String>) -> Self {
        self.missing.insert(path.into());
        self
    }
}

impl AssetSource for HeadlessAssets {
    fn load_model(&self, path: &str) -> Result<LoadedModel, AssetError> {
        if self.missing.contains(path) {
            return Err(AssetError::NotFound(path.to_string()));
        }
        let handle = ModelHandle(self.next.fetch_add(1, Ordering::Relaxed));
        trace!("headless load {} -> {:?}", path, handle);
        Ok(LoadedModel {
            handle,
            clip_count: self.clip_count,
        })
    }
}

/// Backend that only logs what it would draw, at `trace` level.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next: u64,
    calls: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl RenderBackend for HeadlessBackend {
    fn spawn_primitive(&mut self, primitive: Primitive) -> ModelHandle {
        self.next += 1;
        self.calls += 1;
        trace!("spawn {:?} -> {}", primitive, self.next);
        ModelHandle(self.next)
    }

    fn set_transform(
        &mut self,
        handle: ModelHandle,
        position: &Vector3<f32>,
        _rotation: &UnitQuaternion<f32>,
        _scale: &Vector3<f32>,
    ) {
        self.calls += 1;
        trace!(
            "{:?} at ({:.3}, {:.3}, {:.3})",
            handle, position.x, position.y, position.z
        );
    }

    fn set_visible(&mut self, handle: ModelHandle, visible: bool) {
        self.calls += 1;
        trace!("{:?} visible={}", handle, visible);
    }

    fn set_material_color(&mut self, handle: ModelHandle, color: Rgb, opacity: f32) {
        self.calls += 1;
        trace!("{:?} color={:?} opacity={}", handle, color, opacity);
    }

    fn play_clip(&mut self, handle: ModelHandle, clip_index: usize, time_scale: f32) {
        self.calls += 1;
        trace!("{:?} clip {} x{}", handle, clip_index, time_scale);
    }

    fn set_camera(&mut self, position: &Vector3<f32>, look_at: &Vector3<f32>) {
        self.calls += 1;
        trace!(
            "camera ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
            position.x, position.y, position.z, look_at.x, look_at.y, look_at.z
        );
    }
}
