//! Error types for scene construction and asset loading.
//!
//! Only construction can fail. Per-frame systems log and skip whatever they
//! cannot update, and a model that fails to load is logged and left out of
//! the scene, so [`AssetError`] never escalates into a [`SceneError`].

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a model through an
/// [`AssetSource`](crate::resources::renderbridge::AssetSource).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssetError {
    #[error("model `{0}` not found")]
    NotFound(String),

    #[error("loader for `{0}` stopped before signalling completion")]
    Disconnected(String),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to load config file {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid value `{value}` for [{section}] {key}")]
    ConfigValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("failed to read layout {path:?}: {source}")]
    LayoutRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout: {0}")]
    LayoutParse(#[from] serde_json::Error),

    #[error("duplicate room name `{0}`")]
    DuplicateRoom(String),

    #[error("zone {zone} targets unknown room `{target}`")]
    UnboundZone { zone: usize, target: String },

    #[error("room `{0}` is bound to more than one zone")]
    DuplicateZoneTarget(String),

    #[error("{kind} clip index {index} is out of range, model has {count} clips")]
    MissingClip {
        kind: &'static str,
        index: usize,
        count: usize,
    },
}
