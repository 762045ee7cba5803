//! Material colour and opacity for rendered entities.
//!
//! Zone markers switch colour when their zone flips, and the destination
//! marker is drawn semi-transparent. Both are tweenable through the
//! [`Sequencer`](crate::resources::sequencer::Sequencer).

use std::str::FromStr;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// An RGB colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const SEA_GREEN: Rgb = Rgb::new(46, 139, 87);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, to: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, to.r), mix(self.g, to.g), mix(self.b, to.b))
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `rrggbb` or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected 6 hex digits, got `{}`", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad colour `{}`: {}", s, e))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Colour and opacity of an entity's material.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub color: Rgb,
    pub opacity: f32,
}

impl Appearance {
    pub fn new(color: Rgb, opacity: f32) -> Self {
        Self { color, opacity }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
        }
    }
}
