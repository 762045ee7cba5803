//! Timeline-based tween sequencer.
//!
//! A [`Timeline`] is an ordered list of [`Tween`]s. Each tween animates one
//! channel, a `(target, property)` pair, and is placed either after the
//! previous tween or relative to the previous tween's start, so several
//! channels can move from the same instant.
//!
//! The [`Sequencer`] resource owns all running timelines and advances them
//! on its own clock from [`crate::systems::tween`]. Rules enforced here:
//!
//! - At most one track mutates a channel at a time. Playing a timeline
//!   removes unfinished tracks on the same channels from every other
//!   timeline.
//! - Every played timeline reports completion exactly once through
//!   [`Sequencer::drain_finished`], either normally or as cancelled (when it
//!   was cancelled explicitly or lost all its tracks to supersession).
//! - A tween without an explicit start value reads the channel's current
//!   value when it starts, not when the timeline is built.

use std::str::FromStr;

use bevy_ecs::prelude::{Entity, Resource};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::appearance::Rgb;

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
    /// Overshoots the end and settles with decaying bounces.
    BounceOut,
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "none" => Ok(Easing::Linear),
            "quad_in" | "power1.in" => Ok(Easing::QuadIn),
            "quad_out" | "power1.out" => Ok(Easing::QuadOut),
            "quad_in_out" | "power1.inout" => Ok(Easing::QuadInOut),
            "cubic_in" | "power2.in" => Ok(Easing::CubicIn),
            "cubic_out" | "power2.out" => Ok(Easing::CubicOut),
            "cubic_in_out" | "power2.inout" => Ok(Easing::CubicInOut),
            "bounce_out" | "bounce.out" => Ok(Easing::BounceOut),
            other => Err(format!("unknown easing `{}`", other)),
        }
    }
}

/// Map linear progress `t` in [0, 1] through `e`.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::BounceOut => bounce_out(t),
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let p = t - 1.5 / D1;
        N1 * p * p + 0.75
    } else if t < 2.5 / D1 {
        let p = t - 2.25 / D1;
        N1 * p * p + 0.9375
    } else {
        let p = t - 2.625 / D1;
        N1 * p * p + 0.984375
    }
}

/// Identifier of a played timeline. Never reused within a sequencer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(pub u64);

/// Animatable property of an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    PositionY,
    Opacity,
    Color,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TweenValue {
    Scalar(f32),
    Color(Rgb),
}

impl TweenValue {
    /// Interpolate toward `to`. `None` if the two values are of different kinds.
    pub fn lerp(self, to: TweenValue, t: f32) -> Option<TweenValue> {
        match (self, to) {
            (TweenValue::Scalar(a), TweenValue::Scalar(b)) => {
                Some(TweenValue::Scalar(a + (b - a) * t))
            }
            (TweenValue::Color(a), TweenValue::Color(b)) => Some(TweenValue::Color(a.lerp(b, t))),
            _ => None,
        }
    }
}

/// Where a tween starts relative to the tween added before it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Placement {
    /// Start this many seconds after the previous tween ends.
    After(f32),
    /// Start this many seconds after the previous tween starts.
    WithPrevious(f32),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::After(0.0)
    }
}

/// One track of a timeline.
#[derive(Clone, Debug)]
pub struct Tween {
    pub target: Entity,
    pub property: TweenProperty,
    /// Explicit start value. `None` reads the channel when the tween starts.
    pub from: Option<TweenValue>,
    pub to: TweenValue,
    pub duration: f32,
    pub easing: Easing,
    pub placement: Placement,
}

impl Tween {
    pub fn new(target: Entity, property: TweenProperty, to: TweenValue, duration: f32) -> Self {
        Self {
            target,
            property,
            from: None,
            to,
            duration: duration.max(0.0),
            easing: Easing::Linear,
            placement: Placement::default(),
        }
    }

    pub fn position_y(target: Entity, to: f32, duration: f32) -> Self {
        Self::new(
            target,
            TweenProperty::PositionY,
            TweenValue::Scalar(to),
            duration,
        )
    }

    pub fn opacity(target: Entity, to: f32, duration: f32) -> Self {
        Self::new(target, TweenProperty::Opacity, TweenValue::Scalar(to), duration)
    }

    pub fn color(target: Entity, to: Rgb, duration: f32) -> Self {
        Self::new(target, TweenProperty::Color, TweenValue::Color(to), duration)
    }

    pub fn starting_at(mut self, from: TweenValue) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    fn channel(&self) -> (Entity, TweenProperty) {
        (self.target, self.property)
    }
}

/// Builder for a timeline; hand it to [`Sequencer::play`].
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    label: String,
    tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tweens: Vec::new(),
        }
    }

    pub fn with(mut self, tween: Tween) -> Self {
        self.tweens.push(tween);
        self
    }

    pub fn push(&mut self, tween: Tween) {
        self.tweens.push(tween);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total length once placements are resolved.
    pub fn duration(&self) -> f32 {
        resolve_starts(&self.tweens)
            .iter()
            .zip(&self.tweens)
            .map(|(start, tw)| start + tw.duration)
            .fold(0.0, f32::max)
    }
}

fn resolve_starts(tweens: &[Tween]) -> Vec<f32> {
    let mut starts = Vec::with_capacity(tweens.len());
    let mut prev_start = 0.0_f32;
    let mut prev_end = 0.0_f32;
    for tw in tweens {
        let start = match tw.placement {
            Placement::After(gap) => prev_end + gap,
            Placement::WithPrevious(offset) => prev_start + offset,
        }
        .max(0.0);
        starts.push(start);
        prev_start = start;
        prev_end = start + tw.duration;
    }
    starts
}

/// Completion report for a timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedTimeline {
    pub id: TimelineId,
    pub label: String,
    pub cancelled: bool,
}

/// Read/write access to the animatable channels of the world.
pub trait TweenTarget {
    fn read(&self, target: Entity, property: TweenProperty) -> Option<TweenValue>;
    /// Returns `false` if the channel no longer exists.
    fn write(&mut self, target: Entity, property: TweenProperty, value: TweenValue) -> bool;
}

#[derive(Clone, Debug)]
struct Track {
    tween: Tween,
    start: f32,
    /// Start value, captured when the track begins.
    from: Option<TweenValue>,
    done: bool,
}

impl Track {
    fn step(&mut self, elapsed: f32, targets: &mut impl TweenTarget) {
        if self.done || elapsed < self.start {
            return;
        }
        let (target, property) = self.tween.channel();
        let from = match self.from.or(self.tween.from) {
            Some(v) => v,
            None => match targets.read(target, property) {
                Some(v) => v,
                None => {
                    debug!("tween target {:?} has no {:?}, dropping", target, property);
                    self.done = true;
                    return;
                }
            },
        };
        self.from = Some(from);

        let local = if self.tween.duration <= 0.0 {
            1.0
        } else {
            ((elapsed - self.start) / self.tween.duration).clamp(0.0, 1.0)
        };
        let Some(value) = from.lerp(self.tween.to, ease(self.tween.easing, local)) else {
            warn!(
                "tween on {:?} {:?} mixes value kinds, dropping",
                target, property
            );
            self.done = true;
            return;
        };
        if !targets.write(target, property, value) {
            self.done = true;
            return;
        }
        if local >= 1.0 {
            self.done = true;
        }
    }
}

#[derive(Clone, Debug)]
struct Running {
    id: TimelineId,
    label: String,
    elapsed: f32,
    total: f32,
    tracks: SmallVec<[Track; 4]>,
    superseded: bool,
}

impl Running {
    fn pending(&self) -> bool {
        self.tracks.iter().any(|t| !t.done)
    }
}

#[derive(Resource, Debug, Default)]
pub struct Sequencer {
    running: Vec<Running>,
    next_id: u64,
    finished: Vec<FinishedTimeline>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `timeline`, superseding unfinished tracks on the same channels.
    pub fn play(&mut self, timeline: Timeline) -> TimelineId {
        for tween in &timeline.tweens {
            self.cancel(tween.target, tween.property);
        }
        self.next_id += 1;
        let id = TimelineId(self.next_id);
        let starts = resolve_starts(&timeline.tweens);
        let total = timeline.duration();
        let tracks = timeline
            .tweens
            .into_iter()
            .zip(starts)
            .map(|(tween, start)| Track {
                tween,
                start,
                from: None,
                done: false,
            })
            .collect();
        debug!("timeline {:?} `{}` started, {:.3}s", id, timeline.label, total);
        self.running.push(Running {
            id,
            label: timeline.label,
            elapsed: 0.0,
            total,
            tracks,
            superseded: false,
        });
        id
    }

    /// Remove unfinished tracks animating `(target, property)` from every
    /// timeline. Timelines left without work finish as cancelled. Returns the
    /// number of tracks removed.
    pub fn cancel(&mut self, target: Entity, property: TweenProperty) -> usize {
        let mut removed = 0;
        for tl in self.running.iter_mut() {
            let before = tl.tracks.len();
            tl.tracks
                .retain(|t| t.done || t.tween.channel() != (target, property));
            if tl.tracks.len() != before {
                removed += before - tl.tracks.len();
                tl.superseded = true;
            }
        }
        if removed > 0 {
            self.sweep_superseded();
        }
        removed
    }

    /// Stop a timeline where it is. Returns `false` if it was not running.
    pub fn cancel_timeline(&mut self, id: TimelineId) -> bool {
        let Some(index) = self.running.iter().position(|tl| tl.id == id) else {
            return false;
        };
        let tl = self.running.remove(index);
        debug!("timeline {:?} `{}` cancelled", tl.id, tl.label);
        self.finished.push(FinishedTimeline {
            id: tl.id,
            label: tl.label,
            cancelled: true,
        });
        true
    }

    pub fn is_playing(&self, id: TimelineId) -> bool {
        self.running.iter().any(|tl| tl.id == id)
    }

    pub fn elapsed(&self, id: TimelineId) -> Option<f32> {
        self.running.iter().find(|tl| tl.id == id).map(|tl| tl.elapsed)
    }

    pub fn duration(&self, id: TimelineId) -> Option<f32> {
        self.running.iter().find(|tl| tl.id == id).map(|tl| tl.total)
    }

    /// Number of unfinished tracks, across all timelines, on a channel.
    pub fn active_track_count(&self, target: Entity, property: TweenProperty) -> usize {
        self.running
            .iter()
            .flat_map(|tl| tl.tracks.iter())
            .filter(|t| !t.done && t.tween.channel() == (target, property))
            .count()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Advance every timeline by `dt` seconds and write the new values.
    pub fn advance(&mut self, dt: f32, targets: &mut impl TweenTarget) {
        let dt = dt.max(0.0);
        let finished = &mut self.finished;
        self.running.retain_mut(|tl| {
            tl.elapsed += dt;
            for track in tl.tracks.iter_mut() {
                track.step(tl.elapsed, targets);
            }
            if tl.elapsed >= tl.total || !tl.pending() {
                debug!("timeline {:?} `{}` finished", tl.id, tl.label);
                finished.push(FinishedTimeline {
                    id: tl.id,
                    label: std::mem::take(&mut tl.label),
                    cancelled: false,
                });
                false
            } else {
                true
            }
        });
    }

    /// Completion reports since the last drain, in completion order.
    pub fn drain_finished(&mut self) -> Vec<FinishedTimeline> {
        std::mem::take(&mut self.finished)
    }

    fn sweep_superseded(&mut self) {
        let finished = &mut self.finished;
        self.running.retain_mut(|tl| {
            if tl.superseded && !tl.pending() {
                debug!("timeline {:?} `{}` fully superseded", tl.id, tl.label);
                finished.push(FinishedTimeline {
                    id: tl.id,
                    label: std::mem::take(&mut tl.label),
                    cancelled: true,
                });
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;
    use rustc_hash::FxHashMap;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[derive(Default)]
    struct Channels {
        values: FxHashMap<(Entity, TweenProperty), TweenValue>,
    }

    impl Channels {
        fn scalar(&self, e: Entity, p: TweenProperty) -> f32 {
            match self.values.get(&(e, p)) {
                Some(TweenValue::Scalar(v)) => *v,
                other => panic!("no scalar on {:?}: {:?}", e, other),
            }
        }
    }

    impl TweenTarget for Channels {
        fn read(&self, target: Entity, property: TweenProperty) -> Option<TweenValue> {
            self.values.get(&(target, property)).copied()
        }

        fn write(&mut self, target: Entity, property: TweenProperty, value: TweenValue) -> bool {
            match self.values.get_mut(&(target, property)) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        }
    }

    fn setup() -> (Channels, Entity, Entity) {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut ch = Channels::default();
        ch.values
            .insert((a, TweenProperty::PositionY), TweenValue::Scalar(0.0));
        ch.values
            .insert((b, TweenProperty::PositionY), TweenValue::Scalar(5.0));
        (ch, a, b)
    }

    #[test]
    fn test_ease_endpoints() {
        for e in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::BounceOut,
        ] {
            assert!(approx_eq(ease(e, 0.0), 0.0), "{:?} at 0", e);
            assert!(approx_eq(ease(e, 1.0), 1.0), "{:?} at 1", e);
        }
    }

    #[test]
    fn test_easing_parses_gsap_names() {
        assert_eq!("bounce.out".parse::<Easing>().unwrap(), Easing::BounceOut);
        assert_eq!("power1.out".parse::<Easing>().unwrap(), Easing::QuadOut);
        assert_eq!("linear".parse::<Easing>().unwrap(), Easing::Linear);
        assert!("wobble".parse::<Easing>().is_err());
    }

    #[test]
    fn test_placement_resolution() {
        let (_, a, b) = setup();
        let tl = Timeline::new("t")
            .with(Tween::position_y(a, 1.0, 1.0))
            .with(Tween::position_y(b, 1.0, 0.5).with_placement(Placement::WithPrevious(0.0)))
            .with(Tween::position_y(a, 0.0, 0.5).with_placement(Placement::After(0.25)));
        assert_eq!(resolve_starts(&tl.tweens), vec![0.0, 0.0, 0.75]);
        assert!(approx_eq(tl.duration(), 1.25));
    }

    #[test]
    fn test_sequential_tracks_capture_start_value_late() {
        let (mut ch, a, _) = setup();
        let mut seq = Sequencer::new();
        let id = seq.play(
            Timeline::new("jump")
                .with(Tween::position_y(a, 4.0, 0.5))
                .with(Tween::position_y(a, 1.0, 0.5)),
        );
        seq.advance(0.25, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 2.0));
        seq.advance(0.25, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 4.0));
        seq.advance(0.25, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 2.5));
        assert!(seq.is_playing(id));
        seq.advance(0.25, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 1.0));
        assert!(!seq.is_playing(id));
        let done = seq.drain_finished();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, id);
        assert!(!done[0].cancelled);
        assert!(seq.drain_finished().is_empty());
    }

    #[test]
    fn test_supersession_keeps_one_track_per_channel() {
        let (mut ch, a, b) = setup();
        let mut seq = Sequencer::new();
        let reveal = seq.play(
            Timeline::new("reveal")
                .with(Tween::position_y(a, 10.0, 1.0))
                .with(Tween::position_y(b, 0.0, 1.0).with_placement(Placement::WithPrevious(0.0))),
        );
        seq.advance(0.5, &mut ch);
        let hide = seq.play(Timeline::new("hide").with(Tween::position_y(a, -5.0, 0.5)));
        assert_eq!(seq.active_track_count(a, TweenProperty::PositionY), 1);
        // The reveal keeps animating b.
        assert!(seq.is_playing(reveal));

        let from = ch.scalar(a, TweenProperty::PositionY);
        assert!(approx_eq(from, 5.0));
        seq.advance(0.25, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 0.0));
        seq.advance(0.5, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), -5.0));
        assert!(approx_eq(ch.scalar(b, TweenProperty::PositionY), 0.0));
        assert!(seq.is_empty());
        let ids: Vec<_> = seq.drain_finished().into_iter().map(|f| f.id).collect();
        assert!(ids.contains(&reveal) && ids.contains(&hide));
    }

    #[test]
    fn test_fully_superseded_timeline_reports_cancelled() {
        let (mut ch, a, _) = setup();
        let mut seq = Sequencer::new();
        let first = seq.play(Timeline::new("first").with(Tween::position_y(a, 3.0, 1.0)));
        seq.advance(0.1, &mut ch);
        seq.play(Timeline::new("second").with(Tween::position_y(a, 0.0, 1.0)));
        let done = seq.drain_finished();
        assert_eq!(
            done,
            vec![FinishedTimeline {
                id: first,
                label: "first".into(),
                cancelled: true
            }]
        );
    }

    #[test]
    fn test_cancel_timeline_leaves_value_in_place() {
        let (mut ch, a, _) = setup();
        let mut seq = Sequencer::new();
        let id = seq.play(Timeline::new("t").with(Tween::position_y(a, 2.0, 1.0)));
        seq.advance(0.5, &mut ch);
        assert!(seq.cancel_timeline(id));
        assert!(!seq.cancel_timeline(id));
        seq.advance(0.5, &mut ch);
        assert!(approx_eq(ch.scalar(a, TweenProperty::PositionY), 1.0));
        assert!(seq.drain_finished()[0].cancelled);
    }

    #[test]
    fn test_missing_target_is_dropped() {
        let (mut ch, a, _) = setup();
        let ghost = a;
        ch.values.clear();
        let mut seq = Sequencer::new();
        seq.play(Timeline::new("ghost").with(Tween::position_y(ghost, 1.0, 1.0)));
        seq.advance(0.1, &mut ch);
        assert!(seq.is_empty());
        assert!(!seq.drain_finished()[0].cancelled);
    }

    #[test]
    fn test_color_tween() {
        let (mut ch, a, _) = setup();
        ch.values
            .insert((a, TweenProperty::Color), TweenValue::Color(Rgb::new(0, 0, 0)));
        let mut seq = Sequencer::new();
        seq.play(Timeline::new("tint").with(Tween::color(a, Rgb::new(100, 200, 50), 1.0)));
        seq.advance(0.5, &mut ch);
        assert_eq!(
            ch.read(a, TweenProperty::Color),
            Some(TweenValue::Color(Rgb::new(50, 100, 25)))
        );
    }
}
