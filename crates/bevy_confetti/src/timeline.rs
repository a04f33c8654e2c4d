//! Time-keyed animation of emitter and behavior parameters.
//!
//! A [`TimelineEntry`] is a stateless descriptor: given a layer's local time it
//! returns the animated value, or `None` once the entry has run its course and the
//! parameter falls back to its model value.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::VariantId;
use crate::emitter::EmissionLayer;
use crate::runtime::LayerParameters;

const BIRTH_RATE_DURATION: f32 = 1.0;
const STIFFNESS_DURATION: f32 = 3.0;
const STIFFNESS_KEY_TIMES: [f32; 2] = [0.0, 0.4];
const STIFFNESS_VALUES: [f32; 2] = [80.0, 5.0];
const DRAG_DURATION: f32 = 0.35;
const DRAG_TO: f32 = 2.0;
const GRAVITY_DURATION: f32 = 6.0;
const GRAVITY_KEY_TIMES: [f32; 4] = [0.05, 0.1, 0.5, 1.0];
const GRAVITY_VALUES: [f32; 4] = [0.0, 100.0, 2000.0, 4000.0];

/// The parameter a timeline entry drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTarget {
    /// Multiplier on every cell's birth rate.
    BirthRate,
    /// Stiffness of the layer's attractor.
    AttractorStiffness,
    /// Coefficient of the layer's drag behavior.
    DragCoefficient,
    /// Downward acceleration of one emitter cell.
    CellYAcceleration(VariantId),
}

impl fmt::Display for AnimationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BirthRate => f.write_str("birth-rate"),
            Self::AttractorStiffness => f.write_str("attractor.stiffness"),
            Self::DragCoefficient => f.write_str("drag.drag"),
            Self::CellYAcceleration(id) => write!(f, "{id}.y-acceleration"),
        }
    }
}

/// Maps normalised entry time onto eased time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimingFunction {
    /// Identity mapping.
    Linear,
    /// Cubic Bézier through `(0, 0)`, `(x1, y1)`, `(x2, y2)` and `(1, 1)`.
    CubicBezier {
        /// First control point, x.
        x1: f32,
        /// First control point, y.
        y1: f32,
        /// Second control point, x.
        x2: f32,
        /// Second control point, y.
        y2: f32,
    },
}

impl TimingFunction {
    /// Starts fast and slows to a stop.
    pub const EASE_OUT: Self = Self::CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
    };

    /// Evaluates the eased progress for `t` in `0.0..=1.0`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::CubicBezier { x1, y1, x2, y2 } => {
                let s = solve_bezier_parameter(t, x1, x2);
                bezier(s, y1, y2)
            }
        }
    }
}

fn bezier(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

// Finds s such that bezier_x(s) == x. Newton first, bisection if the slope flattens.
fn solve_bezier_parameter(x: f32, x1: f32, x2: f32) -> f32 {
    const EPSILON: f32 = 1e-6;

    let mut s = x;
    for _ in 0..8 {
        let error = bezier(s, x1, x2) - x;
        if error.abs() < EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < EPSILON {
            break;
        }
        s -= error / slope;
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = x;
    for _ in 0..32 {
        let value = bezier(s, x1, x2);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    s
}

/// One keyframed animation of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Driven parameter.
    pub target: AnimationTarget,
    /// Normalised key times in `0.0..=1.0`, ascending.
    pub key_times: Vec<f32>,
    /// Value at each key time.
    pub values: Vec<f32>,
    /// Duration in seconds of layer-local time.
    pub duration: f32,
    /// Easing applied to the normalised time before keyframe lookup. `None` is linear.
    pub timing: Option<TimingFunction>,
}

impl TimelineEntry {
    /// Linear interpolation from `from` to `to` over `duration`.
    pub fn basic(target: AnimationTarget, from: f32, to: f32, duration: f32) -> Self {
        Self::keyframes(target, &[0.0, 1.0], &[from, to], duration)
    }

    /// Piecewise-linear animation through `values` at `key_times`.
    pub fn keyframes(
        target: AnimationTarget,
        key_times: &[f32],
        values: &[f32],
        duration: f32,
    ) -> Self {
        Self {
            target,
            key_times: key_times.to_vec(),
            values: values.to_vec(),
            duration,
            timing: None,
        }
    }

    /// Sets the timing function.
    pub fn with_timing(mut self, timing: TimingFunction) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Whether the entry has run past its duration at `local_time`.
    pub fn is_finished(&self, local_time: f32) -> bool {
        local_time >= self.duration
    }

    /// Animated value at `local_time` seconds after the entry began.
    ///
    /// Before the first key time the first value holds; after the last key time the
    /// last value holds. Returns `None` before the start, once finished, or if the
    /// entry has no keyframes.
    pub fn sample(&self, local_time: f32) -> Option<f32> {
        if local_time < 0.0 || self.is_finished(local_time) || self.duration <= 0.0 {
            return None;
        }

        let keys = self.key_times.len().min(self.values.len());
        if keys == 0 {
            return None;
        }

        let linear = local_time / self.duration;
        let t = self.timing.map_or(linear, |timing| timing.evaluate(linear));

        if t <= self.key_times[0] {
            return Some(self.values[0]);
        }
        if t >= self.key_times[keys - 1] {
            return Some(self.values[keys - 1]);
        }

        for i in 0..keys - 1 {
            let (start, end) = (self.key_times[i], self.key_times[i + 1]);
            if t >= start && t < end {
                let span = end - start;
                if span <= 0.0 {
                    return Some(self.values[i + 1]);
                }
                let local = (t - start) / span;
                let (from, to) = (self.values[i], self.values[i + 1]);
                return Some(from + (to - from) * local);
            }
        }

        Some(self.values[keys - 1])
    }
}

/// Every timeline entry installed on one emission layer.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimeline {
    /// Entries, all starting at layer-local time zero.
    pub entries: Vec<TimelineEntry>,
}

impl AnimationTimeline {
    /// The burst timeline: birth-rate cutoff, attractor release, drag ramp-up and one
    /// gravity ramp per cell.
    pub fn for_cells(cells: impl IntoIterator<Item = VariantId>) -> Self {
        let mut entries = vec![
            TimelineEntry::basic(AnimationTarget::BirthRate, 1.0, 0.0, BIRTH_RATE_DURATION),
            TimelineEntry::keyframes(
                AnimationTarget::AttractorStiffness,
                &STIFFNESS_KEY_TIMES,
                &STIFFNESS_VALUES,
                STIFFNESS_DURATION,
            )
            .with_timing(TimingFunction::EASE_OUT),
            TimelineEntry::basic(AnimationTarget::DragCoefficient, 0.0, DRAG_TO, DRAG_DURATION),
        ];

        entries.extend(cells.into_iter().map(|id| {
            TimelineEntry::keyframes(
                AnimationTarget::CellYAcceleration(id),
                &GRAVITY_KEY_TIMES,
                &GRAVITY_VALUES,
                GRAVITY_DURATION,
            )
        }));

        Self { entries }
    }

    /// The burst timeline for `layer`'s cells.
    pub fn for_layer(layer: &EmissionLayer) -> Self {
        Self::for_cells(layer.cells.iter().map(|cell| cell.variant))
    }

    /// Returns the first entry driving `target`.
    pub fn entry(&self, target: AnimationTarget) -> Option<&TimelineEntry> {
        self.entries.iter().find(|entry| entry.target == target)
    }

    /// Overwrites every animated parameter in `params` with its value at `local_time`.
    ///
    /// Parameters whose entry is not running are left untouched, so callers reset
    /// `params` to the model values first.
    pub fn apply(&self, local_time: f32, params: &mut LayerParameters) {
        for entry in &self.entries {
            let Some(value) = entry.sample(local_time) else {
                continue;
            };
            match entry.target {
                AnimationTarget::BirthRate => params.birth_rate = value,
                AnimationTarget::AttractorStiffness => params.attractor_stiffness = value,
                AnimationTarget::DragCoefficient => params.drag = value,
                AnimationTarget::CellYAcceleration(id) => params.set_y_acceleration(id, value),
            }
        }
    }
}
