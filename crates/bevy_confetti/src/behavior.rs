//! Physics modifiers applied to every particle of an emission layer.
//!
//! Each layer owns its own [`BehaviorSet`]: two waves, an attractor anchored just
//! below that layer's emitter, and air drag. The attractor stiffness and drag
//! coefficient are animated by the layer's [`AnimationTimeline`](crate::timeline::AnimationTimeline).

use std::f32::consts::TAU;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::runtime::ConfettiParticle;

const HORIZONTAL_WAVE_FORCE: Vec3 = Vec3::new(100.0, 0.0, 0.0);
const HORIZONTAL_WAVE_FREQUENCY: f32 = 0.5;
const VERTICAL_WAVE_FORCE: Vec3 = Vec3::new(0.0, -500.0, 0.0);
const VERTICAL_WAVE_FREQUENCY: f32 = 3.0;

const ATTRACTOR_FALLOFF: f32 = -290.0;
const ATTRACTOR_RADIUS: f32 = 300.0;
const ATTRACTOR_STIFFNESS: f32 = 10.0;
const ATTRACTOR_DROP: f32 = 20.0;
const ATTRACTOR_DEPTH: f32 = -70.0;

const DRAG: f32 = 2.0;

/// A force acting on a single particle.
pub trait ParticleBehavior {
    /// Acceleration contributed to `particle`, in units per second squared.
    fn acceleration(&self, particle: &ConfettiParticle) -> Vec3;
}

/// Oscillating force: `force × sin(2π · frequency · age + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct WaveBehavior {
    /// Peak force vector.
    pub force: Vec3,
    /// Oscillation frequency in hertz.
    pub frequency: f32,
}

impl WaveBehavior {
    /// Side-to-side sway.
    pub fn horizontal() -> Self {
        Self {
            force: HORIZONTAL_WAVE_FORCE,
            frequency: HORIZONTAL_WAVE_FREQUENCY,
        }
    }

    /// Fast vertical flutter.
    pub fn vertical() -> Self {
        Self {
            force: VERTICAL_WAVE_FORCE,
            frequency: VERTICAL_WAVE_FREQUENCY,
        }
    }
}

impl ParticleBehavior for WaveBehavior {
    fn acceleration(&self, particle: &ConfettiParticle) -> Vec3 {
        self.force * (TAU * self.frequency * particle.age + particle.phase).sin()
    }
}

/// Spring pulling particles toward a focal point.
///
/// Within [`radius`](Self::radius) the pull is `stiffness × (position − particle)`.
/// Beyond it the pull is scaled by `1 + falloff / 100 × (distance − radius) / radius`,
/// clamped at zero, so a negative falloff fades the spring out with distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct AttractorBehavior {
    /// Percentage change of strength per radius travelled outside the radius.
    pub falloff: f32,
    /// Distance within which the full stiffness applies.
    pub radius: f32,
    /// Spring constant.
    pub stiffness: f32,
    /// Focal point in surface space; `z` places it behind other content.
    pub position: Vec3,
}

impl AttractorBehavior {
    /// Attractor anchored just below and behind `emitter_position`.
    pub fn below(emitter_position: Vec2) -> Self {
        Self {
            falloff: ATTRACTOR_FALLOFF,
            radius: ATTRACTOR_RADIUS,
            stiffness: ATTRACTOR_STIFFNESS,
            position: Vec3::new(
                emitter_position.x,
                emitter_position.y - ATTRACTOR_DROP,
                ATTRACTOR_DEPTH,
            ),
        }
    }

    fn strength_at(&self, distance: f32) -> f32 {
        if distance <= self.radius || self.radius <= 0.0 {
            return 1.0;
        }
        (1.0 + self.falloff / 100.0 * (distance - self.radius) / self.radius).max(0.0)
    }
}

impl ParticleBehavior for AttractorBehavior {
    fn acceleration(&self, particle: &ConfettiParticle) -> Vec3 {
        let offset = self.position - particle.position;
        offset * self.stiffness * self.strength_at(offset.length())
    }
}

/// Air resistance proportional to velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct DragBehavior {
    /// Resistance coefficient, per second.
    pub drag: f32,
}

impl Default for DragBehavior {
    fn default() -> Self {
        Self { drag: DRAG }
    }
}

impl ParticleBehavior for DragBehavior {
    fn acceleration(&self, particle: &ConfettiParticle) -> Vec3 {
        -particle.velocity * self.drag
    }
}

/// The behaviors attached to one emission layer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct BehaviorSet {
    /// Slow sideways sway.
    pub horizontal_wave: WaveBehavior,
    /// Fast vertical flutter.
    pub vertical_wave: WaveBehavior,
    /// Spring toward the layer's focal point.
    pub attractor: AttractorBehavior,
    /// Air resistance.
    pub drag: DragBehavior,
}

impl BehaviorSet {
    /// Builds a fresh set whose attractor is anchored to `emitter_position`.
    pub fn for_emitter(emitter_position: Vec2) -> Self {
        Self {
            horizontal_wave: WaveBehavior::horizontal(),
            vertical_wave: WaveBehavior::vertical(),
            attractor: AttractorBehavior::below(emitter_position),
            drag: DragBehavior::default(),
        }
    }

    /// Returns a copy with the animated attractor stiffness and drag coefficient applied.
    pub fn with_animated(&self, stiffness: f32, drag: f32) -> Self {
        let mut set = *self;
        set.attractor.stiffness = stiffness;
        set.drag.drag = drag;
        set
    }

    /// The behaviors in application order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ParticleBehavior> {
        [
            &self.horizontal_wave as &dyn ParticleBehavior,
            &self.vertical_wave,
            &self.attractor,
            &self.drag,
        ]
        .into_iter()
    }

    /// Sum of every behavior's acceleration on `particle`.
    pub fn acceleration(&self, particle: &ConfettiParticle) -> Vec3 {
        self.iter()
            .map(|behavior| behavior.acceleration(particle))
            .sum()
    }
}
