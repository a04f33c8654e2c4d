use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use crate::behavior::BehaviorSet;
use crate::catalog::VariantId;
use crate::emitter::EmissionLayer;

/// Marks an emission layer entity and points back at the host that started it.
#[derive(Component, Debug, Clone, Copy)]
pub struct BurstLayer {
    /// Host entity owning the [`BurstController`](crate::burst::BurstController).
    pub host: Entity,
}

/// Layer-local clock. Runs at the layer's playback speed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LayerClock {
    /// Seconds of layer-local time since the layer was attached.
    pub local_time: f32,
    /// Local seconds per real second.
    pub speed: f32,
}

impl LayerClock {
    /// A clock at local time zero running at `speed`.
    pub fn new(speed: f32) -> Self {
        Self {
            local_time: 0.0,
            speed,
        }
    }

    /// Converts a frame delta into layer-local seconds.
    pub fn scaled(&self, delta_secs: f32) -> f32 {
        delta_secs * self.speed
    }
}

/// Effective (presentation) values of every animatable parameter of a layer.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct LayerParameters {
    /// Multiplier on every cell's birth rate.
    pub birth_rate: f32,
    /// Attractor stiffness.
    pub attractor_stiffness: f32,
    /// Drag coefficient.
    pub drag: f32,
    /// Downward acceleration per cell.
    pub y_acceleration: Vec<(VariantId, f32)>,
}

impl LayerParameters {
    /// The layer's static model values.
    pub fn from_model(layer: &EmissionLayer, behaviors: &BehaviorSet) -> Self {
        Self {
            birth_rate: layer.config.birth_rate,
            attractor_stiffness: behaviors.attractor.stiffness,
            drag: behaviors.drag.drag,
            y_acceleration: layer
                .cells
                .iter()
                .map(|cell| (cell.variant, cell.config.y_acceleration))
                .collect(),
        }
    }

    /// Resets every value to the model without reallocating.
    pub fn reset(&mut self, layer: &EmissionLayer, behaviors: &BehaviorSet) {
        self.birth_rate = layer.config.birth_rate;
        self.attractor_stiffness = behaviors.attractor.stiffness;
        self.drag = behaviors.drag.drag;
        self.y_acceleration.clear();
        self.y_acceleration.extend(
            layer
                .cells
                .iter()
                .map(|cell| (cell.variant, cell.config.y_acceleration)),
        );
    }

    /// Downward acceleration of `variant`'s cell, zero if unknown.
    pub fn y_acceleration(&self, variant: VariantId) -> f32 {
        self.y_acceleration
            .iter()
            .find(|(id, _)| *id == variant)
            .map_or(0.0, |(_, value)| *value)
    }

    /// Overrides the downward acceleration of `variant`'s cell. Unknown variants are ignored.
    pub fn set_y_acceleration(&mut self, variant: VariantId, value: f32) {
        if let Some(slot) = self
            .y_acceleration
            .iter_mut()
            .find(|(id, _)| *id == variant)
        {
            slot.1 = value;
        }
    }
}

/// Per-layer emission bookkeeping.
#[derive(Component, Debug)]
pub struct EmissionState {
    /// Fractional particles carried over between frames, one per cell.
    pub accumulators: Vec<f32>,
    /// Source of every random spawn attribute of the layer.
    pub rng: StdRng,
}

impl EmissionState {
    /// Empty accumulators for `cells` cells and an RNG seeded with `seed`.
    pub fn new(cells: usize, seed: u64) -> Self {
        Self {
            accumulators: vec![0.0; cells],
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// A single live confetti piece.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ConfettiParticle {
    /// Emission layer the particle belongs to.
    pub layer: Entity,
    /// Variant of the emitting cell.
    pub variant: VariantId,
    /// Seconds of layer-local time since birth.
    pub age: f32,
    /// Age at which the particle is despawned.
    pub lifetime: f32,
    /// Surface-space position; `z` is depth.
    pub position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Current spin angle around the view axis.
    pub spin_angle: f32,
    /// Spin rate in radians per second.
    pub spin: f32,
    /// Fixed tumble orientation chosen at birth.
    pub orientation: Quat,
    /// Wave phase offset, so particles do not sway in lockstep.
    pub phase: f32,
}

impl ConfettiParticle {
    /// A particle at rest at `position`, for driving behaviors directly.
    pub fn at(position: Vec3) -> Self {
        Self {
            layer: Entity::PLACEHOLDER,
            variant: VariantId(0),
            age: 0.0,
            lifetime: f32::INFINITY,
            position,
            velocity: Vec3::ZERO,
            spin_angle: 0.0,
            spin: 0.0,
            orientation: Quat::IDENTITY,
            phase: 0.0,
        }
    }

    /// Whether the particle has outlived its lifetime.
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Advances the particle by `dt` under `acceleration` (semi-implicit Euler).
    pub fn integrate(&mut self, acceleration: Vec3, dt: f32) {
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.spin_angle += self.spin * dt;
        self.age += dt;
    }
}
