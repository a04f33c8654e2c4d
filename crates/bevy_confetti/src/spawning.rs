use std::f32::consts::TAU;

use bevy::{picking::Pickable, prelude::*};
use rand::{Rng, rngs::StdRng};

use crate::{
    behavior::BehaviorSet,
    catalog::VariantId,
    emitter::{CellConfig, EmissionLayer},
    runtime::{ConfettiParticle, EmissionState, LayerClock, LayerParameters},
    timeline::AnimationTimeline,
};

/// Frame deltas above this are clamped so a hitch cannot fire a whole second of
/// particles at once.
const MAX_FRAME_DELTA: f32 = 0.1;

/// Converts surface-space depth into a sprite z offset that stays inside the layer's
/// draw slot.
const DEPTH_TO_Z: f32 = 0.001;

fn frame_delta(time: &Time) -> f32 {
    time.delta_secs().min(MAX_FRAME_DELTA)
}

/// Advances every layer's local clock by the frame delta scaled by the layer speed.
pub fn advance_layer_clocks(time: Res<Time>, mut clocks: Query<&mut LayerClock>) {
    let delta = frame_delta(&time);
    for mut clock in clocks.iter_mut() {
        let step = clock.scaled(delta);
        clock.local_time += step;
    }
}

/// Recomputes each layer's effective parameters from its model and timeline.
pub fn animate_layer_parameters(
    mut layers: Query<(
        &LayerClock,
        &EmissionLayer,
        &BehaviorSet,
        &AnimationTimeline,
        &mut LayerParameters,
    )>,
) {
    for (clock, layer, behaviors, timeline, mut params) in layers.iter_mut() {
        params.reset(layer, behaviors);
        timeline.apply(clock.local_time, &mut params);
    }
}

/// Spawns new particles for every cell past its begin time, at the animated birth rate.
pub fn emit_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut layers: Query<(
        Entity,
        &EmissionLayer,
        &LayerClock,
        &LayerParameters,
        &mut EmissionState,
    )>,
) {
    let delta = frame_delta(&time);

    for (layer_entity, layer, clock, params, mut state) in layers.iter_mut() {
        let dt = clock.scaled(delta);
        if dt <= 0.0 || params.birth_rate <= 0.0 {
            continue;
        }

        let state = &mut *state;
        for (cell, accumulator) in layer.cells.iter().zip(state.accumulators.iter_mut()) {
            if clock.local_time < cell.config.begin_time {
                continue;
            }

            *accumulator += cell.config.birth_rate * params.birth_rate * dt;
            let count = accumulator.floor();
            *accumulator -= count;

            for _ in 0..count as u32 {
                let particle = spawn_particle(
                    layer_entity,
                    layer,
                    cell.variant,
                    &cell.config,
                    &mut state.rng,
                );
                commands.spawn((
                    particle,
                    Sprite {
                        image: cell.texture.clone(),
                        color: Color::srgba(1.0, 1.0, 1.0, layer.config.style.opacity),
                        custom_size: Some(cell.display_size()),
                        ..default()
                    },
                    Transform::default(),
                    Pickable::IGNORE,
                    ChildOf(layer_entity),
                ));
            }
        }
    }
}

fn spawn_particle(
    layer_entity: Entity,
    layer: &EmissionLayer,
    variant: VariantId,
    config: &CellConfig,
    rng: &mut StdRng,
) -> ConfettiParticle {
    let origin = layer.config.position.extend(0.0);
    let position = origin + random_in_sphere(rng) * layer.config.emission_radius();

    let heading = config.emission_longitude + signed(rng) * config.emission_range;
    let speed = config.velocity + signed(rng) * config.velocity_range;
    let velocity = Vec3::new(heading.cos(), heading.sin(), 0.0) * speed;

    let pitch = config.orientation_latitude + signed(rng) * config.orientation_range;
    let yaw = config.orientation_longitude + signed(rng) * config.orientation_range;

    ConfettiParticle {
        layer: layer_entity,
        variant,
        age: 0.0,
        lifetime: config.lifetime,
        position,
        velocity,
        spin_angle: 0.0,
        spin: config.spin + signed(rng) * config.spin_range,
        orientation: Quat::from_euler(EulerRot::XYZ, pitch, yaw, 0.0),
        phase: rng.random_range(0.0..TAU),
    }
}

fn signed(rng: &mut StdRng) -> f32 {
    rng.random_range(-1.0..=1.0)
}

fn random_in_sphere(rng: &mut StdRng) -> Vec3 {
    loop {
        let candidate = Vec3::new(signed(rng), signed(rng), signed(rng));
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// Applies gravity and the layer's behaviors, integrates, and despawns expired particles.
pub fn simulate_particles(
    mut commands: Commands,
    time: Res<Time>,
    layers: Query<(&LayerClock, &BehaviorSet, &LayerParameters)>,
    mut particles: Query<(Entity, &mut ConfettiParticle)>,
) {
    let delta = frame_delta(&time);

    for (entity, mut particle) in particles.iter_mut() {
        let Ok((clock, behaviors, params)) = layers.get(particle.layer) else {
            continue;
        };

        let dt = clock.scaled(delta);
        let behaviors = behaviors.with_animated(params.attractor_stiffness, params.drag);
        let gravity = Vec3::NEG_Y * params.y_acceleration(particle.variant);
        let acceleration = gravity + behaviors.acceleration(&particle);

        particle.integrate(acceleration, dt);
        if particle.is_expired() {
            commands.entity(entity).despawn();
        }
    }
}

/// Copies particle position, tumble and spin into the sprite transform.
pub fn sync_particle_transforms(
    mut particles: Query<(&ConfettiParticle, &mut Transform), Changed<ConfettiParticle>>,
) {
    for (particle, mut transform) in particles.iter_mut() {
        transform.translation = particle
            .position
            .truncate()
            .extend(particle.position.z * DEPTH_TO_Z);
        transform.rotation = particle.orientation * Quat::from_rotation_z(particle.spin_angle);
    }
}
