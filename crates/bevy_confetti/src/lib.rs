#![deny(missing_docs)]
//! **Confetti** is a celebratory particle burst overlay for the
//! [Bevy game engine](https://bevyengine.org/).
//!
//! # Getting started
//!
//! Add [`ConfettiPlugin`] to your app and spawn a [`ConfettiOverlay`] on the entity the
//! confetti should cover:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_confetti::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, ConfettiPlugin))
//!         .add_systems(Startup, setup)
//!         .add_systems(Update, celebrate)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn(Camera2d);
//!     commands.spawn(ConfettiOverlay::new(Vec2::new(1280.0, 720.0)));
//! }
//!
//! fn celebrate(keys: Res<ButtonInput<KeyCode>>, mut triggers: Query<&mut ConfettiTrigger>) {
//!     if keys.just_pressed(KeyCode::Space) {
//!         for mut trigger in &mut triggers {
//!             trigger.fire();
//!         }
//!     }
//! }
//! ```
//!
//! Setting [`ConfettiTrigger::active`] starts one burst. Five seconds later the
//! burst is torn down and the trigger is set back to `false`.
//!
//! # How a burst is built
//!
//! - A [catalog](catalog::ParticleCatalog) of 36 variants: two depth layers, two
//!   shapes and nine colours. Bitmaps are rasterized on first use and cached by the
//!   [`BurstController`].
//! - Two [emission layers](emitter::EmissionLayer): a full-size primary in front and
//!   a half-size, half-transparent, slightly slower secondary behind it.
//! - A [behavior set](behavior::BehaviorSet) per layer: two waves, an attractor and
//!   drag.
//! - An [animation timeline](timeline::AnimationTimeline) per layer that cuts off
//!   emission, releases the attractor, ramps up drag and lets gravity take hold.

/// Physics modifiers applied to particles.
pub mod behavior;
/// Burst lifecycle and its errors.
pub mod burst;
/// Confetti variants and palette.
pub mod catalog;
/// Emission layer configuration.
pub mod emitter;
/// Trigger binding and overlay placement.
pub mod overlay;
/// Convenience re-exports.
pub mod prelude;
/// Runtime components of live layers and particles.
pub mod runtime;
/// Systems driving emission, animation and particle motion.
pub mod spawning;
/// Particle bitmap rasterization.
pub mod textures;
/// Keyframed parameter animation.
pub mod timeline;

use bevy::prelude::*;

use burst::finish_bursts;
use overlay::{SafeAreaInsets, present_confetti};
use spawning::{
    advance_layer_clocks, animate_layer_parameters, emit_particles, simulate_particles,
    sync_particle_transforms,
};

/// Plugin that adds confetti bursts to a Bevy app.
pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SafeAreaInsets>();

        app.add_systems(
            Update,
            (
                finish_bursts,
                present_confetti,
                advance_layer_clocks,
                animate_layer_parameters,
                emit_particles,
                simulate_particles,
                sync_particle_transforms,
            )
                .chain(),
        );
    }
}

pub use burst::{BURST_DURATION, BurstController, ConfettiError};
pub use overlay::{ConfettiOverlay, ConfettiTrigger, HostSurface};
