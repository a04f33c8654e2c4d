use std::time::Duration;

use bevy::{picking::Pickable, prelude::*};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    behavior::BehaviorSet,
    catalog::ParticleCatalog,
    emitter::{
        CellConfig, EmissionLayer, LayerConfig, LayerStyle, attach_animations, attach_behaviors,
        build_emission_layer,
    },
    overlay::{HostSurface, SafeAreaInsets, layer_translation},
    runtime::{BurstLayer, EmissionState, LayerClock, LayerParameters},
    textures::RasterizeError,
    timeline::{AnimationTimeline, TimelineEntry},
};

/// Wall-clock time from `start` until the layers are removed and completion fires.
pub const BURST_DURATION: Duration = Duration::from_secs(5);

/// Back-to-front: the secondary layer is inserted first so it draws behind.
const LAYER_ORDER: [(LayerStyle, &str); 2] = [
    (LayerStyle::SECONDARY, "Confetti (secondary)"),
    (LayerStyle::PRIMARY, "Confetti (primary)"),
];

/// Callback run on the main world once a burst has been torn down.
pub type BurstCompletion = Box<dyn FnOnce(&mut World) + Send + Sync + 'static>;

/// Errors that can occur when starting a burst.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfettiError {
    /// A burst is already running on this controller.
    #[error("A confetti burst is already running")]
    BurstActive,
    /// The host has no [`HostSurface`] to draw into.
    #[error("Host has no surface to draw confetti into")]
    NoSurface,
    /// A particle texture could not be produced.
    #[error("Could not rasterize confetti: {0}")]
    Rasterize(#[from] RasterizeError),
}

struct ActiveBurst {
    elapsed: Duration,
    on_complete: Option<BurstCompletion>,
}

/// Runs confetti bursts for one host entity.
///
/// The particle catalog is built on first use and kept for the controller's
/// lifetime, so repeated bursts reuse the same textures. At most one burst runs at a
/// time; starting another while active fails with [`ConfettiError::BurstActive`].
#[derive(Component, Default)]
pub struct BurstController {
    catalog: Option<ParticleCatalog>,
    active: Option<ActiveBurst>,
    seed: Option<u64>,
    bursts_started: u64,
}

impl BurstController {
    /// A controller whose particle randomness is derived from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..default()
        }
    }

    /// The particle catalog, generated on first access.
    pub fn catalog(&mut self) -> &ParticleCatalog {
        self.catalog.get_or_insert_with(ParticleCatalog::generate)
    }

    /// Whether a burst is currently running.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of bursts started over the controller's lifetime.
    pub fn bursts_started(&self) -> u64 {
        self.bursts_started
    }

    /// Starts a burst over `surface`, parented to `host`.
    ///
    /// Spawns the secondary then the primary emission layer with their behaviors and
    /// timelines. After [`BURST_DURATION`] both layers are despawned and `on_complete`
    /// runs exactly once. If this returns an error nothing is spawned and
    /// `on_complete` is dropped without running.
    pub fn start(
        &mut self,
        host: Entity,
        surface: Option<&HostSurface>,
        insets: &SafeAreaInsets,
        commands: &mut Commands,
        images: &mut Assets<Image>,
        on_complete: impl FnOnce(&mut World) + Send + Sync + 'static,
    ) -> Result<(), ConfettiError> {
        if self.is_active() {
            return Err(ConfettiError::BurstActive);
        }
        let surface = surface.ok_or(ConfettiError::NoSurface)?;
        let bounds = surface.bounds();
        if !surface.has_area() {
            debug!("confetti surface of {host} has no area; emitting from the origin");
        }

        let catalog = self.catalog.get_or_insert_with(ParticleCatalog::generate);
        let layers = LAYER_ORDER
            .iter()
            .map(|(style, _)| build_emission_layer(*style, bounds, catalog, images))
            .collect::<Result<Vec<_>, _>>()?;

        let translation = layer_translation(bounds, insets);
        for (depth, (layer, (_, name))) in layers.into_iter().zip(LAYER_ORDER).enumerate() {
            let seed = self.layer_seed(depth as u64);
            spawn_layer(commands, host, layer, name, translation.extend(depth as f32), seed);
        }

        self.bursts_started += 1;
        self.active = Some(ActiveBurst {
            elapsed: Duration::ZERO,
            on_complete: Some(Box::new(on_complete)),
        });

        info!("started confetti burst on {host} ({}x{})", bounds.x, bounds.y);
        Ok(())
    }

    fn layer_seed(&self, layer: u64) -> u64 {
        match self.seed {
            Some(seed) => seed
                .wrapping_add(self.bursts_started.wrapping_mul(2))
                .wrapping_add(layer),
            None => StdRng::from_os_rng().random(),
        }
    }
}

fn spawn_layer(
    commands: &mut Commands,
    host: Entity,
    layer: EmissionLayer,
    name: &'static str,
    translation: Vec3,
    seed: u64,
) {
    let style = layer.config.style;
    let mut entity = commands.spawn((
        Name::new(name),
        BurstLayer { host },
        LayerClock::new(style.speed),
        EmissionState::new(layer.cells.len(), seed),
        Transform::from_translation(translation),
        Visibility::default(),
        Pickable::IGNORE,
        ChildOf(host),
    ));
    let behaviors = attach_behaviors(&mut entity, &layer);
    attach_animations(&mut entity, &layer);
    entity.insert((LayerParameters::from_model(&layer, &behaviors), layer));
}

/// Tears down every burst that has run for [`BURST_DURATION`] of wall-clock time.
///
/// Elapsed time comes from [`Time<Real>`], so pausing or slowing the virtual clock
/// does not hold the burst open. All emission layers of the host are despawned
/// together with their in-flight particles, then the completion callback is queued on
/// the main world.
pub fn finish_bursts(
    mut commands: Commands,
    time: Res<Time<Real>>,
    mut controllers: Query<(Entity, &mut BurstController)>,
    layers: Query<(Entity, &BurstLayer)>,
) {
    for (host, mut controller) in controllers.iter_mut() {
        let Some(burst) = controller.active.as_mut() else {
            continue;
        };

        burst.elapsed += time.delta();
        if burst.elapsed < BURST_DURATION {
            continue;
        }

        let Some(mut burst) = controller.active.take() else {
            continue;
        };

        for (layer_entity, layer) in layers.iter() {
            if layer.host == host {
                commands.entity(layer_entity).despawn();
            }
        }

        if let Some(on_complete) = burst.on_complete.take() {
            commands.queue(move |world: &mut World| on_complete(world));
        }

        info!("finished confetti burst on {host}");
    }
}

/// Everything one emission layer of a burst is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecipe {
    /// Emitter properties.
    pub config: LayerConfig,
    /// Per-cell emission parameters, identical for every cell.
    pub cell: CellConfig,
    /// Attached behaviors.
    pub behaviors: BehaviorSet,
    /// Attached timeline entries.
    pub timeline: Vec<TimelineEntry>,
}

/// A dry-run description of a burst, back-to-front, without touching any world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstRecipe {
    /// Layers in insertion order.
    pub layers: Vec<LayerRecipe>,
}

impl BurstRecipe {
    /// Describes the burst a controller would start over a surface of size `bounds`.
    pub fn describe(bounds: Vec2, catalog: &ParticleCatalog) -> Self {
        let layers = LAYER_ORDER
            .iter()
            .map(|(style, _)| {
                let config = LayerConfig::for_surface(*style, bounds);
                LayerRecipe {
                    config,
                    cell: CellConfig::confetti(style.scale),
                    behaviors: BehaviorSet::for_emitter(config.position),
                    timeline: AnimationTimeline::for_cells(
                        catalog.variants().iter().map(|variant| variant.id),
                    )
                    .entries,
                }
            })
            .collect();

        Self { layers }
    }
}
