use std::f32::consts::{FRAC_PI_2, PI};

use bevy::{ecs::system::EntityCommands, prelude::*};
use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorSet;
use crate::catalog::{ParticleCatalog, VariantId};
use crate::textures::RasterizeError;
use crate::timeline::AnimationTimeline;

/// Extent of the spherical emission volume, in logical units.
pub const EMITTER_SIZE: Vec2 = Vec2::new(100.0, 100.0);

/// Visual treatment distinguishing the two layers of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct LayerStyle {
    /// Multiplier on every particle's size.
    pub scale: f32,
    /// Layer opacity.
    pub opacity: f32,
    /// Playback speed of the layer's local clock.
    pub speed: f32,
}

impl LayerStyle {
    /// Full-size, opaque, real-time layer drawn in front.
    pub const PRIMARY: Self = Self {
        scale: 1.0,
        opacity: 1.0,
        speed: 1.0,
    };

    /// Half-size, half-transparent, slightly slowed layer drawn behind.
    pub const SECONDARY: Self = Self {
        scale: 0.5,
        opacity: 0.5,
        speed: 0.95,
    };
}

/// Static emitter properties of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct LayerConfig {
    /// Emitter centre in surface space (origin at the surface's bottom-left corner).
    pub position: Vec2,
    /// Extent of the spherical emission volume.
    pub emitter_size: Vec2,
    /// Size of the host surface the layer covers.
    pub bounds: Vec2,
    /// Model birth-rate multiplier. Zero: only the timeline makes the layer emit.
    pub birth_rate: f32,
    /// Visual treatment.
    pub style: LayerStyle,
}

impl LayerConfig {
    /// Emitter centred on a surface of size `bounds`.
    ///
    /// A zero-area surface collapses the emitter onto the origin.
    pub fn for_surface(style: LayerStyle, bounds: Vec2) -> Self {
        let bounds = bounds.max(Vec2::ZERO);
        Self {
            position: bounds * 0.5,
            emitter_size: EMITTER_SIZE,
            bounds,
            birth_rate: 0.0,
            style,
        }
    }

    /// Radius of the spherical emission volume.
    pub fn emission_radius(&self) -> f32 {
        self.emitter_size.x * 0.5
    }
}

/// Per-particle emission parameters shared by every cell of a layer.
///
/// Angles are in radians, rates per second, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct CellConfig {
    /// Delay after the layer starts before the cell emits.
    pub begin_time: f32,
    /// Particles emitted per second at a layer birth rate of one.
    pub birth_rate: f32,
    /// Centre of the emission direction in the surface plane.
    pub emission_longitude: f32,
    /// Half-angle of the random emission direction spread.
    pub emission_range: f32,
    /// Initial speed.
    pub velocity: f32,
    /// Random speed variation, `±`.
    pub velocity_range: f32,
    /// Particle lifetime.
    pub lifetime: f32,
    /// Spin rate.
    pub spin: f32,
    /// Random spin variation, `±`.
    pub spin_range: f32,
    /// Model downward acceleration.
    pub y_acceleration: f32,
    /// Multiplier on the bitmap size.
    pub scale: f32,
    /// Random tumble around both orientation axes, `±`.
    pub orientation_range: f32,
    /// Base tumble around the vertical axis.
    pub orientation_longitude: f32,
    /// Base tumble around the horizontal axis.
    pub orientation_latitude: f32,
}

impl CellConfig {
    /// Confetti emission drawn at `scale`.
    pub fn confetti(scale: f32) -> Self {
        Self {
            begin_time: 0.1,
            birth_rate: 100.0,
            emission_longitude: 0.0,
            emission_range: PI,
            velocity: 0.0,
            velocity_range: 0.0,
            lifetime: 10.0,
            spin: 4.0,
            spin_range: 8.0,
            y_acceleration: 0.0,
            scale,
            orientation_range: PI,
            orientation_longitude: FRAC_PI_2,
            orientation_latitude: FRAC_PI_2,
        }
    }
}

/// One particle source of a layer, bound to a catalog variant.
#[derive(Debug, Clone)]
pub struct EmitterCell {
    /// Variant drawn by this cell.
    pub variant: VariantId,
    /// Emission parameters.
    pub config: CellConfig,
    /// Variant texture.
    pub texture: Handle<Image>,
    /// Unscaled bitmap size, in logical units.
    pub size: Vec2,
}

impl EmitterCell {
    /// On-screen particle size.
    pub fn display_size(&self) -> Vec2 {
        self.size * self.config.scale
    }
}

/// A configured particle emitter covering the host surface.
#[derive(Component, Debug, Clone)]
pub struct EmissionLayer {
    /// Emitter properties.
    pub config: LayerConfig,
    /// One cell per catalog variant, in catalog order.
    pub cells: Vec<EmitterCell>,
}

/// Builds a layer emitting every variant of `catalog` over a surface of size `bounds`.
///
/// Variant textures are rasterized into `images` the first time they are needed and
/// reused afterwards.
pub fn build_emission_layer(
    style: LayerStyle,
    bounds: Vec2,
    catalog: &ParticleCatalog,
    images: &mut Assets<Image>,
) -> Result<EmissionLayer, RasterizeError> {
    let config = LayerConfig::for_surface(style, bounds);
    let cell_config = CellConfig::confetti(style.scale);

    let cells = catalog
        .variants()
        .iter()
        .map(|variant| -> Result<EmitterCell, RasterizeError> {
            Ok(EmitterCell {
                variant: variant.id,
                config: cell_config,
                texture: variant.texture(images)?,
                size: variant.shape.size().as_vec2(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EmissionLayer { config, cells })
}

/// Installs a fresh [`BehaviorSet`] anchored to `layer`'s own emitter and returns it.
pub fn attach_behaviors(entity: &mut EntityCommands, layer: &EmissionLayer) -> BehaviorSet {
    let behaviors = BehaviorSet::for_emitter(layer.config.position);
    entity.insert(behaviors);
    behaviors
}

/// Installs the burst [`AnimationTimeline`] for `layer`'s cells.
pub fn attach_animations(entity: &mut EntityCommands, layer: &EmissionLayer) {
    entity.insert(AnimationTimeline::for_layer(layer));
}
