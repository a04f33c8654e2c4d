//! Binds a boolean trigger on a host entity to the burst lifecycle.
//!
//! Set [`ConfettiTrigger::active`] to `true` to start a burst; it is set back to
//! `false` when the burst completes. The layers sit in a full-bleed overlay whose
//! emission origin is lifted to the top of the visible area.

use bevy::prelude::*;

use crate::burst::{BurstController, ConfettiError};

/// Insets of the unobstructed area of the window, in logical units.
///
/// Set by the host application; defaults to zero.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SafeAreaInsets {
    /// Top inset.
    pub top: f32,
    /// Leading inset.
    pub leading: f32,
    /// Bottom inset.
    pub bottom: f32,
    /// Trailing inset.
    pub trailing: f32,
}

/// Visible bounds of the host the confetti is overlaid on.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HostSurface {
    /// Width and height in logical units.
    pub size: Vec2,
}

impl HostSurface {
    /// A surface of `size` logical units.
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    /// Size clamped to non-negative.
    pub fn bounds(&self) -> Vec2 {
        self.size.max(Vec2::ZERO)
    }

    /// Whether the surface covers any area.
    pub fn has_area(&self) -> bool {
        let bounds = self.bounds();
        bounds.x > 0.0 && bounds.y > 0.0
    }
}

/// Edge-triggered switch starting one burst per `false → true` transition.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ConfettiTrigger {
    /// Set to `true` to start a burst. Reset to `false` when the burst completes.
    pub active: bool,
    armed: bool,
}

impl Default for ConfettiTrigger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConfettiTrigger {
    /// A trigger in the given state. An initially active trigger fires on the first frame.
    pub fn new(active: bool) -> Self {
        Self {
            active,
            armed: true,
        }
    }

    /// Requests a burst.
    pub fn fire(&mut self) {
        self.active = true;
    }
}

/// Host components needed to present confetti.
#[derive(Bundle, Default)]
pub struct ConfettiOverlay {
    /// Start switch.
    pub trigger: ConfettiTrigger,
    /// Visible bounds.
    pub surface: HostSurface,
    /// Burst lifecycle.
    pub controller: BurstController,
    /// Host transform; layers are placed relative to it.
    pub transform: Transform,
    /// Host visibility.
    pub visibility: Visibility,
}

impl ConfettiOverlay {
    /// An overlay over a surface of `size`.
    pub fn new(size: Vec2) -> Self {
        Self {
            surface: HostSurface::new(size),
            ..default()
        }
    }
}

/// Where the emission origin sits relative to the host's centre.
///
/// Half the surface height up, plus the top safe-area inset, so the burst starts at
/// the top of the visible viewport regardless of notches and status bars.
pub fn overlay_origin(bounds: Vec2, insets: &SafeAreaInsets) -> Vec2 {
    Vec2::new(0.0, bounds.y * 0.5 + insets.top)
}

/// Translation of an emission layer relative to the host.
///
/// Layers work in surface space, with the origin at the surface's bottom-left
/// corner, so the layer is shifted back by half the bounds.
pub fn layer_translation(bounds: Vec2, insets: &SafeAreaInsets) -> Vec2 {
    overlay_origin(bounds, insets) - bounds * 0.5
}

/// Starts a burst for every trigger that turned on since the last burst.
pub fn present_confetti(
    mut commands: Commands,
    insets: Res<SafeAreaInsets>,
    mut images: ResMut<Assets<Image>>,
    mut hosts: Query<(
        Entity,
        &mut ConfettiTrigger,
        &mut BurstController,
        Option<&HostSurface>,
    )>,
) {
    for (host, mut trigger, mut controller, surface) in hosts.iter_mut() {
        if !trigger.active {
            if !trigger.armed {
                trigger.armed = true;
            }
            continue;
        }
        if !trigger.armed {
            continue;
        }
        trigger.armed = false;

        let result = controller.start(
            host,
            surface,
            &insets,
            &mut commands,
            &mut images,
            move |world: &mut World| {
                if let Some(mut trigger) = world.get_mut::<ConfettiTrigger>(host) {
                    trigger.active = false;
                }
            },
        );

        match result {
            Ok(()) => {}
            // the running burst resets the trigger when it completes
            Err(ConfettiError::BurstActive) => {
                debug!("ignoring confetti trigger on {host}: burst already running");
            }
            Err(err) => {
                warn!("skipping confetti on {host}: {err}");
                trigger.active = false;
            }
        }
    }
}
