#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_confetti::overlay::SafeAreaInsets;
use bevy_confetti::prelude::*;
use bevy_confetti::runtime::LayerClock;

pub const FRAME: Duration = Duration::from_millis(50);

pub const SURFACE: Vec2 = Vec2::new(400.0, 800.0);

pub fn create_minimal_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(AssetPlugin::default());
    app.init_asset::<Image>();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.add_plugins(ConfettiPlugin);

    // the first update only primes the clock
    app.update();
    app
}

pub fn spawn_host(app: &mut App, size: Vec2) -> Entity {
    app.world_mut()
        .spawn(ConfettiOverlay {
            controller: BurstController::with_seed(7),
            ..ConfettiOverlay::new(size)
        })
        .id()
}

pub fn fire(app: &mut App, host: Entity) {
    app.world_mut()
        .get_mut::<ConfettiTrigger>(host)
        .expect("host should have a trigger")
        .fire();
}

pub fn trigger_active(app: &App, host: Entity) -> bool {
    app.world()
        .get::<ConfettiTrigger>(host)
        .expect("host should have a trigger")
        .active
}

pub fn advance_frames(app: &mut App, n: u32) {
    for _ in 0..n {
        app.update();
    }
}

/// advances the simulated clock by roughly `seconds`, one fixed frame at a time.
pub fn advance_seconds(app: &mut App, seconds: f32) {
    let frames = (seconds / FRAME.as_secs_f32()).round() as u32;
    advance_frames(app, frames);
}

pub fn layer_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&BurstLayer>()
        .iter(app.world())
        .len()
}

pub fn particle_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&ConfettiParticle>()
        .iter(app.world())
        .len()
}

pub fn layer_with_speed(app: &mut App, speed: f32) -> Entity {
    app.world_mut()
        .query::<(Entity, &LayerClock)>()
        .iter(app.world())
        .find(|(_, clock)| clock.speed == speed)
        .map(|(entity, _)| entity)
        .expect("layer with that speed should exist")
}

/// starts a burst directly on the host's controller, counting completions.
pub fn start_burst(
    app: &mut App,
    host: Entity,
    completions: Arc<AtomicU32>,
) -> Result<(), ConfettiError> {
    app.world_mut()
        .run_system_once(
            move |mut commands: Commands,
                  mut images: ResMut<Assets<Image>>,
                  insets: Res<SafeAreaInsets>,
                  mut hosts: Query<(&mut BurstController, Option<&HostSurface>)>| {
                let completions = completions.clone();
                let (mut controller, surface) =
                    hosts.get_mut(host).expect("host should have a controller");
                controller.start(
                    host,
                    surface,
                    &insets,
                    &mut commands,
                    &mut images,
                    move |_: &mut World| {
                        completions.fetch_add(1, Ordering::SeqCst);
                    },
                )
            },
        )
        .expect("system should run")
}

/// changes how far both clocks step on every later update.
pub fn set_frame_duration(app: &mut App, frame: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));
}

pub fn pause_virtual_time(app: &mut App) {
    app.world_mut().resource_mut::<Time<Virtual>>().pause();
}
