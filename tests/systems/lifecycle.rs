use super::helpers::*;

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use bevy::prelude::*;
use bevy_confetti::prelude::*;
use bevy_confetti::runtime::LayerParameters;

fn fired_host(app: &mut App) -> Entity {
    let host = spawn_host(app, SURFACE);
    fire(app, host);
    app.update();
    host
}

#[test]
fn trigger_spawns_two_layers_under_host() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    assert_eq!(layer_count(&mut app), 2);

    let children = app
        .world()
        .get::<Children>(host)
        .expect("host should have children");
    assert_eq!(children.len(), 2);

    let controller = app.world().get::<BurstController>(host).unwrap();
    assert!(controller.is_active());
    assert_eq!(controller.bursts_started(), 1);
}

#[test]
fn layers_are_named_and_ordered_back_to_front() {
    let mut app = create_minimal_app();
    fired_host(&mut app);

    let secondary = layer_with_speed(&mut app, LayerStyle::SECONDARY.speed);
    let primary = layer_with_speed(&mut app, LayerStyle::PRIMARY.speed);

    let world = app.world();
    assert_eq!(
        world.get::<Name>(secondary).unwrap().as_str(),
        "Confetti (secondary)"
    );
    assert_eq!(
        world.get::<Name>(primary).unwrap().as_str(),
        "Confetti (primary)"
    );

    let secondary_z = world.get::<Transform>(secondary).unwrap().translation.z;
    let primary_z = world.get::<Transform>(primary).unwrap().translation.z;
    assert!(secondary_z < primary_z, "secondary layer should draw behind");
}

#[test]
fn layers_are_positioned_at_top_of_surface() {
    let mut app = create_minimal_app();
    app.insert_resource(SafeAreaInsets {
        top: 44.0,
        ..default()
    });
    fired_host(&mut app);

    let primary = layer_with_speed(&mut app, LayerStyle::PRIMARY.speed);
    let translation = app.world().get::<Transform>(primary).unwrap().translation;
    assert_eq!(translation.truncate(), Vec2::new(-200.0, 44.0));

    let layer = app.world().get::<EmissionLayer>(primary).unwrap();
    assert_eq!(layer.config.position, Vec2::new(200.0, 400.0));
}

#[test]
fn each_layer_gets_behaviors_and_timeline() {
    let mut app = create_minimal_app();
    fired_host(&mut app);

    let mut query = app.world_mut().query_filtered::<(
        &BehaviorSet,
        &AnimationTimeline,
        &EmissionLayer,
        &LayerParameters,
    ), With<BurstLayer>>();
    let layers: Vec<_> = query.iter(app.world()).collect();
    assert_eq!(layers.len(), 2);

    for (behaviors, timeline, layer, params) in layers {
        assert_eq!(params.y_acceleration.len(), layer.cells.len());
        assert!(params.attractor_stiffness > behaviors.attractor.stiffness);
        let emitter = layer.config.position;
        assert_eq!(
            behaviors.attractor.position,
            Vec3::new(emitter.x, emitter.y - 20.0, -70.0)
        );
        assert_eq!(timeline.entries.len(), 3 + layer.cells.len());
        assert_eq!(layer.cells.len(), 36);
    }
}

#[test]
fn burst_ends_after_five_seconds() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    advance_seconds(&mut app, 4.8);
    assert_eq!(layer_count(&mut app), 2, "burst should still be running");
    assert!(trigger_active(&app, host));

    advance_seconds(&mut app, 0.5);
    assert_eq!(layer_count(&mut app), 0, "layers should be removed");
    assert_eq!(particle_count(&mut app), 0, "particles should go with their layer");
    assert!(!trigger_active(&app, host), "trigger should reset");

    let controller = app.world().get::<BurstController>(host).unwrap();
    assert!(!controller.is_active());
}

#[test]
fn completion_runs_exactly_once() {
    let mut app = create_minimal_app();
    let host = spawn_host(&mut app, SURFACE);
    let completions = Arc::new(AtomicU32::new(0));

    start_burst(&mut app, host, completions.clone()).expect("burst should start");
    assert_eq!(layer_count(&mut app), 2);

    advance_seconds(&mut app, 4.5);
    assert_eq!(completions.load(Ordering::SeqCst), 0);

    advance_seconds(&mut app, 1.0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    advance_seconds(&mut app, 2.0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn second_start_while_running_is_rejected() {
    let mut app = create_minimal_app();
    let host = spawn_host(&mut app, SURFACE);
    let first = Arc::new(AtomicU32::new(0));
    let second = Arc::new(AtomicU32::new(0));

    start_burst(&mut app, host, first.clone()).expect("burst should start");
    let result = start_burst(&mut app, host, second.clone());
    assert!(matches!(result, Err(ConfettiError::BurstActive)));
    assert_eq!(layer_count(&mut app), 2, "no extra layers should spawn");

    advance_seconds(&mut app, 5.5);
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0, "rejected callback never runs");
}

#[test]
fn retrigger_while_running_is_ignored() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    {
        let mut trigger = app.world_mut().get_mut::<ConfettiTrigger>(host).unwrap();
        trigger.active = false;
    }
    app.update();
    fire(&mut app, host);
    app.update();

    assert_eq!(layer_count(&mut app), 2);
    let controller = app.world().get::<BurstController>(host).unwrap();
    assert_eq!(controller.bursts_started(), 1);
}

#[test]
fn zero_area_surface_still_runs_burst() {
    let mut app = create_minimal_app();
    let host = spawn_host(&mut app, Vec2::ZERO);
    fire(&mut app, host);
    app.update();

    assert_eq!(layer_count(&mut app), 2);
    let primary = layer_with_speed(&mut app, LayerStyle::PRIMARY.speed);
    let layer = app.world().get::<EmissionLayer>(primary).unwrap();
    assert_eq!(layer.config.position, Vec2::ZERO);

    advance_seconds(&mut app, 5.3);
    assert_eq!(layer_count(&mut app), 0);
    assert!(!trigger_active(&app, host));
}

#[test]
fn missing_surface_resets_trigger() {
    let mut app = create_minimal_app();
    let host = app
        .world_mut()
        .spawn((ConfettiTrigger::new(true), BurstController::with_seed(7)))
        .id();
    app.update();

    assert_eq!(layer_count(&mut app), 0);
    assert!(!trigger_active(&app, host));

    let completions = Arc::new(AtomicU32::new(0));
    let result = start_burst(&mut app, host, completions);
    assert!(matches!(result, Err(ConfettiError::NoSurface)));
}

#[test]
fn repeated_bursts_reuse_textures() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    let images = app.world().resource::<Assets<Image>>().len();
    assert_eq!(images, 18, "one texture per shape and colour");

    advance_seconds(&mut app, 5.3);
    assert!(!trigger_active(&app, host));

    fire(&mut app, host);
    app.update();

    assert_eq!(layer_count(&mut app), 2);
    assert_eq!(app.world().resource::<Assets<Image>>().len(), 18);

    let controller = app.world().get::<BurstController>(host).unwrap();
    assert_eq!(controller.bursts_started(), 2);
}

#[test]
fn hosts_burst_independently() {
    let mut app = create_minimal_app();
    let first = fired_host(&mut app);
    advance_seconds(&mut app, 2.0);
    let second = fired_host(&mut app);

    assert_eq!(layer_count(&mut app), 4);

    advance_seconds(&mut app, 3.2);
    assert_eq!(layer_count(&mut app), 2);
    assert!(!trigger_active(&app, first));
    assert!(trigger_active(&app, second));
}

#[test]
fn burst_ends_on_wall_clock_despite_long_frames() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    set_frame_duration(&mut app, Duration::from_secs(1));
    advance_frames(&mut app, 4);
    assert_eq!(layer_count(&mut app), 2, "only four seconds have passed");

    advance_frames(&mut app, 2);
    assert_eq!(layer_count(&mut app), 0);
    assert!(!trigger_active(&app, host));
}

#[test]
fn burst_ends_while_virtual_time_is_paused() {
    let mut app = create_minimal_app();
    let host = fired_host(&mut app);

    pause_virtual_time(&mut app);
    set_frame_duration(&mut app, Duration::from_secs(1));
    advance_frames(&mut app, 6);

    assert_eq!(layer_count(&mut app), 0);
    assert!(!trigger_active(&app, host));
    let controller = app.world().get::<BurstController>(host).unwrap();
    assert!(!controller.is_active());
}
