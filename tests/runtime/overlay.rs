use bevy::prelude::*;
use bevy_confetti::overlay::{layer_translation, overlay_origin};
use bevy_confetti::prelude::*;

#[test]
fn origin_is_lifted_to_the_top_of_the_safe_area() {
    let insets = SafeAreaInsets {
        top: 44.0,
        ..default()
    };
    let bounds = Vec2::new(400.0, 800.0);

    assert_eq!(overlay_origin(bounds, &insets), Vec2::new(0.0, 444.0));
    assert_eq!(layer_translation(bounds, &insets), Vec2::new(-200.0, 44.0));
}

#[test]
fn origin_ignores_side_insets() {
    let insets = SafeAreaInsets {
        leading: 20.0,
        trailing: 20.0,
        bottom: 34.0,
        ..default()
    };
    assert_eq!(
        overlay_origin(Vec2::new(400.0, 800.0), &insets),
        Vec2::new(0.0, 400.0)
    );
}

#[test]
fn trigger_starts_inactive() {
    let trigger = ConfettiTrigger::default();
    assert!(!trigger.active);

    let mut trigger = trigger;
    trigger.fire();
    assert!(trigger.active);
}

#[test]
fn surface_area() {
    assert!(HostSurface::new(Vec2::new(400.0, 800.0)).has_area());
    assert!(!HostSurface::new(Vec2::new(400.0, 0.0)).has_area());
    assert_eq!(
        HostSurface::new(Vec2::new(-5.0, 10.0)).bounds(),
        Vec2::new(0.0, 10.0)
    );
}
