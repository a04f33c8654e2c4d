use bevy::prelude::*;
use bevy_confetti::behavior::ParticleBehavior;
use bevy_confetti::prelude::*;

const EPSILON: f32 = 1e-3;

#[test]
fn drag_opposes_velocity() {
    let mut particle = ConfettiParticle::at(Vec3::ZERO);
    particle.velocity = Vec3::new(10.0, -4.0, 0.0);

    let acceleration = DragBehavior::default().acceleration(&particle);
    assert!(acceleration.abs_diff_eq(Vec3::new(-20.0, 8.0, 0.0), EPSILON));
}

#[test]
fn attractor_sits_below_and_behind_emitter() {
    let attractor = AttractorBehavior::below(Vec2::new(200.0, 400.0));
    assert_eq!(attractor.position, Vec3::new(200.0, 380.0, -70.0));
    assert_eq!(attractor.radius, 300.0);
    assert_eq!(attractor.stiffness, 10.0);
    assert_eq!(attractor.falloff, -290.0);
}

#[test]
fn attractor_pulls_at_full_strength_inside_radius() {
    let attractor = AttractorBehavior::below(Vec2::new(200.0, 400.0));
    let particle = ConfettiParticle::at(Vec3::new(300.0, 380.0, -70.0));

    let acceleration = attractor.acceleration(&particle);
    assert!(acceleration.abs_diff_eq(Vec3::new(-1000.0, 0.0, 0.0), EPSILON));
}

#[test]
fn attractor_fades_out_with_distance() {
    let attractor = AttractorBehavior::below(Vec2::ZERO);

    let near_edge = ConfettiParticle::at(attractor.position + Vec3::X * 330.0);
    let partial = attractor.acceleration(&near_edge).length();
    let full = 330.0 * attractor.stiffness;
    assert!(partial > 0.0 && partial < full);

    let far = ConfettiParticle::at(attractor.position + Vec3::X * 500.0);
    assert_eq!(attractor.acceleration(&far), Vec3::ZERO);
}

#[test]
fn waves_start_at_rest_and_peak_at_quarter_period() {
    let vertical = WaveBehavior::vertical();
    let mut particle = ConfettiParticle::at(Vec3::ZERO);

    assert!(vertical.acceleration(&particle).abs_diff_eq(Vec3::ZERO, EPSILON));

    particle.age = 0.25 / vertical.frequency;
    let peak = vertical.acceleration(&particle);
    assert!(peak.abs_diff_eq(Vec3::new(0.0, -500.0, 0.0), EPSILON));
}

#[test]
fn horizontal_wave_respects_phase() {
    let horizontal = WaveBehavior::horizontal();
    let mut particle = ConfettiParticle::at(Vec3::ZERO);
    particle.phase = std::f32::consts::FRAC_PI_2;

    let acceleration = horizontal.acceleration(&particle);
    assert!(acceleration.abs_diff_eq(Vec3::new(100.0, 0.0, 0.0), EPSILON));
}

#[test]
fn animated_values_override_set() {
    let set = BehaviorSet::for_emitter(Vec2::new(50.0, 50.0));
    let animated = set.with_animated(80.0, 0.0);

    assert_eq!(animated.attractor.stiffness, 80.0);
    assert_eq!(animated.drag.drag, 0.0);
    assert_eq!(set.attractor.stiffness, 10.0);
    assert_eq!(animated.horizontal_wave, set.horizontal_wave);
}

#[test]
fn set_sums_every_behavior() {
    let set = BehaviorSet::for_emitter(Vec2::new(50.0, 50.0));
    let mut particle = ConfettiParticle::at(Vec3::new(10.0, 20.0, 0.0));
    particle.velocity = Vec3::new(3.0, 1.0, 0.0);
    particle.age = 0.4;

    let expected: Vec3 = set.iter().map(|behavior| behavior.acceleration(&particle)).sum();
    assert_eq!(set.iter().count(), 4);
    assert!(set.acceleration(&particle).abs_diff_eq(expected, EPSILON));
}

#[test]
fn particle_integrates_semi_implicitly() {
    let mut particle = ConfettiParticle::at(Vec3::ZERO);
    particle.lifetime = 1.0;
    particle.spin = 2.0;

    particle.integrate(Vec3::new(0.0, -10.0, 0.0), 0.5);
    assert!(particle.velocity.abs_diff_eq(Vec3::new(0.0, -5.0, 0.0), EPSILON));
    assert!(particle.position.abs_diff_eq(Vec3::new(0.0, -2.5, 0.0), EPSILON));
    assert!((particle.spin_angle - 1.0).abs() < EPSILON);
    assert!(!particle.is_expired());

    particle.integrate(Vec3::ZERO, 0.5);
    assert!(particle.is_expired());
}
