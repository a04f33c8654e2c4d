use bevy::{prelude::*, window::PrimaryWindow};
use bevy_confetti::prelude::*;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, ConfettiPlugin))
        .add_systems(Startup, setup)
        .add_systems(Update, (fit_surface_to_window, celebrate_on_space))
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.spawn((Name::new("Confetti host"), ConfettiOverlay::default()));
    commands.spawn((
        Text::new("Press space to celebrate"),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            left: Val::Px(24.0),
            ..default()
        },
    ));
}

fn fit_surface_to_window(
    window: Single<&Window, With<PrimaryWindow>>,
    mut surfaces: Query<&mut HostSurface>,
) {
    let size = window.size();
    for mut surface in &mut surfaces {
        if surface.size != size {
            surface.size = size;
        }
    }
}

fn celebrate_on_space(
    keys: Res<ButtonInput<KeyCode>>,
    mut triggers: Query<&mut ConfettiTrigger>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for mut trigger in &mut triggers {
        if trigger.active {
            info!("confetti already falling");
        } else {
            trigger.fire();
        }
    }
}
