use bevy::prelude::*;

mod audit;
mod collectible;
mod config;
mod constants;
mod enemy;
mod gameflow;
mod generation;
mod logging;
mod player;
mod save;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Skyshaft - Procedural Core".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Core systems
        .add_plugins(generation::GenerationPlugin)
        // Entity systems
        .add_plugins(enemy::EnemyPlugin)
        .add_plugins(collectible::CollectiblePlugin)
        .add_plugins(player::PlayerPlugin)
        // Game Flow States
        .add_plugins(gameflow::GameFlowPlugin)
        // Logging
        .add_plugins(logging::LoggingPlugin)
        // Startup
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    // Camera
    commands.spawn(Camera2d);

    info!("Skyshaft Procedural Core initialized");
    info!("Systems loaded — generation, enemy, collectible, player, gameflow");
}
