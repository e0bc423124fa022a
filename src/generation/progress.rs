//! Run progression and level transitions.
//!
//! Tracks how far a run has climbed, regenerates layouts as the player
//! moves between levels, and announces freshly generated levels to the
//! rest of the app.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::layout::{generate_level, LevelLayout, TileKind};
use super::{LevelSpec, RunSeed};
use crate::config::LevelConfig;
use crate::constants::{FLOOR_HEIGHT_TILES, TILE_WORLD_SIZE};

/// Current active level state
#[derive(Resource, Debug)]
pub struct ActiveLevel {
    pub level: u32,
    pub spec: LevelSpec,
    pub layout: LevelLayout,
    pub cleared_before: bool,
}

/// Why a transition was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Exit door reached: move up one level
    Advance,
    /// Player died with lives remaining: replay the current level
    Restart,
}

/// Event: a level transition was requested
#[derive(Event, Debug)]
pub struct LevelTransitionEvent {
    pub kind: TransitionKind,
}

/// Event: new level layout is ready
#[derive(Event, Debug)]
pub struct LevelReadyEvent {
    pub level: u32,
    pub layout: LevelLayout,
}

/// Run progression tracker
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct RunProgress {
    pub run_seed: RunSeed,
    pub current_level: u32,
    pub furthest_level: u32,
    pub levels_cleared: Vec<u32>,
    pub total_deaths: u32,
}

impl RunProgress {
    pub fn new(seed: u64) -> Self {
        Self {
            run_seed: RunSeed { seed },
            current_level: 1,
            furthest_level: 1,
            levels_cleared: Vec::new(),
            total_deaths: 0,
        }
    }

    pub fn is_cleared(&self, level: u32) -> bool {
        self.levels_cleared.contains(&level)
    }

    pub fn clear_level(&mut self, level: u32) {
        if !self.levels_cleared.contains(&level) {
            self.levels_cleared.push(level);
        }
    }
}

/// System: generate the first level of the run at startup
pub fn generate_initial_level(
    progress: Res<RunProgress>,
    mut ready_events: EventWriter<LevelReadyEvent>,
    mut commands: Commands,
) {
    let level = progress.current_level;
    let config = LevelConfig::for_level(level);
    let spec = LevelSpec::generate(&progress.run_seed, level);
    let layout = generate_level(&config, &spec);

    commands.insert_resource(ActiveLevel {
        level,
        spec,
        layout: layout.clone(),
        cleared_before: progress.is_cleared(level),
    });
    ready_events.send(LevelReadyEvent { level, layout });

    info!("Initial level {} generated", level);
}

/// System: generate the target level on transition
pub fn handle_level_transitions(
    mut transition_events: EventReader<LevelTransitionEvent>,
    mut ready_events: EventWriter<LevelReadyEvent>,
    mut progress: ResMut<RunProgress>,
    mut active_level: Option<ResMut<ActiveLevel>>,
    mut commands: Commands,
) {
    for event in transition_events.read() {
        let current = progress.current_level;
        let next_level = match event.kind {
            TransitionKind::Advance => {
                progress.clear_level(current);
                current + 1
            }
            TransitionKind::Restart => {
                progress.total_deaths += 1;
                current
            }
        };

        let config = LevelConfig::for_level(next_level);
        let spec = LevelSpec::generate(&progress.run_seed, next_level);
        let layout = generate_level(&config, &spec);

        progress.current_level = next_level;
        if next_level > progress.furthest_level {
            progress.furthest_level = next_level;
        }

        let new_level = ActiveLevel {
            level: next_level,
            spec: spec.clone(),
            layout: layout.clone(),
            cleared_before: progress.is_cleared(next_level),
        };

        if let Some(ref mut active) = active_level {
            active.level = new_level.level;
            active.spec = new_level.spec;
            active.layout = new_level.layout;
            active.cleared_before = new_level.cleared_before;
        } else {
            commands.insert_resource(new_level);
        }

        ready_events.send(LevelReadyEvent {
            level: next_level,
            layout,
        });

        info!("Level transition: now on level {}", next_level);
    }
}

/// System: detect the player standing at the exit door
pub fn detect_exit_door(
    active_level: Option<Res<ActiveLevel>>,
    players: Query<&Transform, With<crate::player::Player>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut transition_events: EventWriter<LevelTransitionEvent>,
) {
    let Some(level) = active_level else {
        return;
    };

    if !keys.just_pressed(KeyCode::KeyE) {
        return; // Interact key
    }

    for player_tf in &players {
        // Convert player position to tile coordinates
        let col = (player_tf.translation.x / TILE_WORLD_SIZE).round() as usize;
        let floor = (player_tf.translation.y / (TILE_WORLD_SIZE * FLOOR_HEIGHT_TILES as f32))
            .round() as usize;

        if level.layout.tile_at(floor, col) == TileKind::ExitDoor {
            transition_events.send(LevelTransitionEvent {
                kind: TransitionKind::Advance,
            });
        }
    }
}
