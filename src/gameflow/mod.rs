//! Game flow state machine.
//!
//! Manages the top-level game states using Bevy's States system:
//! Loading → MainMenu → Playing → Paused / LevelTransition → GameOver
//!
//! Each state has OnEnter/OnExit systems for initialization/cleanup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::STARTING_LIVES;

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::Loading), on_enter_loading)
            .add_systems(OnEnter(GameState::MainMenu), on_enter_main_menu)
            .add_systems(OnEnter(GameState::Playing), on_enter_playing)
            .add_systems(OnExit(GameState::Playing), on_exit_playing)
            .add_systems(OnEnter(GameState::Paused), on_enter_paused)
            .add_systems(OnExit(GameState::Paused), on_exit_paused)
            .add_systems(OnEnter(GameState::GameOver), on_enter_game_over)
            .add_event::<GameFlowEvent>();
    }
}

/// Top-level game states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Initial boot: config, save store, first layout
    #[default]
    Loading,
    /// Main menu: play, audio toggles, quit
    MainMenu,
    /// Actively climbing
    Playing,
    /// Game paused
    Paused,
    /// Between levels (fade out → generate → fade in)
    LevelTransition,
    /// Run ended — summary display, record persistence
    GameOver,
}

/// Events that trigger state transitions
#[derive(Event, Debug, Clone)]
pub enum GameFlowEvent {
    /// Boot work finished
    LoadingComplete,
    /// Player pressed "Play" from the main menu
    StartRun,
    /// Player pressed pause
    Pause,
    /// Player resumed from pause
    Resume,
    /// Exit door reached — level is done
    LevelCleared { next_level: u32 },
    /// Transition animation complete, next level is live
    TransitionComplete,
    /// Player lost a life
    PlayerDied { lives_left: u32 },
    /// Out of lives — run over
    RunEnded,
    /// Return to main menu
    ReturnToMenu,
}

/// Per-run live stats
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u64,
    pub lives: u32,
    pub collectibles_gathered: u32,
    pub enemies_contacted: u32,
    pub time_in_level: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            score: 0,
            lives: STARTING_LIVES,
            collectibles_gathered: 0,
            enemies_contacted: 0,
            time_in_level: 0.0,
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot shown on the game-over screen
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_score: u64,
    pub furthest_level: u32,
    pub collectibles_gathered: u32,
    pub total_deaths: u32,
}

// State transition systems

fn on_enter_loading(mut _commands: Commands) {
    info!("GameFlow: Entering Loading state");
}

fn on_enter_main_menu(mut _commands: Commands) {
    info!("GameFlow: Entering MainMenu state");
}

fn on_enter_playing(mut commands: Commands) {
    info!("GameFlow: Entering Playing state");
    commands.insert_resource(SessionStats::new());
}

fn on_exit_playing(mut commands: Commands) {
    info!("GameFlow: Exiting Playing state");
    commands.remove_resource::<SessionStats>();
}

fn on_enter_paused(mut _commands: Commands) {
    info!("GameFlow: Game Paused");
}

fn on_exit_paused(mut _commands: Commands) {
    info!("GameFlow: Game Resumed");
}

fn on_enter_game_over(mut _commands: Commands) {
    info!("GameFlow: Run Over");
}

/// Serializable flow snapshot (for HUD/front-end queries)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFlowSnapshot {
    pub state: String,
    pub stats: Option<SessionStats>,
}

/// Get a snapshot of current game flow state
pub fn create_snapshot(state: GameState, stats: Option<&SessionStats>) -> GameFlowSnapshot {
    GameFlowSnapshot {
        state: format!("{:?}", state),
        stats: stats.cloned(),
    }
}

/// All valid game states as strings (for UI)
pub fn all_game_states() -> Vec<String> {
    vec![
        "Loading".to_string(),
        "MainMenu".to_string(),
        "Playing".to_string(),
        "Paused".to_string(),
        "LevelTransition".to_string(),
        "GameOver".to_string(),
    ]
}
