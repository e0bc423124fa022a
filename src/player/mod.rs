//! Player entity lifecycle.
//!
//! Spawns the climber at each level's entry door and raises the death
//! event when contact damage exhausts the session's lives. Movement,
//! physics, and input mapping belong to the front end.

use bevy::prelude::*;

use crate::constants::{FLOOR_HEIGHT_TILES, TILE_WORLD_SIZE};
use crate::gameflow::SessionStats;
use crate::generation::progress::LevelReadyEvent;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactDamageEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_systems(Update, (spawn_player_at_entry, apply_contact_damage).chain());
    }
}

/// Marker for the player entity
#[derive(Component, Debug, Default)]
pub struct Player;

/// An enemy touched the player
#[derive(Event, Debug, Clone)]
pub struct ContactDamageEvent {
    pub damage: u32,
}

/// Lives ran out
#[derive(Event, Debug, Clone)]
pub struct PlayerDiedEvent;

/// System: (re)position the player at the entry door of a fresh level
fn spawn_player_at_entry(
    mut ready_events: EventReader<LevelReadyEvent>,
    mut players: Query<&mut Transform, With<Player>>,
    mut commands: Commands,
) {
    for event in ready_events.read() {
        let x = event.layout.entry_col as f32 * TILE_WORLD_SIZE;
        let y = TILE_WORLD_SIZE * FLOOR_HEIGHT_TILES as f32 * 0.25;

        if let Ok(mut transform) = players.get_single_mut() {
            transform.translation = Vec3::new(x, y, 0.0);
        } else {
            commands.spawn((Player, Transform::from_xyz(x, y, 0.0)));
        }
        info!("Player placed at entry door, level {}", event.level);
    }
}

/// System: spend lives on contact damage, announce death at zero
fn apply_contact_damage(
    mut damage_events: EventReader<ContactDamageEvent>,
    mut died_events: EventWriter<PlayerDiedEvent>,
    stats: Option<ResMut<SessionStats>>,
) {
    let Some(mut stats) = stats else {
        return;
    };
    for event in damage_events.read() {
        stats.enemies_contacted += 1;
        let lost = event.damage.min(stats.lives);
        stats.lives -= lost;
        if stats.lives == 0 {
            died_events.send(PlayerDiedEvent);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STARTING_LIVES;

    #[test]
    fn test_contact_damage_math() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.lives, STARTING_LIVES);
        let damage = 1u32.min(stats.lives);
        stats.lives -= damage;
        assert_eq!(stats.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_damage_never_underflows() {
        let mut stats = SessionStats::new();
        stats.lives = 1;
        let damage = 5u32.min(stats.lives);
        stats.lives -= damage;
        assert_eq!(stats.lives, 0);
    }
}
