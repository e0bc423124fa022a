//! Enemy roster and spawning.
//!
//! Five fixed kinds, each with a difficulty cost the per-floor budget is
//! spent on, a spawn weight, and a movement behavior. Placement is done
//! by the allocator in [`spawner`]; this module owns the static table and
//! the ECS side of turning placements into entities.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{FLOOR_HEIGHT_TILES, TILE_WORLD_SIZE};
use crate::generation::progress::LevelReadyEvent;

pub mod spawner;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnEnemyEvent>()
            .add_systems(
                Update,
                (queue_level_enemy_spawns, process_enemy_spawns).chain(),
            );
    }
}

/// The enemy roster. Ordered roughly by difficulty cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Crawler, // patrols its floor, cheap swarm filler
    Spiker,  // stationary hazard
    Flyer,   // sine-wave flight above its anchor tile
    Chaser,  // walks toward the player, faster
    Brute,   // slow, expensive, hits hard
}

/// Movement behavior driving an enemy's update logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    PatrolFloor,
    Stationary,
    SineFlight,
    ChasePlayer,
}

/// Static per-kind tuning. One entry per kind, compiled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub kind: EnemyKind,
    /// Points this kind costs from the floor's difficulty budget.
    pub difficulty_cost: u32,
    /// Relative weight in the allocator's random pick.
    pub spawn_weight: u32,
    /// Movement speed in tiles per second.
    pub speed: f32,
    pub behavior: EnemyBehavior,
    pub contact_damage: u32,
}

impl EnemyKind {
    pub fn all() -> &'static [EnemyKind] {
        &[
            EnemyKind::Crawler,
            EnemyKind::Spiker,
            EnemyKind::Flyer,
            EnemyKind::Chaser,
            EnemyKind::Brute,
        ]
    }

    pub fn definition(&self) -> EnemyDefinition {
        match self {
            EnemyKind::Crawler => EnemyDefinition {
                kind: *self,
                difficulty_cost: 1,
                spawn_weight: 50,
                speed: 2.0,
                behavior: EnemyBehavior::PatrolFloor,
                contact_damage: 1,
            },
            EnemyKind::Spiker => EnemyDefinition {
                kind: *self,
                difficulty_cost: 1,
                spawn_weight: 30,
                speed: 0.0,
                behavior: EnemyBehavior::Stationary,
                contact_damage: 1,
            },
            EnemyKind::Flyer => EnemyDefinition {
                kind: *self,
                difficulty_cost: 2,
                spawn_weight: 25,
                speed: 3.0,
                behavior: EnemyBehavior::SineFlight,
                contact_damage: 1,
            },
            EnemyKind::Chaser => EnemyDefinition {
                kind: *self,
                difficulty_cost: 3,
                spawn_weight: 15,
                speed: 3.5,
                behavior: EnemyBehavior::ChasePlayer,
                contact_damage: 1,
            },
            EnemyKind::Brute => EnemyDefinition {
                kind: *self,
                difficulty_cost: 4,
                spawn_weight: 8,
                speed: 1.2,
                behavior: EnemyBehavior::PatrolFloor,
                contact_damage: 2,
            },
        }
    }
}

/// One enemy placement emitted by the allocator into the level layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub floor: usize,
    pub col: usize,
    /// Inclusive column range a patroller walks, for walking kinds.
    pub patrol: Option<(usize, usize)>,
}

/// Request to spawn an enemy entity from a placement
#[derive(Event, Debug)]
pub struct SpawnEnemyEvent {
    pub spawn: EnemySpawn,
}

/// Marker component for enemy entities
#[derive(Component, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub patrol: Option<(usize, usize)>,
}

/// System: replace the enemy population when a new level arrives
fn queue_level_enemy_spawns(
    mut ready_events: EventReader<LevelReadyEvent>,
    mut spawn_events: EventWriter<SpawnEnemyEvent>,
    existing: Query<Entity, With<Enemy>>,
    mut commands: Commands,
) {
    for event in ready_events.read() {
        for entity in &existing {
            commands.entity(entity).despawn();
        }
        for spawn in &event.layout.enemies {
            spawn_events.send(SpawnEnemyEvent {
                spawn: spawn.clone(),
            });
        }
    }
}

fn process_enemy_spawns(mut commands: Commands, mut events: EventReader<SpawnEnemyEvent>) {
    for event in events.read() {
        let spawn = &event.spawn;
        let x = spawn.col as f32 * TILE_WORLD_SIZE;
        let y = (spawn.floor * FLOOR_HEIGHT_TILES) as f32 * TILE_WORLD_SIZE;

        commands.spawn((
            Transform::from_xyz(x, y, 0.0),
            Enemy {
                kind: spawn.kind,
                patrol: spawn.patrol,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_is_complete() {
        assert_eq!(EnemyKind::all().len(), 5);
    }

    #[test]
    fn test_definitions_self_describe() {
        for kind in EnemyKind::all() {
            let def = kind.definition();
            assert_eq!(def.kind, *kind);
            assert!(def.difficulty_cost >= 1, "{kind:?} must cost something");
            assert!(def.spawn_weight > 0, "{kind:?} must be pickable");
        }
    }

    #[test]
    fn test_cost_ordering() {
        let crawler = EnemyKind::Crawler.definition();
        let brute = EnemyKind::Brute.definition();
        assert!(brute.difficulty_cost > crawler.difficulty_cost);
        assert!(brute.spawn_weight < crawler.spawn_weight, "Expensive kinds are rarer");
    }

    #[test]
    fn test_stationary_has_no_speed() {
        let spiker = EnemyKind::Spiker.definition();
        assert_eq!(spiker.behavior, EnemyBehavior::Stationary);
        assert_eq!(spiker.speed, 0.0);
    }

    #[test]
    fn test_spawn_serialization() {
        let spawn = EnemySpawn {
            kind: EnemyKind::Flyer,
            floor: 3,
            col: 7,
            patrol: None,
        };
        let json = serde_json::to_string(&spawn).unwrap();
        let restored: EnemySpawn = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spawn);
    }
}
