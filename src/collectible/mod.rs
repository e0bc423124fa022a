//! Collectible kinds, weighted rolls, and pickup scoring.
//!
//! Placement is done by the layout solver; this module owns the kind
//! table and the scoring system that applies pickups to the session.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{FLOOR_HEIGHT_TILES, TILE_WORLD_SIZE};
use crate::gameflow::SessionStats;
use crate::generation::progress::LevelReadyEvent;
use crate::generation::DeterministicRng;

pub struct CollectiblePlugin;

impl Plugin for CollectiblePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CollectedEvent>()
            .add_systems(Update, (spawn_level_collectibles, apply_pickups));
    }
}

/// Collectible roster. Hearts grant a life instead of score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Gem,
    Star,
    Heart,
}

impl CollectibleKind {
    pub fn all() -> &'static [CollectibleKind] {
        &[
            CollectibleKind::Coin,
            CollectibleKind::Gem,
            CollectibleKind::Star,
            CollectibleKind::Heart,
        ]
    }

    /// Score granted on pickup. Hearts score nothing.
    pub fn score_value(&self) -> u64 {
        match self {
            CollectibleKind::Coin => 10,
            CollectibleKind::Gem => 50,
            CollectibleKind::Star => 200,
            CollectibleKind::Heart => 0,
        }
    }

    /// Relative weight in the placement roll (higher = more common).
    pub fn pick_weight(&self) -> u32 {
        match self {
            CollectibleKind::Coin => 60,
            CollectibleKind::Gem => 25,
            CollectibleKind::Star => 8,
            CollectibleKind::Heart => 7,
        }
    }
}

/// One collectible placement in the level layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleSpawn {
    pub kind: CollectibleKind,
    pub floor: usize,
    pub col: usize,
}

/// Marker component for collectible entities
#[derive(Component, Debug)]
pub struct Collectible {
    pub kind: CollectibleKind,
}

/// Player picked something up
#[derive(Event, Debug, Clone)]
pub struct CollectedEvent {
    pub kind: CollectibleKind,
}

/// Weighted pick among the allowed kinds. None for an empty allowlist.
pub fn roll_kind(
    allowlist: &[CollectibleKind],
    rng: &mut DeterministicRng,
) -> Option<CollectibleKind> {
    let total: u32 = allowlist.iter().map(|k| k.pick_weight()).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.next_range(0, total as usize) as u32;
    for kind in allowlist {
        let weight = kind.pick_weight();
        if roll < weight {
            return Some(*kind);
        }
        roll -= weight;
    }
    allowlist.last().copied()
}

/// System: replace collectible entities when a new level arrives
fn spawn_level_collectibles(
    mut ready_events: EventReader<LevelReadyEvent>,
    existing: Query<Entity, With<Collectible>>,
    mut commands: Commands,
) {
    for event in ready_events.read() {
        for entity in &existing {
            commands.entity(entity).despawn();
        }
        for spawn in &event.layout.collectibles {
            let x = spawn.col as f32 * TILE_WORLD_SIZE;
            let y = (spawn.floor * FLOOR_HEIGHT_TILES) as f32 * TILE_WORLD_SIZE;
            commands.spawn((Transform::from_xyz(x, y, 0.0), Collectible { kind: spawn.kind }));
        }
    }
}

fn apply_pickups(mut events: EventReader<CollectedEvent>, stats: Option<ResMut<SessionStats>>) {
    let Some(mut stats) = stats else {
        return;
    };
    for event in events.read() {
        match event.kind {
            CollectibleKind::Heart => {
                stats.lives += 1;
            }
            kind => {
                stats.score += kind.score_value();
            }
        }
        stats.collectibles_gathered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_is_complete() {
        assert_eq!(CollectibleKind::all().len(), 4);
    }

    #[test]
    fn test_score_values_ordered_by_rarity() {
        assert!(CollectibleKind::Gem.score_value() > CollectibleKind::Coin.score_value());
        assert!(CollectibleKind::Star.score_value() > CollectibleKind::Gem.score_value());
        assert_eq!(CollectibleKind::Heart.score_value(), 0);
    }

    #[test]
    fn test_roll_respects_allowlist() {
        let allow = [CollectibleKind::Coin, CollectibleKind::Gem];
        let mut rng = DeterministicRng::new(42);
        for _ in 0..200 {
            let kind = roll_kind(&allow, &mut rng).unwrap();
            assert!(allow.contains(&kind));
        }
    }

    #[test]
    fn test_roll_empty_allowlist() {
        let mut rng = DeterministicRng::new(42);
        assert_eq!(roll_kind(&[], &mut rng), None);
    }

    #[test]
    fn test_roll_is_deterministic() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);
        for _ in 0..50 {
            assert_eq!(
                roll_kind(CollectibleKind::all(), &mut a),
                roll_kind(CollectibleKind::all(), &mut b)
            );
        }
    }

    #[test]
    fn test_common_kinds_dominate() {
        let mut rng = DeterministicRng::new(1234);
        let mut coins = 0;
        let mut stars = 0;
        for _ in 0..1000 {
            match roll_kind(CollectibleKind::all(), &mut rng).unwrap() {
                CollectibleKind::Coin => coins += 1,
                CollectibleKind::Star => stars += 1,
                _ => {}
            }
        }
        assert!(coins > stars * 3, "Coins ({coins}) should far outnumber stars ({stars})");
    }

    #[test]
    fn test_spawn_serialization() {
        let spawn = CollectibleSpawn {
            kind: CollectibleKind::Star,
            floor: 2,
            col: 9,
        };
        let json = serde_json::to_string(&spawn).unwrap();
        let restored: CollectibleSpawn = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spawn);
    }
}
