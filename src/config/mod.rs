//! Level configuration tables.
//!
//! Maps a level number to everything the solver needs: floor count, world
//! width, gap/ladder/collectible counts, the enemy and collectible
//! allowlists, and the difficulty budget curve. `for_level` is total —
//! every level number yields a valid, validated config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collectible::CollectibleKind;
use crate::constants::{
    BASE_DIFFICULTY_BUDGET, BUDGET_PER_FLOOR, BUDGET_PER_LEVEL, GAP_MAX_WIDTH, GAP_SEPARATION,
    MAX_FLOOR_COUNT, MAX_WORLD_WIDTH, MIN_WORLD_WIDTH,
};
use crate::enemy::EnemyKind;

/// Difficulty band a level belongs to. Determines which enemy and
/// collectible kinds have unlocked and how dense the layout gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelBand {
    Intro,    // 1-2: crawlers only, single gaps
    Ascent,   // 3-5: flyers join, gems appear
    Gauntlet, // 6-9: chasers join, denser gaps
    Spire,    // 10+: full roster, double ladders
}

impl LevelBand {
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=2 => Self::Intro,
            3..=5 => Self::Ascent,
            6..=9 => Self::Gauntlet,
            _ => Self::Spire,
        }
    }
}

/// Everything the generator needs to know about one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub band: LevelBand,
    pub floor_count: usize,
    pub world_width: usize,
    /// (min, max) gaps carved per floor above ground.
    pub gaps_per_floor: (usize, usize),
    /// (min, max) ladders connecting each floor pair.
    pub ladders_per_floor: (usize, usize),
    /// (min, max) collectibles placed per floor.
    pub collectibles_per_floor: (usize, usize),
    pub enemy_allowlist: Vec<EnemyKind>,
    pub collectible_allowlist: Vec<CollectibleKind>,
    /// Difficulty points for the first floor above ground.
    pub base_difficulty_budget: u32,
    /// Extra points per additional floor climbed.
    pub budget_per_floor: u32,
}

/// Config validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("world width {0} outside [{MIN_WORLD_WIDTH}, {MAX_WORLD_WIDTH}]")]
    WorldWidth(usize),
    #[error("floor count {0} outside [2, {MAX_FLOOR_COUNT}]")]
    FloorCount(usize),
    #[error("gap allowance ({gaps} gaps) cannot fit a floor of width {width}")]
    GapsExceedFloor { gaps: usize, width: usize },
    #[error("range ({0}, {1}) has min above max")]
    InvertedRange(usize, usize),
    #[error("enemy allowlist is empty")]
    NoEnemies,
    #[error("collectible allowlist is empty")]
    NoCollectibles,
}

impl LevelConfig {
    /// Deterministic config table. Floor count and width ramp with the
    /// level number and clamp at their maxima; kinds unlock per band.
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let band = LevelBand::from_level(level);

        let floor_count = (3 + level as usize).min(MAX_FLOOR_COUNT);
        let world_width = (14 + 2 * (level as usize - 1)).min(MAX_WORLD_WIDTH);

        let (gaps_per_floor, ladders_per_floor, collectibles_per_floor) = match band {
            LevelBand::Intro => ((1, 1), (1, 1), (1, 2)),
            LevelBand::Ascent => ((1, 2), (1, 2), (2, 3)),
            LevelBand::Gauntlet => ((1, 2), (1, 2), (2, 4)),
            LevelBand::Spire => ((2, 2), (2, 2), (3, 4)),
        };

        let enemy_allowlist = match band {
            LevelBand::Intro => vec![EnemyKind::Crawler, EnemyKind::Spiker],
            LevelBand::Ascent => vec![EnemyKind::Crawler, EnemyKind::Spiker, EnemyKind::Flyer],
            LevelBand::Gauntlet => vec![
                EnemyKind::Crawler,
                EnemyKind::Spiker,
                EnemyKind::Flyer,
                EnemyKind::Chaser,
            ],
            LevelBand::Spire => EnemyKind::all().to_vec(),
        };

        let collectible_allowlist = match band {
            LevelBand::Intro => vec![CollectibleKind::Coin],
            LevelBand::Ascent => vec![
                CollectibleKind::Coin,
                CollectibleKind::Gem,
                CollectibleKind::Heart,
            ],
            LevelBand::Gauntlet | LevelBand::Spire => CollectibleKind::all().to_vec(),
        };

        Self {
            level,
            band,
            floor_count,
            world_width,
            gaps_per_floor,
            ladders_per_floor,
            collectibles_per_floor,
            enemy_allowlist,
            collectible_allowlist,
            base_difficulty_budget: BASE_DIFFICULTY_BUDGET + level * BUDGET_PER_LEVEL,
            budget_per_floor: BUDGET_PER_FLOOR,
        }
    }

    /// Difficulty points granted to one floor. The ground floor is a
    /// safe start and gets nothing.
    pub fn floor_budget(&self, floor_index: usize) -> u32 {
        if floor_index == 0 {
            return 0;
        }
        self.base_difficulty_budget + (floor_index as u32 - 1) * self.budget_per_floor
    }

    /// Bounds-check the config against the solver's hard limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORLD_WIDTH..=MAX_WORLD_WIDTH).contains(&self.world_width) {
            return Err(ConfigError::WorldWidth(self.world_width));
        }
        if !(2..=MAX_FLOOR_COUNT).contains(&self.floor_count) {
            return Err(ConfigError::FloorCount(self.floor_count));
        }
        for (min, max) in [
            self.gaps_per_floor,
            self.ladders_per_floor,
            self.collectibles_per_floor,
        ] {
            if min > max {
                return Err(ConfigError::InvertedRange(min, max));
            }
        }
        // Worst case: every gap at max width plus mandatory separation,
        // plus the solid edge columns, must fit the floor.
        let worst = self.gaps_per_floor.1 * (GAP_MAX_WIDTH + GAP_SEPARATION) + 2;
        if worst > self.world_width {
            return Err(ConfigError::GapsExceedFloor {
                gaps: self.gaps_per_floor.1,
                width: self.world_width,
            });
        }
        if self.enemy_allowlist.is_empty() {
            return Err(ConfigError::NoEnemies);
        }
        if self.collectible_allowlist.is_empty() {
            return Err(ConfigError::NoCollectibles);
        }
        Ok(())
    }
}
