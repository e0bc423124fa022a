//! Difficulty-weighted enemy allocator.
//!
//! Each floor gets an integer budget of difficulty points. The allocator
//! repeatedly makes a weighted random pick among the allowed kinds it can
//! still afford, finds the pick a legal tile, and spends the points. A
//! fixed attempt cap bounds the loop; unspent budget is reported back,
//! overdraw is impossible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EnemyBehavior, EnemyKind, EnemySpawn};
use crate::constants::{PATROL_MIN_RUN, SPAWN_ATTEMPTS_PER_POINT};
use crate::generation::DeterministicRng;

/// Everything the allocator needs to know about one floor's geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSpawnContext {
    pub floor: usize,
    pub world_width: usize,
    /// Maximal solid column runs as (start, len), left to right.
    pub solid_runs: Vec<(usize, usize)>,
    /// Columns already taken by ladders, doors, or collectibles.
    pub blocked_cols: Vec<usize>,
}

impl FloorSpawnContext {
    fn is_blocked(&self, col: usize, placed: &[EnemySpawn]) -> bool {
        self.blocked_cols.contains(&col) || placed.iter().any(|s| s.col == col)
    }
}

/// Result of allocating one floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnOutcome {
    pub spawns: Vec<EnemySpawn>,
    pub budget: u32,
    pub spent: u32,
}

impl SpawnOutcome {
    fn empty(budget: u32) -> Self {
        Self {
            spawns: Vec::new(),
            budget,
            spent: 0,
        }
    }

    /// Fraction of the budget actually spent, 0 when there was none.
    pub fn utilization(&self) -> f32 {
        if self.budget == 0 {
            return 0.0;
        }
        self.spent as f32 / self.budget as f32
    }
}

/// Allocate enemies for one floor under its difficulty budget.
pub fn spawn_floor_enemies(
    budget: u32,
    allowlist: &[EnemyKind],
    ctx: &FloorSpawnContext,
    rng: &mut DeterministicRng,
) -> SpawnOutcome {
    // Ground floor is a safe start
    if ctx.floor == 0 || budget == 0 || allowlist.is_empty() {
        return SpawnOutcome::empty(budget);
    }

    let mut spawns: Vec<EnemySpawn> = Vec::new();
    let mut remaining = budget;
    let attempt_cap = budget as usize * SPAWN_ATTEMPTS_PER_POINT;
    let mut attempts = 0;

    while remaining > 0 && attempts < attempt_cap {
        attempts += 1;

        let Some(kind) = roll_affordable_kind(allowlist, remaining, rng) else {
            // Nothing left the budget can pay for
            break;
        };
        let def = kind.definition();

        let Some((col, patrol)) = find_position(&def.behavior, ctx, &spawns, rng) else {
            continue;
        };

        remaining -= def.difficulty_cost;
        spawns.push(EnemySpawn {
            kind,
            floor: ctx.floor,
            col,
            patrol,
        });
    }

    let outcome = SpawnOutcome {
        budget,
        spent: budget - remaining,
        spawns,
    };
    debug!(
        floor = ctx.floor,
        budget,
        spent = outcome.spent,
        count = outcome.spawns.len(),
        "enemy allocation done"
    );
    outcome
}

/// Weighted random pick among allowed kinds that still fit the budget.
/// Returns None when no kind is affordable.
fn roll_affordable_kind(
    allowlist: &[EnemyKind],
    remaining: u32,
    rng: &mut DeterministicRng,
) -> Option<EnemyKind> {
    let candidates: Vec<(EnemyKind, u32)> = allowlist
        .iter()
        .map(|k| (*k, k.definition()))
        .filter(|(_, d)| d.difficulty_cost <= remaining)
        .map(|(k, d)| (k, d.spawn_weight))
        .collect();

    let total: u32 = candidates.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.next_range(0, total as usize) as u32;
    for (kind, weight) in &candidates {
        if roll < *weight {
            return Some(*kind);
        }
        roll -= weight;
    }
    // Unreachable with a correct total; defer to the last candidate
    candidates.last().map(|(k, _)| *k)
}

/// Find a legal tile for one pick. Walkers need a solid run of at least
/// PATROL_MIN_RUN; everything stands on solid ground.
fn find_position(
    behavior: &EnemyBehavior,
    ctx: &FloorSpawnContext,
    placed: &[EnemySpawn],
    rng: &mut DeterministicRng,
) -> Option<(usize, Option<(usize, usize)>)> {
    let needs_run = matches!(
        behavior,
        EnemyBehavior::PatrolFloor | EnemyBehavior::ChasePlayer
    );

    let eligible: Vec<(usize, usize)> = ctx
        .solid_runs
        .iter()
        .copied()
        .filter(|(_, len)| !needs_run || *len >= PATROL_MIN_RUN)
        .collect();
    if eligible.is_empty() {
        return None;
    }

    let (start, len) = eligible[rng.next_range(0, eligible.len())];
    let col = rng.next_range(start, start + len);
    if ctx.is_blocked(col, placed) {
        return None;
    }

    let patrol = match behavior {
        EnemyBehavior::PatrolFloor => Some((start, start + len - 1)),
        _ => None,
    };
    Some((col, patrol))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_floor(floor: usize, width: usize) -> FloorSpawnContext {
        FloorSpawnContext {
            floor,
            world_width: width,
            solid_runs: vec![(0, width)],
            blocked_cols: Vec::new(),
        }
    }

    #[test]
    fn test_never_overdraws_budget() {
        let ctx = open_floor(2, 24);
        for seed in 0..200u64 {
            let mut rng = DeterministicRng::new(seed);
            let outcome = spawn_floor_enemies(6, EnemyKind::all(), &ctx, &mut rng);
            let spent: u32 = outcome
                .spawns
                .iter()
                .map(|s| s.kind.definition().difficulty_cost)
                .sum();
            assert!(spent <= 6, "Overdraw at seed {seed}: spent {spent}");
            assert_eq!(spent, outcome.spent);
        }
    }

    #[test]
    fn test_ground_floor_spawns_nothing() {
        let ctx = open_floor(0, 24);
        let mut rng = DeterministicRng::new(42);
        let outcome = spawn_floor_enemies(10, EnemyKind::all(), &ctx, &mut rng);
        assert!(outcome.spawns.is_empty());
        assert_eq!(outcome.spent, 0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let ctx = open_floor(3, 20);
        let mut a = DeterministicRng::new(999);
        let mut b = DeterministicRng::new(999);
        let out_a = spawn_floor_enemies(8, EnemyKind::all(), &ctx, &mut a);
        let out_b = spawn_floor_enemies(8, EnemyKind::all(), &ctx, &mut b);
        assert_eq!(out_a.spawns, out_b.spawns);
    }

    #[test]
    fn test_respects_allowlist() {
        let ctx = open_floor(2, 24);
        let allow = [EnemyKind::Crawler];
        for seed in 0..50u64 {
            let mut rng = DeterministicRng::new(seed);
            let outcome = spawn_floor_enemies(5, &allow, &ctx, &mut rng);
            assert!(
                outcome.spawns.iter().all(|s| s.kind == EnemyKind::Crawler),
                "Disallowed kind spawned at seed {seed}"
            );
        }
    }

    #[test]
    fn test_nothing_affordable_stops_early() {
        let ctx = open_floor(2, 24);
        // Brute costs 4; a budget of 3 can never afford it
        let allow = [EnemyKind::Brute];
        let mut rng = DeterministicRng::new(7);
        let outcome = spawn_floor_enemies(3, &allow, &ctx, &mut rng);
        assert!(outcome.spawns.is_empty());
        assert_eq!(outcome.spent, 0);
    }

    #[test]
    fn test_patrollers_get_their_run() {
        let ctx = FloorSpawnContext {
            floor: 2,
            world_width: 20,
            solid_runs: vec![(0, 8), (12, 8)],
            blocked_cols: Vec::new(),
        };
        let allow = [EnemyKind::Crawler];
        let mut rng = DeterministicRng::new(11);
        let outcome = spawn_floor_enemies(6, &allow, &ctx, &mut rng);
        for spawn in &outcome.spawns {
            let (lo, hi) = spawn.patrol.expect("Crawler must have a patrol range");
            assert!(lo <= spawn.col && spawn.col <= hi);
            assert!(hi - lo + 1 >= PATROL_MIN_RUN);
        }
    }

    #[test]
    fn test_short_runs_exclude_walkers() {
        // Runs of 2 are below PATROL_MIN_RUN: walkers cannot place
        let ctx = FloorSpawnContext {
            floor: 1,
            world_width: 12,
            solid_runs: vec![(0, 2), (5, 2), (10, 2)],
            blocked_cols: Vec::new(),
        };
        let allow = [EnemyKind::Crawler, EnemyKind::Chaser];
        let mut rng = DeterministicRng::new(5);
        let outcome = spawn_floor_enemies(8, &allow, &ctx, &mut rng);
        assert!(outcome.spawns.is_empty());
    }

    #[test]
    fn test_blocked_cols_stay_clear() {
        let blocked = vec![3, 4, 5];
        let ctx = FloorSpawnContext {
            floor: 2,
            world_width: 10,
            solid_runs: vec![(0, 10)],
            blocked_cols: blocked.clone(),
        };
        for seed in 0..100u64 {
            let mut rng = DeterministicRng::new(seed);
            let outcome = spawn_floor_enemies(10, EnemyKind::all(), &ctx, &mut rng);
            for spawn in &outcome.spawns {
                assert!(!blocked.contains(&spawn.col), "Spawned on blocked col");
            }
        }
    }

    #[test]
    fn test_no_stacked_spawns() {
        let ctx = open_floor(2, 14);
        let mut rng = DeterministicRng::new(123);
        let outcome = spawn_floor_enemies(12, EnemyKind::all(), &ctx, &mut rng);
        let mut cols: Vec<usize> = outcome.spawns.iter().map(|s| s.col).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), outcome.spawns.len(), "Two enemies share a tile");
    }

    #[test]
    fn test_utilization_bounds() {
        let ctx = open_floor(4, 30);
        let mut rng = DeterministicRng::new(77);
        let outcome = spawn_floor_enemies(9, EnemyKind::all(), &ctx, &mut rng);
        let u = outcome.utilization();
        assert!((0.0..=1.0).contains(&u));
        assert_eq!(SpawnOutcome::empty(0).utilization(), 0.0);
    }
}
