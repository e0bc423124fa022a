//! Level layout solver.
//!
//! Turns a level config + level spec into a concrete layout: floors with
//! carved gaps, ladders connecting every floor pair, entry and exit
//! doors, collectibles, and enemy placements. Placement is random with
//! bounded local retry; ladder reachability is guaranteed by a
//! deterministic repair step rather than left to luck.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeterministicRng, LevelSpec};
use crate::collectible::{self, CollectibleSpawn};
use crate::config::LevelConfig;
use crate::constants::{
    DOOR_LADDER_CLEARANCE, GAP_MAX_WIDTH, GAP_MIN_WIDTH, GAP_SEPARATION, LADDER_SEPARATION,
    PATROL_MIN_RUN, PLACEMENT_ATTEMPTS_PER_ITEM, SPAWN_HASH_PRIME,
};
use crate::enemy::spawner::{spawn_floor_enemies, FloorSpawnContext};
use crate::enemy::{EnemyBehavior, EnemySpawn};

/// What occupies a tile, for renderer-facing queries.
/// Doors and ladders win over the platform they stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Air,
    Platform,
    Ladder,
    EntryDoor,
    ExitDoor,
    Collectible,
}

/// A missing span of platform tiles on a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSpan {
    pub start: usize,
    pub width: usize,
}

impl GapSpan {
    /// One past the last missing column.
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    pub fn contains(&self, col: usize) -> bool {
        (self.start..self.end()).contains(&col)
    }
}

/// One horizontal platform row in the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorLayout {
    pub index: usize,
    pub gaps: Vec<GapSpan>,
    /// Columns of ladders rising from this floor to the next one up.
    pub ladder_cols: Vec<usize>,
    pub door_col: Option<usize>,
}

impl FloorLayout {
    fn new(index: usize) -> Self {
        Self {
            index,
            gaps: Vec::new(),
            ladder_cols: Vec::new(),
            door_col: None,
        }
    }

    /// Is this column a platform tile (not carved out)?
    pub fn is_solid(&self, col: usize) -> bool {
        !self.gaps.iter().any(|g| g.contains(col))
    }

    /// Maximal runs of solid columns as (start, len), left to right.
    pub fn solid_runs(&self, width: usize) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut run_start = None;
        for col in 0..width {
            match (self.is_solid(col), run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    runs.push((start, col - start));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push((start, width - start));
        }
        runs
    }
}

/// Complete generated level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: u32,
    pub world_width: usize,
    pub floors: Vec<FloorLayout>,
    /// Entry door column on the ground floor (player spawn).
    pub entry_col: usize,
    /// Exit door column on the top floor.
    pub exit_col: usize,
    pub collectibles: Vec<CollectibleSpawn>,
    pub enemies: Vec<EnemySpawn>,
}

impl LevelLayout {
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn is_solid(&self, floor: usize, col: usize) -> bool {
        floor < self.floors.len() && col < self.world_width && self.floors[floor].is_solid(col)
    }

    /// Is there a ladder occupying this column on this floor, either
    /// rising from it or arriving onto it from below?
    pub fn has_ladder_at(&self, floor: usize, col: usize) -> bool {
        let rising = self
            .floors
            .get(floor)
            .is_some_and(|f| f.ladder_cols.contains(&col));
        let arriving = floor > 0
            && self
                .floors
                .get(floor - 1)
                .is_some_and(|f| f.ladder_cols.contains(&col));
        rising || arriving
    }

    /// Renderer-facing tile query. Out-of-bounds is Air.
    pub fn tile_at(&self, floor: usize, col: usize) -> TileKind {
        if floor >= self.floors.len() || col >= self.world_width {
            return TileKind::Air;
        }
        if self.floors[floor].door_col == Some(col) {
            return if floor == 0 {
                TileKind::EntryDoor
            } else {
                TileKind::ExitDoor
            };
        }
        if self.has_ladder_at(floor, col) {
            return TileKind::Ladder;
        }
        if self
            .collectibles
            .iter()
            .any(|c| c.floor == floor && c.col == col)
        {
            return TileKind::Collectible;
        }
        if self.floors[floor].is_solid(col) {
            TileKind::Platform
        } else {
            TileKind::Air
        }
    }

    /// Rasterized view, one row per floor, ground floor first.
    pub fn tile_grid(&self) -> Vec<Vec<TileKind>> {
        (0..self.floors.len())
            .map(|f| (0..self.world_width).map(|c| self.tile_at(f, c)).collect())
            .collect()
    }
}

/// A broken layout invariant, as reported by [`validate_layout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutViolation {
    GapOutOfBounds { floor: usize, start: usize, width: usize },
    GapsTooClose { floor: usize },
    GroundFloorGap,
    LadderInGap { floor: usize, col: usize },
    LaddersTooClose { floor: usize },
    FloorUnreachable { floor: usize },
    DoorMissing { floor: usize },
    DoorOnGap { floor: usize, col: usize },
    CollectibleMisplaced { floor: usize, col: usize },
    CollectiblesStacked { floor: usize, col: usize },
    DisallowedCollectibleKind { floor: usize, col: usize },
    EnemyMisplaced { floor: usize, col: usize },
    EnemyOnGroundFloor { col: usize },
    DisallowedEnemyKind { floor: usize, col: usize },
    PatrolInvalid { floor: usize, col: usize },
    BudgetOverdrawn { floor: usize, spent: u32, budget: u32 },
}

/// Generate a complete level layout from its config and spec.
/// Pure and deterministic: same config + spec hash, same layout.
pub fn generate_level(config: &LevelConfig, spec: &LevelSpec) -> LevelLayout {
    let mut rng = DeterministicRng::new(spec.hash);
    let width = config.world_width;
    let floor_count = config.floor_count;

    let mut floors: Vec<FloorLayout> = (0..floor_count).map(FloorLayout::new).collect();

    // Phase 1: carve gaps. The ground floor stays solid.
    for floor in floors.iter_mut().skip(1) {
        let count = rng.next_range(config.gaps_per_floor.0, config.gaps_per_floor.1 + 1);
        carve_gaps(floor, width, count, &mut rng);
    }

    // Phase 2: ladders between each consecutive floor pair.
    for lower in 0..floor_count - 1 {
        let count = rng.next_range(config.ladders_per_floor.0, config.ladders_per_floor.1 + 1);
        place_ladders(&mut floors, lower, width, count, &mut rng);
    }

    // Phase 3: doors. Entry on the ground floor, exit on the top floor.
    let entry_col = place_entry_door(&mut floors, width, &mut rng);
    let exit_col = place_exit_door(&mut floors, width, &mut rng);

    // Phase 4: collectibles on solid standing tiles.
    let collectibles = place_collectibles(&floors, config, &mut rng);

    // Phase 5: enemies, one budgeted allocation per floor.
    let enemies = allocate_enemies(&floors, config, spec, &collectibles);

    debug!(
        level = spec.level,
        floors = floor_count,
        width,
        collectibles = collectibles.len(),
        enemies = enemies.len(),
        "level layout generated"
    );

    LevelLayout {
        level: spec.level,
        world_width: width,
        floors,
        entry_col,
        exit_col,
        collectibles,
        enemies,
    }
}

fn carve_gaps(floor: &mut FloorLayout, width: usize, count: usize, rng: &mut DeterministicRng) {
    let mut attempts = 0;
    while floor.gaps.len() < count && attempts < count * PLACEMENT_ATTEMPTS_PER_ITEM {
        attempts += 1;

        let gap_width = rng.next_range(GAP_MIN_WIDTH, GAP_MAX_WIDTH + 1);
        // Edge columns stay solid: start in [1, width - 1 - gap_width]
        let start = rng.next_range(1, width - gap_width);
        let candidate = GapSpan {
            start,
            width: gap_width,
        };

        let conflicts = floor.gaps.iter().any(|g| gaps_conflict(g, &candidate));
        if !conflicts {
            floor.gaps.push(candidate);
        }
    }
    floor.gaps.sort_by_key(|g| g.start);
}

/// Two gaps conflict when they overlap or leave fewer than
/// GAP_SEPARATION solid tiles between them.
fn gaps_conflict(a: &GapSpan, b: &GapSpan) -> bool {
    a.start < b.end() + GAP_SEPARATION && b.start < a.end() + GAP_SEPARATION
}

fn place_ladders(
    floors: &mut [FloorLayout],
    lower: usize,
    width: usize,
    count: usize,
    rng: &mut DeterministicRng,
) {
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * PLACEMENT_ATTEMPTS_PER_ITEM {
        attempts += 1;

        let col = rng.next_range(1, width - 1);
        if ladder_col_valid(floors, lower, col) {
            floors[lower].ladder_cols.push(col);
            placed += 1;
        }
    }

    // Reachability is a guarantee, not a probability: if every roll
    // failed, repair deterministically.
    if placed == 0 {
        repair_ladder(floors, lower, width);
    }
    floors[lower].ladder_cols.sort_unstable();
}

fn ladder_col_valid(floors: &[FloorLayout], lower: usize, col: usize) -> bool {
    floors[lower].is_solid(col)
        && floors[lower + 1].is_solid(col)
        && floors[lower]
            .ladder_cols
            .iter()
            .all(|&c| c.abs_diff(col) >= LADDER_SEPARATION)
}

/// Deterministic fallback: scan for a shared solid column; if none
/// exists, free one on the floor above by shrinking the blocking gap.
fn repair_ladder(floors: &mut [FloorLayout], lower: usize, width: usize) {
    for col in 1..width - 1 {
        if floors[lower].is_solid(col) && floors[lower + 1].is_solid(col) {
            floors[lower].ladder_cols.push(col);
            return;
        }
    }
    for col in 1..width - 1 {
        if floors[lower].is_solid(col) {
            free_column(&mut floors[lower + 1], col);
            floors[lower].ladder_cols.push(col);
            debug!(floor = lower + 1, col, "shrunk gap to restore reachability");
            return;
        }
    }
    // Unreachable: gap bounds keep interior solid columns on every floor
}

/// Remove `col` from the gap that covers it, keeping at most one legal
/// remainder piece so gap invariants survive the repair.
fn free_column(floor: &mut FloorLayout, col: usize) {
    let Some(idx) = floor.gaps.iter().position(|g| g.contains(col)) else {
        return;
    };
    let gap = floor.gaps.remove(idx);
    let left_width = col - gap.start;
    let right_width = gap.end() - col - 1;
    if left_width >= GAP_MIN_WIDTH {
        floor.gaps.push(GapSpan {
            start: gap.start,
            width: left_width,
        });
    } else if right_width >= GAP_MIN_WIDTH {
        floor.gaps.push(GapSpan {
            start: col + 1,
            width: right_width,
        });
    }
    floor.gaps.sort_by_key(|g| g.start);
}

fn place_entry_door(floors: &mut [FloorLayout], width: usize, rng: &mut DeterministicRng) -> usize {
    // Ground floor is fully solid; just keep off the ladder bases.
    let ladder_cols = floors[0].ladder_cols.clone();
    let mut attempts = 0;
    while attempts < PLACEMENT_ATTEMPTS_PER_ITEM {
        attempts += 1;
        let col = rng.next_range(1, width - 1);
        if !ladder_cols.contains(&col) {
            floors[0].door_col = Some(col);
            return col;
        }
    }
    let col = (1..width - 1)
        .find(|c| !ladder_cols.contains(c))
        .unwrap_or(1);
    floors[0].door_col = Some(col);
    col
}

fn place_exit_door(floors: &mut [FloorLayout], width: usize, rng: &mut DeterministicRng) -> usize {
    let top = floors.len() - 1;
    // Ladder tops arriving on the top floor come from the floor below.
    let arriving: Vec<usize> = floors[top - 1].ladder_cols.clone();

    let clear_of_ladders =
        |col: usize| arriving.iter().all(|&c| c.abs_diff(col) >= DOOR_LADDER_CLEARANCE);

    let mut attempts = 0;
    while attempts < PLACEMENT_ATTEMPTS_PER_ITEM {
        attempts += 1;
        let col = rng.next_range(1, width - 1);
        if floors[top].is_solid(col) && clear_of_ladders(col) {
            floors[top].door_col = Some(col);
            return col;
        }
    }
    // Degrade clearance before degrading solidity; a solid column
    // always exists on the top floor.
    let col = (1..width - 1)
        .find(|&c| floors[top].is_solid(c) && !arriving.contains(&c))
        .or_else(|| (1..width - 1).find(|&c| floors[top].is_solid(c)))
        .unwrap_or(1);
    floors[top].door_col = Some(col);
    col
}

fn place_collectibles(
    floors: &[FloorLayout],
    config: &LevelConfig,
    rng: &mut DeterministicRng,
) -> Vec<CollectibleSpawn> {
    let width = config.world_width;
    let mut spawns = Vec::new();

    for floor in floors {
        let count = rng.next_range(
            config.collectibles_per_floor.0,
            config.collectibles_per_floor.1 + 1,
        );
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < count * PLACEMENT_ATTEMPTS_PER_ITEM {
            attempts += 1;

            let col = rng.next_range(1, width - 1);
            let blocked = !floor.is_solid(col)
                || floor.ladder_cols.contains(&col)
                || (floor.index > 0 && floors[floor.index - 1].ladder_cols.contains(&col))
                || floor.door_col == Some(col)
                || spawns
                    .iter()
                    .any(|s: &CollectibleSpawn| s.floor == floor.index && s.col == col);
            if blocked {
                continue;
            }

            let Some(kind) = collectible::roll_kind(&config.collectible_allowlist, rng) else {
                return spawns;
            };
            spawns.push(CollectibleSpawn {
                kind,
                floor: floor.index,
                col,
            });
            placed += 1;
        }
    }
    spawns
}

fn allocate_enemies(
    floors: &[FloorLayout],
    config: &LevelConfig,
    spec: &LevelSpec,
    collectibles: &[CollectibleSpawn],
) -> Vec<EnemySpawn> {
    let width = config.world_width;
    let mut enemies = Vec::new();

    for floor in floors.iter().skip(1) {
        let mut blocked_cols: Vec<usize> = floor.ladder_cols.clone();
        blocked_cols.extend(&floors[floor.index - 1].ladder_cols);
        if let Some(door) = floor.door_col {
            blocked_cols.push(door);
        }
        blocked_cols.extend(
            collectibles
                .iter()
                .filter(|c| c.floor == floor.index)
                .map(|c| c.col),
        );

        let ctx = FloorSpawnContext {
            floor: floor.index,
            world_width: width,
            solid_runs: floor.solid_runs(width),
            blocked_cols,
        };
        let mut floor_rng = DeterministicRng::new(
            spec.hash ^ (floor.index as u64).wrapping_mul(SPAWN_HASH_PRIME),
        );
        let outcome = spawn_floor_enemies(
            config.floor_budget(floor.index),
            &config.enemy_allowlist,
            &ctx,
            &mut floor_rng,
        );
        enemies.extend(outcome.spawns);
    }
    enemies
}

/// Check every layout invariant. An empty result means the layout is
/// sound; the audit sweep and the test suites run this wholesale.
pub fn validate_layout(layout: &LevelLayout, config: &LevelConfig) -> Vec<LayoutViolation> {
    let mut violations = Vec::new();
    let width = layout.world_width;

    if layout.floors.is_empty() {
        violations.push(LayoutViolation::DoorMissing { floor: 0 });
        return violations;
    }

    // Gaps: in bounds, legal width, ground floor untouched, separated.
    for floor in &layout.floors {
        if floor.index == 0 && !floor.gaps.is_empty() {
            violations.push(LayoutViolation::GroundFloorGap);
        }
        for gap in &floor.gaps {
            let in_bounds = gap.start >= 1
                && gap.end() <= width - 1
                && (GAP_MIN_WIDTH..=GAP_MAX_WIDTH).contains(&gap.width);
            if !in_bounds {
                violations.push(LayoutViolation::GapOutOfBounds {
                    floor: floor.index,
                    start: gap.start,
                    width: gap.width,
                });
            }
        }
        for (i, a) in floor.gaps.iter().enumerate() {
            for b in floor.gaps.iter().skip(i + 1) {
                if gaps_conflict(a, b) {
                    violations.push(LayoutViolation::GapsTooClose { floor: floor.index });
                }
            }
        }
    }

    // Ladders: solid on both floors, separated, one per pair minimum.
    for lower in 0..layout.floors.len().saturating_sub(1) {
        let floor = &layout.floors[lower];
        if floor.ladder_cols.is_empty() {
            violations.push(LayoutViolation::FloorUnreachable { floor: lower + 1 });
        }
        for &col in &floor.ladder_cols {
            if !layout.is_solid(lower, col) || !layout.is_solid(lower + 1, col) {
                violations.push(LayoutViolation::LadderInGap { floor: lower, col });
            }
        }
        for (i, &a) in floor.ladder_cols.iter().enumerate() {
            for &b in floor.ladder_cols.iter().skip(i + 1) {
                if a.abs_diff(b) < LADDER_SEPARATION {
                    violations.push(LayoutViolation::LaddersTooClose { floor: lower });
                }
            }
        }
    }

    // Doors: present on ground and top floors, standing on solid tiles.
    let top = layout.floors.len() - 1;
    for floor_index in [0, top] {
        match layout.floors[floor_index].door_col {
            None => violations.push(LayoutViolation::DoorMissing { floor: floor_index }),
            Some(col) => {
                if !layout.is_solid(floor_index, col) {
                    violations.push(LayoutViolation::DoorOnGap {
                        floor: floor_index,
                        col,
                    });
                }
            }
        }
    }

    // Collectibles: solid footing, no sharing with ladders/doors/each other.
    for (i, c) in layout.collectibles.iter().enumerate() {
        let misplaced = !layout.is_solid(c.floor, c.col)
            || layout.has_ladder_at(c.floor, c.col)
            || layout.floors.get(c.floor).and_then(|f| f.door_col) == Some(c.col);
        if misplaced {
            violations.push(LayoutViolation::CollectibleMisplaced {
                floor: c.floor,
                col: c.col,
            });
        }
        if layout
            .collectibles
            .iter()
            .skip(i + 1)
            .any(|o| o.floor == c.floor && o.col == c.col)
        {
            violations.push(LayoutViolation::CollectiblesStacked {
                floor: c.floor,
                col: c.col,
            });
        }
        if !config.collectible_allowlist.contains(&c.kind) {
            violations.push(LayoutViolation::DisallowedCollectibleKind {
                floor: c.floor,
                col: c.col,
            });
        }
    }

    // Enemies: off the ground floor, on solid tiles, allowed kinds,
    // valid patrols, budget never overdrawn.
    for e in &layout.enemies {
        if e.floor == 0 {
            violations.push(LayoutViolation::EnemyOnGroundFloor { col: e.col });
            continue;
        }
        let misplaced = !layout.is_solid(e.floor, e.col)
            || layout.has_ladder_at(e.floor, e.col)
            || layout.floors.get(e.floor).and_then(|f| f.door_col) == Some(e.col);
        if misplaced {
            violations.push(LayoutViolation::EnemyMisplaced {
                floor: e.floor,
                col: e.col,
            });
        }
        if !config.enemy_allowlist.contains(&e.kind) {
            violations.push(LayoutViolation::DisallowedEnemyKind {
                floor: e.floor,
                col: e.col,
            });
        }
        let def = e.kind.definition();
        if def.behavior == EnemyBehavior::PatrolFloor {
            let valid = e.patrol.is_some_and(|(lo, hi)| {
                lo <= e.col
                    && e.col <= hi
                    && hi < layout.world_width
                    && hi - lo + 1 >= PATROL_MIN_RUN
                    && (lo..=hi).all(|col| layout.is_solid(e.floor, col))
            });
            if !valid {
                violations.push(LayoutViolation::PatrolInvalid {
                    floor: e.floor,
                    col: e.col,
                });
            }
        }
    }
    for floor_index in 1..layout.floors.len() {
        let spent: u32 = layout
            .enemies
            .iter()
            .filter(|e| e.floor == floor_index)
            .map(|e| e.kind.definition().difficulty_cost)
            .sum();
        let budget = config.floor_budget(floor_index);
        if spent > budget {
            violations.push(LayoutViolation::BudgetOverdrawn {
                floor: floor_index,
                spent,
                budget,
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RunSeed;

    fn layout_for(seed: u64, level: u32) -> (LevelLayout, LevelConfig) {
        let config = LevelConfig::for_level(level);
        let spec = LevelSpec::generate(&RunSeed { seed }, level);
        (generate_level(&config, &spec), config)
    }

    #[test]
    fn test_generate_level_deterministic() {
        let (a, _) = layout_for(42, 1);
        let (b, _) = layout_for(42, 1);
        assert_eq!(a, b, "Same seed must produce same layout");
    }

    #[test]
    fn test_different_levels_different_layouts() {
        let config = LevelConfig::for_level(2);
        let seed = RunSeed { seed: 42 };
        let a = generate_level(&config, &LevelSpec::generate(&seed, 2));
        let b = generate_level(&config, &LevelSpec::generate(&seed, 3));
        assert_ne!(a.floors, b.floors, "Different levels should differ");
    }

    #[test]
    fn test_layouts_validate_clean_across_seeds() {
        for seed in 0..50u64 {
            for level in [1, 3, 6, 10, 25] {
                let (layout, config) = layout_for(seed, level);
                let violations = validate_layout(&layout, &config);
                assert!(
                    violations.is_empty(),
                    "seed {seed} level {level}: {violations:?}"
                );
            }
        }
    }

    #[test]
    fn test_ground_floor_is_solid() {
        let (layout, _) = layout_for(7, 4);
        for col in 0..layout.world_width {
            assert!(layout.is_solid(0, col));
        }
    }

    #[test]
    fn test_every_floor_reachable() {
        for seed in 0..30u64 {
            let (layout, _) = layout_for(seed, 8);
            for lower in 0..layout.floor_count() - 1 {
                assert!(
                    !layout.floors[lower].ladder_cols.is_empty(),
                    "seed {seed}: no ladder from floor {lower}"
                );
            }
        }
    }

    #[test]
    fn test_ladders_never_in_gaps() {
        for seed in 0..30u64 {
            let (layout, _) = layout_for(seed, 10);
            for lower in 0..layout.floor_count() - 1 {
                for &col in &layout.floors[lower].ladder_cols {
                    assert!(layout.is_solid(lower, col), "ladder base in gap");
                    assert!(layout.is_solid(lower + 1, col), "ladder top in gap");
                }
            }
        }
    }

    #[test]
    fn test_doors_present_and_solid() {
        let (layout, _) = layout_for(99, 5);
        assert_eq!(layout.tile_at(0, layout.entry_col), TileKind::EntryDoor);
        let top = layout.floor_count() - 1;
        assert_eq!(layout.tile_at(top, layout.exit_col), TileKind::ExitDoor);
        assert!(layout.is_solid(top, layout.exit_col));
    }

    #[test]
    fn test_gap_never_exceeds_floor_width() {
        for seed in 0..50u64 {
            let (layout, _) = layout_for(seed, 12);
            for floor in &layout.floors {
                for gap in &floor.gaps {
                    assert!(gap.start >= 1);
                    assert!(gap.end() <= layout.world_width - 1);
                }
            }
        }
    }

    #[test]
    fn test_repair_frees_blocked_column() {
        let mut floor = FloorLayout::new(2);
        floor.gaps.push(GapSpan { start: 3, width: 4 });
        free_column(&mut floor, 5);
        assert!(floor.is_solid(5));
        // Left piece [3,4] survives as a legal gap
        assert_eq!(floor.gaps, vec![GapSpan { start: 3, width: 2 }]);
    }

    #[test]
    fn test_repair_drops_undersized_remainder() {
        let mut floor = FloorLayout::new(1);
        floor.gaps.push(GapSpan { start: 3, width: 2 });
        free_column(&mut floor, 3);
        // Remainder of width 1 is below GAP_MIN_WIDTH: dropped entirely
        assert!(floor.gaps.is_empty());
        assert!(floor.is_solid(3) && floor.is_solid(4));
    }

    #[test]
    fn test_repair_ladder_shrinks_aligned_gaps() {
        // Both floors gapped across the same span; no shared solid
        // interior column exists until the repair shrinks the upper gap.
        let width = 12;
        let mut floors = vec![FloorLayout::new(0), FloorLayout::new(1)];
        floors[0].gaps.push(GapSpan { start: 1, width: 4 });
        floors[0].gaps.push(GapSpan { start: 7, width: 4 });
        floors[1].gaps.push(GapSpan { start: 5, width: 2 });
        // Floor 0 solid: cols 0, 5, 6, 11. Floor 1 gapped at 5, 6.
        // Interior shared solid: none.
        repair_ladder(&mut floors, 0, width);
        assert_eq!(floors[0].ladder_cols.len(), 1);
        let col = floors[0].ladder_cols[0];
        assert!(floors[0].is_solid(col));
        assert!(floors[1].is_solid(col), "repair must free the column above");
    }

    #[test]
    fn test_solid_runs() {
        let mut floor = FloorLayout::new(1);
        floor.gaps.push(GapSpan { start: 4, width: 3 });
        assert_eq!(floor.solid_runs(12), vec![(0, 4), (7, 5)]);
    }

    #[test]
    fn test_tile_grid_dimensions() {
        let (layout, config) = layout_for(5, 3);
        let grid = layout.tile_grid();
        assert_eq!(grid.len(), config.floor_count);
        assert!(grid.iter().all(|row| row.len() == config.world_width));
    }

    #[test]
    fn test_tile_at_out_of_bounds_is_air() {
        let (layout, _) = layout_for(5, 1);
        assert_eq!(layout.tile_at(999, 0), TileKind::Air);
        assert_eq!(layout.tile_at(0, 999), TileKind::Air);
    }

    #[test]
    fn test_enemies_only_above_ground() {
        for seed in 0..30u64 {
            let (layout, _) = layout_for(seed, 9);
            assert!(layout.enemies.iter().all(|e| e.floor > 0));
        }
    }

    #[test]
    fn test_validate_catches_ground_floor_gap() {
        let (mut layout, config) = layout_for(1, 2);
        layout.floors[0].gaps.push(GapSpan { start: 3, width: 2 });
        let violations = validate_layout(&layout, &config);
        assert!(violations.contains(&LayoutViolation::GroundFloorGap));
    }

    #[test]
    fn test_validate_catches_ladder_in_gap() {
        let (mut layout, config) = layout_for(1, 2);
        let col = layout.floors[0].ladder_cols[0];
        // Carve the ladder top out of the floor above
        layout.floors[1].gaps.clear();
        layout.floors[1].gaps.push(GapSpan {
            start: col,
            width: GAP_MIN_WIDTH,
        });
        let violations = validate_layout(&layout, &config);
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::LadderInGap { .. })));
    }

    #[test]
    fn test_validate_catches_budget_overdraw() {
        let (mut layout, config) = layout_for(1, 1);
        // Stuff floor 1 far past its budget
        for col in 1..10 {
            layout.enemies.push(crate::enemy::EnemySpawn {
                kind: crate::enemy::EnemyKind::Spiker,
                floor: 1,
                col,
                patrol: None,
            });
        }
        let violations = validate_layout(&layout, &config);
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::BudgetOverdrawn { .. })));
    }

    #[test]
    fn test_layout_serialization_roundtrip() {
        let (layout, _) = layout_for(42, 6);
        let json = serde_json::to_string(&layout).unwrap();
        let restored: LevelLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, layout);
    }
}
