//! Centralized tuning constants for the Skyshaft procedural core.
//!
//! Eliminates magic numbers duplicated across the layout solver and the
//! enemy allocator. Per-module tables (enemy definitions, collectible
//! values, level bands) remain in their respective modules as the single
//! source of truth.

// =====================================================
// Grid geometry
// =====================================================

/// Narrowest world the solver accepts. Wide enough that the worst-case
/// gap coverage on a floor still leaves shared solid columns below and
/// above every floor pair.
pub const MIN_WORLD_WIDTH: usize = 12;

/// Widest world any level config produces.
pub const MAX_WORLD_WIDTH: usize = 32;

/// Vertical tiles from one platform row to the next (air + platform).
pub const FLOOR_HEIGHT_TILES: usize = 4;

/// Most floors a single level can stack.
pub const MAX_FLOOR_COUNT: usize = 12;

// =====================================================
// Gap carving
// =====================================================

/// Narrowest crossable gap in platform tiles.
pub const GAP_MIN_WIDTH: usize = 2;

/// Widest jumpable gap in platform tiles.
pub const GAP_MAX_WIDTH: usize = 4;

/// Solid tiles required between two gaps on the same floor.
pub const GAP_SEPARATION: usize = 2;

// =====================================================
// Ladders and doors
// =====================================================

/// Minimum horizontal distance between two ladders on the same floor.
pub const LADDER_SEPARATION: usize = 3;

/// Minimum distance between the exit door and any ladder top column.
pub const DOOR_LADDER_CLEARANCE: usize = 2;

// =====================================================
// Placement retry
// =====================================================

/// Attempts per requested placement before the solver gives up on that
/// item (ladders instead fall through to the repair step).
pub const PLACEMENT_ATTEMPTS_PER_ITEM: usize = 20;

// =====================================================
// Enemy allocation
// =====================================================

/// Difficulty points granted to floor 1 of level 1.
pub const BASE_DIFFICULTY_BUDGET: u32 = 2;

/// Extra difficulty points per level number.
pub const BUDGET_PER_LEVEL: u32 = 1;

/// Extra difficulty points per floor climbed within a level.
pub const BUDGET_PER_FLOOR: u32 = 1;

/// Attempt multiplier for the weighted allocator: cap = budget * this.
pub const SPAWN_ATTEMPTS_PER_POINT: usize = 4;

/// Solid tiles a patrolling enemy needs to walk on.
pub const PATROL_MIN_RUN: usize = 3;

/// Prime hash stride mixing the floor index into the enemy-spawn RNG.
pub const SPAWN_HASH_PRIME: u64 = 7919;

// =====================================================
// World space
// =====================================================

/// World units per grid tile when spawning entities.
pub const TILE_WORLD_SIZE: f32 = 16.0;

// =====================================================
// Session
// =====================================================

/// Lives at the start of a run.
pub const STARTING_LIVES: u32 = 3;
