//! Monte-Carlo generation audit.
//!
//! Generates thousands of layouts across many run seeds, validates every
//! one, and aggregates difficulty statistics. Run before shipping a
//! tuning change to confirm the solver never emits a broken layout and
//! the difficulty curve stays where it should. Uses rayon for parallel
//! execution across CPU cores.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::config::LevelConfig;
use crate::enemy::EnemyKind;
use crate::generation::layout::{generate_level, validate_layout};
use crate::generation::{LevelSpec, RunSeed};

/// Configuration for an audit sweep
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Distinct run seeds to derive from the base seed.
    pub seed_count: u64,
    /// Levels generated per run seed (1..=n).
    pub levels_per_seed: u32,
    pub base_seed: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            seed_count: 100,
            levels_per_seed: 10,
            base_seed: 42,
        }
    }
}

/// Per-layout measurements fed into the aggregate
#[derive(Debug, Clone)]
struct LayoutSample {
    violations: usize,
    floors: usize,
    gaps: usize,
    budget: u32,
    spent: u32,
    /// Enemy counts, indexed like `EnemyKind::all()`.
    enemy_counts: Vec<u64>,
}

/// Overall difficulty assessment from mean budget utilization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyGrade {
    Lenient,  // utilization < 0.5 — floors run emptier than budgeted
    Balanced, // 0.5..0.85
    Harsh,    // >= 0.85 — allocator spends nearly everything
}

impl DifficultyGrade {
    fn from_utilization(utilization: f32) -> Self {
        if utilization < 0.5 {
            Self::Lenient
        } else if utilization < 0.85 {
            Self::Balanced
        } else {
            Self::Harsh
        }
    }
}

/// Results of an audit sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub total_layouts: u64,
    /// Broken invariants across the whole sweep — anything above zero is
    /// a solver bug.
    pub violation_count: u64,
    pub mean_gaps_per_floor: f32,
    pub mean_budget_utilization: f32,
    pub mean_enemies_per_level: f32,
    /// Fraction of all spawned enemies per kind.
    pub enemy_share: Vec<(String, f32)>,
    pub grade: DifficultyGrade,
}

/// Run a generation audit with rayon parallelism
pub fn run_generation_audit(config: &AuditConfig) -> AuditReport {
    // Derive run seeds deterministically, one hash per index
    let seeds: Vec<u64> = (0..config.seed_count)
        .map(|i| {
            let mut hasher = Sha3_256::new();
            hasher.update(config.base_seed.to_le_bytes());
            hasher.update(i.to_le_bytes());
            let result = hasher.finalize();
            u64::from_le_bytes(result[0..8].try_into().unwrap())
        })
        .collect();

    let levels = config.levels_per_seed.max(1);
    let samples: Vec<LayoutSample> = seeds
        .par_iter()
        .flat_map_iter(|&seed| {
            let run_seed = RunSeed { seed };
            (1..=levels).map(move |level| sample_layout(&run_seed, level))
        })
        .collect();

    aggregate(&samples)
}

fn sample_layout(run_seed: &RunSeed, level: u32) -> LayoutSample {
    let config = LevelConfig::for_level(level);
    let spec = LevelSpec::generate(run_seed, level);
    let layout = generate_level(&config, &spec);
    let violations = validate_layout(&layout, &config).len();

    let budget: u32 = (1..layout.floor_count())
        .map(|f| config.floor_budget(f))
        .sum();
    let spent: u32 = layout
        .enemies
        .iter()
        .map(|e| e.kind.definition().difficulty_cost)
        .sum();

    let mut enemy_counts = vec![0u64; EnemyKind::all().len()];
    for enemy in &layout.enemies {
        let idx = EnemyKind::all()
            .iter()
            .position(|k| *k == enemy.kind)
            .unwrap_or(0);
        enemy_counts[idx] += 1;
    }

    LayoutSample {
        violations,
        floors: layout.floor_count(),
        gaps: layout.floors.iter().map(|f| f.gaps.len()).sum(),
        budget,
        spent,
        enemy_counts,
    }
}

fn aggregate(samples: &[LayoutSample]) -> AuditReport {
    if samples.is_empty() {
        return AuditReport {
            total_layouts: 0,
            violation_count: 0,
            mean_gaps_per_floor: 0.0,
            mean_budget_utilization: 0.0,
            mean_enemies_per_level: 0.0,
            enemy_share: vec![],
            grade: DifficultyGrade::Balanced,
        };
    }

    let total = samples.len() as u64;
    let violation_count: u64 = samples.iter().map(|s| s.violations as u64).sum();

    let total_floors: usize = samples.iter().map(|s| s.floors).sum();
    let total_gaps: usize = samples.iter().map(|s| s.gaps).sum();
    let mean_gaps_per_floor = total_gaps as f32 / total_floors.max(1) as f32;

    let total_budget: u64 = samples.iter().map(|s| s.budget as u64).sum();
    let total_spent: u64 = samples.iter().map(|s| s.spent as u64).sum();
    let mean_budget_utilization = total_spent as f32 / total_budget.max(1) as f32;

    let kind_count = EnemyKind::all().len();
    let mut kind_totals = vec![0u64; kind_count];
    for sample in samples {
        for (idx, count) in sample.enemy_counts.iter().enumerate() {
            kind_totals[idx] += count;
        }
    }
    let total_enemies: u64 = kind_totals.iter().sum();
    let enemy_share: Vec<(String, f32)> = EnemyKind::all()
        .iter()
        .zip(&kind_totals)
        .map(|(kind, count)| {
            (
                format!("{:?}", kind),
                *count as f32 / total_enemies.max(1) as f32,
            )
        })
        .collect();

    AuditReport {
        total_layouts: total,
        violation_count,
        mean_gaps_per_floor,
        mean_budget_utilization,
        mean_enemies_per_level: total_enemies as f32 / total as f32,
        enemy_share,
        grade: DifficultyGrade::from_utilization(mean_budget_utilization),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_small_sweep() {
        let config = AuditConfig {
            seed_count: 10,
            levels_per_seed: 5,
            base_seed: 42,
        };
        let report = run_generation_audit(&config);
        assert_eq!(report.total_layouts, 50);
        assert_eq!(
            report.violation_count, 0,
            "Solver emitted broken layouts: {report:?}"
        );
        assert!(report.mean_gaps_per_floor > 0.0);
        assert!(report.mean_enemies_per_level > 0.0);
    }

    #[test]
    fn test_audit_deterministic() {
        let config = AuditConfig {
            seed_count: 5,
            levels_per_seed: 3,
            ..Default::default()
        };
        let a = run_generation_audit(&config);
        let b = run_generation_audit(&config);
        assert_eq!(a.total_layouts, b.total_layouts);
        assert!((a.mean_budget_utilization - b.mean_budget_utilization).abs() < 1e-6);
        assert_eq!(a.enemy_share, b.enemy_share);
    }

    #[test]
    fn test_enemy_shares_sum_to_one() {
        let config = AuditConfig {
            seed_count: 20,
            levels_per_seed: 8,
            base_seed: 7,
        };
        let report = run_generation_audit(&config);
        let sum: f32 = report.enemy_share.iter().map(|(_, s)| s).sum();
        assert!((sum - 1.0).abs() < 0.01, "Shares sum to {sum}");
    }

    #[test]
    fn test_utilization_within_bounds() {
        let report = run_generation_audit(&AuditConfig {
            seed_count: 10,
            levels_per_seed: 6,
            base_seed: 99,
        });
        assert!(report.mean_budget_utilization >= 0.0);
        assert!(
            report.mean_budget_utilization <= 1.0,
            "Allocator overdrew somewhere: {}",
            report.mean_budget_utilization
        );
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(DifficultyGrade::from_utilization(0.2), DifficultyGrade::Lenient);
        assert_eq!(DifficultyGrade::from_utilization(0.6), DifficultyGrade::Balanced);
        assert_eq!(DifficultyGrade::from_utilization(0.9), DifficultyGrade::Harsh);
    }

    #[test]
    fn test_empty_sweep() {
        let report = run_generation_audit(&AuditConfig {
            seed_count: 0,
            levels_per_seed: 5,
            base_seed: 1,
        });
        assert_eq!(report.total_layouts, 0);
        assert_eq!(report.violation_count, 0);
    }

    #[test]
    fn test_report_serialization() {
        let report = run_generation_audit(&AuditConfig {
            seed_count: 2,
            levels_per_seed: 2,
            base_seed: 3,
        });
        let json = serde_json::to_string(&report).unwrap();
        let restored: AuditReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.total_layouts, 4);
    }
}
