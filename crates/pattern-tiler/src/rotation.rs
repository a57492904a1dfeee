//! Rotation search.
//!
//! Tries every whole-degree rotation of the pattern and keeps the one that
//! needs the fewest tiles. Candidates are ranked: 0° first, then 90°, then
//! 1° through 359° in order. A later candidate only wins with strictly fewer
//! tiles, so the winner is the minimum of `(tiles, rank)`.
//!
//! Each angle is independent, so the parallel search evaluates them with
//! rayon and reduces afterwards. The reduction only looks at ranks, never at
//! completion order, so both searches return the same angle.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SheetConfig;
use crate::geometry::Path;
use crate::layout::plan_pages;

/// Sweep granularity [deg].
pub const ANGLE_STEP_DEGREES: usize = 1;

/// One evaluated rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationCandidate {
    pub angle_degrees: f64,
    pub tiles: usize,
}

/// Angles in preference order: 0, 90, then the full sweep.
pub fn candidate_angles() -> Vec<f64> {
    let mut angles = vec![0.0, 90.0];
    angles.extend((ANGLE_STEP_DEGREES..360).step_by(ANGLE_STEP_DEGREES).map(|a| a as f64));
    angles
}

/// Tile count for `path` rotated by `angle_degrees` and re-normalized.
pub fn evaluate_angle(path: &Path, config: &SheetConfig, angle_degrees: f64) -> RotationCandidate {
    let rotated = path.rotated(angle_degrees).shifted_to_origin();
    let tiles = plan_pages(&rotated, config).page_count();
    debug!(angle = angle_degrees, tiles, "evaluated rotation");
    RotationCandidate {
        angle_degrees,
        tiles,
    }
}

/// Fewest tiles, earliest candidate on a tie.
///
/// `candidates` must be in preference order.
pub fn best_candidate(candidates: &[RotationCandidate]) -> Option<RotationCandidate> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(rank, c)| (c.tiles, *rank))
        .map(|(_, c)| *c)
}

/// Best rotation for a normalized pattern, evaluated in parallel.
pub fn optimize_rotation(path: &Path, config: &SheetConfig) -> RotationCandidate {
    let candidates: Vec<RotationCandidate> = candidate_angles()
        .par_iter()
        .map(|&angle| evaluate_angle(path, config, angle))
        .collect();
    choose(&candidates)
}

/// Same search on the calling thread.
pub fn optimize_rotation_sequential(path: &Path, config: &SheetConfig) -> RotationCandidate {
    let candidates: Vec<RotationCandidate> = candidate_angles()
        .into_iter()
        .map(|angle| evaluate_angle(path, config, angle))
        .collect();
    choose(&candidates)
}

fn choose(candidates: &[RotationCandidate]) -> RotationCandidate {
    // The candidate list always starts with 0°.
    let best = best_candidate(candidates).unwrap_or(RotationCandidate {
        angle_degrees: 0.0,
        tiles: candidates.first().map_or(1, |c| c.tiles),
    });
    info!(angle = best.angle_degrees, tiles = best.tiles, "chose rotation");
    best
}

// ============================================================================
// TESTS
// ============================================================================
