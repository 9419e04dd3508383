//! Detection-to-track assignment strategies
//!
//! The association step solves a one-to-one minimum-cost bipartite matching
//! over the cost matrix `1 - IoU`. The solver is picked at construction time:
//! [`HungarianSolver`] is the optimal default, [`GreedySolver`] is an
//! explicit degraded strategy that repeatedly takes the globally cheapest
//! unassigned pair. There is no runtime fallback between the two.

use ndarray::prelude::*;
use pathfinding::prelude::{kuhn_munkres_min, Matrix};

/// Fixed-point scale applied to costs before the integer Hungarian solver
const COST_SCALE: f32 = 1_000_000.0;
/// Cost of a padding cell; larger than any scaled real cost in [0, 1]
const PAD_COST: i64 = 10_000_000;

/// Outcome of one association round
#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    /// Accepted (detection_idx, track_idx) pairs
    pub matches: Vec<(usize, usize)>,
    /// Detections left without a track
    pub unmatched_detections: Vec<usize>,
    /// Tracks left without a detection
    pub unmatched_tracks: Vec<usize>,
}

/// One-to-one assignment over a rectangular cost matrix
pub trait AssignmentSolver: Send + Sync {
    /// Return (row, col) pairs; every row and column appears at most once.
    /// Pair quality filtering is the caller's concern.
    fn solve(&self, cost: ArrayView2<f32>) -> Vec<(usize, usize)>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Optimal assignment via the Kuhn-Munkres algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, cost: ArrayView2<f32>) -> Vec<(usize, usize)> {
        let n_rows = cost.nrows();
        let n_cols = cost.ncols();
        if n_rows == 0 || n_cols == 0 {
            return Vec::new();
        }

        // The solver wants a square integer matrix; pad the short side with
        // dummy cells that real pairs always undercut.
        let size = n_rows.max(n_cols);
        let weights = Matrix::from_fn(size, size, |(r, c)| {
            if r < n_rows && c < n_cols {
                (cost[[r, c]] * COST_SCALE) as i64
            } else {
                PAD_COST
            }
        });

        let (_total, assignment) = kuhn_munkres_min(&weights);

        assignment
            .into_iter()
            .enumerate()
            .filter(|&(row, col)| row < n_rows && col < n_cols)
            .collect()
    }

    fn name(&self) -> &'static str {
        "hungarian"
    }
}

/// Greedy assignment: repeatedly pick the cheapest unassigned pair
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl AssignmentSolver for GreedySolver {
    fn solve(&self, cost: ArrayView2<f32>) -> Vec<(usize, usize)> {
        let n_rows = cost.nrows();
        let n_cols = cost.ncols();

        let mut candidates: Vec<(f32, usize, usize)> = cost
            .indexed_iter()
            .map(|((r, c), &v)| (v, r, c))
            .collect();
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut pairs = Vec::new();
        let mut used_rows = vec![false; n_rows];
        let mut used_cols = vec![false; n_cols];

        for (_cost, row, col) in candidates {
            if !used_rows[row] && !used_cols[col] {
                used_rows[row] = true;
                used_cols[col] = true;
                pairs.push((row, col));
            }
        }

        pairs
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Match detections to track predictions through their IoU matrix.
///
/// Assigned pairs with IoU below `iou_threshold` are rejected and both
/// members returned as unmatched. With zero tracks (or zero detections)
/// no matrix work is performed.
pub fn associate(
    iou_matrix: ArrayView2<f32>,
    iou_threshold: f32,
    solver: &dyn AssignmentSolver,
) -> AssignmentResult {
    let n_dets = iou_matrix.nrows();
    let n_tracks = iou_matrix.ncols();

    if n_dets == 0 || n_tracks == 0 {
        return AssignmentResult {
            matches: Vec::new(),
            unmatched_detections: (0..n_dets).collect(),
            unmatched_tracks: (0..n_tracks).collect(),
        };
    }

    let cost = iou_matrix.mapv(|v| 1.0 - v);
    let assigned = solver.solve(cost.view());

    let mut det_matched = vec![false; n_dets];
    let mut track_matched = vec![false; n_tracks];
    let mut matches = Vec::with_capacity(assigned.len());

    for (det_idx, track_idx) in assigned {
        if iou_matrix[[det_idx, track_idx]] >= iou_threshold {
            det_matched[det_idx] = true;
            track_matched[track_idx] = true;
            matches.push((det_idx, track_idx));
        }
    }

    AssignmentResult {
        matches,
        unmatched_detections: (0..n_dets).filter(|&i| !det_matched[i]).collect(),
        unmatched_tracks: (0..n_tracks).filter(|&i| !track_matched[i]).collect(),
    }
}
