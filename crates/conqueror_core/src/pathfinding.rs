//! Grid-based pathfinding using the A* algorithm.
//!
//! Movement is 4-directional with a uniform step cost of 1, so the Manhattan
//! distance heuristic is admissible and consistent and the returned path is
//! optimal. All bookkeeping is integer arithmetic over function-local tables;
//! results are identical across platforms and repeated calls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::NavGrid;
use crate::unit::GridPos;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    /// Grid coordinates.
    x: u32,
    y: u32,
    /// f_score = g_score + heuristic.
    f_score: u32,
    /// Tie-breaker for determinism: lower packed (y, x) first.
    /// This ensures consistent ordering when f_scores are equal.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for min-heap
        // behavior. Lower f_score = higher priority, so we use other.cmp(self).
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 4-directional movement.
const DIRECTIONS: [(i32, i32); 4] = [
    (0, -1), // North
    (0, 1),  // South
    (-1, 0), // West
    (1, 0),  // East
];

/// Manhattan distance heuristic (admissible for 4-directional movement).
#[inline]
fn manhattan_heuristic(x1: u32, y1: u32, x2: u32, y2: u32) -> u32 {
    x1.abs_diff(x2) + y1.abs_diff(y2)
}

/// Convert coordinates to a tie-breaker value for deterministic ordering.
#[inline]
fn coords_to_tie_breaker(x: u32, y: u32) -> u64 {
    (u64::from(y) << 32) | u64::from(x)
}

/// Find a shortest path from `start` to `goal` over the grid.
///
/// Returns the path in traversal order, excluding `start` and including
/// `goal`. An empty vector means "nothing to do or no path":
///
/// - `start == goal` (already there),
/// - `goal` is blocked or out of bounds,
/// - the goal is disconnected from the start.
///
/// A blocked `start` cell is still expanded, so a unit standing on terrain
/// that later became blocked can path off it.
#[must_use]
pub fn find_path(grid: &NavGrid, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    if !grid.in_bounds(start.x, start.y) || !grid.in_bounds(goal.x, goal.y) {
        return Vec::new();
    }
    if start == goal {
        return Vec::new();
    }
    if !grid.is_walkable(goal.x, goal.y) {
        return Vec::new();
    }

    let cell_count = grid.cell_count();
    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    // Function-local node tables indexed by cell; freed on return.
    let mut closed = vec![false; cell_count];
    let mut g_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<(u32, u32)>> = vec![None; cell_count];

    let start_idx = grid.coords_to_index(start.x, start.y);
    g_score[start_idx] = 0;
    open_set.push(AStarNode {
        x: start.x,
        y: start.y,
        f_score: manhattan_heuristic(start.x, start.y, goal.x, goal.y),
        tie_breaker: coords_to_tie_breaker(start.x, start.y),
    });

    while let Some(current) = open_set.pop() {
        let current_idx = grid.coords_to_index(current.x, current.y);
        // A cell is finalized the first time it is popped as minimum-f;
        // later heap entries for it are stale.
        if closed[current_idx] {
            continue;
        }
        closed[current_idx] = true;

        if current.x == goal.x && current.y == goal.y {
            return reconstruct_path(grid, &came_from, start, goal);
        }

        let current_g = g_score[current_idx];

        for &(dx, dy) in &DIRECTIONS {
            let nx = current.x as i32 + dx;
            let ny = current.y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }

            let nx = nx as u32;
            let ny = ny as u32;
            if !grid.in_bounds(nx, ny) || !grid.is_walkable(nx, ny) {
                continue;
            }

            let neighbor_idx = grid.coords_to_index(nx, ny);
            if closed[neighbor_idx] {
                continue;
            }

            let tentative_g = current_g + 1;
            if tentative_g < g_score[neighbor_idx] {
                g_score[neighbor_idx] = tentative_g;
                came_from[neighbor_idx] = Some((current.x, current.y));
                open_set.push(AStarNode {
                    x: nx,
                    y: ny,
                    f_score: tentative_g + manhattan_heuristic(nx, ny, goal.x, goal.y),
                    tie_breaker: coords_to_tie_breaker(nx, ny),
                });
            }
        }
    }

    // Open set exhausted without reaching the goal.
    tracing::trace!(?start, ?goal, "no path: open set exhausted");
    Vec::new()
}

/// Reconstruct the path from the parent table, goal back to start.
fn reconstruct_path(
    grid: &NavGrid,
    came_from: &[Option<(u32, u32)>],
    start: GridPos,
    goal: GridPos,
) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut current = goal;

    while current != start {
        path.push(current);
        match came_from[grid.coords_to_index(current.x, current.y)] {
            Some((px, py)) => current = GridPos::new(px, py),
            None => return Vec::new(),
        }
    }

    path.reverse();
    path
}
