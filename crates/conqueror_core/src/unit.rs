//! Unit records and waypoint bookkeeping.
//!
//! A [`Unit`] moves one waypoint per tick along a path computed by the
//! planner. The record upholds two invariants at every public-method
//! boundary:
//!
//! - `moving` is true exactly when the waypoint queue is non-empty;
//! - `position` equals the spawn point or the last consumed waypoint.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Identifier for a unit within its owning module.
pub type UnitId = u32;

/// A position on the navigation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl GridPos {
    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Outcome of consuming one waypoint during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The unit stepped to the next waypoint and has more to go.
    Moved,
    /// The unit stepped onto its final waypoint and stopped.
    Arrived,
}

/// A controllable unit owned by the unit module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier, unique within the owning module.
    pub id: UnitId,
    /// Display name, e.g. the catalog variant name.
    pub name: String,
    /// Current health points.
    pub health: u32,
    /// Current position on the grid.
    pub position: GridPos,
    /// Most recently commanded destination. Recorded even when no path
    /// to it exists.
    pub destination: GridPos,
    /// Remaining waypoints, consumed front-first one per tick.
    pub waypoints: VecDeque<GridPos>,
    /// True while there are waypoints left to consume.
    pub moving: bool,
}

impl Unit {
    /// Create a stationary unit at a spawn position.
    #[must_use]
    pub fn new(id: UnitId, name: impl Into<String>, health: u32, spawn: GridPos) -> Self {
        Self {
            id,
            name: name.into(),
            health,
            position: spawn,
            destination: spawn,
            waypoints: VecDeque::new(),
            moving: false,
        }
    }

    /// Replace the unit's destination and path.
    ///
    /// An empty `path` (unreachable or redundant destination) leaves the
    /// unit stationary; the destination is recorded either way. Any
    /// previously queued path is discarded whole.
    pub fn follow_path(&mut self, destination: GridPos, path: Vec<GridPos>) {
        self.destination = destination;
        self.waypoints = path.into();
        self.moving = !self.waypoints.is_empty();
    }

    /// Consume the front waypoint, stepping the unit onto it.
    ///
    /// Returns `None` for stationary units, which are left untouched.
    pub fn advance(&mut self) -> Option<Advance> {
        if !self.moving {
            return None;
        }
        let next = self.waypoints.pop_front()?;
        self.position = next;
        if self.waypoints.is_empty() {
            self.moving = false;
            Some(Advance::Arrived)
        } else {
            Some(Advance::Moved)
        }
    }

    /// True when `moving` agrees with the waypoint queue.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        self.moving == !self.waypoints.is_empty()
    }
}
