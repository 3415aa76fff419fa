//! Unit movement module: pathfinding commands and per-tick advancement.
//!
//! This module is the sole mutator of unit position and path state. All of
//! it sits behind one exclusive lock: `set_destination` (called from command
//! threads) and `update` (called from the scheduler thread) both take it, so
//! a tick never observes a half-written command and a command never observes
//! a half-applied tick. The grid is built at `init` and never mutated
//! afterwards, so planning under the lock reads a consistent map.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use conqueror_core::error::{EngineError, Result};
use conqueror_core::grid::NavGrid;
use conqueror_core::pathfinding::find_path;
use conqueror_core::unit::{Advance, GridPos, Unit, UnitId};

use crate::module::Module;
use crate::scenario::{GridSetup, UnitSpawn};

/// Upper bound on undrained events kept in memory; the oldest are dropped
/// first once the backlog is full.
const MAX_EVENT_BACKLOG: usize = 1024;

/// A structured, tick-stamped record of one observable unit mutation.
///
/// Events are pushed under the module lock, so their order matches the
/// serialized order of the mutations that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEvent {
    /// Tick at which the event occurred; 0 for init-time events.
    pub tick: u64,
    /// What happened.
    pub kind: UnitEventKind,
}

/// The observable unit mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEventKind {
    /// A unit was created at init.
    Spawned {
        /// Unit id.
        id: UnitId,
        /// Spawn position.
        position: GridPos,
    },
    /// A destination command was accepted and a path queued.
    DestinationSet {
        /// Unit id.
        id: UnitId,
        /// Commanded destination.
        destination: GridPos,
        /// Number of queued waypoints.
        path_len: usize,
    },
    /// A destination command found no path (unreachable, blocked, or
    /// already there); the unit stays idle with the destination recorded.
    PathRejected {
        /// Unit id.
        id: UnitId,
        /// Commanded destination.
        destination: GridPos,
    },
    /// A command named a unit that does not exist.
    InvalidUnit {
        /// The offending id.
        id: UnitId,
    },
    /// A unit consumed a waypoint.
    Moved {
        /// Unit id.
        id: UnitId,
        /// New position.
        position: GridPos,
    },
    /// A unit consumed its final waypoint and stopped.
    Arrived {
        /// Unit id.
        id: UnitId,
        /// Final position.
        position: GridPos,
    },
}

/// Read-only view of one unit, taken under the module lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit id.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Current health points.
    pub health: u32,
    /// Current position.
    pub position: GridPos,
    /// Most recently commanded destination.
    pub destination: GridPos,
    /// True while waypoints remain.
    pub moving: bool,
    /// Waypoints left to consume.
    pub waypoints_remaining: usize,
}

/// Everything the module owns, guarded by one lock.
struct UnitState {
    grid: NavGrid,
    units: Vec<Unit>,
    tick: u64,
    events: VecDeque<UnitEvent>,
}

impl UnitState {
    fn push_event(&mut self, kind: UnitEventKind) {
        if self.events.len() >= MAX_EVENT_BACKLOG {
            self.events.pop_front();
        }
        self.events.push_back(UnitEvent {
            tick: self.tick,
            kind,
        });
    }
}

/// The unit movement module.
///
/// Owns all units and the navigation grid. Commands arrive from any thread
/// through [`UnitModule::set_destination`]; the scheduler advances movement
/// through the [`Module`] contract.
pub struct UnitModule {
    grid_setup: GridSetup,
    spawns: Vec<UnitSpawn>,
    state: Mutex<Option<UnitState>>,
}

impl UnitModule {
    /// Create the module from scenario configuration. No resources are
    /// acquired until `init`.
    #[must_use]
    pub fn new(grid_setup: GridSetup, spawns: Vec<UnitSpawn>) -> Self {
        Self {
            grid_setup,
            spawns,
            state: Mutex::new(None),
        }
    }

    /// Take the state lock, recovering from poisoning: a panicking command
    /// thread must not wedge the tick loop.
    fn lock_state(&self) -> MutexGuard<'_, Option<UnitState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Command a unit to move to `destination`.
    ///
    /// Fire-and-forget: an unknown id or an unreachable destination is
    /// recorded as an event and logged, never returned as an error. Any
    /// previously queued path is replaced atomically under the lock.
    pub fn set_destination(&self, id: UnitId, destination: GridPos) {
        let mut guard = self.lock_state();
        let Some(state) = guard.as_mut() else {
            tracing::warn!(id, "set_destination before init; ignored");
            return;
        };

        let Some(unit) = state.units.get_mut(id as usize) else {
            tracing::warn!(id, count = state.units.len(), "invalid unit index");
            state.push_event(UnitEventKind::InvalidUnit { id });
            return;
        };

        let path = find_path(&state.grid, unit.position, destination);
        let path_len = path.len();
        unit.follow_path(destination, path);

        if path_len == 0 {
            tracing::debug!(id, %destination, "no path to destination");
            state.push_event(UnitEventKind::PathRejected { id, destination });
        } else {
            tracing::debug!(id, %destination, path_len, "destination set");
            state.push_event(UnitEventKind::DestinationSet {
                id,
                destination,
                path_len,
            });
        }
    }

    /// Snapshot every unit under the module lock.
    #[must_use]
    pub fn status(&self) -> Vec<UnitSnapshot> {
        let guard = self.lock_state();
        let Some(state) = guard.as_ref() else {
            return Vec::new();
        };
        state
            .units
            .iter()
            .map(|unit| UnitSnapshot {
                id: unit.id,
                name: unit.name.clone(),
                health: unit.health,
                position: unit.position,
                destination: unit.destination,
                moving: unit.moving,
                waypoints_remaining: unit.waypoints.len(),
            })
            .collect()
    }

    /// Number of units currently owned.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.lock_state().as_ref().map_or(0, |s| s.units.len())
    }

    /// Drain and return all pending events in the order they occurred.
    #[must_use]
    pub fn drain_events(&self) -> Vec<UnitEvent> {
        let mut guard = self.lock_state();
        guard
            .as_mut()
            .map_or_else(Vec::new, |state| state.events.drain(..).collect())
    }
}

impl Module for UnitModule {
    fn name(&self) -> &'static str {
        "units"
    }

    /// Build the grid, mark obstacle spans, and spawn the configured units.
    fn init(&self) -> Result<()> {
        let setup = &self.grid_setup;
        if setup.width == 0 || setup.height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "grid dimensions {}x{} are degenerate",
                setup.width, setup.height
            )));
        }

        let mut grid = NavGrid::new(setup.width, setup.height);
        for span in &setup.obstacles {
            grid.block_span(span.y, span.x_start, span.x_end);
        }

        let mut state = UnitState {
            grid,
            units: Vec::with_capacity(self.spawns.len()),
            tick: 0,
            events: VecDeque::new(),
        };

        for (index, spawn) in self.spawns.iter().enumerate() {
            let position = GridPos::new(spawn.x, spawn.y);
            if !state.grid.in_bounds(position.x, position.y) {
                return Err(EngineError::InvalidConfig(format!(
                    "unit '{}' spawns at {position} outside the {}x{} grid",
                    spawn.name, setup.width, setup.height
                )));
            }
            let id = index as UnitId;
            state
                .units
                .push(Unit::new(id, spawn.name.clone(), spawn.health, position));
            state.push_event(UnitEventKind::Spawned { id, position });
            tracing::info!(id, name = %spawn.name, %position, "unit spawned");
        }

        *self.lock_state() = Some(state);
        Ok(())
    }

    /// Advance every moving unit one waypoint.
    fn update(&self) {
        let mut guard = self.lock_state();
        let Some(state) = guard.as_mut() else {
            return;
        };
        state.tick += 1;

        let mut steps = Vec::new();
        for unit in &mut state.units {
            match unit.advance() {
                Some(Advance::Moved) => steps.push((unit.id, unit.position, false)),
                Some(Advance::Arrived) => steps.push((unit.id, unit.position, true)),
                None => {}
            }
        }

        for (id, position, arrived) in steps {
            if arrived {
                tracing::info!(id, %position, "unit arrived");
                state.push_event(UnitEventKind::Arrived { id, position });
            } else {
                tracing::debug!(id, %position, "unit moved");
                state.push_event(UnitEventKind::Moved { id, position });
            }
        }
    }

    /// Clear all units. Idempotent.
    fn shutdown(&self) {
        let mut guard = self.lock_state();
        if guard.take().is_some() {
            tracing::info!("unit module cleared");
        }
    }
}
