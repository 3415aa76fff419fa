//! # Conqueror Core
//!
//! Deterministic engine core for the Conqueror nation-building engine.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No threads
//! - No system randomness
//!
//! This separation enables:
//! - Running the same logic under the real-time scheduler and under tests
//! - Headless and scripted builds
//! - Exhaustive unit testing of pathfinding and movement bookkeeping
//!
//! ## Crate Structure
//!
//! - [`grid`] - Navigation grid over walkable/blocked cells
//! - [`pathfinding`] - A* path planner over the grid
//! - [`unit`] - Unit records and waypoint bookkeeping
//! - [`catalog`] - Unit and building variant tables with their price arithmetic
//! - [`combat`] - Combat stat derivation and deterministic engagement resolution

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod combat;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{BuildingCatalog, BuildingVariant, UnitCatalog, UnitClass, UnitVariant};
    pub use crate::combat::{resolve_engagement, CombatStats, EngagementOutcome};
    pub use crate::error::{EngineError, Result};
    pub use crate::grid::{CellType, NavGrid};
    pub use crate::pathfinding::find_path;
    pub use crate::unit::{GridPos, Unit, UnitId};
}
