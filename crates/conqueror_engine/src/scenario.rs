//! Scenario loading and configuration.
//!
//! Scenarios define the initial engine state: grid dimensions and obstacles,
//! unit spawns, economy seed, government, and tick timing. Everything a
//! module needs at `init` arrives through these values; there are no
//! process-global registries.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::government::GovernmentKind;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// A horizontal run of blocked cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpan {
    /// Row the span sits on.
    pub y: u32,
    /// First blocked column.
    pub x_start: u32,
    /// Last blocked column (inclusive).
    pub x_end: u32,
}

/// Navigation grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSetup {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Blocked spans marked at init.
    pub obstacles: Vec<ObstacleSpan>,
}

/// One unit to create at init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpawn {
    /// Display name.
    pub name: String,
    /// Starting health.
    pub health: u32,
    /// Spawn column.
    pub x: u32,
    /// Spawn row.
    pub y: u32,
}

/// Economy module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySetup {
    /// Credits in the treasury at init.
    pub starting_treasury: u64,
    /// Buildings constructed at init, by catalog variant name.
    pub buildings: Vec<String>,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Fixed tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Stop the engine after this many ticks; `None` runs until stopped.
    pub max_ticks: Option<u64>,
    /// Navigation grid.
    pub grid: GridSetup,
    /// Units created at init.
    pub units: Vec<UnitSpawn>,
    /// Economy seed.
    pub economy: EconomySetup,
    /// Form of government at init.
    pub government: GovernmentKind,
}

impl Default for Scenario {
    /// The classic proving-ground map: 20x20 cells with a wall across
    /// row 10, an infantry squad and a tank, and a modest treasury.
    fn default() -> Self {
        Self {
            name: "Proving Grounds".to_string(),
            description: "A small walled map with two starting units".to_string(),
            tick_interval_ms: 33,
            max_ticks: None,
            grid: GridSetup {
                width: 20,
                height: 20,
                obstacles: vec![ObstacleSpan {
                    y: 10,
                    x_start: 5,
                    x_end: 14,
                }],
            },
            units: vec![
                UnitSpawn {
                    name: "Infantry".to_string(),
                    health: 100,
                    x: 1,
                    y: 1,
                },
                UnitSpawn {
                    name: "Tank".to_string(),
                    health: 150,
                    x: 2,
                    y: 2,
                },
            ],
            economy: EconomySetup {
                starting_treasury: 1000,
                buildings: vec!["Open-Pit Resource Mine".to_string()],
            },
            government: GovernmentKind::Democracy,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Tick interval as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_matches_proving_grounds() {
        let scenario = Scenario::default();

        assert_eq!(scenario.grid.width, 20);
        assert_eq!(scenario.grid.height, 20);
        assert_eq!(scenario.grid.obstacles.len(), 1);
        assert_eq!(scenario.units.len(), 2);
        assert_eq!(scenario.units[0].name, "Infantry");
        assert_eq!(scenario.units[1].health, 150);
        assert_eq!(scenario.economy.starting_treasury, 1000);
        assert_eq!(scenario.tick_interval(), Duration::from_millis(33));
        assert!(scenario.max_ticks.is_none());
    }

    #[test]
    fn test_parse_ron_scenario() {
        let ron = r#"
            Scenario(
                name: "Corridor",
                description: "One unit, one wall",
                tick_interval_ms: 10,
                max_ticks: Some(200),
                grid: GridSetup(
                    width: 8,
                    height: 4,
                    obstacles: [ObstacleSpan(y: 1, x_start: 2, x_end: 5)],
                ),
                units: [UnitSpawn(name: "Scout", health: 40, x: 0, y: 0)],
                economy: EconomySetup(starting_treasury: 500, buildings: []),
                government: Technocracy,
            )
        "#;

        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Corridor");
        assert_eq!(scenario.max_ticks, Some(200));
        assert_eq!(scenario.grid.obstacles[0].x_end, 5);
        assert_eq!(scenario.units[0].name, "Scout");
        assert_eq!(scenario.government, GovernmentKind::Technocracy);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Scenario::load("definitely/not/here.ron");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }
}
