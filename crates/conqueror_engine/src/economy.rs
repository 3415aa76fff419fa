//! Economy module: treasury and per-tick building production.

use std::sync::{Mutex, MutexGuard, PoisonError};

use conqueror_core::catalog::{Building, BuildingCatalog};
use conqueror_core::error::{EngineError, Result};

use crate::module::Module;
use crate::scenario::EconomySetup;

struct EconomyState {
    treasury: u64,
    buildings: Vec<Building>,
    tick: u64,
}

/// Economy module: owns the treasury and the nation's buildings, and adds
/// their production each tick.
pub struct EconomyModule {
    setup: EconomySetup,
    catalog: BuildingCatalog,
    state: Mutex<EconomyState>,
}

impl EconomyModule {
    /// Create the module from scenario configuration and a building catalog.
    #[must_use]
    pub fn new(setup: EconomySetup, catalog: BuildingCatalog) -> Self {
        Self {
            setup,
            catalog,
            state: Mutex::new(EconomyState {
                treasury: 0,
                buildings: Vec::new(),
                tick: 0,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, EconomyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credits currently in the treasury.
    #[must_use]
    pub fn treasury(&self) -> u64 {
        self.lock_state().treasury
    }

    /// Number of buildings owned.
    #[must_use]
    pub fn building_count(&self) -> usize {
        self.lock_state().buildings.len()
    }

    /// Upgrade every building one level, drawing the cost from the
    /// treasury. Buildings the treasury cannot afford are skipped.
    pub fn upgrade_all(&self) {
        let mut state = self.lock_state();
        let mut upgraded = 0usize;
        for index in 0..state.buildings.len() {
            let cost = state.buildings[index].upgrade_price();
            if state.treasury >= cost {
                let charged = state.buildings[index].upgrade();
                state.treasury -= charged;
                upgraded += 1;
            }
        }
        tracing::info!(upgraded, treasury = state.treasury, "building upgrades applied");
    }
}

impl Module for EconomyModule {
    fn name(&self) -> &'static str {
        "economy"
    }

    /// Seed the treasury and construct the configured buildings.
    ///
    /// An unknown building name is a configuration error and aborts engine
    /// startup.
    fn init(&self) -> Result<()> {
        let mut buildings = Vec::with_capacity(self.setup.buildings.len());
        for name in &self.setup.buildings {
            let variant = self.catalog.find(name).ok_or_else(|| {
                EngineError::InvalidConfig(format!("unknown building variant '{name}'"))
            })?;
            buildings.push(Building::new(variant.clone()));
        }

        let mut state = self.lock_state();
        state.treasury = self.setup.starting_treasury;
        state.buildings = buildings;
        state.tick = 0;
        tracing::info!(
            treasury = state.treasury,
            buildings = state.buildings.len(),
            "economy opened"
        );
        Ok(())
    }

    fn update(&self) {
        let mut state = self.lock_state();
        state.tick += 1;

        let produced: u64 = state.buildings.iter().map(Building::produce).sum();
        state.treasury += produced;

        if state.tick % 100 == 0 {
            tracing::info!(treasury = state.treasury, "economy value updated");
        }
    }

    fn shutdown(&self) {
        let mut state = self.lock_state();
        state.buildings.clear();
        tracing::info!(treasury = state.treasury, "economy closed");
    }
}
