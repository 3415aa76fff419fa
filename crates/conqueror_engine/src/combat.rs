//! Combat module: queued engagements resolved on the tick.
//!
//! External callers file engagements from any thread; resolution happens on
//! the scheduler thread using the deterministic arithmetic in
//! [`conqueror_core::combat`]. The battlefield modifier is part of the filed
//! engagement, so outcomes are reproducible from the queue contents alone.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use conqueror_core::catalog::UnitCatalog;
use conqueror_core::combat::{resolve_engagement, CombatStats, EngagementOutcome};
use conqueror_core::error::{EngineError, Result};

use crate::module::Module;

/// One filed engagement, waiting for the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// Attacking variant, by catalog name.
    pub attacker: String,
    /// Defending variant, by catalog name.
    pub defender: String,
    /// Battlefield swing in percent applied to the attacker.
    pub modifier: i32,
}

/// A resolved engagement with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// The engagement as filed.
    pub engagement: Engagement,
    /// How it resolved.
    pub outcome: EngagementOutcome,
}

struct CombatState {
    pending: VecDeque<Engagement>,
    reports: Vec<BattleReport>,
    tick: u64,
}

/// Combat module: resolves filed engagements once per tick.
pub struct CombatModule {
    catalog: UnitCatalog,
    state: Mutex<CombatState>,
}

impl CombatModule {
    /// Create the module over a unit catalog.
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self {
            catalog,
            state: Mutex::new(CombatState {
                pending: VecDeque::new(),
                reports: Vec::new(),
                tick: 0,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CombatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// File an engagement for resolution on the next tick.
    ///
    /// Both variant names must exist in the catalog.
    pub fn queue_engagement(&self, attacker: &str, defender: &str, modifier: i32) -> Result<()> {
        if self.catalog.find(attacker).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "unknown attacker variant '{attacker}'"
            )));
        }
        if self.catalog.find(defender).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "unknown defender variant '{defender}'"
            )));
        }

        let mut state = self.lock_state();
        state.pending.push_back(Engagement {
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            modifier,
        });
        Ok(())
    }

    /// Engagements resolved so far, oldest first.
    #[must_use]
    pub fn reports(&self) -> Vec<BattleReport> {
        self.lock_state().reports.clone()
    }
}

impl Module for CombatModule {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn init(&self) -> Result<()> {
        if self.catalog.variants.is_empty() {
            return Err(EngineError::InvalidConfig("unit catalog is empty".into()));
        }
        tracing::info!(variants = self.catalog.variants.len(), "combat systems ready");
        Ok(())
    }

    fn update(&self) {
        let mut state = self.lock_state();
        state.tick += 1;

        while let Some(engagement) = state.pending.pop_front() {
            // Queue admission validated the names; a miss here means the
            // catalog changed under us, which it cannot.
            let (Some(attacker), Some(defender)) = (
                self.catalog.find(&engagement.attacker),
                self.catalog.find(&engagement.defender),
            ) else {
                tracing::warn!(?engagement, "engagement references unknown variant; dropped");
                continue;
            };

            let outcome = resolve_engagement(
                CombatStats::from_variant(attacker),
                CombatStats::from_variant(defender),
                engagement.modifier,
            );
            tracing::info!(
                attacker = %engagement.attacker,
                defender = %engagement.defender,
                ?outcome,
                "engagement resolved"
            );
            state.reports.push(BattleReport {
                engagement,
                outcome,
            });
        }
    }

    fn shutdown(&self) {
        let mut state = self.lock_state();
        state.pending.clear();
        state.reports.clear();
        tracing::info!("combat module cleared");
    }
}
