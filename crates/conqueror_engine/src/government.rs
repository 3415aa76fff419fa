//! Government module: form of government, stability drift, transitions.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use conqueror_core::error::Result;

use crate::module::Module;

/// Forms of government a nation can adopt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernmentKind {
    /// Stable, economically liberal.
    Democracy,
    /// Representative rule with slightly tighter control.
    Republic,
    /// Hereditary rule.
    Monarchy,
    /// Centralized military rule.
    Dictatorship,
    /// Rule by technical administration.
    Technocracy,
}

impl GovernmentKind {
    /// Stability rating (0-100) this form settles toward.
    #[must_use]
    pub const fn baseline_stability(self) -> u32 {
        match self {
            Self::Democracy => 75,
            Self::Republic => 70,
            Self::Monarchy => 65,
            Self::Technocracy => 60,
            Self::Dictatorship => 45,
        }
    }

    /// Percentage bonus applied to national economic output.
    #[must_use]
    pub const fn economic_bonus(self) -> u32 {
        match self {
            Self::Democracy => 110,
            Self::Republic => 108,
            Self::Monarchy => 100,
            Self::Technocracy => 120,
            Self::Dictatorship => 95,
        }
    }

    /// Percentage bonus applied to national military operations.
    #[must_use]
    pub const fn military_bonus(self) -> u32 {
        match self {
            Self::Democracy => 100,
            Self::Republic => 102,
            Self::Monarchy => 105,
            Self::Technocracy => 110,
            Self::Dictatorship => 120,
        }
    }
}

impl FromStr for GovernmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "democracy" => Ok(Self::Democracy),
            "republic" => Ok(Self::Republic),
            "monarchy" => Ok(Self::Monarchy),
            "dictatorship" => Ok(Self::Dictatorship),
            "technocracy" => Ok(Self::Technocracy),
            other => Err(format!("unknown government kind '{other}'")),
        }
    }
}

struct GovernmentState {
    kind: GovernmentKind,
    stability: u32,
    tick: u64,
}

/// Governance module: tracks the current form of government and lets
/// stability drift back toward its baseline after upheavals.
pub struct GovernmentModule {
    initial: GovernmentKind,
    state: Mutex<GovernmentState>,
}

/// Stability cost of changing the form of government, as a percentage of
/// the new form's baseline.
const TRANSITION_STABILITY_PCT: u32 = 90;

impl GovernmentModule {
    /// Create the module with the configured initial form.
    #[must_use]
    pub fn new(initial: GovernmentKind) -> Self {
        Self {
            initial,
            state: Mutex::new(GovernmentState {
                kind: initial,
                stability: initial.baseline_stability(),
                tick: 0,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GovernmentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch to a new form of government.
    ///
    /// The transition costs stability: the nation restarts below the new
    /// form's baseline and drifts back up over subsequent ticks.
    pub fn change_government(&self, kind: GovernmentKind) {
        let mut state = self.lock_state();
        state.kind = kind;
        state.stability = kind.baseline_stability() * TRANSITION_STABILITY_PCT / 100;
        tracing::info!(?kind, stability = state.stability, "government changed");
    }

    /// Current form and stability rating.
    #[must_use]
    pub fn snapshot(&self) -> (GovernmentKind, u32) {
        let state = self.lock_state();
        (state.kind, state.stability)
    }
}

impl Module for GovernmentModule {
    fn name(&self) -> &'static str {
        "government"
    }

    fn init(&self) -> Result<()> {
        let mut state = self.lock_state();
        state.kind = self.initial;
        state.stability = self.initial.baseline_stability();
        state.tick = 0;
        tracing::info!(kind = ?state.kind, stability = state.stability, "government seated");
        Ok(())
    }

    fn update(&self) {
        let mut state = self.lock_state();
        state.tick += 1;

        let baseline = state.kind.baseline_stability();
        if state.stability < baseline {
            state.stability += 1;
        } else if state.stability > baseline {
            state.stability -= 1;
        }

        if state.tick % 100 == 0 {
            tracing::debug!(
                kind = ?state.kind,
                stability = state.stability,
                "government status"
            );
        }
    }

    fn shutdown(&self) {
        let state = self.lock_state();
        tracing::info!(kind = ?state.kind, "government module shut down");
    }
}
