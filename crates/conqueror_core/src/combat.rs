//! Combat stat derivation and deterministic engagement resolution.
//!
//! Stats are derived from a variant's purchase cost; more expensive hardware
//! hits harder and soaks more. Battlefield randomness stays outside this
//! crate: callers pass an explicit percentage modifier, so the same inputs
//! always resolve the same way.

use serde::{Deserialize, Serialize};

use crate::catalog::UnitVariant;

/// Effective combat factors for a unit variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Offensive rating.
    pub attack: u64,
    /// Defensive rating.
    pub defense: u64,
    /// Hit points.
    pub hit_points: u64,
}

/// Floor for hit points of even the cheapest variant.
const MIN_HIT_POINTS: u64 = 50;

impl CombatStats {
    /// Derive stats from a catalog variant.
    ///
    /// Ratings scale with purchase cost; elite variants get a 25% bonus to
    /// attack and defense and a 20% bonus to hit points.
    #[must_use]
    pub fn from_variant(variant: &UnitVariant) -> Self {
        let mut attack = variant.cost / 1_000;
        let mut defense = variant.cost / 1_200;
        let mut hit_points = (variant.cost / 20_000).max(MIN_HIT_POINTS);
        if variant.elite {
            attack = attack * 5 / 4;
            defense = defense * 5 / 4;
            hit_points = hit_points * 6 / 5;
        }
        Self {
            attack,
            defense,
            hit_points,
        }
    }
}

/// Result of resolving one engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementOutcome {
    /// The attacker's effective attack beat the defense by `margin`.
    AttackerWins {
        /// Positive score difference.
        margin: u64,
    },
    /// The defense held by `margin`.
    DefenderHolds {
        /// Positive score difference.
        margin: u64,
    },
    /// Attack and defense cancelled out exactly.
    Standoff,
}

/// Resolve a one-on-one engagement.
///
/// `modifier` is a battlefield swing in percent applied to the attacker's
/// rating (e.g. `-5` to `5`); the caller decides where it comes from, which
/// keeps this function referentially transparent.
#[must_use]
pub fn resolve_engagement(
    attacker: CombatStats,
    defender: CombatStats,
    modifier: i32,
) -> EngagementOutcome {
    let effective = apply_modifier(attacker.attack, modifier);
    score(effective, defender.defense)
}

/// Resolve a group engagement by summing each side's ratings.
#[must_use]
pub fn resolve_group_engagement(
    attackers: &[CombatStats],
    defenders: &[CombatStats],
    modifier: i32,
) -> EngagementOutcome {
    let attack: u64 = attackers.iter().map(|s| s.attack).sum();
    let defense: u64 = defenders.iter().map(|s| s.defense).sum();
    score(apply_modifier(attack, modifier), defense)
}

fn apply_modifier(rating: u64, modifier: i32) -> u64 {
    let scaled = i64::try_from(rating).unwrap_or(i64::MAX) * i64::from(100 + modifier) / 100;
    u64::try_from(scaled).unwrap_or(0)
}

fn score(attack: u64, defense: u64) -> EngagementOutcome {
    match attack.cmp(&defense) {
        std::cmp::Ordering::Greater => EngagementOutcome::AttackerWins {
            margin: attack - defense,
        },
        std::cmp::Ordering::Less => EngagementOutcome::DefenderHolds {
            margin: defense - attack,
        },
        std::cmp::Ordering::Equal => EngagementOutcome::Standoff,
    }
}
