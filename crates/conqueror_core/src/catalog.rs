//! Unit and building variant tables with their price arithmetic.
//!
//! Catalogs are plain values constructed at startup (or decoded from a
//! scenario file) and handed to the modules that need them. Nothing here is
//! process-global; one engine instance owns one set of catalogs.
//!
//! All prices are integer credits. Production bonuses are percentages
//! (`150` means 1.5x base output) so catalog arithmetic stays deterministic.

use serde::{Deserialize, Serialize};

/// Broad unit classes available for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Ground infantry.
    Infantry,
    /// Main battle tanks.
    Tank,
    /// Fixed-wing aircraft.
    FighterJet,
    /// Rotary-wing aircraft.
    Helicopter,
    /// Long-range ground artillery.
    Artillery,
}

/// A purchasable unit variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitVariant {
    /// Unit class this variant belongs to.
    pub class: UnitClass,
    /// Display name.
    pub name: String,
    /// Purchase cost in credits.
    pub cost: u64,
    /// Additional resource cost in credits.
    pub resource_cost: u64,
    /// Elite variants carry enhanced combat stats.
    pub elite: bool,
}

impl UnitVariant {
    /// Total credits charged when purchasing `quantity` of this variant.
    #[must_use]
    pub const fn purchase_cost(&self, quantity: u64) -> u64 {
        (self.cost + self.resource_cost) * quantity
    }
}

/// Catalog of unit variants, ordered cheapest-first within each class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCatalog {
    /// All known variants.
    pub variants: Vec<UnitVariant>,
}

impl UnitCatalog {
    /// The standard catalog shipped with the engine.
    #[must_use]
    pub fn standard() -> Self {
        let v = |class, name: &str, cost, resource_cost, elite| UnitVariant {
            class,
            name: name.to_string(),
            cost,
            resource_cost,
            elite,
        };
        Self {
            variants: vec![
                v(UnitClass::Infantry, "Standard Infantry Soldier", 50_000, 25_000, false),
                v(UnitClass::Infantry, "Mechanized Infantry", 75_000, 37_500, false),
                v(UnitClass::Infantry, "Exoskeleton-Assisted Elite Infantry", 250_000, 125_000, true),
                v(UnitClass::Tank, "M1 Abrams", 1_000_000, 500_000, false),
                v(UnitClass::Tank, "Leopard 2A7", 1_100_000, 550_000, false),
                v(UnitClass::Tank, "Type 10", 2_000_000, 1_000_000, true),
                v(UnitClass::FighterJet, "F-16 Fighting Falcon", 800_000, 400_000, false),
                v(UnitClass::FighterJet, "Eurofighter Typhoon", 1_100_000, 550_000, false),
                v(UnitClass::Helicopter, "AH-64 Apache", 600_000, 300_000, false),
                v(UnitClass::Helicopter, "Kamov Ka-52", 750_000, 375_000, false),
                v(UnitClass::Artillery, "M109 Paladin", 300_000, 150_000, false),
                v(UnitClass::Artillery, "K9 Thunder", 340_000, 170_000, false),
            ],
        }
    }

    /// All variants of a class, in catalog order.
    pub fn variants_for(&self, class: UnitClass) -> impl Iterator<Item = &UnitVariant> {
        self.variants.iter().filter(move |v| v.class == class)
    }

    /// Look up a variant by display name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&UnitVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// A purchasable building variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingVariant {
    /// Display name.
    pub name: String,
    /// Purchase cost in credits.
    pub cost: u64,
    /// Base cost of one upgrade level.
    pub upgrade_cost: u64,
    /// Production bonus percentage; 100 means base output.
    pub production_bonus: u32,
}

/// Catalog of building variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    /// All known variants.
    pub variants: Vec<BuildingVariant>,
}

impl BuildingCatalog {
    /// The standard catalog shipped with the engine.
    #[must_use]
    pub fn standard() -> Self {
        let v = |name: &str, cost, upgrade_cost, production_bonus| BuildingVariant {
            name: name.to_string(),
            cost,
            upgrade_cost,
            production_bonus,
        };
        Self {
            variants: vec![
                v("Open-Pit Resource Mine", 400_000, 100_000, 100),
                v("Deep-Core Resource Mine", 900_000, 225_000, 150),
                v("Automated Factory", 1_200_000, 300_000, 200),
            ],
        }
    }

    /// Look up a variant by display name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BuildingVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// A constructed building owned by the economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// The catalog variant this building was built from.
    pub variant: BuildingVariant,
    /// Current upgrade level, starting at 1.
    pub level: u32,
    /// Structure hit points.
    pub health: u64,
}

/// Base per-tick output of a level-1 building at 100% bonus.
const BASE_PRODUCTION: u64 = 100;

/// Hit points of a freshly constructed building.
const BASE_HEALTH: u64 = 1000;

impl Building {
    /// Construct a level-1 building from a variant.
    #[must_use]
    pub fn new(variant: BuildingVariant) -> Self {
        Self {
            variant,
            level: 1,
            health: BASE_HEALTH,
        }
    }

    /// Credits required for the next upgrade at the current level.
    #[must_use]
    pub fn upgrade_price(&self) -> u64 {
        self.variant.upgrade_cost * u64::from(self.level)
    }

    /// Raise the building one level, returning the credits charged.
    ///
    /// Each level multiplies structure health by 1.2; the upgrade price
    /// scales linearly with the level being left behind.
    pub fn upgrade(&mut self) -> u64 {
        let charged = self.upgrade_price();
        self.level += 1;
        self.health = self.health * 12 / 10;
        charged
    }

    /// Credits produced by this building in one tick.
    #[must_use]
    pub fn produce(&self) -> u64 {
        BASE_PRODUCTION * u64::from(self.variant.production_bonus) * u64::from(self.level) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_unit_catalog_lookup() {
        let catalog = UnitCatalog::standard();

        let abrams = catalog.find("M1 Abrams").unwrap();
        assert_eq!(abrams.class, UnitClass::Tank);
        assert_eq!(abrams.cost, 1_000_000);
        assert!(!abrams.elite);

        assert!(catalog.find("Nonexistent").is_none());
    }

    #[test]
    fn test_variants_for_class() {
        let catalog = UnitCatalog::standard();
        let tanks: Vec<_> = catalog.variants_for(UnitClass::Tank).collect();

        assert_eq!(tanks.len(), 3);
        assert!(tanks.iter().all(|v| v.class == UnitClass::Tank));
        // Catalog order is cheapest-first.
        assert!(tanks.windows(2).all(|w| w[0].cost <= w[1].cost));
    }

    #[test]
    fn test_purchase_cost() {
        let catalog = UnitCatalog::standard();
        let infantry = catalog.find("Standard Infantry Soldier").unwrap();

        assert_eq!(infantry.purchase_cost(1), 75_000);
        assert_eq!(infantry.purchase_cost(4), 300_000);
    }

    #[test]
    fn test_building_upgrade_arithmetic() {
        let catalog = BuildingCatalog::standard();
        let mut mine = Building::new(catalog.find("Open-Pit Resource Mine").unwrap().clone());

        assert_eq!(mine.level, 1);
        assert_eq!(mine.health, 1000);

        assert_eq!(mine.upgrade(), 100_000);
        assert_eq!(mine.level, 2);
        assert_eq!(mine.health, 1200);

        // Second upgrade charges twice the base upgrade cost.
        assert_eq!(mine.upgrade(), 200_000);
        assert_eq!(mine.health, 1440);
    }

    #[test]
    fn test_building_production_scales_with_level_and_bonus() {
        let catalog = BuildingCatalog::standard();

        let mine = Building::new(catalog.find("Open-Pit Resource Mine").unwrap().clone());
        assert_eq!(mine.produce(), 100);

        let mut factory = Building::new(catalog.find("Automated Factory").unwrap().clone());
        assert_eq!(factory.produce(), 200);
        factory.upgrade();
        assert_eq!(factory.produce(), 400);
    }
}
