//! # Conqueror Engine
//!
//! Real-time runtime for the Conqueror nation-building engine: a fixed-tick
//! scheduler driving a set of independently-locked modules, with command
//! ingestion from a console thread.
//!
//! The deterministic game logic (pathfinding, movement bookkeeping, catalog
//! arithmetic) lives in [`conqueror_core`]; this crate owns the threads and
//! the locks.
//!
//! ## Crate Structure
//!
//! - [`module`] - The `Module` lifecycle contract
//! - [`engine`] - The scheduler: registry, tick thread, state machine
//! - [`units`] - Unit movement module (pathfinding commands + tick advance)
//! - [`combat`], [`economy`], [`government`], [`chat`], [`diagnostics`] -
//!   peer modules
//! - [`console`] - Cancellable console ingestion and command routing
//! - [`scenario`] - RON scenario configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod chat;
pub mod combat;
pub mod console;
pub mod diagnostics;
pub mod economy;
pub mod engine;
pub mod government;
pub mod module;
pub mod scenario;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chat::ChatModule;
    pub use crate::combat::CombatModule;
    pub use crate::console::{parse_command, Command, Console, ConsoleRouter};
    pub use crate::diagnostics::DiagnosticsModule;
    pub use crate::economy::EconomyModule;
    pub use crate::engine::{Engine, EngineState, StopHandle};
    pub use crate::government::{GovernmentKind, GovernmentModule};
    pub use crate::module::Module;
    pub use crate::scenario::Scenario;
    pub use crate::units::{UnitEvent, UnitEventKind, UnitModule, UnitSnapshot};
}
