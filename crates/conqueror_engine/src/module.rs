//! The module lifecycle contract.

use conqueror_core::error::Result;

/// A self-contained engine subsystem driven by the scheduler.
///
/// The engine calls `init` once for every registered module in registration
/// order, `update` once per tick in the same order, and `shutdown` in
/// reverse order. Methods take `&self` so one `Arc` of a module can serve
/// both the scheduler and external command callers; each implementation
/// guards its own state (a `Mutex`, atomics) and must never assume it is
/// called from a single thread.
pub trait Module: Send + Sync {
    /// Stable name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Acquire resources and build initial state.
    ///
    /// An error here is fatal: the engine aborts startup and never reaches
    /// the tick loop.
    fn init(&self) -> Result<()>;

    /// Advance the module by one tick.
    ///
    /// Runs on the scheduler thread. Must not block on IO and must not
    /// panic past its own lock; command and planning failures are logged,
    /// never escalated.
    fn update(&self);

    /// Release state. Called once during engine shutdown; must be
    /// idempotent.
    fn shutdown(&self);
}
