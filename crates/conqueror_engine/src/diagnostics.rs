//! Diagnostics module: tick counting and periodic health lines.

use std::sync::atomic::{AtomicU64, Ordering};

use conqueror_core::error::Result;

use crate::module::Module;

/// Emit a nominal-status line every this many ticks.
const REPORT_EVERY: u64 = 250;

/// Diagnostics module. Lock-free: a single atomic tick counter.
pub struct DiagnosticsModule {
    ticks: AtomicU64,
}

impl DiagnosticsModule {
    /// Create the module.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
        }
    }

    /// Ticks observed since init.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for DiagnosticsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for DiagnosticsModule {
    fn name(&self) -> &'static str {
        "diagnostics"
    }

    fn init(&self) -> Result<()> {
        self.ticks.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn update(&self) {
        let count = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if count % REPORT_EVERY == 0 {
            tracing::info!(ticks = count, "diagnostics: all systems nominal");
        }
    }

    fn shutdown(&self) {
        tracing::info!(ticks = self.ticks(), "diagnostics module shut down");
    }
}
