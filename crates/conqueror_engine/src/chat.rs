//! Chat module: lock-guarded message inbox drained on the tick.

use std::sync::{Mutex, MutexGuard, PoisonError};

use conqueror_core::error::Result;

use crate::module::Module;

/// Chat module. Messages are posted from any thread (typically the console
/// ingestion thread) and surfaced in the log stream on the next tick, in
/// posting order.
pub struct ChatModule {
    inbox: Mutex<Vec<String>>,
}

impl ChatModule {
    /// Create an empty chat module.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbox: Mutex::new(Vec::new()),
        }
    }

    fn lock_inbox(&self) -> MutexGuard<'_, Vec<String>> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a message for broadcast on the next tick.
    pub fn post(&self, message: impl Into<String>) {
        self.lock_inbox().push(message.into());
    }

    /// Messages waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock_inbox().len()
    }
}

impl Default for ChatModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ChatModule {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn init(&self) -> Result<()> {
        self.lock_inbox().clear();
        Ok(())
    }

    fn update(&self) {
        let drained: Vec<String> = {
            let mut inbox = self.lock_inbox();
            inbox.drain(..).collect()
        };
        for message in drained {
            tracing::info!(target: "chat", %message, "chat message");
        }
    }

    fn shutdown(&self) {
        self.lock_inbox().clear();
    }
}
